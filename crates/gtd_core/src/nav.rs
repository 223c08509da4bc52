//! Main navigation bar.
//!
//! # Responsibility
//! - Mark the entry for the current route active and announce the change
//!   to assistive technology through `#nav-announcer`.
//! - Roving keyboard focus across enabled entries, badges and disabling.
//!
//! # Invariants
//! - At most one entry carries `active` / `aria-current="page"`.
//! - Disabled entries are skipped by keyboard movement and ignore clicks.

use crate::clock::{Clock, EpochMillis};
use crate::router::{HashRouter, Subscription};
use crate::ui::layout::{nav_item_id, MAIN_NAV, NAV_ANNOUNCER, NAV_ITEMS};
use crate::ui::{EventKind, Intent, KeyPress, ListenerId, ListenerOptions, Node, Surface};
use log::debug;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

const ANNOUNCEMENT_MS: EpochMillis = 1_000;

pub struct NavComponent {
    surface: Rc<RefCell<Surface>>,
    clock: Rc<dyn Clock>,
    active: RefCell<Option<String>>,
    badges: RefCell<BTreeMap<String, usize>>,
    clear_announcement_at: Cell<Option<EpochMillis>>,
    listeners: RefCell<Vec<ListenerId>>,
    subscription: RefCell<Option<Subscription>>,
}

impl NavComponent {
    pub fn new(surface: Rc<RefCell<Surface>>, clock: Rc<dyn Clock>) -> Self {
        Self {
            surface,
            clock,
            active: RefCell::new(None),
            badges: RefCell::new(BTreeMap::new()),
            clear_announcement_at: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
            subscription: RefCell::new(None),
        }
    }

    /// Registers click and key handling on `#main-nav`.
    pub fn install(&self) -> bool {
        let mut surface = self.surface.borrow_mut();
        let click = surface.add_listener(
            MAIN_NAV,
            EventKind::Click,
            ListenerOptions::default(),
            Rc::new(|event| {
                if !event.has_class("nav-item") {
                    return None;
                }
                event.data("view").map(Intent::navigate)
            }),
        );
        let keys = surface.add_listener(
            MAIN_NAV,
            EventKind::KeyDown,
            ListenerOptions::default(),
            Rc::new(|event| event.key.clone().map(Intent::NavKey)),
        );
        let mut listeners = self.listeners.borrow_mut();
        listeners.extend(click);
        listeners.extend(keys);
        listeners.len() == 2
    }

    /// Follows `routeChange` on `router` until dropped.
    pub fn attach(self: &Rc<Self>, router: &HashRouter) {
        let weak: Weak<Self> = Rc::downgrade(self);
        let subscription = router.on_route_change(move |route| {
            if let Some(nav) = weak.upgrade() {
                nav.set_active_item(&route.path);
            }
        });
        *self.subscription.borrow_mut() = Some(subscription);
    }

    pub fn active_route(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    /// Marks `route` active; routes without an entry clear the marker.
    pub fn set_active_item(&self, route: &str) {
        let entry = NAV_ITEMS.iter().find(|(candidate, _)| *candidate == route);
        let next = entry.map(|(candidate, _)| candidate.to_string());
        let changed = *self.active.borrow() != next;

        {
            let mut surface = self.surface.borrow_mut();
            for (candidate, _) in NAV_ITEMS {
                let id = nav_item_id(candidate);
                if Some(candidate) == next.as_deref() {
                    surface.add_class(&id, "active");
                    surface.set_attr(&id, "aria-current", "page");
                } else {
                    surface.remove_class(&id, "active");
                    surface.set_attr(&id, "aria-current", "false");
                }
            }
        }
        *self.active.borrow_mut() = next;

        if changed {
            if let Some(name) = entry.map(|(candidate, _)| page_name(candidate)) {
                self.announce(&format!("{name} 페이지로 이동했습니다."));
            }
        }
    }

    pub fn announce(&self, message: &str) {
        self.surface.borrow_mut().set_text(NAV_ANNOUNCER, message);
        self.clear_announcement_at
            .set(Some(self.clock.now_ms().saturating_add(ANNOUNCEMENT_MS)));
    }

    pub fn announcement(&self) -> String {
        self.surface
            .borrow()
            .element(NAV_ANNOUNCER)
            .map(|element| element.text.clone())
            .unwrap_or_default()
    }

    /// Clears an announcement whose display time has passed.
    pub fn tick(&self, now: EpochMillis) {
        if self.clear_announcement_at.get().is_some_and(|due| now >= due) {
            self.clear_announcement_at.set(None);
            self.surface.borrow_mut().set_text(NAV_ANNOUNCER, "");
        }
    }

    /// Moves focus for arrow/Home/End; Enter and Space yield the focused
    /// entry's route.
    pub fn handle_key(&self, key: &KeyPress) -> Option<String> {
        let enabled = self.enabled_routes();
        if enabled.is_empty() {
            return None;
        }
        let mut surface = self.surface.borrow_mut();
        let current = surface.focused().and_then(|focused| {
            enabled
                .iter()
                .position(|route| nav_item_id(route) == focused)
        });

        let last = enabled.len() - 1;
        let target = match key.key.as_str() {
            "ArrowRight" | "ArrowDown" => current.map_or(0, |index| (index + 1) % enabled.len()),
            "ArrowLeft" | "ArrowUp" => current.map_or(last, |index| {
                if index == 0 {
                    last
                } else {
                    index - 1
                }
            }),
            "Home" => 0,
            "End" => last,
            "Enter" | " " => {
                return current.map(|index| enabled[index].to_string());
            }
            _ => return None,
        };
        surface.focus(&nav_item_id(enabled[target]));
        debug!(
            "event=nav_focus module=nav status=ok route={}",
            enabled[target]
        );
        None
    }

    /// Shows `count` next to the entry; zero removes the badge.
    pub fn set_badge(&self, route: &str, count: usize) {
        let id = nav_item_id(route);
        let content = if count == 0 {
            Vec::new()
        } else {
            vec![Node::el("span")
                .class("nav-badge")
                .attr("aria-label", format!("{count}개의 새로운 항목"))
                .with_text(count.to_string())]
        };
        if self.surface.borrow_mut().set_content(&id, content) {
            let mut badges = self.badges.borrow_mut();
            if count == 0 {
                badges.remove(route);
            } else {
                badges.insert(route.to_string(), count);
            }
        }
    }

    pub fn badge(&self, route: &str) -> Option<usize> {
        self.badges.borrow().get(route).copied()
    }

    pub fn set_disabled(&self, route: &str, disabled: bool) {
        let id = nav_item_id(route);
        let mut surface = self.surface.borrow_mut();
        surface.set_disabled(&id, disabled);
        if disabled {
            surface.set_attr(&id, "disabled", "");
            surface.set_attr(&id, "aria-disabled", "true");
        } else {
            surface.remove_attr(&id, "disabled");
            surface.remove_attr(&id, "aria-disabled");
        }
    }

    fn enabled_routes(&self) -> Vec<&'static str> {
        let surface = self.surface.borrow();
        NAV_ITEMS
            .iter()
            .map(|(route, _)| *route)
            .filter(|route| {
                surface
                    .element(&nav_item_id(route))
                    .is_some_and(|element| !element.disabled)
            })
            .collect()
    }
}

impl Drop for NavComponent {
    fn drop(&mut self) {
        if let Ok(mut surface) = self.surface.try_borrow_mut() {
            for id in self.listeners.get_mut().drain(..) {
                surface.remove_listener(id);
            }
        }
    }
}

fn page_name(route: &str) -> &'static str {
    match route {
        "inbox" => "Inbox - 생각 포착",
        "actions" => "Actions - 할 일 관리",
        "projects" => "Projects - 프로젝트 관리",
        "review" => "Review - 진행 상황 검토",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::NavComponent;
    use crate::clock::ManualClock;
    use crate::ui::layout::{nav_item_id, NAV_ANNOUNCER};
    use crate::ui::{KeyPress, Surface};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn nav() -> (NavComponent, Rc<RefCell<Surface>>, Rc<ManualClock>) {
        let surface = Rc::new(RefCell::new(Surface::with_default_layout()));
        let clock = Rc::new(ManualClock::new(0));
        (NavComponent::new(Rc::clone(&surface), clock.clone()), surface, clock)
    }

    #[test]
    fn active_item_is_exclusive_and_announced_once() {
        let (nav, surface, clock) = nav();
        nav.set_active_item("actions");
        nav.set_active_item("review");

        let surface_ref = surface.borrow();
        let actions = surface_ref.element(&nav_item_id("actions")).unwrap();
        let review = surface_ref.element(&nav_item_id("review")).unwrap();
        assert!(!actions.has_class("active"));
        assert!(review.has_class("active"));
        assert_eq!(review.attrs.get("aria-current").map(String::as_str), Some("page"));
        drop(surface_ref);

        assert_eq!(nav.announcement(), "Review - 진행 상황 검토 페이지로 이동했습니다.");
        clock.set(999);
        nav.tick(999);
        assert!(!nav.announcement().is_empty());
        nav.tick(1_000);
        assert_eq!(surface.borrow().element(NAV_ANNOUNCER).unwrap().text, "");
    }

    #[test]
    fn arrow_keys_wrap_and_skip_disabled_entries() {
        let (nav, surface, _clock) = nav();
        nav.set_disabled("actions", true);

        surface.borrow_mut().focus(&nav_item_id("inbox"));
        assert_eq!(nav.handle_key(&KeyPress::new("ArrowRight")), None);
        assert_eq!(surface.borrow().focused(), Some("nav-projects"));

        nav.handle_key(&KeyPress::new("End"));
        nav.handle_key(&KeyPress::new("ArrowRight"));
        assert_eq!(surface.borrow().focused(), Some("nav-inbox"));

        nav.handle_key(&KeyPress::new("ArrowLeft"));
        assert_eq!(surface.borrow().focused(), Some("nav-review"));
        assert_eq!(nav.handle_key(&KeyPress::new("Enter")), Some("review".to_string()));
    }

    #[test]
    fn badge_renders_and_clears() {
        let (nav, surface, _clock) = nav();
        nav.set_badge("inbox", 3);
        let html = surface
            .borrow()
            .element(&nav_item_id("inbox"))
            .unwrap()
            .inner_html();
        assert!(html.as_str().contains("3개의 새로운 항목"));
        assert_eq!(nav.badge("inbox"), Some(3));

        nav.set_badge("inbox", 0);
        assert_eq!(nav.badge("inbox"), None);
    }
}
