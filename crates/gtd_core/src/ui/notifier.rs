//! Toast notifications.
//!
//! # Invariants
//! - At most one toast is visible; showing a new one replaces it.
//! - A toast with a non-zero duration hides once `expire(now)` reaches its
//!   deadline; a zero duration stays until hidden.

use crate::clock::{Clock, EpochMillis};
use crate::config::UiConfig;
use crate::ui::intent::Intent;
use crate::ui::layout::TOAST;
use crate::ui::surface::{EventKind, ListenerOptions, Surface};
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: EpochMillis,
    pub hide_at: Option<EpochMillis>,
}

pub struct Notifier {
    surface: Rc<RefCell<Surface>>,
    clock: Rc<dyn Clock>,
    durations: [Duration; 4],
    current: RefCell<Option<Toast>>,
    history: RefCell<VecDeque<Toast>>,
}

impl Notifier {
    pub fn new(surface: Rc<RefCell<Surface>>, clock: Rc<dyn Clock>, ui: &UiConfig) -> Self {
        let info = Duration::from_millis(ui.toast_ms);
        Self {
            surface,
            clock,
            durations: [
                info,
                Duration::from_millis(ui.error_toast_ms),
                Duration::from_millis(ui.warning_toast_ms),
                info,
            ],
            current: RefCell::new(None),
            history: RefCell::new(VecDeque::new()),
        }
    }

    /// Registers the click-to-dismiss listener on `#toast`.
    pub fn install(&self) -> bool {
        self.surface
            .borrow_mut()
            .add_listener(
                TOAST,
                EventKind::Click,
                ListenerOptions::default(),
                Rc::new(|_| Some(Intent::DismissToast)),
            )
            .is_some()
    }

    pub fn default_duration(&self, kind: ToastKind) -> Duration {
        match kind {
            ToastKind::Success => self.durations[0],
            ToastKind::Error => self.durations[1],
            ToastKind::Warning => self.durations[2],
            ToastKind::Info => self.durations[3],
        }
    }

    pub fn show(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        let now = self.clock.now_ms();
        let toast = Toast {
            message: message.into(),
            kind,
            shown_at: now,
            hide_at: (!duration.is_zero())
                .then(|| now.saturating_add(crate::clock::duration_to_millis(duration))),
        };
        debug!("event=toast_show module=ui status=ok kind={}", kind.as_str());

        {
            let mut surface = self.surface.borrow_mut();
            if let Some(element) = surface.element_mut(TOAST) {
                element.text = toast.message.clone();
                element.classes.clear();
                element.classes.extend(
                    ["toast".to_string(), format!("toast-{}", kind.as_str()), "show".to_string()],
                );
                element.attrs.insert("aria-hidden".into(), "false".into());
            } else {
                warn!("event=toast_show module=ui status=missing_container");
            }
        }

        let mut history = self.history.borrow_mut();
        history.push_front(toast.clone());
        history.truncate(HISTORY_LIMIT);
        *self.current.borrow_mut() = Some(toast);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success, self.default_duration(ToastKind::Success));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error, self.default_duration(ToastKind::Error));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Warning, self.default_duration(ToastKind::Warning));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Info, self.default_duration(ToastKind::Info));
    }

    pub fn hide(&self) {
        if self.current.borrow_mut().take().is_none() {
            return;
        }
        let mut surface = self.surface.borrow_mut();
        surface.remove_class(TOAST, "show");
        surface.set_attr(TOAST, "aria-hidden", "true");
    }

    /// Hides the current toast if its deadline has passed.
    pub fn expire(&self, now: EpochMillis) -> bool {
        let due = self
            .current
            .borrow()
            .as_ref()
            .and_then(|toast| toast.hide_at)
            .is_some_and(|deadline| now >= deadline);
        if due {
            self.hide();
        }
        due
    }

    pub fn current(&self) -> Option<Toast> {
        self.current.borrow().clone()
    }

    /// Most recent toasts first, including ones already replaced.
    pub fn recent(&self, limit: usize) -> Vec<Toast> {
        self.history.borrow().iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Notifier, ToastKind};
    use crate::clock::{Clock, ManualClock};
    use crate::config::UiConfig;
    use crate::ui::surface::Surface;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn notifier() -> (Notifier, Rc<ManualClock>, Rc<RefCell<Surface>>) {
        let surface = Rc::new(RefCell::new(Surface::with_default_layout()));
        let clock = Rc::new(ManualClock::new(1_000));
        let notifier = Notifier::new(
            Rc::clone(&surface),
            Rc::clone(&clock) as Rc<dyn Clock>,
            &UiConfig::default(),
        );
        (notifier, clock, surface)
    }

    #[test]
    fn error_toast_lasts_five_seconds() {
        let (notifier, clock, surface) = notifier();
        notifier.error("boom");

        let toast = notifier.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.hide_at, Some(6_000));
        assert!(surface.borrow().element("toast").unwrap().has_class("toast-error"));

        clock.advance(Duration::from_millis(4_999));
        assert!(!notifier.expire(clock.now_ms()));
        clock.advance(Duration::from_millis(1));
        assert!(notifier.expire(clock.now_ms()));
        assert!(notifier.current().is_none());
        assert_eq!(
            surface.borrow().element("toast").unwrap().attrs.get("aria-hidden").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn zero_duration_is_sticky_and_new_toast_replaces_old() {
        let (notifier, _clock, _surface) = notifier();
        notifier.show("sticky", ToastKind::Warning, Duration::ZERO);
        assert!(!notifier.expire(i64::MAX));

        notifier.success("next");
        assert_eq!(notifier.current().unwrap().message, "next");
        assert_eq!(notifier.recent(5).len(), 2);
    }
}
