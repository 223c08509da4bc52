//! The element ids the screens and navigation expect to exist.

use crate::ui::surface::{Element, Surface};

pub const ROOT: &str = "app";
pub const MAIN_NAV: &str = "main-nav";
pub const NAV_ANNOUNCER: &str = "nav-announcer";
pub const LOADING: &str = "loading";
pub const LOADING_MESSAGE: &str = "loading-message";
pub const TOAST: &str = "toast";
pub const APP_ERROR: &str = "app-error";

pub const INBOX_VIEW: &str = "inbox-view";
pub const CAPTURE_FORM: &str = "capture-form";
pub const THING_TITLE: &str = "thing-title";
pub const THING_DESCRIPTION: &str = "thing-description";
pub const CAPTURE_SUBMIT: &str = "capture-submit";
pub const THING_LIST: &str = "thing-list";

pub const CLARIFY_VIEW: &str = "clarify-view";
pub const CLARIFY_BACK: &str = "clarify-back";
pub const CLARIFY_CONTENT: &str = "clarify-content";

pub const ACTIONS_VIEW: &str = "actions-view";
pub const FILTER_BAR: &str = "filter-bar";
pub const ACTION_LIST: &str = "action-list";

pub const PROJECTS_VIEW: &str = "projects-view";
pub const PROJECT_LIST: &str = "project-list";

pub const REVIEW_VIEW: &str = "review-view";
pub const REVIEW_CONTENT: &str = "review-content";

pub const TITLE_MAX_LENGTH: usize = 200;
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;

/// Navigation entries as `(route, label)`.
pub const NAV_ITEMS: [(&str, &str); 4] = [
    ("inbox", "Inbox"),
    ("actions", "Actions"),
    ("projects", "Projects"),
    ("review", "Review"),
];

pub fn nav_item_id(route: &str) -> String {
    format!("nav-{route}")
}

pub fn filter_button_id(filter: &str) -> String {
    format!("filter-{filter}")
}

impl Surface {
    /// Builds the application shell.
    pub fn with_default_layout() -> Self {
        let mut surface = Surface::new();
        let root = Some(ROOT);
        surface.append(None, Element::new(ROOT, "main"));

        surface.append(
            root,
            Element::new(MAIN_NAV, "nav")
                .class("main-nav")
                .attr("aria-label", "주요 메뉴"),
        );
        for (route, label) in NAV_ITEMS {
            surface.append(
                Some(MAIN_NAV),
                Element::new(&nav_item_id(route), "button")
                    .class("nav-item")
                    .data("view", route)
                    .attr("aria-current", "false")
                    .text(label),
            );
        }
        surface.append(
            root,
            Element::new(NAV_ANNOUNCER, "div")
                .class("sr-only")
                .attr("aria-live", "polite"),
        );
        surface.append(
            root,
            Element::new(LOADING, "div")
                .class("loading")
                .attr("aria-hidden", "true"),
        );
        surface.append(
            Some(LOADING),
            Element::new(LOADING_MESSAGE, "div").class("loading-message"),
        );
        surface.append(
            root,
            Element::new(TOAST, "div")
                .class("toast")
                .attr("role", "status")
                .attr("aria-hidden", "true"),
        );
        surface.append(root, Element::new(APP_ERROR, "div").class("app-error").hidden());

        add_inbox(&mut surface);
        add_clarify(&mut surface);
        add_actions(&mut surface);
        surface.append(root, Element::new(PROJECTS_VIEW, "section").class("view").hidden());
        surface.append(
            Some(PROJECTS_VIEW),
            Element::new(PROJECT_LIST, "div").attr("role", "list"),
        );
        surface.append(root, Element::new(REVIEW_VIEW, "section").class("view").hidden());
        surface.append(Some(REVIEW_VIEW), Element::new(REVIEW_CONTENT, "div"));
        surface
    }
}

fn add_inbox(surface: &mut Surface) {
    surface.append(Some(ROOT), Element::new(INBOX_VIEW, "section").class("view").hidden());
    surface.append(Some(INBOX_VIEW), Element::new(CAPTURE_FORM, "form"));
    surface.append(
        Some(CAPTURE_FORM),
        Element::new(THING_TITLE, "input")
            .name("title")
            .required()
            .max_length(TITLE_MAX_LENGTH)
            .attr("placeholder", "무엇이 떠오르나요?"),
    );
    surface.append(
        Some(CAPTURE_FORM),
        Element::new(THING_DESCRIPTION, "textarea")
            .name("description")
            .max_length(DESCRIPTION_MAX_LENGTH),
    );
    surface.append(
        Some(CAPTURE_FORM),
        Element::new(CAPTURE_SUBMIT, "button")
            .class("btn btn-primary")
            .attr("type", "submit")
            .text("추가"),
    );
    surface.append(
        Some(INBOX_VIEW),
        Element::new(THING_LIST, "div").attr("role", "list"),
    );
}

fn add_clarify(surface: &mut Surface) {
    surface.append(Some(ROOT), Element::new(CLARIFY_VIEW, "section").class("view").hidden());
    surface.append(
        Some(CLARIFY_VIEW),
        Element::new(CLARIFY_BACK, "button")
            .class("btn btn-secondary")
            .text("← Inbox로 돌아가기"),
    );
    surface.append(Some(CLARIFY_VIEW), Element::new(CLARIFY_CONTENT, "div"));
}

fn add_actions(surface: &mut Surface) {
    surface.append(Some(ROOT), Element::new(ACTIONS_VIEW, "section").class("view").hidden());
    surface.append(
        Some(ACTIONS_VIEW),
        Element::new(FILTER_BAR, "div")
            .class("filter-bar")
            .attr("role", "toolbar"),
    );
    for (filter, label) in [
        ("all", "전체"),
        ("todo", "해야됨"),
        ("doing", "수행중"),
        ("done", "완료"),
    ] {
        let mut button = Element::new(&filter_button_id(filter), "button")
            .class("filter-btn")
            .data("filter", filter)
            .text(label);
        if filter == "all" {
            button = button.class("active");
        }
        surface.append(Some(FILTER_BAR), button);
    }
    surface.append(
        Some(ACTIONS_VIEW),
        Element::new(ACTION_LIST, "div").attr("role", "list"),
    );
}

#[cfg(test)]
mod tests {
    use super::{nav_item_id, NAV_ITEMS};
    use crate::ui::surface::Surface;

    #[test]
    fn default_layout_installs_every_contract_id() {
        let surface = Surface::with_default_layout();
        for id in [
            "loading",
            "toast",
            "main-nav",
            "nav-announcer",
            "app-error",
            "inbox-view",
            "capture-form",
            "thing-title",
            "thing-description",
            "thing-list",
            "clarify-view",
            "clarify-back",
            "clarify-content",
            "actions-view",
            "filter-bar",
            "action-list",
            "projects-view",
            "project-list",
            "review-view",
            "review-content",
        ] {
            assert!(surface.contains(id), "missing #{id}");
        }
        for (route, _) in NAV_ITEMS {
            assert!(surface.contains(&nav_item_id(route)));
        }
    }

    #[test]
    fn views_start_hidden_and_first_focusable_is_the_title() {
        let surface = Surface::with_default_layout();
        assert!(!surface.is_displayed("thing-title"));
        assert_eq!(
            surface.focusable_descendants("inbox-view").first().map(String::as_str),
            Some("thing-title")
        );
    }
}
