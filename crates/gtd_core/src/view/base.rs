//! Shared screen state: element binding, visibility and listener bookkeeping.
//!
//! # Invariants
//! - Every listener registered through `listen*` is recorded and removed by
//!   `cleanup_listeners`, so a hidden screen leaves no handler behind.
//! - A keyed listener replaces the previous listener under the same key.

use super::{Services, ViewState};
use crate::api::ApiResult;
use crate::ui::{DomEvent, EventKind, Intent, ListenerId, ListenerOptions, Node};
use log::{error, warn};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::rc::Rc;

pub const REQUIRED_MESSAGE: &str = "이 입력란을 작성하세요.";
pub const FALLBACK_ERROR_MESSAGE: &str = "알 수 없는 오류가 발생했습니다.";
pub const DEFAULT_LOADING_MESSAGE: &str = "데이터를 로드하는 중...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub element: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValidation {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
    /// Field values keyed by field name.
    pub data: BTreeMap<String, String>,
}

impl FormValidation {
    pub fn field(&self, name: &str) -> &str {
        self.data.get(name).map(String::as_str).unwrap_or_default()
    }
}

pub struct ViewCore {
    name: &'static str,
    element: Option<String>,
    state: ViewState,
    listeners: Vec<ListenerId>,
    keyed: BTreeMap<&'static str, ListenerId>,
    services: Services,
}

impl ViewCore {
    /// Binds to `element_id` when it exists; an unbound screen never shows.
    pub fn new(name: &'static str, element_id: &str, services: Services) -> Self {
        let element = services
            .surface()
            .borrow()
            .contains(element_id)
            .then(|| element_id.to_string());
        if element.is_none() {
            warn!("event=view_bind module=view status=missing_element view={name} id={element_id}");
        }
        Self {
            name,
            element,
            state: ViewState::Hidden,
            listeners: Vec::new(),
            keyed: BTreeMap::new(),
            services,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.element.is_some()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == ViewState::Visible
    }

    pub(crate) fn set_state(&mut self, state: ViewState) {
        self.state = state;
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// `id` if it exists inside this screen.
    pub fn find(&self, id: &str) -> Option<String> {
        let root = self.element.as_deref()?;
        let surface = self.services.surface().borrow();
        (surface.contains(id) && surface.is_within(id, root)).then(|| id.to_string())
    }

    /// Elements inside this screen carrying `class`.
    pub fn find_all(&self, class: &str) -> Vec<String> {
        match self.element.as_deref() {
            Some(root) => self.services.surface().borrow().find_by_class(root, class),
            None => Vec::new(),
        }
    }

    pub fn listen(
        &mut self,
        target: &str,
        kind: EventKind,
        handler: impl Fn(&DomEvent) -> Option<Intent> + 'static,
    ) -> bool {
        self.listen_with(target, kind, ListenerOptions::default(), handler)
    }

    pub fn listen_with(
        &mut self,
        target: &str,
        kind: EventKind,
        options: ListenerOptions,
        handler: impl Fn(&DomEvent) -> Option<Intent> + 'static,
    ) -> bool {
        let id = self
            .services
            .surface()
            .borrow_mut()
            .add_listener(target, kind, options, Rc::new(handler));
        match id {
            Some(id) => {
                self.listeners.push(id);
                true
            }
            None => false,
        }
    }

    /// Delegated listener for a re-rendered container.
    pub fn listen_keyed(
        &mut self,
        key: &'static str,
        target: &str,
        kind: EventKind,
        handler: impl Fn(&DomEvent) -> Option<Intent> + 'static,
    ) -> bool {
        self.unlisten_keyed(key);
        let id = self.services.surface().borrow_mut().add_listener(
            target,
            kind,
            ListenerOptions::default(),
            Rc::new(handler),
        );
        match id {
            Some(id) => {
                self.keyed.insert(key, id);
                true
            }
            None => false,
        }
    }

    pub fn unlisten_keyed(&mut self, key: &'static str) {
        if let Some(previous) = self.keyed.remove(key) {
            self.services.surface().borrow_mut().remove_listener(previous);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len() + self.keyed.len()
    }

    /// Removes every listener registered since the last cleanup.
    pub fn cleanup_listeners(&mut self) -> usize {
        let mut surface = self.services.surface().borrow_mut();
        let mut removed = 0;
        for id in self.listeners.drain(..).chain(std::mem::take(&mut self.keyed).into_values()) {
            if surface.remove_listener(id) {
                removed += 1;
            }
        }
        removed
    }

    /// Focuses the first focusable element unless focus is already inside.
    pub fn manage_focus(&self) -> Option<String> {
        let root = self.element.as_deref()?;
        let mut surface = self.services.surface().borrow_mut();
        if let Some(focused) = surface.focused() {
            if surface.is_within(focused, root) {
                return Some(focused.to_string());
            }
        }
        let first = surface
            .focusable_descendants(root)
            .into_iter()
            .find(|id| surface.is_displayed(id))?;
        surface.focus(&first);
        Some(first)
    }

    pub fn focus(&self, id: &str) -> bool {
        self.services.surface().borrow_mut().focus(id)
    }

    /// Checks the named fields of `form_id` for required and max-length.
    pub fn validate_form(&self, form_id: &str) -> FormValidation {
        let surface = self.services.surface().borrow();
        let mut validation = FormValidation::default();

        for id in surface.descendants(form_id) {
            let Some(field) = surface.element(&id) else {
                continue;
            };
            let Some(name) = field.name.as_deref() else {
                continue;
            };
            if field.required && field.value.trim().is_empty() {
                validation.errors.push(FieldError {
                    element: id.clone(),
                    message: REQUIRED_MESSAGE.to_string(),
                });
            } else if let Some(max) = field.max_length {
                if field.value.chars().count() > max {
                    validation.errors.push(FieldError {
                        element: id.clone(),
                        message: format!("{max}자 이하로 입력해 주세요."),
                    });
                }
            }
            validation
                .data
                .insert(name.to_string(), field.value.clone());
        }

        validation.is_valid = validation.errors.is_empty();
        validation
    }

    /// Logs `err` and shows it as an error toast.
    pub fn handle_error(&self, err: &dyn Display, context: &str) {
        error!(
            "event=view_error module=view status=error view={} context={context} error={err}",
            self.name
        );
        let message = err.to_string();
        if message.is_empty() {
            self.services.notifier().error(FALLBACK_ERROR_MESSAGE);
        } else {
            self.services.notifier().error(message);
        }
    }

    /// Runs `future` under the loading overlay. Failures are surfaced to the
    /// user and then returned so the caller can branch on them.
    pub async fn load_with_state<T, F>(&self, future: F, message: &str) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let message = if message.is_empty() {
            DEFAULT_LOADING_MESSAGE
        } else {
            message
        };
        let result = self.services.busy().wrap(future, Some(message)).await;
        if let Err(err) = &result {
            self.handle_error(err, message);
        }
        result
    }

    pub fn render(&self, container: &str, content: Vec<Node>) -> bool {
        if self.find(container).is_none() {
            warn!(
                "event=view_render module=view status=missing_element view={} id={container}",
                self.name
            );
            return false;
        }
        self.services.surface().borrow_mut().set_content(container, content)
    }

    pub fn navigate(&self, path: &str) {
        self.services
            .router()
            .navigate(path, std::iter::empty::<(String, String)>());
    }

    pub fn record_activity(&self, activity: impl Into<String>) {
        self.services.cache().save_recent_activity(activity);
    }
}
