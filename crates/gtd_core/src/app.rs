//! Application orchestrator.
//!
//! # Responsibility
//! - Wire services, screens and the navigation bar together.
//! - Turn fragment changes into `hide all -> show one` transitions and
//!   route DOM intents to the router, the navigation bar or the visible
//!   screen.
//! - Own process-level concerns: shortcuts, connectivity toasts, timers
//!   and bootstrap failure reporting.
//!
//! # Invariants
//! - Events are processed one at a time to completion. A navigation
//!   requested while a screen awaits the API is queued and applied after
//!   that screen finishes.
//! - Redirects away from unknown routes are capped per pump by
//!   `ui.max_redirects`.

use crate::api::{ApiError, GtdApi, HttpApiClient};
use crate::clock::{Clock, EpochMillis};
use crate::config::{AppConfig, ConfigError, StorageConfig};
use crate::nav::NavComponent;
use crate::router::{HashRouter, Route, RouteError, Subscription, DEFAULT_ROUTE};
use crate::storage::{
    KeyValueStore, LocalCache, MemoryKeyValueStore, SqliteKeyValueStore, StorageError,
};
use crate::ui::layout::{APP_ERROR, ROOT, THING_TITLE};
use crate::ui::{
    DomEvent, EventKind, Intent, KeyPress, ListenerOptions, Node, Prompter, Surface, Throttle,
};
use crate::view::{
    ActionsView, ClarifyView, InboxView, ProjectsView, ReviewView, Services, View,
};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::Display;
use std::rc::Rc;
use std::time::Duration;

pub const GENERIC_ERROR_MESSAGE: &str = "오류가 발생했습니다. 페이지를 새로고침해주세요.";
pub const ONLINE_MESSAGE: &str = "인터넷 연결이 복구되었습니다.";
pub const OFFLINE_MESSAGE: &str = "인터넷 연결이 끊어졌습니다.";

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("storage initialisation failed: {0}")]
    Storage(#[from] StorageError),
    #[error("API client initialisation failed: {0}")]
    Api(#[from] ApiError),
    #[error("initial route failed: {0}")]
    Route(#[from] RouteError),
}

/// Host-facing view of the current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppSnapshot {
    pub fragment: String,
    pub route: String,
    pub params: BTreeMap<String, String>,
    pub visible_view: Option<String>,
    pub nav_active: Option<String>,
    pub toast: Option<String>,
    pub toast_kind: Option<String>,
    pub loading: bool,
    pub loading_message: Option<String>,
    pub focused: Option<String>,
    pub announcement: String,
    pub online: bool,
    /// Markup of the visible screen, or empty when none is visible.
    pub html: String,
}

pub struct App {
    services: Services,
    nav: Rc<NavComponent>,
    views: Vec<Box<dyn View>>,
    visible: Option<usize>,
    pending: Rc<RefCell<VecDeque<Route>>>,
    _route_subscription: Subscription,
    error_toasts: Throttle,
    online: bool,
    started: bool,
}

impl App {
    pub fn new(services: Services) -> Self {
        let nav = Rc::new(NavComponent::new(
            Rc::clone(services.surface()),
            Rc::clone(services.clock()),
        ));
        nav.attach(services.router());

        let pending: Rc<RefCell<VecDeque<Route>>> = Rc::new(RefCell::new(VecDeque::new()));
        let queue = Rc::clone(&pending);
        let route_subscription = services
            .router()
            .on_route_change(move |route| queue.borrow_mut().push_back(route.clone()));

        let views: Vec<Box<dyn View>> = vec![
            Box::new(InboxView::new(services.clone())),
            Box::new(ClarifyView::new(services.clone())),
            Box::new(ActionsView::new(services.clone())),
            Box::new(ProjectsView::new(services.clone())),
            Box::new(ReviewView::new(services.clone())),
        ];
        let error_toasts = Throttle::new(Duration::from_millis(services.ui().error_toast_ms));

        Self {
            services,
            nav,
            views,
            visible: None,
            pending,
            _route_subscription: route_subscription,
            error_toasts,
            online: true,
            started: false,
        }
    }

    /// Builds the app on top of `config`, an API implementation and a host
    /// prompter. The surface starts from the default layout at `fragment`.
    pub fn bootstrap(
        config: &AppConfig,
        api: Rc<dyn GtdApi>,
        prompter: Rc<dyn Prompter>,
        clock: Rc<dyn Clock>,
        fragment: &str,
    ) -> Result<Self, BootstrapError> {
        config.validate()?;
        let store = open_store(&config.storage)?;
        let cache = Rc::new(LocalCache::new(store, &config.storage, Rc::clone(&clock)));
        let surface = Rc::new(RefCell::new(Surface::with_default_layout()));
        let router = Rc::new(HashRouter::new(fragment));
        let services = Services::new(
            api,
            cache,
            router,
            surface,
            prompter,
            clock,
            config.ui.clone(),
        );
        info!(
            "event=app_bootstrap module=app status=ok persistent_store={}",
            config.storage.path.is_some()
        );
        Ok(Self::new(services))
    }

    /// `bootstrap` against the HTTP backend named in `config.api`.
    pub fn connect(
        config: &AppConfig,
        prompter: Rc<dyn Prompter>,
        clock: Rc<dyn Clock>,
        fragment: &str,
    ) -> Result<Self, BootstrapError> {
        let api = HttpApiClient::new(&config.api)?;
        Self::bootstrap(config, Rc::new(api), prompter, clock, fragment)
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn nav(&self) -> &NavComponent {
        &self.nav
    }

    pub fn view(&self, name: &str) -> Option<&dyn View> {
        self.views
            .iter()
            .find(|view| view.name() == name)
            .map(|view| view.as_ref())
    }

    pub fn visible_view(&self) -> Option<&'static str> {
        self.visible.map(|index| self.views[index].name())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Installs global handlers and shows the screen for the initial
    /// fragment.
    pub async fn start(&mut self) -> Result<usize, RouteError> {
        if self.started {
            return Ok(0);
        }
        self.started = true;
        self.services.notifier().install();
        self.nav.install();
        self.install_shortcuts();

        let initial = self.services.router().resolve();
        info!(
            "event=app_start module=app status=start path={}",
            initial.path
        );
        self.pump().await
    }

    fn install_shortcuts(&self) {
        let cache = Rc::clone(self.services.cache());
        self.services.surface().borrow_mut().add_listener(
            ROOT,
            EventKind::KeyDown,
            ListenerOptions::default(),
            Rc::new(move |event| {
                let key = event.key.as_ref()?;
                if !key.has_command_modifier() || !cache.user_settings().keyboard_shortcuts {
                    return None;
                }
                shortcut_intent(key)
            }),
        );
    }

    /// Applies queued route changes and any fragment change not yet seen.
    /// Returns how many routes were applied.
    pub async fn pump(&mut self) -> Result<usize, RouteError> {
        let limit = self.services.ui().max_redirects;
        let mut applied = 0;
        let mut redirects = 0;

        loop {
            self.services.router().poll();
            let next = self.pending.borrow_mut().pop_front();
            let Some(route) = next else {
                break;
            };

            match self.apply_route(&route).await {
                Ok(()) => applied += 1,
                Err(RouteError::RouteNotFound(path)) => {
                    if redirects >= limit {
                        error!(
                            "event=route_redirect module=app status=limit path={path} limit={limit}"
                        );
                        return Err(RouteError::RedirectLimit { path, limit });
                    }
                    redirects += 1;
                    warn!(
                        "event=route_redirect module=app status=not_found path={path} attempt={redirects}"
                    );
                    self.services
                        .router()
                        .navigate(DEFAULT_ROUTE, std::iter::empty::<(String, String)>());
                }
                Err(other) => return Err(other),
            }
        }
        Ok(applied)
    }

    async fn apply_route(&mut self, route: &Route) -> Result<(), RouteError> {
        let Some(index) = self.views.iter().position(|view| view.name() == route.path) else {
            return Err(RouteError::RouteNotFound(route.path.clone()));
        };

        for view in &mut self.views {
            if let Err(err) = view.hide().await {
                warn!(
                    "event=view_hide module=app status=error view={} error={err}",
                    view.name()
                );
            }
        }

        self.visible = Some(index);
        let view = &mut self.views[index];
        match view.show(route).await {
            Ok(()) => debug!("event=view_show module=app status=ok view={}", view.name()),
            Err(err) => warn!(
                "event=view_show module=app status=error view={} error={err}",
                view.name()
            ),
        }
        self.refresh_badges();
        Ok(())
    }

    fn refresh_badges(&self) {
        for view in &self.views {
            if let Some(count) = view.badge() {
                self.nav.set_badge(view.name(), count);
            }
        }
    }

    /// Dispatches `event` on the surface, applies the resulting intents in
    /// order, then any route change they caused.
    pub async fn dispatch(&mut self, event: &DomEvent) -> Result<usize, RouteError> {
        let intents = self.services.surface().borrow_mut().dispatch(event);
        debug!(
            "event=dispatch module=app status=ok kind={} target={} intents={}",
            event.kind.as_str(),
            event.target,
            intents.len()
        );
        for intent in intents {
            self.apply_intent(intent).await;
        }
        let applied = self.pump().await?;
        self.refresh_badges();
        Ok(applied)
    }

    async fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Navigate { path, params } => self.navigate_with(&path, params),
            Intent::DismissToast => self.services.notifier().hide(),
            Intent::NavKey(key) => {
                if let Some(route) = self.nav.handle_key(&key) {
                    self.navigate_with(&route, BTreeMap::new());
                }
            }
            other => match self.visible {
                Some(index) => {
                    let view = &mut self.views[index];
                    if let Err(err) = view.handle(other).await {
                        warn!(
                            "event=view_intent module=app status=error view={} error={err}",
                            view.name()
                        );
                    }
                }
                None => debug!("event=intent module=app status=no_visible_view"),
            },
        }
    }

    fn navigate_with(&self, path: &str, params: BTreeMap<String, String>) {
        let wants_input = params.get("focus").is_some_and(|value| value == "input");
        let changed = self.services.router().navigate(path, params);
        if !changed && wants_input {
            self.services.surface().borrow_mut().focus(THING_TITLE);
        }
    }

    /// Writes a route to the fragment and applies it.
    pub async fn navigate(&mut self, path: &str) -> Result<usize, RouteError> {
        self.navigate_with(path, BTreeMap::new());
        self.pump().await
    }

    /// Models an address-bar edit.
    pub async fn set_fragment(&mut self, fragment: &str) -> Result<usize, RouteError> {
        self.services.router().set_hash(fragment);
        self.pump().await
    }

    pub async fn back(&mut self) -> Result<usize, RouteError> {
        self.services.router().back();
        self.pump().await
    }

    pub async fn forward(&mut self) -> Result<usize, RouteError> {
        self.services.router().forward();
        self.pump().await
    }

    /// Clicks element `id`.
    pub async fn click(&mut self, id: &str) -> Result<usize, RouteError> {
        let event = self.services.surface().borrow().event_for(EventKind::Click, id);
        match event {
            Some(event) => self.dispatch(&event).await,
            None => {
                warn!("event=click module=app status=missing_element id={id}");
                Ok(0)
            }
        }
    }

    /// Clicks the `index`-th rendered node with `class` inside `container`.
    pub async fn click_rendered(
        &mut self,
        container: &str,
        class: &str,
        index: usize,
    ) -> Result<usize, RouteError> {
        let event = self
            .services
            .surface()
            .borrow()
            .event_for_rendered(EventKind::Click, container, class, index);
        match event {
            Some(event) => self.dispatch(&event).await,
            None => {
                warn!(
                    "event=click module=app status=missing_node container={container} class={class} index={index}"
                );
                Ok(0)
            }
        }
    }

    /// Sets the value of field `id` and fires `input` on it.
    pub async fn type_into(&mut self, id: &str, value: &str) -> Result<usize, RouteError> {
        if !self.services.surface().borrow_mut().set_value(id, value) {
            return Ok(0);
        }
        self.dispatch(&DomEvent::new(EventKind::Input, id)).await
    }

    pub async fn submit(&mut self, form_id: &str) -> Result<usize, RouteError> {
        self.dispatch(&DomEvent::new(EventKind::Submit, form_id)).await
    }

    /// Presses `key` on the focused element, or on the root without focus.
    pub async fn key_down(&mut self, key: KeyPress) -> Result<usize, RouteError> {
        let target = self
            .services
            .surface()
            .borrow()
            .focused()
            .unwrap_or(ROOT)
            .to_string();
        self.dispatch(&DomEvent::key_down(target, key)).await
    }

    pub async fn handle_shortcut(&mut self, key: KeyPress) -> Result<usize, RouteError> {
        self.key_down(key).await
    }

    /// Advances toasts, announcements and screen timers to `now`.
    pub fn tick(&mut self, now: EpochMillis) {
        self.services.notifier().expire(now);
        self.nav.tick(now);
        for view in &mut self.views {
            view.on_tick(now);
        }
    }

    /// `tick` at the current clock time.
    pub fn tick_now(&mut self) {
        let now = self.services.clock().now_ms();
        self.tick(now);
    }

    pub fn on_connectivity_change(&mut self, online: bool) {
        if online == self.online {
            return;
        }
        self.online = online;
        info!("event=connectivity module=app status=ok online={online}");
        if online {
            self.services.notifier().success(ONLINE_MESSAGE);
        } else {
            self.services.notifier().warning(OFFLINE_MESSAGE);
        }
    }

    /// Logs an error nothing else handled and shows the generic toast, at
    /// most once per error-toast duration.
    pub fn report_uncaught(&mut self, err: &dyn Display) {
        error!("event=uncaught module=app status=error error={err}");
        let now = self.services.clock().now_ms();
        if self.error_toasts.try_pass(now) {
            self.services.notifier().error(GENERIC_ERROR_MESSAGE);
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let route = self.services.router().current_route();
        let toast = self.services.notifier().current();
        let busy = self.services.busy();
        let surface = self.services.surface().borrow();
        let html = self
            .visible
            .and_then(|index| self.views[index].core().element())
            .and_then(|element| surface.render(element))
            .map(|html| html.into_string())
            .unwrap_or_default();

        AppSnapshot {
            fragment: self.services.router().fragment(),
            route: route.path,
            params: route.params,
            visible_view: self.visible_view().map(str::to_string),
            nav_active: self.nav.active_route(),
            toast: toast.as_ref().map(|toast| toast.message.clone()),
            toast_kind: toast.map(|toast| toast.kind.as_str().to_string()),
            loading: busy.is_loading(),
            loading_message: busy.message(),
            focused: surface.focused().map(str::to_string),
            announcement: self.nav.announcement(),
            online: self.online,
            html,
        }
    }
}

fn shortcut_intent(key: &KeyPress) -> Option<Intent> {
    let route = match key.key.as_str() {
        "1" => "inbox",
        "2" => "actions",
        "3" => "projects",
        "4" => "review",
        "n" | "N" => {
            return Some(Intent::Navigate {
                path: DEFAULT_ROUTE.to_string(),
                params: BTreeMap::from([("focus".to_string(), "input".to_string())]),
            });
        }
        _ => return None,
    };
    Some(Intent::navigate(route))
}

/// SQLite-backed store when a path is configured, in-memory otherwise.
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, StorageError> {
    match &config.path {
        Some(path) => Ok(Box::new(SqliteKeyValueStore::open(path)?)),
        None => Ok(Box::new(MemoryKeyValueStore::new())),
    }
}

/// Error message followed by its source chain, one cause per line.
pub fn bootstrap_error_report(err: &BootstrapError) -> String {
    let mut report = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        report.push_str("\n  caused by: ");
        report.push_str(&cause.to_string());
        source = cause.source();
    }
    report
}

/// Shows the bootstrap failure panel in `#app-error`.
pub fn render_bootstrap_error(surface: &mut Surface, err: &BootstrapError) -> bool {
    let panel = Node::el("div")
        .class("bootstrap-error")
        .attr("role", "alert")
        .child(Node::el("h1").with_text("🚨 앱 초기화 오류"))
        .child(
            Node::el("p")
                .child(Node::el("strong").with_text("오류:"))
                .with_text(format!(" {err}")),
        )
        .child(
            Node::el("details")
                .child(Node::el("summary").with_text("상세 정보"))
                .child(Node::el("pre").with_text(bootstrap_error_report(err))),
        )
        .child(Node::el("p").with_text("로그 파일을 확인해주세요."));
    let shown = surface.set_content(APP_ERROR, vec![panel]) && surface.set_hidden(APP_ERROR, false);
    error!("event=app_bootstrap module=app status=error shown={shown}");
    shown
}
