//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one GTD client session per UI thread to Dart via FRB.
//! - Translate host input (navigation, DOM events, timers, connectivity)
//!   into `App` calls and answer with a JSON state snapshot.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every session call returns a `SessionResponse`; `snapshot_json` is
//!   empty only when no session is open.
//! - The session lives in thread-local storage and is driven by a
//!   current-thread runtime, so calls must come from the thread that opened it.

use gtd_core::{
    bootstrap_error_report, core_version as core_version_inner,
    init_logging as init_logging_inner, ping as ping_inner, App, AppConfig, DomEvent, EventKind,
    FixedPrompter, InMemoryGtdApi, KeyPress, RouteError, SystemClock,
};
use log::{error, info, warn};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tokio::runtime::{Builder, Runtime};

struct Session {
    runtime: Runtime,
    app: App,
    prompter: Rc<FixedPrompter>,
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Result envelope for session calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    /// Whether the call completed without a routing or bootstrap failure.
    pub ok: bool,
    /// Human-readable message for diagnostics; empty on success.
    pub message: String,
    /// Serialized `AppSnapshot` after the call.
    pub snapshot_json: String,
}

impl SessionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            snapshot_json: String::new(),
        }
    }
}

/// Opens (or replaces) the session for this thread and shows the screen
/// for `fragment`.
///
/// Input semantics:
/// - `config_path`: optional TOML file; environment overrides still apply.
/// - `offline`: use an in-process backend instead of HTTP.
///
/// # FFI contract
/// - Sync call; blocks until the first screen has loaded.
/// - Never panics; bootstrap failures are reported in `message`.
#[flutter_rust_bridge::frb(sync)]
pub fn open_app(config_path: Option<String>, fragment: String, offline: bool) -> SessionResponse {
    let config = match AppConfig::load(config_path.as_deref().map(Path::new)) {
        Ok(config) => config,
        Err(err) => return SessionResponse::failure(format!("open_app failed: {err}")),
    };
    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => return SessionResponse::failure(format!("open_app failed: {err}")),
    };

    let prompter = Rc::new(FixedPrompter::new(true));
    let clock = Rc::new(SystemClock);
    let built = if offline {
        App::bootstrap(
            &config,
            Rc::new(InMemoryGtdApi::new()),
            prompter.clone(),
            clock,
            &fragment,
        )
    } else {
        App::connect(&config, prompter.clone(), clock, &fragment)
    };
    let mut app = match built {
        Ok(app) => app,
        Err(err) => {
            error!("event=ffi_open module=ffi status=error offline={offline}");
            return SessionResponse::failure(bootstrap_error_report(&err));
        }
    };

    let started = runtime.block_on(app.start());
    info!("event=ffi_open module=ffi status=ok offline={offline}");
    let response = respond(&app, started);
    SESSION.with(|slot| {
        *slot.borrow_mut() = Some(Session {
            runtime,
            app,
            prompter,
        });
    });
    response
}

/// Drops the session for this thread.
#[flutter_rust_bridge::frb(sync)]
pub fn close_app() -> bool {
    SESSION.with(|slot| slot.borrow_mut().take().is_some())
}

/// Navigates to `path` (for example `inbox` or `review`).
#[flutter_rust_bridge::frb(sync)]
pub fn navigate(path: String) -> SessionResponse {
    with_session(|session| {
        let result = session.runtime.block_on(session.app.navigate(path.trim()));
        respond(&session.app, result)
    })
}

/// Replaces the whole fragment, as an address-bar edit would.
#[flutter_rust_bridge::frb(sync)]
pub fn set_fragment(fragment: String) -> SessionResponse {
    with_session(|session| {
        let result = session.runtime.block_on(session.app.set_fragment(&fragment));
        respond(&session.app, result)
    })
}

/// Dispatches a DOM event on element `target`.
///
/// Input semantics:
/// - `kind`: `click|submit|input|keydown`.
/// - `key`: key chord for `keydown` (for example `ctrl+1` or `Enter`).
/// - `value`: new field value for `input`.
#[flutter_rust_bridge::frb(sync)]
pub fn dispatch_event(
    kind: String,
    target: String,
    key: Option<String>,
    value: Option<String>,
) -> SessionResponse {
    let Some(kind) = EventKind::parse(&kind) else {
        return SessionResponse::failure(format!("dispatch_event failed: unknown kind `{kind}`"));
    };
    with_session(|session| {
        let app = &mut session.app;
        let result = match kind {
            EventKind::Input => session
                .runtime
                .block_on(app.type_into(&target, value.as_deref().unwrap_or_default())),
            EventKind::KeyDown => {
                let Some(press) = key.as_deref().and_then(KeyPress::parse) else {
                    return failure_with_snapshot(app, "dispatch_event failed: missing key");
                };
                session
                    .runtime
                    .block_on(app.dispatch(&DomEvent::key_down(target.as_str(), press)))
            }
            EventKind::Click => session.runtime.block_on(app.click(&target)),
            EventKind::Submit => session.runtime.block_on(app.submit(&target)),
        };
        respond(app, result)
    })
}

/// Clicks the `index`-th rendered node carrying `class` inside `container`,
/// such as a list item's delete button.
#[flutter_rust_bridge::frb(sync)]
pub fn click_rendered(container: String, class: String, index: u32) -> SessionResponse {
    with_session(|session| {
        let result = session.runtime.block_on(session.app.click_rendered(
            &container,
            &class,
            index as usize,
        ));
        respond(&session.app, result)
    })
}

/// Sets the answer given to confirmation prompts.
#[flutter_rust_bridge::frb(sync)]
pub fn set_confirm_answer(answer: bool) -> bool {
    SESSION.with(|slot| match slot.borrow().as_ref() {
        Some(session) => {
            session.prompter.set_answer(answer);
            true
        }
        None => false,
    })
}

/// Advances toasts, announcements and draft timers to wall-clock now.
#[flutter_rust_bridge::frb(sync)]
pub fn tick() -> SessionResponse {
    with_session(|session| {
        session.app.tick_now();
        respond(&session.app, Ok(0))
    })
}

/// Reports a host connectivity change.
#[flutter_rust_bridge::frb(sync)]
pub fn set_online(online: bool) -> SessionResponse {
    with_session(|session| {
        session.app.on_connectivity_change(online);
        respond(&session.app, Ok(0))
    })
}

/// Current state without changing anything.
#[flutter_rust_bridge::frb(sync)]
pub fn snapshot() -> SessionResponse {
    with_session(|session| respond(&session.app, Ok(0)))
}

fn with_session(f: impl FnOnce(&mut Session) -> SessionResponse) -> SessionResponse {
    SESSION.with(|slot| match slot.try_borrow_mut() {
        Ok(mut guard) => match guard.as_mut() {
            Some(session) => f(session),
            None => SessionResponse::failure("no session; call open_app first"),
        },
        Err(_) => {
            warn!("event=ffi_call module=ffi status=reentrant");
            SessionResponse::failure("session is busy")
        }
    })
}

fn respond(app: &App, result: Result<usize, RouteError>) -> SessionResponse {
    let snapshot_json = match serde_json::to_string(&app.snapshot()) {
        Ok(json) => json,
        Err(err) => return SessionResponse::failure(format!("snapshot failed: {err}")),
    };
    match result {
        Ok(_) => SessionResponse {
            ok: true,
            message: String::new(),
            snapshot_json,
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=route_error error={err}");
            SessionResponse {
                ok: false,
                message: err.to_string(),
                snapshot_json,
            }
        }
    }
}

fn failure_with_snapshot(app: &App, message: &str) -> SessionResponse {
    let mut response = respond(app, Ok(0));
    response.ok = false;
    response.message = message.to_string();
    response
}

#[cfg(test)]
mod tests {
    use super::{
        click_rendered, close_app, core_version, dispatch_event, init_logging, navigate,
        open_app, ping, set_confirm_answer, set_online, snapshot,
    };

    fn snapshot_value(json: &str) -> serde_json::Value {
        serde_json::from_str(json).expect("snapshot json")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn calls_without_session_fail_softly() {
        close_app();
        let response = navigate("review".to_string());
        assert!(!response.ok);
        assert!(response.snapshot_json.is_empty());
        assert!(!set_confirm_answer(false));
    }

    #[test]
    fn offline_session_captures_and_navigates() {
        let opened = open_app(None, String::new(), true);
        assert!(opened.ok, "{}", opened.message);
        assert_eq!(snapshot_value(&opened.snapshot_json)["visible_view"], "inbox");

        let typed = dispatch_event(
            "input".to_string(),
            "thing-title".to_string(),
            None,
            Some("water plants".to_string()),
        );
        assert!(typed.ok, "{}", typed.message);
        let submitted = dispatch_event("submit".to_string(), "capture-form".to_string(), None, None);
        assert!(submitted.ok, "{}", submitted.message);
        let state = snapshot_value(&submitted.snapshot_json);
        assert_eq!(state["toast"], "새로운 생각이 추가되었습니다.");
        assert!(state["html"].as_str().unwrap_or_default().contains("water plants"));

        let clarify = click_rendered("thing-list".to_string(), "btn-clarify".to_string(), 0);
        assert_eq!(snapshot_value(&clarify.snapshot_json)["visible_view"], "clarify");

        let shortcut = dispatch_event(
            "keydown".to_string(),
            "app".to_string(),
            Some("ctrl+4".to_string()),
            None,
        );
        assert_eq!(snapshot_value(&shortcut.snapshot_json)["visible_view"], "review");

        let offline = set_online(false);
        assert_eq!(snapshot_value(&offline.snapshot_json)["online"], false);
        assert!(snapshot().ok);
        assert!(close_app());
    }

    #[test]
    fn unknown_event_kind_is_rejected() {
        let response = dispatch_event("hover".to_string(), "app".to_string(), None, None);
        assert!(!response.ok);
        assert!(response.message.contains("hover"));
    }
}
