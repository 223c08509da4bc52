//! Core of the GTD capture-and-clarify client.
//! This crate is the single source of truth for routing, screen lifecycle
//! and the rules each screen applies to backend data.

pub mod api;
pub mod app;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod nav;
pub mod router;
pub mod storage;
pub mod ui;
pub mod view;

pub use api::{ApiError, ApiResponse, ApiResult, GtdApi, HttpApiClient, InMemoryGtdApi};
pub use app::{
    bootstrap_error_report, open_store, render_bootstrap_error, App, AppSnapshot, BootstrapError,
};
pub use clock::{Clock, EpochMillis, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::{Thing, ThingId, ThingStatus};
pub use nav::NavComponent;
pub use router::{HashRouter, Route, RouteError};
pub use storage::{LocalCache, StorageError};
pub use ui::{DomEvent, EventKind, FixedPrompter, KeyPress, Prompter, Surface};
pub use view::{Services, View, ViewError, ViewState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
