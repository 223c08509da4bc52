//! Fragment-based client routing.
//!
//! # Responsibility
//! - Parse and serialize `#<path>?<query>` fragments into `Route` values.
//! - Track the fragment and its history, emitting `routeChange` events
//!   when the fragment actually changes.
//!
//! # Invariants
//! - Writing the fragment is the only way to change routes; `navigate`
//!   never mutates the current route directly.
//! - Subscribers run synchronously in registration order.

pub mod emitter;
pub mod fragment;
pub mod hash_router;
pub mod location;

pub use emitter::{EventEmitter, Subscription};
pub use fragment::{Route, DEFAULT_ROUTE};
pub use hash_router::{HashRouter, RouteHandler, ROUTE_CHANGE};
pub use location::Location;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route not found: {0}")]
    RouteNotFound(String),
    #[error("redirect limit ({limit}) reached while resolving `{path}`")]
    RedirectLimit { path: String, limit: u32 },
}
