//! Headless presentation layer.
//!
//! # Responsibility
//! - Model the document (`Surface`), its markup (`Html`/`Node`) and the
//!   fixed shell layout.
//! - Provide user feedback primitives: toasts, the loading overlay and
//!   confirmation prompts.
//! - Provide the timing and formatting helpers the screens share.

pub mod busy;
pub mod format;
pub mod html;
pub mod intent;
pub mod layout;
pub mod notifier;
pub mod prompt;
pub mod surface;
pub mod timing;

pub use busy::BusyIndicator;
pub use format::{format_date, relative_time, DateFormat};
pub use html::{Html, Node};
pub use intent::{ActionCommand, ActionFilter, ClarifyDecision, Intent};
pub use notifier::{Notifier, Toast, ToastKind};
pub use prompt::{FixedPrompter, Prompter};
pub use surface::{
    DomEvent, Element, EventKind, Handler, KeyPress, ListenerId, ListenerOptions, Surface,
};
pub use timing::{Debouncer, Throttle};
