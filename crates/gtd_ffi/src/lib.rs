//! Flutter-facing bindings for `gtd_core`.

pub mod api;
