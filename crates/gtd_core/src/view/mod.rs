//! Screen lifecycle and the concrete screens.
//!
//! # Responsibility
//! - Define the `View` contract: `show`/`hide` drive the
//!   `Hidden -> Visible -> Hidden` cycle around the `on_show`/`on_hide` hooks.
//! - Own listener bookkeeping through `ViewCore` so hiding a screen removes
//!   every handler it registered while visible.
//!
//! # Invariants
//! - `show` on an unbound screen and `hide` on a hidden or unbound screen
//!   are no-ops.
//! - After `hide` returns, no listener registered by the screen remains on
//!   the surface.

use crate::api::ApiError;
use crate::clock::EpochMillis;
use crate::router::Route;
use crate::ui::Intent;
use async_trait::async_trait;
use log::{debug, warn};

pub mod actions;
mod base;
pub mod clarify;
pub mod inbox;
pub mod projects;
pub mod review;
mod services;

pub use actions::{ActionItem, ActionStage, ActionsView};
pub use base::{FieldError, FormValidation, ViewCore, REQUIRED_MESSAGE};
pub use clarify::ClarifyView;
pub use inbox::InboxView;
pub use projects::ProjectsView;
pub use review::{ReviewSummary, ReviewView};
pub use services::Services;

pub type ViewResult<T = ()> = Result<T, ViewError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[async_trait(?Send)]
pub trait View {
    fn core(&self) -> &ViewCore;
    fn core_mut(&mut self) -> &mut ViewCore;

    fn name(&self) -> &'static str {
        self.core().name()
    }

    /// Fetch, render and arm listeners for `route`.
    async fn on_show(&mut self, route: &Route) -> ViewResult;

    async fn on_hide(&mut self) -> ViewResult {
        Ok(())
    }

    /// Applies an intent produced by one of this screen's listeners.
    async fn handle(&mut self, intent: Intent) -> ViewResult {
        debug!(
            "event=view_intent module=view status=ignored view={} intent={intent:?}",
            self.name()
        );
        Ok(())
    }

    fn on_tick(&mut self, _now: EpochMillis) {}

    /// Count shown next to this screen's navigation entry.
    fn badge(&self) -> Option<usize> {
        None
    }

    async fn show(&mut self, route: &Route) -> ViewResult {
        let Some(element) = self.core().element().map(str::to_string) else {
            warn!(
                "event=view_show module=view status=unbound view={}",
                self.name()
            );
            return Ok(());
        };
        if self.core().is_visible() {
            self.core_mut().cleanup_listeners();
        }

        self.core_mut().set_state(ViewState::Visible);
        self.core()
            .services()
            .surface()
            .borrow_mut()
            .set_hidden(&element, false);
        debug!(
            "event=view_show module=view status=start view={} path={}",
            self.name(),
            route.path
        );

        let result = self.on_show(route).await;
        if self.core().is_visible() {
            self.core().manage_focus();
        }
        result
    }

    async fn hide(&mut self) -> ViewResult {
        let Some(element) = self.core().element().map(str::to_string) else {
            return Ok(());
        };
        if !self.core().is_visible() {
            return Ok(());
        }

        self.core_mut().set_state(ViewState::Hidden);
        self.core()
            .services()
            .surface()
            .borrow_mut()
            .set_hidden(&element, true);

        let result = self.on_hide().await;
        let removed = self.core_mut().cleanup_listeners();
        debug!(
            "event=view_hide module=view status=ok view={} listeners_removed={removed}",
            self.name()
        );
        result
    }
}
