//! Collaborators injected into every screen.

use crate::api::GtdApi;
use crate::clock::Clock;
use crate::config::UiConfig;
use crate::router::HashRouter;
use crate::storage::LocalCache;
use crate::ui::{BusyIndicator, Notifier, Prompter, Surface};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handles, fixed at construction. Cloning shares the same
/// collaborators; none of them can be swapped afterwards.
#[derive(Clone)]
pub struct Services {
    api: Rc<dyn GtdApi>,
    cache: Rc<LocalCache>,
    notifier: Rc<Notifier>,
    busy: Rc<BusyIndicator>,
    router: Rc<HashRouter>,
    surface: Rc<RefCell<Surface>>,
    prompter: Rc<dyn Prompter>,
    clock: Rc<dyn Clock>,
    ui: UiConfig,
}

impl Services {
    pub fn new(
        api: Rc<dyn GtdApi>,
        cache: Rc<LocalCache>,
        router: Rc<HashRouter>,
        surface: Rc<RefCell<Surface>>,
        prompter: Rc<dyn Prompter>,
        clock: Rc<dyn Clock>,
        ui: UiConfig,
    ) -> Self {
        let notifier = Rc::new(Notifier::new(Rc::clone(&surface), Rc::clone(&clock), &ui));
        let busy = Rc::new(BusyIndicator::new(Rc::clone(&surface)));
        Self {
            api,
            cache,
            notifier,
            busy,
            router,
            surface,
            prompter,
            clock,
            ui,
        }
    }

    pub fn api(&self) -> &Rc<dyn GtdApi> {
        &self.api
    }

    pub fn cache(&self) -> &Rc<LocalCache> {
        &self.cache
    }

    pub fn notifier(&self) -> &Rc<Notifier> {
        &self.notifier
    }

    pub fn busy(&self) -> &Rc<BusyIndicator> {
        &self.busy
    }

    pub fn router(&self) -> &Rc<HashRouter> {
        &self.router
    }

    pub fn surface(&self) -> &Rc<RefCell<Surface>> {
        &self.surface
    }

    pub fn prompter(&self) -> &Rc<dyn Prompter> {
        &self.prompter
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    pub fn ui(&self) -> &UiConfig {
        &self.ui
    }
}
