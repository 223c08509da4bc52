//! Hash router: route registry, fragment writes and change notification.
//!
//! # Responsibility
//! - Keep the route table and the current `Route`.
//! - Turn fragment changes into `routeChange` events.
//!
//! # Invariants
//! - `navigate` only writes the fragment; the new route becomes current
//!   when the change is observed through `poll` or `resolve`.
//! - No `RefCell` borrow is held while handlers or subscribers run, so
//!   they may call back into the router.

use super::emitter::{EventEmitter, Subscription};
use super::fragment::Route;
use super::location::Location;
use log::{debug, info};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const ROUTE_CHANGE: &str = "routeChange";

pub type RouteHandler = Rc<dyn Fn(&Route)>;

pub struct HashRouter {
    location: RefCell<Location>,
    routes: RefCell<BTreeMap<String, RouteHandler>>,
    current: RefCell<Route>,
    events: EventEmitter<Route>,
}

impl Default for HashRouter {
    fn default() -> Self {
        Self::new("")
    }
}

impl HashRouter {
    pub fn new(initial_fragment: &str) -> Self {
        let location = Location::new(initial_fragment);
        let current = Route::parse(location.hash());
        Self {
            location: RefCell::new(location),
            routes: RefCell::new(BTreeMap::new()),
            current: RefCell::new(current),
            events: EventEmitter::new(),
        }
    }

    /// Associates `path` with a handler run before subscribers on each
    /// change to that path. Re-registering replaces the handler.
    pub fn register(&self, path: &str, handler: impl Fn(&Route) + 'static) {
        self.routes
            .borrow_mut()
            .insert(path.to_string(), Rc::new(handler));
    }

    pub fn is_registered(&self, path: &str) -> bool {
        self.routes.borrow().contains_key(path)
    }

    pub fn on(&self, event: &str, callback: impl Fn(&Route) + 'static) -> Subscription {
        self.events.on(event, callback)
    }

    pub fn on_route_change(&self, callback: impl Fn(&Route) + 'static) -> Subscription {
        self.on(ROUTE_CHANGE, callback)
    }

    pub fn emit(&self, event: &str, route: &Route) -> usize {
        self.events.emit(event, route)
    }

    /// Writes `path?params` to the fragment. Returns `false` when the
    /// fragment already matches, in which case no change will be observed.
    pub fn navigate<I, K, V>(&self, path: &str, params: I) -> bool
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut route = Route::new(path);
        for (key, value) in params {
            route.params.insert(key.into(), value.into());
        }
        self.navigate_to(&route)
    }

    pub fn navigate_to(&self, route: &Route) -> bool {
        let fragment = route.to_fragment();
        let changed = self.location.borrow_mut().set_hash(&fragment);
        debug!("event=route_navigate module=router status=ok path={} changed={changed}", route.path);
        changed
    }

    /// Models an address-bar edit by the host.
    pub fn set_hash(&self, fragment: &str) -> bool {
        self.location.borrow_mut().set_hash(fragment)
    }

    pub fn back(&self) -> bool {
        self.location.borrow_mut().back()
    }

    pub fn forward(&self) -> bool {
        self.location.borrow_mut().forward()
    }

    pub fn fragment(&self) -> String {
        self.location.borrow().hash().to_string()
    }

    pub fn current_route(&self) -> Route {
        self.current.borrow().clone()
    }

    /// Handles a pending fragment change, if any.
    pub fn poll(&self) -> Option<Route> {
        let changed = self.location.borrow_mut().take_change();
        changed.map(|_| self.resolve())
    }

    /// Parses the current fragment, makes it the current route and
    /// notifies the registered handler and `routeChange` subscribers.
    pub fn resolve(&self) -> Route {
        let route = Route::parse(self.location.borrow().hash());
        *self.current.borrow_mut() = route.clone();

        let handler = self.routes.borrow().get(&route.path).cloned();
        if let Some(handler) = handler {
            handler(&route);
        }
        let notified = self.emit(ROUTE_CHANGE, &route);
        info!(
            "event=route_change module=router status=ok path={} params={} subscribers={notified}",
            route.path,
            route.params.len()
        );
        route
    }
}
