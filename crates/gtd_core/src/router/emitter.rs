//! Multi-subscriber event emitter with disposable subscriptions.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Slot<T> {
    id: u64,
    event: String,
    callback: Callback<T>,
}

struct Registry<T> {
    next_id: u64,
    slots: Vec<Slot<T>>,
}

/// Named-event publisher. Cloning shares the same subscriber list.
pub struct EventEmitter<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Subscribes `callback` to `event` until the returned handle is dropped.
    pub fn on(&self, event: &str, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.slots.push(Slot {
                id,
                event: event.to_string(),
                callback: Rc::new(callback),
            });
            id
        };

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.borrow_mut().slots.retain(|slot| slot.id != id);
                }
            })),
        }
    }

    /// Invokes every subscriber of `event` in registration order and returns
    /// how many ran. Subscribers may subscribe or unsubscribe reentrantly;
    /// such changes apply from the next emit.
    pub fn emit(&self, event: &str, payload: &T) -> usize {
        let callbacks: Vec<Callback<T>> = self
            .registry
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.event == event)
            .map(|slot| Rc::clone(&slot.callback))
            .collect();

        for callback in &callbacks {
            callback(payload);
        }
        callbacks.len()
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        self.registry
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.event == event)
            .count()
    }
}

/// Handle returned by [`EventEmitter::on`]. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn dispose(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::EventEmitter;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribers_run_in_registration_order() {
        let emitter = EventEmitter::<u32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let first_seen = Rc::clone(&seen);
        let _first = emitter.on("tick", move |value| first_seen.borrow_mut().push(("a", *value)));
        let second_seen = Rc::clone(&seen);
        let _second = emitter.on("tick", move |value| second_seen.borrow_mut().push(("b", *value)));

        assert_eq!(emitter.emit("tick", &7), 2);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
        assert_eq!(emitter.emit("other", &1), 0);
    }

    #[test]
    fn dispose_and_drop_unsubscribe() {
        let emitter = EventEmitter::<()>::new();
        let disposed = emitter.on("e", |_| {});
        let dropped = emitter.on("e", |_| {});
        assert_eq!(emitter.subscriber_count("e"), 2);

        disposed.dispose();
        assert_eq!(emitter.subscriber_count("e"), 1);
        drop(dropped);
        assert_eq!(emitter.subscriber_count("e"), 0);
    }

    #[test]
    fn reentrant_subscribe_applies_from_next_emit() {
        let emitter = EventEmitter::<()>::new();
        let held = Rc::new(RefCell::new(Vec::new()));
        let inner_emitter = emitter.clone();
        let inner_held = Rc::clone(&held);
        let _outer = emitter.on("e", move |_| {
            inner_held.borrow_mut().push(inner_emitter.on("e", |_| {}));
        });

        assert_eq!(emitter.emit("e", &()), 1);
        assert_eq!(emitter.subscriber_count("e"), 2);
    }
}
