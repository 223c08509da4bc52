//! Clock-driven debounce and throttle.
//!
//! Neither type owns a timer; callers pass `now` and poll with the app tick.

use crate::clock::{duration_to_millis, EpochMillis};
use std::time::Duration;

/// Trailing-edge debounce: fires once, `delay` after the last trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: EpochMillis,
    deadline: Option<EpochMillis>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay_ms: duration_to_millis(delay),
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: EpochMillis) {
        self.deadline = Some(now.saturating_add(self.delay_ms));
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` once when the deadline has been reached.
    pub fn fire_due(&mut self, now: EpochMillis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Leading-edge throttle: at most one pass per `limit`.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit_ms: EpochMillis,
    open_at: Option<EpochMillis>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit_ms: duration_to_millis(limit),
            open_at: None,
        }
    }

    pub fn try_pass(&mut self, now: EpochMillis) -> bool {
        if self.open_at.is_some_and(|open_at| now < open_at) {
            return false;
        }
        self.open_at = Some(now.saturating_add(self.limit_ms));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Debouncer, Throttle};
    use std::time::Duration;

    #[test]
    fn debounce_restarts_on_each_trigger() {
        let mut debouncer = Debouncer::new(Duration::from_secs(2));
        debouncer.trigger(0);
        debouncer.trigger(1_500);
        assert!(!debouncer.fire_due(2_000));
        assert!(debouncer.fire_due(3_500));
        assert!(!debouncer.fire_due(9_000));
    }

    #[test]
    fn throttle_passes_leading_call_only() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        assert!(throttle.try_pass(0));
        assert!(!throttle.try_pass(99));
        assert!(throttle.try_pass(100));
    }
}
