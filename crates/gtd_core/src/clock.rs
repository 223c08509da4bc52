//! Wall-clock abstraction.
//!
//! # Responsibility
//! - Provide epoch-millisecond timestamps for cache entries, activity log
//!   records, toast deadlines and debounce/throttle timers.
//! - Let tests drive time explicitly instead of sleeping.
//!
//! # Invariants
//! - All timestamps in core are Unix epoch milliseconds (`i64`).

use std::cell::Cell;
use std::time::Duration;

/// Unix epoch milliseconds.
pub type EpochMillis = i64;

/// Source of the current time.
pub trait Clock {
    fn now_ms(&self) -> EpochMillis;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> EpochMillis {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Manually advanced clock for deterministic tests and replay.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<EpochMillis>,
}

impl ManualClock {
    pub fn new(start: EpochMillis) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: EpochMillis) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now
            .set(self.now.get().saturating_add(duration_to_millis(by)));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> EpochMillis {
        self.now.get()
    }
}

/// Converts a duration to whole milliseconds, saturating at `i64::MAX`.
pub fn duration_to_millis(duration: Duration) -> EpochMillis {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{duration_to_millis, Clock, ManualClock};
    use std::time::Duration;

    #[test]
    fn manual_clock_advances_by_duration() {
        let clock = ManualClock::new(1_000);
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now_ms(), 3_000);
    }

    #[test]
    fn duration_conversion_saturates() {
        assert_eq!(duration_to_millis(Duration::MAX), i64::MAX);
    }
}
