//! Injectable time source.
//!
//! All daily-quota arithmetic compares dates in UTC through this trait so
//! that rollovers are deterministic in tests and consistent across callers
//! regardless of server locale.

use std::sync::Mutex;

use chrono::{DateTime, Days, NaiveDate, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Today's UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
///
/// Starts at a fixed instant and only moves when told to, which makes day
/// rollovers and watchdog timeouts reproducible.
#[derive(Debug)]
pub struct ManualClock {
    /// The instant currently reported by the clock.
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump the clock to a specific instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("clock mutex poisoned") = instant;
    }

    /// Advance the clock by whole days.
    pub fn advance_days(&self, days: u64) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now = now
            .checked_add_days(Days::new(days))
            .expect("clock overflow");
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.lock().expect("clock mutex poisoned");
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}
