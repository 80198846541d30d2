//! Clock abstraction so timestamps on products and events stay testable.

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed between `earlier` and now. Negative if `earlier` lies in
    /// the future.
    fn elapsed_since(&self, earlier: DateTime<Utc>) -> TimeDelta {
        self.now() - earlier
    }
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
