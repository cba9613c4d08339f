//! Time source used by the cache and the dispatcher
//!
//! Freshness is evaluated against whatever the active [`Clock`] reports, so
//! tests can move time forward by minutes without sleeping.

use chrono::{DateTime, Utc};
#[cfg(test)]
use chrono::Duration;
#[cfg(test)]
use std::sync::{Mutex, PoisonError};

/// A source of the current time
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by `Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Used by tests that exercise the sliding freshness window.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    /// Creates a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `by`
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Sets the clock to an absolute instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
