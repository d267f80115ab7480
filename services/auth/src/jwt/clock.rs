//! Time source for claim checks.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Unix time in seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time.
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Settable clock for tests and replay.
#[derive(Debug)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    /// Clock frozen at `timestamp`.
    #[must_use]
    pub const fn new(timestamp: i64) -> Self {
        Self(AtomicI64::new(timestamp))
    }

    /// Moves the clock.
    pub fn set(&self, timestamp: i64) {
        self.0.store(timestamp, Ordering::SeqCst);
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let secs = i64::try_from(by.as_secs()).unwrap_or(i64::MAX);
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}
