//! Clock sources for the Agora poll ledger
//!
//! The core never reads the OS clock directly; every operation that
//! compares against a closing deadline goes through a [`Clock`] so
//! deployments and tests control the time source.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::Timestamp;

/// Source of the current instant, in [`Timestamp`] units
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by the OS
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        SystemClock
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock before the epoch reads as the epoch rather than failing
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Timestamp::from_millis(since_epoch.as_millis() as i64)
    }
}

/// Settable clock for deterministic harnesses
/// INVARIANT: only moves when told to - no ambient progress
#[derive(Debug)]
pub struct ManualClock {
    value: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        ManualClock {
            value: AtomicI64::new(start.as_millis()),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: Timestamp) {
        self.value.store(to.as_millis(), Ordering::SeqCst);
    }

    /// Move forward by a duration
    pub fn advance(&self, by: Duration) {
        self.value
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.value.load(Ordering::SeqCst))
    }
}
