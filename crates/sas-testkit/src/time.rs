//! Manually driven clock
//!
//! Implements [`PhysicalClock`] with a value the test sets and advances, so
//! registration and grant timestamps are exact.

use sas_core::PhysicalClock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Clock frozen at `secs`
    pub fn at(secs: u64) -> Self {
        Self {
            now: AtomicU64::new(secs),
        }
    }

    /// Jump to `secs`
    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }

    /// Move forward by `secs`
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl PhysicalClock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
