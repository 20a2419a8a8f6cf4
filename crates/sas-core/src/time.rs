//! Injected physical time
//!
//! The registry never reads wall time itself; timestamps come from a
//! [`PhysicalClock`] handed in at construction so tests can pin them.

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of commit timestamps
pub trait PhysicalClock: Debug + Send + Sync {
    /// Current time in whole seconds since the Unix epoch
    fn now_secs(&self) -> u64;
}

/// Wall-clock time source
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl PhysicalClock for SystemClock {
    fn now_secs(&self) -> u64 {
        // A clock set before 1970 reports the epoch rather than failing the operation.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0)
    }
}
