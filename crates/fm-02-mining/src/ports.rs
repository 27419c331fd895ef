//! Outbound ports for mining

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock used to timestamp assembled blocks (for testability).
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// System clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
