//! Metrics collection for mining

use std::sync::atomic::{AtomicU64, Ordering};

/// Mining counters and the current hashrate gauge.
#[derive(Debug, Default)]
pub struct MiningMetrics {
    /// Tasks sent to the worker
    pub tasks_issued: AtomicU64,

    /// Nonces reported by the worker
    pub nonces_found: AtomicU64,

    /// Nonces discarded because their task was superseded
    pub stale_nonces: AtomicU64,

    /// Sealed blocks submitted to the chain
    pub blocks_mined: AtomicU64,

    /// Sealed blocks that became head
    pub blocks_adopted: AtomicU64,

    /// Worker restarts after loss
    pub worker_restarts: AtomicU64,

    /// Last reported hashes per second
    pub hashrate: AtomicU64,
}

/// Point-in-time copy of `MiningMetrics`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MiningMetricsSnapshot {
    pub tasks_issued: u64,
    pub nonces_found: u64,
    pub stale_nonces: u64,
    pub blocks_mined: u64,
    pub blocks_adopted: u64,
    pub worker_restarts: u64,
    pub hashrate: u64,
}

impl MiningMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_task_issued(&self) {
        self.tasks_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_nonce(&self, stale: bool) {
        self.nonces_found.fetch_add(1, Ordering::Relaxed);
        if stale {
            self.stale_nonces.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_block_mined(&self, adopted: bool) {
        self.blocks_mined.fetch_add(1, Ordering::Relaxed);
        if adopted {
            self.blocks_adopted.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_worker_restart(&self) {
        self.worker_restarts.fetch_add(1, Ordering::Relaxed);
        self.hashrate.store(0, Ordering::Relaxed);
    }

    pub fn set_hashrate(&self, hashes_per_second: u64) {
        self.hashrate.store(hashes_per_second, Ordering::Relaxed);
    }

    pub fn hashrate(&self) -> u64 {
        self.hashrate.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MiningMetricsSnapshot {
        MiningMetricsSnapshot {
            tasks_issued: self.tasks_issued.load(Ordering::Relaxed),
            nonces_found: self.nonces_found.load(Ordering::Relaxed),
            stale_nonces: self.stale_nonces.load(Ordering::Relaxed),
            blocks_mined: self.blocks_mined.load(Ordering::Relaxed),
            blocks_adopted: self.blocks_adopted.load(Ordering::Relaxed),
            worker_restarts: self.worker_restarts.load(Ordering::Relaxed),
            hashrate: self.hashrate.load(Ordering::Relaxed),
        }
    }
}
