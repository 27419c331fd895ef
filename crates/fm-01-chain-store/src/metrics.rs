//! Metrics collection for the chain store

use std::sync::atomic::{AtomicU64, Ordering};

/// Chain store counters.
#[derive(Debug, Default)]
pub struct ChainMetrics {
    /// Blocks committed (canonical or not)
    pub blocks_added: AtomicU64,

    /// Head transitions
    pub head_changes: AtomicU64,

    /// Head transitions that did not extend the previous head
    pub reorgs: AtomicU64,

    /// Blocks stored off the canonical chain
    pub non_canonical: AtomicU64,

    /// `add_block` calls answered with `Ok(false)`
    pub not_applied: AtomicU64,

    /// Storage commits that failed and were rolled back
    pub commit_failures: AtomicU64,
}

/// Point-in-time copy of `ChainMetrics`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChainMetricsSnapshot {
    pub blocks_added: u64,
    pub head_changes: u64,
    pub reorgs: u64,
    pub non_canonical: u64,
    pub not_applied: u64,
    pub commit_failures: u64,
}

impl ChainMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_head_change(&self, is_reorg: bool) {
        self.blocks_added.fetch_add(1, Ordering::Relaxed);
        self.head_changes.fetch_add(1, Ordering::Relaxed);
        if is_reorg {
            self.reorgs.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_non_canonical(&self) {
        self.blocks_added.fetch_add(1, Ordering::Relaxed);
        self.non_canonical.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_applied(&self) {
        self.not_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit_failure(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ChainMetricsSnapshot {
        ChainMetricsSnapshot {
            blocks_added: self.blocks_added.load(Ordering::Relaxed),
            head_changes: self.head_changes.load(Ordering::Relaxed),
            reorgs: self.reorgs.load(Ordering::Relaxed),
            non_canonical: self.non_canonical.load(Ordering::Relaxed),
            not_applied: self.not_applied.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
        }
    }
}
