//! In-memory state stores
//!
//! `InMemoryStateStore` applies batches atomically and keeps the per-block
//! reference journal. Clones share the same data so tests can inspect a store
//! after handing it to `ChainStore`.
//!
//! `EphemeralStateStore` accepts everything and keeps nothing. It backs the
//! throwaway dev chain.

use crate::domain::StorageError;
use crate::ports::outbound::{BatchOperation, StateStore};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Blocks of reference journal kept before pruning.
pub const DEFAULT_PRUNE_DEPTH: u64 = 128;

#[derive(Default)]
struct Committed {
    data: HashMap<Vec<u8>, Vec<u8>>,
    /// block number -> keys written by that block
    journal: BTreeMap<u64, Vec<Vec<u8>>>,
}

/// Atomic in-memory store.
#[derive(Clone)]
pub struct InMemoryStateStore {
    committed: Arc<RwLock<Committed>>,
    staged: Vec<BatchOperation>,
    staged_journal: Vec<(u64, Vec<Vec<u8>>)>,
    prune_below: Option<u64>,
    prune_depth: u64,
    fail_next_commit: Arc<AtomicBool>,
    commits: Arc<AtomicU64>,
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::with_prune_depth(DEFAULT_PRUNE_DEPTH)
    }
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_depth(prune_depth: u64) -> Self {
        Self {
            committed: Arc::new(RwLock::new(Committed::default())),
            staged: Vec::new(),
            staged_journal: Vec::new(),
            prune_below: None,
            prune_depth,
            fail_next_commit: Arc::new(AtomicBool::new(false)),
            commits: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Setting the returned flag makes the next `commit_batch` fail once.
    pub fn failure_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_next_commit)
    }

    /// Successful commits so far.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.committed.read().data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.committed.read().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block numbers that still have reference bookkeeping.
    pub fn journaled_blocks(&self) -> Vec<u64> {
        self.committed.read().journal.keys().copied().collect()
    }

    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty() || !self.staged_journal.is_empty()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.committed.read().data.get(key).cloned())
    }

    fn stage(&mut self, op: BatchOperation) {
        self.staged.push(op);
    }

    fn commit_reference_changes(&mut self, block_number: u64) {
        let already: usize = self.staged_journal.iter().map(|(_, keys)| keys.len()).sum();
        let keys = self.staged[already.min(self.staged.len())..]
            .iter()
            .map(|op| op.key().to_vec())
            .collect();
        self.staged_journal.push((block_number, keys));
    }

    fn cleanup(&mut self, block_number: u64) {
        if let Some(limit) = block_number.checked_sub(self.prune_depth) {
            self.prune_below = Some(self.prune_below.map_or(limit, |p| p.max(limit)));
        }
    }

    fn commit_batch(&mut self) -> Result<(), StorageError> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StorageError::CommitFailed("injected failure".into()));
        }

        let mut committed = self.committed.write();
        for op in self.staged.drain(..) {
            match op {
                BatchOperation::Put { key, value } => {
                    committed.data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    committed.data.remove(&key);
                }
            }
        }
        for (number, keys) in self.staged_journal.drain(..) {
            committed.journal.entry(number).or_default().extend(keys);
        }
        if let Some(limit) = self.prune_below.take() {
            committed.journal = committed.journal.split_off(&limit);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged.clear();
        self.staged_journal.clear();
        self.prune_below = None;
    }
}

/// Store whose commits are discarded.
#[derive(Debug, Default)]
pub struct EphemeralStateStore {
    staged: usize,
}

impl EphemeralStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for EphemeralStateStore {
    fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(None)
    }

    fn stage(&mut self, _op: BatchOperation) {
        self.staged += 1;
    }

    fn commit_reference_changes(&mut self, _block_number: u64) {}

    fn cleanup(&mut self, _block_number: u64) {}

    fn commit_batch(&mut self) -> Result<(), StorageError> {
        self.staged = 0;
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged = 0;
    }
}
