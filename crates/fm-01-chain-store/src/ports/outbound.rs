//! # Outbound Ports (Driven Ports)
//!
//! Dependencies required by the chain store. The host wires concrete
//! adapters in; tests use the in-memory ones from `crate::adapters`.

use crate::domain::{HeadChange, StorageError};
use async_trait::async_trait;
use shared_types::{Block, U256};

/// Persistent state backing the block tree.
///
/// Writes are staged and become visible only on `commit_batch`. The store
/// also keeps per-block reference bookkeeping so that stale state can be
/// pruned as the chain grows.
pub trait StateStore: Send + Sync {
    /// Read a committed value.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Queue a write for the next batch.
    fn stage(&mut self, op: BatchOperation);

    /// Record the staged writes as belonging to `block_number`.
    fn commit_reference_changes(&mut self, block_number: u64);

    /// Schedule pruning of bookkeeping that fell out of the retention
    /// window relative to `block_number`.
    fn cleanup(&mut self, block_number: u64);

    /// Apply everything staged since the last commit, atomically.
    ///
    /// On error nothing is applied and the staged batch is still pending;
    /// callers discard it with `rollback`.
    fn commit_batch(&mut self) -> Result<(), StorageError>;

    /// Discard the staged batch and any bookkeeping recorded with it.
    fn rollback(&mut self);
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            BatchOperation::Put { key, .. } | BatchOperation::Delete { key } => key,
        }
    }
}

/// Broadcast failure. Never affects chain state; logged by the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BroadcastError {
    #[error("No peers to broadcast to")]
    NoPeers,

    #[error("Broadcast transport error: {0}")]
    Transport(String),
}

/// Announces newly adopted local blocks to the network.
#[async_trait]
pub trait BlockBroadcaster: Send + Sync {
    async fn broadcast_new_block(
        &self,
        block: &Block,
        cumulative_difficulty: U256,
    ) -> Result<(), BroadcastError>;
}

/// Receives head transitions after they are committed.
///
/// Called synchronously while chain mutation is still serialized, so
/// implementations must not block and must not call back into `add_block`.
pub trait HeadObserver: Send + Sync {
    fn on_new_head(&self, change: &HeadChange);

    /// `false` once nothing is listening anymore; the chain store then
    /// drops the observer.
    fn is_active(&self) -> bool {
        true
    }
}
