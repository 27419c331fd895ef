//! Chain head types
//!
//! `ChainHead` is the read-only view handed out by `ChainStore::head`.
//! `HeadChange` is what observers receive after the head moved.

use shared_types::{Block, Hash, Transaction, U256};
use std::sync::Arc;

/// Current canonical head.
#[derive(Clone, Debug)]
pub struct ChainHead {
    pub block: Arc<Block>,
    pub hash: Hash,
    pub cumulative_difficulty: U256,
}

impl ChainHead {
    pub fn number(&self) -> u64 {
        self.block.number()
    }
}

/// Notification fired after a head transition has been committed.
#[derive(Clone, Debug)]
pub struct HeadChange {
    pub head: ChainHead,
    pub previous_head: Hash,
    /// Pending transactions queued on the new head at commit time.
    pub pending_transactions: Vec<Transaction>,
    /// The new head does not extend the previous head.
    pub is_reorg: bool,
}

impl HeadChange {
    pub fn head_hash(&self) -> Hash {
        self.head.hash
    }
}
