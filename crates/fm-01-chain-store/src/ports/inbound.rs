//! Driving ports (Inbound API)
//!
//! `ChainApi` is the whole surface the rest of the node sees: one mutating
//! entry point plus read-only accessors.

use crate::domain::{ChainHead, ChainResult};
use crate::ports::outbound::HeadObserver;
use shared_types::{Block, Hash, Transaction, U256};
use std::sync::Arc;

/// Options for `ChainApi::add_block_with`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddBlockOptions {
    /// Carry un-included pending transactions onto a new head.
    pub forward_pending_transactions: bool,

    /// Only apply if the head is still this block. Used for locally mined
    /// blocks: a candidate built on a superseded head is dropped.
    pub expected_parent: Option<Hash>,
}

/// Chain store API.
pub trait ChainApi: Send + Sync {
    /// Validate, index, run fork choice and commit a block.
    ///
    /// `Ok(true)` when stored, `Ok(false)` when not applied (unknown parent,
    /// invalid uncles, already known, stale).
    fn add_block(&self, block: Block, forward_pending_transactions: bool) -> ChainResult<bool> {
        self.add_block_with(
            block,
            AddBlockOptions {
                forward_pending_transactions,
                expected_parent: None,
            },
        )
    }

    fn add_block_with(&self, block: Block, options: AddBlockOptions) -> ChainResult<bool>;

    /// Current canonical head.
    fn head(&self) -> ChainHead;

    fn get_block(&self, hash: &Hash) -> Option<Arc<Block>>;

    fn cumulative_difficulty(&self, hash: &Hash) -> Option<U256>;

    /// Transactions queued for inclusion on top of the head.
    fn pending_transactions(&self) -> Vec<Transaction>;

    /// Queue a transaction. Returns `false` if it is already pending.
    fn add_transaction(&self, tx: Transaction) -> bool;

    fn register_head_observer(&self, observer: Arc<dyn HeadObserver>);
}
