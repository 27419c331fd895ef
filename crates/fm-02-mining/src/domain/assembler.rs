//! Block assembly
//!
//! Builds the head candidate the worker mines on: parent is the current
//! head, body is the pending pool. Uncles are not collected.

use crate::config::{DifficultyConfig, MinerConfig};
use crate::domain::difficulty::calc_difficulty;
use shared_types::{Address, Block, BlockHeader, Receipt, Transaction};

/// Gas charged per transaction by the placeholder executor.
pub const TX_GAS: u64 = 21_000;

/// Maximum `extra_data` length.
pub const MAX_EXTRA_DATA: usize = 32;

#[derive(Clone, Debug)]
pub struct BlockAssembler {
    coinbase: Address,
    extra_data: Vec<u8>,
    difficulty: DifficultyConfig,
}

impl BlockAssembler {
    pub fn new(config: &MinerConfig) -> Self {
        let mut extra_data = config.extra_data.as_bytes().to_vec();
        extra_data.truncate(MAX_EXTRA_DATA);
        Self {
            coinbase: config.coinbase,
            extra_data,
            difficulty: config.difficulty.clone(),
        }
    }

    /// Candidate child of `parent` carrying `pending`.
    ///
    /// The timestamp is `now`, bumped past the parent's if the clock lags.
    /// A parent stamped at `u64::MAX` yields a child at `u64::MAX`, which the
    /// chain store refuses; mining stalls on such a head instead of failing.
    pub fn assemble(&self, parent: &Block, pending: Vec<Transaction>, now: u64) -> Block {
        let parent_header = &parent.header;
        let timestamp = now.max(parent_header.timestamp.saturating_add(1));
        let difficulty = calc_difficulty(
            parent_header.difficulty,
            parent_header.timestamp,
            timestamp,
            &self.difficulty,
        );

        let header = BlockHeader {
            parent_hash: parent.hash(),
            coinbase: self.coinbase,
            state_root: parent_header.state_root,
            number: parent_header.number + 1,
            difficulty,
            timestamp,
            extra_data: self.extra_data.clone(),
            ..Default::default()
        };

        let receipts = pending
            .iter()
            .map(|tx| Receipt {
                transaction_hash: tx.hash(),
                state_root: parent_header.state_root,
                gas_used: TX_GAS,
            })
            .collect();

        let mut block = Block::new(header, pending.clone(), Vec::new());
        block.scratch.pending_transactions = pending;
        block.scratch.receipts = receipts;
        block
    }
}
