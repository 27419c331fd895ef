//! Shared block and chain builders.

use std::sync::Arc;

use fm_01_chain_store::{ChainConfig, ChainStore, HeadChange, HeadObserver, InMemoryStateStore};
use parking_lot::Mutex;
use shared_types::{Block, BlockHeader, Hash, Transaction, U256};

pub const GENESIS_DIFFICULTY: u64 = 1024;

pub fn genesis(difficulty: u64) -> Block {
    Block::new(
        BlockHeader {
            difficulty: U256::from(difficulty),
            timestamp: 1_000,
            ..Default::default()
        },
        vec![],
        vec![],
    )
}

/// Child of `parent` with the given difficulty. `tag` keeps siblings distinct.
pub fn child(parent: &Block, difficulty: u64, tag: u8) -> Block {
    child_with(parent, difficulty, tag, vec![])
}

pub fn child_with(parent: &Block, difficulty: u64, tag: u8, txs: Vec<Transaction>) -> Block {
    Block::new(
        BlockHeader {
            parent_hash: parent.hash(),
            number: parent.number() + 1,
            difficulty: U256::from(difficulty),
            timestamp: parent.header.timestamp + 1,
            extra_data: vec![tag],
            ..Default::default()
        },
        txs,
        vec![],
    )
}

pub fn tx(nonce: u64) -> Transaction {
    Transaction {
        sender: [0xaa; 20],
        nonce,
        to: Some([0xbb; 20]),
        value: U256::from(1_000),
        data: vec![],
    }
}

/// Chain on an in-memory store; the returned store handle shares its data.
pub fn chain_with_store(genesis: Block) -> (Arc<ChainStore>, InMemoryStateStore) {
    let store = InMemoryStateStore::new();
    let chain = ChainStore::new(genesis, Box::new(store.clone()), ChainConfig::default())
        .expect("genesis is valid");
    (Arc::new(chain), store)
}

/// Observer that records every head change it is told about.
#[derive(Default)]
pub struct HeadLog {
    changes: Mutex<Vec<HeadChange>>,
}

impl HeadLog {
    pub fn changes(&self) -> Vec<HeadChange> {
        self.changes.lock().clone()
    }

    pub fn heads(&self) -> Vec<Hash> {
        self.changes.lock().iter().map(|c| c.head_hash()).collect()
    }
}

impl HeadObserver for HeadLog {
    fn on_new_head(&self, change: &HeadChange) {
        self.changes.lock().push(change.clone());
    }
}
