//! Chain Store Service
//!
//! Owns the block index, the canonical head and the pending transaction
//! pool. `add_block` is the single mutating entry point:
//!
//! 1. Structural checks (known parent, number, difficulty, uncles)
//! 2. Index insert with cumulative difficulty
//! 3. Fork choice against the current head
//! 4. Staged storage writes, reference bookkeeping, atomic commit
//! 5. Head observers notified after the commit
//!
//! Writers are serialized by `add_lock`. Index, head and pending pool live
//! behind one `RwLock`, so readers never see a head without its pending set
//! or a block that has not been committed.

use crate::config::ChainConfig;
use crate::domain::{
    select, validate_uncles, BlockIndex, ChainError, ChainHead, ChainResult, Decision,
    HeadChange,
};
use crate::metrics::ChainMetrics;
use crate::ports::{AddBlockOptions, BatchOperation, ChainApi, HeadObserver, StateStore};
use parking_lot::{Mutex, RwLock};
use shared_types::{short_hex, Block, Hash, Transaction, U256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const BLOCK_PREFIX: &[u8] = b"block:";
const TD_PREFIX: &[u8] = b"td:";
const HEAD_KEY: &[u8] = b"head";

fn block_key(hash: &Hash) -> Vec<u8> {
    [BLOCK_PREFIX, hash.as_slice()].concat()
}

fn td_key(hash: &Hash) -> Vec<u8> {
    [TD_PREFIX, hash.as_slice()].concat()
}

fn td_bytes(td: U256) -> Vec<u8> {
    let mut out = [0u8; 32];
    td.to_big_endian(&mut out);
    out.to_vec()
}

/// Result of applying a block under the write lock.
enum Outcome {
    NotApplied,
    Stored,
    NewHead(HeadChange),
}

struct ChainInner {
    index: BlockIndex,
    head: ChainHead,
    pending: Vec<Transaction>,
    store: Box<dyn StateStore>,
}

impl ChainInner {
    /// Transactions included on the path from `tip` back to (excluding)
    /// `stop`.
    fn included_since(&self, tip: Hash, stop: Option<Hash>) -> HashSet<Hash> {
        let mut included = HashSet::new();
        let mut cursor = tip;
        while Some(cursor) != stop {
            let Some(block) = self.index.get(&cursor) else {
                break;
            };
            included.extend(block.transaction_hashes());
            if block.is_genesis() {
                break;
            }
            cursor = block.parent_hash();
        }
        included
    }

    fn apply(
        &mut self,
        mut block: Block,
        options: AddBlockOptions,
        config: &ChainConfig,
        metrics: &ChainMetrics,
    ) -> ChainResult<Outcome> {
        let hash = block.hash();
        let short = short_hex(&hash);

        if let Some(existing) = self.index.get(&hash) {
            if existing.same_content(&block) {
                debug!(block = %short, "Block already known");
                return Ok(Outcome::NotApplied);
            }
            return Err(ChainError::DuplicateBlock(hash));
        }

        if block.is_genesis() {
            warn!(block = %short, "Ignoring foreign genesis block");
            return Ok(Outcome::NotApplied);
        }

        let Some(parent) = self.index.entry(&block.parent_hash()) else {
            debug!(block = %short, parent = %short_hex(&block.parent_hash()), "Unknown parent");
            return Ok(Outcome::NotApplied);
        };
        let parent_number = parent.block.number();
        let parent_timestamp = parent.block.header.timestamp;
        let parent_td = parent.cumulative_difficulty;

        if block.number() != parent_number + 1 {
            debug!(
                block = %short,
                number = block.number(),
                parent_number,
                "Block number does not follow parent"
            );
            return Ok(Outcome::NotApplied);
        }
        if block.header.timestamp <= parent_timestamp {
            debug!(
                block = %short,
                timestamp = block.header.timestamp,
                parent_timestamp,
                "Timestamp does not advance past parent"
            );
            return Ok(Outcome::NotApplied);
        }
        if block.difficulty().is_zero() {
            debug!(block = %short, "Zero difficulty");
            return Ok(Outcome::NotApplied);
        }
        if let Err(violation) =
            validate_uncles(&block, &self.index, config.max_uncles, config.max_uncle_depth)
        {
            debug!(block = %short, %violation, "Invalid uncles");
            return Ok(Outcome::NotApplied);
        }
        if let Some(expected) = options.expected_parent {
            if expected != self.head.hash {
                debug!(block = %short, "Head moved since block was assembled");
                return Ok(Outcome::NotApplied);
            }
        }

        block.scratch.clear();
        let encoded =
            bincode::serialize(&block).map_err(|e| ChainError::Encoding(e.to_string()))?;
        let number = block.number();
        let cumulative = parent_td.saturating_add(block.difficulty());
        let block = Arc::new(block);

        self.index
            .put(hash, Arc::clone(&block), cumulative)
            .map_err(|_| ChainError::DuplicateBlock(hash))?;

        let previous_head = self.head.hash;
        let mut displaced = None;
        match select(&previous_head, &hash, &self.index) {
            Decision::RejectLowerDifficulty => {
                self.index.remove(&hash);
                return Ok(Outcome::NotApplied);
            }
            Decision::AdoptAsHead => {
                let forwarded = if options.forward_pending_transactions {
                    let ancestor = self.index.common_ancestor(previous_head, hash);
                    let included = self.included_since(hash, ancestor);
                    self.pending
                        .iter()
                        .filter(|tx| !included.contains(&tx.hash()))
                        .cloned()
                        .collect()
                } else {
                    Vec::new()
                };
                let pending = std::mem::replace(&mut self.pending, forwarded);
                let head = std::mem::replace(
                    &mut self.head,
                    ChainHead {
                        block: Arc::clone(&block),
                        hash,
                        cumulative_difficulty: cumulative,
                    },
                );
                displaced = Some((head, pending));
            }
            Decision::AcceptNonCanonical { higher_number } => {
                if higher_number {
                    warn!(
                        block = %short,
                        number,
                        head_number = self.head.number(),
                        "Block has higher number but lower total difficulty than head"
                    );
                }
            }
        }

        self.store.stage(BatchOperation::put(block_key(&hash), encoded));
        self.store.stage(BatchOperation::put(td_key(&hash), td_bytes(cumulative)));
        if self.head.hash == hash {
            self.store.stage(BatchOperation::put(HEAD_KEY.to_vec(), hash.to_vec()));
        }
        self.store.commit_reference_changes(number);
        self.store.cleanup(number);

        if let Err(e) = self.store.commit_batch() {
            self.store.rollback();
            self.index.remove(&hash);
            if let Some((head, pending)) = displaced {
                self.head = head;
                self.pending = pending;
            }
            metrics.record_commit_failure();
            error!(block = %short, error = %e, "Commit failed, block rolled back");
            return Err(ChainError::CommitFailed(e));
        }

        if self.head.hash != hash {
            metrics.record_non_canonical();
            debug!(block = %short, number, "Stored non-canonical block");
            return Ok(Outcome::Stored);
        }

        let is_reorg = block.parent_hash() != previous_head;
        metrics.record_head_change(is_reorg);
        if is_reorg {
            info!(
                block = %short,
                number,
                previous = %short_hex(&previous_head),
                "Chain reorganized"
            );
        } else {
            info!(block = %short, number, "New head");
        }

        Ok(Outcome::NewHead(HeadChange {
            head: self.head.clone(),
            previous_head,
            pending_transactions: self.pending.clone(),
            is_reorg,
        }))
    }
}

/// The block tree and its canonical head.
pub struct ChainStore {
    inner: RwLock<ChainInner>,
    /// Serializes `add_block` and observer notification.
    add_lock: Mutex<()>,
    observers: RwLock<Vec<Arc<dyn HeadObserver>>>,
    config: ChainConfig,
    metrics: Arc<ChainMetrics>,
}

impl ChainStore {
    /// Create a chain holding only `genesis`, committed to `store`.
    pub fn new(
        genesis: Block,
        mut store: Box<dyn StateStore>,
        config: ChainConfig,
    ) -> ChainResult<Self> {
        if !genesis.is_genesis() {
            return Err(ChainError::InvalidGenesis(format!(
                "number {} with parent {}",
                genesis.number(),
                short_hex(&genesis.parent_hash())
            )));
        }
        if genesis.difficulty().is_zero() {
            return Err(ChainError::InvalidGenesis("zero difficulty".into()));
        }

        let mut genesis = genesis;
        genesis.scratch.clear();
        let hash = genesis.hash();
        let td = genesis.difficulty();
        let encoded =
            bincode::serialize(&genesis).map_err(|e| ChainError::Encoding(e.to_string()))?;

        store.stage(BatchOperation::put(block_key(&hash), encoded));
        store.stage(BatchOperation::put(td_key(&hash), td_bytes(td)));
        store.stage(BatchOperation::put(HEAD_KEY.to_vec(), hash.to_vec()));
        store.commit_reference_changes(0);
        if let Err(e) = store.commit_batch() {
            store.rollback();
            return Err(e.into());
        }

        let genesis = Arc::new(genesis);
        let mut index = BlockIndex::new();
        index
            .put(hash, Arc::clone(&genesis), td)
            .map_err(|_| ChainError::DuplicateBlock(hash))?;

        info!(genesis = %short_hex(&hash), difficulty = %td, "Chain initialized");

        Ok(Self {
            inner: RwLock::new(ChainInner {
                index,
                head: ChainHead {
                    block: genesis,
                    hash,
                    cumulative_difficulty: td,
                },
                pending: Vec::new(),
                store,
            }),
            add_lock: Mutex::new(()),
            observers: RwLock::new(Vec::new()),
            config,
            metrics: Arc::new(ChainMetrics::new()),
        })
    }

    pub fn metrics(&self) -> Arc<ChainMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of indexed blocks, canonical or not.
    pub fn block_count(&self) -> usize {
        self.inner.read().index.len()
    }

    /// Observers still registered for head changes.
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Head and pending pool read together.
    pub fn head_with_pending(&self) -> (ChainHead, Vec<Transaction>) {
        let inner = self.inner.read();
        (inner.head.clone(), inner.pending.clone())
    }
}

impl ChainApi for ChainStore {
    #[tracing::instrument(skip_all, fields(number = block.number()))]
    fn add_block_with(&self, block: Block, options: AddBlockOptions) -> ChainResult<bool> {
        let _serial = self.add_lock.lock();

        let outcome = self
            .inner
            .write()
            .apply(block, options, &self.config, &self.metrics)?;

        let change = match outcome {
            Outcome::NotApplied => {
                self.metrics.record_not_applied();
                return Ok(false);
            }
            Outcome::Stored => return Ok(true),
            Outcome::NewHead(change) => change,
        };

        let observers = {
            let mut registered = self.observers.write();
            registered.retain(|o| o.is_active());
            registered.clone()
        };
        for observer in observers {
            observer.on_new_head(&change);
        }
        Ok(true)
    }

    fn head(&self) -> ChainHead {
        self.inner.read().head.clone()
    }

    fn get_block(&self, hash: &Hash) -> Option<Arc<Block>> {
        self.inner.read().index.get(hash)
    }

    fn cumulative_difficulty(&self, hash: &Hash) -> Option<U256> {
        self.inner.read().index.cumulative_difficulty(hash)
    }

    fn pending_transactions(&self) -> Vec<Transaction> {
        self.inner.read().pending.clone()
    }

    fn add_transaction(&self, tx: Transaction) -> bool {
        let mut inner = self.inner.write();
        let hash = tx.hash();
        if inner.pending.iter().any(|p| p.hash() == hash) {
            return false;
        }
        inner.pending.push(tx);
        true
    }

    fn register_head_observer(&self, observer: Arc<dyn HeadObserver>) {
        let mut registered = self.observers.write();
        registered.retain(|o| o.is_active());
        registered.push(observer);
    }
}
