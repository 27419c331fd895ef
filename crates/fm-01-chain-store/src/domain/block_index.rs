//! Block index
//!
//! Maps block identity to the block and its cumulative chain difficulty.
//! Pure data: no locking and no policy. `ChainStore` serializes access.

use shared_types::{Block, Hash, U256};
use std::collections::HashMap;
use std::sync::Arc;

/// An indexed block together with its cumulative difficulty.
#[derive(Clone, Debug)]
pub struct IndexedBlock {
    pub block: Arc<Block>,
    /// Own difficulty plus the parent's cumulative difficulty.
    pub cumulative_difficulty: U256,
}

/// Returned by `put` when the hash is already indexed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("block already indexed")]
pub struct DuplicateBlock;

/// Block tree index.
///
/// INVARIANT: every entry except genesis has its parent present.
#[derive(Debug, Default)]
pub struct BlockIndex {
    entries: HashMap<Hash, IndexedBlock>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a block by hash.
    pub fn get(&self, hash: &Hash) -> Option<Arc<Block>> {
        self.entries.get(hash).map(|e| Arc::clone(&e.block))
    }

    /// Look up the full entry by hash.
    pub fn entry(&self, hash: &Hash) -> Option<&IndexedBlock> {
        self.entries.get(hash)
    }

    /// Insert a block. An existing entry is left untouched.
    pub fn put(
        &mut self,
        hash: Hash,
        block: Arc<Block>,
        cumulative_difficulty: U256,
    ) -> Result<(), DuplicateBlock> {
        if self.entries.contains_key(&hash) {
            return Err(DuplicateBlock);
        }
        self.entries.insert(
            hash,
            IndexedBlock {
                block,
                cumulative_difficulty,
            },
        );
        Ok(())
    }

    /// Cumulative difficulty of a block; `None` for unknown blocks.
    pub fn cumulative_difficulty(&self, hash: &Hash) -> Option<U256> {
        self.entries.get(hash).map(|e| e.cumulative_difficulty)
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.entries.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Undo an insert. Only used to roll back a failed commit.
    pub(crate) fn remove(&mut self, hash: &Hash) -> Option<IndexedBlock> {
        self.entries.remove(hash)
    }

    /// Walk ancestors starting at `from` (inclusive), newest first, for at
    /// most `limit` blocks. Stops early at genesis or an unknown block.
    pub fn ancestors(&self, from: Hash, limit: usize) -> Vec<Arc<Block>> {
        let mut out = Vec::with_capacity(limit.min(64));
        let mut cursor = from;
        while out.len() < limit {
            let Some(entry) = self.entries.get(&cursor) else {
                break;
            };
            out.push(Arc::clone(&entry.block));
            if entry.block.is_genesis() {
                break;
            }
            cursor = entry.block.parent_hash();
        }
        out
    }

    /// Closest common ancestor of two indexed blocks.
    pub fn common_ancestor(&self, a: Hash, b: Hash) -> Option<Hash> {
        let mut a = self.entries.get(&a)?.block.clone();
        let mut b = self.entries.get(&b)?.block.clone();

        while a.number() > b.number() {
            a = self.get(&a.parent_hash())?;
        }
        while b.number() > a.number() {
            b = self.get(&b.parent_hash())?;
        }
        while a.hash() != b.hash() {
            if a.is_genesis() || b.is_genesis() {
                return None;
            }
            a = self.get(&a.parent_hash())?;
            b = self.get(&b.parent_hash())?;
        }
        Some(a.hash())
    }
}
