//! # Proof-of-Work
//!
//! Light-client style hashing over a per-epoch verification cache.
//!
//! - `VerificationCache`: pseudo-random items derived from the epoch seed
//! - `CacheStore`: bounded set of caches shared by `Arc`
//! - `hashimoto_light`: mixes the mining hash and nonce through the cache
//!
//! The cache is deliberately small; this is a development chain PoW, not a
//! memory-hard production algorithm.

use parking_lot::Mutex;
use sha3::{Digest, Keccak256};
use shared_types::{keccak256, BlockHeader, Hash, Nonce, U256, ZERO_HASH};
use std::collections::VecDeque;
use std::sync::Arc;

/// Blocks per cache epoch.
pub const EPOCH_LENGTH: u64 = 30_000;

/// Items in a verification cache.
pub const CACHE_ITEMS: usize = 1024;

/// Cache lookups per hash.
pub const MIX_ROUNDS: usize = 16;

/// Epoch caches kept alive at once (current and next).
pub const MAX_CACHED_EPOCHS: usize = 2;

pub fn epoch_of(block_number: u64) -> u64 {
    block_number / EPOCH_LENGTH
}

/// Seed of an epoch: `keccak` applied `epoch` times to the zero hash.
pub fn seed_hash(epoch: u64) -> Hash {
    (0..epoch).fold(ZERO_HASH, |seed, _| keccak256(&seed))
}

/// Verification cache for one epoch.
#[derive(Debug)]
pub struct VerificationCache {
    epoch: u64,
    items: Vec<Hash>,
}

impl VerificationCache {
    pub fn for_block(block_number: u64) -> Self {
        let epoch = epoch_of(block_number);
        let mut items = Vec::with_capacity(CACHE_ITEMS);
        let mut item = keccak256(&seed_hash(epoch));
        for _ in 0..CACHE_ITEMS {
            items.push(item);
            item = keccak256(&item);
        }
        Self { epoch, items }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn item(&self, selector: &Hash) -> &Hash {
        let idx = u32::from_be_bytes([selector[0], selector[1], selector[2], selector[3]]);
        &self.items[idx as usize % self.items.len()]
    }
}

/// Bounded, shared cache of epoch caches.
#[derive(Debug, Default)]
pub struct CacheStore {
    caches: Mutex<VecDeque<Arc<VerificationCache>>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache for the epoch of `block_number`, generated on first use.
    pub fn get(&self, block_number: u64) -> Arc<VerificationCache> {
        let epoch = epoch_of(block_number);
        let mut caches = self.caches.lock();
        if let Some(cache) = caches.iter().find(|c| c.epoch == epoch) {
            return Arc::clone(cache);
        }

        let cache = Arc::new(VerificationCache::for_block(block_number));
        caches.push_back(Arc::clone(&cache));
        while caches.len() > MAX_CACHED_EPOCHS {
            caches.pop_front();
        }
        cache
    }

    pub fn len(&self) -> usize {
        self.caches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of one hashing round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowOutput {
    pub mix_hash: Hash,
    pub result: Hash,
}

pub fn hashimoto_light(cache: &VerificationCache, mining_hash: &Hash, nonce: &Nonce) -> PowOutput {
    let mut hasher = Keccak256::new();
    hasher.update(mining_hash);
    hasher.update(nonce);
    let mut mix: Hash = hasher.finalize().into();

    for _ in 0..MIX_ROUNDS {
        let mut hasher = Keccak256::new();
        hasher.update(mix);
        hasher.update(cache.item(&mix));
        mix = hasher.finalize().into();
    }

    let mut hasher = Keccak256::new();
    hasher.update(mining_hash);
    hasher.update(nonce);
    hasher.update(mix);
    PowOutput {
        mix_hash: mix,
        result: hasher.finalize().into(),
    }
}

/// Largest acceptable result for `difficulty`.
pub fn boundary(difficulty: U256) -> U256 {
    if difficulty.is_zero() {
        return U256::MAX;
    }
    U256::MAX / difficulty
}

pub fn meets_boundary(result: &Hash, boundary: U256) -> bool {
    U256::from_big_endian(result) <= boundary
}

/// Full seal check: mix hash matches and result is under the boundary.
pub fn verify_seal(header: &BlockHeader, cache: &VerificationCache) -> bool {
    let out = hashimoto_light(cache, &header.mining_hash(), &header.nonce);
    out.mix_hash == header.mix_hash && meets_boundary(&out.result, boundary(header.difficulty))
}
