//! Hashing helpers shared by headers, bodies and the miner.

use crate::entities::{BlockHeader, Hash, Transaction};
use sha3::{Digest, Keccak256};

/// Keccak-256 of a byte slice.
#[inline]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Root committing to an ordered list of uncle headers.
///
/// The empty list has a fixed, well-known root (hash of nothing).
pub fn uncles_hash(uncles: &[BlockHeader]) -> Hash {
    let mut hasher = Keccak256::new();
    for uncle in uncles {
        hasher.update(uncle.hash());
    }
    hasher.finalize().into()
}

/// Root committing to an ordered list of transactions.
pub fn transactions_root(transactions: &[Transaction]) -> Hash {
    let mut hasher = Keccak256::new();
    for tx in transactions {
        hasher.update(tx.hash());
    }
    hasher.finalize().into()
}

/// First four bytes of a hash as hex, for log fields.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}
