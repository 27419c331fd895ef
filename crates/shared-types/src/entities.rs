//! # Core Ledger Entities
//!
//! - **Chain**: `BlockHeader`, `Block`, `AssemblyScratch`
//! - **Execution**: `Transaction`, `Receipt`

use crate::hashing::{keccak256, transactions_root, uncles_hash};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

// Re-export U256 from primitive-types for difficulty arithmetic everywhere
pub use primitive_types::U256;

/// A 32-byte Keccak-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// An 8-byte proof-of-work nonce (big-endian).
pub type Nonce = [u8; 8];

/// The all-zero hash, used as the genesis parent.
pub const ZERO_HASH: Hash = [0u8; 32];

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// Block header. Everything that determines a block's identity lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the parent block; `ZERO_HASH` for genesis.
    pub parent_hash: Hash,
    /// Commitment to the ordered uncle headers.
    pub uncles_hash: Hash,
    /// Beneficiary of the block reward.
    pub coinbase: Address,
    /// Post-execution state identity.
    pub state_root: Hash,
    /// Commitment to the ordered body transactions.
    pub transactions_root: Hash,
    /// Height; parent number + 1, genesis is 0.
    pub number: u64,
    /// This block's own proof-of-work difficulty. Always positive.
    pub difficulty: U256,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    /// Free-form bytes (at most 32 by convention).
    pub extra_data: Vec<u8>,
    /// Mix digest of the proof-of-work; zero until sealed.
    pub mix_hash: Hash,
    /// Proof-of-work nonce; zero until sealed.
    pub nonce: Nonce,
}

impl BlockHeader {
    /// Hash of the header without its seal. Miners solve for this.
    pub fn mining_hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        self.feed_unsealed(&mut hasher);
        hasher.finalize().into()
    }

    /// Identity hash of the sealed header.
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        self.feed_unsealed(&mut hasher);
        hasher.update(self.mix_hash);
        hasher.update(self.nonce);
        hasher.finalize().into()
    }

    fn feed_unsealed(&self, hasher: &mut Keccak256) {
        hasher.update(self.parent_hash);
        hasher.update(self.uncles_hash);
        hasher.update(self.coinbase);
        hasher.update(self.state_root);
        hasher.update(self.transactions_root);
        hasher.update(self.number.to_be_bytes());
        let mut difficulty = [0u8; 32];
        self.difficulty.to_big_endian(&mut difficulty);
        hasher.update(difficulty);
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update((self.extra_data.len() as u64).to_be_bytes());
        hasher.update(&self.extra_data);
    }

    /// Genesis has number 0 and no parent.
    pub fn is_genesis(&self) -> bool {
        self.number == 0 && self.parent_hash == ZERO_HASH
    }

    /// Whether a proof-of-work solution has been attached.
    pub fn is_sealed(&self) -> bool {
        self.nonce != [0u8; 8] || self.mix_hash != ZERO_HASH
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            parent_hash: ZERO_HASH,
            uncles_hash: keccak256(&[]),
            coinbase: [0u8; 20],
            state_root: ZERO_HASH,
            transactions_root: keccak256(&[]),
            number: 0,
            difficulty: U256::one(),
            timestamp: 0,
            extra_data: Vec::new(),
            mix_hash: ZERO_HASH,
            nonce: [0u8; 8],
        }
    }
}

/// Working state attached to a block while it is being assembled.
///
/// Not part of block identity. Cleared as soon as the block is committed.
#[derive(Debug, Clone, Default)]
pub struct AssemblyScratch {
    /// Transactions considered while building the block.
    pub pending_transactions: Vec<Transaction>,
    /// Receipts produced while executing the body.
    pub receipts: Vec<Receipt>,
}

impl AssemblyScratch {
    /// Drop all assembly-time lists.
    pub fn clear(&mut self) {
        self.pending_transactions.clear();
        self.receipts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending_transactions.is_empty() && self.receipts.is_empty()
    }
}

/// A full block: header, uncle headers and body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    /// Ordered uncle headers referenced for partial credit.
    pub uncles: Vec<BlockHeader>,
    /// Ordered body transactions.
    pub transactions: Vec<Transaction>,
    /// Assembly-time working state, never serialized.
    #[serde(skip)]
    pub scratch: AssemblyScratch,
}

impl Block {
    /// Build a block, deriving the header's body commitments.
    pub fn new(
        mut header: BlockHeader,
        transactions: Vec<Transaction>,
        uncles: Vec<BlockHeader>,
    ) -> Self {
        header.uncles_hash = uncles_hash(&uncles);
        header.transactions_root = transactions_root(&transactions);
        Self {
            header,
            uncles,
            transactions,
            scratch: AssemblyScratch::default(),
        }
    }

    /// Identity hash.
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    pub fn difficulty(&self) -> U256 {
        self.header.difficulty
    }

    pub fn is_genesis(&self) -> bool {
        self.header.is_genesis()
    }

    /// Attach a proof-of-work solution.
    pub fn seal(&mut self, nonce: Nonce, mix_hash: Hash) {
        self.header.nonce = nonce;
        self.header.mix_hash = mix_hash;
    }

    /// Whether the header's uncle commitment matches the uncle list.
    pub fn uncles_hash_matches(&self) -> bool {
        self.header.uncles_hash == uncles_hash(&self.uncles)
    }

    /// Hashes of the body transactions, in order.
    pub fn transaction_hashes(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::hash).collect()
    }

    /// Content equality ignoring assembly scratch.
    pub fn same_content(&self, other: &Block) -> bool {
        self.header == other.header
            && self.uncles == other.uncles
            && self.transactions == other.transactions
    }
}

// =============================================================================
// CLUSTER B: EXECUTION
// =============================================================================

/// A transaction as carried in block bodies and the pending pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    /// Sender's account nonce.
    pub nonce: u64,
    /// Recipient; `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Vec<u8>,
}

impl Transaction {
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(self.sender);
        hasher.update(self.nonce.to_be_bytes());
        match &self.to {
            Some(to) => {
                hasher.update([1u8]);
                hasher.update(to);
            }
            None => hasher.update([0u8]),
        }
        let mut value = [0u8; 32];
        self.value.to_big_endian(&mut value);
        hasher.update(value);
        hasher.update(&self.data);
        hasher.finalize().into()
    }
}

/// Outcome of executing one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_hash: Hash,
    /// Intermediate state root after this transaction.
    pub state_root: Hash,
    pub gas_used: u64,
}
