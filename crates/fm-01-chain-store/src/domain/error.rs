//! Error types for the chain store

use shared_types::Hash;

/// Failures reported by the storage collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("Batch commit failed: {0}")]
    CommitFailed(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Hard failures of `add_block`.
///
/// "Not applied" outcomes (unknown parent, invalid uncles, stale mined block)
/// are `Ok(false)`, never errors.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Duplicate block with conflicting content: {}", hex_hash(.0))]
    DuplicateBlock(Hash),

    #[error("Storage commit failed: {0}")]
    CommitFailed(#[from] StorageError),

    #[error("Invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("Block encoding failed: {0}")]
    Encoding(String),
}

impl ChainError {
    /// Whether the caller may retry the same operation later.
    ///
    /// Commit failures may be transient; conflicting duplicates never are.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::CommitFailed(_))
    }
}

fn hex_hash(hash: &Hash) -> String {
    shared_types::short_hex(hash)
}

/// Result type for chain store operations
pub type ChainResult<T> = Result<T, ChainError>;
