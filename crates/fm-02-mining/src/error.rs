//! Error types for the mining subsystem

use fm_01_chain_store::ChainError;
use thiserror::Error;

/// Result type alias for mining operations
pub type Result<T> = std::result::Result<T, MiningError>;

/// Errors that can occur while coordinating mining
#[derive(Debug, Error)]
pub enum MiningError {
    /// The worker side of the task channel is gone
    #[error("Mining channel closed")]
    ChannelClosed,

    /// The worker thread exited without being asked to
    #[error("Mining worker lost: {0}")]
    WorkerLost(String),

    /// Spawning the worker thread or its runtime failed
    #[error("Failed to spawn mining worker: {0}")]
    WorkerSpawn(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Submitting the mined block failed
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

impl MiningError {
    /// Whether mining can continue after this error.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ChannelClosed | Self::WorkerLost(_) => true,
            Self::Chain(e) => e.is_recoverable(),
            Self::WorkerSpawn(_) | Self::InvalidConfig(_) | Self::TaskJoin(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_01_chain_store::StorageError;

    #[test]
    fn test_recoverability() {
        assert!(MiningError::WorkerLost("exit".into()).is_recoverable());
        assert!(MiningError::from(ChainError::from(StorageError::CommitFailed("x".into())))
            .is_recoverable());
        assert!(!MiningError::InvalidConfig("cpu".into()).is_recoverable());
    }
}
