//! # Genesis Block Builder
//!
//! Creates the genesis block for a fresh development chain.

use shared_types::{Address, Block, BlockHeader, U256, ZERO_HASH};
use thiserror::Error;

/// Genesis block creation errors.
#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("Invalid genesis configuration: {0}")]
    InvalidConfig(String),
}

/// Genesis block configuration.
#[derive(Debug, Clone)]
pub struct GenesisConfig {
    /// Proof-of-work difficulty of the genesis block.
    pub difficulty: u64,

    /// Genesis timestamp (Unix seconds). Fixed so every dev node agrees.
    pub timestamp: u64,

    pub coinbase: Address,

    /// Extra data (max 32 bytes).
    pub extra_data: Vec<u8>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            difficulty: 1024,
            timestamp: 0,
            coinbase: [0u8; 20],
            extra_data: b"Forkmine Genesis".to_vec(),
        }
    }
}

impl GenesisConfig {
    pub fn validate(&self) -> Result<(), GenesisError> {
        if self.difficulty == 0 {
            return Err(GenesisError::InvalidConfig(
                "Genesis difficulty must be positive".to_string(),
            ));
        }
        if self.extra_data.len() > 32 {
            return Err(GenesisError::InvalidConfig(
                "Extra data exceeds 32 bytes".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for creating genesis blocks.
pub struct GenesisBuilder {
    config: GenesisConfig,
}

impl GenesisBuilder {
    pub fn new(config: GenesisConfig) -> Self {
        Self { config }
    }

    /// Build the genesis block: number 0, zero parent, empty body.
    pub fn build(self) -> Result<Block, GenesisError> {
        self.config.validate()?;

        let header = BlockHeader {
            parent_hash: ZERO_HASH,
            coinbase: self.config.coinbase,
            number: 0,
            difficulty: U256::from(self.config.difficulty),
            timestamp: self.config.timestamp,
            extra_data: self.config.extra_data,
            ..Default::default()
        };
        Ok(Block::new(header, Vec::new(), Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_is_deterministic() {
        let a = GenesisBuilder::new(GenesisConfig::default()).build().unwrap();
        let b = GenesisBuilder::new(GenesisConfig::default()).build().unwrap();

        assert_eq!(a.hash(), b.hash());
        assert!(a.is_genesis());
        assert_eq!(a.difficulty(), U256::from(1024));
    }

    #[test]
    fn test_zero_difficulty_rejected() {
        let config = GenesisConfig {
            difficulty: 0,
            ..Default::default()
        };
        assert!(GenesisBuilder::new(config).build().is_err());
    }

    #[test]
    fn test_long_extra_data_rejected() {
        let config = GenesisConfig {
            extra_data: vec![0; 33],
            ..Default::default()
        };
        assert!(GenesisBuilder::new(config).build().is_err());
    }
}
