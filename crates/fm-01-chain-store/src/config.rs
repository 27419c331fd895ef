//! Configuration for the chain store

use serde::Deserialize;

/// Chain validation settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum uncle headers per block.
    pub max_uncles: usize,

    /// How many generations back an uncle's parent may sit.
    pub max_uncle_depth: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_uncles: crate::DEFAULT_MAX_UNCLES,
            max_uncle_depth: crate::DEFAULT_MAX_UNCLE_DEPTH,
        }
    }
}
