//! # Node Container
//!
//! Builds the chain store and the miner from a [`NodeConfig`] and owns
//! them for the lifetime of the node.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, LoggingConfig, NodeConfig, StorageConfig};
pub use subsystems::NodeContainer;
