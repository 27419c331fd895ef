//! # Genesis Module
//!
//! The genesis block is the root of the block tree:
//!
//! - Number: 0
//! - Parent hash: 32 zero bytes
//! - Difficulty: configured genesis difficulty (its cumulative difficulty too)
//! - Body: empty

pub mod builder;

pub use builder::{GenesisBuilder, GenesisConfig, GenesisError};
