//! # Shared Types Crate
//!
//! Ledger entities used by every Forkmine crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: block, header and transaction layouts are
//!   defined once, here.
//! - **Stable Identity**: a block is identified by the Keccak-256 hash of its
//!   sealed header. Assembly-time scratch data never contributes to it.
//! - **Mining Hash**: the header hash with the seal (`nonce`, `mix_hash`)
//!   excluded. This is what a miner solves for.

pub mod entities;
pub mod hashing;

pub use entities::*;
pub use hashing::{keccak256, short_hex};
