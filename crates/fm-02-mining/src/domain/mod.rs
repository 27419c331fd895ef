//! Domain layer for mining
//!
//! Pure logic: task messages, difficulty, proof-of-work, block assembly.

pub mod assembler;
pub mod difficulty;
pub mod pow;
mod task;

pub use assembler::BlockAssembler;
pub use difficulty::calc_difficulty;
pub use pow::{CacheStore, VerificationCache};
pub use task::*;
