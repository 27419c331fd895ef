//! # Forkmine - Mining (Subsystem 02)
//!
//! **Bounded Context:** Local block production by proof-of-work
//!
//! ## Purpose
//!
//! Keeps a worker hashing on a candidate child of the current head. Every
//! head change supersedes the outstanding task; a solution for a superseded
//! task never produces a block.
//!
//! ## Architecture
//!
//! ```text
//!  ChainStore ──HeadObserver──► MiningCoordinator ──Mine/Stop──► MiningWorker
//!      ▲                              │          ◄──FoundNonce──   (own thread,
//!      └──────── add_block ───────────┘          ◄──Hashrate────    own runtime)
//! ```
//!
//! ## Module Structure
//!
//! - [`domain`]: task messages, difficulty, PoW hashing, block assembly
//! - [`channel`]: the full-duplex coordinator/worker link
//! - [`worker`]: isolated hashing loop
//! - [`coordinator`]: task issuing, nonce handling, worker supervision

#![warn(clippy::all)]

pub mod channel;
pub mod coordinator;
pub mod domain;
pub mod ports;
pub mod worker;

mod config;
mod error;
mod metrics;

pub use config::{parse_address, DifficultyConfig, MinerConfig};
pub use error::{MiningError, Result};
pub use metrics::{MiningMetrics, MiningMetricsSnapshot};

pub use channel::{
    mining_task_channel, CoordinatorMessage, MiningTaskChannel, WorkerEndpoint, WorkerMessage,
};
pub use coordinator::{MiningCoordinator, NonceOutcome};
pub use domain::{BlockAssembler, CacheStore, FoundNonce, HashrateReport, MiningTask};
pub use ports::{SystemTimeSource, TimeSource};
pub use worker::MiningWorker;

/// Subsystem identifier
pub const SUBSYSTEM_ID: u8 = 2;

/// Warm-up pause before each attempt, matching the dev chain's pacing
pub const DEFAULT_WARMUP_DELAY_MS: u64 = 1_000;
