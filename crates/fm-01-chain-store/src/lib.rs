//! # Forkmine - Chain Store (Subsystem 01)
//!
//! **Bounded Context:** Block tree, fork choice, canonical head
//!
//! ## Purpose
//!
//! Keeps every validated block together with its cumulative difficulty and
//! decides which one is the canonical head. Total work decides, never height.
//! Nothing becomes visible until the storage commit succeeds.
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - InMemoryStateStore, EphemeralStateStore          │
//! │  - RecordingBroadcaster                             │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: ChainApi                                │
//! │  - Outbound: StateStore, BlockBroadcaster,          │
//! │    HeadObserver                                     │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - BlockIndex                                       │
//! │  - ForkChoice (heaviest chain)                      │
//! │  - Uncle rules                                      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Parent Presence**: every indexed non-genesis block has its parent indexed
//! 2. **Cumulative Difficulty**: `cum(b) = cum(parent) + b.difficulty`
//! 3. **Heaviest Head**: head cumulative difficulty never decreases
//! 4. **Atomic Commit**: a failed commit leaves index, head and pending untouched

#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

mod config;
mod metrics;

pub use config::ChainConfig;
pub use metrics::{ChainMetrics, ChainMetricsSnapshot};

pub use domain::{
    BlockIndex, ChainError, ChainHead, ChainResult, Decision, HeadChange, IndexedBlock,
    StorageError, UncleViolation,
};

pub use ports::{
    AddBlockOptions, BatchOperation, BlockBroadcaster, BroadcastError, ChainApi, HeadObserver,
    StateStore,
};

pub use adapters::{EphemeralStateStore, InMemoryStateStore, RecordingBroadcaster};

pub use service::ChainStore;

/// Subsystem identifier
pub const SUBSYSTEM_ID: u8 = 1;

/// Default maximum uncles per block
pub const DEFAULT_MAX_UNCLES: usize = 2;

/// Default uncle depth window (generations)
pub const DEFAULT_MAX_UNCLE_DEPTH: usize = 6;
