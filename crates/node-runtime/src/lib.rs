//! # Forkmine Node Runtime
//!
//! Library half of the `forkmine-node` binary, exposed for tests.
//!
//! ```text
//! forkmine.toml ─┐
//! FM_* env ──────┼─► NodeConfig ─► NodeContainer ─► NodeRuntime
//! CLI flags ─────┘                 (genesis, chain,   (miner task,
//!                                   broadcaster)       shutdown)
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod runtime;

pub use container::{ConfigError, NodeConfig, NodeContainer};
pub use runtime::NodeRuntime;
