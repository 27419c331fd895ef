//! Messages exchanged between coordinator and worker.

use serde::{Deserialize, Serialize};
use shared_types::{Hash, Nonce, U256};

/// Work order for the worker. The most recently sent task is the only live
/// one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningTask {
    /// Header hash without the seal.
    pub mining_hash: Hash,
    pub block_number: u64,
    pub difficulty: U256,
}

/// A claimed solution, tagged with the task it was found for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundNonce {
    pub nonce: Nonce,
    pub mix_hash: Hash,
    pub mining_hash: Hash,
}

/// Periodic worker throughput report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashrateReport {
    pub hashes_per_second: u64,
}
