//! Configuration types for mining

use crate::error::MiningError;
use serde::{Deserialize, Deserializer};
use shared_types::Address;

/// Miner runtime configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MinerConfig {
    /// Start the worker at all
    pub enabled: bool,

    /// Share of wall time spent hashing, 1..=100
    pub cpu_pct: u8,

    /// Pause before the first hashing round of each attempt
    pub warmup_delay_ms: u64,

    /// How often the worker reports its hashrate
    pub hashrate_interval_ms: u64,

    /// Nonces tried between two stop-flag checks
    pub preempt_check_interval: u64,

    /// `false` accepts the first round of every attempt (fake mining)
    pub verify_pow: bool,

    /// Block reward beneficiary, hex with optional `0x`
    #[serde(deserialize_with = "deserialize_address")]
    pub coinbase: Address,

    /// Written into each mined header, truncated to 32 bytes
    pub extra_data: String,

    /// Delay before a lost worker is restarted
    pub restart_backoff_ms: u64,

    pub difficulty: DifficultyConfig,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cpu_pct: 100,
            warmup_delay_ms: crate::DEFAULT_WARMUP_DELAY_MS,
            hashrate_interval_ms: 1_000,
            preempt_check_interval: 1_000,
            verify_pow: false,
            coinbase: [0u8; 20],
            extra_data: "forkmine".to_string(),
            restart_backoff_ms: 500,
            difficulty: DifficultyConfig::default(),
        }
    }
}

impl MinerConfig {
    pub fn validate(&self) -> Result<(), MiningError> {
        if !(1..=100).contains(&self.cpu_pct) {
            return Err(MiningError::InvalidConfig(format!(
                "cpu_pct must be within 1..=100, got {}",
                self.cpu_pct
            )));
        }
        if self.hashrate_interval_ms == 0 {
            return Err(MiningError::InvalidConfig(
                "hashrate_interval_ms must be positive".into(),
            ));
        }
        if self.preempt_check_interval == 0 {
            return Err(MiningError::InvalidConfig(
                "preempt_check_interval must be positive".into(),
            ));
        }
        self.difficulty.validate()
    }
}

/// Difficulty rule parameters.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DifficultyConfig {
    pub genesis_difficulty: u64,
    pub block_diff_factor: u64,
    pub min_difficulty: u64,
    /// Blocks faster than this raise difficulty
    pub adjustment_cutoff_secs: u64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            genesis_difficulty: 1024,
            block_diff_factor: 16,
            min_difficulty: 131_072,
            adjustment_cutoff_secs: 13,
        }
    }
}

impl DifficultyConfig {
    pub fn validate(&self) -> Result<(), MiningError> {
        if self.genesis_difficulty == 0 {
            return Err(MiningError::InvalidConfig(
                "genesis_difficulty must be positive".into(),
            ));
        }
        if self.block_diff_factor == 0 {
            return Err(MiningError::InvalidConfig(
                "block_diff_factor must be positive".into(),
            ));
        }
        Ok(())
    }
}

pub fn parse_address(s: &str) -> Result<Address, String> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("address must be 20 bytes, got {}", b.len()))
}

fn deserialize_address<'de, D>(deserializer: D) -> Result<Address, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_address(&s).map_err(serde::de::Error::custom)
}
