//! # Node Configuration
//!
//! Unified configuration for the chain, the miner, storage and logging.
//!
//! Precedence, lowest first: defaults, TOML file, `FM_*` environment
//! variables, command-line flags (applied by `main`).

use fm_01_chain_store::ChainConfig;
use fm_02_mining::MinerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeConfig {
    pub chain: ChainConfig,
    pub mining: MinerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Storage backend selection.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Discard every commit (throwaway dev chain).
    pub ephemeral: bool,
    /// Blocks of reference bookkeeping kept by the in-memory store.
    pub prune_depth: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ephemeral: true,
            prune_depth: 128,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl NodeConfig {
    /// Defaults overlaid with the TOML file at `path`, if any.
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `FM_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply `FM_*` overrides from `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("FM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(value) = lookup("FM_CPU_PCT") {
            self.mining.cpu_pct = parse_env("FM_CPU_PCT", value)?;
        }
        if let Some(value) = lookup("FM_MINING_DELAY_MS") {
            self.mining.warmup_delay_ms = parse_env("FM_MINING_DELAY_MS", value)?;
        }
        if let Some(value) = lookup("FM_EPHEMERAL") {
            self.storage.ephemeral = parse_env("FM_EPHEMERAL", value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mining
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.level is empty".into()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
