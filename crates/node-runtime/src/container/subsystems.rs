//! Subsystem wiring.
//!
//! ```text
//! genesis ──► ChainStore ◄── add_block ── MiningCoordinator ──► MiningWorker
//!                 │                             ▲
//!                 └──────── head changes ───────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use fm_01_chain_store::{
    BlockBroadcaster, ChainApi, ChainStore, EphemeralStateStore, InMemoryStateStore, StateStore,
};
use fm_02_mining::MiningCoordinator;
use shared_types::short_hex;
use tracing::info;

use crate::adapters::LoggingBroadcaster;
use crate::container::config::NodeConfig;
use crate::genesis::{GenesisBuilder, GenesisConfig};

/// Shared subsystem instances.
pub struct NodeContainer {
    pub chain: Arc<ChainStore>,
    pub broadcaster: Arc<dyn BlockBroadcaster>,
    pub config: NodeConfig,
}

impl NodeContainer {
    /// Build the genesis block and the chain store with the logging
    /// broadcaster.
    pub fn new(config: NodeConfig) -> Result<Self> {
        Self::with_broadcaster(config, Arc::new(LoggingBroadcaster))
    }

    pub fn with_broadcaster(
        config: NodeConfig,
        broadcaster: Arc<dyn BlockBroadcaster>,
    ) -> Result<Self> {
        config.validate()?;

        let genesis = GenesisBuilder::new(GenesisConfig {
            difficulty: config.mining.difficulty.genesis_difficulty,
            ..Default::default()
        })
        .build()
        .context("building genesis block")?;

        let store: Box<dyn StateStore> = if config.storage.ephemeral {
            Box::new(EphemeralStateStore::new())
        } else {
            Box::new(InMemoryStateStore::with_prune_depth(
                config.storage.prune_depth,
            ))
        };

        let chain = ChainStore::new(genesis, store, config.chain.clone())
            .context("initializing chain store")?;

        info!(
            head = %short_hex(&chain.head().hash),
            ephemeral = config.storage.ephemeral,
            "Chain store ready"
        );

        Ok(Self {
            chain: Arc::new(chain),
            broadcaster,
            config,
        })
    }

    /// A coordinator mining on top of this container's chain.
    pub fn mining_coordinator(&self) -> Result<MiningCoordinator> {
        MiningCoordinator::new(
            Arc::clone(&self.chain),
            Arc::clone(&self.broadcaster),
            self.config.mining.clone(),
        )
        .context("creating mining coordinator")
    }
}
