//! # Node Runtime
//!
//! Owns the container and the mining task, and drives graceful shutdown
//! through a `watch` channel.

use std::sync::Arc;

use anyhow::{Context, Result};
use fm_01_chain_store::{ChainApi, ChainStore};
use fm_02_mining::{MiningError, MiningMetrics};
use shared_types::short_hex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::container::{NodeConfig, NodeContainer};

pub struct NodeRuntime {
    container: NodeContainer,
    mining_metrics: Option<Arc<MiningMetrics>>,
    miner: Option<JoinHandle<Result<(), MiningError>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        info!("Creating Forkmine node runtime");
        Ok(Self::from_container(NodeContainer::new(config)?))
    }

    pub fn from_container(container: NodeContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container,
            mining_metrics: None,
            miner: None,
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn chain(&self) -> Arc<ChainStore> {
        Arc::clone(&self.container.chain)
    }

    pub fn mining_metrics(&self) -> Option<Arc<MiningMetrics>> {
        self.mining_metrics.clone()
    }

    /// Spawn the mining coordinator.
    pub fn start(&mut self) -> Result<()> {
        let coordinator = self.container.mining_coordinator()?;
        self.mining_metrics = Some(coordinator.metrics());
        self.miner = Some(tokio::spawn(coordinator.run(self.shutdown_rx.clone())));

        let head = self.container.chain.head();
        info!(
            head = %short_hex(&head.hash),
            number = head.number(),
            mining = self.container.config.mining.enabled,
            cpu_pct = self.container.config.mining.cpu_pct,
            "Node started"
        );
        Ok(())
    }

    /// Signal shutdown and wait for the miner to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down node");
        // Receivers may already be gone if the miner exited on its own.
        let _ = self.shutdown_tx.send(true);

        if let Some(miner) = self.miner.take() {
            miner
                .await
                .context("mining coordinator panicked")?
                .context("mining coordinator failed")?;
        }

        let head = self.container.chain.head();
        let chain = self.container.chain.metrics().snapshot();
        info!(
            head = %short_hex(&head.hash),
            number = head.number(),
            total_difficulty = %head.cumulative_difficulty,
            blocks_added = chain.blocks_added,
            reorgs = chain.reorgs,
            "Node stopped"
        );
        if let Some(metrics) = &self.mining_metrics {
            let mining = metrics.snapshot();
            info!(
                blocks_mined = mining.blocks_mined,
                blocks_adopted = mining.blocks_adopted,
                stale_nonces = mining.stale_nonces,
                worker_restarts = mining.worker_restarts,
                "Mining summary"
            );
        }
        Ok(())
    }
}
