//! # Mining Flows
//!
//! A real worker thread mining on a live chain store while blocks arrive
//! from elsewhere.

use std::sync::Arc;
use std::time::Duration;

use fm_01_chain_store::{ChainApi, ChainStore, RecordingBroadcaster};
use fm_02_mining::domain::pow::verify_seal;
use fm_02_mining::domain::VerificationCache;
use fm_02_mining::{MinerConfig, MiningCoordinator, MiningError};
use node_runtime::{NodeConfig, NodeContainer, NodeRuntime};
use shared_types::{Block, Hash};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use super::fixtures::*;

struct Harness {
    chain: Arc<ChainStore>,
    broadcaster: RecordingBroadcaster,
    stop: watch::Sender<bool>,
    handle: JoinHandle<Result<(), MiningError>>,
}

impl Harness {
    fn start(genesis_difficulty: u64, config: MinerConfig) -> Self {
        let (chain, _store) = chain_with_store(genesis(genesis_difficulty));
        let broadcaster = RecordingBroadcaster::new();
        let coordinator =
            MiningCoordinator::new(Arc::clone(&chain), Arc::new(broadcaster.clone()), config)
                .unwrap();
        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(coordinator.run(stop_rx));
        Self {
            chain,
            broadcaster,
            stop,
            handle,
        }
    }

    async fn wait_for<F: Fn(&ChainStore) -> bool>(&self, condition: F) {
        timeout(Duration::from_secs(20), async {
            while !condition(&self.chain) {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    async fn stop(self) -> Arc<ChainStore> {
        self.stop.send(true).unwrap();
        timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("coordinator did not stop")
            .unwrap()
            .unwrap();
        self.chain
    }
}

fn fake_config() -> MinerConfig {
    MinerConfig {
        warmup_delay_ms: 0,
        ..Default::default()
    }
}

/// Canonical chain from head back to genesis.
fn canonical(chain: &ChainStore) -> Vec<Arc<Block>> {
    let mut blocks = Vec::new();
    let mut cursor = chain.get_block(&chain.head().hash);
    while let Some(block) = cursor {
        cursor = if block.is_genesis() {
            None
        } else {
            chain.get_block(&block.parent_hash())
        };
        blocks.push(block);
    }
    blocks
}

fn descends_from(chain: &ChainStore, ancestor: Hash) -> bool {
    canonical(chain).iter().any(|b| b.hash() == ancestor)
}

#[tokio::test]
async fn test_real_proof_of_work_chain_verifies() {
    let config = MinerConfig {
        verify_pow: true,
        ..fake_config()
    };
    let harness = Harness::start(64, config);
    harness.wait_for(|c| c.head().number() >= 3).await;
    let chain = harness.stop().await;

    let blocks = canonical(&chain);
    assert!(blocks.len() >= 4);
    for block in blocks.iter().filter(|b| !b.is_genesis()) {
        let cache = VerificationCache::for_block(block.number());
        assert!(verify_seal(&block.header, &cache), "bad seal at {}", block.number());
    }
}

#[tokio::test]
async fn test_miner_follows_heavier_network_block() {
    let harness = Harness::start(GENESIS_DIFFICULTY, fake_config());
    harness.wait_for(|c| c.head().number() >= 1).await;

    let head = harness.chain.head();
    let network = child(&head.block, 10_000_000, 0xee);
    assert!(harness.chain.add_block(network.clone(), false).unwrap());

    let network_hash = network.hash();
    let target = network.number() + 2;
    harness
        .wait_for(|c| c.head().number() >= target && descends_from(c, network_hash))
        .await;

    let broadcaster = harness.broadcaster.clone();
    let chain = harness.stop().await;

    // The network block is never announced by the local miner
    assert!(broadcaster
        .announcements()
        .iter()
        .all(|a| a.hash != network_hash));
    assert!(descends_from(&chain, network_hash));
}

#[tokio::test]
async fn test_pending_transaction_is_mined_once() {
    let harness = Harness::start(GENESIS_DIFFICULTY, fake_config());
    harness.chain.add_transaction(tx(1));

    harness
        .wait_for(|c| {
            canonical(c)
                .iter()
                .any(|b| b.transactions.contains(&tx(1)))
        })
        .await;
    let chain = harness.stop().await;

    assert!(chain.pending_transactions().is_empty());
    let inclusions = canonical(&chain)
        .iter()
        .filter(|b| b.transactions.contains(&tx(1)))
        .count();
    assert_eq!(inclusions, 1);
}

#[tokio::test]
async fn test_node_runtime_announces_every_adopted_block() {
    let mut config = NodeConfig::default();
    config.mining.warmup_delay_ms = 0;
    config.storage.ephemeral = false;

    let broadcaster = RecordingBroadcaster::new();
    let container = NodeContainer::with_broadcaster(config, Arc::new(broadcaster.clone())).unwrap();
    let mut runtime = NodeRuntime::from_container(container);
    let chain = runtime.chain();
    runtime.start().unwrap();

    timeout(Duration::from_secs(20), async {
        while chain.head().number() < 3 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let metrics = runtime.mining_metrics().unwrap();
    runtime.shutdown().await.unwrap();

    let adopted = metrics.snapshot().blocks_adopted;
    assert_eq!(broadcaster.announcements().len() as u64, adopted);
    assert_eq!(chain.head().number(), adopted);
}
