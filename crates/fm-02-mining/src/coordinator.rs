//! # Mining Coordinator
//!
//! Turns head changes into mining tasks and found nonces into blocks.
//!
//! ## Task lifecycle
//!
//! ```text
//! head change ──► assemble candidate ──► Mine(task) ──► TaskIssued
//!                                                          │
//!        FoundNonce(mining_hash == live task) ◄────────────┘
//!                 │
//!                 ▼
//!   seal candidate ──► add_block(expected_parent = candidate parent) ──► Idle
//! ```
//!
//! A nonce whose `mining_hash` is not the live task's is stale and dropped.
//! A nonce for the live task whose head has already moved is dropped by the
//! chain store's `expected_parent` check, so a block built on a superseded
//! head is never adopted.

use crate::channel::{mining_task_channel, CoordinatorMessage, MiningTaskChannel, WorkerMessage};
use crate::config::MinerConfig;
use crate::domain::{BlockAssembler, CacheStore, FoundNonce, MiningTask};
use crate::error::MiningError;
use crate::metrics::MiningMetrics;
use crate::ports::{SystemTimeSource, TimeSource};
use crate::worker::MiningWorker;
use fm_01_chain_store::{
    AddBlockOptions, BlockBroadcaster, ChainApi, ChainStore, HeadChange, HeadObserver,
};
use shared_types::{short_hex, Block, Hash, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// What became of a found nonce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonceOutcome {
    /// Not for the live task.
    Stale,
    /// Sealed block became head.
    Adopted(Hash),
    /// Sealed block was refused by the chain store (head moved).
    NotApplied,
    /// Submitting failed; the task was re-issued.
    Failed,
}

/// Forwards head changes from the chain store into the coordinator loop.
struct HeadListener {
    tx: mpsc::UnboundedSender<HeadChange>,
}

impl HeadObserver for HeadListener {
    fn on_new_head(&self, change: &HeadChange) {
        // Coordinator gone means nobody is mining; nothing to do.
        let _ = self.tx.send(change.clone());
    }

    fn is_active(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// The task currently being mined and the candidate it was derived from.
#[derive(Clone, Debug)]
struct LiveTask {
    task: MiningTask,
    candidate: Block,
}

pub struct MiningCoordinator {
    chain: Arc<ChainStore>,
    broadcaster: Arc<dyn BlockBroadcaster>,
    assembler: BlockAssembler,
    config: MinerConfig,
    caches: Arc<CacheStore>,
    metrics: Arc<MiningMetrics>,
    time: Arc<dyn TimeSource>,
    head_rx: mpsc::UnboundedReceiver<HeadChange>,
    channel: MiningTaskChannel,
    worker: Option<MiningWorker>,
    live: Option<LiveTask>,
    #[cfg(test)]
    fail_next_spawns: usize,
}

impl MiningCoordinator {
    /// Create a coordinator and, when mining is enabled, register it for
    /// head changes on `chain`. The registration lapses once the coordinator
    /// is dropped.
    ///
    /// The worker is not started until `start_worker` or `run`.
    pub fn new(
        chain: Arc<ChainStore>,
        broadcaster: Arc<dyn BlockBroadcaster>,
        config: MinerConfig,
    ) -> Result<Self, MiningError> {
        config.validate()?;

        let (tx, head_rx) = mpsc::unbounded_channel();
        if config.enabled {
            chain.register_head_observer(Arc::new(HeadListener { tx }));
        }

        // Placeholder link; replaced when the worker starts.
        let (channel, _) = mining_task_channel();

        Ok(Self {
            chain,
            broadcaster,
            assembler: BlockAssembler::new(&config),
            config,
            caches: Arc::new(CacheStore::new()),
            metrics: Arc::new(MiningMetrics::new()),
            time: Arc::new(SystemTimeSource),
            head_rx,
            channel,
            worker: None,
            live: None,
            #[cfg(test)]
            fail_next_spawns: 0,
        })
    }

    /// Replace the clock used to timestamp candidates.
    pub fn with_time_source(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    pub fn metrics(&self) -> Arc<MiningMetrics> {
        Arc::clone(&self.metrics)
    }

    /// The task the worker should currently be mining.
    pub fn live_task(&self) -> Option<&MiningTask> {
        self.live.as_ref().map(|l| &l.task)
    }

    /// Spawn a worker on a fresh channel.
    pub fn start_worker(&mut self) -> Result<(), MiningError> {
        #[cfg(test)]
        if self.fail_next_spawns > 0 {
            self.fail_next_spawns -= 1;
            return Err(MiningError::WorkerSpawn("injected failure".into()));
        }
        let (channel, endpoint) = mining_task_channel();
        let worker = MiningWorker::spawn(self.config.clone(), Arc::clone(&self.caches), endpoint)?;
        self.channel = channel;
        self.worker = Some(worker);
        Ok(())
    }

    /// Build a task on the current head and send it.
    pub fn issue_task_for_current_head(&mut self) {
        let (head, pending) = self.chain.head_with_pending();
        self.issue_task(&head.block, pending);
    }

    /// Apply queued head changes; only the most recent one is mined on.
    ///
    /// Returns whether a new task was issued.
    pub fn process_head_changes(&mut self) -> bool {
        let mut latest = None;
        while let Ok(change) = self.head_rx.try_recv() {
            latest = Some(change);
        }
        match latest {
            Some(change) => {
                self.on_head_change(change);
                true
            }
            None => false,
        }
    }

    fn on_head_change(&mut self, change: HeadChange) {
        debug!(
            head = %short_hex(&change.head_hash()),
            number = change.head.number(),
            reorg = change.is_reorg,
            "Head changed, re-tasking worker"
        );
        self.issue_task(&change.head.block, change.pending_transactions);
    }

    fn issue_task(&mut self, parent: &Block, pending: Vec<Transaction>) {
        let candidate = self.assembler.assemble(parent, pending, self.time.now());
        let task = MiningTask {
            mining_hash: candidate.header.mining_hash(),
            block_number: candidate.number(),
            difficulty: candidate.difficulty(),
        };

        if let Err(e) = self.channel.send(CoordinatorMessage::Mine(task.clone())) {
            // Loss is picked up by the run loop; the task is re-sent on restart.
            debug!(error = %e, "Worker unreachable while issuing task");
        }
        self.metrics.record_task_issued();
        self.live = Some(LiveTask { task, candidate });
    }

    /// Handle a solution reported by the worker.
    #[tracing::instrument(skip_all, fields(task = %short_hex(&found.mining_hash)))]
    pub async fn handle_found_nonce(&mut self, found: FoundNonce) -> NonceOutcome {
        let is_live = self
            .live
            .as_ref()
            .is_some_and(|l| l.task.mining_hash == found.mining_hash);
        self.metrics.record_nonce(!is_live);
        if !is_live {
            debug!("Discarding stale nonce");
            return NonceOutcome::Stale;
        }
        let Some(live) = self.live.take() else {
            return NonceOutcome::Stale;
        };

        let mut block = live.candidate.clone();
        block.seal(found.nonce, found.mix_hash);
        let hash = block.hash();
        let options = AddBlockOptions {
            forward_pending_transactions: true,
            expected_parent: Some(block.parent_hash()),
        };

        let chain = Arc::clone(&self.chain);
        let submitted =
            tokio::task::spawn_blocking(move || chain.add_block_with(block, options)).await;

        match submitted {
            Ok(Ok(true)) => {
                self.metrics.record_block_mined(true);
                info!(block = %short_hex(&hash), number = live.task.block_number, "Mined block");
                self.broadcast(hash).await;
                NonceOutcome::Adopted(hash)
            }
            Ok(Ok(false)) => {
                self.metrics.record_block_mined(false);
                debug!(block = %short_hex(&hash), "Mined block not applied");
                NonceOutcome::NotApplied
            }
            Ok(Err(e)) => {
                self.metrics.record_block_mined(false);
                error!(block = %short_hex(&hash), error = %e, "Failed to store mined block");
                self.reissue(live);
                NonceOutcome::Failed
            }
            Err(e) => {
                error!(error = %e, "Block submission task failed");
                self.reissue(live);
                NonceOutcome::Failed
            }
        }
    }

    fn reissue(&mut self, live: LiveTask) {
        if let Err(e) = self.channel.send(CoordinatorMessage::Mine(live.task.clone())) {
            debug!(error = %e, "Worker unreachable while re-issuing task");
        }
        self.live = Some(live);
    }

    async fn broadcast(&self, hash: Hash) {
        let (Some(block), Some(td)) = (
            self.chain.get_block(&hash),
            self.chain.cumulative_difficulty(&hash),
        ) else {
            return;
        };
        if let Err(e) = self.broadcaster.broadcast_new_block(&block, td).await {
            warn!(block = %short_hex(&hash), error = %e, "Broadcast failed");
        }
    }

    /// Handle an unexpected worker exit: report, restart, re-issue.
    ///
    /// A failed restart leaves the closed channel in place, so the run loop
    /// comes back here after another backoff.
    pub async fn handle_worker_lost(&mut self) {
        self.metrics.record_worker_restart();
        error!(
            error = %MiningError::WorkerLost("channel closed".into()),
            backoff_ms = self.config.restart_backoff_ms,
            "Restarting mining worker"
        );

        if let Some(old) = self.worker.take() {
            if let Err(e) = tokio::task::spawn_blocking(move || old.join()).await {
                error!(error = %MiningError::TaskJoin(e.to_string()), "Failed to join lost worker");
            }
        }
        tokio::time::sleep(Duration::from_millis(self.config.restart_backoff_ms)).await;
        if let Err(e) = self.start_worker() {
            error!(error = %e, "Mining worker restart failed, will retry");
            return;
        }

        match self.live.take() {
            Some(live) => self.reissue(live),
            None => self.issue_task_for_current_head(),
        }
    }

    /// Drive mining until `shutdown` flips to `true`.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<(), MiningError> {
        if !self.config.enabled {
            info!("Mining disabled");
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            return Ok(());
        }

        self.start_worker()?;
        self.issue_task_for_current_head();

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                Some(change) = self.head_rx.recv() => {
                    let mut latest = change;
                    while let Ok(next) = self.head_rx.try_recv() {
                        latest = next;
                    }
                    self.on_head_change(latest);
                }
                msg = self.channel.recv() => match msg {
                    Some(WorkerMessage::FoundNonce(found)) => {
                        self.handle_found_nonce(found).await;
                    }
                    Some(WorkerMessage::Hashrate(report)) => {
                        self.metrics.set_hashrate(report.hashes_per_second);
                    }
                    None => self.handle_worker_lost().await,
                },
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop the worker and wait for its thread.
    pub async fn shutdown(&mut self) {
        let _ = self.channel.send(CoordinatorMessage::Stop);
        self.live = None;
        if let Some(worker) = self.worker.take() {
            if let Err(e) = tokio::task::spawn_blocking(move || worker.join()).await {
                error!(error = %e, "Failed to join mining worker");
            }
        }
        self.metrics.set_hashrate(0);
        info!("Mining coordinator stopped");
    }
}
