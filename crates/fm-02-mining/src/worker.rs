//! # Mining Worker
//!
//! Runs on its own OS thread with a single-threaded tokio runtime, so
//! hashing never competes with the node's executor. Each task becomes one
//! attempt on the blocking pool; a new task first stops the running attempt
//! and waits for it to finish, so at most one attempt exists at a time and
//! its cache is released before the next one starts.
//!
//! The worker exits on `Stop`, when the coordinator end is dropped, or as
//! soon as an attempt panics. Exiting drops the worker end of the channel, which is
//! how the coordinator detects a lost worker.

use crate::channel::{CoordinatorMessage, WorkerEndpoint, WorkerMessage, WorkerSender};
use crate::config::MinerConfig;
use crate::domain::pow::{boundary, hashimoto_light, meets_boundary, CacheStore};
use crate::domain::{FoundNonce, HashrateReport, MiningTask};
use crate::error::MiningError;
use shared_types::short_hex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Longest uninterrupted sleep inside an attempt.
const SLEEP_SLICE: Duration = Duration::from_millis(20);

/// Handle to the worker thread.
#[derive(Debug)]
pub struct MiningWorker {
    handle: Option<JoinHandle<()>>,
}

impl MiningWorker {
    /// Spawn the worker thread serving `endpoint`.
    pub fn spawn(
        config: MinerConfig,
        caches: Arc<CacheStore>,
        endpoint: WorkerEndpoint,
    ) -> Result<Self, MiningError> {
        let handle = thread::Builder::new()
            .name("forkmine-miner".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        error!(error = %e, "Mining worker runtime failed to start");
                        return;
                    }
                };
                runtime.block_on(run(config, caches, endpoint));
            })
            .map_err(|e| MiningError::WorkerSpawn(e.to_string()))?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Whether the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the thread to exit. Blocks.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Mining worker thread panicked");
            }
        }
    }
}

/// A running attempt on the blocking pool.
struct Attempt {
    mining_hash: shared_types::Hash,
    stop: Arc<AtomicBool>,
    handle: tokio::task::JoinHandle<()>,
}

impl Attempt {
    fn start(
        task: MiningTask,
        config: &MinerConfig,
        caches: &Arc<CacheStore>,
        hashes: &Arc<AtomicU64>,
        events: WorkerSender,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let mining_hash = task.mining_hash;
        let handle = {
            let stop = Arc::clone(&stop);
            let config = config.clone();
            let caches = Arc::clone(caches);
            let hashes = Arc::clone(hashes);
            tokio::task::spawn_blocking(move || {
                mine(&task, &config, &caches, &stop, &hashes, &events);
            })
        };
        Self {
            mining_hash,
            stop,
            handle,
        }
    }

    /// Stop and wait for the attempt to finish. `false` if it panicked.
    async fn stop(self) -> bool {
        self.stop.store(true, Ordering::SeqCst);
        match self.handle.await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    task = %short_hex(&self.mining_hash),
                    error = %e,
                    "Mining attempt failed"
                );
                false
            }
        }
    }
}

async fn run(config: MinerConfig, caches: Arc<CacheStore>, mut endpoint: WorkerEndpoint) {
    info!(cpu_pct = config.cpu_pct, verify_pow = config.verify_pow, "Mining worker started");

    let hashes = Arc::new(AtomicU64::new(0));
    let mut attempt: Option<Attempt> = None;
    let mut ticker = tokio::time::interval(Duration::from_millis(config.hashrate_interval_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_report = Instant::now();

    loop {
        tokio::select! {
            cmd = endpoint.recv() => match cmd {
                Some(CoordinatorMessage::Mine(task)) => {
                    if let Some(running) = attempt.take() {
                        if !running.stop().await {
                            break;
                        }
                    }
                    debug!(
                        task = %short_hex(&task.mining_hash),
                        number = task.block_number,
                        "Starting mining attempt"
                    );
                    attempt = Some(Attempt::start(
                        task,
                        &config,
                        &caches,
                        &hashes,
                        endpoint.sender(),
                    ));
                }
                Some(CoordinatorMessage::Stop) | None => break,
            },
            finished = attempt_finished(&mut attempt) => {
                let done = attempt.take();
                if let Err(e) = finished {
                    error!(
                        task = %done.map(|a| short_hex(&a.mining_hash)).unwrap_or_default(),
                        error = %e,
                        "Mining attempt failed"
                    );
                    break;
                }
            }
            _ = ticker.tick() => {
                let elapsed_ms = last_report.elapsed().as_millis().max(1) as u64;
                last_report = Instant::now();
                let count = hashes.swap(0, Ordering::Relaxed);
                let report = HashrateReport {
                    hashes_per_second: count.saturating_mul(1_000) / elapsed_ms,
                };
                if !endpoint.send(WorkerMessage::Hashrate(report)) {
                    break;
                }
            }
        }
    }

    if let Some(running) = attempt.take() {
        running.stop().await;
    }
    info!("Mining worker stopped");
}

/// Resolves when the running attempt ends; never if there is none.
async fn attempt_finished(attempt: &mut Option<Attempt>) -> Result<(), tokio::task::JoinError> {
    match attempt {
        Some(running) => (&mut running.handle).await,
        None => std::future::pending().await,
    }
}

/// Sleep up to `total`, waking early when `stop` is set. `false` if stopped.
fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

/// One attempt: warm up, then hash batches until a solution or a stop.
fn mine(
    task: &MiningTask,
    config: &MinerConfig,
    caches: &CacheStore,
    stop: &AtomicBool,
    hashes: &AtomicU64,
    events: &WorkerSender,
) {
    let cache = caches.get(task.block_number);
    let mut nonce: u64 = rand::random();

    if !sleep_unless_stopped(Duration::from_millis(config.warmup_delay_ms), stop) {
        return;
    }

    let target = boundary(task.difficulty);
    loop {
        let batch_start = Instant::now();
        for _ in 0..config.preempt_check_interval {
            let nonce_bytes = nonce.to_be_bytes();
            let out = hashimoto_light(&cache, &task.mining_hash, &nonce_bytes);
            hashes.fetch_add(1, Ordering::Relaxed);

            if !config.verify_pow || meets_boundary(&out.result, target) {
                if stop.load(Ordering::SeqCst) {
                    return;
                }
                debug!(task = %short_hex(&task.mining_hash), nonce, "Nonce found");
                events.send(WorkerMessage::FoundNonce(FoundNonce {
                    nonce: nonce_bytes,
                    mix_hash: out.mix_hash,
                    mining_hash: task.mining_hash,
                }));
                return;
            }
            nonce = nonce.wrapping_add(1);
        }

        if stop.load(Ordering::SeqCst) {
            return;
        }
        if config.cpu_pct < 100 {
            let busy = batch_start.elapsed();
            let idle = busy.mul_f64(f64::from(100 - config.cpu_pct) / f64::from(config.cpu_pct));
            if !sleep_unless_stopped(idle, stop) {
                return;
            }
        }
    }
}
