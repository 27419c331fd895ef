//! # Mining Task Channel
//!
//! Full-duplex, ordered, lossless link between the coordinator and the
//! worker. Both directions are unbounded so neither side ever blocks on a
//! send; dropping either end is how the other side learns it is gone.

use crate::domain::{FoundNonce, HashrateReport, MiningTask};
use crate::error::MiningError;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Coordinator to worker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorMessage {
    /// Abandon any running attempt and mine this task.
    Mine(MiningTask),
    /// Abandon any running attempt and exit.
    Stop,
}

/// Worker to coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerMessage {
    FoundNonce(FoundNonce),
    Hashrate(HashrateReport),
}

/// Coordinator end.
#[derive(Debug)]
pub struct MiningTaskChannel {
    to_worker: mpsc::UnboundedSender<CoordinatorMessage>,
    from_worker: mpsc::UnboundedReceiver<WorkerMessage>,
}

/// Worker end.
#[derive(Debug)]
pub struct WorkerEndpoint {
    commands: mpsc::UnboundedReceiver<CoordinatorMessage>,
    events: mpsc::UnboundedSender<WorkerMessage>,
}

/// Create a connected pair.
pub fn mining_task_channel() -> (MiningTaskChannel, WorkerEndpoint) {
    let (to_worker, commands) = mpsc::unbounded_channel();
    let (events, from_worker) = mpsc::unbounded_channel();
    (
        MiningTaskChannel {
            to_worker,
            from_worker,
        },
        WorkerEndpoint { commands, events },
    )
}

impl MiningTaskChannel {
    pub fn send(&self, msg: CoordinatorMessage) -> Result<(), MiningError> {
        self.to_worker
            .send(msg)
            .map_err(|_| MiningError::ChannelClosed)
    }

    /// Next worker message; `None` once the worker end is dropped.
    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        self.from_worker.recv().await
    }

    pub fn is_closed(&self) -> bool {
        self.to_worker.is_closed()
    }
}

impl WorkerEndpoint {
    /// Next command; `None` once the coordinator end is dropped.
    pub async fn recv(&mut self) -> Option<CoordinatorMessage> {
        self.commands.recv().await
    }

    /// Non-async sender usable from blocking hashing code.
    pub fn sender(&self) -> WorkerSender {
        WorkerSender(self.events.clone())
    }

    pub fn send(&self, msg: WorkerMessage) -> bool {
        self.events.send(msg).is_ok()
    }
}

/// Cloneable worker-to-coordinator sender.
#[derive(Clone, Debug)]
pub struct WorkerSender(mpsc::UnboundedSender<WorkerMessage>);

impl WorkerSender {
    /// Returns `false` once the coordinator is gone.
    pub fn send(&self, msg: WorkerMessage) -> bool {
        self.0.send(msg).is_ok()
    }
}
