//! Download workers
//!
//! Each worker is a task with its own command channel. It runs one transfer at
//! a time and reports the outcome to the coordinator before taking the next
//! command, so the coordinator never has to track worker state itself.

use crate::engine::coordinator::CoordinatorEvent;
use crate::engine::transfer::{FileTransfer, SkipReason, TransferOutcome};
use crate::engine::ResourceRef;
use crate::ThreadgetError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coordinator-to-worker messages
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    /// Output directory for every following download; sent once before the first job
    SetDirectory(PathBuf),

    /// One job
    Download(ResourceRef),

    /// Stop after the current job
    Shutdown,
}

/// Worker-to-coordinator message: one finished job
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub resource: ResourceRef,
    pub outcome: TransferOutcome,
}

/// Coordinator's handle on a spawned worker
pub struct WorkerHandle {
    id: usize,
    commands: mpsc::UnboundedSender<WorkerCommand>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawns worker `id`, reporting into `events`
    pub(crate) fn spawn(
        id: usize,
        transfer: Arc<dyn FileTransfer>,
        events: mpsc::UnboundedSender<CoordinatorEvent>,
    ) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let task = tokio::spawn(worker_loop(id, transfer, inbox, events));
        Self { id, commands, task }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Queues a command for this worker
    pub fn send(&self, command: WorkerCommand) -> Result<(), ThreadgetError> {
        self.commands
            .send(command)
            .map_err(|_| ThreadgetError::WorkerUnavailable { worker_id: self.id })
    }

    /// Waits for the worker task to exit
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!("worker #{} ended abnormally: {}", self.id, e);
        }
    }
}

async fn worker_loop(
    id: usize,
    transfer: Arc<dyn FileTransfer>,
    mut inbox: mpsc::UnboundedReceiver<WorkerCommand>,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
) {
    let mut directory: Option<PathBuf> = None;

    while let Some(command) = inbox.recv().await {
        match command {
            WorkerCommand::SetDirectory(path) => directory = Some(path),
            WorkerCommand::Download(resource) => {
                let outcome = match &directory {
                    Some(dir) => run_transfer(&transfer, &resource, dir).await,
                    None => TransferOutcome::Skipped(SkipReason::NoDirectory),
                };

                let report = WorkerReport {
                    worker_id: id,
                    resource,
                    outcome,
                };
                if events.send(CoordinatorEvent::Worker(report)).is_err() {
                    break;
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }

    tracing::debug!("worker #{} stopped", id);
}

/// Runs one transfer in its own task so a panic comes back as a skip
async fn run_transfer(
    transfer: &Arc<dyn FileTransfer>,
    resource: &ResourceRef,
    directory: &Path,
) -> TransferOutcome {
    let transfer = transfer.clone();
    let job = resource.clone();
    let directory = directory.to_path_buf();

    match tokio::spawn(async move { transfer.transfer(&job, &directory).await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("transfer of {} aborted: {}", resource, e);
            TransferOutcome::Skipped(SkipReason::Aborted(e.to_string()))
        }
    }
}
