//! Coordinator - poll loop and job dispatch
//!
//! This module contains the event loop that drives one run, including:
//! - Spawning the worker pool and fetching the thread page
//! - Tracking the thread lifecycle (active, archived, dead)
//! - Creating the output directory on the first non-empty batch
//! - Handing files to workers, keeping at most `concurrency` in flight
//! - Scheduling re-polls and shutting the pool down exactly once
//!
//! Everything the coordinator reacts to arrives as a [`CoordinatorEvent`] on a
//! single channel, so handlers run one at a time and never race each other.

use crate::config::{resolve_pool, Config, PoolSize};
use crate::engine::dispatch::{RoundRobin, WorkQueue};
use crate::engine::fetcher::PageFetcher;
use crate::engine::parser::PageParser;
use crate::engine::transfer::{FileTransfer, TransferOutcome};
use crate::engine::worker::{WorkerCommand, WorkerHandle, WorkerReport};
use crate::engine::ResourceRef;
use crate::output::{ProgressEvent, Reporter, RunSummary};
use crate::state::{CycleCounters, RunningTotals, ThreadState};
use crate::url::ThreadLocation;
use crate::{ThreadgetError, TransportError};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Everything the coordinator reacts to
#[derive(Debug)]
pub enum CoordinatorEvent {
    /// Result of the page request issued for the current cycle
    PageFetched(Result<String, TransportError>),

    /// A worker finished (or skipped) one job
    Worker(WorkerReport),

    /// Retry delay elapsed; time to poll again
    PollDue,
}

/// Pluggable collaborators of a run
#[derive(Clone)]
pub struct EngineParts {
    pub fetcher: Arc<dyn PageFetcher>,
    pub parser: Arc<dyn PageParser>,
    pub transfer: Arc<dyn FileTransfer>,
    pub reporter: Arc<dyn Reporter>,
}

/// Run parameters that are not collaborators
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Requested pool size; normalized again on start
    pub pool: PoolSize,

    /// Pause between the end of a cycle and the next poll
    pub retry_delay: Duration,

    /// Directory the per-thread folder is created in
    pub base_dir: PathBuf,

    /// Accepted thread hosts
    pub hosts: Vec<String>,
}

impl CoordinatorSettings {
    pub fn from_config(config: &Config, pool: PoolSize) -> Self {
        Self {
            pool,
            retry_delay: config.engine.retry_delay(),
            base_dir: PathBuf::from(&config.output.base_dir),
            hosts: config.thread.hosts.clone(),
        }
    }
}

/// Whether the event loop keeps going after a handler
enum Flow {
    Continue,
    Finished,
}

/// Single pending re-poll; scheduling a new one replaces the old one
#[derive(Default)]
struct PollTimer {
    pending: Option<JoinHandle<()>>,
}

impl PollTimer {
    fn schedule(&mut self, delay: Duration, events: mpsc::UnboundedSender<CoordinatorEvent>) {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(CoordinatorEvent::PollDue);
        }));
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Main coordinator structure
pub struct Coordinator {
    thread: ThreadLocation,
    pool: PoolSize,
    retry_delay: Duration,
    base_dir: PathBuf,

    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn PageParser>,
    reporter: Arc<dyn Reporter>,

    workers: Vec<WorkerHandle>,
    events_tx: mpsc::UnboundedSender<CoordinatorEvent>,
    events_rx: mpsc::UnboundedReceiver<CoordinatorEvent>,

    queue: WorkQueue,
    round_robin: RoundRobin,
    state: ThreadState,
    cycle: CycleCounters,
    totals: RunningTotals,
    directory: Option<PathBuf>,
    poll_timer: PollTimer,
    shut_down: bool,

    started: Instant,
    started_at: chrono::DateTime<Utc>,
}

impl Coordinator {
    /// Validates the thread URL, spawns the workers, and requests the first page
    ///
    /// Must be called from inside a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `url` - Thread URL as given by the user
    /// * `settings` - Pool size, retry delay, output root, accepted hosts
    /// * `parts` - Fetcher, parser, transfer and reporter to run with
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Run is underway; drive it with [`Coordinator::run`]
    /// * `Err(ThreadgetError::Input)` - URL is not a thread URL; nothing was spawned
    pub fn start(
        url: &str,
        settings: CoordinatorSettings,
        parts: EngineParts,
    ) -> Result<Self, ThreadgetError> {
        let thread = ThreadLocation::parse(url, &settings.hosts)?;
        let pool = resolve_pool(
            Some(settings.pool.workers),
            Some(settings.pool.concurrency),
            1,
            settings.pool.concurrency,
        );

        parts.reporter.report(&ProgressEvent::Started {
            url: thread.url().to_string(),
            workers: pool.workers,
            concurrency: pool.concurrency,
        });

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut workers = Vec::with_capacity(pool.workers);
        for id in 1..=pool.workers {
            workers.push(WorkerHandle::spawn(
                id,
                parts.transfer.clone(),
                events_tx.clone(),
            ));
            parts
                .reporter
                .report(&ProgressEvent::WorkerOnline { worker_id: id });
        }

        let mut coordinator = Self {
            thread,
            pool,
            retry_delay: settings.retry_delay,
            base_dir: settings.base_dir,
            fetcher: parts.fetcher,
            parser: parts.parser,
            reporter: parts.reporter,
            workers,
            events_tx,
            events_rx,
            queue: WorkQueue::new(),
            round_robin: RoundRobin::new(pool.workers),
            state: ThreadState::Active,
            cycle: CycleCounters::default(),
            totals: RunningTotals::default(),
            directory: None,
            poll_timer: PollTimer::default(),
            shut_down: false,
            started: Instant::now(),
            started_at: Utc::now(),
        };

        coordinator.request_page();
        Ok(coordinator)
    }

    /// Effective pool size after normalization
    pub fn pool(&self) -> PoolSize {
        self.pool
    }

    /// Drives the run until the thread is archived or dead
    ///
    /// On a fatal error the workers are still told to stop and joined before
    /// the error is returned.
    pub async fn run(mut self) -> Result<RunSummary, ThreadgetError> {
        let result = self.event_loop().await;

        if result.is_err() {
            self.poll_timer.cancel();
            for worker in &self.workers {
                let _ = worker.send(WorkerCommand::Shutdown);
            }
        }

        for worker in std::mem::take(&mut self.workers) {
            worker.join().await;
        }

        result?;
        Ok(RunSummary::new(
            self.started_at,
            self.started.elapsed(),
            self.state,
            &self.totals,
        ))
    }

    async fn event_loop(&mut self) -> Result<(), ThreadgetError> {
        while let Some(event) = self.events_rx.recv().await {
            let flow = match event {
                CoordinatorEvent::PageFetched(result) => self.on_page_fetched(result).await?,
                CoordinatorEvent::Worker(report) => self.on_worker_report(report)?,
                CoordinatorEvent::PollDue => {
                    self.request_page();
                    Flow::Continue
                }
            };

            if let Flow::Finished = flow {
                break;
            }
        }

        Ok(())
    }

    /// Fetches the thread page in the background; the result comes back as an event
    fn request_page(&mut self) {
        self.reporter.report(&ProgressEvent::Polling {
            url: self.thread.url().to_string(),
        });

        let fetcher = self.fetcher.clone();
        let url = self.thread.url().clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&url).await;
            let _ = events.send(CoordinatorEvent::PageFetched(result));
        });
    }

    async fn on_page_fetched(
        &mut self,
        result: Result<String, TransportError>,
    ) -> Result<Flow, ThreadgetError> {
        match result {
            Err(e) => {
                self.state = ThreadState::from_page(None);
                self.poll_timer.cancel();
                self.reporter.report(&ProgressEvent::Dead {
                    reason: e.to_string(),
                });
                // Nothing to parse; every slot goes idle and the pool stops
                self.saturate()
            }
            Ok(body) => {
                let parsed = self.parser.parse(&body, self.thread.url());
                self.state = ThreadState::from_page(Some(parsed.archived));
                if self.state == ThreadState::Archived {
                    self.reporter.report(&ProgressEvent::Archived);
                }
                self.on_parsed(parsed.resources).await
            }
        }
    }

    async fn on_parsed(&mut self, resources: Vec<ResourceRef>) -> Result<Flow, ThreadgetError> {
        self.reporter.report(&ProgressEvent::FilesFound {
            count: resources.len(),
        });

        if !resources.is_empty() && self.directory.is_none() {
            self.prepare_directory().await?;
        }

        if self.state.accepts_work() {
            self.queue.extend(resources);
        }
        self.saturate()
    }

    /// Creates the thread directory and hands it to every worker
    async fn prepare_directory(&mut self) -> Result<(), ThreadgetError> {
        let path = self.thread.directory_in(&self.base_dir);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| ThreadgetError::Filesystem {
                path: path.clone(),
                source,
            })?;

        self.broadcast(WorkerCommand::SetDirectory(path.clone()))?;
        self.reporter
            .report(&ProgressEvent::DirectoryReady { path: path.clone() });
        self.directory = Some(path);
        Ok(())
    }

    /// Fills every download slot, counting slots with nothing to do as finished
    fn saturate(&mut self) -> Result<Flow, ThreadgetError> {
        self.round_robin.reset();

        for _ in 0..self.pool.concurrency {
            match self.queue.pop() {
                Some(resource) => {
                    let worker_id = self.round_robin.next_worker();
                    self.send_job(worker_id, resource)?;
                }
                None => {
                    if let Flow::Finished = self.finish_slot()? {
                        return Ok(Flow::Finished);
                    }
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn on_worker_report(&mut self, report: WorkerReport) -> Result<Flow, ThreadgetError> {
        let WorkerReport {
            worker_id,
            resource,
            outcome,
        } = report;

        match outcome {
            TransferOutcome::Downloaded { elapsed } => {
                self.cycle.record_downloaded();
                self.totals.record_downloaded();
                self.reporter.report(&ProgressEvent::Downloaded {
                    worker_id,
                    file_name: resource.file_name().to_string(),
                    elapsed,
                });
            }
            TransferOutcome::Skipped(reason) => {
                self.cycle.record_skipped();
                self.totals.record_skipped();
                self.reporter.report(&ProgressEvent::Skipped {
                    worker_id,
                    file_name: resource.file_name().to_string(),
                    reason,
                });
            }
        }

        self.dispatch_next(worker_id)
    }

    /// Gives the slot freed by `worker_id` the next queued file, or retires it
    fn dispatch_next(&mut self, worker_id: usize) -> Result<Flow, ThreadgetError> {
        match self.queue.pop() {
            Some(resource) => {
                self.send_job(worker_id, resource)?;
                Ok(Flow::Continue)
            }
            None => self.finish_slot(),
        }
    }

    fn send_job(&mut self, worker_id: usize, resource: ResourceRef) -> Result<(), ThreadgetError> {
        self.reporter.report(&ProgressEvent::Dispatched {
            worker_id,
            file_name: resource.file_name().to_string(),
        });

        let worker = self
            .workers
            .iter()
            .find(|w| w.id() == worker_id)
            .ok_or(ThreadgetError::WorkerUnavailable { worker_id })?;
        worker.send(WorkerCommand::Download(resource))
    }

    /// Retires one slot; when the last one goes idle the cycle ends
    fn finish_slot(&mut self) -> Result<Flow, ThreadgetError> {
        if !self.cycle.finish_slot(self.pool.concurrency) {
            return Ok(Flow::Continue);
        }

        self.totals.finish_cycle();

        if self.state.is_terminal() {
            self.shutdown();
            return Ok(Flow::Finished);
        }

        self.reporter.report(&ProgressEvent::CycleFinished {
            downloaded: self.cycle.downloaded,
            skipped: self.cycle.skipped,
            total_downloaded: self.totals.downloaded,
            run_time: self.started.elapsed(),
        });
        self.cycle.reset();

        self.poll_timer
            .schedule(self.retry_delay, self.events_tx.clone());
        self.reporter.report(&ProgressEvent::RetryScheduled {
            delay: self.retry_delay,
        });

        Ok(Flow::Continue)
    }

    /// Stops every worker; later calls do nothing
    fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.poll_timer.cancel();

        for worker in &self.workers {
            if let Err(e) = worker.send(WorkerCommand::Shutdown) {
                tracing::debug!("{}", e);
            }
        }

        self.reporter.report(&ProgressEvent::ShutdownBroadcast {
            workers: self.workers.len(),
        });
        self.reporter.report(&ProgressEvent::Finished {
            state: self.state,
            total_downloaded: self.totals.downloaded,
            run_time: self.started.elapsed(),
        });
    }

    fn broadcast(&self, command: WorkerCommand) -> Result<(), ThreadgetError> {
        for worker in &self.workers {
            worker.send(command.clone())?;
        }
        Ok(())
    }
}
