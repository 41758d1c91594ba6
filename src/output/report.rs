//! Progress events and the reporter interface
//!
//! The coordinator announces every state transition as a [`ProgressEvent`].
//! How those events are shown is up to the [`Reporter`]; the default one writes
//! them through `tracing`.

use crate::engine::SkipReason;
use crate::output::format::format_run_time;
use crate::state::ThreadState;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One line of progress output
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Run is starting
    Started {
        url: String,
        workers: usize,
        concurrency: usize,
    },

    /// A worker task is up and waiting for jobs
    WorkerOnline { worker_id: usize },

    /// Thread page is being requested
    Polling { url: String },

    /// Page was parsed
    FilesFound { count: usize },

    /// Output directory is ready and has been handed to the workers
    DirectoryReady { path: PathBuf },

    /// A job was handed to a worker
    Dispatched { worker_id: usize, file_name: String },

    Downloaded {
        worker_id: usize,
        file_name: String,
        elapsed: Duration,
    },

    Skipped {
        worker_id: usize,
        file_name: String,
        reason: SkipReason,
    },

    /// Thread is closed; no further polls
    Archived,

    /// Thread page could not be fetched; no further polls
    Dead { reason: String },

    /// Every slot went idle; the cycle is over
    CycleFinished {
        downloaded: u64,
        skipped: u64,
        total_downloaded: u64,
        run_time: Duration,
    },

    /// Next poll is scheduled
    RetryScheduled { delay: Duration },

    /// Workers have been told to stop
    ShutdownBroadcast { workers: usize },

    /// Run is over
    Finished {
        state: ThreadState,
        total_downloaded: u64,
        run_time: Duration,
    },
}

/// Presentation layer for progress events
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

/// Reporter that writes each event as a `tracing` line prefixed with the run time
pub struct TracingReporter {
    started: Instant,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: &ProgressEvent) {
        let at = format_run_time(self.started.elapsed());

        match event {
            ProgressEvent::Started {
                url,
                workers,
                concurrency,
            } => tracing::info!(
                "{}> Fetching from {} using {} workers and {} concurrent downloads",
                at,
                url,
                workers,
                concurrency
            ),
            ProgressEvent::WorkerOnline { worker_id } => {
                tracing::info!("{}> worker #{} is online", at, worker_id)
            }
            ProgressEvent::Polling { url } => tracing::debug!("{}> Requesting {}", at, url),
            ProgressEvent::FilesFound { count } => {
                tracing::info!("{}> Found {} files", at, count)
            }
            ProgressEvent::DirectoryReady { path } => {
                tracing::info!("{}> Saving to {}", at, path.display())
            }
            ProgressEvent::Dispatched {
                worker_id,
                file_name,
            } => tracing::debug!("{}> {} -> worker #{}", at, file_name, worker_id),
            ProgressEvent::Downloaded {
                file_name, elapsed, ..
            } => tracing::info!(
                "{}> Downloaded {} in {}",
                at,
                file_name,
                format_run_time(*elapsed)
            ),
            ProgressEvent::Skipped {
                file_name, reason, ..
            } => match reason {
                SkipReason::AlreadyExists => tracing::info!("{}> Skipped {}", at, file_name),
                _ => tracing::warn!("{}> Skipped {} ({})", at, file_name, reason),
            },
            ProgressEvent::Archived => {
                tracing::warn!("{}> Thread is archived, closing down...", at)
            }
            ProgressEvent::Dead { reason } => {
                tracing::error!("{}> Thread has died ({}), shutting down..", at, reason)
            }
            ProgressEvent::CycleFinished {
                total_downloaded,
                run_time,
                ..
            } => tracing::info!(
                "{}> Downloaded {} files in {}",
                at,
                total_downloaded,
                format_run_time(*run_time)
            ),
            ProgressEvent::RetryScheduled { delay } => tracing::info!(
                "{}> Trying thread again in {}",
                at,
                format_run_time(*delay)
            ),
            ProgressEvent::ShutdownBroadcast { workers } => {
                tracing::debug!("{}> Shutting down {} workers", at, workers)
            }
            ProgressEvent::Finished {
                state,
                total_downloaded,
                run_time,
            } => tracing::info!(
                "{}> Downloaded {} files in {} (thread {})",
                at,
                total_downloaded,
                format_run_time(*run_time),
                state
            ),
        }
    }
}
