//! Engine module for watching a thread and downloading its media
//!
//! This module contains the core harvesting logic, including:
//! - Fetching the thread page and extracting media links
//! - The download workers and the single-file transfer
//! - Queueing and round-robin dispatch of jobs
//! - The coordinator that ties polling and dispatch together

mod coordinator;
mod dispatch;
mod fetcher;
mod parser;
mod resource;
mod transfer;
mod worker;

pub use coordinator::{Coordinator, CoordinatorEvent, CoordinatorSettings, EngineParts};
pub use dispatch::{RoundRobin, WorkQueue};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use parser::{resolve_file_name, sanitize_file_name, BoardPageParser, PageParser, ParsedThread};
pub use resource::ResourceRef;
pub use transfer::{FileTransfer, HttpTransfer, SkipReason, TransferOutcome};
pub use worker::{WorkerCommand, WorkerHandle, WorkerReport};

use crate::config::{Config, PoolSize};
use crate::output::{RunSummary, TracingReporter};
use crate::ThreadgetError;
use std::sync::Arc;

/// Watches one thread until it is archived or dead
///
/// This is the main entry point for a run. It will:
/// 1. Validate the thread URL against the configured hosts
/// 2. Build the HTTP fetcher, page parser, and file transfer from `config`
/// 3. Spawn `pool.workers` workers and poll the thread
/// 4. Return the run summary once the pool has shut down
///
/// # Arguments
///
/// * `url` - The thread URL
/// * `pool` - Effective worker count and concurrency
/// * `config` - Loaded configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Run ended because the thread was archived or died
/// * `Err(ThreadgetError)` - Invalid URL, bad configuration, or the output
///   directory could not be created
pub async fn run_thread(
    url: &str,
    pool: PoolSize,
    config: &Config,
) -> Result<RunSummary, ThreadgetError> {
    let parts = EngineParts {
        fetcher: Arc::new(HttpFetcher::new(&config.engine)?),
        parser: Arc::new(BoardPageParser::new(&config.parser)?),
        transfer: Arc::new(HttpTransfer::new(&config.engine)?),
        reporter: Arc::new(TracingReporter::new()),
    };

    let settings = CoordinatorSettings::from_config(config, pool);
    Coordinator::start(url, settings, parts)?.run().await
}
