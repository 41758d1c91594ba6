//! Threadget main entry point
//!
//! This is the command-line interface for the Threadget thread media harvester.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use threadget::config::{detected_cpu_count, load_config_with_hash, resolve_pool, Config};
use threadget::engine::run_thread;
use threadget::url::ThreadLocation;
use tracing_subscriber::EnvFilter;

/// Threadget: downloads every media file posted to a thread
///
/// Threadget polls a thread page, downloads the attached files with a small
/// pool of workers, and keeps polling until the thread is archived or gone.
#[derive(Parser, Debug)]
#[command(name = "threadget")]
#[command(version = "1.0.0")]
#[command(about = "Downloads the media of a discussion thread", long_about = None)]
struct Cli {
    /// Thread URL, e.g. https://boards.4chan.org/wg/thread/123456
    #[arg(value_name = "URL")]
    url: String,

    /// Number of download workers (default: CPU cores, at most 4)
    #[arg(value_name = "WORKERS")]
    workers: Option<usize>,

    /// Download slots (never fewer than the worker count)
    ///
    /// Each worker downloads one file at a time, so slots beyond the worker
    /// count only queue jobs at the workers; they do not add parallel downloads.
    #[arg(value_name = "CONCURRENCY")]
    concurrency: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the thread folder is created in (overrides the config)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output.base_dir = dir.display().to_string();
    }

    // Reject bad links before anything is spawned or created
    if let Err(e) = ThreadLocation::parse(&cli.url, &config.thread.hosts) {
        eprintln!("error: {}\n", e);
        if let Err(e) = Cli::command().print_help() {
            tracing::error!("Failed to print usage: {}", e);
        }
        std::process::exit(2);
    }

    let pool = resolve_pool(
        cli.workers,
        cli.concurrency,
        detected_cpu_count(),
        config.engine.default_concurrency,
    );

    match run_thread(&cli.url, pool, &config).await {
        Ok(summary) => {
            println!("{}", summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("threadget=info,warn"),
            1 => EnvFilter::new("threadget=debug,info"),
            2 => EnvFilter::new("threadget=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
