//! Threadget: a thread media harvester
//!
//! This crate watches a discussion thread, extracts the media files attached to
//! its posts, and downloads them through a fixed pool of workers. The thread is
//! re-polled on a delay until it is archived or stops responding.

pub mod config;
pub mod engine;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Threadget operations
#[derive(Debug, Error)]
pub enum ThreadgetError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Worker #{worker_id} is no longer accepting jobs")]
    WorkerUnavailable { worker_id: usize },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// Errors raised while validating user input (the thread URL)
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Not a valid URL: {0}")]
    InvalidThreadUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Host is not a known board host: {0}")]
    UnknownHost(String),

    #[error("URL is not a thread link (expected /<board>/thread/<id>): {0}")]
    MissingThreadId(String),
}

/// Failures of an outbound request, either for the thread page or a media file
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
}

impl TransportError {
    /// Classifies a reqwest error, separating timeouts from everything else
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Result type alias for Threadget operations
pub type Result<T> = std::result::Result<T, ThreadgetError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for input validation
pub type InputResult<T> = std::result::Result<T, InputError>;

// Re-export commonly used types
pub use config::{Config, PoolSize};
pub use engine::{run_thread, Coordinator, ResourceRef};
pub use output::RunSummary;
pub use state::ThreadState;
pub use url::{validate_thread_url, ThreadLocation};
