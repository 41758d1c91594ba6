//! Single-file download
//!
//! A transfer either writes one media file into the thread directory or reports
//! why it did not. Failures never escape as errors; they come back as
//! [`TransferOutcome::Skipped`] so one bad file cannot stop the run.

use crate::config::EngineConfig;
use crate::engine::fetcher::build_http_client;
use crate::engine::ResourceRef;
use crate::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Why a file was not downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A file with this name is already in the directory
    AlreadyExists,

    /// Worker had no output directory when the job arrived
    NoDirectory,

    /// Request failed, timed out, or returned a non-2xx status
    Transport(String),

    /// Output file could not be created or written
    Filesystem(String),

    /// Transfer task died before reporting (a panic in the transfer)
    Aborted(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExists => write!(f, "already exists"),
            Self::NoDirectory => write!(f, "no output directory"),
            Self::Transport(e) => write!(f, "transfer failed: {}", e),
            Self::Filesystem(e) => write!(f, "cannot write file: {}", e),
            Self::Aborted(e) => write!(f, "transfer aborted: {}", e),
        }
    }
}

/// Result of one transfer
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Downloaded { elapsed: Duration },
    Skipped(SkipReason),
}

/// Performs one download-or-skip for a resource
#[async_trait]
pub trait FileTransfer: Send + Sync {
    async fn transfer(&self, resource: &ResourceRef, directory: &Path) -> TransferOutcome;
}

/// `FileTransfer` that streams the response body to disk with reqwest
///
/// The destination is opened with create-new semantics, so when two resources
/// resolve to the same name the first writer wins and the other is skipped.
/// A transfer that fails part-way removes the partial file.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.file_timeout())?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn stream_into(&self, resource: &ResourceRef, file: &mut File) -> Result<u64, SkipReason> {
        let url = resource.url();
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport(TransportError::from_reqwest(url.as_str(), e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport(TransportError::from_reqwest(url.as_str(), e)))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| SkipReason::Filesystem(e.to_string()))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| SkipReason::Filesystem(e.to_string()))?;
        Ok(written)
    }
}

#[async_trait]
impl FileTransfer for HttpTransfer {
    async fn transfer(&self, resource: &ResourceRef, directory: &Path) -> TransferOutcome {
        let path = directory.join(resource.file_name());

        if fs::try_exists(&path).await.unwrap_or(false) {
            return TransferOutcome::Skipped(SkipReason::AlreadyExists);
        }

        let started = Instant::now();
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return TransferOutcome::Skipped(SkipReason::AlreadyExists)
            }
            Err(e) => return TransferOutcome::Skipped(SkipReason::Filesystem(e.to_string())),
        };

        match self.stream_into(resource, &mut file).await {
            Ok(bytes) => {
                tracing::trace!("Wrote {} bytes to {}", bytes, path.display());
                TransferOutcome::Downloaded {
                    elapsed: started.elapsed(),
                }
            }
            Err(reason) => {
                drop(file);
                if let Err(e) = fs::remove_file(&path).await {
                    tracing::debug!("Could not remove partial file {}: {}", path.display(), e);
                }
                TransferOutcome::Skipped(reason)
            }
        }
    }
}

fn transport(error: TransportError) -> SkipReason {
    SkipReason::Transport(error.to_string())
}
