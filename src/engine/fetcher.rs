//! Thread page fetcher
//!
//! This module handles the one outbound request per poll cycle:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for the thread page
//! - Mapping timeouts, network failures, and non-2xx statuses to `TransportError`

use crate::config::EngineConfig;
use crate::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Source of raw thread page content
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page body, or the reason it could not be retrieved
    async fn fetch(&self, url: &Url) -> Result<String, TransportError>;
}

/// Builds an HTTP client with the given user agent and whole-request timeout
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use threadget::engine::build_http_client;
///
/// let client = build_http_client("threadget/1.0", Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.page_timeout())?;
        Ok(Self { client })
    }

    /// Wraps an existing client (its timeout and user agent are kept as-is)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))
    }
}
