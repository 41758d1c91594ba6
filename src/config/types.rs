use serde::Deserialize;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Threadget
///
/// Every section is optional; a missing file or section falls back to the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub thread: ThreadConfig,
    pub parser: ParserConfig,
    pub output: OutputConfig,
}

/// Polling and transfer behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between poll cycles while the thread is active (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: u64,

    /// Timeout for fetching the thread page (milliseconds)
    #[serde(rename = "page-timeout")]
    pub page_timeout: u64,

    /// Timeout for a single media download (milliseconds)
    #[serde(rename = "file-timeout")]
    pub file_timeout: u64,

    /// Concurrent downloads when none is given on the command line
    #[serde(rename = "default-concurrency")]
    pub default_concurrency: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl EngineConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout)
    }

    pub fn file_timeout(&self) -> Duration {
        Duration::from_millis(self.file_timeout)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_delay: 30_000,
            page_timeout: 5_000,
            file_timeout: 60_000,
            default_concurrency: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Which thread links are accepted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    /// Host patterns (e.g., "boards.example.org" or "*.example.org")
    pub hosts: Vec<String>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            hosts: vec![
                "boards.4chan.org".to_string(),
                "boards.4channel.org".to_string(),
            ],
        }
    }
}

/// Page parsing rules
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Prefer the uploader's file name over the one in the media URL
    #[serde(rename = "use-original-names")]
    pub use_original_names: bool,

    /// Uploader names that are too generic to keep (mobile clients name everything image.jpg)
    #[serde(rename = "generic-names")]
    pub generic_names: Vec<String>,

    /// Selector for one attachment block
    #[serde(rename = "file-selector")]
    pub file_selector: String,

    /// Selector (inside the block) for the link to the full media file
    #[serde(rename = "link-selector")]
    pub link_selector: String,

    /// Selector (inside the block) for the element carrying the uploader's name
    #[serde(rename = "name-selector")]
    pub name_selector: String,

    /// Selector whose presence marks the thread as archived
    #[serde(rename = "archived-selector")]
    pub archived_selector: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            use_original_names: true,
            generic_names: ["image.jpg", "image.png", "image.gif", "image.webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            file_selector: "div.file".to_string(),
            link_selector: "a.fileThumb".to_string(),
            name_selector: "div.fileText > a".to_string(),
            archived_selector: ".closed".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the per-thread folder is created in
    #[serde(rename = "base-dir")]
    pub base_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
        }
    }
}
