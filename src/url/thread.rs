//! Thread link validation and output directory naming

use crate::url::matcher::host_matches_any;
use crate::{InputError, InputResult};
use std::path::{Path, PathBuf};
use url::Url;

/// A validated thread link, split into the parts the engine cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadLocation {
    url: Url,
    board: String,
    thread_id: u64,
    slug: Option<String>,
}

impl ThreadLocation {
    /// Parses and validates a thread link
    ///
    /// The link must look like `http(s)://<host>/<board>/thread/<numeric-id>[/<slug>]`
    /// where `<host>` matches one of `hosts`. Query strings and fragments are allowed
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] describing the first rule the link breaks.
    pub fn parse(input: &str, hosts: &[String]) -> InputResult<Self> {
        let url = Url::parse(input.trim())
            .map_err(|e| InputError::InvalidThreadUrl(format!("{}: {}", input, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(InputError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .ok_or_else(|| InputError::InvalidThreadUrl(input.to_string()))?;
        if !host_matches_any(hosts, host) {
            return Err(InputError::UnknownHost(host.to_string()));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|segment| !segment.is_empty()).collect())
            .unwrap_or_default();

        let (board, thread_id, slug) = match segments.as_slice() {
            [board, "thread", id] => (*board, *id, None),
            [board, "thread", id, slug] => (*board, *id, Some(*slug)),
            _ => return Err(InputError::MissingThreadId(input.to_string())),
        };

        if thread_id.is_empty() || !thread_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::MissingThreadId(input.to_string()));
        }
        let thread_id = thread_id
            .parse::<u64>()
            .map_err(|_| InputError::MissingThreadId(input.to_string()))?;

        Ok(Self {
            board: board.to_string(),
            thread_id,
            slug: slug.map(str::to_string),
            url,
        })
    }

    /// The thread page URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Board identifier (first path segment)
    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    /// Subject slug, when the link carries one
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Name of the per-thread output directory
    ///
    /// `<board>_<id>`, or `<board>_<slug>_<id>` when the link carries a slug.
    pub fn directory_name(&self) -> String {
        match &self.slug {
            Some(slug) => format!(
                "{}_{}_{}",
                safe_component(&self.board),
                safe_component(slug),
                self.thread_id
            ),
            None => format!("{}_{}", safe_component(&self.board), self.thread_id),
        }
    }

    /// Full path of the output directory under `base`
    pub fn directory_in(&self, base: &Path) -> PathBuf {
        base.join(self.directory_name())
    }
}

/// Returns true if `input` is a thread link on one of the accepted hosts
pub fn validate_thread_url(input: &str, hosts: &[String]) -> bool {
    ThreadLocation::parse(input, hosts).is_ok()
}

fn safe_component(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
