use std::fmt;
use url::Url;

/// A media file referenced from the thread page
///
/// Immutable once created. `file_name` is produced by the page parser and is
/// already safe to use as a single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    url: Url,
    file_name: String,
}

impl ResourceRef {
    pub fn new(url: Url, file_name: impl Into<String>) -> Self {
        Self {
            url,
            file_name: file_name.into(),
        }
    }

    /// Location of the full-size media file
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Name the file is saved under
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.url)
    }
}
