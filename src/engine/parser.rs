//! Thread page parser
//!
//! This module turns a thread page into the list of media files it links to,
//! and detects whether the thread has been archived.
//!
//! The selectors are configuration, so boards with a different layout only need
//! a different `[parser]` section, or a different [`PageParser`] altogether.

use crate::config::ParserConfig;
use crate::engine::ResourceRef;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Media files found on a page, plus its archived flag
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedThread {
    /// Files in page order
    pub resources: Vec<ResourceRef>,

    /// True if the page carries the archived marker
    pub archived: bool,
}

/// Strategy for extracting media references from page content
pub trait PageParser: Send + Sync {
    /// Parses `body`, resolving relative links against `page_url`
    fn parse(&self, body: &str, page_url: &Url) -> ParsedThread;
}

/// `PageParser` for imageboard-style thread pages
///
/// # Extraction Rules
///
/// For every element matching `file-selector`:
/// - the media URL is the `href` of the first `link-selector` match, resolved
///   against the page URL (protocol-relative links pick up the page's scheme)
/// - the uploader's name is the `title` attribute of the first `name-selector`
///   match, or its text when there is no title
/// - blocks without a usable link are ignored
///
/// The thread is archived if anything matches `archived-selector`.
#[derive(Debug, Clone)]
pub struct BoardPageParser {
    file_selector: Selector,
    link_selector: Selector,
    name_selector: Selector,
    archived_selector: Selector,
    use_original_names: bool,
    generic_names: Vec<String>,
}

impl BoardPageParser {
    /// Compiles the configured selectors
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a selector does not parse.
    pub fn new(config: &ParserConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            file_selector: compile(&config.file_selector)?,
            link_selector: compile(&config.link_selector)?,
            name_selector: compile(&config.name_selector)?,
            archived_selector: compile(&config.archived_selector)?,
            use_original_names: config.use_original_names,
            generic_names: config.generic_names.clone(),
        })
    }

    fn extract_resource(&self, block: ElementRef<'_>, page_url: &Url) -> Option<ResourceRef> {
        let href = block
            .select(&self.link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))?;
        let media_url = resolve_media_url(href, page_url)?;

        let original_name = if self.use_original_names {
            block.select(&self.name_selector).next().map(original_name)
        } else {
            None
        };

        let file_name =
            resolve_file_name(original_name.as_deref(), &media_url, &self.generic_names)?;
        Some(ResourceRef::new(media_url, file_name))
    }
}

impl PageParser for BoardPageParser {
    fn parse(&self, body: &str, page_url: &Url) -> ParsedThread {
        let document = Html::parse_document(body);

        let resources = document
            .select(&self.file_selector)
            .filter_map(|block| self.extract_resource(block, page_url))
            .collect::<Vec<_>>();

        let archived = document.select(&self.archived_selector).next().is_some();

        tracing::trace!(
            "Parsed {}: {} files, archived={}",
            page_url,
            resources.len(),
            archived
        );

        ParsedThread {
            resources,
            archived,
        }
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| {
        ConfigError::Validation(format!("invalid selector '{}': {:?}", selector, e))
    })
}

/// The uploader's name: `title` attribute first, then element text
fn original_name(element: ElementRef<'_>) -> String {
    element
        .value()
        .attr("title")
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| element.text().collect::<String>().trim().to_string())
}

/// Resolves a media link to an absolute http(s) URL
fn resolve_media_url(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let url = page_url.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Picks the name a media file is saved under
///
/// The uploader's name wins unless it is missing, blank, or one of the
/// `generic_names` (compared ASCII case-insensitively), in which case the last
/// segment of the media URL is used. Both are passed through
/// [`sanitize_file_name`]. Returns `None` if neither yields a usable name.
///
/// # Examples
///
/// ```
/// use threadget::engine::resolve_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://i.example.org/wg/1700000000123.jpg").unwrap();
/// let generic = vec!["image.jpg".to_string()];
///
/// assert_eq!(
///     resolve_file_name(Some("sunset.jpg"), &url, &generic).as_deref(),
///     Some("sunset.jpg")
/// );
/// assert_eq!(
///     resolve_file_name(Some("image.jpg"), &url, &generic).as_deref(),
///     Some("1700000000123.jpg")
/// );
/// ```
pub fn resolve_file_name(
    original: Option<&str>,
    media_url: &Url,
    generic_names: &[String],
) -> Option<String> {
    let preferred = original
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| {
            !generic_names
                .iter()
                .any(|generic| generic.eq_ignore_ascii_case(name))
        })
        .map(sanitize_file_name)
        .filter(|name| !name.is_empty());

    preferred.or_else(|| {
        media_url
            .path_segments()
            .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
            .map(sanitize_file_name)
            .filter(|name| !name.is_empty())
    })
}

/// Makes a name safe to use as a single path component
///
/// Path separators, characters Windows forbids, and control characters become
/// `_`. Surrounding whitespace is trimmed; `.` and `..` become empty.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    match cleaned.as_str() {
        "." | ".." => String::new(),
        _ => cleaned,
    }
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}
