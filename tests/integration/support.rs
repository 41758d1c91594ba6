//! Fakes and fixtures shared by the integration tests

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use threadget::config::{ParserConfig, PoolSize};
use threadget::engine::{
    BoardPageParser, CoordinatorSettings, EngineParts, FileTransfer, PageFetcher, PageParser,
    ParsedThread, ResourceRef, TransferOutcome,
};
use threadget::output::{ProgressEvent, Reporter};
use threadget::TransportError;
use url::Url;

pub const TEST_HOST: &str = "boards.example.org";

/// Reporter that keeps every event in order
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }

    /// `(worker_id, file_name)` of every dispatch, in order
    pub fn dispatches(&self) -> Vec<(usize, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Dispatched {
                    worker_id,
                    file_name,
                } => Some((worker_id, file_name)),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// One scripted page response
#[derive(Debug, Clone)]
pub enum Page {
    Body(String),
    Status(u16),
}

/// Fetcher that plays back a script, repeating the last entry once it runs out
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Page>>,
    last: Mutex<Option<Page>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            script: Mutex::new(pages.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let page = {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *last = Some(next);
            }
            last.clone().expect("fetcher script is empty")
        };

        match page {
            Page::Body(body) => Ok(body),
            Page::Status(status) => Err(TransportError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}

/// Real board parser that counts how often it is asked to parse
pub struct CountingParser {
    inner: BoardPageParser,
    calls: AtomicUsize,
}

impl CountingParser {
    pub fn new() -> Self {
        Self {
            inner: BoardPageParser::new(&ParserConfig::default()).unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageParser for CountingParser {
    fn parse(&self, body: &str, page_url: &Url) -> ParsedThread {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.parse(body, page_url)
    }
}

/// Transfer that "downloads" by remembering names per directory
///
/// A name seen before in the same directory is skipped as already present,
/// which is how the real transfer behaves on a re-poll.
#[derive(Default)]
pub struct MemoryTransfer {
    stored: Mutex<HashSet<PathBuf>>,
    calls: AtomicUsize,
}

impl MemoryTransfer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileTransfer for MemoryTransfer {
    async fn transfer(&self, resource: &ResourceRef, directory: &Path) -> TransferOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let path = directory.join(resource.file_name());
        if self.stored.lock().unwrap().insert(path) {
            TransferOutcome::Downloaded {
                elapsed: Duration::from_millis(5),
            }
        } else {
            TransferOutcome::Skipped(threadget::engine::SkipReason::AlreadyExists)
        }
    }
}

/// Collaborators plus handles on them for assertions
pub struct Harness {
    pub fetcher: Arc<ScriptedFetcher>,
    pub parser: Arc<CountingParser>,
    pub transfer: Arc<MemoryTransfer>,
    pub reporter: Arc<RecordingReporter>,
}

impl Harness {
    pub fn new(pages: Vec<Page>) -> Self {
        Self {
            fetcher: Arc::new(ScriptedFetcher::new(pages)),
            parser: Arc::new(CountingParser::new()),
            transfer: Arc::new(MemoryTransfer::default()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    pub fn parts(&self) -> EngineParts {
        EngineParts {
            fetcher: self.fetcher.clone(),
            parser: self.parser.clone(),
            transfer: self.transfer.clone(),
            reporter: self.reporter.clone(),
        }
    }
}

pub fn settings(base_dir: &Path, workers: usize, concurrency: usize) -> CoordinatorSettings {
    CoordinatorSettings {
        pool: PoolSize {
            workers,
            concurrency,
        },
        retry_delay: Duration::from_millis(20),
        base_dir: base_dir.to_path_buf(),
        hosts: vec![TEST_HOST.to_string()],
    }
}

/// One file block in board markup; `name` goes in the title attribute
pub fn file_block(href: &str, name: &str) -> String {
    format!(
        r#"<div class="file">
            <div class="fileText">File: <a href="{href}" title="{name}">{name}</a></div>
            <a class="fileThumb" href="{href}"><img src="s.jpg"></a>
        </div>"#,
        href = href,
        name = name
    )
}

/// A thread page with one file block per `(href, name)`
pub fn thread_page(files: &[(&str, &str)], archived: bool) -> String {
    let blocks: Vec<String> = files
        .iter()
        .map(|(href, name)| file_block(href, name))
        .collect();
    let marker = if archived {
        r#"<div class="closed">Thread archived. You cannot reply anymore.</div>"#
    } else {
        ""
    };
    format!(
        "<html><body>{}<div class=\"thread\">{}</div></body></html>",
        marker,
        blocks.join("\n")
    )
}
