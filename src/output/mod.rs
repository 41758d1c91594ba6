//! Output module for progress reporting and run summaries
//!
//! This module handles:
//! - The `Reporter` interface the coordinator announces transitions through
//! - Human-readable run time formatting
//! - The summary returned when a run ends

mod format;
mod report;
mod summary;

pub use format::format_run_time;
pub use report::{ProgressEvent, Reporter, TracingReporter};
pub use summary::RunSummary;
