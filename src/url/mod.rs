//! URL handling module for Threadget
//!
//! This module validates thread links, splits them into board/thread/slug
//! parts, derives the output directory name, and matches hosts against the
//! configured host patterns.

mod matcher;
mod thread;

// Re-export main functions
pub use matcher::{host_matches, host_matches_any};
pub use thread::{validate_thread_url, ThreadLocation};
