//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `ThreadState`: lifecycle of the watched thread (active, archived, dead)
//! - `CycleCounters`: downloads, skips, and idle slots within one poll cycle
//! - `RunningTotals`: totals across every cycle of the run

mod counters;
mod thread_state;

// Re-export main types
pub use counters::{CycleCounters, RunningTotals};
pub use thread_state::ThreadState;
