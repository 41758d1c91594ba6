use crate::output::format::format_run_time;
use crate::state::{RunningTotals, ThreadState};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Outcome of a whole run, returned once the coordinator stops
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Wall-clock time from start to shutdown
    pub elapsed: Duration,

    /// State that ended the run (archived or dead)
    pub final_state: ThreadState,

    pub total_downloaded: u64,
    pub total_skipped: u64,

    /// Poll cycles completed, including the last one
    pub cycles: u64,
}

impl RunSummary {
    pub fn new(
        started_at: DateTime<Utc>,
        elapsed: Duration,
        final_state: ThreadState,
        totals: &RunningTotals,
    ) -> Self {
        Self {
            started_at,
            elapsed,
            final_state,
            total_downloaded: totals.downloaded,
            total_skipped: totals.skipped,
            cycles: totals.cycles,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Downloaded {} files in {} ({} skipped, {} polls, thread {}, started {})",
            self.total_downloaded,
            format_run_time(self.elapsed),
            self.total_skipped,
            self.cycles,
            self.final_state,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
