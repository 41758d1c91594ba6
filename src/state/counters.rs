//! Per-cycle and whole-run counters

/// Counters for one poll cycle, reset when the next cycle is scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounters {
    /// Files transferred this cycle
    pub downloaded: u64,

    /// Files skipped this cycle (already present or failed)
    pub skipped: u64,

    /// Download slots that went idle with nothing left to hand out
    pub finished_slots: usize,
}

impl CycleCounters {
    pub fn record_downloaded(&mut self) {
        self.downloaded += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Marks one slot idle and returns true once `concurrency` slots are idle
    pub fn finish_slot(&mut self, concurrency: usize) -> bool {
        self.finished_slots += 1;
        self.finished_slots >= concurrency
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Totals across the whole run, used for reporting only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub downloaded: u64,
    pub skipped: u64,

    /// Completed poll cycles
    pub cycles: u64,
}

impl RunningTotals {
    pub fn record_downloaded(&mut self) {
        self.downloaded += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn finish_cycle(&mut self) {
        self.cycles += 1;
    }
}
