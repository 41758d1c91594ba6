//! Work queue and worker selection
//!
//! This module handles:
//! - The FIFO queue of files waiting for a worker
//! - Round-robin choice of worker ids during a saturation pass

use crate::engine::ResourceRef;
use std::collections::VecDeque;

/// FIFO queue of files waiting to be downloaded
///
/// Only the coordinator touches it: batches are appended after a parse and
/// single files are taken from the head on dispatch.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: VecDeque<ResourceRef>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch, keeping its order
    pub fn extend(&mut self, batch: impl IntoIterator<Item = ResourceRef>) {
        self.items.extend(batch);
    }

    /// Takes the oldest queued file
    pub fn pop(&mut self) -> Option<ResourceRef> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cycles through worker ids `1..=workers`
///
/// Ids past `workers` wrap back to 1; id 0 is never produced.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    workers: usize,
    next: usize,
}

impl RoundRobin {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            next: 1,
        }
    }

    /// Returns the next worker id
    pub fn next_worker(&mut self) -> usize {
        if self.next > self.workers {
            self.next = 1;
        }
        let id = self.next;
        self.next += 1;
        id
    }

    /// Starts the cycle over at worker 1
    pub fn reset(&mut self) {
        self.next = 1;
    }
}
