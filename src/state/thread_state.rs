/// Lifecycle state of the watched thread
///
/// This module defines the states the coordinator moves the thread through
/// as poll cycles complete.
use std::fmt;

/// Represents what the coordinator should do once the current cycle drains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThreadState {
    /// Thread is open; poll again after the retry delay
    #[default]
    Active,

    /// Thread is closed but readable; finish queued work, then stop
    Archived,

    /// Thread page is unreachable or returned a failure status; stop without polling
    Dead,
}

impl ThreadState {
    /// Returns true if no further poll will be scheduled
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Returns true if newly discovered files may still be queued
    pub fn accepts_work(&self) -> bool {
        !matches!(self, Self::Dead)
    }

    /// State implied by the result of a page fetch and parse
    ///
    /// `archived` is `None` when the fetch failed and there was nothing to parse.
    pub fn from_page(archived: Option<bool>) -> Self {
        match archived {
            None => Self::Dead,
            Some(true) => Self::Archived,
            Some(false) => Self::Active,
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Dead => "dead",
        };
        write!(f, "{}", s)
    }
}
