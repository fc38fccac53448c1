//! Bounded, FIFO-trimmed history of attempt results.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::domain::models::AttemptResult;

/// Attempt history in arrival order, capped at `capacity` entries.
///
/// The oldest entries are dropped first when the cap is exceeded, and a
/// retention sweep removes entries older than a cutoff.
#[derive(Debug, Clone)]
pub struct ResultHistory {
    entries: VecDeque<AttemptResult>,
    capacity: usize,
}

impl ResultHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a result, evicting the oldest entries beyond the cap.
    pub fn push(&mut self, result: AttemptResult) {
        self.entries.push_back(result);
        self.trim_to(self.capacity);
    }

    /// Keep only the `max_len` most recent entries. Returns the number removed.
    pub fn trim_to(&mut self, max_len: usize) -> usize {
        let excess = self.entries.len().saturating_sub(max_len);
        self.entries.drain(..excess);
        excess
    }

    /// Drop entries recorded before `cutoff`. Returns the number removed.
    pub fn prune_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp >= cutoff);
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttemptResult> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<AttemptResult> {
        self.entries.iter().cloned().collect()
    }
}
