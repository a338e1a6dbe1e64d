//! Bounded, newest-first record of past outcomes.

use crate::games::types::current_timestamp_ms;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One recorded outcome: a crash point or a dice roll.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub value: f64,
    pub timestamp: u64,
}

/// Fixed-capacity outcome log; insertion evicts the oldest entry.
#[derive(Debug)]
pub struct HistoryLog {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Prepend an outcome, dropping the oldest entry past capacity.
    pub fn push(&mut self, value: f64) {
        self.entries.push_front(HistoryEntry {
            value,
            timestamp: current_timestamp_ms(),
        });
        self.entries.truncate(self.capacity);
    }

    /// Ordered copy of the log, newest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
