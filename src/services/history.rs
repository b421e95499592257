//! Export history
//!
//! Bounded, in-memory record of completed export runs. The most recent run
//! comes first and the oldest is evicted once the buffer is full.

use std::collections::VecDeque;

use crate::models::{ExportResult, ResultId};

/// Default number of results kept
pub const HISTORY_CAPACITY: usize = 50;

/// Bounded list of past export results
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<ExportResult>,
    capacity: usize,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// A capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a result, evicting the oldest entries past capacity
    pub fn push(&mut self, result: ExportResult) {
        self.entries.push_front(result);
        self.entries.truncate(self.capacity);
    }

    /// Results, most recent first
    pub fn list(&self) -> Vec<ExportResult> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExportResult> {
        self.entries.iter()
    }

    pub fn get(&self, id: ResultId) -> Option<&ExportResult> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn latest(&self) -> Option<&ExportResult> {
        self.entries.front()
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
