//! Fixed-capacity history of recent readings.
//!
//! Readings are appended in tick order. Once the buffer is full every push
//! evicts the oldest reading, so the length never exceeds the capacity and
//! the contents always read oldest-first, most-recent-last.

use serde::Serialize;
use std::collections::VecDeque;

/// Default number of readings kept for charting.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// A FIFO window over readings.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryBuffer<T = f64> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T: Clone> HistoryBuffer<T> {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a reading, evicting the oldest one when full.
    ///
    /// Returns the evicted reading, if any.
    pub fn push(&mut self, value: T) -> Option<T> {
        self.entries.push_back(value);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.iter().cloned().collect()
    }

    /// Most recent reading.
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
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

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }
}

impl<T: Clone> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
