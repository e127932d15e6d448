//! Fixed-capacity FIFO of recent display points.

use std::collections::VecDeque;

/// Keeps the last `capacity` entries; pushing onto a full history evicts
/// the oldest entry.
#[derive(Debug, Clone)]
pub struct RollingHistory<T> {
    capacity: usize,
    entries: VecDeque<T>,
}

impl<T> RollingHistory<T> {
    /// A zero capacity is bumped to one so the latest point is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.entries.front()
    }
}
