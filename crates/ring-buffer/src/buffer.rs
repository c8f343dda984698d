//! Bounded Ring Buffer Implementation

use std::collections::VecDeque;

use crate::TimedSample;

/// Fixed-capacity ring; pushing into a full ring evicts the oldest entry
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    storage: VecDeque<T>,
    capacity: usize,
    total_written: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    /// Push a value, returning the evicted oldest value if the ring was full
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.storage.len() == self.capacity {
            self.storage.pop_front()
        } else {
            None
        };
        self.storage.push_back(value);
        self.total_written += 1;
        evicted
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.storage.iter()
    }

    /// Values pushed since creation or the last clear, evicted ones included
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    pub fn clear(&mut self) {
        self.storage.clear();
        self.total_written = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copy out all values, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.storage.iter().cloned().collect()
    }
}

impl<T: Clone> RingBuffer<TimedSample<T>> {
    /// Time covered between the oldest and newest buffered sample
    pub fn span_secs(&self) -> f64 {
        match (self.storage.front(), self.storage.back()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }
}
