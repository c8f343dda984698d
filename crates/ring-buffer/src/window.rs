//! Trailing Time Window

use std::collections::VecDeque;

/// Append-only event timestamps, pruned to a trailing window on every read.
///
/// Timestamps must be pushed in non-decreasing order. An entry is kept while
/// `now - t <= window_secs`.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    events: VecDeque<f64>,
    window_secs: f64,
}

impl TimeWindow {
    pub fn new(window_secs: f64) -> Self {
        Self {
            events: VecDeque::new(),
            window_secs,
        }
    }

    pub fn push(&mut self, timestamp: f64) {
        debug_assert!(
            self.events.back().map_or(true, |&last| timestamp >= last),
            "time window entries must be monotonic"
        );
        self.events.push_back(timestamp);
    }

    /// Drop entries older than the window relative to `now`
    pub fn prune(&mut self, now: f64) {
        while let Some(&front) = self.events.front() {
            if now - front > self.window_secs {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    /// Prune, then count the entries left in the window
    pub fn count_at(&mut self, now: f64) -> usize {
        self.prune(now);
        self.events.len()
    }

    /// Entry count as of the last prune
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
