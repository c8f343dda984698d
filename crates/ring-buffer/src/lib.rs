//! Bounded Signal History
//!
//! Provides the two history containers every per-session estimator is built on:
//! a fixed-capacity ring that overwrites its oldest entry, and a trailing time
//! window pruned by sample age.

mod buffer;
mod window;

pub use buffer::RingBuffer;
pub use window::TimeWindow;

use serde::{Deserialize, Serialize};

/// A value paired with the time it was observed (seconds since epoch)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimedSample<T> {
    pub value: T,
    pub timestamp: f64,
}

impl<T> TimedSample<T> {
    pub fn new(value: T, timestamp: f64) -> Self {
        Self { value, timestamp }
    }
}
