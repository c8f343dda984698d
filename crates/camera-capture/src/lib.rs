//! Camera Capture Model for Ocular Monitoring
//!
//! Defines what the monitoring core consumes from the outside world:
//! - Per-frame facial landmark sets (single face, normalized coordinates)
//! - Optional RGB pixel data for forehead color sampling
//! - A `LandmarkSource` trait implemented by live detectors or recordings
//!
//! The landmark detector itself lives outside this workspace; `ReplaySource`
//! plays back a recorded session so the pipeline can run without one.

pub mod frame;
pub mod landmarks;
pub mod source;

pub use frame::VideoFrame;
pub use landmarks::{FaceLandmarks, LandmarkFrame, Point2, MIN_LANDMARKS};
pub use source::{CapturedFrame, LandmarkSource, ReplayConfig, ReplaySource};

use thiserror::Error;

/// Capture error types
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open source: {0}")]
    Open(String),

    #[error("Too few landmarks: expected at least {expected}, got {actual}")]
    TooFewLandmarks { expected: usize, actual: usize },

    #[error("Malformed record at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Streaming error: {0}")]
    Stream(#[from] std::io::Error),
}
