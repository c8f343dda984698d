//! Heart-Rate Estimation (rPPG)
//!
//! Accumulates the mean forehead color per frame and periodically extracts
//! a pulse estimate from the green channel spectrum.

pub mod config;
pub mod monitor;
pub mod roi;

pub use config::RppgConfig;
pub use monitor::{EstimateOutcome, HeartRateMonitor};
pub use roi::{ForeheadRoi, FOREHEAD_INDICES};

use feature_engine::FeatureError;
use thiserror::Error;

/// rPPG error types
#[derive(Error, Debug)]
pub enum RppgError {
    #[error("Forehead region is empty")]
    EmptyRoi,

    #[error("Frame error: {0}")]
    Frame(#[from] camera_capture::CaptureError),

    #[error("Signal processing error: {0}")]
    Feature(#[from] FeatureError),
}
