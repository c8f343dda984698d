//! Feature Engineering Engine
//!
//! Turns landmark frames into the scalar signals the monitors consume:
//! - Eye aspect ratio per eye (blink and drowsiness input)
//! - 7-dimensional facial stress feature vector
//! - Signal conditioning for rPPG: detrend, Butterworth band-pass, spectrum peak

mod ear;
mod fft;
mod filter;
mod statistics;
mod stress_features;

pub use ear::{eye_aspect_ratio, EarEstimator, EarReading, LEFT_EYE, RIGHT_EYE};
pub use fft::{FftAnalyzer, Spectrum, SpectralPeak};
pub use filter::{detrend, BandPassFilter, BiquadSection};
pub use statistics::{mean, median, std_dev};
pub use stress_features::{StressFeatureExtractor, StressFeatures, STRESS_FEATURE_DIM};

use thiserror::Error;

/// Feature extraction error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Landmark {0} missing from face mesh")]
    MissingLandmark(usize),

    #[error("Invalid filter band {low}..{high} Hz at sample rate {sample_rate} Hz")]
    InvalidBand { low: f64, high: f64, sample_rate: f64 },

    #[error("Filter design failed: {0}")]
    FilterDesign(String),
}
