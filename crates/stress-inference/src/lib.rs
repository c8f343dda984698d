//! Stress Inference
//!
//! Maps the 7-dimensional facial feature vector to a smoothed 0-100 stress
//! score. The classifier sits behind `StressClassifier` so the synthetic
//! bootstrap model can be swapped for a trained one.

mod bootstrap;
mod classifier;
mod level;
mod model;
mod scorer;

pub use bootstrap::{synthetic_training_set, BootstrapProfile, BOOTSTRAP_SEED};
pub use classifier::{FeatureArray, StressClassifier};
pub use level::StressLevel;
pub use model::{LogisticConfig, LogisticModel};
pub use scorer::{CalibrationStatus, HighStressTracker, StressConfig, StressScorer};

use thiserror::Error;

/// Errors during stress inference
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StressError {
    #[error("Not enough training samples: need {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Sample/label count mismatch: {samples} samples, {labels} labels")]
    LabelMismatch { samples: usize, labels: usize },

    #[error("Training labels contain a single class")]
    SingleClass,

    #[error("Model fit failed: {0}")]
    Fit(String),
}
