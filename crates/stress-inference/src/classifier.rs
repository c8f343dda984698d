//! Classifier seam

use feature_engine::STRESS_FEATURE_DIM;

use crate::StressError;

pub type FeatureArray = [f64; STRESS_FEATURE_DIM];

/// Binary stressed/relaxed classifier
pub trait StressClassifier: Send {
    /// Probability in [0, 1] that `features` come from a stressed face
    fn predict_probability(&self, features: &FeatureArray) -> f64;

    /// Replace the current fit with one trained on exactly these samples
    fn refit(&mut self, samples: &[FeatureArray], labels: &[bool]) -> Result<(), StressError>;

    fn name(&self) -> &'static str {
        "classifier"
    }
}
