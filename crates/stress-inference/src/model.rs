//! Logistic regression stress model

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bootstrap::{synthetic_training_set, BOOTSTRAP_SEED};
use crate::classifier::{FeatureArray, StressClassifier};
use crate::StressError;

/// Gradient descent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    pub iterations: usize,
    pub learning_rate: f64,
    /// L2 penalty on weights
    pub l2: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            learning_rate: 0.5,
            l2: 1e-3,
        }
    }
}

/// Standardized-input logistic regression
#[derive(Debug, Clone)]
pub struct LogisticModel {
    config: LogisticConfig,
    weights: Array1<f64>,
    bias: f64,
    /// Per-feature mean of the training set
    center: Array1<f64>,
    /// Per-feature std dev of the training set, 1 where degenerate
    scale: Array1<f64>,
    trained_on: usize,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticModel {
    /// Untrained model: predicts 0.5 for everything
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            weights: Array1::zeros(7),
            bias: 0.0,
            center: Array1::zeros(7),
            scale: Array1::ones(7),
            trained_on: 0,
        }
    }

    /// Fit on the synthetic relaxed/stressed clusters
    pub fn bootstrap(config: LogisticConfig) -> Result<Self, StressError> {
        let (samples, labels) = synthetic_training_set(100, BOOTSTRAP_SEED);
        let mut model = Self::new(config);
        model.fit(&samples, &labels)?;
        info!("Stress model bootstrapped on {} synthetic samples", samples.len());
        Ok(model)
    }

    pub fn trained_on(&self) -> usize {
        self.trained_on
    }

    fn fit(&mut self, samples: &[FeatureArray], labels: &[bool]) -> Result<(), StressError> {
        if samples.len() != labels.len() {
            return Err(StressError::LabelMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        if samples.len() < 2 {
            return Err(StressError::InsufficientSamples {
                required: 2,
                actual: samples.len(),
            });
        }
        if labels.iter().all(|&l| l) || labels.iter().all(|&l| !l) {
            return Err(StressError::SingleClass);
        }

        let n = samples.len();
        let flat: Vec<f64> = samples.iter().flatten().copied().collect();
        let raw = Array2::from_shape_vec((n, 7), flat)
            .map_err(|e| StressError::Fit(e.to_string()))?;
        let y = Array1::from_iter(labels.iter().map(|&l| if l { 1.0 } else { 0.0 }));

        let center = raw
            .mean_axis(Axis(0))
            .ok_or_else(|| StressError::Fit("empty training set".into()))?;
        let scale = raw
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-9 { s } else { 1.0 });
        let x = (&raw - &center) / &scale;

        let mut weights = Array1::<f64>::zeros(7);
        let mut bias = 0.0;
        let lr = self.config.learning_rate;
        for _ in 0..self.config.iterations {
            let p = (x.dot(&weights) + bias).mapv(sigmoid);
            let err = &p - &y;
            let grad_w = x.t().dot(&err) / n as f64 + &weights * self.config.l2;
            let grad_b = err.sum() / n as f64;
            weights = weights - grad_w * lr;
            bias -= grad_b * lr;
        }

        debug!("Logistic fit on {} samples, bias {:.3}", n, bias);
        self.weights = weights;
        self.bias = bias;
        self.center = center;
        self.scale = scale;
        self.trained_on = n;
        Ok(())
    }
}

impl StressClassifier for LogisticModel {
    fn predict_probability(&self, features: &FeatureArray) -> f64 {
        let x = (Array1::from_iter(features.iter().copied()) - &self.center) / &self.scale;
        let p = sigmoid(x.dot(&self.weights) + self.bias);
        if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn refit(&mut self, samples: &[FeatureArray], labels: &[bool]) -> Result<(), StressError> {
        self.fit(samples, labels)
    }

    fn name(&self) -> &'static str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::BootstrapProfile;

    #[test]
    fn test_bootstrap_separates_profiles() {
        let model = LogisticModel::bootstrap(LogisticConfig::default()).unwrap();
        assert_eq!(model.trained_on(), 200);
        assert!(model.predict_probability(&BootstrapProfile::RELAXED.mean) < 0.2);
        assert!(model.predict_probability(&BootstrapProfile::STRESSED.mean) > 0.8);
    }

    #[test]
    fn test_refit_replaces_bootstrap() {
        let mut model = LogisticModel::bootstrap(LogisticConfig::default()).unwrap();
        // User whose stressed face has a wide jaw and relaxed face a narrow one
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            let jitter = i as f64 * 0.1;
            samples.push([40.0, 40.0, 90.0, 0.2, 100.0 + jitter, 0.22, 0.22]);
            labels.push(false);
            samples.push([40.0, 40.0, 90.0, 0.2, 130.0 + jitter, 0.22, 0.22]);
            labels.push(true);
        }
        model.refit(&samples, &labels).unwrap();

        assert_eq!(model.trained_on(), 20);
        let wide = [40.0, 40.0, 90.0, 0.2, 130.0, 0.22, 0.22];
        let narrow = [40.0, 40.0, 90.0, 0.2, 100.0, 0.22, 0.22];
        assert!(model.predict_probability(&wide) > 0.8);
        assert!(model.predict_probability(&narrow) < 0.2);
    }

    #[test]
    fn test_refit_rejects_single_class() {
        let mut model = LogisticModel::new(LogisticConfig::default());
        let samples = vec![[1.0; 7]; 20];
        let labels = vec![true; 20];
        assert_eq!(model.refit(&samples, &labels), Err(StressError::SingleClass));
        assert_eq!(model.trained_on(), 0);
        assert!((model.predict_probability(&[1.0; 7]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_refit_rejects_mismatched_labels() {
        let mut model = LogisticModel::new(LogisticConfig::default());
        let err = model.refit(&[[0.0; 7]; 3], &[true, false]).unwrap_err();
        assert!(matches!(err, StressError::LabelMismatch { samples: 3, labels: 2 }));
    }
}
