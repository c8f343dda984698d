//! Synthetic cold-start training data
//!
//! Two Gaussian clusters stand in for relaxed and stressed faces until the
//! user supplies calibration samples. Feature order matches `StressFeatures`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::classifier::FeatureArray;

pub const BOOTSTRAP_SEED: u64 = 42;

/// Per-feature mean and spread of one synthetic class
#[derive(Debug, Clone, Copy)]
pub struct BootstrapProfile {
    pub mean: FeatureArray,
    pub std_dev: FeatureArray,
}

impl BootstrapProfile {
    /// Wider brow distance, open mouth, higher EAR
    pub const RELAXED: BootstrapProfile = BootstrapProfile {
        mean: [45.0, 45.0, 100.0, 0.3, 120.0, 0.25, 0.25],
        std_dev: [5.0, 5.0, 10.0, 0.1, 5.0, 0.05, 0.05],
    };

    /// Lowered brows, tight mouth, narrowed eyes
    pub const STRESSED: BootstrapProfile = BootstrapProfile {
        mean: [35.0, 35.0, 80.0, 0.15, 110.0, 0.20, 0.20],
        std_dev: [3.0, 3.0, 8.0, 0.08, 4.0, 0.03, 0.03],
    };

    fn sample(&self, rng: &mut StdRng) -> FeatureArray {
        let mut out = [0.0; 7];
        for (i, v) in out.iter_mut().enumerate() {
            let z: f64 = StandardNormal.sample(rng);
            *v = self.mean[i] + z * self.std_dev[i];
        }
        out
    }
}

/// `per_class` relaxed samples (label false) followed by `per_class` stressed ones
pub fn synthetic_training_set(per_class: usize, seed: u64) -> (Vec<FeatureArray>, Vec<bool>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut samples = Vec::with_capacity(2 * per_class);
    let mut labels = Vec::with_capacity(2 * per_class);

    for _ in 0..per_class {
        samples.push(BootstrapProfile::RELAXED.sample(&mut rng));
        labels.push(false);
    }
    for _ in 0..per_class {
        samples.push(BootstrapProfile::STRESSED.sample(&mut rng));
        labels.push(true);
    }
    (samples, labels)
}
