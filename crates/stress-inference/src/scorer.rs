//! Stress Scorer
//!
//! Readiness gate, per-call probability, and a trailing mean over raw scores.

use ring_buffer::RingBuffer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{FeatureArray, StressClassifier};
use crate::level::StressLevel;
use crate::model::{LogisticConfig, LogisticModel};
use crate::StressError;
use feature_engine::StressFeatures;

/// Stress scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Trailing feature vectors kept
    pub feature_buffer: usize,
    /// Feature vectors required before scoring
    pub min_features: usize,
    /// Raw scores averaged into the reported score
    pub score_history: usize,
    /// Score at or above which a high-stress run is in progress
    pub high_threshold: u32,
    /// Calibration samples required before refitting
    pub min_calibration_samples: usize,
    pub model: LogisticConfig,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            feature_buffer: 100,
            min_features: 10,
            score_history: 50,
            high_threshold: 70,
            min_calibration_samples: 20,
            model: LogisticConfig::default(),
        }
    }
}

/// Start of the current unbroken run at or above the high threshold
#[derive(Debug, Clone)]
pub struct HighStressTracker {
    threshold: u32,
    start: Option<f64>,
}

impl HighStressTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    /// A single score below threshold clears the run
    pub fn update(&mut self, score: u32, now: f64) {
        if score >= self.threshold {
            self.start.get_or_insert(now);
        } else {
            self.start = None;
        }
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn sustained_for(&self, now: f64) -> Option<f64> {
        self.start.map(|s| now - s)
    }

    pub fn reset(&mut self) {
        self.start = None;
    }
}

/// Outcome of adding a calibration sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationStatus {
    pub samples: usize,
    pub required: usize,
    pub refitted: bool,
}

/// Stress scorer (lives for one monitoring session)
pub struct StressScorer {
    config: StressConfig,
    classifier: Box<dyn StressClassifier>,
    features: RingBuffer<FeatureArray>,
    history: RingBuffer<u32>,
    score: u32,
    high: HighStressTracker,
    calibration: Vec<(FeatureArray, bool)>,
}

impl StressScorer {
    /// Scorer backed by the bootstrapped logistic model
    pub fn new(config: StressConfig) -> Result<Self, StressError> {
        let model = LogisticModel::bootstrap(config.model.clone())?;
        Ok(Self::with_classifier(config, Box::new(model)))
    }

    pub fn with_classifier(config: StressConfig, classifier: Box<dyn StressClassifier>) -> Self {
        info!("Stress scorer using {} classifier", classifier.name());
        Self {
            features: RingBuffer::new(config.feature_buffer),
            history: RingBuffer::new(config.score_history),
            high: HighStressTracker::new(config.high_threshold),
            score: 0,
            calibration: Vec::new(),
            classifier,
            config,
        }
    }

    /// Score one frame's features and update the high-stress run
    pub fn score(&mut self, features: &StressFeatures, now: f64) -> u32 {
        let score = self.score_array(features.to_array());
        self.high.update(score, now);
        score
    }

    fn score_array(&mut self, features: FeatureArray) -> u32 {
        self.features.push(features);
        if self.features.len() < self.config.min_features {
            return 0;
        }

        let probability = self.classifier.predict_probability(&features).clamp(0.0, 1.0);
        let raw = (probability * 100.0) as u32;
        self.history.push(raw);

        let sum: u32 = self.history.iter().sum();
        self.score = sum / self.history.len() as u32;
        debug!("Stress raw {} smoothed {}", raw, self.score);
        self.score
    }

    /// Store a labelled sample; refits once enough have accumulated
    pub fn add_calibration_sample(
        &mut self,
        features: &StressFeatures,
        stressed: bool,
    ) -> Result<CalibrationStatus, StressError> {
        self.calibration.push((features.to_array(), stressed));
        let samples = self.calibration.len();
        let required = self.config.min_calibration_samples;

        if samples < required {
            return Ok(CalibrationStatus {
                samples,
                required,
                refitted: false,
            });
        }

        let (x, y): (Vec<FeatureArray>, Vec<bool>) = self.calibration.iter().copied().unzip();
        self.classifier.refit(&x, &y)?;
        info!("Stress classifier refitted on {} calibration samples", samples);
        Ok(CalibrationStatus {
            samples,
            required,
            refitted: true,
        })
    }

    /// Last smoothed score
    pub fn current(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> StressLevel {
        StressLevel::from_score(self.score)
    }

    pub fn high_stress_start(&self) -> Option<f64> {
        self.high.start()
    }

    pub fn high_stress(&self) -> &HighStressTracker {
        &self.high
    }

    pub fn calibration_len(&self) -> usize {
        self.calibration.len()
    }

    pub fn features_seen(&self) -> usize {
        self.features.total_written()
    }

    /// Reset per-session state; calibration samples and the fit are kept
    pub fn reset(&mut self) {
        self.features.clear();
        self.history.clear();
        self.score = 0;
        self.high.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Reads its probability from the first feature
    struct EchoClassifier {
        refits: Arc<AtomicUsize>,
        last_fit_len: Arc<AtomicUsize>,
    }

    impl StressClassifier for EchoClassifier {
        fn predict_probability(&self, features: &FeatureArray) -> f64 {
            features[0]
        }

        fn refit(&mut self, samples: &[FeatureArray], _labels: &[bool]) -> Result<(), StressError> {
            self.refits.fetch_add(1, Ordering::SeqCst);
            self.last_fit_len.store(samples.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    fn echo_scorer() -> (StressScorer, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let refits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let scorer = StressScorer::with_classifier(
            StressConfig::default(),
            Box::new(EchoClassifier {
                refits: refits.clone(),
                last_fit_len: last.clone(),
            }),
        );
        (scorer, refits, last)
    }

    fn with_probability(p: f64) -> StressFeatures {
        StressFeatures::from_array([p, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn test_readiness_gate() {
        let (mut scorer, _, _) = echo_scorer();
        for i in 0..9 {
            assert_eq!(scorer.score(&with_probability(1.0), i as f64), 0);
        }
        assert_eq!(scorer.score(&with_probability(1.0), 9.0), 100);
    }

    #[test]
    fn test_score_is_trailing_integer_mean() {
        let (mut scorer, _, _) = echo_scorer();
        for i in 0..9 {
            scorer.score(&with_probability(0.9), i as f64);
        }
        assert_eq!(scorer.score(&with_probability(0.5), 9.0), 50);
        assert_eq!(scorer.score(&with_probability(1.0), 10.0), 75);
        assert_eq!(scorer.score(&with_probability(0.0), 11.0), 50);
        // (50 + 100 + 0 + 1) / 4 = 37.75
        assert_eq!(scorer.score(&with_probability(0.01), 12.0), 37);
    }

    #[test]
    fn test_history_is_bounded() {
        let (mut scorer, _, _) = echo_scorer();
        for i in 0..9 {
            scorer.score(&with_probability(0.0), i as f64);
        }
        for i in 0..50 {
            scorer.score(&with_probability(0.0), 10.0 + i as f64);
        }
        // 50 zeros pushed out by 50 full scores
        for i in 0..50 {
            scorer.score(&with_probability(1.0), 100.0 + i as f64);
        }
        assert_eq!(scorer.current(), 100);
    }

    #[test]
    fn test_calibration_refits_at_twenty() {
        let (mut scorer, refits, last) = echo_scorer();
        for i in 0..19 {
            let status = scorer
                .add_calibration_sample(&with_probability(0.1), i % 2 == 0)
                .unwrap();
            assert!(!status.refitted);
        }
        assert_eq!(refits.load(Ordering::SeqCst), 0);

        let status = scorer
            .add_calibration_sample(&with_probability(0.1), true)
            .unwrap();
        assert!(status.refitted);
        assert_eq!(last.load(Ordering::SeqCst), 20);

        scorer
            .add_calibration_sample(&with_probability(0.1), false)
            .unwrap();
        assert_eq!(refits.load(Ordering::SeqCst), 2);
        assert_eq!(last.load(Ordering::SeqCst), 21);
    }

    #[test]
    fn test_sustained_stress_resets_on_dip() {
        let mut tracker = HighStressTracker::new(70);
        tracker.update(80, 0.0);
        tracker.update(90, 10.0);
        assert_eq!(tracker.sustained_for(20.0), Some(20.0));

        tracker.update(69, 21.0);
        assert_eq!(tracker.start(), None);

        tracker.update(75, 30.0);
        assert_eq!(tracker.sustained_for(35.0), Some(5.0));
    }

    #[test]
    fn test_scorer_tracks_high_stress_run() {
        let (mut scorer, _, _) = echo_scorer();
        for i in 0..10 {
            scorer.score(&with_probability(0.9), i as f64);
        }
        assert_eq!(scorer.high_stress_start(), Some(9.0));
        scorer.score(&with_probability(0.0), 10.0);
        // mean(90, 0) = 45
        assert_eq!(scorer.high_stress_start(), None);
    }

    proptest::proptest! {
        #[test]
        fn bootstrap_scores_stay_in_range(
            values in proptest::array::uniform7(-1000.0f64..1000.0),
        ) {
            let mut scorer = StressScorer::new(StressConfig::default()).unwrap();
            let features = StressFeatures::from_array(values);
            for i in 0..12 {
                let score = scorer.score(&features, i as f64);
                proptest::prop_assert!(score <= 100);
            }
        }
    }
}
