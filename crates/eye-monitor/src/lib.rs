//! Eye Monitor
//!
//! Real-time eye state analysis from facial landmarks:
//! - Eye aspect ratio per frame
//! - Blink counting with consecutive-frame hysteresis
//! - Blinks per minute over a trailing window
//! - Drowsiness score with closure and staring beeps
//!
//! No-face frames leave the blink counter and drowsiness tracker untouched;
//! only the blink window is pruned.

pub mod analysis;
pub mod blink;
pub mod config;
pub mod drowsiness;
pub mod state;

pub use analysis::{BeepKind, EyeAnalysis, EyeEvent};
pub use blink::BlinkCounter;
pub use config::{EyeMonitorConfig, EyeThresholds};
pub use drowsiness::DrowsinessTracker;
pub use state::{DrowsinessState, EyePhase};

use camera_capture::LandmarkFrame;
use feature_engine::{EarEstimator, EarReading, FeatureError};
use thiserror::Error;
use tracing::debug;

/// Eye monitor error types
#[derive(Error, Debug)]
pub enum EyeMonitorError {
    #[error("Feature extraction failed: {0}")]
    Feature(#[from] FeatureError),
}

/// Eye monitoring module
pub struct EyeMonitor {
    estimator: EarEstimator,
    blinks: BlinkCounter,
    drowsiness: DrowsinessTracker,
}

impl EyeMonitor {
    /// Create a new eye monitor with configuration
    pub fn new(thresholds: EyeThresholds, config: EyeMonitorConfig) -> Self {
        Self {
            estimator: EarEstimator::default(),
            blinks: BlinkCounter::new(thresholds.ear_threshold, &config),
            drowsiness: DrowsinessTracker::new(thresholds, config),
        }
    }

    /// Analyze a single landmark frame
    pub fn analyze(&mut self, frame: &LandmarkFrame) -> Result<EyeAnalysis, EyeMonitorError> {
        let reading = self.estimator.measure(frame)?;
        Ok(self.analyze_reading(reading, frame.timestamp))
    }

    /// Analyze a precomputed EAR reading; `None` means no face this frame
    pub fn analyze_reading(&mut self, reading: Option<EarReading>, now: f64) -> EyeAnalysis {
        let mut events = Vec::new();
        let avg_ear = reading.map(|r| r.average());

        if let Some(ear) = avg_ear {
            if let Some(timestamp) = self.blinks.update(ear, now) {
                events.push(EyeEvent::Blink { timestamp });
            }
            self.drowsiness.update(ear, now, &mut events);
        } else {
            debug!("No face at {:.3}, eye state frozen", now);
        }

        EyeAnalysis {
            face_detected: avg_ear.is_some(),
            avg_ear,
            blinks_last_minute: self.blinks.blinks_per_minute(now),
            total_blinks: self.blinks.total(),
            drowsiness_score: self.drowsiness.score(),
            phase: self.drowsiness.phase(),
            events,
        }
    }

    pub fn blinks_per_minute(&mut self, now: f64) -> usize {
        self.blinks.blinks_per_minute(now)
    }

    pub fn drowsiness_score(&self) -> u32 {
        self.drowsiness.score()
    }

    /// Reset state (on session start)
    pub fn reset(&mut self) {
        self.blinks.reset();
        self.drowsiness.reset();
    }
}
