//! rPPG configuration

use serde::{Deserialize, Serialize};

/// Heart-rate estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RppgConfig {
    /// Source frame rate, also the assumed sample rate
    pub fps: f64,
    /// Sample buffer span (seconds)
    pub buffer_seconds: f64,
    /// Buffered span required before estimating (seconds)
    pub min_seconds: f64,
    /// Butterworth order
    pub filter_order: usize,
    /// Band-pass edges (Hz)
    pub filter_low_hz: f64,
    pub filter_high_hz: f64,
    /// Peak search band (Hz)
    pub search_low_hz: f64,
    pub search_high_hz: f64,
    /// Added to the spectral estimate (BPM)
    pub calibration_offset_bpm: f64,
    /// Accepted estimate range (BPM, inclusive)
    pub accept_min_bpm: f64,
    pub accept_max_bpm: f64,
    /// Accepted estimates kept for the median
    pub history_len: usize,
    /// Accepted estimates required before variability is reported
    pub hrv_min_samples: usize,
}

impl Default for RppgConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            buffer_seconds: 15.0,
            min_seconds: 10.0,
            filter_order: 4,
            filter_low_hz: 0.8,
            filter_high_hz: 3.5,
            search_low_hz: 1.0,
            search_high_hz: 2.0,
            calibration_offset_bpm: 10.0,
            accept_min_bpm: 55.0,
            accept_max_bpm: 120.0,
            history_len: 20,
            hrv_min_samples: 5,
        }
    }
}

impl RppgConfig {
    pub fn buffer_capacity(&self) -> usize {
        (self.fps * self.buffer_seconds).round().max(1.0) as usize
    }

    pub fn min_samples(&self) -> usize {
        (self.fps * self.min_seconds).round() as usize
    }
}
