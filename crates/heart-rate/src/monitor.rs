//! Heart-rate monitor
//!
//! Estimation pipeline over the buffered green channel: linear detrend,
//! Butterworth band-pass, Hamming window, FFT, strongest bin in the search
//! band, plus a fixed calibration offset. Only estimates inside the accepted
//! range reach the history; the reported value is the history median.

use camera_capture::CapturedFrame;
use feature_engine::{detrend, median, std_dev, BandPassFilter, FftAnalyzer};
use ring_buffer::{RingBuffer, TimedSample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RppgConfig;
use crate::roi::ForeheadRoi;
use crate::RppgError;

/// What one estimation pass did
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EstimateOutcome {
    /// Fewer buffered samples than required
    Insufficient { samples: usize, required: usize },
    /// No spectrum bin inside the search band
    NoPeak,
    /// Estimate outside the accepted range, discarded
    Rejected { bpm: f64 },
    Accepted { bpm: f64 },
}

/// rPPG heart-rate monitor (lives for one monitoring session)
pub struct HeartRateMonitor {
    config: RppgConfig,
    roi: ForeheadRoi,
    samples: RingBuffer<TimedSample<[f64; 3]>>,
    history: RingBuffer<f64>,
    current: u32,
    filter: BandPassFilter,
    analyzer: FftAnalyzer,
}

impl HeartRateMonitor {
    pub fn new(config: RppgConfig) -> Result<Self, RppgError> {
        let filter = BandPassFilter::butterworth(
            config.filter_order,
            config.filter_low_hz,
            config.filter_high_hz,
            config.fps,
        )?;
        info!(
            "rPPG monitor: {} sample buffer, {:.1}-{:.1} Hz search band",
            config.buffer_capacity(),
            config.search_low_hz,
            config.search_high_hz
        );
        Ok(Self {
            roi: ForeheadRoi::default(),
            samples: RingBuffer::new(config.buffer_capacity()),
            history: RingBuffer::new(config.history_len),
            current: 0,
            analyzer: FftAnalyzer::new(config.fps),
            filter,
            config,
        })
    }

    /// Buffer one mean forehead color
    pub fn add_sample(&mut self, rgb: [f64; 3], timestamp: f64) {
        self.samples.push(TimedSample::new(rgb, timestamp));
    }

    /// Sample a captured frame; `Ok(false)` when it carries nothing usable
    pub fn add_frame(&mut self, frame: &CapturedFrame) -> Result<bool, RppgError> {
        let Some(face) = frame.landmarks.face.as_ref() else {
            return Ok(false);
        };
        let rgb = match (frame.forehead_rgb, frame.pixels.as_ref()) {
            (Some(rgb), _) => rgb,
            (None, Some(pixels)) => self.roi.mean_rgb(pixels, face)?,
            (None, None) => return Ok(false),
        };
        self.add_sample(rgb, frame.timestamp());
        Ok(true)
    }

    /// Run one estimation pass and return the current heart rate
    pub fn estimate(&mut self) -> u32 {
        let outcome = self.estimate_detailed();
        debug!("Heart-rate pass: {:?}, current {}", outcome, self.current);
        self.current
    }

    pub fn estimate_detailed(&mut self) -> EstimateOutcome {
        let required = self.config.min_samples();
        if self.samples.len() < required {
            return EstimateOutcome::Insufficient {
                samples: self.samples.len(),
                required,
            };
        }

        let green: Vec<f64> = self.samples.iter().map(|s| s.value[1]).collect();
        let filtered = self.filter.apply(&detrend(&green));
        let spectrum = self.analyzer.windowed_spectrum(&filtered);

        let Some(peak) =
            spectrum.peak_in_band(self.config.search_low_hz, self.config.search_high_hz)
        else {
            return EstimateOutcome::NoPeak;
        };

        let bpm = (peak.frequency * 60.0).abs() + self.config.calibration_offset_bpm;
        if bpm < self.config.accept_min_bpm || bpm > self.config.accept_max_bpm {
            debug!("Discarding implausible estimate {:.1} BPM", bpm);
            return EstimateOutcome::Rejected { bpm };
        }

        self.accept(bpm);
        EstimateOutcome::Accepted { bpm }
    }

    fn accept(&mut self, bpm: f64) {
        self.history.push(bpm);
        let history = self.history.to_vec();
        self.current = median(&history) as u32;
    }

    /// Last accepted median, 0 before the first
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Std dev of accepted estimates, 0 until enough exist
    pub fn variability(&self) -> u32 {
        if self.history.len() < self.config.hrv_min_samples {
            return 0;
        }
        std_dev(&self.history.to_vec()) as u32
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn buffered_samples(&self) -> usize {
        self.samples.len()
    }

    /// Time covered by the sample buffer (seconds)
    pub fn buffered_secs(&self) -> f64 {
        self.samples.span_secs()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.history.clear();
        self.current = 0;
    }
}
