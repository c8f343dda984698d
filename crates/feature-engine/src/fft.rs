//! FFT-based Frequency Analysis

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Magnitude spectrum over the non-negative frequency bins
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// |X[k]| for k = 0..=(n-1)/2
    pub magnitudes: Vec<f64>,
    /// Sampling frequency (Hz)
    pub sample_rate: f64,
    /// Transform length
    pub len: usize,
}

/// Strongest bin inside a band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub bin: usize,
    pub frequency: f64,
    pub magnitude: f64,
}

impl Spectrum {
    pub fn frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate / self.len as f64
    }

    /// Bin spacing (Hz)
    pub fn resolution(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        self.sample_rate / self.len as f64
    }

    /// Largest-magnitude bin with `low <= f <= high`, first one on ties
    pub fn peak_in_band(&self, low: f64, high: f64) -> Option<SpectralPeak> {
        let mut best: Option<SpectralPeak> = None;
        for (bin, &magnitude) in self.magnitudes.iter().enumerate() {
            let frequency = self.frequency(bin);
            if frequency < low || frequency > high {
                continue;
            }
            if best.map_or(true, |b| magnitude > b.magnitude) {
                best = Some(SpectralPeak {
                    bin,
                    frequency,
                    magnitude,
                });
            }
        }
        best
    }
}

/// FFT Analyzer for frequency domain features
pub struct FftAnalyzer {
    /// Plan for the last transform length; buffers are usually a fixed size
    plan: Option<Arc<dyn Fft<f64>>>,
    /// Sampling frequency (Hz)
    sample_rate: f64,
}

impl FftAnalyzer {
    /// Create a new FFT analyzer
    pub fn new(sample_rate: f64) -> Self {
        Self {
            plan: None,
            sample_rate,
        }
    }

    fn plan(&mut self, len: usize) -> Arc<dyn Fft<f64>> {
        match &self.plan {
            Some(plan) if plan.len() == len => Arc::clone(plan),
            _ => {
                let plan = FftPlanner::new().plan_fft_forward(len);
                self.plan = Some(Arc::clone(&plan));
                plan
            }
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Apply Hamming window to reduce spectral leakage
    pub fn apply_hamming_window(signal: &mut [f64]) {
        let n = signal.len();
        if n < 2 {
            return;
        }
        for (i, v) in signal.iter_mut().enumerate() {
            let window =
                0.54 - 0.46 * (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos();
            *v *= window;
        }
    }

    /// Magnitude spectrum of `signal` taken as-is (window it first if needed)
    pub fn magnitude_spectrum(&mut self, signal: &[f64]) -> Spectrum {
        if signal.is_empty() {
            return Spectrum::default();
        }

        let n = signal.len();
        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&v| Complex::new(v, 0.0)).collect();

        self.plan(n).process(&mut buffer);

        Spectrum {
            magnitudes: buffer.iter().take((n - 1) / 2 + 1).map(|c| c.norm()).collect(),
            sample_rate: self.sample_rate,
            len: n,
        }
    }

    /// Hamming window then magnitude spectrum
    pub fn windowed_spectrum(&mut self, signal: &[f64]) -> Spectrum {
        let mut windowed = signal.to_vec();
        Self::apply_hamming_window(&mut windowed);
        self.magnitude_spectrum(&windowed)
    }
}
