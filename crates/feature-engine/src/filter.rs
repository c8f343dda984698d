//! Signal Conditioning Filters
//!
//! Linear detrending and an IIR Butterworth band-pass realized as cascaded
//! second-order sections. The design follows the classic route: analog
//! low-pass prototype, low-pass to band-pass transform on prewarped edges,
//! bilinear transform to the z-plane. Filtering starts from zero state.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use tracing::debug;

use crate::FeatureError;

/// Remove the least-squares straight line from a signal
pub fn detrend(signal: &[f64]) -> Vec<f64> {
    let n = signal.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = signal.iter().sum::<f64>() / nf;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in signal.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;

    signal
        .iter()
        .enumerate()
        .map(|(i, &y)| y - (y_mean + slope * (i as f64 - x_mean)))
        .collect()
}

/// One biquad: b0 + b1 z^-1 + b2 z^-2 over 1 + a1 z^-1 + a2 z^-2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadSection {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

impl BiquadSection {
    fn response(&self, z_inv: Complex<f64>) -> Complex<f64> {
        let z_inv2 = z_inv * z_inv;
        let num = z_inv2 * self.b[2] + z_inv * self.b[1] + self.b[0];
        let den = z_inv2 * self.a[2] + z_inv * self.a[1] + self.a[0];
        num / den
    }
}

/// Digital Butterworth band-pass
#[derive(Debug, Clone)]
pub struct BandPassFilter {
    sections: Vec<BiquadSection>,
    sample_rate: f64,
}

impl BandPassFilter {
    /// Design an `order`-th order band-pass (2 * order poles) for `low..high` Hz
    pub fn butterworth(
        order: usize,
        low: f64,
        high: f64,
        sample_rate: f64,
    ) -> Result<Self, FeatureError> {
        if order == 0 {
            return Err(FeatureError::FilterDesign("order must be at least 1".into()));
        }
        if !(low > 0.0 && low < high && high < sample_rate / 2.0) {
            return Err(FeatureError::InvalidBand {
                low,
                high,
                sample_rate,
            });
        }

        let fs2 = 2.0 * sample_rate;
        let w1 = fs2 * (PI * low / sample_rate).tan();
        let w2 = fs2 * (PI * high / sample_rate).tan();
        let bw = w2 - w1;
        let w0_sq = w1 * w2;

        // Prototype poles on the left half of the unit circle, each split in two
        let mut analog_poles = Vec::with_capacity(2 * order);
        for k in 0..order {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            let lp = Complex::from_polar(1.0, theta) * (bw / 2.0);
            let disc = (lp * lp - w0_sq).sqrt();
            analog_poles.push(lp + disc);
            analog_poles.push(lp - disc);
        }

        let denominator = analog_poles
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, &p| acc * (fs2 - p));
        let gain = (bw * fs2).powi(order as i32) / denominator.re;

        let upper: Vec<Complex<f64>> = analog_poles
            .iter()
            .map(|&p| (fs2 + p) / (fs2 - p))
            .filter(|z| z.im > 0.0)
            .collect();
        if upper.len() != order {
            return Err(FeatureError::FilterDesign(format!(
                "expected {} complex pole pairs, found {}",
                order,
                upper.len()
            )));
        }

        let mut sections: Vec<BiquadSection> = upper
            .iter()
            .map(|z| BiquadSection {
                b: [1.0, 0.0, -1.0],
                a: [1.0, -2.0 * z.re, z.norm_sqr()],
            })
            .collect();
        if let Some(first) = sections.first_mut() {
            first.b = first.b.map(|c| c * gain);
        }

        debug!(
            "Designed order {} band-pass {:.2}-{:.2} Hz at {} Hz ({} sections)",
            order,
            low,
            high,
            sample_rate,
            sections.len()
        );

        Ok(Self {
            sections,
            sample_rate,
        })
    }

    pub fn sections(&self) -> &[BiquadSection] {
        &self.sections
    }

    /// Filter a whole signal through the cascade (direct form II transposed)
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        let mut output = signal.to_vec();
        for section in &self.sections {
            let [b0, b1, b2] = section.b;
            let [_, a1, a2] = section.a;
            let (mut z1, mut z2) = (0.0, 0.0);
            for v in output.iter_mut() {
                let x = *v;
                let y = b0 * x + z1;
                z1 = b1 * x - a1 * y + z2;
                z2 = b2 * x - a2 * y;
                *v = y;
            }
        }
        output
    }

    /// Magnitude response at `freq` Hz
    pub fn gain_at(&self, freq: f64) -> f64 {
        let omega = 2.0 * PI * freq / self.sample_rate;
        let z_inv = Complex::from_polar(1.0, -omega);
        self.sections
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, s| acc * s.response(z_inv))
            .norm()
    }
}
