//! Eye monitor configuration

use serde::{Deserialize, Serialize};

/// Thresholds shared with the user-facing settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeThresholds {
    /// Average EAR below this counts as closed
    pub ear_threshold: f64,
    /// Closure (or staring) duration that triggers a beep (seconds)
    pub eye_closure_alert_secs: f64,
}

impl Default for EyeThresholds {
    fn default() -> Self {
        Self {
            ear_threshold: 0.21,
            eye_closure_alert_secs: 20.0,
        }
    }
}

/// Blink and drowsiness tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeMonitorConfig {
    /// Closed frames required before a reopening counts as a blink
    pub consecutive_frames: u32,

    /// Trailing window for blinks per minute (seconds)
    pub blink_window_secs: f64,

    /// Closure duration that saturates the drowsiness score (seconds)
    pub saturation_secs: f64,

    /// Score lost per open frame
    pub decay_per_frame: u32,

    /// Minimum spacing between closure beeps (seconds)
    pub closed_beep_interval_secs: f64,

    /// Minimum spacing between staring beeps (seconds)
    pub staring_beep_interval_secs: f64,
}

impl Default for EyeMonitorConfig {
    fn default() -> Self {
        Self {
            consecutive_frames: 3,
            blink_window_secs: 60.0,
            saturation_secs: 4.0,
            decay_per_frame: 5,
            closed_beep_interval_secs: 3.0,
            staring_beep_interval_secs: 10.0,
        }
    }
}
