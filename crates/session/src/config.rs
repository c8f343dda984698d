//! Session configuration
//!
//! The top-level fields are the user-facing settings. They take precedence
//! over the matching fields of the nested component configs.

use std::path::PathBuf;

use alerting::AlertConfig;
use eye_monitor::{EyeMonitorConfig, EyeThresholds};
use heart_rate::RppgConfig;
use serde::{Deserialize, Serialize};
use stress_inference::StressConfig;
use thiserror::Error;

/// A setting outside its allowed range
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Invalid value for `{field}`: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Relaxation music settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TherapyConfig {
    /// Folder scanned for tracks; `None` disables the controller
    pub music_folder: Option<PathBuf>,
    /// Stress score at or above which a level change starts playback
    pub min_score: u32,
}

impl Default for TherapyConfig {
    fn default() -> Self {
        Self {
            music_folder: Some(PathBuf::from("assets/music")),
            min_score: 40,
        }
    }
}

/// Monitoring session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Scheduled reminder interval (minutes)
    pub interval_minutes: f64,

    /// Blinks per minute below which a low-blink reminder fires
    pub blink_threshold: u32,

    /// Average EAR below which the eyes count as closed
    pub ear_threshold: f64,

    /// Continuous closure that raises a drowsiness alert (seconds)
    pub eye_closure_alert_seconds: f64,

    /// High stress duration before a stress reminder (seconds)
    pub stress_sustained_seconds: f64,

    /// Audible cues; affects beep requests only
    pub sound_on: bool,

    /// Period of the heart-rate estimation pass (seconds)
    pub heart_rate_interval_seconds: f64,

    /// Reminder log location
    pub log_path: PathBuf,

    pub eye: EyeMonitorConfig,
    pub stress: StressConfig,
    pub rppg: RppgConfig,
    pub alert: AlertConfig,
    pub therapy: TherapyConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 20.0,
            blink_threshold: 8,
            ear_threshold: 0.21,
            eye_closure_alert_seconds: 20.0,
            stress_sustained_seconds: 30.0,
            sound_on: true,
            heart_rate_interval_seconds: 5.0,
            log_path: PathBuf::from("reminder_log.csv"),
            eye: EyeMonitorConfig::default(),
            stress: StressConfig::default(),
            rppg: RppgConfig::default(),
            alert: AlertConfig::default(),
            therapy: TherapyConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Check every range constraint, reporting the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("interval_minutes", self.interval_minutes)?;
        if !(self.ear_threshold > 0.0 && self.ear_threshold < 1.0) {
            return Err(ConfigError::new(
                "ear_threshold",
                format!("{} is not in (0, 1)", self.ear_threshold),
            ));
        }
        positive("eye_closure_alert_seconds", self.eye_closure_alert_seconds)?;
        positive("stress_sustained_seconds", self.stress_sustained_seconds)?;
        positive("heart_rate_interval_seconds", self.heart_rate_interval_seconds)?;

        if self.eye.consecutive_frames == 0 {
            return Err(ConfigError::new("eye.consecutive_frames", "must be at least 1"));
        }
        positive("eye.blink_window_secs", self.eye.blink_window_secs)?;
        positive("eye.saturation_secs", self.eye.saturation_secs)?;

        if self.stress.min_features == 0 || self.stress.min_features > self.stress.feature_buffer {
            return Err(ConfigError::new(
                "stress.min_features",
                format!("must be in 1..={}", self.stress.feature_buffer),
            ));
        }
        if self.stress.score_history == 0 {
            return Err(ConfigError::new("stress.score_history", "must be at least 1"));
        }

        let rppg = &self.rppg;
        positive("rppg.fps", rppg.fps)?;
        positive("rppg.min_seconds", rppg.min_seconds)?;
        if rppg.min_seconds > rppg.buffer_seconds {
            return Err(ConfigError::new(
                "rppg.min_seconds",
                "exceeds rppg.buffer_seconds",
            ));
        }
        ordered("rppg.filter_low_hz", rppg.filter_low_hz, rppg.filter_high_hz)?;
        if rppg.filter_high_hz >= rppg.fps / 2.0 {
            return Err(ConfigError::new(
                "rppg.filter_high_hz",
                format!("must be below the Nyquist rate {}", rppg.fps / 2.0),
            ));
        }
        ordered("rppg.search_low_hz", rppg.search_low_hz, rppg.search_high_hz)?;
        if rppg.accept_min_bpm > rppg.accept_max_bpm {
            return Err(ConfigError::new(
                "rppg.accept_min_bpm",
                "exceeds rppg.accept_max_bpm",
            ));
        }

        positive("alert.ack_timeout_secs", self.alert.ack_timeout_secs)?;
        positive("alert.snooze_secs", self.alert.snooze_secs)?;
        Ok(())
    }

    pub fn eye_thresholds(&self) -> EyeThresholds {
        EyeThresholds {
            ear_threshold: self.ear_threshold,
            eye_closure_alert_secs: self.eye_closure_alert_seconds,
        }
    }

    /// Nested alert config with the user-facing settings applied
    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            blink_threshold: self.blink_threshold,
            interval_minutes: self.interval_minutes,
            stress_sustained_secs: self.stress_sustained_seconds,
            ..self.alert.clone()
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::new(field, format!("{} must be > 0", value)))
    }
}

fn ordered(field: &'static str, low: f64, high: f64) -> Result<(), ConfigError> {
    if low > 0.0 && low < high {
        Ok(())
    } else {
        Err(ConfigError::new(
            field,
            format!("band {}..{} is empty or not positive", low, high),
        ))
    }
}
