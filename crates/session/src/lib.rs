//! Monitoring Session
//!
//! Owns every piece of session-lifetime state (eye, stress, heart-rate and
//! alert context) and drives it one captured frame at a time:
//! - `MonitoringSession`: the synchronous per-frame pipeline
//! - `spawn_session`: runs the pipeline off the async runtime, publishing
//!   snapshots and events and accepting commands over channels
//! - `MusicTherapy`: relaxation playlist selection on stress level changes

pub mod config;
pub mod events;
pub mod pipeline;
pub mod runner;
mod telemetry;
pub mod therapy;

pub use config::{ConfigError, MonitorConfig, TherapyConfig};
pub use events::{SessionEvent, SessionSnapshot};
pub use pipeline::MonitoringSession;
pub use runner::{spawn_session, SessionCommand, SessionHandle, SessionSummary, StopReason};
pub use therapy::{MusicRequest, MusicTherapy, Playlist};

use alerting::AlertError;
use camera_capture::CaptureError;
use heart_rate::RppgError;
use storage::StorageError;
use stress_inference::StressError;
use thiserror::Error;

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Stress scorer error: {0}")]
    Stress(#[from] StressError),

    #[error("Heart-rate estimator error: {0}")]
    HeartRate(#[from] RppgError),

    #[error("Reminder log error: {0}")]
    Storage(#[from] StorageError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("No face has been seen yet, nothing to calibrate with")]
    NoFeatures,

    #[error("Session is no longer running")]
    Closed,

    #[error("Session task failed: {0}")]
    Join(String),
}
