//! Published session output

use alerting::{Prompt, Resolution};
use eye_monitor::BeepKind;
use serde::{Deserialize, Serialize};
use stress_inference::StressLevel;

use crate::therapy::MusicRequest;

/// Side effects for the presentation layer, in emission order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new prompt awaiting acknowledgment
    Reminder(Prompt),
    /// Play the beep sound; only emitted when sound is on
    Beep {
        repeats: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        cue: Option<BeepKind>,
    },
    Music(MusicRequest),
    /// A prompt closed by an answer or by timeout
    Resolved(Resolution),
}

/// Read-only view of the session after the latest frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Timestamp of the latest frame
    pub timestamp: f64,
    pub started_at: f64,
    pub frames: u64,
    pub face_detected: bool,
    pub avg_ear: Option<f64>,
    pub blinks_last_minute: usize,
    pub total_blinks: u64,
    pub eyes_closed: bool,
    pub drowsiness_score: u32,
    pub stress_score: u32,
    pub stress_level: StressLevel,
    pub high_stress_since: Option<f64>,
    pub heart_rate: u32,
    pub heart_rate_variability: u32,
    pub calibration_samples: usize,
    pub pending_prompt: Option<Prompt>,
    pub snoozed_until: Option<f64>,
    pub now_playing: Option<String>,
}

impl SessionSnapshot {
    pub fn is_snoozed(&self) -> bool {
        self.snoozed_until.is_some_and(|until| self.timestamp < until)
    }
}
