//! Per-frame eye analysis results

use serde::{Deserialize, Serialize};

use crate::state::EyePhase;

/// Audible cue requested by the drowsiness tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeepKind {
    /// Eyes closed past the alert duration
    Closure,
    /// Eyes open without closing past the alert duration
    Staring,
}

/// Side effects produced while processing a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EyeEvent {
    Blink { timestamp: f64 },
    Beep(BeepKind),
    /// Raised once per closure that crosses the alert duration
    DrowsinessAlert { closed_for_secs: f64 },
}

/// Result of processing one frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EyeAnalysis {
    /// Whether a face was present
    pub face_detected: bool,

    /// Average EAR, absent on no-face frames
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_ear: Option<f64>,

    pub blinks_last_minute: usize,
    pub total_blinks: u64,
    pub drowsiness_score: u32,
    pub phase: EyePhase,
    pub events: Vec<EyeEvent>,
}

impl EyeAnalysis {
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn drowsiness_alert(&self) -> Option<f64> {
        self.events.iter().find_map(|e| match e {
            EyeEvent::DrowsinessAlert { closed_for_secs } => Some(*closed_for_secs),
            _ => None,
        })
    }

    pub fn beeps(&self) -> impl Iterator<Item = BeepKind> + '_ {
        self.events.iter().filter_map(|e| match e {
            EyeEvent::Beep(kind) => Some(*kind),
            _ => None,
        })
    }
}
