//! Eye state tracking

use serde::{Deserialize, Serialize};

/// Open/closed phase with the time it began
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum EyePhase {
    /// No face seen yet this session
    #[default]
    Unknown,
    Open { since: f64 },
    Closed { since: f64 },
}

impl EyePhase {
    pub fn closed_since(&self) -> Option<f64> {
        match self {
            EyePhase::Closed { since } => Some(*since),
            _ => None,
        }
    }

    pub fn open_since(&self) -> Option<f64> {
        match self {
            EyePhase::Open { since } => Some(*since),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, EyePhase::Closed { .. })
    }
}

/// Drowsiness state (lives for one monitoring session)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrowsinessState {
    pub phase: EyePhase,

    /// 0-100
    pub score: u32,

    /// Time of the last beep, 0 before the first one
    pub last_beep_time: f64,

    /// Drowsiness alert already raised for the current closure
    pub drowsy: bool,
}

impl DrowsinessState {
    /// Reset state (on session start)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
