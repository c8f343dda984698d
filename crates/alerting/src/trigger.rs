//! Trigger kinds and the signals they carry

use serde::{Deserialize, Serialize};

/// Why a reminder fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    LowBlinkRate,
    HighStress,
    Scheduled,
    Drowsiness,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 4] = [
        TriggerKind::LowBlinkRate,
        TriggerKind::HighStress,
        TriggerKind::Scheduled,
        TriggerKind::Drowsiness,
    ];

    /// Name written to the reminder log
    pub fn name(&self) -> &'static str {
        match self {
            TriggerKind::LowBlinkRate => "Low Blink Rate",
            TriggerKind::HighStress => "High Stress Level",
            TriggerKind::Scheduled => "Scheduled Reminder",
            TriggerKind::Drowsiness => "Drowsiness Detected",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Prompt headline
    pub fn title(&self) -> &'static str {
        match self {
            TriggerKind::Drowsiness => "DROWSINESS DETECTED!",
            TriggerKind::HighStress => "HIGH STRESS DETECTED!",
            TriggerKind::LowBlinkRate | TriggerKind::Scheduled => "Health Reminder",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            TriggerKind::Drowsiness => "Take a break! Stand up, stretch, splash water on face.",
            TriggerKind::HighStress => "Deep breathing exercise: Inhale 4s, Hold 4s, Exhale 4s.",
            TriggerKind::LowBlinkRate | TriggerKind::Scheduled => {
                "Remember: Blink regularly and stay hydrated!"
            }
        }
    }

    /// How many times the prompt beep plays when sound is on
    pub fn beep_repeats(&self) -> u32 {
        match self {
            TriggerKind::Drowsiness => 3,
            _ => 1,
        }
    }

    /// Metric label
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::LowBlinkRate => "low_blink_rate",
            TriggerKind::HighStress => "high_stress",
            TriggerKind::Scheduled => "scheduled",
            TriggerKind::Drowsiness => "drowsiness",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Signals sampled for one arbitration cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertInputs {
    pub blinks_per_minute: usize,
    pub stress_score: u32,
    /// Start of the current high-stress run
    pub high_stress_start: Option<f64>,
    pub heart_rate: u32,
    pub drowsiness_score: u32,
    /// Drowsiness tracker raised its alert this frame
    pub drowsiness_raised: bool,
}

/// A fired trigger with the signals current at firing time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub fired_at: f64,
    pub blinks_per_minute: usize,
    pub stress_score: u32,
    pub heart_rate: u32,
    pub drowsiness_score: u32,
}

impl Trigger {
    pub fn new(kind: TriggerKind, inputs: &AlertInputs, now: f64) -> Self {
        Self {
            kind,
            fired_at: now,
            blinks_per_minute: inputs.blinks_per_minute,
            stress_score: inputs.stress_score,
            heart_rate: inputs.heart_rate,
            drowsiness_score: inputs.drowsiness_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_log_text() {
        for kind in TriggerKind::ALL {
            assert_eq!(TriggerKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TriggerKind::from_name("Timer"), None);
    }

    #[test]
    fn test_drowsiness_content() {
        let kind = TriggerKind::Drowsiness;
        assert_eq!(kind.beep_repeats(), 3);
        assert!(kind.recommendation().starts_with("Take a break!"));
        assert_eq!(TriggerKind::Scheduled.beep_repeats(), 1);
    }
}
