//! Pending prompts and their resolutions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trigger::Trigger;

fn default_snooze_secs() -> f64 {
    120.0
}

/// How the user (or the timeout) answered a prompt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AckOutcome {
    Acknowledged,
    Ignored,
    Snoozed {
        #[serde(default = "default_snooze_secs")]
        duration_secs: f64,
    },
}

impl AckOutcome {
    /// Log column value; a snooze is not an acknowledgment
    pub fn log_label(&self) -> &'static str {
        match self {
            AckOutcome::Acknowledged => "ack",
            AckOutcome::Ignored | AckOutcome::Snoozed { .. } => "ignored",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AckOutcome::Acknowledged => "acknowledged",
            AckOutcome::Ignored => "ignored",
            AckOutcome::Snoozed { .. } => "snoozed",
        }
    }
}

/// A reminder waiting for an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub trigger: Trigger,
    pub title: String,
    pub recommendation: String,
    pub beep_repeats: u32,
    /// Resolves as ignored once this time passes
    pub deadline: f64,
}

impl Prompt {
    pub fn new(trigger: Trigger, timeout_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: trigger.kind.title().to_string(),
            recommendation: trigger.kind.recommendation().to_string(),
            beep_repeats: trigger.kind.beep_repeats(),
            deadline: trigger.fired_at + timeout_secs,
            trigger,
        }
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.deadline
    }
}

/// A prompt closed by an answer or by its deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub prompt: Prompt,
    pub outcome: AckOutcome,
    pub resolved_at: f64,
    pub timed_out: bool,
}
