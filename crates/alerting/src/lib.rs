//! Alerting System
//!
//! Turns derived signals and elapsed time into reminder prompts, applying
//! per-rule debounce, sustain-time gating, snooze suppression and a single
//! outstanding prompt at a time. Acknowledgments arrive asynchronously.

mod arbiter;
mod prompt;
mod trigger;

pub use arbiter::{AlertArbiter, AlertConfig, AlertContext, ArbiterCycle};
pub use prompt::{AckOutcome, Prompt, Resolution};
pub use trigger::{AlertInputs, Trigger, TriggerKind};

use thiserror::Error;
use uuid::Uuid;

/// Alerting error types
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlertError {
    #[error("No pending prompt with id {0}")]
    UnknownPrompt(Uuid),
}
