//! Alert Arbiter
//!
//! Evaluated once per frame. Order within a cycle:
//! 1. expire an overdue prompt as ignored
//! 2. while a prompt is pending, evaluate nothing (drowsiness is deferred)
//! 3. drowsiness, which may bypass snooze
//! 4. snooze gate
//! 5. low blink rate, sustained high stress, scheduled interval
//!
//! The first rule that fires issues the cycle's prompt.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::prompt::{AckOutcome, Prompt, Resolution};
use crate::trigger::{AlertInputs, Trigger, TriggerKind};
use crate::AlertError;

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Blinks per minute below which the low-blink rule applies
    pub blink_threshold: u32,
    /// Scheduled reminder interval (minutes)
    pub interval_minutes: f64,
    /// High stress must persist this long before firing (seconds)
    pub stress_sustained_secs: f64,
    /// Minimum time since the last reminder for a low-blink reminder (seconds)
    pub low_blink_debounce_secs: f64,
    /// Minimum time since the last reminder for a stress reminder (seconds)
    pub high_stress_debounce_secs: f64,
    /// Default snooze length (seconds)
    pub snooze_secs: f64,
    /// Unanswered prompts resolve as ignored after this long (seconds)
    pub ack_timeout_secs: f64,
    /// Drowsiness prompts ignore an active snooze
    pub drowsiness_bypasses_snooze: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            blink_threshold: 8,
            interval_minutes: 20.0,
            stress_sustained_secs: 30.0,
            low_blink_debounce_secs: 30.0,
            high_stress_debounce_secs: 60.0,
            snooze_secs: 120.0,
            ack_timeout_secs: 25.0, // 20s popup auto-close + 5s grace
            drowsiness_bypasses_snooze: true,
        }
    }
}

/// Mutable arbitration state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertContext {
    pub last_reminder_time: f64,
    pub snooze_until: Option<f64>,
}

impl AlertContext {
    pub fn is_snoozed(&self, now: f64) -> bool {
        self.snooze_until.map_or(false, |until| now < until)
    }
}

/// What happened during one arbitration cycle
#[derive(Debug, Clone, Default)]
pub struct ArbiterCycle {
    pub issued: Option<Prompt>,
    pub resolved: Vec<Resolution>,
    pub snoozed: bool,
}

/// Alert arbiter (lives for one monitoring session)
pub struct AlertArbiter {
    config: AlertConfig,
    context: AlertContext,
    pending: Option<Prompt>,
    drowsiness_deferred: bool,
}

impl AlertArbiter {
    /// Create an arbiter whose reminder clock starts at `session_start`
    pub fn new(config: AlertConfig, session_start: f64) -> Self {
        info!(
            "Alert arbiter: interval {} min, blink threshold {}/min",
            config.interval_minutes, config.blink_threshold
        );
        Self {
            config,
            context: AlertContext {
                last_reminder_time: session_start,
                snooze_until: None,
            },
            pending: None,
            drowsiness_deferred: false,
        }
    }

    /// Run one cycle over the current signals
    pub fn evaluate(&mut self, inputs: &AlertInputs, now: f64) -> ArbiterCycle {
        let mut cycle = ArbiterCycle::default();

        if let Some(expired) = self.expire(now) {
            cycle.resolved.push(expired);
        }

        if inputs.drowsiness_raised {
            self.drowsiness_deferred = true;
        }

        if self.pending.is_some() {
            return cycle;
        }

        let snoozed = self.context.is_snoozed(now);
        cycle.snoozed = snoozed;

        if self.drowsiness_deferred {
            self.drowsiness_deferred = false;
            if !snoozed || self.config.drowsiness_bypasses_snooze {
                cycle.issued = Some(self.issue(TriggerKind::Drowsiness, inputs, now));
                return cycle;
            }
            debug!("Drowsiness trigger suppressed by snooze");
        }

        if snoozed {
            return cycle;
        }

        if let Some(kind) = self.fired_rule(inputs, now) {
            self.context.last_reminder_time = now;
            cycle.issued = Some(self.issue(kind, inputs, now));
        }

        cycle
    }

    fn fired_rule(&self, inputs: &AlertInputs, now: f64) -> Option<TriggerKind> {
        let since_last = now - self.context.last_reminder_time;

        if inputs.blinks_per_minute < self.config.blink_threshold as usize
            && since_last >= self.config.low_blink_debounce_secs
        {
            return Some(TriggerKind::LowBlinkRate);
        }

        if let Some(start) = inputs.high_stress_start {
            if now - start >= self.config.stress_sustained_secs
                && since_last >= self.config.high_stress_debounce_secs
            {
                return Some(TriggerKind::HighStress);
            }
        }

        if since_last >= self.config.interval_minutes * 60.0 {
            return Some(TriggerKind::Scheduled);
        }

        None
    }

    fn issue(&mut self, kind: TriggerKind, inputs: &AlertInputs, now: f64) -> Prompt {
        let prompt = Prompt::new(Trigger::new(kind, inputs, now), self.config.ack_timeout_secs);
        info!(
            "Trigger fired: {} (blinks/min {}, stress {}, hr {})",
            kind.name(),
            inputs.blinks_per_minute,
            inputs.stress_score,
            inputs.heart_rate
        );
        self.pending = Some(prompt.clone());
        prompt
    }

    /// Resolve the pending prompt as ignored once its deadline has passed
    pub fn expire(&mut self, now: f64) -> Option<Resolution> {
        if !self.pending.as_ref().is_some_and(|p| p.is_expired(now)) {
            return None;
        }
        let prompt = self.pending.take()?;
        info!("Prompt {} timed out", prompt.id);
        Some(Resolution {
            prompt,
            outcome: AckOutcome::Ignored,
            resolved_at: now,
            timed_out: true,
        })
    }

    /// Apply an answer to the pending prompt
    pub fn resolve(
        &mut self,
        id: Uuid,
        outcome: AckOutcome,
        now: f64,
    ) -> Result<Resolution, AlertError> {
        match self.pending.as_ref() {
            Some(p) if p.id == id => {}
            _ => return Err(AlertError::UnknownPrompt(id)),
        }
        let prompt = self.pending.take().ok_or(AlertError::UnknownPrompt(id))?;

        if let AckOutcome::Snoozed { duration_secs } = outcome {
            self.snooze(duration_secs, now);
        }
        info!("Prompt {} resolved: {}", prompt.id, outcome.as_str());

        Ok(Resolution {
            prompt,
            outcome,
            resolved_at: now,
            timed_out: false,
        })
    }

    /// Suppress all non-bypassing triggers until `now + duration_secs`
    pub fn snooze(&mut self, duration_secs: f64, now: f64) {
        let until = now + duration_secs;
        self.context.snooze_until = Some(until);
        info!("Reminders snoozed for {:.0}s", duration_secs);
    }

    pub fn default_snooze(&self) -> AckOutcome {
        AckOutcome::Snoozed {
            duration_secs: self.config.snooze_secs,
        }
    }

    pub fn pending(&self) -> Option<&Prompt> {
        self.pending.as_ref()
    }

    pub fn context(&self) -> &AlertContext {
        &self.context
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: f64 = 1000.0;

    fn low_blinks() -> AlertInputs {
        AlertInputs {
            blinks_per_minute: 2,
            ..Default::default()
        }
    }

    fn healthy() -> AlertInputs {
        AlertInputs {
            blinks_per_minute: 15,
            ..Default::default()
        }
    }

    fn issued_kind(cycle: &ArbiterCycle) -> Option<TriggerKind> {
        cycle.issued.as_ref().map(|p| p.trigger.kind)
    }

    fn ack(arbiter: &mut AlertArbiter, now: f64) {
        let id = arbiter.pending().unwrap().id;
        arbiter.resolve(id, AckOutcome::Acknowledged, now).unwrap();
    }

    #[test]
    fn test_low_blink_debounce() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        assert!(arbiter.evaluate(&low_blinks(), T0 + 29.0).issued.is_none());

        let first = arbiter.evaluate(&low_blinks(), T0 + 30.0);
        assert_eq!(issued_kind(&first), Some(TriggerKind::LowBlinkRate));
        ack(&mut arbiter, T0 + 31.0);

        // still low 15s later: debounced
        assert!(arbiter.evaluate(&low_blinks(), T0 + 45.0).issued.is_none());
        let second = arbiter.evaluate(&low_blinks(), T0 + 60.0);
        assert_eq!(issued_kind(&second), Some(TriggerKind::LowBlinkRate));
    }

    #[test]
    fn test_one_outstanding_prompt() {
        let config = AlertConfig {
            low_blink_debounce_secs: 0.0,
            ..Default::default()
        };
        let mut arbiter = AlertArbiter::new(config, T0);
        let first = arbiter.evaluate(&low_blinks(), T0 + 1.0).issued.unwrap();

        // the rule holds every cycle but the first prompt is unanswered
        for t in 2..26 {
            let cycle = arbiter.evaluate(&low_blinks(), T0 + t as f64);
            assert!(cycle.issued.is_none());
        }

        // deadline passes: the old prompt is ignored and a new one replaces it
        let cycle = arbiter.evaluate(&low_blinks(), T0 + 26.0);
        assert_eq!(cycle.resolved[0].prompt.id, first.id);
        assert!(cycle.issued.is_some_and(|p| p.id != first.id));
    }

    #[test]
    fn test_timeout_resolves_as_ignored() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        arbiter.evaluate(&low_blinks(), T0 + 30.0);

        assert!(arbiter.evaluate(&healthy(), T0 + 54.9).resolved.is_empty());
        let cycle = arbiter.evaluate(&healthy(), T0 + 55.0);
        assert_eq!(cycle.resolved.len(), 1);
        assert_eq!(cycle.resolved[0].outcome, AckOutcome::Ignored);
        assert!(cycle.resolved[0].timed_out);
        assert!(arbiter.pending().is_none());
    }

    #[test]
    fn test_late_answer_is_rejected() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        let id = arbiter.evaluate(&low_blinks(), T0 + 30.0).issued.unwrap().id;
        arbiter.evaluate(&healthy(), T0 + 60.0);
        assert_eq!(
            arbiter.resolve(id, AckOutcome::Acknowledged, T0 + 61.0),
            Err(AlertError::UnknownPrompt(id))
        );
    }

    #[test]
    fn test_snooze_suppresses_every_rule() {
        let config = AlertConfig {
            interval_minutes: 1.0,
            ..Default::default()
        };
        let mut arbiter = AlertArbiter::new(config, T0);
        let id = arbiter.evaluate(&low_blinks(), T0 + 30.0).issued.unwrap().id;
        let snooze = arbiter.default_snooze();
        arbiter.resolve(id, snooze, T0 + 31.0).unwrap();

        let everything = AlertInputs {
            blinks_per_minute: 0,
            stress_score: 95,
            high_stress_start: Some(T0),
            ..Default::default()
        };
        for t in 32..151 {
            let cycle = arbiter.evaluate(&everything, T0 + t as f64);
            assert!(cycle.issued.is_none(), "fired at +{}", t);
            assert!(cycle.snoozed);
        }
        let after = arbiter.evaluate(&everything, T0 + 151.0);
        assert_eq!(issued_kind(&after), Some(TriggerKind::LowBlinkRate));
    }

    #[test]
    fn test_drowsiness_bypasses_snooze() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        arbiter.snooze(120.0, T0);
        let drowsy = AlertInputs {
            drowsiness_raised: true,
            drowsiness_score: 100,
            ..healthy()
        };
        let cycle = arbiter.evaluate(&drowsy, T0 + 10.0);
        assert_eq!(issued_kind(&cycle), Some(TriggerKind::Drowsiness));
        assert_eq!(cycle.issued.unwrap().beep_repeats, 3);
        // drowsiness does not move the reminder clock
        assert_eq!(arbiter.context().last_reminder_time, T0);
    }

    #[test]
    fn test_drowsiness_respects_snooze_when_configured() {
        let config = AlertConfig {
            drowsiness_bypasses_snooze: false,
            ..Default::default()
        };
        let mut arbiter = AlertArbiter::new(config, T0);
        arbiter.snooze(120.0, T0);
        let drowsy = AlertInputs {
            drowsiness_raised: true,
            ..healthy()
        };
        assert!(arbiter.evaluate(&drowsy, T0 + 10.0).issued.is_none());
        assert!(arbiter.evaluate(&healthy(), T0 + 11.0).issued.is_none());
    }

    #[test]
    fn test_drowsiness_deferred_while_prompt_pending() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        arbiter.evaluate(&low_blinks(), T0 + 30.0);

        let drowsy = AlertInputs {
            drowsiness_raised: true,
            ..healthy()
        };
        assert!(arbiter.evaluate(&drowsy, T0 + 35.0).issued.is_none());
        ack(&mut arbiter, T0 + 36.0);

        let cycle = arbiter.evaluate(&healthy(), T0 + 37.0);
        assert_eq!(issued_kind(&cycle), Some(TriggerKind::Drowsiness));
    }

    #[test]
    fn test_sustained_stress_gate() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        let stressed = |start: f64| AlertInputs {
            stress_score: 85,
            high_stress_start: Some(start),
            ..healthy()
        };

        // run started at +50: not yet 30s old at +79
        assert!(arbiter.evaluate(&stressed(T0 + 50.0), T0 + 79.0).issued.is_none());
        let cycle = arbiter.evaluate(&stressed(T0 + 50.0), T0 + 80.0);
        assert_eq!(issued_kind(&cycle), Some(TriggerKind::HighStress));
        assert_eq!(arbiter.context().last_reminder_time, T0 + 80.0);
    }

    #[test]
    fn test_stress_run_restart_gets_no_credit() {
        let mut arbiter = AlertArbiter::new(AlertConfig::default(), T0);
        // a fresh run started at +100 after a dip; the earlier run does not count
        let restarted = AlertInputs {
            stress_score: 85,
            high_stress_start: Some(T0 + 100.0),
            ..healthy()
        };
        assert!(arbiter.evaluate(&restarted, T0 + 120.0).issued.is_none());
        assert!(arbiter.evaluate(&restarted, T0 + 130.0).issued.is_some());
    }

    #[test]
    fn test_scheduled_interval() {
        let config = AlertConfig {
            interval_minutes: 2.0,
            ..Default::default()
        };
        let mut arbiter = AlertArbiter::new(config, T0);
        assert!(arbiter.evaluate(&healthy(), T0 + 119.0).issued.is_none());
        let cycle = arbiter.evaluate(&healthy(), T0 + 120.0);
        assert_eq!(issued_kind(&cycle), Some(TriggerKind::Scheduled));
        let prompt = cycle.issued.unwrap();
        assert_eq!(prompt.deadline, T0 + 145.0);
        assert_eq!(prompt.trigger.blinks_per_minute, 15);
    }
}
