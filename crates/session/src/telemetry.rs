//! Session telemetry
//!
//! Recorded through the `metrics` facade; no-ops until the binary installs
//! a recorder.

use alerting::{AckOutcome, TriggerKind};
use metrics::{counter, gauge};

use crate::events::SessionSnapshot;

pub(crate) fn record_frame(face_detected: bool) {
    counter!("wellness_frames_total").increment(1);
    if !face_detected {
        counter!("wellness_no_face_frames_total").increment(1);
    }
}

pub(crate) fn record_trigger(kind: TriggerKind) {
    counter!("wellness_triggers_total", "kind" => kind.as_str()).increment(1);
}

pub(crate) fn record_resolution(outcome: &AckOutcome, timed_out: bool) {
    let outcome = if timed_out { "timed_out" } else { outcome.as_str() };
    counter!("wellness_prompts_resolved_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_signals(snapshot: &SessionSnapshot) {
    gauge!("wellness_blinks_per_minute").set(snapshot.blinks_last_minute as f64);
    gauge!("wellness_stress_score").set(f64::from(snapshot.stress_score));
    gauge!("wellness_heart_rate_bpm").set(f64::from(snapshot.heart_rate));
    gauge!("wellness_drowsiness_score").set(f64::from(snapshot.drowsiness_score));
}
