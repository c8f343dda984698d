//! Drowsiness tracking
//!
//! Two-phase timer keyed on average EAR against the threshold. The score
//! grows with closure duration and decays per open frame.

use tracing::{info, warn};

use crate::analysis::{BeepKind, EyeEvent};
use crate::config::{EyeMonitorConfig, EyeThresholds};
use crate::state::{DrowsinessState, EyePhase};

/// Drowsiness tracker
#[derive(Debug, Clone)]
pub struct DrowsinessTracker {
    thresholds: EyeThresholds,
    config: EyeMonitorConfig,
    state: DrowsinessState,
}

impl DrowsinessTracker {
    pub fn new(thresholds: EyeThresholds, config: EyeMonitorConfig) -> Self {
        Self {
            thresholds,
            config,
            state: DrowsinessState::default(),
        }
    }

    /// Feed one frame's average EAR, appending any beeps or alerts to `events`
    pub fn update(&mut self, avg_ear: f64, now: f64, events: &mut Vec<EyeEvent>) {
        if avg_ear < self.thresholds.ear_threshold {
            self.on_closed(now, events);
        } else {
            self.on_open(now, events);
        }
    }

    fn on_closed(&mut self, now: f64, events: &mut Vec<EyeEvent>) {
        let since = match self.state.phase {
            EyePhase::Closed { since } => since,
            _ => {
                self.state.phase = EyePhase::Closed { since: now };
                now
            }
        };

        let closed_for = now - since;
        let ratio = closed_for / self.config.saturation_secs;
        self.state.score = (ratio * 100.0).round().clamp(0.0, 100.0) as u32;

        if closed_for >= self.thresholds.eye_closure_alert_secs
            && now - self.state.last_beep_time >= self.config.closed_beep_interval_secs
        {
            self.state.last_beep_time = now;
            events.push(EyeEvent::Beep(BeepKind::Closure));

            if !self.state.drowsy {
                self.state.drowsy = true;
                warn!("Eyes closed for {:.1}s, drowsiness detected", closed_for);
                events.push(EyeEvent::DrowsinessAlert {
                    closed_for_secs: closed_for,
                });
            }
        }
    }

    fn on_open(&mut self, now: f64, events: &mut Vec<EyeEvent>) {
        let since = match self.state.phase {
            EyePhase::Open { since } => since,
            _ => {
                self.state.phase = EyePhase::Open { since: now };
                self.state.drowsy = false;
                now
            }
        };

        self.state.score = self.state.score.saturating_sub(self.config.decay_per_frame);

        let open_for = now - since;
        if open_for >= self.thresholds.eye_closure_alert_secs
            && now - self.state.last_beep_time >= self.config.staring_beep_interval_secs
        {
            self.state.last_beep_time = now;
            info!("Eyes open for {:.0}s without closing", open_for);
            events.push(EyeEvent::Beep(BeepKind::Staring));
        }
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn phase(&self) -> EyePhase {
        self.state.phase
    }

    pub fn state(&self) -> &DrowsinessState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OPEN: f64 = 0.30;
    const SHUT: f64 = 0.10;
    const DT: f64 = 1.0 / 30.0;

    fn tracker() -> DrowsinessTracker {
        DrowsinessTracker::new(EyeThresholds::default(), EyeMonitorConfig::default())
    }

    /// Feed `ear` every frame from `start` to `end` inclusive
    fn run(t: &mut DrowsinessTracker, ear: f64, start: f64, end: f64) -> Vec<EyeEvent> {
        let mut events = Vec::new();
        let frames = ((end - start) / DT).round() as usize;
        for i in 0..=frames {
            t.update(ear, start + i as f64 * DT, &mut events);
        }
        events
    }

    #[test]
    fn test_score_is_proportional_to_closure() {
        let mut t = tracker();
        let mut events = Vec::new();
        t.update(SHUT, 100.0, &mut events);
        assert_eq!(t.score(), 0);
        t.update(SHUT, 102.0, &mut events);
        assert!((49..=51).contains(&t.score()));
        t.update(SHUT, 104.0, &mut events);
        assert_eq!(t.score(), 100);
        t.update(SHUT, 110.0, &mut events);
        assert_eq!(t.score(), 100);
        assert!(events.is_empty());
    }

    #[test]
    fn test_decay_by_five_per_open_frame() {
        let mut t = tracker();
        let mut events = Vec::new();
        t.update(SHUT, 0.0, &mut events);
        t.update(SHUT, 0.5, &mut events);
        assert_eq!(t.score(), 13);

        let mut expected = [8, 3, 0, 0].into_iter();
        for i in 1..=4 {
            t.update(OPEN, 0.5 + i as f64 * DT, &mut events);
            assert_eq!(t.score(), expected.next().unwrap());
        }
    }

    #[test]
    fn test_long_closure_beeps_and_alerts_once() {
        let mut t = tracker();
        let events = run(&mut t, SHUT, 1000.0, 1027.0);

        let alerts = events
            .iter()
            .filter(|e| matches!(e, EyeEvent::DrowsinessAlert { .. }))
            .count();
        let beeps = events
            .iter()
            .filter(|e| matches!(e, EyeEvent::Beep(BeepKind::Closure)))
            .count();
        assert_eq!(alerts, 1);
        // beeps at ~20s, 23s and 26s of closure
        assert_eq!(beeps, 3);
        assert!(matches!(
            events[1],
            EyeEvent::DrowsinessAlert { closed_for_secs } if (closed_for_secs - 20.0).abs() < 0.05
        ));
    }

    #[test]
    fn test_reopening_rearms_drowsiness_alert() {
        let mut t = tracker();
        run(&mut t, SHUT, 1000.0, 1021.0);
        assert!(t.state().drowsy);

        run(&mut t, OPEN, 1021.1, 1022.0);
        assert!(!t.state().drowsy);
        assert!(t.phase().open_since().is_some());

        let events = run(&mut t, SHUT, 1022.1, 1043.0);
        assert!(events
            .iter()
            .any(|e| matches!(e, EyeEvent::DrowsinessAlert { .. })));
    }

    #[test]
    fn test_staring_beeps_without_alert() {
        let mut t = tracker();
        let events = run(&mut t, OPEN, 1000.0, 1031.0);

        assert!(events.iter().all(|e| *e == EyeEvent::Beep(BeepKind::Staring)));
        // at 20s and 30s of staring
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_phases_are_exclusive() {
        let mut t = tracker();
        assert_eq!(t.phase(), EyePhase::Unknown);
        let mut events = Vec::new();
        t.update(SHUT, 1.0, &mut events);
        assert_eq!(t.phase().closed_since(), Some(1.0));
        assert_eq!(t.phase().open_since(), None);
        t.update(OPEN, 2.0, &mut events);
        assert_eq!(t.phase().closed_since(), None);
        assert_eq!(t.phase().open_since(), Some(2.0));
    }

    proptest! {
        #[test]
        fn score_bounded_and_one_alert_per_closure(
            runs in prop::collection::vec((any::<bool>(), 1usize..500), 1..8),
        ) {
            // 0.05 s frames, so a 500-frame run reaches the 20 s alert
            let closed: Vec<bool> = runs
                .iter()
                .flat_map(|&(shut, len)| std::iter::repeat(shut).take(len))
                .collect();
            let mut t = tracker();
            let mut alerts_this_closure = 0;
            let mut previous = 0;
            let mut was_shut = false;
            for (i, &shut) in closed.iter().enumerate() {
                let mut events = Vec::new();
                t.update(if shut { SHUT } else { OPEN }, i as f64 * 0.05, &mut events);
                let score = t.score();
                prop_assert!(score <= 100);
                if shut {
                    if was_shut {
                        prop_assert!(score >= previous);
                    }
                    alerts_this_closure += events
                        .iter()
                        .filter(|e| matches!(e, EyeEvent::DrowsinessAlert { .. }))
                        .count();
                    prop_assert!(alerts_this_closure <= 1);
                } else {
                    prop_assert_eq!(score, previous.saturating_sub(5));
                    alerts_this_closure = 0;
                }
                previous = score;
                was_shut = shut;
            }
        }
    }
}
