//! Per-frame monitoring pipeline
//!
//! One `MonitoringSession` holds all state for a single session. Each call
//! to `process_frame` runs extract -> score -> arbitrate for one frame and
//! returns the side effects it produced. Faults inside a frame (bad ROI,
//! log write failure) are logged and skipped; they never end the session.

use std::sync::Arc;

use alerting::{AckOutcome, AlertArbiter, AlertInputs, Prompt, Resolution};
use camera_capture::CapturedFrame;
use eye_monitor::{EyeAnalysis, EyeMonitor};
use feature_engine::{EarEstimator, StressFeatureExtractor, StressFeatures};
use heart_rate::HeartRateMonitor;
use storage::{format_timestamp, LogRecord, ReminderLog};
use stress_inference::{CalibrationStatus, StressScorer};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::events::{SessionEvent, SessionSnapshot};
use crate::telemetry;
use crate::therapy::{MusicTherapy, Playlist};
use crate::SessionError;

/// Session context object
pub struct MonitoringSession {
    config: MonitorConfig,
    ear: EarEstimator,
    extractor: StressFeatureExtractor,
    eyes: EyeMonitor,
    stress: StressScorer,
    heart: HeartRateMonitor,
    arbiter: AlertArbiter,
    therapy: Option<MusicTherapy>,
    log: Option<Arc<ReminderLog>>,

    /// Clock of the latest frame; anchored on the first frame
    now: f64,
    started_at: f64,
    last_hr_tick: f64,
    /// Set by `restart`; the first frame restarts an unstarted session
    started: bool,
    frames: u64,
    last_features: Option<StressFeatures>,
    last_analysis: EyeAnalysis,
}

impl MonitoringSession {
    /// Build a session from validated configuration
    pub fn new(config: MonitorConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let eyes = EyeMonitor::new(config.eye_thresholds(), config.eye.clone());
        let stress = StressScorer::new(config.stress.clone())?;
        let heart = HeartRateMonitor::new(config.rppg.clone())?;
        let arbiter = AlertArbiter::new(config.alert_config(), 0.0);

        Ok(Self {
            ear: EarEstimator::default(),
            extractor: StressFeatureExtractor::new(),
            eyes,
            stress,
            heart,
            arbiter,
            therapy: None,
            log: None,
            now: 0.0,
            started_at: 0.0,
            last_hr_tick: 0.0,
            started: false,
            frames: 0,
            last_features: None,
            last_analysis: EyeAnalysis::default(),
            config,
        })
    }

    /// Append every resolved prompt to this log
    pub fn with_log(mut self, log: Arc<ReminderLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn with_therapy(mut self, therapy: MusicTherapy) -> Self {
        self.therapy = Some(therapy);
        self
    }

    /// Attach a music controller for the configured folder, if any
    pub fn with_configured_therapy(self) -> Self {
        let Some(folder) = self.config.therapy.music_folder.clone() else {
            return self;
        };
        match Playlist::scan(&folder) {
            Ok(playlist) => {
                let min_score = self.config.therapy.min_score;
                self.with_therapy(MusicTherapy::new(playlist, min_score))
            }
            Err(e) => {
                warn!("Music disabled, cannot read {}: {}", folder.display(), e);
                self
            }
        }
    }

    /// Reinitialize all signal state and restart the clocks at `now`.
    ///
    /// Calibration samples and the stress classifier's fit survive.
    pub fn restart(&mut self, now: f64) -> Vec<SessionEvent> {
        self.eyes.reset();
        self.stress.reset();
        self.heart.reset();
        self.arbiter = AlertArbiter::new(self.config.alert_config(), now);
        self.now = now;
        self.started_at = now;
        self.last_hr_tick = now;
        self.started = true;
        self.frames = 0;
        self.last_features = None;
        self.last_analysis = EyeAnalysis::default();

        let mut events = Vec::new();
        if let Some(request) = self.therapy.as_mut().and_then(MusicTherapy::reset) {
            events.push(SessionEvent::Music(request));
        }
        info!("Monitoring session started at {:.3}", now);
        events
    }

    /// Run one capture cycle
    pub fn process_frame(&mut self, frame: &CapturedFrame) -> Vec<SessionEvent> {
        let now = frame.timestamp();
        let mut events = if !self.started {
            self.restart(now)
        } else {
            Vec::new()
        };
        self.now = now;
        self.frames += 1;

        let reading = match self.ear.measure(&frame.landmarks) {
            Ok(reading) => reading,
            Err(e) => {
                warn!("EAR unavailable at {:.3}: {}", now, e);
                None
            }
        };
        let analysis = self.eyes.analyze_reading(reading, now);
        if self.config.sound_on {
            for cue in analysis.beeps() {
                events.push(SessionEvent::Beep {
                    repeats: 1,
                    cue: Some(cue),
                });
            }
        }

        if reading.is_some() {
            self.score_stress(frame, now);
        }
        if let Err(e) = self.heart.add_frame(frame) {
            warn!("Skipping heart-rate sample at {:.3}: {}", now, e);
        }
        if now - self.last_hr_tick >= self.config.heart_rate_interval_seconds {
            self.last_hr_tick = now;
            let bpm = self.heart.estimate();
            debug!("Heart rate {} BPM (variability {})", bpm, self.heart.variability());
        }

        if let Some(therapy) = self.therapy.as_mut() {
            if let Some(request) = therapy.update(self.stress.current(), self.stress.level()) {
                events.push(SessionEvent::Music(request));
            }
        }

        let inputs = AlertInputs {
            blinks_per_minute: analysis.blinks_last_minute,
            stress_score: self.stress.current(),
            high_stress_start: self.stress.high_stress_start(),
            heart_rate: self.heart.current(),
            drowsiness_score: analysis.drowsiness_score,
            drowsiness_raised: analysis.drowsiness_alert().is_some(),
        };
        let cycle = self.arbiter.evaluate(&inputs, now);
        for resolution in cycle.resolved {
            events.push(self.record(resolution));
        }
        if let Some(prompt) = cycle.issued {
            events.extend(self.announce(prompt));
        }

        telemetry::record_frame(analysis.face_detected);
        self.last_analysis = analysis;
        telemetry::record_signals(&self.snapshot());
        events
    }

    fn score_stress(&mut self, frame: &CapturedFrame, now: f64) {
        let Some(face) = frame.landmarks.face.as_ref() else {
            return;
        };
        match self
            .extractor
            .extract(face, frame.landmarks.width, frame.landmarks.height)
        {
            Ok(features) => {
                self.stress.score(&features, now);
                self.last_features = Some(features);
            }
            Err(e) => warn!("Stress features unavailable at {:.3}: {}", now, e),
        }
    }

    fn announce(&self, prompt: Prompt) -> Vec<SessionEvent> {
        telemetry::record_trigger(prompt.trigger.kind);
        let beep = self.config.sound_on.then_some(SessionEvent::Beep {
            repeats: prompt.beep_repeats,
            cue: None,
        });
        std::iter::once(SessionEvent::Reminder(prompt))
            .chain(beep)
            .collect()
    }

    /// Log a resolution and wrap it as an event
    fn record(&self, resolution: Resolution) -> SessionEvent {
        telemetry::record_resolution(&resolution.outcome, resolution.timed_out);
        if let Some(log) = self.log.as_ref() {
            if let Err(e) = log_resolution(log, &resolution) {
                warn!("Failed to log prompt {}: {}", resolution.prompt.id, e);
            }
        }
        SessionEvent::Resolved(resolution)
    }

    /// Answer the pending prompt at the session's current time
    pub fn acknowledge(&mut self, id: Uuid, outcome: AckOutcome) -> Result<SessionEvent, SessionError> {
        let resolution = self.arbiter.resolve(id, outcome, self.now)?;
        Ok(self.record(resolution))
    }

    /// Snooze reminders outside of any prompt
    pub fn snooze(&mut self, duration_secs: f64) {
        self.arbiter.snooze(duration_secs, self.now);
    }

    /// Label the most recent face's features for classifier calibration
    pub fn calibrate(&mut self, stressed: bool) -> Result<CalibrationStatus, SessionError> {
        let features = self.last_features.ok_or(SessionError::NoFeatures)?;
        Ok(self.stress.add_calibration_sample(&features, stressed)?)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let analysis = &self.last_analysis;
        SessionSnapshot {
            timestamp: self.now,
            started_at: self.started_at,
            frames: self.frames,
            face_detected: analysis.face_detected,
            avg_ear: analysis.avg_ear,
            blinks_last_minute: analysis.blinks_last_minute,
            total_blinks: analysis.total_blinks,
            eyes_closed: analysis.phase.is_closed(),
            drowsiness_score: analysis.drowsiness_score,
            stress_score: self.stress.current(),
            stress_level: self.stress.level(),
            high_stress_since: self.stress.high_stress_start(),
            heart_rate: self.heart.current(),
            heart_rate_variability: self.heart.variability(),
            calibration_samples: self.stress.calibration_len(),
            pending_prompt: self.arbiter.pending().cloned(),
            snoozed_until: self.arbiter.context().snooze_until,
            now_playing: self
                .therapy
                .as_ref()
                .and_then(MusicTherapy::now_playing)
                .map(|p| p.display().to_string()),
        }
    }

    pub fn pending(&self) -> Option<&Prompt> {
        self.arbiter.pending()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }
}

fn log_resolution(log: &ReminderLog, resolution: &Resolution) -> Result<(), SessionError> {
    let trigger = &resolution.prompt.trigger;
    let record = LogRecord {
        timestamp: format_timestamp(resolution.resolved_at)?,
        trigger_name: trigger.kind.name().to_string(),
        outcome: resolution.outcome.log_label().to_string(),
        blinks_last_min: trigger.blinks_per_minute as u32,
        stress_level: trigger.stress_score,
        heart_rate: trigger.heart_rate,
        drowsiness_score: trigger.drowsiness_score,
    };
    log.append(&record)?;
    Ok(())
}
