//! Session Runner
//!
//! Runs the frame loop on a blocking thread so capture never waits on the
//! presentation layer. Snapshots go out on a watch channel, events on an
//! unbounded channel. Commands are drained at the top of every cycle, so a
//! stop takes effect before the next frame is read.

use alerting::AckOutcome;
use camera_capture::LandmarkSource;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::events::{SessionEvent, SessionSnapshot};
use crate::pipeline::MonitoringSession;
use crate::SessionError;

/// Pending commands allowed before senders wait
const COMMAND_QUEUE: usize = 32;

/// Frame-rate disagreement tolerated between source and rPPG config (fps)
const FPS_TOLERANCE: f64 = 0.5;

/// Requests from the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    Acknowledge { id: Uuid, outcome: AckOutcome },
    Snooze { duration_secs: f64 },
    Calibrate { stressed: bool },
    Stop,
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Requested,
    EndOfStream,
}

/// Totals reported when a session ends cleanly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub reason: StopReason,
    pub frames: u64,
    pub duration_secs: f64,
}

/// Channels to a running session
pub struct SessionHandle {
    pub snapshots: watch::Receiver<SessionSnapshot>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    commands: mpsc::Sender<SessionCommand>,
    task: JoinHandle<Result<SessionSummary, SessionError>>,
}

impl SessionHandle {
    /// Move the event stream out, e.g. into a presentation task
    pub fn take_events(&mut self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (_, closed) = mpsc::unbounded_channel();
        std::mem::replace(&mut self.events, closed)
    }

    /// Sender for handing to other tasks
    pub fn commands(&self) -> mpsc::Sender<SessionCommand> {
        self.commands.clone()
    }

    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }

    pub async fn acknowledge(&self, id: Uuid, outcome: AckOutcome) -> Result<(), SessionError> {
        self.send(SessionCommand::Acknowledge { id, outcome }).await
    }

    pub async fn stop(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Stop).await
    }

    /// Wait for the loop to finish
    pub async fn join(self) -> Result<SessionSummary, SessionError> {
        self.task
            .await
            .map_err(|e| SessionError::Join(e.to_string()))?
    }
}

/// Start a session over `source` on the blocking pool
pub fn spawn_session<S>(session: MonitoringSession, source: S) -> SessionHandle
where
    S: LandmarkSource + 'static,
{
    let expected = session.config().rppg.fps;
    if let Some(fps) = rate_mismatch(expected, source.nominal_fps()) {
        warn!(
            "Source delivers {:.1} fps but heart-rate analysis assumes {:.1} fps; \
             BPM estimates will be off by a factor of {:.2}",
            fps,
            expected,
            fps / expected
        );
    }

    let (snapshot_tx, snapshots) = watch::channel(session.snapshot());
    let (event_tx, events) = mpsc::unbounded_channel();
    let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE);

    let task = tokio::task::spawn_blocking(move || {
        let mut runner = Runner {
            session,
            snapshot_tx,
            event_tx,
            command_rx,
        };
        runner.run(source)
    });

    SessionHandle {
        snapshots,
        events,
        commands,
        task,
    }
}

/// Source rate when it differs from `expected` by more than the tolerance
fn rate_mismatch(expected: f64, nominal: Option<f64>) -> Option<f64> {
    nominal.filter(|fps| (fps - expected).abs() > FPS_TOLERANCE)
}

struct Runner {
    session: MonitoringSession,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
    command_rx: mpsc::Receiver<SessionCommand>,
}

impl Runner {
    fn run<S: LandmarkSource>(&mut self, mut source: S) -> Result<SessionSummary, SessionError> {
        info!("Session loop running");
        let reason = loop {
            if self.drain_commands() {
                break StopReason::Requested;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break StopReason::EndOfStream,
                Err(e) => {
                    error!("Capture failed, stopping session: {}", e);
                    return Err(e.into());
                }
            };

            let events = self.session.process_frame(&frame);
            self.publish(events);
        };

        let summary = SessionSummary {
            reason,
            frames: self.session.frames(),
            duration_secs: self.session.now() - self.session.started_at(),
        };
        info!(
            "Session stopped ({:?}) after {} frames, {:.1}s",
            summary.reason, summary.frames, summary.duration_secs
        );
        Ok(summary)
    }

    /// Apply queued commands; true when a stop was requested
    fn drain_commands(&mut self) -> bool {
        let mut stop = false;
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                SessionCommand::Acknowledge { id, outcome } => {
                    match self.session.acknowledge(id, outcome) {
                        Ok(event) => self.publish(vec![event]),
                        Err(e) => warn!("Ignoring acknowledgment: {}", e),
                    }
                }
                SessionCommand::Snooze { duration_secs } => {
                    self.session.snooze(duration_secs);
                    self.publish(Vec::new());
                }
                SessionCommand::Calibrate { stressed } => match self.session.calibrate(stressed) {
                    Ok(status) => info!(
                        "Calibration sample {}/{} recorded",
                        status.samples, status.required
                    ),
                    // the sample stays in the calibration set; the previous fit is kept
                    Err(SessionError::Stress(e)) => {
                        warn!("Calibration sample recorded, refit failed: {}", e)
                    }
                    Err(e) => warn!("Calibration sample rejected: {}", e),
                },
                SessionCommand::Stop => stop = true,
            }
        }
        stop
    }

    /// Snapshot first, so a consumer reacting to an event sees its effect
    fn publish(&self, events: Vec<SessionEvent>) {
        self.snapshot_tx.send_replace(self.session.snapshot());
        for event in events {
            // receiver may be gone; the loop keeps running regardless
            let _ = self.event_tx.send(event);
        }
    }
}
