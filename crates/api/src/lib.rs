//! Wellness Monitor API Server
//!
//! HTTP surface over a running monitoring session. Reads come from the
//! session's published snapshots and the reminder log; every mutation goes
//! through the session command channel.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use storage::ReminderLog;
use tokio::sync::{mpsc, watch, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use error::ApiError;
pub use settings::{load_config, AppConfig, ServerConfig};

use camera_capture::ReplaySource;
use session::{
    spawn_session, MonitoringSession, SessionCommand, SessionEvent, SessionSnapshot,
};

/// Application state shared across handlers
pub struct AppState {
    /// Latest session snapshot
    pub snapshots: watch::Receiver<SessionSnapshot>,
    /// Command channel into the session loop
    pub commands: mpsc::Sender<SessionCommand>,
    /// Reminder history
    pub log: Arc<ReminderLog>,
    /// Prometheus rendering, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Snooze length used when a request gives none (seconds)
    pub snooze_secs: f64,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        snapshots: watch::Receiver<SessionSnapshot>,
        commands: mpsc::Sender<SessionCommand>,
        log: Arc<ReminderLog>,
    ) -> Self {
        Self {
            snapshots,
            commands,
            log,
            metrics: None,
            snooze_secs: 120.0,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn with_snooze_secs(mut self, snooze_secs: f64) -> Self {
        self.snooze_secs = snooze_secs;
        self
    }

    /// Queue a command for the session loop
    pub async fn send(&self, command: SessionCommand) -> Result<(), ApiError> {
        debug!("Queueing session command {:?}", command);
        self.commands
            .send(command)
            .await
            .map_err(|_| ApiError::SessionClosed)
    }
}

/// Body returned for queued commands
#[derive(Debug, Serialize)]
pub struct CommandAccepted {
    pub accepted: bool,
    pub command: String,
}

impl CommandAccepted {
    pub fn new(command: &str) -> Self {
        Self {
            accepted: true,
            command: command.to_string(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub session: SessionHealth,
}

/// Monitoring session health
#[derive(Debug, Serialize)]
pub struct SessionHealth {
    pub running: bool,
    pub frames: u64,
    pub face_detected: bool,
    /// Timestamp of the latest processed frame
    pub last_frame_at: f64,
}

/// Create the application router
pub fn create_router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/api/v1/reminders", get(routes::reminders::get_reminders))
        .route("/api/v1/reminders/summary", get(routes::reminders::get_summary))
        .route("/api/v1/prompts", get(routes::prompts::get_prompts))
        .route("/api/v1/prompts/:id", post(routes::prompts::answer_prompt))
        .route("/api/v1/snooze", post(routes::control::snooze))
        .route("/api/v1/calibration", post(routes::control::calibrate))
        .route("/api/v1/session/stop", post(routes::control::stop))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<RwLock<AppState>>>) -> Json<HealthResponse> {
    let state = state.read().await;
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let running = !state.commands.is_closed();
    let session = {
        let snapshot = state.snapshots.borrow();
        SessionHealth {
            running,
            frames: snapshot.frames,
            face_detected: snapshot.face_detected,
            last_frame_at: snapshot.timestamp,
        }
    };

    Json(HealthResponse {
        status: if running { "healthy" } else { "stopped" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        session,
    })
}

/// Prometheus text rendering
async fn metrics_handler(State(state): State<Arc<RwLock<AppState>>>) -> Result<String, ApiError> {
    let state = state.read().await;
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or_else(|| ApiError::NotFound("Metrics recorder not installed".to_string()))
}

/// Initialize logging
pub fn init_logging() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    metrics::describe_counter!("wellness_frames_total", "Frames processed");
    metrics::describe_counter!("wellness_no_face_frames_total", "Frames without a face");
    metrics::describe_counter!("wellness_triggers_total", "Reminder prompts issued");
    metrics::describe_counter!("wellness_prompts_resolved_total", "Prompts resolved");
    metrics::describe_gauge!("wellness_heart_rate_bpm", "Current heart-rate estimate");
    Ok(handle)
}

/// Stand-in presentation collaborator: reports session events in the log
async fn present_events(mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Reminder(prompt) => info!(
                "{} - {}: {} (blinks/min {}, stress {}, heart rate {}) [{}]",
                prompt.trigger.kind,
                prompt.title,
                prompt.recommendation,
                prompt.trigger.blinks_per_minute,
                prompt.trigger.stress_score,
                prompt.trigger.heart_rate,
                prompt.id
            ),
            SessionEvent::Beep { repeats, cue } => debug!("Beep x{} ({:?})", repeats, cue),
            SessionEvent::Music(request) => info!("Music: {:?}", request),
            SessionEvent::Resolved(resolution) => info!(
                "Prompt {} closed as {}{}",
                resolution.prompt.id,
                resolution.outcome.as_str(),
                if resolution.timed_out { " (timed out)" } else { "" }
            ),
        }
    }
}

/// Run the monitor: replay session plus API server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let metrics = match install_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    let log = Arc::new(ReminderLog::open(&config.monitor.log_path)?);
    let snooze_secs = config.monitor.alert.snooze_secs;
    let session = MonitoringSession::new(config.monitor)?
        .with_log(Arc::clone(&log))
        .with_configured_therapy();
    let source = ReplaySource::open(&config.replay)?;

    let mut handle = spawn_session(session, source);
    tokio::spawn(present_events(handle.take_events()));

    let mut state = AppState::new(handle.snapshots.clone(), handle.commands(), log)
        .with_snooze_secs(snooze_secs);
    if let Some(metrics) = metrics {
        state = state.with_metrics(metrics);
    }
    let app = create_router(Arc::new(RwLock::new(state)));

    let commands = handle.commands();
    tokio::spawn(async move {
        match handle.join().await {
            Ok(summary) => info!(
                "Monitoring finished ({:?}): {} frames",
                summary.reason, summary.frames
            ),
            Err(e) => error!("Monitoring session ended with error: {}", e),
        }
    });

    info!("Starting API server on {}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for shutdown signal: {}", e);
            }
        })
        .await?;

    // session may already be gone
    let _ = commands.send(SessionCommand::Stop).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{AlertInputs, Prompt, Trigger, TriggerKind};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use storage::LogRecord;
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        commands: mpsc::Receiver<SessionCommand>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
        log: Arc<ReminderLog>,
        log_path: std::path::PathBuf,
    }

    fn harness(name: &str) -> Harness {
        let log_path = std::env::temp_dir().join(format!(
            "api-{}-{}.csv",
            name,
            std::process::id()
        ));
        std::fs::remove_file(&log_path).ok();
        let log = Arc::new(ReminderLog::open(&log_path).unwrap());

        let (snapshot_tx, snapshots) = watch::channel(SessionSnapshot::default());
        let (tx, commands) = mpsc::channel(8);
        let state = AppState::new(snapshots, tx, Arc::clone(&log));
        Harness {
            router: create_router(Arc::new(RwLock::new(state))),
            commands,
            snapshot_tx,
            log,
            log_path,
        }
    }

    fn pending_prompt() -> Prompt {
        let inputs = AlertInputs {
            blinks_per_minute: 3,
            ..Default::default()
        };
        Prompt::new(Trigger::new(TriggerKind::LowBlinkRate, &inputs, 1000.0), 25.0)
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_session() {
        let h = harness("health");
        h.snapshot_tx.send_modify(|s| s.frames = 42);

        let response = h.router.clone().oneshot(get("/api/v1/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["session"]["frames"], 42);
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_status_returns_snapshot() {
        let h = harness("status");
        h.snapshot_tx.send_modify(|s| {
            s.stress_score = 64;
            s.heart_rate = 77;
        });

        let response = h.router.clone().oneshot(get("/api/v1/status")).await.unwrap();
        let body = json(response).await;
        assert_eq!(body["stress_score"], 64);
        assert_eq!(body["heart_rate"], 77);
        assert_eq!(body["stress_level"], "Low");
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_answer_pending_prompt_queues_command() {
        let mut h = harness("answer");
        let prompt = pending_prompt();
        let id = prompt.id;
        h.snapshot_tx
            .send_modify(|s| s.pending_prompt = Some(prompt));

        let listed = json(h.router.clone().oneshot(get("/api/v1/prompts")).await.unwrap()).await;
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["data"][0]["title"], "Health Reminder");
        assert_eq!(listed["data"][0]["trigger"]["kind"], "low_blink_rate");

        let response = h
            .router
            .clone()
            .oneshot(post(
                &format!("/api/v1/prompts/{}", id),
                r#"{"outcome": "snoozed"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let command = h.commands.recv().await.unwrap();
        assert_eq!(
            command,
            SessionCommand::Acknowledge {
                id,
                outcome: alerting::AckOutcome::Snoozed { duration_secs: 120.0 },
            }
        );
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_not_found() {
        let h = harness("unknown");
        let response = h
            .router
            .clone()
            .oneshot(post(
                "/api/v1/prompts/67e55044-10b1-426f-9247-bb680e5fe0c8",
                r#"{"outcome": "acknowledged"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_calibration_and_snooze_commands() {
        let mut h = harness("calibrate");

        let response = h
            .router
            .clone()
            .oneshot(post("/api/v1/calibration", r#"{"stressed": true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            h.commands.recv().await,
            Some(SessionCommand::Calibrate { stressed: true })
        );

        h.router
            .clone()
            .oneshot(post("/api/v1/snooze", "{}"))
            .await
            .unwrap();
        assert_eq!(
            h.commands.recv().await,
            Some(SessionCommand::Snooze { duration_secs: 120.0 })
        );
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_stopped_session_is_unavailable() {
        let h = harness("stopped");
        drop(h.commands);

        let response = h
            .router
            .clone()
            .oneshot(post("/api/v1/session/stop", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let health = json(h.router.clone().oneshot(get("/api/v1/health")).await.unwrap()).await;
        assert_eq!(health["status"], "stopped");
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_reminder_history_and_summary() {
        let h = harness("history");
        for (ts, outcome) in [
            ("2026-03-01T09:00:00", "ack"),
            ("2026-03-01T10:00:00", "ignored"),
            ("2026-03-02T09:30:00", "ack"),
        ] {
            h.log
                .append(&LogRecord {
                    timestamp: ts.to_string(),
                    trigger_name: "Scheduled Reminder".to_string(),
                    outcome: outcome.to_string(),
                    blinks_last_min: 10,
                    stress_level: 0,
                    heart_rate: 0,
                    drowsiness_score: 0,
                })
                .unwrap();
        }

        let recent = json(
            h.router
                .clone()
                .oneshot(get("/api/v1/reminders?limit=2"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(recent["count"], 2);
        assert_eq!(recent["acknowledged_count"], 1);
        assert_eq!(recent["data"][0]["timestamp"], "2026-03-02T09:30:00");

        let ignored = json(
            h.router
                .clone()
                .oneshot(get("/api/v1/reminders?outcome=ignored"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(ignored["count"], 1);

        let summary = json(
            h.router
                .clone()
                .oneshot(get("/api/v1/reminders/summary"))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(summary["days"], 2);
        assert_eq!(summary["data"][0]["date"], "2026-03-01");
        assert_eq!(summary["data"][0]["ack_rate"], 50.0);
        std::fs::remove_file(h.log_path).ok();
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let h = harness("metrics");
        let response = h.router.clone().oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        std::fs::remove_file(h.log_path).ok();
    }
}
