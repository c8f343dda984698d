//! Ocular Wellness Monitor - Main Entry Point
//!
//! Usage: `wellness-monitor [config.toml]`. Without an argument,
//! `wellness.toml` in the working directory is used when present.

use std::path::PathBuf;

use api::{init_logging, load_config, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    info!("=== Ocular Wellness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(path.as_deref())?;
    config.monitor.validate()?;
    info!(
        "Reminder interval {} min, blink threshold {}/min, EAR threshold {}",
        config.monitor.interval_minutes,
        config.monitor.blink_threshold,
        config.monitor.ear_threshold
    );

    run_server(config).await?;

    Ok(())
}
