//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `WELLNESS__*` environment variables
//! (e.g. `WELLNESS__MONITOR__SOUND_ON=false`).

use std::path::Path;

use camera_capture::ReplayConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use session::MonitorConfig;

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Everything the binary needs to start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub monitor: MonitorConfig,
    pub replay: ReplayConfig,
}

/// Load configuration from `path`, or from `wellness.toml` if present
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("wellness").required(false),
    };
    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("WELLNESS").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("wellness-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[server]
bind = "0.0.0.0:9090"

[monitor]
blink_threshold = 5
sound_on = false

[monitor.rppg]
fps = 25.0

[replay]
path = "recordings/morning.jsonl"
realtime = false
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9090");
        assert_eq!(config.monitor.blink_threshold, 5);
        assert!(!config.monitor.sound_on);
        assert_eq!(config.monitor.rppg.fps, 25.0);
        assert_eq!(config.monitor.rppg.history_len, 20);
        assert_eq!(config.monitor.interval_minutes, 20.0);
        assert!(!config.replay.realtime);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/wellness.toml"))).is_err());
    }
}
