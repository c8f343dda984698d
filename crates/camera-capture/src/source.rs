//! Landmark sources
//!
//! A source yields one `CapturedFrame` per camera frame, or `None` once the
//! stream has ended. Failures opening or reading the underlying device are
//! reported as `CaptureError` and end the monitoring session.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{CaptureError, FaceLandmarks, LandmarkFrame, Point2, VideoFrame};

/// One frame as delivered to the monitoring core
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub landmarks: LandmarkFrame,
    /// Raw pixels, when the source has them
    pub pixels: Option<VideoFrame>,
    /// Forehead mean color already extracted upstream (RGB)
    pub forehead_rgb: Option<[f64; 3]>,
}

impl CapturedFrame {
    pub fn timestamp(&self) -> f64 {
        self.landmarks.timestamp
    }
}

/// Producer of per-frame landmark observations
pub trait LandmarkSource: Send {
    /// Next frame, or `Ok(None)` at end of stream
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError>;

    /// Nominal frame rate of the source, if known
    fn nominal_fps(&self) -> Option<f64> {
        None
    }
}

/// Replay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// JSON-lines recording path
    pub path: PathBuf,
    /// Sleep between frames according to recorded timestamps
    pub realtime: bool,
    /// Recording frame rate
    pub fps: f64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("recordings/session.jsonl"),
            realtime: true,
            fps: 30.0,
        }
    }
}

/// On-disk shape of one recorded frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub timestamp: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub landmarks: Option<Vec<Point2>>,
    #[serde(default)]
    pub forehead_rgb: Option<[f64; 3]>,
}

/// Plays back a JSON-lines recording, one `ReplayRecord` per line
pub struct ReplaySource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
    realtime: bool,
    fps: f64,
    last_timestamp: Option<f64>,
}

impl ReplaySource {
    pub fn open(config: &ReplayConfig) -> Result<Self, CaptureError> {
        let file = File::open(&config.path).map_err(|e| {
            CaptureError::Open(format!("{}: {}", config.path.display(), e))
        })?;
        info!("Replaying landmark recording from {}", config.path.display());
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
            realtime: config.realtime,
            fps: config.fps,
            last_timestamp: None,
        })
    }

    fn parse(&self, line: &str) -> Result<CapturedFrame, CaptureError> {
        let record: ReplayRecord =
            serde_json::from_str(line).map_err(|e| CaptureError::Malformed {
                line: self.line_no,
                reason: e.to_string(),
            })?;

        let face = record
            .landmarks
            .map(FaceLandmarks::new)
            .transpose()
            .map_err(|e| CaptureError::Malformed {
                line: self.line_no,
                reason: e.to_string(),
            })?;

        Ok(CapturedFrame {
            landmarks: LandmarkFrame {
                timestamp: record.timestamp,
                width: record.width,
                height: record.height,
                face,
            },
            pixels: None,
            forehead_rgb: record.forehead_rgb,
        })
    }

    fn pace(&mut self, timestamp: f64) {
        if let Some(previous) = self.last_timestamp {
            let gap = (timestamp - previous).clamp(0.0, 1.0);
            if self.realtime && gap > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(gap));
            }
        }
        self.last_timestamp = Some(timestamp);
    }
}

impl LandmarkSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<CapturedFrame>, CaptureError> {
        loop {
            let Some(line) = self.lines.next() else {
                debug!("Recording exhausted after {} lines", self.line_no);
                return Ok(None);
            };
            let line = line?;
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            match self.parse(&line) {
                Ok(frame) => {
                    self.pace(frame.timestamp());
                    return Ok(Some(frame));
                }
                Err(e) => {
                    // A single corrupt line is skipped like a dropped frame
                    warn!("Skipping recorded frame: {}", e);
                }
            }
        }
    }

    fn nominal_fps(&self) -> Option<f64> {
        Some(self.fps)
    }
}
