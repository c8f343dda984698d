//! Relaxation Music Controller
//!
//! Tracks are bucketed by stress level from keywords in their file names.
//! On each change of stress level the controller asks for a random track of
//! the new level (score at or above the play threshold) or for silence.
//! Audio playback itself happens outside the session.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use stress_inference::StressLevel;
use tracing::{info, warn};

const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

const LOW_KEYWORDS: [&str; 4] = ["calm", "relax", "ambient", "low"];
const MEDIUM_KEYWORDS: [&str; 3] = ["medium", "peace", "nature"];
const HIGH_KEYWORDS: [&str; 4] = ["high", "meditation", "deep", "binaural"];

/// Playback request for the audio collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MusicRequest {
    /// Loop this track
    Play { track: PathBuf, level: StressLevel },
    Stop,
}

/// Tracks grouped by stress level
#[derive(Debug, Clone, Default)]
pub struct Playlist {
    tracks: HashMap<StressLevel, Vec<PathBuf>>,
}

impl Playlist {
    /// Scan a folder for audio files, creating it when missing
    pub fn scan(folder: &Path) -> std::io::Result<Self> {
        if !folder.exists() {
            std::fs::create_dir_all(folder)?;
            info!("Created {}, add music files to enable playback", folder.display());
            return Ok(Self::default());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(folder)? {
            let path = entry?.path();
            let is_audio = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if is_audio {
                paths.push(path);
            }
        }
        // read_dir order is platform dependent
        paths.sort();

        let playlist = Self::from_paths(paths);
        info!("Music library loaded: {} tracks", playlist.len());
        Ok(playlist)
    }

    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut tracks: HashMap<StressLevel, Vec<PathBuf>> = HashMap::new();
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracks.entry(Self::categorize(&name)).or_default().push(path);
        }
        Self { tracks }
    }

    /// Keyword category of a file name; unmatched names are Medium
    pub fn categorize(file_name: &str) -> StressLevel {
        let lower = file_name.to_lowercase();
        let matches = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if matches(&LOW_KEYWORDS) {
            StressLevel::Low
        } else if matches(&MEDIUM_KEYWORDS) {
            StressLevel::Medium
        } else if matches(&HIGH_KEYWORDS) {
            StressLevel::High
        } else {
            StressLevel::Medium
        }
    }

    pub fn tracks(&self, level: StressLevel) -> &[PathBuf] {
        self.tracks.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Music controller (lives for one monitoring session)
pub struct MusicTherapy {
    playlist: Playlist,
    min_score: u32,
    level: StressLevel,
    current: Option<PathBuf>,
    rng: StdRng,
}

impl MusicTherapy {
    pub fn new(playlist: Playlist, min_score: u32) -> Self {
        Self::with_rng(playlist, min_score, StdRng::from_entropy())
    }

    pub fn with_rng(playlist: Playlist, min_score: u32, rng: StdRng) -> Self {
        Self {
            playlist,
            min_score,
            level: StressLevel::Low,
            current: None,
            rng,
        }
    }

    /// React to the latest smoothed score; only a level change does anything
    pub fn update(&mut self, score: u32, level: StressLevel) -> Option<MusicRequest> {
        if level == self.level {
            return None;
        }
        self.level = level;

        if score >= self.min_score {
            self.play()
        } else {
            self.stop()
        }
    }

    fn play(&mut self) -> Option<MusicRequest> {
        let Some(track) = self.playlist.tracks(self.level).choose(&mut self.rng) else {
            warn!("No music available for {} stress level", self.level);
            return None;
        };
        if self.current.as_ref() == Some(track) {
            return None;
        }

        let track = track.clone();
        info!("Playing: {}", track.display());
        self.current = Some(track.clone());
        Some(MusicRequest::Play {
            track,
            level: self.level,
        })
    }

    /// Stop request if something is playing
    pub fn stop(&mut self) -> Option<MusicRequest> {
        self.current.take().map(|_| MusicRequest::Stop)
    }

    pub fn now_playing(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Forget the level and any playing track
    pub fn reset(&mut self) -> Option<MusicRequest> {
        self.level = StressLevel::Low;
        self.stop()
    }
}
