use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Gameplay tuning. Loaded from JSON; missing fields take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub countdown_ms: f64,
    /// Largest frame delta simulated by one tick.
    pub max_frame_delta_ms: f64,
    /// Time after the last note's tail before the song ends.
    pub song_end_buffer_ms: f64,
    /// Assumed song length when the audio cannot report one.
    pub fallback_song_duration_ms: f64,
    /// Horizon-to-hit-line travel time per difficulty name.
    pub travel_time_ms: BTreeMap<String, f64>,
    pub default_travel_time_ms: f64,
    /// Output latency subtracted from the audio clock, on top of the chart offset.
    pub audio_offset_ms: f64,
    pub sfx_volume: f32,
    pub hold_sustain_volume: f32,
    /// Clock mismatch after resume that triggers a re-seek.
    pub resume_drift_tolerance_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        let travel_time_ms = [
            ("easy", 2000.0),
            ("medium", 1700.0),
            ("hard", 1400.0),
            ("expert", 1150.0),
        ]
        .into_iter()
        .map(|(name, ms)| (name.to_string(), ms))
        .collect();

        Self {
            countdown_ms: 3000.0,
            max_frame_delta_ms: 33.33,
            song_end_buffer_ms: 2000.0,
            fallback_song_duration_ms: 60_000.0,
            travel_time_ms,
            default_travel_time_ms: 1600.0,
            audio_offset_ms: 0.0,
            sfx_volume: 0.8,
            hold_sustain_volume: 0.5,
            resume_drift_tolerance_ms: 5.0,
        }
    }
}

impl GameConfig {
    /// Travel time for a difficulty. Case-insensitive; unknown names use the default.
    /// Non-positive configured values also fall back to the default.
    pub fn travel_time_for(&self, difficulty: &str) -> f64 {
        let key = difficulty.trim().to_ascii_lowercase();
        self.travel_time_ms
            .get(&key)
            .copied()
            .filter(|ms| ms.is_finite() && *ms > 0.0)
            .unwrap_or(self.default_travel_time_ms)
    }

    /// Loads config from `path`. Returns defaults if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
