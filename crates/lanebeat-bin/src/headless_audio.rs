use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Result, bail};
use lanebeat_types::AudioSink;
use log::debug;

/// Silent audio sink whose clock advances only when the driver says so.
pub struct HeadlessAudio {
    position_ms: f64,
    playing: bool,
    assumed_duration_ms: f64,
    sfx_counts: BTreeMap<String, u32>,
}

impl HeadlessAudio {
    pub fn new(assumed_duration_ms: f64) -> Self {
        Self {
            position_ms: 0.0,
            playing: false,
            assumed_duration_ms,
            sfx_counts: BTreeMap::new(),
        }
    }

    pub fn advance(&mut self, delta_ms: f64) {
        if self.playing {
            self.position_ms += delta_ms;
        }
    }

    pub fn sfx_counts(&self) -> &BTreeMap<String, u32> {
        &self.sfx_counts
    }
}

impl AudioSink for HeadlessAudio {
    fn init(&mut self) -> Result<()> {
        debug!("headless audio ready");
        Ok(())
    }

    fn load_song(&mut self, path: &Path) -> Result<f64> {
        if !path.exists() {
            bail!("audio file not found: {}", path.display());
        }
        Ok(self.assumed_duration_ms)
    }

    fn play(&mut self, offset_ms: f64) -> Result<()> {
        self.position_ms = offset_ms;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn resume(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
    }

    fn current_time_ms(&self) -> f64 {
        self.position_ms
    }

    fn play_sfx(&mut self, name: &str, _volume: f32) {
        *self.sfx_counts.entry(name.to_string()).or_default() += 1;
    }

    fn start_hold_sustain(&mut self, _lane: usize, _volume: f32) {}

    fn stop_hold_sustain(&mut self, _lane: usize) {}
}
