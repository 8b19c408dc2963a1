//! Test doubles for the collaborator traits.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::audio::AudioSink;

/// Call recorded by [`MockAudio`].
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Init,
    LoadSong(PathBuf),
    Play(f64),
    Pause,
    Resume,
    Stop,
    Sfx(String),
    StartSustain(usize),
    StopSustain(usize),
}

/// Audio sink with a manually advanced clock.
///
/// The clock only moves while playing, like a real playback position.
#[derive(Debug, Default)]
pub struct MockAudio {
    pub calls: Vec<AudioCall>,
    pub position_ms: f64,
    pub playing: bool,
    /// Duration reported by `load_song`; `None` makes loading fail.
    pub song_duration_ms: Option<f64>,
    pub fail_init: bool,
    /// Makes every `play` call fail without touching the clock.
    pub fail_play: bool,
    /// When set, `resume` jumps the clock by this amount to simulate drift.
    pub resume_jump_ms: f64,
}

impl MockAudio {
    pub fn new() -> Self {
        Self {
            song_duration_ms: Some(120_000.0),
            ..Default::default()
        }
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::new()
        }
    }

    /// Advance the playback position if playing.
    pub fn advance(&mut self, ms: f64) {
        if self.playing {
            self.position_ms += ms;
        }
    }

    pub fn sfx_played(&self, name: &str) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, AudioCall::Sfx(n) if n == name))
    }

    pub fn count(&self, call: &AudioCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl AudioSink for MockAudio {
    fn init(&mut self) -> Result<()> {
        self.calls.push(AudioCall::Init);
        if self.fail_init {
            bail!("mock audio device unavailable");
        }
        Ok(())
    }

    fn load_song(&mut self, path: &Path) -> Result<f64> {
        self.calls.push(AudioCall::LoadSong(path.to_path_buf()));
        match self.song_duration_ms {
            Some(duration) => Ok(duration),
            None => bail!("cannot decode {}", path.display()),
        }
    }

    fn play(&mut self, offset_ms: f64) -> Result<()> {
        self.calls.push(AudioCall::Play(offset_ms));
        if self.fail_play {
            bail!("mock audio refused to seek to {offset_ms}");
        }
        self.position_ms = offset_ms;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(AudioCall::Pause);
        self.playing = false;
    }

    fn resume(&mut self) {
        self.calls.push(AudioCall::Resume);
        self.position_ms += self.resume_jump_ms;
        self.playing = true;
    }

    fn stop(&mut self) {
        self.calls.push(AudioCall::Stop);
        self.playing = false;
    }

    fn current_time_ms(&self) -> f64 {
        self.position_ms
    }

    fn play_sfx(&mut self, name: &str, _volume: f32) {
        self.calls.push(AudioCall::Sfx(name.to_string()));
    }

    fn start_hold_sustain(&mut self, lane: usize, _volume: f32) {
        self.calls.push(AudioCall::StartSustain(lane));
    }

    fn stop_hold_sustain(&mut self, lane: usize) {
        self.calls.push(AudioCall::StopSustain(lane));
    }
}
