use std::path::Path;

use anyhow::Result;

/// Sound effect cues requested by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sfx {
    /// Press with no note in the lane.
    Thump,
    Miss,
    ComboBreak,
    StarPowerReady,
    StarPowerActivate,
}

impl Sfx {
    pub fn name(self) -> &'static str {
        match self {
            Self::Thump => "thump",
            Self::Miss => "miss",
            Self::ComboBreak => "combo_break",
            Self::StarPowerReady => "starpower_ready",
            Self::StarPowerActivate => "starpower_activate",
        }
    }
}

/// Audio playback plus the authoritative song clock.
///
/// `current_time_ms` is polled by the core on every tick and on every input
/// callback, so it must be cheap and must not block.
pub trait AudioSink {
    /// Start the underlying audio subsystem. Failure is fatal to the shell.
    fn init(&mut self) -> Result<()>;

    /// Load the song audio and return its duration in milliseconds.
    fn load_song(&mut self, path: &Path) -> Result<f64>;

    /// Start playback at `offset_ms` into the song.
    fn play(&mut self, offset_ms: f64) -> Result<()>;

    /// Freeze playback and the clock.
    fn pause(&mut self);

    /// Continue from the paused offset.
    fn resume(&mut self);

    fn stop(&mut self);

    /// Current song position in milliseconds.
    fn current_time_ms(&self) -> f64;

    fn play_sfx(&mut self, name: &str, volume: f32);

    fn start_hold_sustain(&mut self, lane: usize, volume: f32);

    fn stop_hold_sustain(&mut self, lane: usize);
}
