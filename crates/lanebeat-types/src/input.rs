/// Non-lane keys understood by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Pause,
    StarPower,
}

impl SpecialKey {
    /// Parse the name an input source reports ("pause", "starpower").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pause" => Some(Self::Pause),
            "starpower" | "star_power" => Some(Self::StarPower),
            _ => None,
        }
    }
}

/// Input event delivered by an input source.
///
/// Timestamps are informational; judgment always uses the song position read
/// at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    LanePressed { lane: usize, timestamp_ms: f64 },
    LaneReleased { lane: usize, timestamp_ms: f64 },
    Special(SpecialKey),
}

/// Abstraction over input sources.
/// Implementations: platform input in the shell, ScriptedInput (autoplay/testing).
pub trait InputSource {
    /// Events that are due at `song_position_ms`, in the order they occurred.
    /// Sources driven by the OS ignore the position and return what they have.
    fn poll_events(&mut self, song_position_ms: f64) -> Vec<InputEvent>;
}
