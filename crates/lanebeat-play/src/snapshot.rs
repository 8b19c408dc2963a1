use lanebeat_render::HighwayFrame;

use crate::state::GameState;

/// Render-ready view of the engine after the latest tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    pub state: GameState,
    pub song_position_ms: f64,
    pub countdown_remaining_ms: f64,
    /// Travel time of the current attempt; 0 outside an attempt.
    pub travel_time_ms: f64,
    pub frame: HighwayFrame,
}

impl GameSnapshot {
    /// Whole seconds left on the countdown, for a "3, 2, 1" display.
    pub fn countdown_seconds(&self) -> Option<u32> {
        (self.state == GameState::Countdown && self.countdown_remaining_ms > 0.0)
            .then(|| (self.countdown_remaining_ms / 1000.0).ceil() as u32)
    }
}
