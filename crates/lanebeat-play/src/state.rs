use log::{debug, info};
use serde::Serialize;

/// Top-level game states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameState {
    Loading,
    MainMenu,
    SongSelect,
    DifficultySelect,
    Countdown,
    Playing,
    Paused,
    Results,
}

impl GameState {
    /// States in which lane input is judged.
    pub fn accepts_lane_input(self) -> bool {
        matches!(self, GameState::Countdown | GameState::Playing)
    }
}

/// Current and previous state. Transitions to the current state are no-ops.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current: GameState,
    previous: GameState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: GameState::Loading,
            previous: GameState::Loading,
        }
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn previous(&self) -> GameState {
        self.previous
    }

    pub fn is(&self, state: GameState) -> bool {
        self.current == state
    }

    /// Returns false if `target` is already current.
    pub fn transition_to(&mut self, target: GameState) -> bool {
        if self.current == target {
            return false;
        }
        self.previous = self.current;
        self.current = target;
        match target {
            GameState::Playing | GameState::Paused | GameState::Results => {
                info!("state: {:?} -> {:?}", self.previous, target)
            }
            _ => debug!("state: {:?} -> {:?}", self.previous, target),
        }
        true
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
