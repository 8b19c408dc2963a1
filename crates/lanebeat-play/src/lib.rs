//! Real-time play core: note scheduling, judging, scoring and the game loop.
//!
//! [`GameEngine`] is driven by a frame driver calling [`GameEngine::tick`] and
//! by input callbacks calling [`GameEngine::handle_input`]; both read the song
//! position from the injected [`AudioSink`](lanebeat_types::AudioSink).

pub mod autoplay;
pub mod combo;
pub mod config;
pub mod engine;
pub mod judgment;
pub mod note;
pub mod result;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod state;

pub use autoplay::{ScriptedEvent, ScriptedInput, generate_autoplay_events};
pub use combo::{ComboEngine, ComboUpdate, SessionScore, max_possible_score, star_rating};
pub use config::GameConfig;
pub use engine::GameEngine;
pub use judgment::{
    Judgment, JudgmentEngine, JudgmentKind, PressResult, Tier, TimingDirection,
};
pub use note::LiveNote;
pub use result::PlayResult;
pub use scheduler::NoteScheduler;
pub use session::PlaySession;
pub use snapshot::GameSnapshot;
pub use state::{GameState, StateMachine};
