//! Perspective projection and highway drawing.
//!
//! The projector is shared by the renderer and the play session so a note's
//! logical depth always matches where it is drawn.

pub mod command_recorder;
pub mod highway;
pub mod projector;

pub use command_recorder::{CommandRecorder, DrawCommand};
pub use highway::{HighwayFrame, HighwayRenderer, HighwayStyle, HudInfo, JudgmentFlash, NoteSprite};
pub use projector::{
    DIVIDER_OFFSETS, LANE_SLOTS, Orientation, Projected, Projector, ProjectorConfig, lane_offset,
    raw_depth, time_to_normalized_depth,
};
