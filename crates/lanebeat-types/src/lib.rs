//! Collaborator interfaces consumed by the lanebeat core.
//!
//! The core never talks to an audio device, an input device or a GPU
//! directly; the presentation shell implements these traits and passes them
//! in.

pub mod audio;
pub mod input;
pub mod render;
pub mod time;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use audio::{AudioSink, Sfx};
pub use input::{InputEvent, InputSource, SpecialKey};
pub use render::{Color, Point, RenderTarget};
pub use time::{MockTimeProvider, SystemTimeProvider, TimeProvider};
