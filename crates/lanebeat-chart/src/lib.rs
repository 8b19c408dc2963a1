//! Chart data model and loading for lanebeat.
//!
//! A [`Chart`] is immutable once loaded and is shared between play attempts;
//! the play crate clones the notes of one [`NoteTrack`] per attempt.

pub mod chart;
pub mod error;
pub mod library;
pub mod loader;
pub mod note;

pub use chart::{Chart, ChartMeta, LaneSound, NoteSounds, SyncPoint};
pub use error::ChartError;
pub use library::{SongEntry, SongIndex, SongIndexEntry, SongLibrary};
pub use loader::{ChartLoader, JsonChartLoader};
pub use note::{ChartNote, LANE_COUNT, NoteTrack, StarPowerPhrase};
