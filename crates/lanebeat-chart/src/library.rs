use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::error::ChartError;
use crate::loader::ChartLoader;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongIndexEntry {
    /// Chart path relative to the index file.
    pub chart_file: String,
}

/// Song index file: `{"songs": [{"chartFile": "..."}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongIndex {
    #[serde(default)]
    pub songs: Vec<SongIndexEntry>,
}

impl SongIndex {
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let content = fs::read_to_string(path).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ChartError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A playable song: a loaded chart plus where it came from.
#[derive(Debug, Clone)]
pub struct SongEntry {
    pub chart_path: PathBuf,
    pub chart: Arc<Chart>,
}

impl SongEntry {
    pub fn new(chart_path: PathBuf, chart: Chart) -> Self {
        Self {
            chart_path,
            chart: Arc::new(chart),
        }
    }

    /// Audio file resolved relative to the chart file.
    pub fn audio_path(&self) -> PathBuf {
        let dir = self.chart_path.parent().unwrap_or_else(|| Path::new(""));
        dir.join(&self.chart.meta.audio_file)
    }

    pub fn title(&self) -> &str {
        &self.chart.meta.title
    }
}

/// The list of songs available for selection.
#[derive(Debug, Clone, Default)]
pub struct SongLibrary {
    songs: Vec<SongEntry>,
}

impl SongLibrary {
    pub fn new(songs: Vec<SongEntry>) -> Self {
        Self { songs }
    }

    /// Build the library from an index file.
    ///
    /// Entries whose chart fails to load are skipped; only an unreadable
    /// index is an error.
    pub fn build(index_path: &Path, loader: &dyn ChartLoader) -> Result<Self, ChartError> {
        let index = SongIndex::load(index_path)?;
        let base = index_path.parent().unwrap_or_else(|| Path::new(""));

        let mut songs = Vec::with_capacity(index.songs.len());
        for entry in &index.songs {
            let chart_path = base.join(&entry.chart_file);
            match loader.load_chart(&chart_path) {
                Some(chart) => songs.push(SongEntry::new(chart_path, chart)),
                None => warn!("Song index entry skipped: {}", entry.chart_file),
            }
        }

        info!(
            "Song library built: {} of {} entries loaded",
            songs.len(),
            index.songs.len()
        );
        Ok(Self { songs })
    }

    pub fn songs(&self) -> &[SongEntry] {
        &self.songs
    }

    pub fn get(&self, index: usize) -> Option<&SongEntry> {
        self.songs.get(index)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
