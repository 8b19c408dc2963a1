use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::note::{NoteTrack, RawTrack};

/// Difficulty names in menu order. Unknown names sort after these, alphabetically.
const DIFFICULTY_ORDER: [&str; 4] = ["easy", "medium", "hard", "expert"];

/// Song metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartMeta {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub charter: String,
    /// Audio file path, relative to the chart file.
    pub audio_file: String,
    pub cover_image: Option<String>,
    pub preview_start: f64,
    pub preview_end: f64,
    pub bpm: f64,
    /// Chart offset in milliseconds, applied on top of the audio clock.
    pub offset: f64,
}

/// Per-lane synth voice for note hit sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneSound {
    pub freq: f64,
    #[serde(default)]
    pub name: String,
}

/// Optional per-song note timbre configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSounds {
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub lanes: Vec<LaneSound>,
    #[serde(default)]
    pub brightness: f64,
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub sustain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPoint {
    pub time: f64,
    pub bpm: f64,
    #[serde(default)]
    pub time_signature: Option<u32>,
}

/// On-disk chart layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartFile {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    note_sounds: Option<NoteSounds>,
    #[serde(default)]
    sync_track: Vec<SyncPoint>,
    #[serde(default)]
    difficulties: BTreeMap<String, RawTrack>,
}

/// A loaded chart: metadata plus one sorted [`NoteTrack`] per difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub meta: ChartMeta,
    pub note_sounds: Option<NoteSounds>,
    pub sync_track: Vec<SyncPoint>,
    difficulties: BTreeMap<String, NoteTrack>,
}

impl Chart {
    pub fn new(meta: ChartMeta) -> Self {
        Self {
            meta,
            note_sounds: None,
            sync_track: Vec::new(),
            difficulties: BTreeMap::new(),
        }
    }

    pub fn with_track(mut self, difficulty: impl Into<String>, track: NoteTrack) -> Self {
        self.difficulties.insert(difficulty.into(), track);
        self
    }

    /// Parse a chart from JSON text. `path` is only used for error reporting.
    pub fn from_json_str(content: &str, path: &Path) -> Result<Self, ChartError> {
        let file: ChartFile = serde_json::from_str(content).map_err(|source| ChartError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if file.difficulties.is_empty() {
            return Err(ChartError::NoDifficulties {
                title: file.meta.title,
            });
        }

        let difficulties = file
            .difficulties
            .into_iter()
            .map(|(name, raw)| {
                let track = NoteTrack::from_raw(&name, raw);
                (name, track)
            })
            .collect();

        Ok(Self {
            meta: file.meta,
            note_sounds: file.note_sounds,
            sync_track: file.sync_track,
            difficulties,
        })
    }

    /// Read and parse a chart file.
    pub fn load(path: &Path) -> Result<Self, ChartError> {
        let content = fs::read_to_string(path).map_err(|source| ChartError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content, path)
    }

    pub fn track(&self, difficulty: &str) -> Option<&NoteTrack> {
        self.difficulties.get(difficulty)
    }

    /// Difficulty names in menu order.
    pub fn difficulty_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.difficulties.keys().map(String::as_str).collect();
        names.sort_by_key(|name| {
            let rank = DIFFICULTY_ORDER
                .iter()
                .position(|known| known.eq_ignore_ascii_case(name))
                .unwrap_or(DIFFICULTY_ORDER.len());
            (rank, name.to_ascii_lowercase())
        });
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "meta": {
            "title": "Test Song",
            "artist": "Someone",
            "audioFile": "song.ogg",
            "bpm": 120,
            "offset": 0
        },
        "syncTrack": [{"time": 0, "bpm": 120, "timeSignature": 4}],
        "difficulties": {
            "hard": {
                "notes": [
                    {"time": 2000, "lane": 1, "duration": 0, "isStarPower": false},
                    {"time": 1000, "lane": 0, "duration": 500, "isStarPower": true},
                    {"time": 1500, "lane": 7, "duration": 0, "isStarPower": false}
                ],
                "starPowerPhrases": [{"startTime": 900, "endTime": 1600}]
            },
            "easy": {"notes": []},
            "nightmare": {"notes": []}
        }
    }"#;

    #[test]
    fn parses_sample_chart() {
        let chart = Chart::from_json_str(SAMPLE, Path::new("sample.json")).unwrap();
        assert_eq!(chart.meta.title, "Test Song");
        assert_eq!(chart.meta.audio_file, "song.ogg");
        assert!(chart.note_sounds.is_none());
        assert_eq!(chart.sync_track.len(), 1);

        let hard = chart.track("hard").unwrap();
        // lane 7 is dropped, the rest sorted by time
        assert_eq!(hard.len(), 2);
        assert!((hard.notes()[0].time - 1000.0).abs() < f64::EPSILON);
        assert!(hard.notes()[0].is_star_power);
        assert!(hard.notes()[0].is_hold());
        assert_eq!(hard.star_power_phrases().len(), 1);
    }

    #[test]
    fn difficulty_names_follow_menu_order() {
        let chart = Chart::from_json_str(SAMPLE, Path::new("sample.json")).unwrap();
        assert_eq!(chart.difficulty_names(), vec!["easy", "hard", "nightmare"]);
    }

    #[test]
    fn rejects_chart_without_difficulties() {
        let err = Chart::from_json_str(r#"{"meta": {"title": "Empty"}}"#, Path::new("e.json"))
            .unwrap_err();
        assert!(matches!(err, ChartError::NoDifficulties { .. }));
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let err = Chart::from_json_str("{not json", Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn parses_note_sounds() {
        let json = r#"{
            "meta": {"title": "Synth"},
            "noteSounds": {"style": "pluck", "lanes": [{"freq": 261.6, "name": "C4"}],
                           "brightness": 0.5, "attack": 0.01, "sustain": 0.3},
            "difficulties": {"easy": {"notes": []}}
        }"#;
        let chart = Chart::from_json_str(json, Path::new("synth.json")).unwrap();
        let sounds = chart.note_sounds.unwrap();
        assert_eq!(sounds.style, "pluck");
        assert_eq!(sounds.lanes[0].name, "C4");
    }
}
