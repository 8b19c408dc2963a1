use log::warn;
use serde::{Deserialize, Serialize};

/// Number of lanes in the fixed lane layout.
pub const LANE_COUNT: usize = 5;

/// A single note as authored in the chart. Never mutated after load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartNote {
    /// Hit time in milliseconds from the start of the audio.
    pub time: f64,
    /// Lane index, 0..LANE_COUNT.
    pub lane: usize,
    /// Hold length in milliseconds. 0 for a tap note.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub is_star_power: bool,
}

impl ChartNote {
    pub fn tap(time: f64, lane: usize) -> Self {
        Self {
            time,
            lane,
            duration: 0.0,
            is_star_power: false,
        }
    }

    pub fn hold(time: f64, lane: usize, duration: f64) -> Self {
        Self {
            time,
            lane,
            duration,
            is_star_power: false,
        }
    }

    pub fn with_star_power(mut self) -> Self {
        self.is_star_power = true;
        self
    }

    pub fn is_hold(&self) -> bool {
        self.duration > 0.0
    }

    /// Time at which the note's tail reaches the hit line.
    pub fn end_time(&self) -> f64 {
        self.time + self.duration
    }
}

/// Advisory star-power phrase marker. Gain is driven by `ChartNote::is_star_power`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarPowerPhrase {
    pub start_time: f64,
    pub end_time: f64,
}

/// Raw note as it appears in the file, before lane validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawNote {
    pub time: f64,
    pub lane: i64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub is_star_power: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTrack {
    pub notes: Vec<RawNote>,
    pub star_power_phrases: Vec<StarPowerPhrase>,
}

/// Notes of one difficulty, sorted ascending by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteTrack {
    notes: Vec<ChartNote>,
    star_power_phrases: Vec<StarPowerPhrase>,
}

impl NoteTrack {
    /// Build a track from notes in any order.
    ///
    /// The sort is stable on time, so notes sharing a timestamp keep their
    /// authored order. Notes with non-finite times or lanes outside the
    /// layout are dropped; negative or non-finite durations become taps.
    pub fn new(notes: Vec<ChartNote>, star_power_phrases: Vec<StarPowerPhrase>) -> Self {
        let mut notes: Vec<ChartNote> = notes
            .into_iter()
            .filter(|n| {
                let valid = n.time.is_finite() && n.lane < LANE_COUNT;
                if !valid {
                    warn!("Dropping note with invalid time/lane: {:?}", n);
                }
                valid
            })
            .map(|mut n| {
                if !n.duration.is_finite() || n.duration < 0.0 {
                    n.duration = 0.0;
                }
                n
            })
            .collect();
        notes.sort_by(|a, b| a.time.total_cmp(&b.time));

        Self {
            notes,
            star_power_phrases,
        }
    }

    pub(crate) fn from_raw(difficulty: &str, raw: RawTrack) -> Self {
        let mut dropped = 0usize;
        let notes: Vec<ChartNote> = raw
            .notes
            .into_iter()
            .filter_map(|n| {
                if n.lane < 0 || n.lane as usize >= LANE_COUNT {
                    dropped += 1;
                    return None;
                }
                Some(ChartNote {
                    time: n.time,
                    lane: n.lane as usize,
                    duration: n.duration,
                    is_star_power: n.is_star_power,
                })
            })
            .collect();
        if dropped > 0 {
            warn!(
                "Difficulty '{}': dropped {} notes with out-of-range lanes",
                difficulty, dropped
            );
        }
        Self::new(notes, raw.star_power_phrases)
    }

    pub fn notes(&self) -> &[ChartNote] {
        &self.notes
    }

    pub fn star_power_phrases(&self) -> &[StarPowerPhrase] {
        &self.star_power_phrases
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Latest tail time over all notes, or 0 for an empty track.
    pub fn last_note_end(&self) -> f64 {
        self.notes
            .iter()
            .map(ChartNote::end_time)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_time_and_keeps_equal_times_stable() {
        let track = NoteTrack::new(
            vec![
                ChartNote::tap(500.0, 2),
                ChartNote::tap(100.0, 4),
                ChartNote::tap(100.0, 1),
                ChartNote::tap(300.0, 0),
            ],
            Vec::new(),
        );
        let times: Vec<f64> = track.notes().iter().map(|n| n.time).collect();
        assert_eq!(times, vec![100.0, 100.0, 300.0, 500.0]);
        // Equal times keep their input order.
        assert_eq!(track.notes()[0].lane, 4);
        assert_eq!(track.notes()[1].lane, 1);
    }

    #[test]
    fn drops_invalid_notes() {
        let track = NoteTrack::new(
            vec![
                ChartNote::tap(f64::NAN, 0),
                ChartNote::tap(100.0, 5),
                ChartNote::hold(200.0, 1, -50.0),
            ],
            Vec::new(),
        );
        assert_eq!(track.len(), 1);
        assert!(!track.notes()[0].is_hold());
    }

    #[test]
    fn last_note_end_includes_hold_tails() {
        let track = NoteTrack::new(
            vec![ChartNote::hold(1000.0, 0, 2000.0), ChartNote::tap(2500.0, 1)],
            Vec::new(),
        );
        assert!((track.last_note_end() - 3000.0).abs() < f64::EPSILON);
        assert!((NoteTrack::default().last_note_end()).abs() < f64::EPSILON);
    }
}
