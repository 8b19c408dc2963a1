//! Scripted input for autoplay and deterministic tests.

use lanebeat_chart::ChartNote;
use lanebeat_types::{InputEvent, InputSource};

/// Longest a tap stays pressed.
const TAP_PRESS_DURATION_MS: f64 = 50.0;

/// An input event scheduled at a song position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedEvent {
    pub time_ms: f64,
    pub event: InputEvent,
}

impl ScriptedEvent {
    fn press(lane: usize, time_ms: f64) -> Self {
        Self {
            time_ms,
            event: InputEvent::LanePressed {
                lane,
                timestamp_ms: time_ms,
            },
        }
    }

    fn release(lane: usize, time_ms: f64) -> Self {
        Self {
            time_ms,
            event: InputEvent::LaneReleased {
                lane,
                timestamp_ms: time_ms,
            },
        }
    }

    fn is_press(&self) -> bool {
        matches!(self.event, InputEvent::LanePressed { .. })
    }
}

/// Build a perfect press/release script for `notes`.
///
/// Taps are pressed on time and released after 50 ms, or halfway to the next
/// note in the same lane if that comes sooner. Holds are released at their
/// tail. At equal times releases come before presses.
pub fn generate_autoplay_events(notes: &[ChartNote]) -> Vec<ScriptedEvent> {
    let mut events = Vec::with_capacity(notes.len() * 2);

    for (i, note) in notes.iter().enumerate() {
        events.push(ScriptedEvent::press(note.lane, note.time));

        let release_time = if note.is_hold() {
            note.end_time()
        } else {
            let next_in_lane = notes[i + 1..]
                .iter()
                .find(|n| n.lane == note.lane)
                .map(|n| n.time - note.time);
            let hold_for = match next_in_lane {
                Some(gap) => TAP_PRESS_DURATION_MS.min(gap / 2.0),
                None => TAP_PRESS_DURATION_MS,
            };
            note.time + hold_for
        };
        events.push(ScriptedEvent::release(note.lane, release_time));
    }

    events.sort_by(|a, b| {
        a.time_ms
            .total_cmp(&b.time_ms)
            .then(a.is_press().cmp(&b.is_press()))
    });
    events
}

/// [`InputSource`] that replays a script against the song position.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: Vec<ScriptedEvent>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(events: Vec<ScriptedEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    pub fn autoplay(notes: &[ChartNote]) -> Self {
        Self::new(generate_autoplay_events(notes))
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self, song_position_ms: f64) -> Vec<InputEvent> {
        let start = self.cursor;
        while self
            .events
            .get(self.cursor)
            .is_some_and(|e| e.time_ms <= song_position_ms)
        {
            self.cursor += 1;
        }
        self.events[start..self.cursor]
            .iter()
            .map(|e| e.event)
            .collect()
    }
}
