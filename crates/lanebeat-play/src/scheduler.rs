//! Spawning, miss detection and retirement of live notes.

use lanebeat_chart::ChartNote;
use lanebeat_render::raw_depth;
use log::debug;

use crate::combo::ComboEngine;
use crate::judgment::{GOOD_WINDOW_MS, Judgment, JudgmentKind, MISS_WINDOW_MS, Tier};
use crate::note::LiveNote;

/// Depth behind the hit line at which resolved notes leave the live set.
pub const RETIRE_DEPTH: f64 = -0.2;

/// Owns the notes of one attempt and moves them through their lifecycle.
#[derive(Debug, Clone)]
pub struct NoteScheduler {
    chart_notes: Vec<ChartNote>,
    /// Next chart note to spawn. Never rewound within an attempt.
    next_spawn: usize,
    live: Vec<LiveNote>,
    travel_time_ms: f64,
}

impl NoteScheduler {
    /// `notes` must already be sorted by time, as `NoteTrack` guarantees.
    pub fn new(notes: &[ChartNote], travel_time_ms: f64) -> Self {
        Self {
            chart_notes: notes.to_vec(),
            next_spawn: 0,
            live: Vec::new(),
            travel_time_ms,
        }
    }

    pub fn travel_time_ms(&self) -> f64 {
        self.travel_time_ms
    }

    pub fn live(&self) -> &[LiveNote] {
        &self.live
    }

    pub fn note_mut(&mut self, index: usize) -> Option<&mut LiveNote> {
        self.live.get_mut(index)
    }

    pub fn total_notes(&self) -> usize {
        self.chart_notes.len()
    }

    pub fn all_spawned(&self) -> bool {
        self.next_spawn >= self.chart_notes.len()
    }

    pub fn last_note_end(&self) -> f64 {
        self.chart_notes
            .iter()
            .map(ChartNote::end_time)
            .fold(0.0, f64::max)
    }

    /// Spawn every note whose horizon time has been reached. Returns the count.
    pub fn spawn_due(&mut self, song_position_ms: f64) -> usize {
        let start = self.next_spawn;
        while let Some(note) = self.chart_notes.get(self.next_spawn) {
            if note.time - self.travel_time_ms > song_position_ms {
                break;
            }
            self.live.push(LiveNote::new(*note));
            self.next_spawn += 1;
        }
        let spawned = self.next_spawn - start;
        if spawned > 0 {
            debug!("spawned {spawned} notes at {song_position_ms:.1}ms");
        }
        spawned
    }

    pub fn update_depths(&mut self, song_position_ms: f64) {
        let travel = self.travel_time_ms;
        for note in &mut self.live {
            note.current_depth = raw_depth(note.time() - song_position_ms, travel);
        }
    }

    /// Expire unplayed notes and advance armed holds.
    ///
    /// Taps miss 250 ms after their time. Unarmed holds miss once the tail plus
    /// the Good window has passed. Armed holds complete as Perfect at the same
    /// point without a release.
    pub fn detect_misses(&mut self, song_position_ms: f64, combo: &mut ComboEngine) -> Vec<Judgment> {
        let mut judgments = Vec::new();
        for note in self.live.iter_mut().filter(|n| n.is_active()) {
            let late_by = song_position_ms - note.time();

            if note.is_hold_active {
                note.update_hold_progress(song_position_ms);
                if song_position_ms >= note.end_time() + GOOD_WINDOW_MS {
                    note.mark_hit();
                    let update = combo.register_hit(Tier::Perfect, 0.0, note.note.is_star_power);
                    judgments.push(Judgment {
                        lane: note.lane(),
                        tier: Tier::Perfect,
                        kind: JudgmentKind::HoldComplete,
                        offset_ms: song_position_ms - note.end_time(),
                        points: update.points,
                        combo_broken: false,
                        star_power_ready: update.star_power_ready,
                    });
                }
                continue;
            }

            let threshold = if note.is_hold() {
                note.note.duration + GOOD_WINDOW_MS
            } else {
                MISS_WINDOW_MS
            };
            if late_by > threshold {
                note.mark_missed();
                let update = combo.register_miss();
                judgments.push(Judgment {
                    lane: note.lane(),
                    tier: Tier::Miss,
                    kind: JudgmentKind::Expired,
                    offset_ms: late_by,
                    points: 0,
                    combo_broken: update.combo_broken,
                    star_power_ready: false,
                });
            }
        }
        judgments
    }

    /// Drop resolved notes that have scrolled past the retire depth.
    /// Returns the number removed.
    pub fn retire(&mut self) -> usize {
        let before = self.live.len();
        self.live
            .retain(|n| n.is_active() || n.current_depth >= RETIRE_DEPTH);
        before - self.live.len()
    }

    /// Index of the note a press in `lane` should judge, nearest in time.
    pub fn find_press_candidate(&self, lane: usize, song_position_ms: f64) -> Option<usize> {
        let lane_holding = self.armed_hold(lane).is_some();
        self.live
            .iter()
            .enumerate()
            .filter(|(_, n)| n.lane() == lane && n.is_active() && !n.is_hold_active)
            .filter(|(_, n)| {
                if n.is_hold() {
                    !lane_holding
                        && song_position_ms >= n.time() - MISS_WINDOW_MS
                        && song_position_ms <= n.end_time() + GOOD_WINDOW_MS
                } else {
                    (song_position_ms - n.time()).abs() <= MISS_WINDOW_MS
                }
            })
            .min_by(|(_, a), (_, b)| {
                (a.time() - song_position_ms)
                    .abs()
                    .total_cmp(&(b.time() - song_position_ms).abs())
            })
            .map(|(i, _)| i)
    }

    pub fn armed_hold(&self, lane: usize) -> Option<usize> {
        self.live
            .iter()
            .position(|n| n.lane() == lane && n.is_hold_active && n.is_active())
    }

    /// Lanes with an armed hold.
    pub fn armed_lanes(&self) -> Vec<usize> {
        self.live
            .iter()
            .filter(|n| n.is_hold_active && n.is_active())
            .map(LiveNote::lane)
            .collect()
    }
}
