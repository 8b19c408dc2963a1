use lanebeat_chart::{LANE_COUNT, NoteTrack};
use lanebeat_render::{HighwayFrame, HudInfo, NoteSprite, raw_depth};
use log::info;

use crate::combo::{ComboEngine, SessionScore, max_possible_score};
use crate::judgment::{Judgment, JudgmentEngine, PressResult};
use crate::scheduler::NoteScheduler;

/// State of one song attempt: live notes, judging and scoring.
///
/// Created fresh for every attempt so nothing carries over between plays.
#[derive(Debug, Clone)]
pub struct PlaySession {
    difficulty: String,
    scheduler: NoteScheduler,
    combo: ComboEngine,
    judge: JudgmentEngine,
    max_possible_score: u64,
    song_end_buffer_ms: f64,
}

impl PlaySession {
    pub fn new(
        track: &NoteTrack,
        difficulty: impl Into<String>,
        travel_time_ms: f64,
        song_end_buffer_ms: f64,
    ) -> Self {
        let difficulty = difficulty.into();
        let scheduler = NoteScheduler::new(track.notes(), travel_time_ms);
        let max_possible_score = max_possible_score(track.notes());
        info!(
            "session start: difficulty={difficulty} notes={} travel={travel_time_ms}ms max_score={max_possible_score}",
            track.len()
        );
        Self {
            difficulty,
            scheduler,
            combo: ComboEngine::new(),
            judge: JudgmentEngine::new(),
            max_possible_score,
            song_end_buffer_ms,
        }
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    pub fn travel_time_ms(&self) -> f64 {
        self.scheduler.travel_time_ms()
    }

    pub fn score(&self) -> &SessionScore {
        self.combo.score()
    }

    pub fn scheduler(&self) -> &NoteScheduler {
        &self.scheduler
    }

    pub fn max_possible_score(&self) -> u64 {
        self.max_possible_score
    }

    /// Spawn and position notes without judging. Used during the countdown.
    pub fn prepare(&mut self, song_position_ms: f64) {
        self.scheduler.spawn_due(song_position_ms);
        self.scheduler.update_depths(song_position_ms);
    }

    /// One playing step: spawn, depth, expiry and hold advance, retire.
    pub fn advance(&mut self, song_position_ms: f64) -> Vec<Judgment> {
        self.prepare(song_position_ms);
        let judged = self
            .scheduler
            .detect_misses(song_position_ms, &mut self.combo);
        self.scheduler.retire();
        judged
    }

    pub fn handle_press(&mut self, lane: usize, song_position_ms: f64) -> PressResult {
        self.judge
            .on_press(&mut self.scheduler, &mut self.combo, lane, song_position_ms)
    }

    pub fn handle_release(&mut self, lane: usize, song_position_ms: f64) -> Option<Judgment> {
        if lane >= LANE_COUNT {
            return None;
        }
        self.judge
            .on_release(&mut self.scheduler, &mut self.combo, lane, song_position_ms)
    }

    pub fn activate_star_power(&mut self) -> bool {
        self.combo.activate_star_power()
    }

    /// Returns true if star power ran out during this step.
    pub fn drain_star_power(&mut self, delta_ms: f64) -> bool {
        self.combo.drain_star_power(delta_ms)
    }

    pub fn armed_lanes(&self) -> Vec<usize> {
        self.scheduler.armed_lanes()
    }

    /// Song end: every note spawned and the last tail plus the buffer reached.
    pub fn is_finished(&self, song_position_ms: f64) -> bool {
        self.scheduler.all_spawned()
            && song_position_ms >= self.scheduler.last_note_end() + self.song_end_buffer_ms
    }

    /// Visible notes and HUD values for the renderer.
    pub fn highway_frame(&self, song_position_ms: f64) -> HighwayFrame {
        let travel = self.travel_time_ms();
        let notes = self
            .scheduler
            .live()
            .iter()
            .filter(|n| n.is_active())
            .map(|n| NoteSprite {
                lane: n.lane(),
                depth: n.current_depth as f32,
                tail_depth: n
                    .is_hold()
                    .then(|| raw_depth(n.end_time() - song_position_ms, travel) as f32),
                is_star_power: n.note.is_star_power,
                hold_active: n.is_hold_active,
            })
            .collect();

        let score = self.score();
        HighwayFrame {
            notes,
            hud: HudInfo {
                score: score.score,
                combo: score.combo,
                multiplier: score.base_multiplier,
                star_power_meter: score.star_power_meter as f32,
                star_power_active: score.star_power_active,
            },
            ..Default::default()
        }
    }
}
