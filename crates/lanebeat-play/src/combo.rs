use lanebeat_chart::ChartNote;
use log::{debug, info};
use serde::Serialize;

use crate::judgment::{Tier, TimingDirection};

/// Scoring hits needed per multiplier step.
pub const MULTIPLIER_STEP_HITS: u32 = 10;
pub const MAX_MULTIPLIER: u32 = 4;
/// Flat bonus added to a hit's base score while star power is active.
pub const STAR_POWER_BONUS: u32 = 25;
pub const STAR_POWER_GAIN: f64 = 0.2;
pub const STAR_POWER_ACTIVATION_THRESHOLD: f64 = 0.5;
/// Time for a full meter to drain once activated.
pub const STAR_POWER_DURATION_MS: f64 = 16_000.0;

const STAR_THRESHOLDS: [f64; 5] = [0.95, 0.85, 0.70, 0.50, 0.30];

/// Score and combo state of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionScore {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub base_multiplier: u32,
    pub notes_since_multiplier_step: u32,
    pub perfect_count: u32,
    pub great_count: u32,
    pub good_count: u32,
    pub miss_count: u32,
    pub early_count: u32,
    pub late_count: u32,
    pub star_power_meter: f64,
    pub star_power_active: bool,
}

impl Default for SessionScore {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            max_combo: 0,
            base_multiplier: 1,
            notes_since_multiplier_step: 0,
            perfect_count: 0,
            great_count: 0,
            good_count: 0,
            miss_count: 0,
            early_count: 0,
            late_count: 0,
            star_power_meter: 0.0,
            star_power_active: false,
        }
    }
}

impl SessionScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effective_multiplier(&self) -> u32 {
        if self.star_power_active {
            self.base_multiplier * 2
        } else {
            self.base_multiplier
        }
    }

    pub fn count(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Perfect => self.perfect_count,
            Tier::Great => self.great_count,
            Tier::Good => self.good_count,
            Tier::Miss => self.miss_count,
        }
    }

    pub fn total_judged(&self) -> u32 {
        self.perfect_count + self.great_count + self.good_count + self.miss_count
    }

    /// Weighted accuracy percentage; 0 when nothing has been judged.
    pub fn accuracy(&self) -> f64 {
        let total = self.total_judged();
        if total == 0 {
            return 0.0;
        }
        let weighted: f64 = Tier::ALL
            .iter()
            .map(|&tier| self.count(tier) as f64 * tier.accuracy_weight())
            .sum();
        weighted / total as f64 * 100.0
    }

    pub fn can_activate_star_power(&self) -> bool {
        !self.star_power_active && self.star_power_meter >= STAR_POWER_ACTIVATION_THRESHOLD
    }

    fn increment_count(&mut self, tier: Tier) {
        match tier {
            Tier::Perfect => self.perfect_count += 1,
            Tier::Great => self.great_count += 1,
            Tier::Good => self.good_count += 1,
            Tier::Miss => self.miss_count += 1,
        }
    }
}

/// 0-5 stars from a blend of score ratio and accuracy.
pub fn star_rating(score: u64, max_possible_score: u64, accuracy: f64) -> u8 {
    let ratio = if max_possible_score == 0 {
        0.0
    } else {
        (score as f64 / max_possible_score as f64).clamp(0.0, 1.0)
    };
    let blended = 0.6 * ratio + 0.4 * (accuracy / 100.0).clamp(0.0, 1.0);
    let below = STAR_THRESHOLDS
        .iter()
        .position(|&threshold| blended >= threshold)
        .unwrap_or(STAR_THRESHOLDS.len());
    (STAR_THRESHOLDS.len() - below) as u8
}

/// Score of an all-Perfect run without star power.
///
/// Replays the run in time order. A hold head adds points at its start time
/// without stepping the multiplier; its tail scores and steps at the end time,
/// so hits inside a long hold raise the multiplier its tail is scored at.
pub fn max_possible_score(notes: &[ChartNote]) -> u64 {
    // (time, steps the multiplier)
    let mut events: Vec<(f64, bool)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        if note.is_hold() {
            events.push((note.time, false));
            events.push((note.end_time(), true));
        } else {
            events.push((note.time, true));
        }
    }
    events.sort_by(|a, b| a.0.total_cmp(&b.0));

    let perfect = u64::from(Tier::Perfect.base_score());
    let mut multiplier = 1u64;
    let mut steps = 0u32;
    let mut total = 0u64;
    for (_, scoring_hit) in events {
        total += perfect * multiplier;
        if !scoring_hit {
            continue;
        }
        steps += 1;
        if steps >= MULTIPLIER_STEP_HITS {
            steps = 0;
            multiplier = (multiplier + 1).min(u64::from(MAX_MULTIPLIER));
        }
    }
    total
}

/// Side effects of a registered hit or miss.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComboUpdate {
    pub points: u64,
    pub combo_broken: bool,
    pub star_power_ready: bool,
}

/// Combo, multiplier and star-power bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ComboEngine {
    score: SessionScore,
}

impl ComboEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> &SessionScore {
        &self.score
    }

    pub fn reset(&mut self) {
        self.score = SessionScore::default();
    }

    /// Points a hit of `tier` is worth right now.
    pub fn points_for(&self, tier: Tier) -> u64 {
        if tier == Tier::Miss {
            return 0;
        }
        let bonus = if self.score.star_power_active {
            STAR_POWER_BONUS
        } else {
            0
        };
        u64::from(tier.base_score() + bonus) * u64::from(self.score.effective_multiplier())
    }

    /// Add points with no combo or statistic effect.
    pub fn add_points(&mut self, points: u64) {
        self.score.score += points;
    }

    /// Register a scoring hit. Points use the multiplier before this hit's step.
    pub fn register_hit(&mut self, tier: Tier, offset_ms: f64, is_star_power: bool) -> ComboUpdate {
        if tier == Tier::Miss {
            return self.register_miss();
        }
        let points = self.points_for(tier);
        let s = &mut self.score;
        s.score += points;
        s.increment_count(tier);
        match TimingDirection::from_offset(offset_ms) {
            TimingDirection::Early => s.early_count += 1,
            TimingDirection::Late => s.late_count += 1,
            TimingDirection::Exact => {}
        }

        s.combo += 1;
        s.max_combo = s.max_combo.max(s.combo);
        s.notes_since_multiplier_step += 1;
        if s.notes_since_multiplier_step >= MULTIPLIER_STEP_HITS {
            s.notes_since_multiplier_step = 0;
            if s.base_multiplier < MAX_MULTIPLIER {
                s.base_multiplier += 1;
                debug!("multiplier up: x{}", s.base_multiplier);
            }
        }

        let mut star_power_ready = false;
        if is_star_power {
            let was_ready = s.can_activate_star_power();
            s.star_power_meter = (s.star_power_meter + STAR_POWER_GAIN).min(1.0);
            star_power_ready = !was_ready && s.can_activate_star_power();
        }

        ComboUpdate {
            points,
            combo_broken: false,
            star_power_ready,
        }
    }

    /// Register a miss. Star power protects combo and multiplier.
    pub fn register_miss(&mut self) -> ComboUpdate {
        let s = &mut self.score;
        s.miss_count += 1;
        if s.star_power_active {
            return ComboUpdate::default();
        }
        let combo_broken = s.combo > 0;
        s.combo = 0;
        s.base_multiplier = 1;
        s.notes_since_multiplier_step = 0;
        ComboUpdate {
            points: 0,
            combo_broken,
            star_power_ready: false,
        }
    }

    /// Returns true if star power was activated.
    pub fn activate_star_power(&mut self) -> bool {
        if !self.score.can_activate_star_power() {
            return false;
        }
        self.score.star_power_active = true;
        info!(
            "star power activated (meter {:.2})",
            self.score.star_power_meter
        );
        true
    }

    /// Drain an active meter. Returns true if star power just ran out.
    pub fn drain_star_power(&mut self, delta_ms: f64) -> bool {
        let s = &mut self.score;
        if !s.star_power_active || !delta_ms.is_finite() || delta_ms <= 0.0 {
            return false;
        }
        s.star_power_meter = (s.star_power_meter - delta_ms / STAR_POWER_DURATION_MS).max(0.0);
        if s.star_power_meter <= 0.0 {
            s.star_power_meter = 0.0;
            s.star_power_active = false;
            debug!("star power depleted");
            return true;
        }
        false
    }
}
