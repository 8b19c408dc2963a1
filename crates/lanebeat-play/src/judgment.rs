use log::debug;

use crate::combo::ComboEngine;
use crate::scheduler::NoteScheduler;

pub const PERFECT_WINDOW_MS: f64 = 60.0;
pub const GREAT_WINDOW_MS: f64 = 120.0;
pub const GOOD_WINDOW_MS: f64 = 180.0;
/// Widest offset at which a press is matched to a note at all.
pub const MISS_WINDOW_MS: f64 = 250.0;

/// Hold progress required for a release to count as a hit.
pub const HOLD_RELEASE_THRESHOLD: f64 = 0.5;

/// Judgment tier of a single note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Perfect,
    Great,
    Good,
    Miss,
}

struct TierInfo {
    base_score: u32,
    label: &'static str,
    accuracy_weight: f64,
    window_ms: f64,
}

const TIER_TABLE: [TierInfo; 4] = [
    TierInfo {
        base_score: 100,
        label: "PERFECT",
        accuracy_weight: 1.0,
        window_ms: PERFECT_WINDOW_MS,
    },
    TierInfo {
        base_score: 75,
        label: "GREAT",
        accuracy_weight: 0.75,
        window_ms: GREAT_WINDOW_MS,
    },
    TierInfo {
        base_score: 50,
        label: "GOOD",
        accuracy_weight: 0.5,
        window_ms: GOOD_WINDOW_MS,
    },
    TierInfo {
        base_score: 0,
        label: "MISS",
        accuracy_weight: 0.0,
        window_ms: MISS_WINDOW_MS,
    },
];

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Perfect, Tier::Great, Tier::Good, Tier::Miss];

    fn info(self) -> &'static TierInfo {
        &TIER_TABLE[self as usize]
    }

    pub fn base_score(self) -> u32 {
        self.info().base_score
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn accuracy_weight(self) -> f64 {
        self.info().accuracy_weight
    }

    /// Largest absolute offset classified as this tier.
    pub fn window_ms(self) -> f64 {
        self.info().window_ms
    }

    /// Classify a tap offset. `None` beyond the miss window.
    pub fn from_offset(offset_ms: f64) -> Option<Tier> {
        let abs = offset_ms.abs();
        Tier::ALL.into_iter().find(|tier| abs <= tier.window_ms())
    }

    /// Classify an offset, never worse than Good. Used for hold heads and tails.
    pub fn from_offset_lenient(offset_ms: f64) -> Tier {
        match Tier::from_offset(offset_ms) {
            Some(Tier::Perfect) => Tier::Perfect,
            Some(Tier::Great) => Tier::Great,
            _ => Tier::Good,
        }
    }
}

/// Whether a press landed before or after the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingDirection {
    Early,
    Exact,
    Late,
}

impl TimingDirection {
    const EXACT_THRESHOLD_MS: f64 = 1.0;

    /// `offset_ms` is song position minus note time.
    pub fn from_offset(offset_ms: f64) -> Self {
        if offset_ms < -Self::EXACT_THRESHOLD_MS {
            TimingDirection::Early
        } else if offset_ms > Self::EXACT_THRESHOLD_MS {
            TimingDirection::Late
        } else {
            TimingDirection::Exact
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgmentKind {
    Tap,
    /// Hold head accepted; points only, the hold resolves later.
    HoldHead,
    HoldRelease,
    /// Hold kept past its tail and completed without a release.
    HoldComplete,
    /// Note passed the hit line unplayed.
    Expired,
}

/// Outcome of judging one note event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judgment {
    pub lane: usize,
    pub tier: Tier,
    pub kind: JudgmentKind,
    /// Song position minus the reference time (head or tail).
    pub offset_ms: f64,
    pub points: u64,
    pub combo_broken: bool,
    /// The star-power meter just became activatable.
    pub star_power_ready: bool,
}

impl Judgment {
    pub fn is_miss(&self) -> bool {
        self.tier == Tier::Miss
    }
}

/// Result of a lane press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PressResult {
    /// Lane index out of range.
    Ignored,
    /// No note to play in the lane. Feedback only.
    Thump { lane: usize },
    Judged(Judgment),
    /// A hold was armed; the judgment carries the head points.
    HoldArmed(Judgment),
}

/// Resolves presses and releases against the live notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JudgmentEngine;

impl JudgmentEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn on_press(
        &self,
        notes: &mut NoteScheduler,
        combo: &mut ComboEngine,
        lane: usize,
        song_position_ms: f64,
    ) -> PressResult {
        if lane >= lanebeat_chart::LANE_COUNT {
            return PressResult::Ignored;
        }
        let Some(index) = notes.find_press_candidate(lane, song_position_ms) else {
            return PressResult::Thump { lane };
        };
        let Some(note) = notes.note_mut(index) else {
            return PressResult::Thump { lane };
        };

        let offset_ms = song_position_ms - note.time();

        if note.is_hold() {
            let tier = Tier::from_offset_lenient(offset_ms);
            note.is_hold_active = true;
            note.update_hold_progress(song_position_ms);
            let points = combo.points_for(tier);
            combo.add_points(points);
            debug!("hold armed lane={lane} tier={tier:?} offset={offset_ms:.1} +{points}");
            return PressResult::HoldArmed(Judgment {
                lane,
                tier,
                kind: JudgmentKind::HoldHead,
                offset_ms,
                points,
                combo_broken: false,
                star_power_ready: false,
            });
        }

        let tier = Tier::from_offset(offset_ms).unwrap_or(Tier::Miss);
        let is_star_power = note.note.is_star_power;
        let update = if tier == Tier::Miss {
            note.mark_missed();
            combo.register_miss()
        } else {
            note.mark_hit();
            combo.register_hit(tier, offset_ms, is_star_power)
        };
        debug!(
            "tap lane={lane} tier={tier:?} offset={offset_ms:.1} +{}",
            update.points
        );
        PressResult::Judged(Judgment {
            lane,
            tier,
            kind: JudgmentKind::Tap,
            offset_ms,
            points: update.points,
            combo_broken: update.combo_broken,
            star_power_ready: update.star_power_ready,
        })
    }

    /// Finalize the armed hold in `lane`, if any.
    pub fn on_release(
        &self,
        notes: &mut NoteScheduler,
        combo: &mut ComboEngine,
        lane: usize,
        song_position_ms: f64,
    ) -> Option<Judgment> {
        let index = notes.armed_hold(lane)?;
        let note = notes.note_mut(index)?;

        note.update_hold_progress(song_position_ms);
        let offset_ms = song_position_ms - note.end_time();
        let progress = note.hold_progress;
        let is_star_power = note.note.is_star_power;

        let (tier, update) = if progress < HOLD_RELEASE_THRESHOLD {
            note.mark_missed();
            (Tier::Miss, combo.register_miss())
        } else {
            let tier = Tier::from_offset_lenient(offset_ms);
            note.mark_hit();
            (tier, combo.register_hit(tier, offset_ms, is_star_power))
        };
        debug!(
            "hold release lane={lane} progress={progress:.2} tier={tier:?} +{}",
            update.points
        );
        Some(Judgment {
            lane,
            tier,
            kind: JudgmentKind::HoldRelease,
            offset_ms,
            points: update.points,
            combo_broken: update.combo_broken,
            star_power_ready: update.star_power_ready,
        })
    }
}
