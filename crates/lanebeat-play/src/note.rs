use lanebeat_chart::ChartNote;

/// A chart note plus its per-attempt runtime state.
///
/// Each attempt clones the notes of the selected track, so the shared chart
/// is never mutated. `is_hit` and `is_missed` are terminal and mutually
/// exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveNote {
    pub note: ChartNote,
    is_hit: bool,
    is_missed: bool,
    /// Fraction of the hold body consumed, clamped to [0, 1].
    pub hold_progress: f64,
    pub is_hold_active: bool,
    /// Raw depth of the head: 1 at the horizon, 0 at the hit line, negative past it.
    pub current_depth: f64,
}

impl LiveNote {
    pub fn new(note: ChartNote) -> Self {
        Self {
            note,
            is_hit: false,
            is_missed: false,
            hold_progress: 0.0,
            is_hold_active: false,
            current_depth: 1.0,
        }
    }

    pub fn time(&self) -> f64 {
        self.note.time
    }

    pub fn lane(&self) -> usize {
        self.note.lane
    }

    pub fn end_time(&self) -> f64 {
        self.note.end_time()
    }

    pub fn is_hold(&self) -> bool {
        self.note.is_hold()
    }

    pub fn is_hit(&self) -> bool {
        self.is_hit
    }

    pub fn is_missed(&self) -> bool {
        self.is_missed
    }

    /// Neither hit nor missed.
    pub fn is_active(&self) -> bool {
        !self.is_hit && !self.is_missed
    }

    /// Returns false if the note was already resolved.
    pub fn mark_hit(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.is_hit = true;
        self.is_hold_active = false;
        if self.is_hold() {
            self.hold_progress = 1.0;
        }
        true
    }

    /// Returns false if the note was already resolved.
    pub fn mark_missed(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.is_missed = true;
        self.is_hold_active = false;
        true
    }

    pub fn update_hold_progress(&mut self, song_position_ms: f64) {
        if !self.is_hold() {
            return;
        }
        let progress = (song_position_ms - self.note.time) / self.note.duration;
        self.hold_progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}
