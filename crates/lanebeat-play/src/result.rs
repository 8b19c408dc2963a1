use lanebeat_chart::ChartMeta;
use serde::Serialize;

use crate::combo::{SessionScore, star_rating};

/// Summary of a finished attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayResult {
    pub title: String,
    pub artist: String,
    pub difficulty: String,
    pub score: u64,
    pub max_combo: u32,
    pub perfect_count: u32,
    pub great_count: u32,
    pub good_count: u32,
    pub miss_count: u32,
    pub early_count: u32,
    pub late_count: u32,
    pub accuracy: f64,
    pub stars: u8,
    pub max_possible_score: u64,
    pub full_combo: bool,
}

impl PlayResult {
    pub fn new(
        meta: &ChartMeta,
        difficulty: &str,
        score: &SessionScore,
        max_possible_score: u64,
    ) -> Self {
        let accuracy = score.accuracy();
        Self {
            title: meta.title.clone(),
            artist: meta.artist.clone(),
            difficulty: difficulty.to_string(),
            score: score.score,
            max_combo: score.max_combo,
            perfect_count: score.perfect_count,
            great_count: score.great_count,
            good_count: score.good_count,
            miss_count: score.miss_count,
            early_count: score.early_count,
            late_count: score.late_count,
            accuracy,
            stars: star_rating(score.score, max_possible_score, accuracy),
            max_possible_score,
            full_combo: score.miss_count == 0 && score.total_judged() > 0,
        }
    }

    pub fn total_judged(&self) -> u32 {
        self.perfect_count + self.great_count + self.good_count + self.miss_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ChartMeta {
        ChartMeta {
            title: "Ember Lanes".to_string(),
            artist: "Test Artist".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn full_combo_requires_no_misses() {
        let mut score = SessionScore::new();
        score.perfect_count = 10;
        score.score = 1000;
        score.max_combo = 10;
        let result = PlayResult::new(&meta(), "hard", &score, 1000);
        assert!(result.full_combo);
        assert_eq!(result.stars, 5);
        assert_eq!(result.accuracy, 100.0);
        assert_eq!(result.total_judged(), 10);

        score.miss_count = 1;
        assert!(!PlayResult::new(&meta(), "hard", &score, 1000).full_combo);
    }

    #[test]
    fn empty_attempt_is_not_full_combo() {
        let result = PlayResult::new(&meta(), "easy", &SessionScore::new(), 0);
        assert!(!result.full_combo);
        assert_eq!(result.stars, 0);
        assert_eq!(result.accuracy, 0.0);
    }

    #[test]
    fn serializes_to_json() {
        let result = PlayResult::new(&meta(), "easy", &SessionScore::new(), 0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["title"], "Ember Lanes");
        assert_eq!(json["difficulty"], "easy");
    }
}
