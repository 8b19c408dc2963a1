use serde::{Deserialize, Serialize};

/// Number of fixed lane slots on the highway.
pub const LANE_SLOTS: usize = 5;

/// Lane offsets of the divider lines, edges included.
pub const DIVIDER_OFFSETS: [f32; 6] = [-1.0, -0.6, -0.2, 0.2, 0.6, 1.0];

/// Exponent of the depth ease applied to Y and scale.
const DEPTH_EASE: f32 = 0.9;

/// Depths a note is drawn at. Notes slightly past the hit line stay visible.
pub const DRAW_DEPTH_MIN: f32 = -0.2;
pub const DRAW_DEPTH_MAX: f32 = 1.0;

/// Center offset of a lane slot in [-1, 1].
///
/// The layout is fixed to five slots; difficulties that use fewer lanes
/// occupy a subset of them and are never re-centered.
pub fn lane_offset(lane: usize) -> f32 {
    (lane as f32 - 2.0) / 2.5
}

/// Convert time-until-hit into a normalized depth in [0, 1].
///
/// 0 is the hit line, 1 is the spawn horizon.
pub fn time_to_normalized_depth(time_until_hit_ms: f64, travel_time_ms: f64) -> f64 {
    raw_depth(time_until_hit_ms, travel_time_ms).clamp(0.0, 1.0)
}

/// Unclamped depth. Negative once a note has passed the hit line.
pub fn raw_depth(time_until_hit_ms: f64, travel_time_ms: f64) -> f64 {
    if !time_until_hit_ms.is_finite() || !travel_time_ms.is_finite() || travel_time_ms <= 0.0 {
        return 0.0;
    }
    time_until_hit_ms / travel_time_ms
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Screen geometry of the highway.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectorConfig {
    pub vanish_x: f32,
    pub horizon_y: f32,
    pub hit_y: f32,
    /// Half width of the highway at the hit line.
    pub hit_half_width: f32,
    /// Half width of the highway at the horizon.
    pub horizon_half_width: f32,
    pub focal_length: f32,
    pub highway_length: f32,
}

impl ProjectorConfig {
    pub fn for_canvas(width: f32, height: f32, orientation: Orientation) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        match orientation {
            Orientation::Landscape => {
                let hit_half_width = (width * 0.3).min(height * 0.6);
                Self {
                    vanish_x: width / 2.0,
                    horizon_y: height * 0.18,
                    hit_y: height * 0.86,
                    hit_half_width,
                    horizon_half_width: hit_half_width * 0.2,
                    focal_length: 300.0,
                    highway_length: 900.0,
                }
            }
            Orientation::Portrait => {
                let hit_half_width = width * 0.46;
                Self {
                    vanish_x: width / 2.0,
                    horizon_y: height * 0.12,
                    hit_y: height * 0.88,
                    hit_half_width,
                    horizon_half_width: hit_half_width * 0.16,
                    focal_length: 300.0,
                    highway_length: 1100.0,
                }
            }
        }
    }
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self::for_canvas(1280.0, 720.0, Orientation::Landscape)
    }
}

/// Projected screen position of a point on the highway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    /// Perspective shrink factor, 1.0 at the hit line.
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Projector {
    config: ProjectorConfig,
}

impl Projector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Map a lane offset in [-1, 1] and a normalized depth onto the screen.
    ///
    /// Y and scale follow the eased depth. X interpolates the half width
    /// linearly in depth so notes travel along the straight lane dividers.
    /// Depths slightly outside [0, 1] are accepted and extrapolated.
    pub fn project(&self, lane_offset: f32, depth: f32) -> Projected {
        let c = &self.config;
        let depth = if depth.is_finite() { depth } else { 0.0 };
        let lane_offset = if lane_offset.is_finite() {
            lane_offset
        } else {
            0.0
        };
        let eased = ease(depth);

        let y = c.hit_y + (c.horizon_y - c.hit_y) * eased;
        let x = c.vanish_x + lane_offset * self.half_width_at(depth);

        let denom = (c.focal_length + eased * c.highway_length).max(c.focal_length * 0.1);
        let scale = if denom > 0.0 { c.focal_length / denom } else { 1.0 };

        Projected { x, y, scale }
    }

    /// Half width of the highway at `depth`.
    pub fn half_width_at(&self, depth: f32) -> f32 {
        let c = &self.config;
        c.hit_half_width + (c.horizon_half_width - c.hit_half_width) * depth
    }
}

/// Sign-preserving ease so depths behind the hit line stay continuous.
fn ease(depth: f32) -> f32 {
    depth.signum() * depth.abs().powf(DEPTH_EASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn projector() -> Projector {
        Projector::new(ProjectorConfig::for_canvas(1280.0, 720.0, Orientation::Landscape))
    }

    #[test]
    fn origin_projects_to_hit_line() {
        let p = projector();
        let out = p.project(0.0, 0.0);
        assert_eq!(out.y, p.config().hit_y);
        assert_eq!(out.x, p.config().vanish_x);
        assert!((out.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn horizon_depth_projects_to_horizon() {
        let p = projector();
        let out = p.project(0.0, 1.0);
        assert!((out.y - p.config().horizon_y).abs() < 1e-3);
        assert!(out.scale < 0.5);
    }

    #[test]
    fn lane_offsets_fixed_five_slot_layout() {
        assert_eq!(lane_offset(2), 0.0);
        assert!((lane_offset(0) + 0.8).abs() < 1e-6);
        assert!((lane_offset(4) - 0.8).abs() < 1e-6);
        // Each lane center sits midway between its dividers.
        for lane in 0..LANE_SLOTS {
            let mid = (DIVIDER_OFFSETS[lane] + DIVIDER_OFFSETS[lane + 1]) / 2.0;
            assert!((lane_offset(lane) - mid).abs() < 1e-6);
        }
    }

    #[test]
    fn normalized_depth_endpoints_and_clamping() {
        assert_eq!(time_to_normalized_depth(1500.0, 1500.0), 1.0);
        assert_eq!(time_to_normalized_depth(0.0, 1500.0), 0.0);
        assert_eq!(time_to_normalized_depth(-300.0, 1500.0), 0.0);
        assert_eq!(time_to_normalized_depth(4000.0, 1500.0), 1.0);
        assert_eq!(time_to_normalized_depth(750.0, 1500.0), 0.5);
    }

    #[test]
    fn raw_depth_is_unclamped_and_total() {
        assert!((raw_depth(-300.0, 1500.0) + 0.2).abs() < 1e-12);
        assert_eq!(raw_depth(100.0, 0.0), 0.0);
        assert_eq!(raw_depth(f64::NAN, 1000.0), 0.0);
    }

    #[test]
    fn negative_depth_extends_below_hit_line() {
        let p = projector();
        let out = p.project(0.0, -0.2);
        assert!(out.y > p.config().hit_y);
        assert!(out.scale > 1.0);
    }

    #[test]
    fn edge_lane_sits_at_half_width() {
        let p = projector();
        for depth in [0.0, 0.5, 1.0] {
            let edge = p.project(1.0, depth);
            assert!((edge.x - p.config().vanish_x - p.half_width_at(depth)).abs() < 1e-3);
        }
        assert_eq!(p.half_width_at(0.0), p.config().hit_half_width);
        assert!((p.half_width_at(1.0) - p.config().horizon_half_width).abs() < 1e-3);
    }

    #[test]
    fn portrait_is_narrower_than_landscape() {
        let land = ProjectorConfig::for_canvas(1280.0, 720.0, Orientation::Landscape);
        let port = ProjectorConfig::for_canvas(720.0, 1280.0, Orientation::Portrait);
        assert!(port.hit_half_width < land.hit_half_width);
        assert_eq!(port.vanish_x, 360.0);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = ProjectorConfig::for_canvas(800.0, 600.0, Orientation::Portrait);
        let json = serde_json::to_string(&config).unwrap();
        let back: ProjectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    proptest! {
        #[test]
        fn edge_offsets_symmetric_about_vanishing_point(depth in -0.2f32..=1.1f32) {
            let p = projector();
            let left = p.project(-1.0, depth);
            let right = p.project(1.0, depth);
            let vx = p.config().vanish_x;
            prop_assert!(((vx - left.x) - (right.x - vx)).abs() < 1e-3);
            prop_assert_eq!(left.y, right.y);
        }

        #[test]
        fn y_moves_toward_horizon_with_depth(a in 0.0f32..1.0f32, b in 0.0f32..1.0f32) {
            prop_assume!(a < b);
            let p = projector();
            prop_assert!(p.project(0.0, b).y <= p.project(0.0, a).y);
            prop_assert!(p.project(0.0, b).scale <= p.project(0.0, a).scale);
        }

        #[test]
        fn normalized_depth_always_in_unit_range(t in -1.0e6f64..1.0e6f64, travel in 1.0f64..5000.0f64) {
            let d = time_to_normalized_depth(t, travel);
            prop_assert!((0.0..=1.0).contains(&d));
        }
    }
}
