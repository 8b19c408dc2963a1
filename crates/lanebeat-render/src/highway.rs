use anyhow::Result;
use lanebeat_types::{Color, Point, RenderTarget};

use crate::projector::{
    DIVIDER_OFFSETS, DRAW_DEPTH_MAX, DRAW_DEPTH_MIN, LANE_SLOTS, Projector, lane_offset,
};

/// Samples per lane divider. Dividers are polylines through the projector so
/// they bend with the same ease as the notes.
const DIVIDER_SAMPLES: usize = 12;

/// How long a judgment label stays on screen.
const JUDGMENT_FLASH_MS: f64 = 450.0;

/// One visible note, already reduced to highway coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteSprite {
    pub lane: usize,
    /// Raw depth of the head; negative once past the hit line.
    pub depth: f32,
    /// Raw depth of the tail for hold notes.
    pub tail_depth: Option<f32>,
    pub is_star_power: bool,
    pub hold_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudInfo {
    pub score: u64,
    pub combo: u32,
    /// Base multiplier; the HUD doubles it while star power is active.
    pub multiplier: u32,
    pub star_power_meter: f32,
    pub star_power_active: bool,
}

impl Default for HudInfo {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            multiplier: 1,
            star_power_meter: 0.0,
            star_power_active: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentFlash {
    pub label: &'static str,
    pub age_ms: f64,
}

/// Everything the highway needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighwayFrame {
    pub notes: Vec<NoteSprite>,
    pub held_lanes: [bool; LANE_SLOTS],
    pub hud: HudInfo,
    pub judgment: Option<JudgmentFlash>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighwayStyle {
    pub background: Color,
    pub surface: Color,
    pub divider: Color,
    pub hit_line: Color,
    pub lane_colors: [Color; LANE_SLOTS],
    pub star_power: Color,
    pub hud_text: Color,
    /// Gem radius at the hit line, as a fraction of the hit-line half width.
    pub gem_radius: f32,
}

impl Default for HighwayStyle {
    fn default() -> Self {
        Self {
            background: Color::new(0.02, 0.02, 0.05, 1.0),
            surface: Color::new(0.08, 0.08, 0.12, 1.0),
            divider: Color::new(0.35, 0.35, 0.45, 1.0),
            hit_line: Color::new(1.0, 1.0, 1.0, 0.9),
            lane_colors: [
                Color::new(0.2, 0.85, 0.3, 1.0), // green
                Color::new(0.95, 0.25, 0.25, 1.0), // red
                Color::new(1.0, 0.9, 0.2, 1.0), // yellow
                Color::new(0.25, 0.5, 1.0, 1.0), // blue
                Color::new(1.0, 0.55, 0.1, 1.0), // orange
            ],
            star_power: Color::new(0.4, 0.9, 1.0, 1.0),
            hud_text: Color::WHITE,
            gem_radius: 0.16,
        }
    }
}

/// Draws a [`HighwayFrame`] through any [`RenderTarget`].
pub struct HighwayRenderer {
    projector: Projector,
    style: HighwayStyle,
}

impl HighwayRenderer {
    pub fn new(projector: Projector) -> Self {
        Self::with_style(projector, HighwayStyle::default())
    }

    pub fn with_style(projector: Projector, style: HighwayStyle) -> Self {
        Self { projector, style }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn draw(&self, frame: &HighwayFrame, target: &mut impl RenderTarget) -> Result<()> {
        target.clear(self.style.background)?;
        self.draw_surface(target)?;
        self.draw_dividers(target)?;
        self.draw_hit_line(frame, target)?;
        self.draw_hold_bodies(frame, target)?;
        self.draw_gems(frame, target)?;
        self.draw_hud(frame, target)?;
        self.draw_judgment(frame, target)
    }

    fn point(&self, offset: f32, depth: f32) -> Point {
        let p = self.projector.project(offset, depth);
        Point::new(p.x, p.y)
    }

    fn gem_radius(&self, scale: f32) -> f32 {
        self.projector.config().hit_half_width * self.style.gem_radius * scale
    }

    fn draw_surface(&self, target: &mut impl RenderTarget) -> Result<()> {
        let corners = [
            self.point(-1.0, 0.0),
            self.point(1.0, 0.0),
            self.point(1.0, 1.0),
            self.point(-1.0, 1.0),
        ];
        target.fill_polygon(&corners, self.style.surface)
    }

    fn draw_dividers(&self, target: &mut impl RenderTarget) -> Result<()> {
        for &offset in &DIVIDER_OFFSETS {
            let mut prev = self.point(offset, 0.0);
            for i in 1..=DIVIDER_SAMPLES {
                let depth = i as f32 / DIVIDER_SAMPLES as f32;
                let next = self.point(offset, depth);
                target.draw_line(prev, next, 1.5, self.style.divider)?;
                prev = next;
            }
        }
        Ok(())
    }

    fn draw_hit_line(&self, frame: &HighwayFrame, target: &mut impl RenderTarget) -> Result<()> {
        target.draw_line(
            self.point(-1.0, 0.0),
            self.point(1.0, 0.0),
            3.0,
            self.style.hit_line,
        )?;
        for (lane, _) in frame.held_lanes.iter().enumerate().filter(|(_, held)| **held) {
            let radius = self.gem_radius(1.0) * 1.1;
            target.fill_ellipse(
                self.point(lane_offset(lane), 0.0),
                radius,
                radius * 0.4,
                self.style.lane_colors[lane].with_alpha(0.5),
            )?;
        }
        Ok(())
    }

    fn note_color(&self, sprite: &NoteSprite) -> Color {
        if sprite.is_star_power {
            self.style.star_power
        } else {
            self.style.lane_colors[sprite.lane]
        }
    }

    fn draw_hold_bodies(&self, frame: &HighwayFrame, target: &mut impl RenderTarget) -> Result<()> {
        for sprite in frame.notes.iter().filter(|s| s.lane < LANE_SLOTS) {
            let Some(tail) = sprite.tail_depth else {
                continue;
            };
            // An armed hold is consumed from the hit line upward.
            let head = if sprite.hold_active {
                sprite.depth.max(0.0)
            } else {
                sprite.depth
            };
            let head = head.clamp(DRAW_DEPTH_MIN, DRAW_DEPTH_MAX);
            let tail = tail.clamp(DRAW_DEPTH_MIN, DRAW_DEPTH_MAX);
            if tail <= head {
                continue;
            }

            let center = lane_offset(sprite.lane);
            let head_p = self.projector.project(center, head);
            let tail_p = self.projector.project(center, tail);
            let head_w = self.gem_radius(head_p.scale) * 0.35;
            let tail_w = self.gem_radius(tail_p.scale) * 0.35;
            let body = [
                Point::new(head_p.x - head_w, head_p.y),
                Point::new(head_p.x + head_w, head_p.y),
                Point::new(tail_p.x + tail_w, tail_p.y),
                Point::new(tail_p.x - tail_w, tail_p.y),
            ];
            let alpha = if sprite.hold_active { 0.95 } else { 0.7 };
            target.fill_polygon(&body, self.note_color(sprite).with_alpha(alpha))?;
        }
        Ok(())
    }

    fn draw_gems(&self, frame: &HighwayFrame, target: &mut impl RenderTarget) -> Result<()> {
        // Far notes first so nearer gems overlap them.
        let mut sprites: Vec<&NoteSprite> = frame
            .notes
            .iter()
            .filter(|s| s.lane < LANE_SLOTS && !s.hold_active)
            .collect();
        sprites.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for sprite in sprites {
            let depth = sprite.depth.clamp(DRAW_DEPTH_MIN, DRAW_DEPTH_MAX);
            let p = self.projector.project(lane_offset(sprite.lane), depth);
            let radius = self.gem_radius(p.scale);
            target.fill_ellipse(
                Point::new(p.x, p.y),
                radius,
                radius * 0.45,
                self.note_color(sprite),
            )?;
        }
        Ok(())
    }

    fn draw_hud(&self, frame: &HighwayFrame, target: &mut impl RenderTarget) -> Result<()> {
        let hud = &frame.hud;
        let (width, _) = target.size();
        let color = self.style.hud_text;

        target.draw_text(&format!("SCORE {}", hud.score), Point::new(16.0, 32.0), 24.0, color)?;
        target.draw_text(&format!("COMBO {}", hud.combo), Point::new(16.0, 60.0), 20.0, color)?;
        let multiplier = if hud.star_power_active {
            hud.multiplier * 2
        } else {
            hud.multiplier
        };
        target.draw_text(
            &format!("x{multiplier}"),
            Point::new(width - 72.0, 32.0),
            24.0,
            if hud.star_power_active {
                self.style.star_power
            } else {
                color
            },
        )?;

        let meter = hud.star_power_meter.clamp(0.0, 1.0);
        if meter > 0.0 {
            let (x, y, w, h) = (width - 176.0, 48.0, 160.0 * meter, 8.0);
            let bar = [
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ];
            target.fill_polygon(&bar, self.style.star_power)?;
        }
        Ok(())
    }

    fn draw_judgment(&self, frame: &HighwayFrame, target: &mut impl RenderTarget) -> Result<()> {
        let Some(flash) = &frame.judgment else {
            return Ok(());
        };
        if flash.age_ms >= JUDGMENT_FLASH_MS {
            return Ok(());
        }
        let alpha = (1.0 - flash.age_ms.max(0.0) / JUDGMENT_FLASH_MS) as f32;
        let anchor = self.point(0.0, 0.25);
        target.draw_text(
            flash.label,
            Point::new(anchor.x - 40.0, anchor.y),
            28.0,
            self.style.hud_text.with_alpha(alpha),
        )
    }
}
