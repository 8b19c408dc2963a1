use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Color with RGBA components (0.0..=1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Screen-space point in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Drawing context the highway is rendered into.
/// Implementations: canvas/GPU backends in the shell, CommandRecorder (testing).
pub trait RenderTarget {
    /// Canvas size in pixels.
    fn size(&self) -> (f32, f32);

    fn clear(&mut self, color: Color) -> Result<()>;

    fn fill_polygon(&mut self, points: &[Point], color: Color) -> Result<()>;

    fn draw_line(&mut self, from: Point, to: Point, width: f32, color: Color) -> Result<()>;

    fn fill_ellipse(&mut self, center: Point, radius_x: f32, radius_y: f32, color: Color)
    -> Result<()>;

    fn draw_text(&mut self, text: &str, position: Point, size: f32, color: Color) -> Result<()>;
}
