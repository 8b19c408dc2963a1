use anyhow::{Result, bail};
use lanebeat_types::{Color, Point, RenderTarget};

/// Recorded draw command for testing.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Polygon {
        points: Vec<Point>,
        color: Color,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Color,
    },
    Ellipse {
        center: Point,
        radius_x: f32,
        radius_y: f32,
        color: Color,
    },
    Text {
        text: String,
        position: Point,
        size: f32,
        color: Color,
    },
}

/// A RenderTarget that records draw commands instead of drawing.
/// Does not require a canvas or GPU.
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    width: f32,
    height: f32,
}

impl CommandRecorder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            commands: Vec::new(),
            width,
            height,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// All text drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn ellipses(&self) -> Vec<(Point, f32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Ellipse {
                    center, radius_x, ..
                } => Some((*center, *radius_x)),
                _ => None,
            })
            .collect()
    }
}

impl RenderTarget for CommandRecorder {
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) -> Result<()> {
        self.commands.push(DrawCommand::Clear(color));
        Ok(())
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) -> Result<()> {
        if points.len() < 3 {
            bail!("polygon needs at least 3 points, got {}", points.len());
        }
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, width: f32, color: Color) -> Result<()> {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
        Ok(())
    }

    fn fill_ellipse(
        &mut self,
        center: Point,
        radius_x: f32,
        radius_y: f32,
        color: Color,
    ) -> Result<()> {
        if !(radius_x.is_finite() && radius_y.is_finite()) || radius_x < 0.0 || radius_y < 0.0 {
            bail!("invalid ellipse radii: {radius_x} x {radius_y}");
        }
        self.commands.push(DrawCommand::Ellipse {
            center,
            radius_x,
            radius_y,
            color,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, position: Point, size: f32, color: Color) -> Result<()> {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            size,
            color,
        });
        Ok(())
    }
}
