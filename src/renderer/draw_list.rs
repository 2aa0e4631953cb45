//! Recording surface
//!
//! Stores every draw call instead of rasterizing. Used by the native runner
//! and by tests to observe what a frame would have drawn.

use glam::Vec2;

use super::surface::{Rgb, Surface};

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Fill {
        color: Rgb,
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Rgb,
        alpha: f32,
    },
}

/// Surface that records commands for the current frame
#[derive(Debug, Clone)]
pub struct DrawList {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Drop recorded commands (the size is kept)
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }
}

impl Surface for DrawList {
    fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn clear(&mut self) {
        // A clear wipes everything drawn before it
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill(&mut self, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Fill { color, alpha });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
            alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_discards_previous_frame() {
        let mut list = DrawList::new(100.0, 50.0);
        list.fill_circle(Vec2::ONE, 2.0, Rgb::WHITE, 1.0);
        list.stroke_line(Vec2::ZERO, Vec2::ONE, 1.0, Rgb::WHITE, 0.5);
        assert_eq!(list.circles().count(), 1);
        assert_eq!(list.lines().count(), 1);

        list.clear();
        assert_eq!(list.commands, vec![DrawCommand::Clear]);
        assert_eq!(list.size(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_fill_accumulates() {
        let mut list = DrawList::new(10.0, 10.0);
        list.fill(Rgb::BLACK, 0.3);
        list.fill(Rgb::BLACK, 0.3);
        assert_eq!(list.commands.len(), 2);
    }
}
