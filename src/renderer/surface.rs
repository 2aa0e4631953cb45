//! Drawing surface abstraction
//!
//! The simulations only ever talk to a [`Surface`]. The browser host backs it
//! with a 2D canvas context, headless runs and tests with a [`DrawList`].
//!
//! [`DrawList`]: super::DrawList

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit RGB color, serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// CSS `rgba()` string with the given opacity
    pub fn css(&self, alpha: f32) -> String {
        format!(
            "rgba({},{},{},{:.3})",
            self.0,
            self.1,
            self.2,
            alpha.clamp(0.0, 1.0)
        )
    }
}

/// Minimal 2D drawing context
///
/// Coordinates are in canvas pixels with the origin at the top-left corner
/// and y growing downward.
pub trait Surface {
    /// Current drawable width and height
    fn size(&self) -> Vec2;

    /// Erase the whole surface to transparent
    fn clear(&mut self);

    /// Paint the whole surface with a (usually translucent) color
    fn fill(&mut self, color: Rgb, alpha: f32);

    /// Filled circle
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);

    /// Straight line segment
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32);
}
