//! `CanvasRenderingContext2d` backed surface (browser only)

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::{Rgb, Surface};

pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    /// Acquire the 2D context of a canvas, `None` if the browser refuses
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the given CSS size
    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill(&mut self, color: Rgb, alpha: f32) {
        let size = self.size();
        self.ctx.set_fill_style_str(&color.css(alpha));
        self.ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.ctx.begin_path();
        // arc() only fails for a negative radius
        let _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU);
        self.ctx.close_path();
        self.ctx.set_fill_style_str(&color.css(alpha));
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgb, alpha: f32) {
        self.ctx.begin_path();
        self.ctx.set_line_width(width as f64);
        self.ctx.set_stroke_style_str(&color.css(alpha));
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }
}
