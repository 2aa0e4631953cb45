//! Particle field: drifting dots joined by proximity lines
//!
//! Dots bounce off the canvas edges. Any two entries of the neighbor list
//! closer than the neighbor's threshold get a line whose width and opacity
//! grow with proximity. While the pointer is over the canvas it joins the
//! neighbor list and pulls dots in its outer band toward itself.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::renderer::Surface;
use crate::settings::FieldSettings;

/// A single drifting point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Squared distance under which other points connect to this one
    pub max_d2: f32,
}

impl Dot {
    fn random(rng: &mut Pcg32, bounds: Vec2, speed: f32, max_d2: f32) -> Self {
        let pos = Vec2::new(
            rng.random::<f32>() * bounds.x.max(0.0),
            rng.random::<f32>() * bounds.y.max(0.0),
        );
        let vel = Vec2::new(
            rng.random_range(-1.0f32..=1.0),
            rng.random_range(-1.0f32..=1.0),
        ) * speed;
        Self { pos, vel, max_d2 }
    }

    /// Move one step and bounce off the `[0, bounds]` box
    ///
    /// A component only flips while it still points outward, so a dot left
    /// outside after a shrink drifts back in instead of jittering.
    pub fn advance(&mut self, bounds: Vec2) {
        self.pos += self.vel;

        if (self.pos.x > bounds.x && self.vel.x > 0.0) || (self.pos.x < 0.0 && self.vel.x < 0.0) {
            self.vel.x = -self.vel.x;
        }
        if (self.pos.y > bounds.y && self.vel.y > 0.0) || (self.pos.y < 0.0 && self.vel.y < 0.0) {
            self.vel.y = -self.vel.y;
        }
    }
}

/// The pointer's last known position over the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInfluence {
    /// `None` while the pointer is outside the canvas
    pub pos: Option<Vec2>,
    pub max_d2: f32,
}

/// Entry of the per-frame neighbor list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Neighbor {
    /// Pointer influence point (only listed while it has a position)
    Pointer { pos: Vec2, max_d2: f32 },
    /// Index into the dot collection
    Dot(usize),
}

/// Closeness of a pair within `max_d2`: 1 at zero distance, `None` once
/// `d2 >= max_d2`
#[inline]
pub fn proximity_ratio(d2: f32, max_d2: f32) -> Option<f32> {
    if d2 < max_d2 && max_d2 > 0.0 {
        Some((max_d2 - d2) / max_d2)
    } else {
        None
    }
}

/// Dot count for a canvas size: `floor(w * h / density)`
pub fn target_dot_count(size: Vec2, density: f32) -> usize {
    let area = size.x.max(0.0) * size.y.max(0.0);
    if density <= 0.0 || !area.is_finite() {
        return 0;
    }
    (area / density).floor() as usize
}

/// Owned state of one particle field instance
#[derive(Debug, Clone)]
pub struct ParticleField {
    settings: FieldSettings,
    size: Vec2,
    dots: Vec<Dot>,
    pointer: PointerInfluence,
    rng: Pcg32,
}

impl ParticleField {
    pub fn new(settings: FieldSettings, size: Vec2, seed: u64) -> Self {
        let settings = settings.sanitized();
        let mut field = Self {
            pointer: PointerInfluence {
                pos: None,
                max_d2: settings.pointer_radius,
            },
            settings,
            size: Vec2::ZERO,
            dots: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        };
        field.resize(size);
        log::debug!(
            "Particle field {}x{} with {} dots",
            size.x,
            size.y,
            field.dots.len()
        );
        field
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn pointer(&self) -> PointerInfluence {
        self.pointer
    }

    /// Adopt a new canvas size, appending or truncating dots to match
    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
        let target = target_dot_count(size, self.settings.density);

        if target < self.dots.len() {
            self.dots.truncate(target);
        } else {
            let speed = self.settings.speed;
            let max_d2 = self.settings.max_distance;
            let rng = &mut self.rng;
            let missing = target - self.dots.len();
            self.dots
                .extend((0..missing).map(|_| Dot::random(rng, size, speed, max_d2)));
        }
    }

    /// Apply new settings without remounting; dots are re-seeded for the
    /// current size, the pointer position survives
    pub fn reconfigure(&mut self, settings: FieldSettings) {
        self.settings = settings.sanitized();
        self.pointer.max_d2 = self.settings.pointer_radius;
        self.dots.clear();
        self.resize(self.size);
    }

    /// Pointer moved (`Some`) or left the canvas (`None`)
    pub fn set_pointer(&mut self, pos: Option<Vec2>) {
        self.pointer.pos = pos;
    }

    /// Pointer first (when interactive and present), then every dot
    pub fn neighbors(&self) -> Vec<Neighbor> {
        let pointer = match self.pointer.pos {
            Some(pos) if self.settings.interactive => Some(Neighbor::Pointer {
                pos,
                max_d2: self.pointer.max_d2,
            }),
            _ => None,
        };

        pointer
            .into_iter()
            .chain((0..self.dots.len()).map(Neighbor::Dot))
            .collect()
    }

    /// Advance every dot one step and draw the frame
    pub fn frame(&mut self, surface: &mut dyn Surface) {
        surface.clear();

        let neighbors = self.neighbors();
        let bounds = self.size;
        let s = &self.settings;

        for i in 0..self.dots.len() {
            let mut dot = self.dots[i];
            dot.advance(bounds);
            surface.fill_circle(dot.pos, s.dot_radius, s.dot_color, 1.0);

            for &neighbor in &neighbors {
                let (other, max_d2, is_pointer) = match neighbor {
                    Neighbor::Dot(j) if j == i => continue,
                    Neighbor::Dot(j) => (self.dots[j].pos, self.dots[j].max_d2, false),
                    Neighbor::Pointer { pos, max_d2 } => (pos, max_d2, true),
                };

                let Some(ratio) = interact(&mut dot, other, max_d2, is_pointer, s.pointer_strength)
                else {
                    continue;
                };

                surface.stroke_line(
                    dot.pos,
                    other,
                    ratio * s.line_width,
                    s.line_color,
                    (ratio + s.line_opacity).min(1.0),
                );
            }

            self.dots[i] = dot;
        }
    }
}

/// Pair interaction between a dot and one neighbor position
///
/// Returns the proximity ratio when the pair is linked. A pointer neighbor
/// also pulls the dot toward itself, but only in the outer half of its
/// threshold.
pub fn interact(
    dot: &mut Dot,
    other: Vec2,
    max_d2: f32,
    is_pointer: bool,
    strength: f32,
) -> Option<f32> {
    let delta = dot.pos - other;
    let d2 = delta.length_squared();
    let ratio = proximity_ratio(d2, max_d2)?;

    if is_pointer && d2 >= max_d2 / 2.0 {
        dot.pos -= delta * strength;
    }

    Some(ratio)
}
