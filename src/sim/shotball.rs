//! ShotBall world state
//!
//! A fixed set of circular bodies bouncing around the canvas. Bodies fall
//! under gravity, lose horizontal speed to friction, collide with each other
//! and with the walls. A click throws every body toward the clicked point.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::renderer::{Rgb, Surface};
use crate::settings::ShotBallSettings;

/// A circular body
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    /// Meters per second
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgb,
    /// Immovable bodies are neither integrated nor pushed by collisions
    pub movable: bool,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, color: Rgb) -> Self {
        Self {
            pos,
            vel,
            radius,
            color,
            movable: true,
        }
    }

    /// Apply friction and gravity, then move
    pub fn integrate(&mut self, settings: &ShotBallSettings, dt: f32) {
        if !self.movable {
            return;
        }

        // Friction only ever slows horizontal motion down to rest
        let decel = settings.friction * dt;
        if self.vel.x.abs() <= decel {
            self.vel.x = 0.0;
        } else {
            self.vel.x -= decel * self.vel.x.signum();
        }

        // Canvas y points down
        self.vel.y += settings.gravity * dt;

        self.pos += self.vel * dt * settings.pixels_per_meter;
    }
}

/// Random position inside `[r, size - r]` on both axes
fn random_position(rng: &mut Pcg32, size: Vec2, radius: f32) -> Vec2 {
    let hi = (size - Vec2::splat(radius)).max(Vec2::splat(radius));
    Vec2::new(
        rng.random_range(radius..=hi.x),
        rng.random_range(radius..=hi.y),
    )
}

fn random_color(rng: &mut Pcg32) -> Rgb {
    Rgb(rng.random(), rng.random(), rng.random())
}

/// Owned state of one ShotBall instance
#[derive(Debug, Clone)]
pub struct ShotBall {
    settings: ShotBallSettings,
    size: Vec2,
    pub bodies: Vec<Body>,
    /// Frames simulated so far
    pub frame: u64,
    /// Pair visits that found contact during the last frame
    pub contacts: usize,
    /// Bodies that touched a wall during the last frame
    pub wall_hits: usize,
}

impl ShotBall {
    /// Scatter `ball_count` resting bodies over the canvas
    pub fn new(settings: ShotBallSettings, size: Vec2, seed: u64) -> Self {
        let settings = settings.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);
        let bodies = (0..settings.ball_count)
            .map(|_| {
                Body::new(
                    random_position(&mut rng, size, settings.radius),
                    Vec2::ZERO,
                    settings.radius,
                    random_color(&mut rng),
                )
            })
            .collect();

        Self::with_bodies(settings, size, bodies)
    }

    /// World with explicitly placed bodies
    pub fn with_bodies(settings: ShotBallSettings, size: Vec2, bodies: Vec<Body>) -> Self {
        Self {
            settings: settings.sanitized(),
            size,
            bodies,
            frame: 0,
            contacts: 0,
            wall_hits: 0,
        }
    }

    pub fn settings(&self) -> &ShotBallSettings {
        &self.settings
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// New bounds; bodies outside are pulled back in by the next wall pass
    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Throw every body toward `target`
    pub fn apply_impulse(&mut self, target: Vec2) {
        let k = self.settings.impulse_divisor;
        for body in &mut self.bodies {
            body.vel = (target - body.pos) / k;
        }
    }

    /// Fade the previous frame and draw every body on top
    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.fill(self.settings.background, self.settings.trail_fade);
        for body in &self.bodies {
            surface.fill_circle(body.pos, body.radius, body.color, 1.0);
        }
    }

    /// Total kinetic energy in (m/s)², unit mass
    pub fn kinetic_energy(&self) -> f32 {
        self.bodies
            .iter()
            .map(|b| 0.5 * b.vel.length_squared())
            .sum()
    }
}
