//! folio-fx - decorative canvas animations for a portfolio site
//!
//! Core modules:
//! - `sim`: Deterministic simulation (particle field, ShotBall collisions)
//! - `renderer`: Drawing surface abstraction and its backends
//! - `platform`: Frame scheduling and the browser host
//! - `settings`: Per-component settings with JSON defaults

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::MountError;
pub use settings::{FieldSettings, ShotBallSettings};

/// Animation constants
pub mod consts {
    /// Canvas area (px²) per particle-field dot
    pub const FIELD_DENSITY: f32 = 6000.0;
    /// Squared link distance between two dots
    pub const FIELD_MAX_DISTANCE: f32 = 6000.0;
    /// Squared link distance between the pointer and a dot
    pub const POINTER_MAX_DISTANCE: f32 = 20000.0;
    /// Fraction of the offset a dot moves toward the pointer per frame
    pub const POINTER_STRENGTH: f32 = 0.03;

    /// ShotBall defaults
    pub const SHOTBALL_COUNT: usize = 100;
    pub const SHOTBALL_RADIUS: f32 = 12.0;
    pub const SHOTBALL_RESTITUTION: f32 = 0.8;
    /// m/s², canvas y points down
    pub const SHOTBALL_GRAVITY: f32 = 9.8;
    /// m/s² opposing horizontal motion
    pub const SHOTBALL_FRICTION: f32 = 0.5;
    /// Fixed virtual step per frame (16 ms)
    pub const SHOTBALL_DT: f32 = 0.016;
    pub const PIXELS_PER_METER: f32 = 100.0;
    /// Click impulse: v = (click - pos) / IMPULSE_DIVISOR
    pub const IMPULSE_DIVISOR: f32 = 40.0;

    /// Extra contact range (px) added to the summed radii
    pub const COLLISION_SLOP: f32 = 2.0;
    /// Center distance treated as coincident
    pub const COINCIDENT_EPSILON: f32 = 1e-4;

    /// Timer fallback when requestAnimationFrame is missing (~60 Hz)
    pub const FALLBACK_FRAME_MS: i32 = 16;
}
