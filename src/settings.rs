//! Component settings
//!
//! Both components take a flat JSON object from the page. Every key is
//! optional and falls back to its default independently.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::renderer::Rgb;

/// Particle field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Connecting line color
    pub line_color: Rgb,
    /// Dot fill color
    pub dot_color: Rgb,
    /// Dot radius in pixels
    pub dot_radius: f32,
    /// Canvas area (px²) per dot
    pub density: f32,
    /// Squared distance below which two dots are connected
    pub max_distance: f32,
    /// Squared distance below which the pointer connects to a dot
    pub pointer_radius: f32,
    /// Fraction of the offset a dot moves toward the pointer each frame
    pub pointer_strength: f32,
    /// Velocity component range multiplier
    pub speed: f32,
    /// React to the pointer
    pub interactive: bool,
    /// Opacity added to every line on top of its proximity ratio
    pub line_opacity: f32,
    /// Line width at proximity ratio 1
    pub line_width: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            line_color: Rgb::BLACK,
            dot_color: Rgb::BLACK,
            dot_radius: 1.0,
            density: FIELD_DENSITY,
            max_distance: FIELD_MAX_DISTANCE,
            pointer_radius: POINTER_MAX_DISTANCE,
            pointer_strength: POINTER_STRENGTH,
            speed: 1.0,
            interactive: true,
            line_opacity: 0.2,
            line_width: 0.5,
        }
    }
}

impl FieldSettings {
    /// Parse from JSON, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match serde_json::from_str::<Self>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Invalid particle field settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Replace values that would break the simulation with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.density.is_finite() && self.density > 0.0) {
            self.density = defaults.density;
        }
        if !(self.max_distance.is_finite() && self.max_distance > 0.0) {
            self.max_distance = defaults.max_distance;
        }
        if !(self.pointer_radius.is_finite() && self.pointer_radius > 0.0) {
            self.pointer_radius = defaults.pointer_radius;
        }
        if !self.speed.is_finite() {
            self.speed = defaults.speed;
        }
        self.speed = self.speed.abs();
        self.dot_radius = self.dot_radius.max(0.0);
        self.pointer_strength = self.pointer_strength.clamp(0.0, 1.0);
        self.line_opacity = self.line_opacity.clamp(0.0, 1.0);
        self.line_width = self.line_width.max(0.0);
        self
    }
}

/// ShotBall collision demo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotBallSettings {
    /// Number of bodies
    pub ball_count: usize,
    /// Body radius in pixels
    pub radius: f32,
    /// Velocity multiplier after a collision or wall bounce
    pub restitution: f32,
    /// Downward acceleration (m/s²)
    pub gravity: f32,
    /// Horizontal deceleration opposing motion (m/s²)
    pub friction: f32,
    /// Virtual seconds per frame
    pub time_step: f32,
    /// Pixels per simulated meter
    pub pixels_per_meter: f32,
    /// Click offset divisor for the impulse
    pub impulse_divisor: f32,
    /// Background repainted every frame
    pub background: Rgb,
    /// Opacity of the background repaint (lower = longer trails)
    pub trail_fade: f32,
}

impl Default for ShotBallSettings {
    fn default() -> Self {
        Self {
            ball_count: SHOTBALL_COUNT,
            radius: SHOTBALL_RADIUS,
            restitution: SHOTBALL_RESTITUTION,
            gravity: SHOTBALL_GRAVITY,
            friction: SHOTBALL_FRICTION,
            time_step: SHOTBALL_DT,
            pixels_per_meter: PIXELS_PER_METER,
            impulse_divisor: IMPULSE_DIVISOR,
            background: Rgb::WHITE,
            trail_fade: 0.3,
        }
    }
}

impl ShotBallSettings {
    /// Strict parse: malformed settings are a mount error for ShotBall
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        // An empty attribute means "all defaults"
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.radius.is_finite() && self.radius > 0.0) {
            self.radius = defaults.radius;
        }
        if !(self.impulse_divisor.is_finite() && self.impulse_divisor != 0.0) {
            self.impulse_divisor = defaults.impulse_divisor;
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            self.time_step = defaults.time_step;
        }
        self.restitution = self.restitution.clamp(0.0, 1.0);
        self.friction = self.friction.max(0.0);
        self.trail_fade = self.trail_fade.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_partial_json_keeps_other_defaults() {
        let s = FieldSettings::from_json_or_default(
            r#"{"line_color":[255,0,0],"density":9000,"interactive":false}"#,
        );
        assert_eq!(s.line_color, Rgb(255, 0, 0));
        assert_eq!(s.density, 9000.0);
        assert!(!s.interactive);
        assert_eq!(s.pointer_radius, POINTER_MAX_DISTANCE);
        assert_eq!(s.dot_color, Rgb::BLACK);
    }

    #[test]
    fn test_field_garbage_falls_back() {
        assert_eq!(
            FieldSettings::from_json_or_default("not json"),
            FieldSettings::default()
        );
    }

    #[test]
    fn test_field_sanitize_density() {
        let s = FieldSettings::from_json_or_default(r#"{"density":0,"speed":-2}"#);
        assert_eq!(s.density, FIELD_DENSITY);
        assert_eq!(s.speed, 2.0);
    }

    #[test]
    fn test_shotball_strict_parse() {
        assert!(ShotBallSettings::from_json("{").is_err());
        assert_eq!(
            ShotBallSettings::from_json("").unwrap(),
            ShotBallSettings::default()
        );

        let s = ShotBallSettings::from_json(r#"{"ball_count":3,"gravity":0}"#).unwrap();
        assert_eq!(s.ball_count, 3);
        assert_eq!(s.gravity, 0.0);
        assert_eq!(s.impulse_divisor, IMPULSE_DIVISOR);
    }

    #[test]
    fn test_shotball_sanitize() {
        let s = ShotBallSettings {
            impulse_divisor: 0.0,
            restitution: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(s.impulse_divisor, IMPULSE_DIVISOR);
        assert_eq!(s.restitution, 1.0);
    }
}
