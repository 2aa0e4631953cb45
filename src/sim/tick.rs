//! Fixed timestep ShotBall tick
//!
//! One call is one animation frame: pending input, collision pass,
//! integration, wall reflection. Drawing is left to the caller.

use glam::Vec2;

use super::collision::{reflect_walls, resolve_all};
use super::shotball::ShotBall;

/// Input gathered between two frames
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Last click position in canvas pixels
    pub click: Option<Vec2>,
    /// New canvas size after a window resize
    pub resize: Option<Vec2>,
}

/// Advance the world by one fixed step of `dt` virtual seconds
pub fn tick(world: &mut ShotBall, input: &TickInput, dt: f32) {
    if let Some(size) = input.resize {
        world.resize(size);
    }
    if let Some(target) = input.click {
        world.apply_impulse(target);
    }

    let restitution = world.settings().restitution;
    world.contacts = resolve_all(&mut world.bodies, restitution);

    let settings = world.settings().clone();
    let bounds = world.size();
    let mut wall_hits = 0;
    for body in world.bodies.iter_mut().filter(|b| b.movable) {
        body.integrate(&settings, dt);
        if reflect_walls(body, bounds, restitution) {
            wall_hits += 1;
        }
    }
    world.wall_hits = wall_hits;
    world.frame += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SHOTBALL_DT;
    use crate::renderer::Rgb;
    use crate::settings::ShotBallSettings;
    use crate::sim::shotball::Body;

    fn still_world() -> ShotBallSettings {
        ShotBallSettings {
            gravity: 0.0,
            friction: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_click_applies_before_motion() {
        let bodies = vec![Body::new(Vec2::new(100.0, 100.0), Vec2::ZERO, 12.0, Rgb::BLACK)];
        let mut world = ShotBall::with_bodies(still_world(), Vec2::new(400.0, 400.0), bodies);

        let input = TickInput {
            click: Some(Vec2::new(300.0, 100.0)),
            ..Default::default()
        };
        tick(&mut world, &input, SHOTBALL_DT);

        // v = 200 / 40 = 5 m/s, 5 * 0.016 * 100 = 8 px
        assert_eq!(world.bodies[0].vel, Vec2::new(5.0, 0.0));
        assert!((world.bodies[0].pos.x - 108.0).abs() < 1e-3);
        assert_eq!(world.frame, 1);
    }

    #[test]
    fn test_resize_input_pulls_bodies_back() {
        let bodies = vec![Body::new(Vec2::new(350.0, 350.0), Vec2::ZERO, 12.0, Rgb::BLACK)];
        let mut world = ShotBall::with_bodies(still_world(), Vec2::new(400.0, 400.0), bodies);

        let input = TickInput {
            resize: Some(Vec2::new(200.0, 200.0)),
            ..Default::default()
        };
        tick(&mut world, &input, SHOTBALL_DT);
        assert_eq!(world.bodies[0].pos, Vec2::new(188.0, 188.0));
        assert_eq!(world.wall_hits, 1);
    }

    #[test]
    fn test_resize_leaves_pinned_body_in_place() {
        let mut pinned = Body::new(Vec2::new(350.0, 350.0), Vec2::ZERO, 12.0, Rgb::BLACK);
        pinned.movable = false;
        let mut world = ShotBall::with_bodies(still_world(), Vec2::new(400.0, 400.0), vec![pinned]);

        let input = TickInput {
            resize: Some(Vec2::new(200.0, 200.0)),
            ..Default::default()
        };
        tick(&mut world, &input, SHOTBALL_DT);
        assert_eq!(world.bodies[0].pos, Vec2::new(350.0, 350.0));
        assert_eq!(world.wall_hits, 0);
    }

    #[test]
    fn test_gravity_settles_on_floor() {
        let bodies = vec![Body::new(Vec2::new(100.0, 50.0), Vec2::ZERO, 12.0, Rgb::BLACK)];
        let mut world = ShotBall::with_bodies(
            ShotBallSettings::default(),
            Vec2::new(200.0, 200.0),
            bodies,
        );
        let input = TickInput::default();
        for _ in 0..2000 {
            tick(&mut world, &input, SHOTBALL_DT);
        }
        let b = &world.bodies[0];
        assert!(b.pos.y <= 188.0);
        assert!(b.pos.y > 180.0);
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs give the same world
        let size = Vec2::new(500.0, 400.0);
        let mut w1 = ShotBall::new(ShotBallSettings::default(), size, 99999);
        let mut w2 = ShotBall::new(ShotBallSettings::default(), size, 99999);

        let inputs = [
            TickInput {
                click: Some(Vec2::new(250.0, 200.0)),
                ..Default::default()
            },
            TickInput::default(),
            TickInput::default(),
            TickInput {
                click: Some(Vec2::new(10.0, 10.0)),
                ..Default::default()
            },
        ];

        for input in &inputs {
            tick(&mut w1, input, SHOTBALL_DT);
            tick(&mut w2, input, SHOTBALL_DT);
        }

        assert_eq!(w1.bodies, w2.bodies);
        assert_eq!(w1.contacts, w2.contacts);
    }

    #[test]
    fn test_bodies_never_leave_canvas() {
        let size = Vec2::new(300.0, 300.0);
        let mut world = ShotBall::new(ShotBallSettings::default(), size, 5);
        let click = TickInput {
            click: Some(Vec2::new(0.0, 0.0)),
            ..Default::default()
        };
        tick(&mut world, &click, SHOTBALL_DT);
        let idle = TickInput::default();
        for _ in 0..300 {
            tick(&mut world, &idle, SHOTBALL_DT);
        }
        for b in &world.bodies {
            assert!(b.pos.is_finite());
            assert!(b.pos.x >= 12.0 && b.pos.x <= 288.0);
            assert!(b.pos.y >= 12.0 && b.pos.y <= 288.0);
        }
    }
}
