//! Collision detection and response for circular bodies
//!
//! Pairs are resolved with a 1-D elastic exchange along the line of centers,
//! damped by the restitution factor, followed by positional correction so the
//! pair ends the pass just touching.

use glam::Vec2;

use super::shotball::Body;
use crate::consts::{COINCIDENT_EPSILON, COLLISION_SLOP};

/// What happened when a pair was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Too far apart
    Apart,
    /// Within contact range; `exchanged` is false when the pair was already
    /// separating and only positions were corrected
    Contact { exchanged: bool },
    /// Centers coincided; pushed apart along +x without a velocity exchange
    Coincident,
}

impl PairOutcome {
    pub fn touched(&self) -> bool {
        !matches!(self, PairOutcome::Apart)
    }
}

/// Whether two bodies are within the contact threshold
#[inline]
pub fn in_contact(a: &Body, b: &Body) -> bool {
    a.pos.distance(b.pos).ceil() < a.radius + b.radius + COLLISION_SLOP
}

/// Velocity moved from `a` to `b`: the relative velocity projected on the
/// line of centers. Zero when the pair is separating.
#[inline]
pub fn transfer(a: &Body, b: &Body) -> Vec2 {
    let offset = a.pos - b.pos;
    let rc2 = offset.length_squared();
    let approach = (a.vel - b.vel).dot(offset);
    if rc2 <= COINCIDENT_EPSILON * COINCIDENT_EPSILON || approach >= 0.0 {
        return Vec2::ZERO;
    }
    offset * (approach / rc2)
}

/// Resolve one pair in place
pub fn resolve_pair(a: &mut Body, b: &mut Body, restitution: f32) -> PairOutcome {
    if !in_contact(a, b) {
        return PairOutcome::Apart;
    }

    let offset = a.pos - b.pos;
    let rc = offset.length();
    let reach = a.radius + b.radius;

    if rc < COINCIDENT_EPSILON {
        let mid = (a.pos + b.pos) * 0.5;
        match (a.movable, b.movable) {
            (true, true) => {
                a.pos = mid - Vec2::X * (reach * 0.5);
                b.pos = mid + Vec2::X * (reach * 0.5);
            }
            (true, false) => a.pos = b.pos - Vec2::X * reach,
            (false, true) => b.pos = a.pos + Vec2::X * reach,
            (false, false) => {}
        }
        return PairOutcome::Coincident;
    }

    let t = transfer(a, b);
    let exchanged = t != Vec2::ZERO;
    if exchanged {
        // An immovable partner keeps its velocity and reflects the other
        match (a.movable, b.movable) {
            (true, true) => {
                a.vel = (a.vel - t) * restitution;
                b.vel = (b.vel + t) * restitution;
            }
            (true, false) => a.vel = (a.vel - 2.0 * t) * restitution,
            (false, true) => b.vel = (b.vel + 2.0 * t) * restitution,
            (false, false) => {}
        }
    }

    let overlap = reach - rc;
    if overlap > 0.0 {
        let dir = offset / rc;
        let (share_a, share_b) = match (a.movable, b.movable) {
            (true, true) => (0.5, 0.5),
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 1.0),
            (false, false) => (0.0, 0.0),
        };
        a.pos += dir * (overlap * share_a);
        b.pos -= dir * (overlap * share_b);
    }

    PairOutcome::Contact { exchanged }
}

/// Borrow two distinct bodies mutably
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Resolve every ordered pair `(i, j)`, `i != j`; returns the number of
/// pair visits that found contact
///
/// The mirrored visit `(j, i)` sees a separating, non-overlapping pair and
/// leaves it alone, so each contact is exchanged once per pass.
pub fn resolve_all(bodies: &mut [Body], restitution: f32) -> usize {
    let n = bodies.len();
    let mut contacts = 0;
    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let (a, b) = pair_mut(bodies, i, j);
            if resolve_pair(a, b, restitution).touched() {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Clamp a body into `[r, bound - r]` on each axis, sending the velocity
/// component back inward damped by `restitution`
pub fn reflect_walls(body: &mut Body, bounds: Vec2, restitution: f32) -> bool {
    let r = body.radius;
    let max = (bounds - Vec2::splat(r)).max(Vec2::splat(r));
    let mut hit = false;

    if body.pos.x > max.x {
        body.pos.x = max.x;
        body.vel.x = -body.vel.x.abs() * restitution;
        hit = true;
    } else if body.pos.x < r {
        body.pos.x = r;
        body.vel.x = body.vel.x.abs() * restitution;
        hit = true;
    }

    if body.pos.y > max.y {
        body.pos.y = max.y;
        body.vel.y = -body.vel.y.abs() * restitution;
        hit = true;
    } else if body.pos.y < r {
        body.pos.y = r;
        body.vel.y = body.vel.y.abs() * restitution;
        hit = true;
    }

    hit
}
