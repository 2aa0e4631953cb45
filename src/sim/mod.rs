//! Deterministic simulation module
//!
//! All animation logic lives here. This module must stay pure:
//! - One fixed step per frame
//! - Seeded RNG only
//! - Stable iteration order (by index)
//! - Drawing only through the `Surface` trait, no platform dependencies

pub mod collision;
pub mod field;
pub mod shotball;
pub mod tick;

pub use collision::{PairOutcome, reflect_walls, resolve_all, resolve_pair};
pub use field::{Dot, Neighbor, ParticleField, PointerInfluence, proximity_ratio, target_dot_count};
pub use shotball::{Body, ShotBall};
pub use tick::{TickInput, tick};
