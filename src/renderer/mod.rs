//! Rendering module
//!
//! Everything draws through the [`Surface`] trait; the canvas backend only
//! exists on wasm32.

pub mod draw_list;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

pub use draw_list::{DrawCommand, DrawList};
pub use surface::{Rgb, Surface};

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2dSurface;
