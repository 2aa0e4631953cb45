//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (`requestAnimationFrame` or a manual driver)
//! - Input events and canvas sizing (browser only)
//! - Visibility-based pausing (browser only)

pub mod fps;
pub mod scheduler;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use fps::FpsCounter;
pub use scheduler::{
    FrameCallback, FrameHandle, FrameLoop, FrameScheduler, FrameSlot, LoopControl, ManualScheduler,
};
