//! A Piece of Memory - flower-defense arcade simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, levels, boss)
//! - `tuning`: Data-driven game balance
//! - `autopilot`: Scripted input source for headless runs

pub mod autopilot;
pub mod sim;
pub mod tuning;

pub use autopilot::Autopilot;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the display timer)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play area dimensions (pixels, origin top-left, +Y down)
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 600.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
///
/// Used to turn a speed and a heading into a velocity.
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading (radians) from `from` toward `to`, in screen coordinates
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}
