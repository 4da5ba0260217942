//! Maze Chase - simulation core for a grid-locked arcade chase game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (maze, motion, pursuer AI, round flow)
//! - `tuning`: Data-driven game balance
//! - `error`: Construction and configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::{MazeError, TuningError};
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for deterministic motion)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// An agent is "at a node" when closer than this (in cells) to its target node
    pub const NODE_EPSILON: f32 = 0.05;

    /// Ray-march step budget for the wall probe
    pub const PROBE_MAX_STEPS: usize = 64;
}

/// Distance between two points projected onto the XZ (ground) plane
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Snap a ground-plane vector to the nearest cardinal axis (unit length)
///
/// Ties between |x| and |z| resolve to the Z axis. The Y component is ignored.
#[inline]
pub fn snap_to_axis(v: Vec3) -> Vec3 {
    if v.x.abs() > v.z.abs() {
        Vec3::new(v.x.signum(), 0.0, 0.0)
    } else if v.z != 0.0 {
        Vec3::new(0.0, 0.0, v.z.signum())
    } else {
        // Degenerate input: fall back to world forward
        Vec3::Z
    }
}
