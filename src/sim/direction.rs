//! Cardinal directions on the maze plane
//!
//! The maze lies on the XZ plane: columns run along +X, rows along +Z.

use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};

/// One of the four grid directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +Z (row + 1)
    Forward,
    /// -Z (row - 1)
    Back,
    /// -X (column - 1)
    Left,
    /// +X (column + 1)
    Right,
}

impl Direction {
    /// All four directions, in a fixed order (callers shuffle for fairness)
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
    ];

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Grid step as (column, row) delta
    pub const fn offset(self) -> IVec2 {
        match self {
            Direction::Forward => IVec2::new(0, 1),
            Direction::Back => IVec2::new(0, -1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Unit world vector
    pub fn as_vec3(self) -> Vec3 {
        match self {
            Direction::Forward => Vec3::Z,
            Direction::Back => Vec3::NEG_Z,
            Direction::Left => Vec3::NEG_X,
            Direction::Right => Vec3::X,
        }
    }

    /// Nearest cardinal direction for a ground-plane vector, if it has any extent
    pub fn from_vec3(v: Vec3) -> Option<Direction> {
        if v.x == 0.0 && v.z == 0.0 {
            return None;
        }
        let snapped = crate::snap_to_axis(v);
        Some(if snapped.x > 0.0 {
            Direction::Right
        } else if snapped.x < 0.0 {
            Direction::Left
        } else if snapped.z > 0.0 {
            Direction::Forward
        } else {
            Direction::Back
        })
    }
}
