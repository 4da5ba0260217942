//! Grid-locked motion shared by the player and the pursuers
//!
//! An agent always travels in a straight line from one cell center (node) to
//! the next. A buffered direction is only committed at a node, except for an
//! exact reversal which takes effect immediately, mid-segment.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::maze::{GridPos, MazeGrid};
use super::walls::WallGeometry;
use crate::consts::NODE_EPSILON;
use crate::move_towards;

/// The legality test: may an agent step from `cell` in `dir`?
#[derive(Debug, Clone, Copy)]
pub struct Legality<'a> {
    maze: &'a MazeGrid,
    probe: Option<(&'a WallGeometry, f32)>,
    bypass: bool,
}

impl<'a> Legality<'a> {
    /// Grid metadata only
    pub fn grid(maze: &'a MazeGrid) -> Self {
        Self {
            maze,
            probe: None,
            bypass: false,
        }
    }

    /// Grid metadata plus the continuous obstruction probe (radius in cells)
    pub fn probed(maze: &'a MazeGrid, walls: &'a WallGeometry, radius_cells: f32) -> Self {
        Self {
            maze,
            probe: Some((walls, radius_cells)),
            bypass: false,
        }
    }

    /// Every direction is legal (wall-pass)
    pub fn unrestricted(maze: &'a MazeGrid) -> Self {
        Self {
            maze,
            probe: None,
            bypass: true,
        }
    }

    pub fn maze(&self) -> &'a MazeGrid {
        self.maze
    }

    pub fn allows(&self, cell: GridPos, dir: Direction) -> bool {
        if self.bypass {
            return true;
        }
        if !self.maze.is_open(cell, dir) {
            return false;
        }
        match self.probe {
            Some((walls, radius)) => walls.path_clear(self.maze, cell, dir, radius),
            None => true,
        }
    }
}

/// What a motion tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Travelling along a segment
    Moving,
    /// Reached the target node this tick (snapped exactly onto it)
    Arrived,
    /// Sitting on a node with no legal way forward
    Stalled,
}

/// Tile-to-tile stepping state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMover {
    position: Vec3,
    direction: Option<Direction>,
    target_cell: GridPos,
    buffered: Option<Direction>,
}

impl GridMover {
    /// Rest on the center of `cell`, not moving
    pub fn new(maze: &MazeGrid, cell: GridPos) -> Self {
        Self {
            position: maze.cell_center(cell),
            direction: None,
            target_cell: cell,
            buffered: None,
        }
    }

    /// Teleport onto the center of `cell`, clearing direction and buffer
    pub fn place(&mut self, maze: &MazeGrid, cell: GridPos) {
        *self = Self::new(maze, cell);
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }

    #[inline]
    pub fn target_cell(&self) -> GridPos {
        self.target_cell
    }

    #[inline]
    pub fn buffered(&self) -> Option<Direction> {
        self.buffered
    }

    /// Request a turn; honoured at the next node (or immediately if it is a reversal)
    pub fn buffer(&mut self, direction: Option<Direction>) {
        self.buffered = direction;
    }

    pub fn target_world(&self, maze: &MazeGrid) -> Vec3 {
        maze.cell_center(self.target_cell)
    }

    pub fn at_node(&self, maze: &MazeGrid) -> bool {
        crate::planar_distance(self.position, self.target_world(maze)) < NODE_EPSILON * maze.cell_size()
    }

    /// Turn around on the spot. Mid-segment the previous node becomes the target.
    ///
    /// Clears any buffered turn, which would otherwise read as a second reversal.
    pub fn reverse(&mut self, maze: &MazeGrid) {
        let Some(dir) = self.direction else {
            return;
        };
        if !self.at_node(maze) {
            self.target_cell -= dir.offset();
        }
        self.direction = Some(dir.opposite());
        self.buffered = None;
    }

    /// Choose the next segment from the current node
    fn resolve_node(&mut self, legal: &Legality) -> bool {
        let here = self.target_cell;
        if let Some(wanted) = self.buffered {
            if legal.allows(here, wanted) {
                self.direction = Some(wanted);
            }
        }
        match self.direction {
            Some(dir) if legal.allows(here, dir) => {
                self.target_cell = here + dir.offset();
                true
            }
            _ => false,
        }
    }

    /// Advance one tick at `speed` world units per second
    pub fn tick(&mut self, dt: f32, speed: f32, legal: &Legality) -> Motion {
        let maze = legal.maze();

        // Arcade rule: an exact reversal is honoured mid-segment.
        let reversing = matches!(
            (self.buffered, self.direction),
            (Some(wanted), Some(current)) if wanted == current.opposite()
        );
        if reversing && !self.at_node(maze) {
            self.reverse(maze);
        }

        if self.at_node(maze) {
            self.position = self.target_world(maze);
            if !self.resolve_node(legal) {
                return Motion::Stalled;
            }
        }

        let target = self.target_world(maze);
        self.position = move_towards(self.position, target, speed * dt);

        if crate::planar_distance(self.position, target) < NODE_EPSILON * maze.cell_size() {
            self.position = target;
            Motion::Arrived
        } else {
            Motion::Moving
        }
    }
}
