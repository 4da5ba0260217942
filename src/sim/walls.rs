//! Continuous wall geometry and the obstruction probe
//!
//! The grid says where walls *should* be; this is where they physically are.
//! Hand-placed boxes may disagree with the tile data, so pursuers only take a
//! path when both the grid and this probe agree it is clear.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::maze::{GridPos, MazeGrid};
use super::sdf::{ground, raymarch, sd_box};
use crate::consts::PROBE_MAX_STEPS;

/// An axis-aligned wall block on the ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallBox {
    /// Center as (x, z)
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl WallBox {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    #[inline]
    pub fn distance(&self, p: Vec2) -> f32 {
        sd_box(p, self.center, self.half_extents)
    }
}

/// All wall-tagged obstacles in the level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallGeometry {
    boxes: Vec<WallBox>,
}

impl WallGeometry {
    /// No obstacles; the probe always passes
    pub fn new() -> Self {
        Self { boxes: Vec::new() }
    }

    /// One cell-sized block per wall tile, as a maze builder would lay them
    pub fn from_maze(maze: &MazeGrid) -> Self {
        let half = Vec2::splat(maze.cell_size() * 0.5);
        let boxes: Vec<WallBox> = maze
            .cells()
            .filter(|(_, tile)| tile.is_wall())
            .map(|(pos, _)| WallBox::new(ground(maze.cell_center(pos)), half))
            .collect();
        log::debug!("Built {} wall blocks from maze", boxes.len());
        Self { boxes }
    }

    /// Add a hand-placed obstacle
    pub fn push(&mut self, wall: WallBox) {
        self.boxes.push(wall);
    }

    /// Remove every block whose center lies in the given cell
    pub fn remove_in_cell(&mut self, maze: &MazeGrid, cell: GridPos) {
        let center = ground(maze.cell_center(cell));
        let tolerance = maze.cell_size() * 0.5;
        self.boxes
            .retain(|b| (b.center - center).abs().max_element() >= tolerance);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Signed distance to the nearest wall among `candidates`
    fn distance(candidates: &[WallBox], p: Vec2) -> f32 {
        candidates
            .iter()
            .map(|b| b.distance(p))
            .fold(f32::MAX, f32::min)
    }

    /// True if a probe of `radius` touches a wall anywhere between `start` and `end`
    pub fn segment_blocked(&self, start: Vec3, end: Vec3, radius: f32) -> bool {
        if self.boxes.is_empty() {
            return false;
        }
        let a = ground(start);
        let b = ground(end);

        // Only blocks near the segment can matter.
        let lo = a.min(b) - Vec2::splat(radius);
        let hi = a.max(b) + Vec2::splat(radius);
        let candidates: Vec<WallBox> = self
            .boxes
            .iter()
            .filter(|w| {
                let w_lo = w.center - w.half_extents;
                let w_hi = w.center + w.half_extents;
                w_lo.x <= hi.x && w_hi.x >= lo.x && w_lo.y <= hi.y && w_hi.y >= lo.y
            })
            .copied()
            .collect();
        if candidates.is_empty() {
            return false;
        }

        raymarch(a, b, radius, PROBE_MAX_STEPS, |p| Self::distance(&candidates, p)).is_some()
    }

    /// Probe half of the legality test: the segment from a node to its neighbour is clear
    pub fn path_clear(&self, maze: &MazeGrid, from: GridPos, dir: Direction, radius_cells: f32) -> bool {
        let start = maze.cell_center(from);
        let end = start + dir.as_vec3() * maze.cell_size();
        !self.segment_blocked(start, end, radius_cells * maze.cell_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::maze::TileType;

    fn corridor() -> MazeGrid {
        MazeGrid::parse("#####\n#P  #\n#####", 1.0).unwrap()
    }

    #[test]
    fn test_from_maze_builds_block_per_wall() {
        let maze = corridor();
        let walls = WallGeometry::from_maze(&maze);
        assert_eq!(walls.len(), maze.count(TileType::Wall));
    }

    #[test]
    fn test_probe_agrees_with_grid() {
        let maze = corridor();
        let walls = WallGeometry::from_maze(&maze);
        let start = GridPos::new(1, 1);
        assert!(walls.path_clear(&maze, start, Direction::Right, 0.2));
        assert!(!walls.path_clear(&maze, start, Direction::Left, 0.2));
        assert!(!walls.path_clear(&maze, start, Direction::Forward, 0.2));
    }

    #[test]
    fn test_hand_placed_block_obstructs_open_tile() {
        let maze = corridor();
        let mut walls = WallGeometry::from_maze(&maze);
        let blocked_cell = GridPos::new(2, 1);
        walls.push(WallBox::new(ground(maze.cell_center(blocked_cell)), Vec2::splat(0.5)));

        // Grid still thinks it is open
        assert!(maze.is_open(GridPos::new(1, 1), Direction::Right));
        assert!(!walls.path_clear(&maze, GridPos::new(1, 1), Direction::Right, 0.2));

        walls.remove_in_cell(&maze, blocked_cell);
        assert!(walls.path_clear(&maze, GridPos::new(1, 1), Direction::Right, 0.2));
    }

    #[test]
    fn test_empty_geometry_never_blocks() {
        let walls = WallGeometry::new();
        assert!(!walls.segment_blocked(Vec3::ZERO, Vec3::X * 10.0, 0.4));
    }
}
