//! Maze grid: static tile classification and grid/world transforms
//!
//! The grid is centered on the world origin. Column `c` maps to
//! `x = -(width-1)*cell/2 + c*cell`, row `r` maps to
//! `z = -(height-1)*cell/2 + r*cell`, and the ground plane is `y = 0`.
//! Anything outside the grid reads as [`TileType::Wall`].

use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::pursuer::PursuerKind;
use crate::error::MazeError;

/// Integer (column, row) cell coordinate
pub type GridPos = IVec2;

/// Classification of a single maze cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Open floor
    #[default]
    Empty,
    /// Solid wall
    Wall,
    /// Normal pellet
    Dot,
    /// Power pellet (frightens the pursuers)
    Energizer,
    /// Interior of the pursuer house
    GhostHouse,
    /// Player spawn marker
    PlayerStart,
    /// Pursuer house center marker
    GhostStart,
}

impl TileType {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '#' => Some(TileType::Wall),
            '.' => Some(TileType::Dot),
            'o' => Some(TileType::Energizer),
            ' ' => Some(TileType::Empty),
            '-' => Some(TileType::GhostHouse),
            'P' => Some(TileType::PlayerStart),
            'G' => Some(TileType::GhostStart),
            _ => None,
        }
    }

    #[inline]
    pub fn is_wall(self) -> bool {
        self == TileType::Wall
    }

    /// Tiles that hold a pellet at the start of a level
    #[inline]
    pub fn is_pellet(self) -> bool {
        matches!(self, TileType::Dot | TileType::Energizer)
    }

    /// Part of the pursuer house (interior or its center marker)
    #[inline]
    pub fn is_house(self) -> bool {
        matches!(self, TileType::GhostHouse | TileType::GhostStart)
    }
}

/// 21x21 layout bundled with the crate. The house door opens toward +Z.
pub const CLASSIC_LAYOUT: &str = "\
#####################
#.........#.........#
#o###.###.#.###.###o#
#...................#
#.###.#.#####.#.###.#
#.....#...#...#.....#
#####.###.#.###.#####
#####.#.......#.#####
#####.#.#####.#.#####
#.......#-G-#.......#
#####.#.#---#.#.#####
#####.#.##-##.#.#####
#####.#.......#.#####
#####.#.#####.#.#####
#.........#.........#
#.###.###.#.###.###.#
#o..#.....P.....#..o#
###.#.#.#####.#.#.###
#.....#...#...#.....#
#.#######.#.#######.#
#####################";

/// Static tile grid. Read-only once gameplay starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    cell_size: f32,
    /// Row-major tiles (`row * width + col`)
    tiles: Vec<TileType>,
}

impl Default for MazeGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl MazeGrid {
    /// Open grid of the given size
    pub fn new(width: usize, height: usize, cell_size: f32) -> Result<Self, MazeError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(MazeError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            width,
            height,
            cell_size,
            tiles: vec![TileType::Empty; width * height],
        })
    }

    /// Grid with no cells. Every query resolves to wall, so agents stall in place.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            cell_size: 1.0,
            tiles: Vec::new(),
        }
    }

    /// Parse a text layout, one line per row (see [`TileType::from_char`])
    pub fn parse(text: &str, cell_size: f32) -> Result<Self, MazeError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(MazeError::Empty);
        };
        let width = first.chars().count();
        let mut grid = Self::new(width, lines.len(), cell_size)?;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, c) in line.chars().enumerate() {
                let tile =
                    TileType::from_char(c).ok_or(MazeError::UnknownCharacter { row, col, found: c })?;
                grid.tiles[row * width + col] = tile;
            }
        }

        log::debug!("Parsed {}x{} maze", grid.width, grid.height);
        Ok(grid)
    }

    /// The bundled 21x21 layout at one world unit per cell
    pub fn classic() -> Self {
        match Self::parse(CLASSIC_LAYOUT, 1.0) {
            Ok(grid) => grid,
            Err(e) => {
                log::warn!("Bundled layout failed to parse ({e}); using an empty grid");
                Self::empty()
            }
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    pub fn in_bounds(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    /// Tile at (col, row); out-of-bounds is wall
    pub fn tile_at(&self, col: i32, row: i32) -> TileType {
        if !self.in_bounds(col, row) {
            return TileType::Wall;
        }
        self.tiles[row as usize * self.width + col as usize]
    }

    #[inline]
    pub fn tile(&self, pos: GridPos) -> TileType {
        self.tile_at(pos.x, pos.y)
    }

    /// Set a tile while authoring a grid; ignored out of bounds
    pub fn set_tile(&mut self, pos: GridPos, tile: TileType) {
        if self.in_bounds(pos.x, pos.y) {
            self.tiles[pos.y as usize * self.width + pos.x as usize] = tile;
        }
    }

    /// World position of the first cell center (column 0, row 0)
    #[inline]
    fn origin(&self) -> (f32, f32) {
        let start_x = -(self.width as f32 - 1.0) * self.cell_size * 0.5;
        let start_z = -(self.height as f32 - 1.0) * self.cell_size * 0.5;
        (start_x, start_z)
    }

    /// World position of a cell center
    pub fn grid_to_world(&self, col: i32, row: i32) -> Vec3 {
        let (start_x, start_z) = self.origin();
        Vec3::new(
            start_x + col as f32 * self.cell_size,
            0.0,
            start_z + row as f32 * self.cell_size,
        )
    }

    #[inline]
    pub fn cell_center(&self, pos: GridPos) -> Vec3 {
        self.grid_to_world(pos.x, pos.y)
    }

    /// Nearest cell to a world position (not clamped to the grid)
    pub fn world_to_grid(&self, pos: Vec3) -> GridPos {
        let (start_x, start_z) = self.origin();
        let col = ((pos.x - start_x) / self.cell_size).round() as i32;
        let row = ((pos.z - start_z) / self.cell_size).round() as i32;
        GridPos::new(col, row)
    }

    /// Grid half of the legality test: the neighbouring cell is not a wall
    #[inline]
    pub fn is_open(&self, from: GridPos, dir: Direction) -> bool {
        let next = self.world_to_grid(self.cell_center(from) + dir.as_vec3() * self.cell_size);
        !self.tile(next).is_wall()
    }

    /// Iterate all cells with their tile type, row-major
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, TileType)> + '_ {
        self.tiles.iter().enumerate().map(|(i, &tile)| {
            let col = (i % self.width) as i32;
            let row = (i / self.width) as i32;
            (GridPos::new(col, row), tile)
        })
    }

    /// First cell holding the given tile, row-major
    pub fn find(&self, tile: TileType) -> Option<GridPos> {
        self.cells().find(|&(_, t)| t == tile).map(|(pos, _)| pos)
    }

    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }
}

/// Derived landmarks of a level: spawn points, house, scatter corners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub player_start: GridPos,
    /// House center cell (the `GhostStart` marker)
    pub house_center: GridPos,
    /// First corridor cell outside the house door
    pub house_exit: GridPos,
    /// Scatter corners indexed by [`PursuerKind::index`]
    pub scatter_corners: [GridPos; 4],
}

impl LevelLayout {
    /// Locate markers and derive the house exit and corners from a grid
    pub fn from_maze(maze: &MazeGrid) -> Result<Self, MazeError> {
        let player_start = maze
            .find(TileType::PlayerStart)
            .ok_or(MazeError::MissingMarker("PlayerStart"))?;
        let house_center = maze
            .find(TileType::GhostStart)
            .ok_or(MazeError::MissingMarker("GhostStart"))?;

        // Walk from the house center toward +Z until leaving the house.
        let mut house_exit = house_center;
        let mut probe = house_center;
        while maze.in_bounds(probe.x, probe.y) {
            probe += Direction::Forward.offset();
            let tile = maze.tile(probe);
            if !tile.is_wall() && !tile.is_house() {
                house_exit = probe;
                break;
            }
        }
        if house_exit == house_center {
            log::warn!("No corridor found beyond the house door; pursuers will exit in place");
        }

        let max_col = (maze.width() as i32 - 2).max(0);
        let max_row = (maze.height() as i32 - 2).max(0);
        let min = 1.min(max_col);
        let scatter_corners = [
            GridPos::new(max_col, min),     // Blinky
            GridPos::new(min, min),         // Pinky
            GridPos::new(max_col, max_row), // Inky
            GridPos::new(min, max_row),     // Clyde
        ];

        Ok(Self {
            player_start,
            house_center,
            house_exit,
            scatter_corners,
        })
    }

    pub fn scatter_corner(&self, kind: PursuerKind) -> GridPos {
        self.scatter_corners[kind.index()]
    }

    /// Spawn point for a pursuer: spread over the house cells around its center
    pub fn spawn_point(&self, maze: &MazeGrid, kind: PursuerKind) -> Vec3 {
        let offset = match kind {
            PursuerKind::Blinky => Vec3::ZERO,
            PursuerKind::Pinky => Vec3::NEG_X,
            PursuerKind::Inky => Vec3::X,
            PursuerKind::Clyde => Vec3::Z,
        };
        maze.cell_center(self.house_center) + offset * maze.cell_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_out_of_bounds_is_wall() {
        let maze = MazeGrid::new(3, 3, 1.0).unwrap();
        assert_eq!(maze.tile_at(1, 1), TileType::Empty);
        assert_eq!(maze.tile_at(-1, 0), TileType::Wall);
        assert_eq!(maze.tile_at(0, 3), TileType::Wall);
        assert_eq!(maze.tile_at(100, -100), TileType::Wall);
    }

    #[test]
    fn test_empty_grid_is_all_wall() {
        let maze = MazeGrid::empty();
        assert_eq!(maze.tile_at(0, 0), TileType::Wall);
        for dir in Direction::ALL {
            assert!(!maze.is_open(GridPos::ZERO, dir));
        }
    }

    #[test]
    fn test_grid_centered_on_origin() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        assert_eq!(maze.grid_to_world(10, 10), Vec3::ZERO);
        assert_eq!(maze.grid_to_world(0, 0), Vec3::new(-10.0, 0.0, -10.0));

        let maze = MazeGrid::new(4, 2, 2.0).unwrap();
        assert_eq!(maze.grid_to_world(0, 0), Vec3::new(-3.0, 0.0, -1.0));
        assert_eq!(maze.grid_to_world(3, 1), Vec3::new(3.0, 0.0, 1.0));
    }

    #[test]
    fn test_world_to_grid_rounds_to_nearest() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        assert_eq!(maze.world_to_grid(Vec3::new(0.4, 0.0, -0.4)), GridPos::new(10, 10));
        assert_eq!(maze.world_to_grid(Vec3::new(0.6, 3.0, -0.6)), GridPos::new(11, 9));
    }

    #[test]
    fn test_parse_classic_layout() {
        let maze = MazeGrid::classic();
        assert_eq!(maze.width(), 21);
        assert_eq!(maze.height(), 21);
        assert_eq!(maze.count(TileType::PlayerStart), 1);
        assert_eq!(maze.count(TileType::GhostStart), 1);
        assert_eq!(maze.count(TileType::Energizer), 4);
        assert!(maze.count(TileType::Dot) > 100);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(MazeGrid::parse("", 1.0), Err(MazeError::Empty)));
        assert!(matches!(
            MazeGrid::parse("###\n#Z#\n###", 1.0),
            Err(MazeError::UnknownCharacter { row: 1, col: 1, found: 'Z' })
        ));
        assert!(matches!(
            MazeGrid::parse("###\n##\n###", 1.0),
            Err(MazeError::RaggedRow { row: 1, expected: 3, found: 2 })
        ));
        assert!(matches!(
            MazeGrid::parse("#", 0.0),
            Err(MazeError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn test_layout_landmarks() {
        let maze = MazeGrid::classic();
        let layout = LevelLayout::from_maze(&maze).unwrap();
        assert_eq!(layout.player_start, GridPos::new(10, 16));
        assert_eq!(layout.house_center, GridPos::new(10, 9));
        assert_eq!(layout.house_exit, GridPos::new(10, 12));
        assert_eq!(layout.scatter_corner(PursuerKind::Blinky), GridPos::new(19, 1));
        assert_eq!(layout.scatter_corner(PursuerKind::Clyde), GridPos::new(1, 19));
    }

    #[test]
    fn test_layout_requires_markers() {
        let maze = MazeGrid::parse("###\n#.#\n###", 1.0).unwrap();
        assert!(matches!(
            LevelLayout::from_maze(&maze),
            Err(MazeError::MissingMarker("PlayerStart"))
        ));
    }

    #[test]
    fn test_is_open_respects_walls() {
        let maze = MazeGrid::parse("###\n#P#\n# #", 1.0).unwrap();
        let start = GridPos::new(1, 1);
        assert!(!maze.is_open(start, Direction::Left));
        assert!(!maze.is_open(start, Direction::Right));
        assert!(!maze.is_open(start, Direction::Back));
        assert!(maze.is_open(start, Direction::Forward));
    }

    proptest! {
        #[test]
        fn prop_grid_round_trip(
            width in 1usize..48,
            height in 1usize..48,
            cell_size in 0.25f32..4.0,
            col_frac in 0.0f64..1.0,
            row_frac in 0.0f64..1.0,
        ) {
            let maze = MazeGrid::new(width, height, cell_size).unwrap();
            let col = ((width as f64 - 1.0) * col_frac).round() as i32;
            let row = ((height as f64 - 1.0) * row_frac).round() as i32;
            let world = maze.grid_to_world(col, row);
            prop_assert_eq!(maze.world_to_grid(world), GridPos::new(col, row));
        }
    }
}
