//! Round state and the owning game state
//!
//! [`GameState`] is the round controller: it owns the maze, the player, the
//! mode coordinator and the round counters, and is advanced by
//! [`tick`](super::tick::tick).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::coordinator::{GlobalMode, ModeCoordinator};
use super::maze::{GridPos, LevelLayout, MazeGrid, TileType};
use super::player::{Player, PowerUpItem, PowerUpKind};
use super::pursuer::PursuerKind;
use super::timer::Schedule;
use super::walls::WallGeometry;
use crate::error::MazeError;
use crate::tuning::Tuning;

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Waiting out the reset delay after a caught player or a cleared level
    Resetting,
    /// Out of lives
    GameOver,
}

/// A pellet still on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pellet {
    Dot,
    Energizer,
}

/// Remaining pellets, keyed by (column, row)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PelletField {
    pellets: BTreeMap<(i32, i32), Pellet>,
}

impl PelletField {
    /// Every Dot and Energizer tile of the maze
    pub fn from_maze(maze: &MazeGrid) -> Self {
        let pellets = maze
            .cells()
            .filter(|(_, tile)| tile.is_pellet())
            .map(|(pos, tile)| {
                let pellet = if tile == TileType::Energizer {
                    Pellet::Energizer
                } else {
                    Pellet::Dot
                };
                ((pos.x, pos.y), pellet)
            })
            .collect();
        Self { pellets }
    }

    pub fn get(&self, cell: GridPos) -> Option<Pellet> {
        self.pellets.get(&(cell.x, cell.y)).copied()
    }

    pub fn take(&mut self, cell: GridPos) -> Option<Pellet> {
        self.pellets.remove(&(cell.x, cell.y))
    }

    pub fn len(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty()
    }
}

/// Score, lives, level, and the dot counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    pub score: u64,
    pub lives: u32,
    /// 1-based level
    pub level: u32,
    pub dots_remaining: u32,
    pub dots_eaten: u32,
}

impl RoundState {
    pub fn new(tuning: &Tuning, dots: u32) -> Self {
        Self {
            score: 0,
            lives: tuning.initial_lives,
            level: 1,
            dots_remaining: dots,
            dots_eaten: 0,
        }
    }
}

/// Events for the presentation layer (sound, HUD, effects)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    DotEaten { cell: GridPos },
    EnergizerEaten { cell: GridPos },
    PursuerReleased { kind: PursuerKind },
    PursuerReturned { kind: PursuerKind },
    GhostEaten { kind: PursuerKind, score: u32 },
    FruitEaten { score: u32 },
    ModeChanged { mode: GlobalMode },
    PlayerCaught,
    LifeLost { lives_left: u32 },
    RoundReset,
    LevelComplete { level: u32 },
    GameOver { score: u64 },
    PowerUpGranted { item: PowerUpItem },
    PowerUpExpired { kind: PowerUpKind },
}

/// Deferred round-controller work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundAction {
    ResetRound,
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    pub tuning: Tuning,
    pub(crate) maze: MazeGrid,
    pub(crate) walls: WallGeometry,
    pub(crate) layout: LevelLayout,
    pub(crate) pellets: PelletField,
    pub player: Player,
    pub coordinator: ModeCoordinator,
    pub round: RoundState,
    pub phase: RoundPhase,
    pub(crate) schedule: Schedule<RoundAction>,
    pub(crate) events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// New game on `maze`, with wall blocks derived from its tiles
    pub fn new(maze: MazeGrid, tuning: Tuning) -> Result<Self, MazeError> {
        let walls = WallGeometry::from_maze(&maze);
        Self::with_walls(maze, walls, tuning)
    }

    /// New game with hand-authored wall geometry
    pub fn with_walls(maze: MazeGrid, walls: WallGeometry, tuning: Tuning) -> Result<Self, MazeError> {
        let layout = LevelLayout::from_maze(&maze)?;
        let pellets = PelletField::from_maze(&maze);
        let player = Player::new(&maze, layout.player_start);
        let coordinator = ModeCoordinator::new(&maze, &layout, &tuning);
        let round = RoundState::new(&tuning, pellets.len() as u32);
        log::info!(
            "New game: {}x{} maze, {} pellets, seed {}",
            maze.width(),
            maze.height(),
            pellets.len(),
            tuning.seed
        );

        Ok(Self {
            tuning,
            maze,
            walls,
            layout,
            pellets,
            player,
            coordinator,
            round,
            phase: RoundPhase::Playing,
            schedule: Schedule::new(),
            events: Vec::new(),
            time_ticks: 0,
        })
    }

    /// New game on the bundled layout
    pub fn classic(tuning: Tuning) -> Result<Self, MazeError> {
        Self::new(MazeGrid::parse(super::maze::CLASSIC_LAYOUT, 1.0)?, tuning)
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn walls(&self) -> &WallGeometry {
        &self.walls
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn pellets(&self) -> &PelletField {
        &self.pellets
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Speed factor for the current level
    pub fn speed_multiplier(&self) -> f32 {
        self.tuning.level_speed_multiplier(self.round.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_counts_pellets() {
        let state = GameState::classic(Tuning::default()).unwrap();
        let maze = state.maze();
        let expected = maze.count(TileType::Dot) + maze.count(TileType::Energizer);
        assert_eq!(state.round.dots_remaining as usize, expected);
        assert_eq!(state.pellets().len(), expected);
        assert_eq!(state.round.lives, 3);
        assert_eq!(state.round.level, 1);
        assert_eq!(state.phase, RoundPhase::Playing);
    }

    #[test]
    fn test_new_game_requires_markers() {
        let maze = MazeGrid::parse("#####\n#.P.#\n#####", 1.0).unwrap();
        assert!(matches!(
            GameState::new(maze, Tuning::default()),
            Err(MazeError::MissingMarker("GhostStart"))
        ));
    }

    #[test]
    fn test_pellet_field_take() {
        let maze = MazeGrid::parse("#####\n#.Po#\n##G##", 1.0).unwrap();
        let mut field = PelletField::from_maze(&maze);
        assert_eq!(field.len(), 2);
        assert_eq!(field.get(GridPos::new(3, 1)), Some(Pellet::Energizer));
        assert_eq!(field.take(GridPos::new(1, 1)), Some(Pellet::Dot));
        assert_eq!(field.take(GridPos::new(1, 1)), None);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_event_serializes() {
        let event = GameEvent::GhostEaten {
            kind: PursuerKind::Inky,
            score: 400,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Inky"));
        assert!(json.contains("400"));
    }
}
