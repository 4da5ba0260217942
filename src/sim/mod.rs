//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pursuers in release order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod coordinator;
pub mod direction;
pub mod maze;
pub mod motion;
pub mod player;
pub mod pursuer;
pub mod sdf;
pub mod state;
pub mod strategy;
pub mod tick;
pub mod timer;
pub mod walls;

pub use collision::{Contact, classify_contact, touching};
pub use coordinator::{CoordinatorEvent, GlobalMode, ModeCoordinator};
pub use direction::Direction;
pub use maze::{CLASSIC_LAYOUT, GridPos, LevelLayout, MazeGrid, TileType};
pub use motion::{GridMover, Legality, Motion};
pub use player::{Player, PowerUpItem, PowerUpKind, PowerUps};
pub use pursuer::{Pursuer, PursuerKind, PursuerState, PursuitContext, decide_next_direction};
pub use state::{GameEvent, GameState, Pellet, PelletField, RoundPhase, RoundState};
pub use strategy::{ChaseContext, ChaseTargetStrategy, strategy_for};
pub use tick::{TickInput, tick};
pub use timer::{Countdown, Schedule};
pub use walls::{WallBox, WallGeometry};
