//! Pursuer state machine
//!
//! Each pursuer is in exactly one [`PursuerState`]. Inside the maze it moves
//! node to node with the shared [`GridMover`], including the trip home after
//! being eaten. In the house and on the way out it moves in a straight line.
//! An energizer frightens pursuers wherever they are; one still in the house
//! keeps idling there until released and joins the maze frightened.

use glam::Vec3;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::coordinator::GlobalMode;
use super::direction::Direction;
use super::maze::{GridPos, LevelLayout, MazeGrid};
use super::motion::{GridMover, Legality};
use super::strategy::{ChaseContext, ChaseTargetStrategy, strategy_for, wander_target};
use super::timer::Countdown;
use super::walls::WallGeometry;
use crate::tuning::Tuning;
use crate::{move_towards, planar_distance};

/// The four pursuer personalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PursuerKind {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl PursuerKind {
    /// Release order
    pub const ALL: [PursuerKind; 4] = [
        PursuerKind::Blinky,
        PursuerKind::Pinky,
        PursuerKind::Inky,
        PursuerKind::Clyde,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PursuerKind::Blinky => 0,
            PursuerKind::Pinky => 1,
            PursuerKind::Inky => 2,
            PursuerKind::Clyde => 3,
        }
    }
}

/// Behavioral state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PursuerState {
    /// Idling (bobbing) at the spawn point until released
    InHouse,
    /// Moving straight to the house exit
    ExitingHouse,
    Chase,
    Scatter,
    /// Slow, wandering, and edible
    Frightened,
    /// Returning to the house after being eaten
    Eaten,
}

/// Where a pursuer physically is, independent of its behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    /// At its spawn point inside the house
    House,
    /// On the way from the spawn point to the exit
    Leaving,
    /// On the grid
    Maze,
}

impl From<GlobalMode> for PursuerState {
    fn from(mode: GlobalMode) -> Self {
        match mode {
            GlobalMode::Chase => PursuerState::Chase,
            GlobalMode::Scatter => PursuerState::Scatter,
        }
    }
}

/// Reported to the coordinator by [`Pursuer::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuerSignal {
    /// Reached the house exit and joined the maze
    LeftHouse,
    /// Reached the house center after being eaten; now idle in the house
    ReturnedHome,
}

/// The world as a pursuer sees it during one tick
#[derive(Debug, Clone, Copy)]
pub struct PursuitContext<'a> {
    pub maze: &'a MazeGrid,
    pub walls: &'a WallGeometry,
    pub tuning: &'a Tuning,
    pub player_position: Vec3,
    pub player_facing: Vec3,
    pub global_mode: GlobalMode,
    /// Level speed scaling applied to every pursuer speed
    pub speed_multiplier: f32,
}

/// Choose the next direction at a node
///
/// Candidates are tried in shuffled order; the legal one whose next node is
/// nearest to `target` wins. The reverse of `current` is only a candidate
/// when `allow_reverse` is set. With nothing else legal the reverse is
/// returned anyway as a forced U-turn.
pub fn decide_next_direction(
    legal: &Legality,
    cell: GridPos,
    current: Option<Direction>,
    target: Vec3,
    allow_reverse: bool,
    rng: &mut Pcg32,
) -> Option<Direction> {
    let maze = legal.maze();
    let here = maze.cell_center(cell);
    let reverse = current.map(Direction::opposite);

    let mut dirs = Direction::ALL;
    dirs.shuffle(rng);

    let mut best: Option<(Direction, f32)> = None;
    for dir in dirs {
        if !allow_reverse && Some(dir) == reverse {
            continue;
        }
        if !legal.allows(cell, dir) {
            continue;
        }
        let dist = planar_distance(here + dir.as_vec3() * maze.cell_size(), target);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((dir, dist));
        }
    }

    match best {
        Some((dir, _)) => Some(dir),
        None if reverse.is_some() => {
            log::trace!("No forward option at {:?}; forcing a U-turn", cell);
            reverse
        }
        None => {
            log::warn!("Pursuer boxed in at {:?} with no direction to take", cell);
            None
        }
    }
}

/// A single pursuer
#[derive(Debug)]
pub struct Pursuer {
    kind: PursuerKind,
    state: PursuerState,
    location: Location,
    /// Grid motion while in the maze
    mover: GridMover,
    /// Free motion while in the house or leaving it
    free_position: Vec3,
    spawn: Vec3,
    house_center: Vec3,
    house_exit: Vec3,
    scatter_corner: Vec3,
    frightened: Countdown,
    strategy: Box<dyn ChaseTargetStrategy>,
    /// Most recent chase/scatter/wander target
    target: Vec3,
    bob_clock: f32,
}

impl Pursuer {
    /// A pursuer idling at its spawn point
    pub fn new(kind: PursuerKind, maze: &MazeGrid, layout: &LevelLayout) -> Self {
        let spawn = layout.spawn_point(maze, kind);
        Self {
            kind,
            state: PursuerState::InHouse,
            location: Location::House,
            mover: GridMover::new(maze, maze.world_to_grid(spawn)),
            free_position: spawn,
            spawn,
            house_center: maze.cell_center(layout.house_center),
            house_exit: maze.cell_center(layout.house_exit),
            scatter_corner: maze.cell_center(layout.scatter_corner(kind)),
            frightened: Countdown::stopped(),
            strategy: strategy_for(kind),
            target: spawn,
            bob_clock: 0.0,
        }
    }

    #[inline]
    pub fn kind(&self) -> PursuerKind {
        self.kind
    }

    #[inline]
    pub fn state(&self) -> PursuerState {
        self.state
    }

    /// Out of the house and steering by the grid
    #[inline]
    pub fn in_maze(&self) -> bool {
        self.location == Location::Maze
    }

    pub fn position(&self) -> Vec3 {
        if self.in_maze() {
            self.mover.position()
        } else {
            self.free_position
        }
    }

    /// Committed grid direction (None outside the maze)
    pub fn direction(&self) -> Option<Direction> {
        if self.in_maze() {
            self.mover.direction()
        } else {
            None
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn spawn(&self) -> Vec3 {
        self.spawn
    }

    pub fn scatter_corner(&self) -> Vec3 {
        self.scatter_corner
    }

    /// Time left in Frightened (0 in any other state)
    pub fn frightened_time_remaining(&self) -> f32 {
        if self.state == PursuerState::Frightened {
            self.frightened.remaining()
        } else {
            0.0
        }
    }

    /// Frightened and close to running out
    pub fn is_flashing(&self, tuning: &Tuning) -> bool {
        self.state == PursuerState::Frightened && self.frightened.remaining() <= tuning.flash_threshold
    }

    /// Indicator phase: on for the first half of each flash period
    pub fn flash_on(&self, tuning: &Tuning) -> bool {
        if !self.is_flashing(tuning) {
            return true;
        }
        let phase = (self.frightened.remaining() * tuning.flash_rate).floor() as i64;
        phase % 2 == 0
    }

    /// Leave the house. Ignored unless idling in it (frightened or not).
    pub fn release(&mut self) -> bool {
        let idle = matches!(self.state, PursuerState::InHouse | PursuerState::Frightened);
        if self.location != Location::House || !idle {
            return false;
        }
        log::debug!("{:?} released", self.kind);
        self.location = Location::Leaving;
        if self.state == PursuerState::InHouse {
            self.state = PursuerState::ExitingHouse;
        }
        true
    }

    /// Energizer: flee, and reverse if already in the maze. An eaten
    /// pursuer keeps heading home.
    pub fn enter_frightened(&mut self, maze: &MazeGrid, duration: f32) -> bool {
        if self.state == PursuerState::Eaten {
            return false;
        }
        self.frightened.start(duration);
        if self.in_maze() && self.state != PursuerState::Frightened {
            self.mover.reverse(maze);
        }
        self.state = PursuerState::Frightened;
        true
    }

    /// Follow a global chase/scatter change. Other states are left alone.
    pub fn set_global_mode(&mut self, mode: GlobalMode) {
        if matches!(self.state, PursuerState::Chase | PursuerState::Scatter) {
            self.state = mode.into();
        }
    }

    /// Caught by the player while frightened
    pub fn mark_eaten(&mut self) -> bool {
        if self.state != PursuerState::Frightened {
            return false;
        }
        log::debug!("{:?} eaten", self.kind);
        self.free_position = self.position();
        self.frightened.stop();
        self.state = PursuerState::Eaten;
        true
    }

    /// Back to the spawn point, idle, with every timer cleared
    pub fn reset_to_house(&mut self, maze: &MazeGrid) {
        self.state = PursuerState::InHouse;
        self.location = Location::House;
        self.free_position = self.spawn;
        self.mover.place(maze, maze.world_to_grid(self.spawn));
        self.frightened.stop();
        self.strategy.reset();
        self.target = self.spawn;
        self.bob_clock = 0.0;
    }

    /// Advance one tick
    pub fn tick(&mut self, dt: f32, ctx: &PursuitContext, rng: &mut Pcg32) -> Option<PursuerSignal> {
        if self.state == PursuerState::Frightened && self.frightened.tick(dt) {
            self.state = match self.location {
                Location::House => PursuerState::InHouse,
                Location::Leaving => PursuerState::ExitingHouse,
                Location::Maze => ctx.global_mode.into(),
            };
            log::debug!("{:?} recovered into {:?}", self.kind, self.state);
        }

        match (self.state, self.location) {
            (PursuerState::Eaten, Location::Maze) => self.tick_eaten(dt, ctx, rng),
            (PursuerState::Eaten, _) => {
                // Caught before reaching the maze: the house center is in a straight line
                let step = ctx.tuning.eaten_speed * ctx.speed_multiplier * dt;
                self.free_position = move_towards(self.free_position, self.house_center, step);
                self.arrive_home(ctx)
            }
            (_, Location::House) => {
                self.bob_clock += dt;
                let bob = (self.bob_clock * ctx.tuning.bob_speed).sin() * ctx.tuning.bob_amount;
                self.free_position = self.spawn + Vec3::Y * bob;
                None
            }
            (_, Location::Leaving) => self.tick_leaving(dt, ctx),
            (_, Location::Maze) => {
                self.tick_active(dt, ctx, rng);
                None
            }
        }
    }

    fn tick_leaving(&mut self, dt: f32, ctx: &PursuitContext) -> Option<PursuerSignal> {
        let tuning = ctx.tuning;
        let frightened = self.state == PursuerState::Frightened;
        let base = if frightened {
            tuning.frightened_speed
        } else {
            tuning.pursuer_speed
        };
        let step = base * ctx.speed_multiplier * dt;
        self.free_position = move_towards(self.free_position, self.house_exit, step);
        if planar_distance(self.free_position, self.house_exit) > tuning.house_exit_radius * ctx.maze.cell_size() {
            return None;
        }

        self.mover.place(ctx.maze, ctx.maze.world_to_grid(self.house_exit));
        self.mover.set_direction(Some(Direction::Forward));
        self.location = Location::Maze;
        if !frightened {
            self.state = ctx.global_mode.into();
        }
        log::debug!("{:?} left the house in {:?}", self.kind, self.state);
        Some(PursuerSignal::LeftHouse)
    }

    fn tick_active(&mut self, dt: f32, ctx: &PursuitContext, rng: &mut Pcg32) {
        let tuning = ctx.tuning;
        let legal = Legality::probed(ctx.maze, ctx.walls, tuning.probe_radius);
        let chase = ChaseContext {
            legal: &legal,
            tuning,
            position: self.mover.position(),
            direction: self.mover.direction(),
            player_position: ctx.player_position,
            player_facing: ctx.player_facing,
            scatter_corner: self.scatter_corner,
            dt,
        };

        // Chase targets are live every tick; Inky's re-roll clock depends on it.
        match self.state {
            PursuerState::Chase => self.target = self.strategy.chase_target(&chase, rng),
            PursuerState::Scatter => self.target = self.scatter_corner,
            _ => {}
        }

        let frightened = self.state == PursuerState::Frightened;
        if frightened && self.mover.at_node(ctx.maze) {
            self.target = wander_target(&chase, rng);
        }

        let base = if frightened {
            tuning.frightened_speed
        } else {
            tuning.pursuer_speed
        };
        self.step_on_grid(dt, base * ctx.speed_multiplier, &legal, frightened, rng);
    }

    /// Head for the house center along the corridors
    fn tick_eaten(&mut self, dt: f32, ctx: &PursuitContext, rng: &mut Pcg32) -> Option<PursuerSignal> {
        let legal = Legality::probed(ctx.maze, ctx.walls, ctx.tuning.probe_radius);
        self.target = self.house_center;
        self.step_on_grid(dt, ctx.tuning.eaten_speed * ctx.speed_multiplier, &legal, false, rng);
        self.arrive_home(ctx)
    }

    /// Pick a direction at each node toward `self.target`, then move
    fn step_on_grid(&mut self, dt: f32, speed: f32, legal: &Legality, allow_reverse: bool, rng: &mut Pcg32) {
        if self.mover.at_node(legal.maze()) {
            let next = decide_next_direction(
                legal,
                self.mover.target_cell(),
                self.mover.direction(),
                self.target,
                allow_reverse,
                rng,
            );
            self.mover.buffer(next);
        }
        self.mover.tick(dt, speed, legal);
    }

    /// Back in the house once within the return radius of its center
    fn arrive_home(&mut self, ctx: &PursuitContext) -> Option<PursuerSignal> {
        let reach = ctx.tuning.house_return_radius * ctx.maze.cell_size();
        if planar_distance(self.position(), self.house_center) > reach {
            return None;
        }
        self.free_position = self.spawn;
        self.location = Location::House;
        self.state = PursuerState::InHouse;
        self.target = self.spawn;
        self.bob_clock = 0.0;
        log::debug!("{:?} back in the house", self.kind);
        Some(PursuerSignal::ReturnedHome)
    }
}
