//! Fixed timestep simulation tick
//!
//! Core game loop that advances the round deterministically, plus the round
//! controller's callbacks and commands.

use super::coordinator::{CoordinatorEvent, GlobalMode};
use super::direction::Direction;
use super::motion::Legality;
use super::player::PowerUpItem;
use super::pursuer::{PursuerKind, PursuitContext};
use super::state::{GameEvent, GameState, Pellet, PelletField, RoundAction, RoundPhase, RoundState};
use crate::planar_distance;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Requested direction; `None` keeps the previous request
    pub direction: Option<Direction>,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            RoundPhase::Playing => {
                state.phase = RoundPhase::Paused;
                log::debug!("Paused");
                return;
            }
            RoundPhase::Paused => {
                state.phase = RoundPhase::Playing;
                log::debug!("Resumed");
            }
            _ => {}
        }
    }

    // Don't tick if paused or game over
    match state.phase {
        RoundPhase::Paused | RoundPhase::GameOver => return,
        _ => {}
    }

    state.time_ticks += 1;

    for action in state.schedule.tick(dt) {
        match action {
            RoundAction::ResetRound => state.reset_round(),
        }
    }

    // The world holds still while a reset is pending
    if state.phase != RoundPhase::Playing {
        return;
    }

    let speed_multiplier = state.speed_multiplier();

    // Player
    state.player.set_input(input.direction);
    let player_speed = state.tuning.player_speed * speed_multiplier;
    let legal = Legality::probed(&state.maze, &state.walls, state.tuning.probe_radius);
    for kind in state.player.tick(dt, &legal, player_speed) {
        state.events.push(GameEvent::PowerUpExpired { kind });
    }

    state.collect_pellet();
    if state.phase != RoundPhase::Playing {
        return;
    }

    // Pursuers
    let ctx = PursuitContext {
        maze: &state.maze,
        walls: &state.walls,
        tuning: &state.tuning,
        player_position: state.player.position(),
        player_facing: state.player.facing(),
        global_mode: state.coordinator.global_mode(),
        speed_multiplier,
    };
    let mut reports = Vec::new();
    state.coordinator.tick(dt, &ctx, &mut reports);

    for report in reports {
        state.dispatch(report);
    }
}

impl GameState {
    /// Eat whatever pellet sits under the player
    fn collect_pellet(&mut self) {
        let cell = self.player.cell(&self.maze);
        let reach = self.tuning.pickup_radius * self.maze.cell_size();
        if planar_distance(self.player.position(), self.maze.cell_center(cell)) > reach {
            return;
        }
        match self.pellets.take(cell) {
            Some(Pellet::Dot) => {
                self.events.push(GameEvent::DotEaten { cell });
                self.on_dot_eaten();
            }
            Some(Pellet::Energizer) => {
                self.events.push(GameEvent::EnergizerEaten { cell });
                self.on_energizer_eaten();
            }
            None => {}
        }
    }

    fn dispatch(&mut self, report: CoordinatorEvent) {
        match report {
            CoordinatorEvent::Released(kind) => {
                self.events.push(GameEvent::PursuerReleased { kind });
            }
            CoordinatorEvent::ReturnedHome(kind) => {
                self.events.push(GameEvent::PursuerReturned { kind });
            }
            CoordinatorEvent::ModeChanged(mode) => {
                self.events.push(GameEvent::ModeChanged { mode });
            }
            CoordinatorEvent::PursuerEaten(kind) => {
                self.on_ghost_eaten(kind);
            }
            CoordinatorEvent::PlayerCaught => {
                self.on_player_caught();
            }
        }
    }

    fn consume_pellet(&mut self) {
        self.round.dots_remaining = self.round.dots_remaining.saturating_sub(1);
        self.round.dots_eaten += 1;
        if self.round.dots_remaining == 0 && self.phase == RoundPhase::Playing {
            self.complete_level();
        }
    }

    // === Callbacks ===

    pub fn on_dot_eaten(&mut self) {
        self.round.score += u64::from(self.tuning.dot_score);
        self.consume_pellet();
    }

    pub fn on_energizer_eaten(&mut self) {
        self.round.score += u64::from(self.tuning.energizer_score);
        self.coordinator.on_energizer_eaten(&self.maze, &self.tuning);
        self.consume_pellet();
    }

    /// Award the combo score for eating `kind`
    pub fn on_ghost_eaten(&mut self, kind: PursuerKind) -> u32 {
        let score = self.coordinator.on_ghost_eaten(kind, &self.tuning);
        self.round.score += u64::from(score);
        self.events.push(GameEvent::GhostEaten { kind, score });
        score
    }

    /// Bonus fruit collected; the spawner decides what it is worth
    pub fn on_fruit_eaten(&mut self, score: u32) {
        self.round.score += u64::from(score);
        self.events.push(GameEvent::FruitEaten { score });
        log::debug!("Fruit eaten for {}", score);
    }

    /// Lose a life unless the catch does not count. Returns whether it counted.
    pub fn on_player_caught(&mut self) -> bool {
        if self.phase != RoundPhase::Playing || !self.player.is_alive() || self.player.is_invincible() {
            return false;
        }

        self.round.lives = self.round.lives.saturating_sub(1);
        self.player.kill();
        self.events.push(GameEvent::PlayerCaught);
        self.events.push(GameEvent::LifeLost {
            lives_left: self.round.lives,
        });
        log::info!("Player caught, {} lives left", self.round.lives);

        if self.round.lives == 0 {
            self.schedule.cancel_all();
            self.phase = RoundPhase::GameOver;
            self.events.push(GameEvent::GameOver {
                score: self.round.score,
            });
            log::info!("Game over, score {}", self.round.score);
        } else {
            self.begin_reset();
        }
        true
    }

    // === Round flow ===

    /// Freeze the world and schedule a round reset, replacing any pending one
    fn begin_reset(&mut self) {
        self.phase = RoundPhase::Resetting;
        self.schedule.cancel_all();
        self.schedule
            .after(self.tuning.reset_delay, RoundAction::ResetRound);
    }

    fn reset_round(&mut self) {
        self.reset_all_pursuers();
        self.reset_player();
        self.phase = RoundPhase::Playing;
        self.events.push(GameEvent::RoundReset);
        log::info!("Round reset (level {})", self.round.level);
    }

    fn complete_level(&mut self) {
        let cleared = self.round.level;
        self.round.level += 1;
        self.pellets = PelletField::from_maze(&self.maze);
        self.round.dots_remaining = self.pellets.len() as u32;
        self.events.push(GameEvent::LevelComplete { level: cleared });
        log::info!(
            "Level {} complete, speed x{:.2} next",
            cleared,
            self.speed_multiplier()
        );
        self.begin_reset();
    }

    // === Commands ===

    /// Release a pursuer from the house now
    pub fn release_pursuer(&mut self, kind: PursuerKind) -> bool {
        let released = self.coordinator.release(kind);
        if released {
            self.events.push(GameEvent::PursuerReleased { kind });
        }
        released
    }

    /// Cancel pending releases and respawns, send every pursuer home, start over
    pub fn reset_all_pursuers(&mut self) {
        self.coordinator.reset_all(&self.maze, &self.tuning);
    }

    /// Player back at the start cell, alive, with no power-ups
    pub fn reset_player(&mut self) {
        self.player.reset_to_start(&self.maze);
        self.player.revive();
    }

    pub fn set_global_mode(&mut self, mode: GlobalMode) {
        self.coordinator.set_global_mode(mode, &self.tuning);
        self.events.push(GameEvent::ModeChanged { mode });
    }

    /// Apply a collected power-up item, with its duration scaled by level
    pub fn grant_power_up(&mut self, item: PowerUpItem) {
        let duration = self.tuning.power_up_duration(self.round.level);
        self.player
            .apply_item(item, duration, self.tuning.booster_speed_multiplier);
        self.events.push(GameEvent::PowerUpGranted { item });
    }

    /// Start a new game at level 1
    pub fn restart(&mut self) {
        self.schedule.cancel_all();
        self.pellets = PelletField::from_maze(&self.maze);
        self.round = RoundState::new(&self.tuning, self.pellets.len() as u32);
        self.events.clear();
        self.time_ticks = 0;
        self.reset_round();
        log::info!("New game started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::maze::{GridPos, MazeGrid};
    use crate::sim::pursuer::PursuerState;
    use crate::sim::sdf::ground;
    use crate::sim::walls::{WallBox, WallGeometry};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn classic() -> GameState {
        GameState::classic(Tuning::default()).unwrap()
    }

    fn run(state: &mut GameState, input: &TickInput, seconds: f32) {
        for _ in 0..(seconds / SIM_DT).round() as usize {
            tick(state, input, SIM_DT);
        }
    }

    #[test]
    fn test_eating_a_dot() {
        let mut state = classic();
        let before = state.round.dots_remaining;
        let input = TickInput {
            direction: Some(Direction::Right),
            ..Default::default()
        };
        run(&mut state, &input, 0.3);

        assert_eq!(state.round.score, 10);
        assert_eq!(state.round.dots_remaining, before - 1);
        assert_eq!(state.pellets().get(GridPos::new(11, 16)), None);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::DotEaten {
            cell: GridPos::new(11, 16)
        }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_tick_pause() {
        let mut state = classic();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, RoundPhase::Paused);

        let ticks = state.time_ticks;
        run(&mut state, &TickInput::default(), 2.0);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.coordinator.count_in(PursuerState::InHouse), 4);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, RoundPhase::Playing);
    }

    #[test]
    fn test_caught_loses_life_then_resets() {
        let mut state = classic();
        let input = TickInput {
            direction: Some(Direction::Left),
            ..Default::default()
        };
        run(&mut state, &input, 0.5);
        state.release_pursuer(PursuerKind::Blinky);
        run(&mut state, &TickInput::default(), 1.0);

        assert!(state.on_player_caught());
        assert_eq!(state.round.lives, 2);
        assert_eq!(state.phase, RoundPhase::Resetting);
        // A second catch during the reset delay does not count
        assert!(!state.on_player_caught());
        assert_eq!(state.round.lives, 2);

        let frozen = state.player.position();
        run(&mut state, &input, 1.9);
        assert_eq!(state.phase, RoundPhase::Resetting);
        assert_eq!(state.player.position(), frozen);

        run(&mut state, &TickInput::default(), 0.2);
        assert_eq!(state.phase, RoundPhase::Playing);
        assert!(state.player.is_alive());
        assert_eq!(state.player.cell(state.maze()), state.layout().player_start);
        assert_eq!(state.coordinator.count_in(PursuerState::InHouse), 4);
        assert!(state.drain_events().contains(&GameEvent::RoundReset));
    }

    #[test]
    fn test_game_over_after_last_life() {
        let mut state = classic();
        for lives_left in (0..3).rev() {
            assert!(state.on_player_caught());
            assert_eq!(state.round.lives, lives_left);
            run(&mut state, &TickInput::default(), 2.1);
        }
        assert_eq!(state.phase, RoundPhase::GameOver);
        assert!(state.drain_events().contains(&GameEvent::GameOver { score: 0 }));

        let ticks = state.time_ticks;
        run(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.time_ticks, ticks);
        assert!(!state.on_player_caught());

        state.restart();
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.round.lives, 3);
        assert_eq!(state.round.level, 1);
    }

    #[test]
    fn test_invincible_player_is_not_caught() {
        let mut state = classic();
        state.grant_power_up(PowerUpItem::HealthOrb);
        assert!(!state.on_player_caught());
        assert_eq!(state.round.lives, 3);
        assert_eq!(state.phase, RoundPhase::Playing);
    }

    #[test]
    fn test_energizer_frightens_and_combo_scores() {
        let mut state = classic();
        state.release_pursuer(PursuerKind::Blinky);
        run(&mut state, &TickInput::default(), 1.0);
        let dots = state.round.dots_remaining;

        state.on_energizer_eaten();
        assert_eq!(state.round.score, 50);
        assert_eq!(state.round.dots_remaining, dots - 1);
        let blinky = state.coordinator.pursuer(PursuerKind::Blinky).unwrap();
        assert_eq!(blinky.state(), PursuerState::Frightened);

        assert_eq!(state.on_ghost_eaten(PursuerKind::Blinky), 200);
        assert_eq!(state.on_ghost_eaten(PursuerKind::Pinky), 400);
        assert_eq!(state.round.score, 650);
    }

    #[test]
    fn test_fruit_adds_score_without_touching_pellets() {
        let mut state = classic();
        let dots = state.round.dots_remaining;
        state.on_fruit_eaten(100);
        state.on_fruit_eaten(300);
        assert_eq!(state.round.score, 400);
        assert_eq!(state.round.dots_remaining, dots);
        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::FruitEaten { score: 100 },
                GameEvent::FruitEaten { score: 300 },
            ]
        );
    }

    #[test]
    fn test_hand_placed_wall_stops_player() {
        let maze = MazeGrid::parse("#######\n#P   G#\n#######", 1.0).unwrap();
        let mut walls = WallGeometry::from_maze(&maze);
        walls.push(WallBox::new(ground(maze.cell_center(GridPos::new(3, 1))), Vec2::splat(0.5)));
        let mut state = GameState::with_walls(maze, walls, Tuning::default()).unwrap();

        let input = TickInput {
            direction: Some(Direction::Right),
            ..Default::default()
        };
        run(&mut state, &input, 0.5);
        assert_eq!(state.player.position(), state.maze().cell_center(GridPos::new(2, 1)));
    }

    #[test]
    fn test_clearing_the_last_pellet_advances_level() {
        let maze = MazeGrid::parse("#######\n#P.  G#\n#######", 1.0).unwrap();
        let mut state = GameState::new(maze, Tuning::default()).unwrap();
        assert_eq!(state.round.dots_remaining, 1);

        let input = TickInput {
            direction: Some(Direction::Right),
            ..Default::default()
        };
        run(&mut state, &input, 0.3);
        assert_eq!(state.round.level, 2);
        assert_eq!(state.phase, RoundPhase::Resetting);
        assert_eq!(state.round.dots_remaining, 1);
        assert!(state.drain_events().contains(&GameEvent::LevelComplete { level: 1 }));

        run(&mut state, &TickInput::default(), 2.1);
        assert_eq!(state.phase, RoundPhase::Playing);
        assert_eq!(state.player.cell(state.maze()), GridPos::new(1, 1));
        assert!((state.speed_multiplier() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_set_global_mode_command() {
        let mut state = classic();
        state.set_global_mode(GlobalMode::Scatter);
        assert_eq!(state.coordinator.global_mode(), GlobalMode::Scatter);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::ModeChanged { mode: GlobalMode::Scatter })
        );
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning {
            seed: 99,
            ..Tuning::default()
        };
        let mut state1 = GameState::classic(tuning.clone()).unwrap();
        let mut state2 = GameState::classic(tuning).unwrap();

        let inputs = [
            TickInput {
                direction: Some(Direction::Left),
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                direction: Some(Direction::Back),
                ..Default::default()
            },
        ];

        for input in &inputs {
            run(&mut state1, input, 4.0);
            run(&mut state2, input, 4.0);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.round, state2.round);
        assert_eq!(state1.player.position(), state2.player.position());
        for (a, b) in state1
            .coordinator
            .pursuers()
            .iter()
            .zip(state2.coordinator.pursuers())
        {
            assert_eq!(a.state(), b.state());
            assert_eq!(a.position(), b.position());
        }
    }
}
