//! Player agent and power-ups
//!
//! The player is a [`GridMover`] fed by directional input. Its only states
//! are alive and dead; everything else is a timed power-up flag.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::maze::{GridPos, MazeGrid};
use super::motion::{GridMover, Legality, Motion};
use super::timer::Countdown;

/// Collectible items that grant power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpItem {
    /// Speed boost plus wall-pass
    BoosterBottle,
    /// Invincibility
    HealthOrb,
}

/// Individual timed effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    WallPass,
    SpeedBoost,
    Invincibility,
}

/// Independent countdowns for each effect
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerUps {
    wall_pass: Countdown,
    speed: Countdown,
    speed_multiplier: f32,
    invincible: Countdown,
}

impl PowerUps {
    /// Start (or restart) one effect
    pub fn grant(&mut self, kind: PowerUpKind, duration: f32) {
        match kind {
            PowerUpKind::WallPass => self.wall_pass.start(duration),
            PowerUpKind::SpeedBoost => self.speed.start(duration),
            PowerUpKind::Invincibility => self.invincible.start(duration),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Advance all countdowns; returns the effects that ran out this tick
    pub fn tick(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        if self.wall_pass.tick(dt) {
            expired.push(PowerUpKind::WallPass);
        }
        if self.speed.tick(dt) {
            expired.push(PowerUpKind::SpeedBoost);
        }
        if self.invincible.tick(dt) {
            expired.push(PowerUpKind::Invincibility);
        }
        expired
    }

    #[inline]
    pub fn wall_pass(&self) -> bool {
        self.wall_pass.is_running()
    }

    #[inline]
    pub fn invincible(&self) -> bool {
        self.invincible.is_running()
    }

    /// Current speed factor (1 when no boost is running)
    pub fn speed_multiplier(&self) -> f32 {
        if self.speed.is_running() {
            self.speed_multiplier
        } else {
            1.0
        }
    }

    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::WallPass => self.wall_pass.remaining(),
            PowerUpKind::SpeedBoost => self.speed.remaining(),
            PowerUpKind::Invincibility => self.invincible.remaining(),
        }
    }
}

/// The player's agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    mover: GridMover,
    start: GridPos,
    /// Last non-zero heading (used for ambush targeting)
    facing: Vec3,
    alive: bool,
    power: PowerUps,
}

impl Player {
    pub fn new(maze: &MazeGrid, start: GridPos) -> Self {
        Self {
            mover: GridMover::new(maze, start),
            start,
            facing: Vec3::Z,
            alive: true,
            power: PowerUps::default(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.mover.position()
    }

    /// Cell nearest to the player
    pub fn cell(&self, maze: &MazeGrid) -> GridPos {
        maze.world_to_grid(self.position())
    }

    #[inline]
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    #[inline]
    pub fn direction(&self) -> Option<Direction> {
        self.mover.direction()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.power.invincible()
    }

    #[inline]
    pub fn can_pass_walls(&self) -> bool {
        self.power.wall_pass()
    }

    pub fn power_ups(&self) -> &PowerUps {
        &self.power
    }

    /// Directional input for this tick. `None` keeps the previous request.
    pub fn set_input(&mut self, direction: Option<Direction>) {
        if direction.is_some() {
            self.mover.buffer(direction);
        }
    }

    /// Apply a collected item for `duration` seconds
    pub fn apply_item(&mut self, item: PowerUpItem, duration: f32, booster_multiplier: f32) {
        match item {
            PowerUpItem::BoosterBottle => {
                self.power.speed_multiplier = booster_multiplier;
                self.power.grant(PowerUpKind::SpeedBoost, duration);
                self.power.grant(PowerUpKind::WallPass, duration);
            }
            PowerUpItem::HealthOrb => self.power.grant(PowerUpKind::Invincibility, duration),
        }
        log::debug!("Power-up {:?} for {:.1}s", item, duration);
    }

    /// Advance power-ups and motion. Returns the effects that expired.
    ///
    /// `legal` is the usual test (grid plus wall probe); wall-pass skips it.
    pub fn tick(&mut self, dt: f32, legal: &Legality, base_speed: f32) -> Vec<PowerUpKind> {
        if !self.alive {
            return Vec::new();
        }
        let expired = self.power.tick(dt);

        let legal = if self.power.wall_pass() {
            Legality::unrestricted(legal.maze())
        } else {
            *legal
        };
        let speed = base_speed * self.power.speed_multiplier();
        if self.mover.tick(dt, speed, &legal) != Motion::Stalled {
            if let Some(dir) = self.mover.direction() {
                self.facing = dir.as_vec3();
            }
        }
        expired
    }

    /// Caught: stop moving until revived
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Alive again with every power-up cleared
    pub fn revive(&mut self) {
        self.alive = true;
        self.power.clear();
    }

    /// Back to the start cell, facing forward, with no pending input
    pub fn reset_to_start(&mut self, maze: &MazeGrid) {
        self.mover.place(maze, self.start);
        self.facing = Vec3::Z;
    }
}
