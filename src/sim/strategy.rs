//! Per-kind chase targeting
//!
//! Each pursuer picks its chase target through a [`ChaseTargetStrategy`]
//! chosen when it is created. Targets are world points; the direction
//! chooser only ever moves one node toward them.

use std::fmt;

use glam::Vec3;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::direction::Direction;
use super::maze::GridPos;
use super::motion::Legality;
use super::pursuer::PursuerKind;
use crate::tuning::Tuning;
use crate::{planar_distance, snap_to_axis};

/// Everything a strategy may look at when choosing a target
#[derive(Debug, Clone, Copy)]
pub struct ChaseContext<'a> {
    pub legal: &'a Legality<'a>,
    pub tuning: &'a Tuning,
    /// Pursuer position and committed direction
    pub position: Vec3,
    pub direction: Option<Direction>,
    pub player_position: Vec3,
    /// Direction the player is facing (any ground-plane vector)
    pub player_facing: Vec3,
    pub scatter_corner: Vec3,
    pub dt: f32,
}

impl ChaseContext<'_> {
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.legal.maze().cell_size()
    }

    /// Node the pursuer is on or heading for
    pub fn cell(&self) -> GridPos {
        self.legal.maze().world_to_grid(self.position)
    }
}

/// Chase target selection, evaluated every tick while chasing
pub trait ChaseTargetStrategy: fmt::Debug {
    fn chase_target(&mut self, ctx: &ChaseContext, rng: &mut Pcg32) -> Vec3;

    /// Forget any persisted decision (round reset)
    fn reset(&mut self) {}
}

/// Strategy for a given kind
pub fn strategy_for(kind: PursuerKind) -> Box<dyn ChaseTargetStrategy> {
    match kind {
        PursuerKind::Blinky => Box::new(DirectPursuit),
        PursuerKind::Pinky => Box::new(Ambush),
        PursuerKind::Inky => Box::new(Hybrid::default()),
        PursuerKind::Clyde => Box::new(Shy),
    }
}

/// Random legal direction that is not a reversal, falling back to reversing
pub fn random_open_direction(
    legal: &Legality,
    cell: GridPos,
    current: Option<Direction>,
    rng: &mut Pcg32,
) -> Option<Direction> {
    let reverse = current.map(Direction::opposite);
    let mut dirs = Direction::ALL;
    dirs.shuffle(rng);
    dirs.into_iter()
        .filter(|&d| Some(d) != reverse)
        .find(|&d| legal.allows(cell, d))
        .or(reverse)
}

/// A point a few cells out along a random open direction
pub fn wander_target(ctx: &ChaseContext, rng: &mut Pcg32) -> Vec3 {
    let reach = ctx.tuning.wander_cells * ctx.cell_size();
    match random_open_direction(ctx.legal, ctx.cell(), ctx.direction, rng) {
        Some(dir) => ctx.position + dir.as_vec3() * reach,
        None => ctx.position,
    }
}

/// Blinky: straight at the player
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectPursuit;

impl ChaseTargetStrategy for DirectPursuit {
    fn chase_target(&mut self, ctx: &ChaseContext, _rng: &mut Pcg32) -> Vec3 {
        ctx.player_position
    }
}

/// Pinky: a few cells ahead of where the player is facing
#[derive(Debug, Clone, Copy, Default)]
pub struct Ambush;

impl ChaseTargetStrategy for Ambush {
    fn chase_target(&mut self, ctx: &ChaseContext, _rng: &mut Pcg32) -> Vec3 {
        let ahead = snap_to_axis(ctx.player_facing);
        ctx.player_position + ahead * ctx.tuning.pinky_lead_cells * ctx.cell_size()
    }
}

/// What Inky is currently doing between re-rolls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HybridAim {
    Player,
    Wander(Vec3),
}

/// Inky: every interval, coin-flip between pursuit and a wander point
#[derive(Debug, Clone, Default)]
pub struct Hybrid {
    reroll_in: f32,
    aim: Option<HybridAim>,
}

impl Hybrid {
    pub fn aim(&self) -> Option<HybridAim> {
        self.aim
    }
}

impl ChaseTargetStrategy for Hybrid {
    fn chase_target(&mut self, ctx: &ChaseContext, rng: &mut Pcg32) -> Vec3 {
        self.reroll_in -= ctx.dt;
        if self.aim.is_none() || self.reroll_in <= 0.0 {
            self.reroll_in = ctx.tuning.inky_reroll_interval;
            let aim = if rng.random_bool(0.5) {
                HybridAim::Player
            } else {
                HybridAim::Wander(wander_target(ctx, rng))
            };
            log::trace!("Inky re-rolled aim: {:?}", aim);
            self.aim = Some(aim);
        }

        match self.aim {
            Some(HybridAim::Wander(point)) => point,
            _ => ctx.player_position,
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Clyde: chase from afar, retreat to his corner when close
#[derive(Debug, Clone, Copy, Default)]
pub struct Shy;

impl ChaseTargetStrategy for Shy {
    fn chase_target(&mut self, ctx: &ChaseContext, _rng: &mut Pcg32) -> Vec3 {
        let threshold = ctx.tuning.clyde_shy_cells * ctx.cell_size();
        if planar_distance(ctx.position, ctx.player_position) > threshold {
            ctx.player_position
        } else {
            ctx.scatter_corner
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::maze::MazeGrid;
    use rand::SeedableRng;

    fn ctx<'a>(legal: &'a Legality<'a>, tuning: &'a Tuning) -> ChaseContext<'a> {
        ChaseContext {
            legal,
            tuning,
            position: Vec3::ZERO,
            direction: Some(Direction::Forward),
            player_position: Vec3::ZERO,
            player_facing: Vec3::Z,
            scatter_corner: Vec3::new(-9.0, 0.0, -9.0),
            dt: 1.0 / 120.0,
        }
    }

    #[test]
    fn test_blinky_targets_player() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        let legal = Legality::grid(&maze);
        let tuning = Tuning::default();
        let mut c = ctx(&legal, &tuning);
        c.player_position = Vec3::new(3.0, 0.0, -2.0);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(DirectPursuit.chase_target(&c, &mut rng), c.player_position);
    }

    #[test]
    fn test_pinky_leads_four_cells_along_facing() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        let legal = Legality::grid(&maze);
        let tuning = Tuning::default();
        let mut c = ctx(&legal, &tuning);
        c.player_position = maze.grid_to_world(5, 5);
        c.player_facing = Vec3::new(0.0, 0.0, 1.0);

        let mut rng = Pcg32::seed_from_u64(1);
        let target = Ambush.chase_target(&c, &mut rng);
        assert_eq!(maze.world_to_grid(target), GridPos::new(5, 9));

        // Off-axis facing snaps to the dominant axis
        c.player_facing = Vec3::new(-0.9, 0.0, 0.2);
        let target = Ambush.chase_target(&c, &mut rng);
        assert_eq!(maze.world_to_grid(target), GridPos::new(1, 5));
    }

    #[test]
    fn test_clyde_threshold() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        let legal = Legality::grid(&maze);
        let tuning = Tuning::default();
        let mut c = ctx(&legal, &tuning);
        let mut rng = Pcg32::seed_from_u64(1);

        c.player_position = Vec3::new(9.0, 0.0, 0.0);
        assert_eq!(Shy.chase_target(&c, &mut rng), c.player_position);

        c.player_position = Vec3::new(7.0, 0.0, 0.0);
        assert_eq!(Shy.chase_target(&c, &mut rng), c.scatter_corner);
    }

    #[test]
    fn test_inky_decision_persists_until_reroll() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        let legal = Legality::grid(&maze);
        let tuning = Tuning::default();
        let mut c = ctx(&legal, &tuning);
        c.player_position = Vec3::new(4.0, 0.0, 4.0);
        let mut rng = Pcg32::seed_from_u64(7);
        let mut inky = Hybrid::default();

        let first = inky.chase_target(&c, &mut rng);
        let aim = inky.aim();
        assert!(aim.is_some());

        // Just under one interval: same aim, same target (player did not move)
        let ticks = (tuning.inky_reroll_interval / c.dt) as usize - 2;
        for _ in 0..ticks {
            assert_eq!(inky.chase_target(&c, &mut rng), first);
            assert_eq!(inky.aim(), aim);
        }

        inky.reset();
        assert!(inky.aim().is_none());
    }

    #[test]
    fn test_inky_player_aim_tracks_player() {
        let maze = MazeGrid::new(21, 21, 1.0).unwrap();
        let legal = Legality::grid(&maze);
        let tuning = Tuning::default();
        let mut c = ctx(&legal, &tuning);
        let mut inky = Hybrid {
            reroll_in: 1.0,
            aim: Some(HybridAim::Player),
        };
        let mut rng = Pcg32::seed_from_u64(3);

        c.player_position = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(inky.chase_target(&c, &mut rng), c.player_position);
        c.player_position = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(inky.chase_target(&c, &mut rng), c.player_position);
    }

    #[test]
    fn test_random_open_direction_avoids_reverse_and_walls() {
        // Dead-end corridor: only the way back is open
        let maze = MazeGrid::parse("#####\n#   #\n#####", 1.0).unwrap();
        let legal = Legality::grid(&maze);
        let mut rng = Pcg32::seed_from_u64(11);
        let end = GridPos::new(3, 1);
        for _ in 0..20 {
            assert_eq!(
                random_open_direction(&legal, end, Some(Direction::Right), &mut rng),
                Some(Direction::Left)
            );
        }
        let mid = GridPos::new(2, 1);
        for _ in 0..20 {
            assert_eq!(
                random_open_direction(&legal, mid, Some(Direction::Right), &mut rng),
                Some(Direction::Right)
            );
        }
    }
}
