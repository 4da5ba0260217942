//! Mode coordinator
//!
//! Owns the pursuers and everything they share: the staged release
//! schedule, the chase/scatter timer, energizer broadcasts, the eat combo,
//! and respawns after a pursuer makes it home.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Contact, classify_contact, touching};
use super::maze::{LevelLayout, MazeGrid};
use super::pursuer::{Pursuer, PursuerKind, PursuerSignal, PursuerState, PursuitContext};
use super::timer::{Countdown, Schedule};
use crate::tuning::Tuning;

/// Behavior broadcast to every pursuer in Chase or Scatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GlobalMode {
    #[default]
    Chase,
    Scatter,
}

impl GlobalMode {
    pub fn toggled(self) -> Self {
        match self {
            GlobalMode::Chase => GlobalMode::Scatter,
            GlobalMode::Scatter => GlobalMode::Chase,
        }
    }
}

/// Deferred coordinator work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinatorAction {
    /// Staged release at round start
    Release(PursuerKind),
    /// Release again after returning home from being eaten
    Respawn(PursuerKind),
}

/// What happened during a coordinator tick, for the round controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorEvent {
    Released(PursuerKind),
    ReturnedHome(PursuerKind),
    ModeChanged(GlobalMode),
    /// A frightened pursuer touched the player and is now Eaten
    PursuerEaten(PursuerKind),
    /// At least one chasing pursuer touched the player this tick
    PlayerCaught,
}

/// Shared pursuer state and timers
#[derive(Debug)]
pub struct ModeCoordinator {
    pursuers: Vec<Pursuer>,
    global_mode: GlobalMode,
    mode_timer: Countdown,
    schedule: Schedule<CoordinatorAction>,
    combo: u32,
    rng: Pcg32,
}

impl ModeCoordinator {
    /// All four pursuers in the house, with the release sequence started
    pub fn new(maze: &MazeGrid, layout: &LevelLayout, tuning: &Tuning) -> Self {
        let pursuers = PursuerKind::ALL
            .into_iter()
            .map(|kind| Pursuer::new(kind, maze, layout))
            .collect();
        let mut coordinator = Self {
            pursuers,
            global_mode: GlobalMode::Chase,
            mode_timer: Countdown::stopped(),
            schedule: Schedule::new(),
            combo: 0,
            rng: Pcg32::seed_from_u64(tuning.seed),
        };
        coordinator.start_sequences(tuning);
        coordinator
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn pursuer(&self, kind: PursuerKind) -> Option<&Pursuer> {
        self.pursuers.iter().find(|p| p.kind() == kind)
    }

    fn pursuer_mut(&mut self, kind: PursuerKind) -> Option<&mut Pursuer> {
        self.pursuers.iter_mut().find(|p| p.kind() == kind)
    }

    #[inline]
    pub fn global_mode(&self) -> GlobalMode {
        self.global_mode
    }

    /// Pursuers eaten during the current energizer window
    #[inline]
    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Pending deferred actions with their remaining time
    pub fn pending(&self) -> impl Iterator<Item = (f32, &CoordinatorAction)> {
        self.schedule.iter()
    }

    /// Time until the next chase/scatter switch (0 when holding)
    pub fn mode_time_remaining(&self) -> f32 {
        self.mode_timer.remaining()
    }

    /// Staged releases and the mode cycle, from scratch
    fn start_sequences(&mut self, tuning: &Tuning) {
        for (i, kind) in PursuerKind::ALL.into_iter().enumerate() {
            let delay = tuning.first_release_delay + i as f32 * tuning.release_interval;
            self.schedule.after(delay, CoordinatorAction::Release(kind));
        }
        self.global_mode = GlobalMode::Chase;
        self.mode_timer.start(tuning.chase_duration);
    }

    /// Release a pursuer from the house now. No-op unless it is idling there.
    pub fn release(&mut self, kind: PursuerKind) -> bool {
        self.pursuer_mut(kind).is_some_and(Pursuer::release)
    }

    /// Force the global mode and restart its timer
    pub fn set_global_mode(&mut self, mode: GlobalMode, tuning: &Tuning) {
        let duration = match mode {
            GlobalMode::Chase => tuning.chase_duration,
            GlobalMode::Scatter => tuning.scatter_duration,
        };
        self.global_mode = mode;
        self.mode_timer.start(duration);
        for pursuer in &mut self.pursuers {
            pursuer.set_global_mode(mode);
        }
        log::debug!("Global mode: {:?} for {:.1}s", mode, duration);
    }

    /// Energizer eaten: reset the combo and frighten every pursuer not already eaten
    pub fn on_energizer_eaten(&mut self, maze: &MazeGrid, tuning: &Tuning) {
        self.combo = 0;
        let mut frightened = 0;
        for pursuer in &mut self.pursuers {
            if pursuer.enter_frightened(maze, tuning.frightened_duration) {
                frightened += 1;
            }
        }
        log::debug!("Energizer: {} pursuers frightened", frightened);
    }

    /// Score for eating a pursuer, escalating within one energizer window
    pub fn on_ghost_eaten(&mut self, kind: PursuerKind, tuning: &Tuning) -> u32 {
        let score = tuning.eat_score(self.combo);
        self.combo += 1;
        log::info!("{:?} eaten for {} (combo {})", kind, score, self.combo);
        score
    }

    /// Cancel everything pending, send all pursuers home, and start over
    pub fn reset_all(&mut self, maze: &MazeGrid, tuning: &Tuning) {
        self.schedule.cancel_all();
        self.mode_timer.stop();
        for pursuer in &mut self.pursuers {
            pursuer.reset_to_house(maze);
        }
        self.combo = 0;
        self.start_sequences(tuning);
    }

    /// Advance timers and pursuers, then resolve contacts with the player
    ///
    /// `ctx.global_mode` is ignored; pursuers always see the coordinator's mode.
    pub fn tick(&mut self, dt: f32, ctx: &PursuitContext, events: &mut Vec<CoordinatorEvent>) {
        let tuning = ctx.tuning;

        for action in self.schedule.tick(dt) {
            let (CoordinatorAction::Release(kind) | CoordinatorAction::Respawn(kind)) = action;
            if self.release(kind) {
                events.push(CoordinatorEvent::Released(kind));
            }
        }

        if self.mode_timer.tick(dt) {
            let next = if tuning.scatter_enabled {
                self.global_mode.toggled()
            } else {
                GlobalMode::Chase
            };
            let changed = next != self.global_mode;
            self.set_global_mode(next, tuning);
            if changed {
                events.push(CoordinatorEvent::ModeChanged(next));
            }
        }

        let ctx = PursuitContext {
            global_mode: self.global_mode,
            ..*ctx
        };
        for pursuer in &mut self.pursuers {
            if pursuer.tick(dt, &ctx, &mut self.rng) == Some(PursuerSignal::ReturnedHome) {
                let kind = pursuer.kind();
                self.schedule
                    .after(tuning.release_interval, CoordinatorAction::Respawn(kind));
                events.push(CoordinatorEvent::ReturnedHome(kind));
            }
        }

        let reach = tuning.catch_radius * ctx.maze.cell_size();
        let mut caught = false;
        for pursuer in &mut self.pursuers {
            if !touching(pursuer.position(), ctx.player_position, reach) {
                continue;
            }
            match classify_contact(pursuer.state()) {
                Contact::PursuerEaten => {
                    if pursuer.mark_eaten() {
                        events.push(CoordinatorEvent::PursuerEaten(pursuer.kind()));
                    }
                }
                Contact::PlayerCaught => caught = true,
                Contact::None => {}
            }
        }
        if caught {
            events.push(CoordinatorEvent::PlayerCaught);
        }
    }

    /// Number of pursuers currently in `state`
    pub fn count_in(&self, state: PursuerState) -> usize {
        self.pursuers.iter().filter(|p| p.state() == state).count()
    }
}
