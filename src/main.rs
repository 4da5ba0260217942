//! Maze Chase headless runner
//!
//! Plays a seeded round with a random-walk pilot, logs game events, and
//! prints a JSON summary.
//!
//! Usage: `maze-chase [seconds] [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use anyhow::{Context, Result};
    use rand::seq::IndexedRandom;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use serde::Serialize;

    use maze_chase::Tuning;
    use maze_chase::consts::*;
    use maze_chase::sim::{
        Direction, GameEvent, GameState, PursuerKind, PursuerState, RoundPhase, RoundState,
        TickInput, tick,
    };

    /// Render-rate frame length fed to the accumulator
    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Frames between pilot direction changes, on average
    const PILOT_TURN_FRAMES: u32 = 30;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        accumulator: f32,
        input: TickInput,
        pilot: Pcg32,
        events_seen: usize,
    }

    impl Game {
        fn new(state: GameState, seed: u64) -> Self {
            Self {
                state,
                accumulator: 0.0,
                input: TickInput::default(),
                pilot: Pcg32::seed_from_u64(seed ^ 0x5eed_0f_91a7),
                events_seen: 0,
            }
        }

        /// Sample input once per frame
        fn steer(&mut self) {
            if self.pilot.random_ratio(1, PILOT_TURN_FRAMES) {
                self.input.direction = Direction::ALL.choose(&mut self.pilot).copied();
            } else {
                self.input.direction = None;
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input;
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.direction = None;
                self.input.pause = false;
            }

            for event in self.state.drain_events() {
                self.events_seen += 1;
                log_event(&event);
            }
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::DotEaten { .. } | GameEvent::EnergizerEaten { .. } => {
                log::trace!("{:?}", event)
            }
            GameEvent::PowerUpGranted { .. } | GameEvent::PowerUpExpired { .. } => {
                log::debug!("{:?}", event)
            }
            _ => log::info!("{:?}", event),
        }
    }

    #[derive(Serialize)]
    struct PursuerSummary {
        kind: PursuerKind,
        state: PursuerState,
        position: [f32; 3],
    }

    #[derive(Serialize)]
    struct Summary {
        seed: u64,
        seconds: f32,
        ticks: u64,
        phase: RoundPhase,
        round: RoundState,
        events: usize,
        pursuers: Vec<PursuerSummary>,
    }

    fn summarize(game: &Game, seconds: f32) -> Summary {
        let state = &game.state;
        Summary {
            seed: state.tuning.seed,
            seconds,
            ticks: state.time_ticks,
            phase: state.phase,
            round: state.round,
            events: game.events_seen,
            pursuers: state
                .coordinator
                .pursuers()
                .iter()
                .map(|p| PursuerSummary {
                    kind: p.kind(),
                    state: p.state(),
                    position: p.position().to_array(),
                })
                .collect(),
        }
    }

    pub fn run() -> Result<()> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let seconds: f32 = match args.first() {
            Some(s) => s
                .parse()
                .with_context(|| format!("invalid duration in seconds: {s:?}"))?,
            None => 60.0,
        };

        let mut tuning = match args.get(2) {
            Some(path) => Tuning::load(path).with_context(|| format!("loading tuning from {path}"))?,
            None => Tuning::default(),
        };
        if let Some(seed) = args.get(1) {
            tuning.seed = seed
                .parse()
                .with_context(|| format!("invalid seed: {seed:?}"))?;
        }
        let seed = tuning.seed;

        let state = GameState::classic(tuning).context("building the bundled maze")?;
        let mut game = Game::new(state, seed);
        log::info!("Running {:.1}s of simulation with seed {}", seconds, seed);

        let frames = (seconds / FRAME_DT).ceil() as u64;
        for _ in 0..frames {
            game.steer();
            game.update(FRAME_DT);
            if game.state.phase == RoundPhase::GameOver {
                break;
            }
        }

        let summary = summarize(&game, seconds);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Maze Chase (headless) starting...");

    if let Err(e) = runner::run() {
        log::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product on wasm; there is no headless runner
}
