//! Headless game core: bird physics, the pipe scheduler, collision tests and
//! the score/game-over state machine. Nothing here knows about terminals;
//! the host feeds it frame deltas and taps and reads back a [`Snapshot`].

pub mod collision;
pub mod config;
pub mod driver;
pub mod obstacle;
pub mod physics;
pub mod state;

use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

pub use self::config::SimulationConfig;
use self::{
    collision::{check_collision, Collision},
    obstacle::{ObstacleEvent, ObstacleScheduler, PipePair},
    physics::BirdState,
    state::GameState,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum SimEvent {
    Flapped,
    PipePassed { slot: usize, score: u32 },
    PipeRespawned { slot: usize, gap_offset: f32 },
    Collided(Collision),
    Restarted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    Flapped,
    Restarted,
}

/// Read-only view handed to the renderer once per frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub bird_x: f32,
    pub bird_y: f32,
    pub bird_velocity: f32,
    pub tilt: f32,
    pub pipes: Vec<PipePair>,
    pub score: u32,
    pub game_over: bool,
}

pub struct Simulation<R = StdRng> {
    config: SimulationConfig,
    bird: BirdState,
    obstacles: ObstacleScheduler,
    state: GameState,
    rng: R,
}

impl Simulation<StdRng> {
    /// Seeded runs draw the same gap sequence every time.
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> Simulation<R> {
    pub fn with_rng(config: SimulationConfig, mut rng: R) -> Self {
        let config = config.sanitized();
        let obstacles = ObstacleScheduler::new(&config, &mut rng);
        Self { bird: BirdState::new(config.initial_bird_y()), obstacles, state: GameState::new(), config, rng }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn bird(&self) -> &BirdState {
        &self.bird
    }

    pub fn pipes(&self) -> &[PipePair] {
        self.obstacles.pipes()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Advances the world by one frame: physics, then scrolling with pass and
    /// respawn detection, then the collision test. A no-op after game over or
    /// for a zero delta.
    pub fn tick(&mut self, dt: Duration) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if self.state.is_game_over() || dt.is_zero() {
            return events;
        }
        let dt = self.config.max_dt().map_or(dt, |max| dt.min(max)).as_secs_f32();

        self.bird.advance(dt, self.config.gravity);

        let mut obstacle_events = Vec::new();
        self.obstacles.advance(dt, self.state.score(), &self.config, &mut self.rng, &mut obstacle_events);
        for event in obstacle_events {
            match event {
                ObstacleEvent::Passed { slot } => {
                    if self.state.record_pass() {
                        debug!(slot, score = self.state.score(), "pipe passed");
                        events.push(SimEvent::PipePassed { slot, score: self.state.score() });
                    }
                },
                ObstacleEvent::Respawned { slot, gap_offset } => {
                    events.push(SimEvent::PipeRespawned { slot, gap_offset });
                },
            }
        }

        if let Some(collision) = check_collision(&self.bird, self.obstacles.pipes(), &self.config) {
            if self.state.collide() {
                info!(score = self.state.score(), ?collision, "game over");
                events.push(SimEvent::Collided(collision));
            }
        }

        events
    }

    /// The single input event: flap while playing, restart after game over.
    pub fn tap(&mut self) -> TapOutcome {
        if self.restart() {
            TapOutcome::Restarted
        } else {
            self.apply_impulse();
            TapOutcome::Flapped
        }
    }

    /// Sets the bird's velocity to the jump velocity. Rejected after game over.
    pub fn apply_impulse(&mut self) -> bool {
        if self.state.is_game_over() {
            return false;
        }
        self.bird.apply_impulse(self.config.jump_velocity);
        debug!(y = self.bird.y, "flap");
        true
    }

    /// Puts bird, pipes and score back to their starting values. Only
    /// accepted after game over.
    pub fn restart(&mut self) -> bool {
        if !self.state.restart() {
            return false;
        }
        self.bird = BirdState::new(self.config.initial_bird_y());
        self.obstacles.reset(&self.config, &mut self.rng);
        info!("restarted");
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bird_x: self.config.bird_x(),
            bird_y: self.bird.y,
            bird_velocity: self.bird.velocity,
            tilt: self.bird.tilt(),
            pipes: self.obstacles.pipes().to_vec(),
            score: self.state.score(),
            game_over: self.state.is_game_over(),
        }
    }
}
