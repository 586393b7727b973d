use std::{io::Write, time::Duration};

use color_eyre::eyre::Result;
use serde::Serialize;
use tracing::info;

use crate::{
    cli::Cli,
    simulation::{SimEvent, Simulation, SimulationConfig, Snapshot, TapOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessOptions {
    pub ticks: u64,
    pub dt: Duration,
    /// Tap on every tick that is a multiple of this. Zero never taps.
    pub tap_every: u64,
    pub seed: Option<u64>,
}

impl From<&Cli> for HeadlessOptions {
    fn from(cli: &Cli) -> Self {
        Self { ticks: cli.ticks, dt: Duration::from_millis(cli.dt_ms), tap_every: cli.tap_every, seed: cli.seed }
    }
}

#[derive(Debug, Serialize)]
struct TickRecord<'a> {
    tick: u64,
    tapped: Option<&'static str>,
    events: &'a [SimEvent],
    snapshot: &'a Snapshot,
}

#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    summary: &'a HeadlessSummary,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlessSummary {
    pub ticks: u64,
    pub passes: u32,
    pub best_score: u32,
    pub final_score: u32,
    pub collisions: u32,
    pub restarts: u32,
    pub game_over: bool,
}

/// Drives a simulation with a fixed tick length and writes one JSON object per
/// tick, followed by a summary line.
pub fn run_headless<W: Write>(
    config: SimulationConfig,
    opts: HeadlessOptions,
    out: &mut W,
) -> Result<HeadlessSummary> {
    info!(ticks = opts.ticks, dt = ?opts.dt, tap_every = opts.tap_every, seed = ?opts.seed, "headless run");
    let mut simulation = Simulation::new(config, opts.seed);
    let mut summary = HeadlessSummary::default();

    for tick in 0..opts.ticks {
        let tapped = if opts.tap_every > 0 && tick % opts.tap_every == 0 {
            match simulation.tap() {
                TapOutcome::Flapped => Some("flap"),
                TapOutcome::Restarted => {
                    summary.restarts += 1;
                    Some("restart")
                },
            }
        } else {
            None
        };

        let events = simulation.tick(opts.dt);
        for event in &events {
            match event {
                SimEvent::PipePassed { score, .. } => {
                    summary.passes += 1;
                    summary.best_score = summary.best_score.max(*score);
                },
                SimEvent::Collided(_) => summary.collisions += 1,
                _ => {},
            }
        }

        let snapshot = simulation.snapshot();
        serde_json::to_writer(&mut *out, &TickRecord { tick, tapped, events: &events, snapshot: &snapshot })?;
        writeln!(out)?;
    }

    summary.ticks = opts.ticks;
    summary.final_score = simulation.state().score();
    summary.game_over = simulation.state().is_game_over();
    serde_json::to_writer(&mut *out, &SummaryRecord { summary: &summary })?;
    writeln!(out)?;
    out.flush()?;

    info!(?summary, "headless run finished");
    Ok(summary)
}
