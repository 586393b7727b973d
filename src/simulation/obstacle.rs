use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use super::{collision::Rect, config::SimulationConfig};

/// A top and a bottom pipe sharing one horizontal position. The gap between
/// them is centered on `viewport_height / 2 + gap_offset`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PipePair {
    pub x: f32,
    pub gap_offset: f32,
}

impl PipePair {
    pub fn top_rect(&self, config: &SimulationConfig) -> Rect {
        Rect {
            x: self.x,
            y: self.gap_offset - config.pipe_height / 2.0,
            width: config.pipe_width,
            height: config.pipe_height,
        }
    }

    pub fn bottom_rect(&self, config: &SimulationConfig) -> Rect {
        Rect {
            x: self.x,
            y: config.viewport_height - config.pipe_height / 2.0 + self.gap_offset,
            width: config.pipe_width,
            height: config.pipe_height,
        }
    }

    pub fn rects(&self, config: &SimulationConfig) -> [Rect; 2] {
        [self.top_rect(config), self.bottom_rect(config)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum ObstacleEvent {
    /// The pipe's trailing edge went past the bird.
    Passed { slot: usize },
    /// The pipe scrolled off the left edge and was moved back to the right edge.
    Respawned { slot: usize, gap_offset: f32 },
}

/// Fixed ring of pipe pairs that scroll left and are recycled in place once
/// off screen. Slots never get allocated or dropped after construction.
#[derive(Clone, Debug)]
pub struct ObstacleScheduler {
    slots: Vec<PipePair>,
    speed: f32,
}

impl ObstacleScheduler {
    pub fn new<R: Rng>(config: &SimulationConfig, rng: &mut R) -> Self {
        let mut scheduler = Self { slots: Vec::with_capacity(config.pipe_slots), speed: 0.0 };
        scheduler.reset(config, rng);
        scheduler
    }

    /// Puts every slot back at its starting position, starting at the right
    /// edge, each with a fresh gap, and restores the base scroll speed.
    pub fn reset<R: Rng>(&mut self, config: &SimulationConfig, rng: &mut R) {
        let spacing = config.slot_spacing();
        self.slots.clear();
        for index in 0..config.pipe_slots {
            let x = config.viewport_width + spacing * index as f32;
            self.slots.push(PipePair { x, gap_offset: draw_gap_offset(config, rng) });
        }
        self.speed = config.scroll_speed(0);
    }

    pub fn pipes(&self) -> &[PipePair] {
        &self.slots
    }

    /// Current scroll speed in units/s.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Scrolls every slot by `speed * dt` and reports threshold crossings.
    ///
    /// Crossings are edge triggered on the slot's position before and after
    /// this step. All slots move before any crossing is handled, and slots are
    /// handled from the leftmost. A respawned slot goes back to the right edge
    /// inside the same step, so the jump back is never seen as a crossing.
    pub fn advance<R: Rng>(
        &mut self,
        dt: f32,
        score: u32,
        config: &SimulationConfig,
        rng: &mut R,
        events: &mut Vec<ObstacleEvent>,
    ) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let previous: Vec<f32> = self.slots.iter().map(|pipe| pipe.x).collect();
        for (slot, pipe) in self.slots.iter_mut().enumerate() {
            pipe.x -= self.speed * dt;
            trace!(slot, x = pipe.x, "pipe scrolled");
        }

        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        order.sort_by(|a, b| previous[*a].total_cmp(&previous[*b]));

        let pass_x = config.pass_x();
        let mut respawned = false;
        for slot in order {
            let x = self.slots[slot].x;
            if previous[slot] > pass_x && x <= pass_x {
                events.push(ObstacleEvent::Passed { slot });
            }

            if previous[slot] > config.respawn_x && x <= config.respawn_x {
                let respawn_x = self.respawn_position(slot, config);
                let pipe = &mut self.slots[slot];
                pipe.x = respawn_x;
                pipe.gap_offset = draw_gap_offset(config, rng);
                debug!(slot, x = pipe.x, gap_offset = pipe.gap_offset, "pipe respawned");
                events.push(ObstacleEvent::Respawned { slot, gap_offset: pipe.gap_offset });
                respawned = true;
            }
        }

        if respawned {
            // Points from this step count towards the new speed.
            let passed = events.iter().filter(|event| matches!(event, ObstacleEvent::Passed { .. })).count();
            self.speed = config.scroll_speed(score.saturating_add(passed as u32));
        }
    }

    /// A lone slot restarts at the right edge. With several slots the
    /// respawned one queues one spacing behind the rightmost other slot, which
    /// keeps the overshoot of this step and with it the ring's spacing. It
    /// never lands more than one spacing left of the right edge, so a step
    /// that flushed every slot at once rebuilds the ring from the edge.
    fn respawn_position(&self, slot: usize, config: &SimulationConfig) -> f32 {
        let spacing = config.slot_spacing();
        self.slots
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != slot)
            .map(|(_, pipe)| pipe.x)
            .reduce(f32::max)
            .map_or(config.viewport_width, |rightmost| (rightmost + spacing).max(config.viewport_width - spacing))
    }
}

/// Uniform draw from the configured closed range.
pub fn draw_gap_offset<R: Rng>(config: &SimulationConfig, rng: &mut R) -> f32 {
    let range = config.gap_range.abs();
    if range == 0.0 {
        return 0.0;
    }
    rng.gen_range(-range..=range)
}
