use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::physics::interpolate;
use crate::constants::game;

/// Score-driven scroll speed-up: score `0..=max_score` maps the base scroll
/// speed multiplier linearly onto `1.0..=max_multiplier`, clamped beyond.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedScaling {
    pub max_score: u32,
    pub max_multiplier: f32,
}

impl Default for SpeedScaling {
    fn default() -> Self {
        Self { max_score: game::SPEED_SCALING_MAX_SCORE, max_multiplier: game::SPEED_SCALING_MAX_MULTIPLIER }
    }
}

impl SpeedScaling {
    pub fn multiplier(&self, score: u32) -> f32 {
        if self.max_score == 0 {
            return self.max_multiplier;
        }
        interpolate(score as f32, (0.0, self.max_score as f32), (1.0, self.max_multiplier))
    }
}

/// Everything the host injects into the simulation: viewport metrics, layout
/// constants and gameplay tunables. Distances are world units, the y axis
/// points down.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct SimulationConfig {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Downward acceleration in units/s².
    pub gravity: f32,
    /// Velocity the bird is set to on a flap. Negative is up.
    pub jump_velocity: f32,
    pub base_height: f32,
    pub pipe_width: f32,
    pub pipe_height: f32,
    pub bird_width: f32,
    pub bird_height: f32,
    /// Slack below the top of the ground band before the bird counts as grounded.
    pub ground_margin: f32,
    /// Time a pipe takes to scroll from the right edge to `scroll_end_x` at base speed.
    pub scroll_duration_ms: u64,
    pub scroll_end_x: f32,
    /// Pipes crossing this x are moved back to the right edge with a fresh gap.
    pub respawn_x: f32,
    /// Gap offsets are drawn uniformly from `-gap_range..=gap_range`.
    pub gap_range: f32,
    pub speed_scaling: Option<SpeedScaling>,
    pub pipe_slots: usize,
    /// Upper bound applied to each tick's dt. `None` integrates stalls as-is.
    pub max_dt_ms: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            viewport_width: game::VIEWPORT_WIDTH,
            viewport_height: game::VIEWPORT_HEIGHT,
            gravity: game::GRAVITY,
            jump_velocity: game::JUMP_VELOCITY,
            base_height: game::BASE_HEIGHT,
            pipe_width: game::PIPE_WIDTH,
            pipe_height: game::PIPE_HEIGHT,
            bird_width: game::BIRD_WIDTH,
            bird_height: game::BIRD_HEIGHT,
            ground_margin: game::GROUND_MARGIN,
            scroll_duration_ms: game::SCROLL_DURATION_MS,
            scroll_end_x: game::SCROLL_END_X,
            respawn_x: game::RESPAWN_X,
            gap_range: game::GAP_RANGE,
            speed_scaling: Some(SpeedScaling::default()),
            pipe_slots: 1,
            max_dt_ms: None,
        }
    }
}

impl SimulationConfig {
    /// Clamp values that would break the simulation's assumptions, logging
    /// each correction.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.viewport_width.is_finite() && self.viewport_width > 0.0) {
            warn!(value = self.viewport_width, "viewport_width must be positive, using default");
            self.viewport_width = defaults.viewport_width;
        }
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            warn!(value = self.viewport_height, "viewport_height must be positive, using default");
            self.viewport_height = defaults.viewport_height;
        }
        if !self.gap_range.is_finite() {
            warn!(value = self.gap_range, "gap_range must be finite, using default");
            self.gap_range = defaults.gap_range;
        } else if self.gap_range < 0.0 {
            warn!(value = self.gap_range, "gap_range must not be negative, using its magnitude");
            self.gap_range = self.gap_range.abs();
        }
        if self.pipe_slots == 0 {
            warn!("pipe_slots must be at least 1");
            self.pipe_slots = 1;
        }
        if self.scroll_duration_ms == 0 {
            warn!("scroll_duration_ms must be at least 1");
            self.scroll_duration_ms = 1;
        }
        for (name, value, default) in [
            ("gravity", &mut self.gravity, defaults.gravity),
            ("jump_velocity", &mut self.jump_velocity, defaults.jump_velocity),
            ("base_height", &mut self.base_height, defaults.base_height),
            ("pipe_width", &mut self.pipe_width, defaults.pipe_width),
            ("pipe_height", &mut self.pipe_height, defaults.pipe_height),
            ("bird_width", &mut self.bird_width, defaults.bird_width),
            ("bird_height", &mut self.bird_height, defaults.bird_height),
            ("ground_margin", &mut self.ground_margin, defaults.ground_margin),
            ("scroll_end_x", &mut self.scroll_end_x, defaults.scroll_end_x),
            ("respawn_x", &mut self.respawn_x, defaults.respawn_x),
        ] {
            if !value.is_finite() {
                warn!(name, value = *value, "must be finite, using default");
                *value = default;
            }
        }
        if self.respawn_x >= self.viewport_width {
            warn!(value = self.respawn_x, "respawn_x must lie left of the right edge, using default");
            self.respawn_x = defaults.respawn_x.min(self.viewport_width - 1.0);
        }
        if self.scroll_end_x >= self.viewport_width {
            warn!(value = self.scroll_end_x, "scroll_end_x must lie left of the right edge, using respawn_x");
            self.scroll_end_x = self.respawn_x;
        }
        if let Some(scaling) = self.speed_scaling.as_mut() {
            if !(scaling.max_multiplier.is_finite() && scaling.max_multiplier >= 1.0) {
                warn!(value = scaling.max_multiplier, "speed multiplier below 1 would slow the game down, clamping");
                scaling.max_multiplier = 1.0;
            }
        }
        if self.pass_x() <= self.respawn_x {
            warn!(
                pass_x = self.pass_x(),
                respawn_x = self.respawn_x,
                "pipes respawn before they pass the bird, no points can be scored"
            );
        }

        self
    }

    /// Fixed horizontal position of the bird sprite's left edge.
    pub fn bird_x(&self) -> f32 {
        self.viewport_width / 4.0
    }

    pub fn initial_bird_y(&self) -> f32 {
        self.viewport_height / 3.0
    }

    /// A pipe whose x drops to this value has its trailing edge past the bird.
    pub fn pass_x(&self) -> f32 {
        self.bird_x() - self.pipe_width
    }

    /// Scroll speed in units/s before any score multiplier.
    pub fn base_scroll_speed(&self) -> f32 {
        (self.viewport_width - self.scroll_end_x) / (self.scroll_duration_ms as f32 / 1000.0)
    }

    pub fn scroll_speed(&self, score: u32) -> f32 {
        let multiplier = self.speed_scaling.map_or(1.0, |scaling| scaling.multiplier(score));
        self.base_scroll_speed() * multiplier
    }

    /// Distance between neighbouring pipe slots.
    pub fn slot_spacing(&self) -> f32 {
        (self.viewport_width - self.respawn_x) / self.pipe_slots as f32
    }

    /// Bird y below which the bird has hit the ground band.
    pub fn ground_limit(&self) -> f32 {
        self.viewport_height - self.base_height + self.ground_margin
    }

    pub fn max_dt(&self) -> Option<Duration> {
        self.max_dt_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults_match_layout() {
        let config = SimulationConfig::default();
        assert_eq!(config.bird_x(), 100.0);
        assert_eq!(config.pass_x(), -3.0);
        assert_eq!(config.ground_limit(), 674.0);
        assert!((config.initial_bird_y() - 266.666_67).abs() < 1e-3);
        // 550 units in 3 seconds
        assert!((config.base_scroll_speed() - 183.333_33).abs() < 1e-3);
    }

    #[test]
    fn test_speed_scaling_interpolates_and_clamps() {
        let scaling = SpeedScaling::default();
        assert_eq!(scaling.multiplier(0), 1.0);
        assert_eq!(scaling.multiplier(10), 1.5);
        assert_eq!(scaling.multiplier(20), 2.0);
        assert_eq!(scaling.multiplier(500), 2.0);
    }

    #[test]
    fn test_scroll_speed_without_scaling() {
        let config = SimulationConfigBuilder::default().speed_scaling(None).build().unwrap();
        assert_eq!(config.scroll_speed(0), config.scroll_speed(40));
    }

    #[test]
    fn test_sanitized_clamps_bad_values() {
        let config = SimulationConfigBuilder::default()
            .gap_range(-50.0)
            .pipe_slots(0)
            .scroll_duration_ms(0)
            .speed_scaling(Some(SpeedScaling { max_score: 20, max_multiplier: 0.5 }))
            .build()
            .unwrap()
            .sanitized();

        assert_eq!(config.gap_range, 50.0);
        assert_eq!(config.pipe_slots, 1);
        assert_eq!(config.scroll_duration_ms, 1);
        assert_eq!(config.speed_scaling.map(|s| s.max_multiplier), Some(1.0));
    }

    #[test]
    fn test_sanitized_replaces_non_finite_values() {
        let config = SimulationConfigBuilder::default()
            .respawn_x(f32::NAN)
            .gravity(f32::INFINITY)
            .pipe_width(f32::NEG_INFINITY)
            .scroll_end_x(f32::NAN)
            .build()
            .unwrap()
            .sanitized();

        let defaults = SimulationConfig::default();
        assert_eq!(config.respawn_x, defaults.respawn_x);
        assert_eq!(config.gravity, defaults.gravity);
        assert_eq!(config.pipe_width, defaults.pipe_width);
        assert_eq!(config.scroll_end_x, defaults.scroll_end_x);
        assert!(config.base_scroll_speed().is_finite());
        assert!(config.slot_spacing().is_finite());
    }

    #[test]
    fn test_sanitized_keeps_valid_config() {
        assert_eq!(SimulationConfig::default().sanitized(), SimulationConfig::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: SimulationConfig = serde_yaml::from_str("gravity: 1200\nspeed_scaling: null\n").unwrap();
        assert_eq!(config.gravity, 1200.0);
        assert_eq!(config.speed_scaling, None);
        assert_eq!(config.pipe_width, 103.0);
    }
}
