use serde::Serialize;

use crate::constants::game::{TILT_ANGLE_RANGE, TILT_VELOCITY_RANGE};

/// Vertical state of the bird. Its horizontal position never changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BirdState {
    pub y: f32,
    pub velocity: f32,
}

impl BirdState {
    pub fn new(y: f32) -> Self {
        Self { y, velocity: 0.0 }
    }

    /// Semi-implicit Euler step: position moves with the velocity from
    /// before this step, then gravity is applied.
    pub fn advance(&mut self, dt: f32, gravity: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.y += self.velocity * dt;
        self.velocity += gravity * dt;
    }

    /// Overwrites the velocity, it does not add to it.
    pub fn apply_impulse(&mut self, jump_velocity: f32) {
        self.velocity = jump_velocity;
    }

    /// Rotation in radians for the renderer, nose up when rising.
    pub fn tilt(&self) -> f32 {
        interpolate(self.velocity, TILT_VELOCITY_RANGE, TILT_ANGLE_RANGE)
    }
}

/// Linear map of `value` from `input` onto `output`, clamped to `output`.
pub fn interpolate(value: f32, input: (f32, f32), output: (f32, f32)) -> f32 {
    let (in_lo, in_hi) = input;
    let (out_lo, out_hi) = output;
    if in_hi == in_lo {
        return out_hi;
    }
    let t = ((value - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    out_lo + t * (out_hi - out_lo)
}
