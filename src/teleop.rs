//! Arcade driving from the gamepad.

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::hardware::GamepadState;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    /// Stick deflection below which input is treated as zero.
    pub deadband: f64,
    /// Curve steepness. Zero is linear; larger values soften small inputs.
    pub curve: f64,
    /// Scales the turn stick before mixing.
    pub turn_scale: f64,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            deadband: 0.05,
            curve: 5.0,
            turn_scale: 1.0,
        }
    }
}

/// Full deflection of a V5 stick in raw controller units. The curve's
/// steepness is tuned against this range.
const STICK_RANGE: f64 = 127.0;

// https://www.desmos.com/calculator/7oyvwwpmed
fn drive_curve(x: f64, t: f64) -> f64 {
    let floor = (-t / 10.0).exp();
    let ramp = ((x.abs() - 1.0) * STICK_RANGE / 10.0).exp();
    (floor + ramp * (1.0 - floor)) * x
}

#[derive(Copy, Clone, Debug, Default)]
pub struct ArcadeDrive {
    config: TeleopConfig,
}

impl ArcadeDrive {
    pub fn new(config: TeleopConfig) -> Self {
        Self { config }
    }

    fn shape(&self, input: f64) -> f64 {
        let input = input.clamp(-1.0, 1.0);
        if input.abs() < self.config.deadband {
            return 0.0;
        }
        drive_curve(input, self.config.curve)
    }

    /// Left and right powers, positive forward, neither beyond 1 in magnitude.
    ///
    /// Pushing the left stick up (negative Y) drives forward and the right
    /// stick X turns clockwise.
    pub fn powers(&self, gamepad: &GamepadState) -> (f64, f64) {
        let throttle = self.shape(-gamepad.left_stick_y);
        let turn = self.shape(gamepad.right_stick_x) * self.config.turn_scale;
        let mut left = throttle + turn;
        let mut right = throttle - turn;
        let max = left.abs().max(right.abs());
        if max > 1.0 {
            left /= max;
            right /= max;
        }
        (left, right)
    }
}
