use alloc::boxed::Box;

use serde::{Deserialize, Serialize};

use crate::error::HardwareError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Zero the encoder and hold the motor stopped.
    StopAndResetEncoder,
    /// Power is a fraction of maximum velocity, regulated with encoder feedback.
    RunUsingEncoder,
    /// Power is applied open loop.
    RunWithoutEncoder,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorDirection {
    Forward,
    Reverse,
}

/// A DC motor with an attached quadrature encoder.
pub trait DcMotor {
    fn set_mode(&mut self, mode: RunMode) -> Result<(), HardwareError>;
    fn mode(&self) -> RunMode;
    /// Commands a power in `[-1, 1]`.
    fn set_power(&mut self, power: f64) -> Result<(), HardwareError>;
    fn power(&self) -> f64;
    /// Encoder position in ticks since the last reset.
    fn current_position(&self) -> Result<i32, HardwareError>;
}

/// Looks up configured devices by name.
pub trait HardwareMap {
    fn motor(&mut self, name: &str) -> Result<Box<dyn DcMotor>, HardwareError>;
}

/// A snapshot of the driver's gamepad. Stick Y is negative when pushed forward.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct GamepadState {
    pub left_stick_x: f64,
    pub left_stick_y: f64,
    pub right_stick_x: f64,
    pub right_stick_y: f64,
}
