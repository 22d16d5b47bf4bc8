//! Trainer robot: an encoder-driven straight-line autonomous and a teleop
//! that localizes against the SkyStone field targets.
//!
//! Everything here is hardware agnostic. The host supplies motors through
//! [`hardware::HardwareMap`], the driver station through
//! [`opmode::OpModeContext`] and camera detections through
//! [`vision::TargetDetector`]. [`sim`] provides all three for tests.

#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod config;
pub mod drivetrain;
pub mod error;
pub mod field;
pub mod hardware;
pub mod localization;
pub mod opmode;
pub mod opmodes;
pub mod pid;
pub mod plan;
pub mod routines;
pub mod sim;
pub mod telemetry;
pub mod teleop;
pub mod transform;
pub mod utils;
pub mod vision;

pub use config::RobotConfig;
pub use error::{DriveError, HardwareError, OpModeError};
pub use opmode::{LoopControl, OpMode, OpModeContext, RunSummary, run};
