//! Two-motor differential drive and the encoder-driven straight-line primitive.

use alloc::{
    boxed::Box,
    string::{String, ToString},
};
use core::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{
    error::{DriveError, HardwareError},
    hardware::{DcMotor, HardwareMap, MotorDirection, RunMode},
    opmode::OpModeContext,
    pid::{Pid, PidGains},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub left_motor: String,
    pub right_motor: String,
    pub left_direction: MotorDirection,
    pub right_direction: MotorDirection,
    /// Encoder counts per motor output revolution.
    pub counts_per_motor_rev: f64,
    /// Greater than 1 when geared up.
    pub drive_gear_reduction: f64,
    pub wheel_diameter_in: f64,
    pub cycle_ms: u64,
    pub position_tolerance_ticks: i32,
    /// Distance over which power tapers down to `min_power` before the target.
    pub slowdown_inches: f64,
    pub min_power: f64,
    /// Correction on the left/right encoder difference, in ticks.
    pub straight_gains: PidGains,
    pub timeout_cycles: u32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            left_motor: "left_drive".to_string(),
            right_motor: "right_drive".to_string(),
            left_direction: MotorDirection::Reverse,
            right_direction: MotorDirection::Forward,
            counts_per_motor_rev: 1120.0,
            drive_gear_reduction: 1.0,
            wheel_diameter_in: 4.0,
            cycle_ms: 20,
            position_tolerance_ticks: 10,
            slowdown_inches: 4.0,
            min_power: 0.08,
            straight_gains: PidGains {
                kp: 0.002,
                output_limit: 0.2,
                ..PidGains::default()
            },
            timeout_cycles: 1500,
        }
    }
}

impl DriveConfig {
    pub fn counts_per_inch(&self) -> f64 {
        self.counts_per_motor_rev * self.drive_gear_reduction / (self.wheel_diameter_in * PI)
    }
}

fn sign(direction: MotorDirection) -> f64 {
    match direction {
        MotorDirection::Forward => 1.0,
        MotorDirection::Reverse => -1.0,
    }
}

pub struct Drivetrain {
    left: Box<dyn DcMotor>,
    right: Box<dyn DcMotor>,
    config: DriveConfig,
}

impl Drivetrain {
    pub fn new(left: Box<dyn DcMotor>, right: Box<dyn DcMotor>, config: DriveConfig) -> Self {
        Self {
            left,
            right,
            config,
        }
    }

    /// Maps both drive motors by their configured names.
    pub fn from_hardware(
        hardware: &mut dyn HardwareMap,
        config: DriveConfig,
    ) -> Result<Self, HardwareError> {
        let left = hardware.motor(&config.left_motor)?;
        let right = hardware.motor(&config.right_motor)?;
        Ok(Self::new(left, right, config))
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn set_run_mode(&mut self, mode: RunMode) -> Result<(), HardwareError> {
        self.left.set_mode(mode)?;
        self.right.set_mode(mode)?;
        Ok(())
    }

    /// Commands robot-frame powers, positive forward, each clamped to `[-1, 1]`.
    pub fn set_powers(&mut self, left: f64, right: f64) -> Result<(), HardwareError> {
        let left = left.clamp(-1.0, 1.0) * sign(self.config.left_direction);
        let right = right.clamp(-1.0, 1.0) * sign(self.config.right_direction);
        self.left.set_power(left)?;
        self.right.set_power(right)?;
        Ok(())
    }

    /// Robot-frame powers as last commanded.
    pub fn powers(&self) -> (f64, f64) {
        (
            self.left.power() * sign(self.config.left_direction),
            self.right.power() * sign(self.config.right_direction),
        )
    }

    /// Encoder positions with forward travel counting up on both sides.
    pub fn positions(&self) -> Result<(i32, i32), HardwareError> {
        let l = self.left.current_position()?;
        let r = self.right.current_position()?;
        let fix = |ticks: i32, d| match d {
            MotorDirection::Forward => ticks,
            MotorDirection::Reverse => ticks.wrapping_neg(),
        };
        Ok((
            fix(l, self.config.left_direction),
            fix(r, self.config.right_direction),
        ))
    }

    /// Zeroes both motors. Failures are logged and the other side still stops.
    pub fn stop(&mut self) {
        if let Err(e) = self.left.set_power(0.0) {
            log::warn!("drivetrain: left stop failed: {e}");
        }
        if let Err(e) = self.right.set_power(0.0) {
            log::warn!("drivetrain: right stop failed: {e}");
        }
    }

    /// Drives `inches` (negative is backwards) at `speed` and blocks, one
    /// control cycle at a time, until the target is reached, the host asks
    /// the opmode to stop, or the drive times out. Motors are stopped on return.
    pub fn drive_straight(
        &mut self,
        speed: f64,
        inches: f64,
        ctx: &mut dyn OpModeContext,
    ) -> Result<DriveOutcome, DriveError> {
        let mut drive = StraightDrive::new(speed, inches, &self.config)?;
        loop {
            match drive.step(self, ctx.is_stop_requested())? {
                DriveStatus::Done(outcome) => return Ok(outcome),
                DriveStatus::Running => ctx.idle(),
            }
        }
    }
}

impl Drop for Drivetrain {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriveOutcome {
    Reached,
    Cancelled,
    TimedOut,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriveStatus {
    Running,
    Done(DriveOutcome),
}

/// A straight drive in progress. Call [`StraightDrive::step`] once per cycle.
#[derive(Clone, Debug)]
pub struct StraightDrive {
    speed: f64,
    direction: f64,
    target_ticks: f64,
    counts_per_inch: f64,
    tolerance: f64,
    slowdown_inches: f64,
    min_power: f64,
    dt: f64,
    timeout_cycles: u32,
    correction: Pid,
    start: Option<(i32, i32)>,
    cycles: u32,
    outcome: Option<DriveOutcome>,
}

impl StraightDrive {
    pub fn new(speed: f64, inches: f64, config: &DriveConfig) -> Result<Self, DriveError> {
        if !inches.is_finite() {
            return Err(DriveError::InvalidDistance(inches));
        }
        if !(0.0..=1.0).contains(&speed) || (speed == 0.0 && inches != 0.0) {
            return Err(DriveError::InvalidSpeed(speed));
        }
        let counts_per_inch = config.counts_per_inch();
        let correction = Pid::new(config.straight_gains);
        Ok(Self {
            speed,
            direction: if inches < 0.0 { -1.0 } else { 1.0 },
            target_ticks: inches.abs() * counts_per_inch,
            counts_per_inch,
            tolerance: f64::from(config.position_tolerance_ticks.max(0)),
            slowdown_inches: config.slowdown_inches,
            min_power: config.min_power.min(speed),
            dt: config.cycle_ms as f64 / 1000.0,
            timeout_cycles: config.timeout_cycles,
            correction,
            start: None,
            cycles: 0,
            outcome: None,
        })
    }

    pub fn outcome(&self) -> Option<DriveOutcome> {
        self.outcome
    }

    fn finish(&mut self, drive: &mut Drivetrain, outcome: DriveOutcome) -> DriveStatus {
        drive.stop();
        self.outcome = Some(outcome);
        match outcome {
            DriveOutcome::Reached => log::info!("drive_straight: done (reached)"),
            DriveOutcome::Cancelled => log::info!("drive_straight: done (stop requested)"),
            DriveOutcome::TimedOut => log::warn!("drive_straight: timeout"),
        }
        DriveStatus::Done(outcome)
    }

    fn power_for(&self, remaining_ticks: f64) -> f64 {
        let remaining_in = remaining_ticks / self.counts_per_inch;
        if self.slowdown_inches > 0.0 && remaining_in < self.slowdown_inches {
            (self.speed * remaining_in / self.slowdown_inches).max(self.min_power)
        } else {
            self.speed
        }
    }

    pub fn step(
        &mut self,
        drive: &mut Drivetrain,
        stop_requested: bool,
    ) -> Result<DriveStatus, DriveError> {
        if let Some(outcome) = self.outcome {
            return Ok(DriveStatus::Done(outcome));
        }
        if stop_requested {
            return Ok(self.finish(drive, DriveOutcome::Cancelled));
        }

        let (l, r) = match drive.positions() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("drive_straight: encoder read failed: {e}");
                drive.stop();
                return Err(e.into());
            }
        };
        let (l0, r0) = *self.start.get_or_insert((l, r));
        let dl = f64::from(l.wrapping_sub(l0));
        let dr = f64::from(r.wrapping_sub(r0));

        // Negative once past the target.
        let remaining = self.target_ticks - (dl + dr) / 2.0 * self.direction;
        if remaining <= self.tolerance {
            return Ok(self.finish(drive, DriveOutcome::Reached));
        }
        if self.cycles >= self.timeout_cycles {
            return Ok(self.finish(drive, DriveOutcome::TimedOut));
        }
        self.cycles += 1;

        let power = self.power_for(remaining) * self.direction;
        let c = self.correction.next(dl - dr, self.dt);
        if let Err(e) = drive.set_powers(power - c, power + c) {
            log::warn!("drive_straight: motor command failed: {e}");
            drive.stop();
            return Err(e.into());
        }
        Ok(DriveStatus::Running)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::sim::{SimHardware, SimHost};

    fn rig(ticks_per_cycle: f64) -> (SimHardware, Drivetrain) {
        let mut hw = SimHardware::new();
        hw.add_motor("left_drive", ticks_per_cycle);
        hw.add_motor("right_drive", ticks_per_cycle);
        let drive = Drivetrain::from_hardware(&mut hw, DriveConfig::default()).expect("mapped");
        (hw, drive)
    }

    #[test]
    fn counts_per_inch_from_wheel_geometry() {
        let config = DriveConfig::default();
        assert_relative_eq!(config.counts_per_inch(), 1120.0 / (4.0 * PI), epsilon = 1e-9);
    }

    #[test]
    fn rejects_bad_arguments() {
        let config = DriveConfig::default();
        assert_eq!(
            StraightDrive::new(1.5, 10.0, &config).unwrap_err(),
            DriveError::InvalidSpeed(1.5)
        );
        assert_eq!(
            StraightDrive::new(-0.1, 10.0, &config).unwrap_err(),
            DriveError::InvalidSpeed(-0.1)
        );
        assert_eq!(
            StraightDrive::new(0.0, 10.0, &config).unwrap_err(),
            DriveError::InvalidSpeed(0.0)
        );
        assert!(matches!(
            StraightDrive::new(0.5, f64::NAN, &config),
            Err(DriveError::InvalidDistance(_))
        ));
    }

    #[test]
    fn zero_distance_completes_immediately() {
        let (hw, mut drive) = rig(60.0);
        let mut host = SimHost::new(hw.clone());
        let outcome = drive.drive_straight(0.0, 0.0, &mut host).expect("drive");
        assert_eq!(outcome, DriveOutcome::Reached);
        assert_eq!(host.cycles(), 0);
        assert_eq!(drive.powers(), (0.0, 0.0));
    }

    #[test]
    fn reaches_the_target_and_stops() {
        let (hw, mut drive) = rig(60.0);
        let mut host = SimHost::new(hw.clone());
        let outcome = drive.drive_straight(0.3, 32.0, &mut host).expect("drive");
        assert_eq!(outcome, DriveOutcome::Reached);

        let target = 32.0 * drive.config().counts_per_inch();
        let (l, r) = drive.positions().expect("positions");
        let travelled = f64::from(l + r) / 2.0;
        assert!((travelled - target).abs() <= 20.0, "travelled {travelled} of {target}");
        assert_eq!(drive.powers(), (0.0, 0.0));
        assert_eq!(hw.motor_handle("left_drive").expect("left").power(), 0.0);
    }

    #[test]
    fn negative_distance_drives_backwards() {
        let (hw, mut drive) = rig(60.0);
        let mut host = SimHost::new(hw.clone());
        let outcome = drive.drive_straight(0.5, -12.0, &mut host).expect("drive");
        assert_eq!(outcome, DriveOutcome::Reached);
        let (l, r) = drive.positions().expect("positions");
        assert!(l < 0 && r < 0);
        let target = -12.0 * drive.config().counts_per_inch();
        assert!((f64::from(l + r) / 2.0 - target).abs() <= 20.0);
    }

    #[test]
    fn stays_straight_with_a_weak_side() {
        let (hw, mut drive) = rig(60.0);
        hw.motor_handle("left_drive").expect("left").set_efficiency(0.9);
        let mut host = SimHost::new(hw.clone());
        drive.drive_straight(0.3, 32.0, &mut host).expect("drive");
        let (l, r) = drive.positions().expect("positions");
        // Uncorrected, the weak side would lag by roughly a tenth of the run.
        assert!((l - r).abs() < 60, "left {l} right {r}");
    }

    #[test]
    fn stop_request_zeroes_power_within_a_cycle() {
        let (hw, mut drive) = rig(60.0);
        let mut step = StraightDrive::new(0.6, 48.0, drive.config()).expect("valid");
        for _ in 0..5 {
            assert_eq!(step.step(&mut drive, false), Ok(DriveStatus::Running));
            hw.tick();
        }
        assert!(drive.powers().0 > 0.0);
        assert_eq!(
            step.step(&mut drive, true),
            Ok(DriveStatus::Done(DriveOutcome::Cancelled))
        );
        assert_eq!(drive.powers(), (0.0, 0.0));
        assert_eq!(step.outcome(), Some(DriveOutcome::Cancelled));
    }

    #[test]
    fn blocking_drive_honours_stop() {
        let (hw, mut drive) = rig(60.0);
        let mut host = SimHost::new(hw.clone()).stop_at(10);
        let outcome = drive.drive_straight(0.3, 100.0, &mut host).expect("drive");
        assert_eq!(outcome, DriveOutcome::Cancelled);
        assert_eq!(host.cycles(), 10);
        assert_eq!(drive.powers(), (0.0, 0.0));
    }

    #[test]
    fn times_out_when_the_wheels_never_turn() {
        let mut hw = SimHardware::new();
        hw.add_motor("left_drive", 0.0);
        hw.add_motor("right_drive", 0.0);
        let config = DriveConfig {
            timeout_cycles: 25,
            ..DriveConfig::default()
        };
        let mut drive = Drivetrain::from_hardware(&mut hw, config).expect("mapped");
        let mut host = SimHost::new(hw.clone());
        let outcome = drive.drive_straight(0.5, 10.0, &mut host).expect("drive");
        assert_eq!(outcome, DriveOutcome::TimedOut);
        assert_eq!(host.cycles(), 25);
        assert_eq!(drive.powers(), (0.0, 0.0));
    }

    #[test]
    fn hardware_fault_stops_and_reports() {
        let (hw, mut drive) = rig(60.0);
        let mut host = SimHost::new(hw.clone());
        hw.motor_handle("right_drive")
            .expect("right")
            .set_fault(Some("disconnected"));
        let err = drive.drive_straight(0.3, 10.0, &mut host).unwrap_err();
        assert!(matches!(err, DriveError::Hardware(HardwareError::Device { .. })));
        assert_eq!(hw.motor_handle("left_drive").expect("left").power(), 0.0);
    }

    #[test]
    fn left_motor_is_reversed_at_the_hardware() {
        let (hw, mut drive) = rig(60.0);
        drive.set_powers(0.5, 2.0).expect("powers");
        assert_eq!(hw.motor_handle("left_drive").expect("left").power(), -0.5);
        assert_eq!(hw.motor_handle("right_drive").expect("right").power(), 1.0);
        assert_eq!(drive.powers(), (0.5, 1.0));
    }

    #[test]
    fn dropping_the_drivetrain_stops_it() {
        let (hw, mut drive) = rig(60.0);
        drive.set_powers(0.4, 0.4).expect("powers");
        drop(drive);
        assert_eq!(hw.motor_handle("right_drive").expect("right").power(), 0.0);
    }
}
