use serde::{Deserialize, Serialize};

use crate::{drivetrain::DriveConfig, error::OpModeError, field::CameraMount, teleop::TeleopConfig};

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// Everything tunable about the robot, in one place.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub drive: DriveConfig,
    pub camera: CameraMount,
    pub teleop: TeleopConfig,
}

impl RobotConfig {
    pub fn validate(&self) -> Result<(), OpModeError> {
        let d = &self.drive;
        if !positive(d.counts_per_motor_rev) {
            return Err(OpModeError::InvalidConfig("counts_per_motor_rev must be positive"));
        }
        if !positive(d.drive_gear_reduction) {
            return Err(OpModeError::InvalidConfig("drive_gear_reduction must be positive"));
        }
        if !positive(d.wheel_diameter_in) {
            return Err(OpModeError::InvalidConfig("wheel_diameter_in must be positive"));
        }
        if d.cycle_ms == 0 {
            return Err(OpModeError::InvalidConfig("cycle_ms must be at least 1"));
        }
        if d.position_tolerance_ticks < 0 {
            return Err(OpModeError::InvalidConfig("position_tolerance_ticks is negative"));
        }
        if !(0.0..=1.0).contains(&d.min_power) {
            return Err(OpModeError::InvalidConfig("min_power must be in [0, 1]"));
        }
        if !(d.slowdown_inches.is_finite() && d.slowdown_inches >= 0.0) {
            return Err(OpModeError::InvalidConfig("slowdown_inches is negative"));
        }
        if d.left_motor == d.right_motor {
            return Err(OpModeError::InvalidConfig("drive motors need distinct names"));
        }
        if !(0.0..1.0).contains(&self.teleop.deadband) {
            return Err(OpModeError::InvalidConfig("teleop deadband must be in [0, 1)"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(RobotConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_physical_values() {
        let mut config = RobotConfig::default();
        config.drive.wheel_diameter_in = 0.0;
        assert!(matches!(config.validate(), Err(OpModeError::InvalidConfig(_))));

        let mut config = RobotConfig::default();
        config.drive.counts_per_motor_rev = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = RobotConfig::default();
        config.drive.right_motor = "left_drive".to_string();
        assert_eq!(
            config.validate(),
            Err(OpModeError::InvalidConfig("drive motors need distinct names"))
        );
    }
}
