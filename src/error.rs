use alloc::string::String;

use thiserror::Error;

/// Failures reported by the hardware layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    #[error("no device named `{0}` in the hardware map")]
    DeviceNotFound(String),
    #[error("device `{name}` failed: {reason}")]
    Device { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriveError {
    #[error("drive speed {0} must be a fraction in [0, 1]")]
    InvalidSpeed(f64),
    #[error("drive distance {0} is not finite")]
    InvalidDistance(f64),
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Errors that abort an opmode run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpModeError {
    #[error("hardware init failed: {0}")]
    Hardware(#[from] HardwareError),
    #[error("drive failed: {0}")]
    Drive(#[from] DriveError),
    #[error("no routine named `{0}`")]
    UnknownRoutine(String),
    #[error("routine `{name}` could not be decoded: {reason}")]
    CorruptRoutine { name: String, reason: String },
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
