//! Routines compiled from `src/routines/*.routine` by the build script.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use serde::{Deserialize, Serialize};

use crate::{error::OpModeError, hardware::RunMode, plan::Action};

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
enum IRRunMode {
    StopAndResetEncoder,
    RunUsingEncoder,
    RunWithoutEncoder,
}
#[derive(Serialize, Deserialize, Debug, Clone)]
enum IRAction {
    SetRunMode(IRRunMode),
    DriveStraight { inches: f64, speed: f64 },
    Wait(u64),
    Stop,
}
#[derive(Serialize, Deserialize, Debug, Clone)]
struct IRRoutine {
    name: String,
    actions: Vec<IRAction>,
}

include!(concat!(env!("OUT_DIR"), "/routines_index.rs"));

fn map_run_mode(m: IRRunMode) -> RunMode {
    match m {
        IRRunMode::StopAndResetEncoder => RunMode::StopAndResetEncoder,
        IRRunMode::RunUsingEncoder => RunMode::RunUsingEncoder,
        IRRunMode::RunWithoutEncoder => RunMode::RunWithoutEncoder,
    }
}

fn map_action(a: IRAction) -> Action {
    match a {
        IRAction::SetRunMode(m) => Action::SetRunMode(map_run_mode(m)),
        IRAction::DriveStraight { inches, speed } => Action::DriveStraight { inches, speed },
        IRAction::Wait(ms) => Action::Wait(ms),
        IRAction::Stop => Action::Stop,
    }
}

fn decode(name: &str, bytes: &[u8]) -> Result<Vec<Action>, OpModeError> {
    let ir = postcard::from_bytes::<IRRoutine>(bytes).map_err(|e| OpModeError::CorruptRoutine {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(ir.actions.into_iter().map(map_action).collect())
}

pub fn names() -> impl Iterator<Item = &'static str> {
    ROUTINE_BLOBS.iter().map(|(name, _)| *name)
}

/// Decodes the embedded routine called `name`.
pub fn load(name: &str) -> Result<Vec<Action>, OpModeError> {
    let (_, bytes) = ROUTINE_BLOBS
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| OpModeError::UnknownRoutine(name.to_string()))?;
    decode(name, bytes)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn navigate_wall_is_embedded() {
        assert!(names().any(|n| n == "navigate_wall"));
        assert_eq!(
            load("navigate_wall"),
            Ok(vec![
                Action::DriveStraight {
                    inches: 32.0,
                    speed: 0.30
                },
                Action::Stop,
            ])
        );
    }

    #[test]
    fn unknown_routine() {
        assert_eq!(
            load("nowhere"),
            Err(OpModeError::UnknownRoutine("nowhere".to_string()))
        );
    }

    #[test]
    fn corrupt_blob_is_an_error() {
        let err = decode("broken", &[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, OpModeError::CorruptRoutine { ref name, .. } if name == "broken"));
    }

    #[test]
    fn blobs_decode_every_command() {
        let routine = IRRoutine {
            name: "all".to_string(),
            actions: vec![
                IRAction::SetRunMode(IRRunMode::RunWithoutEncoder),
                IRAction::Wait(250),
                IRAction::DriveStraight {
                    inches: -6.0,
                    speed: 1.0,
                },
                IRAction::Stop,
            ],
        };
        let bytes = postcard::to_allocvec(&routine).expect("encode");
        assert_eq!(
            decode("all", &bytes),
            Ok(vec![
                Action::SetRunMode(RunMode::RunWithoutEncoder),
                Action::Wait(250),
                Action::DriveStraight {
                    inches: -6.0,
                    speed: 1.0
                },
                Action::Stop,
            ])
        );
    }
}
