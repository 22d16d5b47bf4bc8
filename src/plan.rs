use alloc::vec::Vec;

use crate::{
    drivetrain::{DriveOutcome, DriveStatus, Drivetrain, StraightDrive},
    error::OpModeError,
    hardware::RunMode,
    opmode::LoopControl,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    SetRunMode(RunMode),
    DriveStraight { inches: f64, speed: f64 },
    /// Milliseconds, rounded up to whole control cycles.
    Wait(u64),
    Stop,
}

enum Running {
    Drive(StraightDrive),
    Wait { cycles_left: u64 },
}

/// Steps a routine one control cycle at a time. Actions that take no time run
/// back to back in the same cycle.
pub struct PlanExecutor {
    actions: Vec<Action>,
    next: usize,
    running: Option<Running>,
    finished: bool,
}

impl PlanExecutor {
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            next: 0,
            running: None,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self, drive: &mut Drivetrain) -> LoopControl {
        drive.stop();
        self.running = None;
        self.finished = true;
        LoopControl::Finished
    }

    pub fn step(
        &mut self,
        drive: &mut Drivetrain,
        stop_requested: bool,
    ) -> Result<LoopControl, OpModeError> {
        if self.finished {
            return Ok(LoopControl::Finished);
        }
        if stop_requested {
            log::info!("plan: stop requested at action {}", self.next);
            return Ok(self.finish(drive));
        }

        loop {
            match self.running.as_mut() {
                Some(Running::Drive(straight)) => match straight.step(drive, false) {
                    Ok(DriveStatus::Running) => return Ok(LoopControl::Continue),
                    Ok(DriveStatus::Done(outcome)) => {
                        if outcome == DriveOutcome::TimedOut {
                            log::warn!("plan: drive timed out, moving on");
                        }
                        self.running = None;
                    }
                    Err(e) => {
                        self.finish(drive);
                        return Err(e.into());
                    }
                },
                Some(Running::Wait { cycles_left }) => {
                    if *cycles_left > 0 {
                        *cycles_left -= 1;
                        return Ok(LoopControl::Continue);
                    }
                    self.running = None;
                }
                None => {}
            }

            let Some(action) = self.actions.get(self.next).copied() else {
                log::info!("plan: done");
                return Ok(self.finish(drive));
            };
            self.next += 1;
            log::debug!("plan: {action:?}");

            match action {
                Action::SetRunMode(mode) => {
                    if let Err(e) = drive.set_run_mode(mode) {
                        self.finish(drive);
                        return Err(e.into());
                    }
                }
                Action::DriveStraight { inches, speed } => {
                    match StraightDrive::new(speed, inches, drive.config()) {
                        Ok(straight) => self.running = Some(Running::Drive(straight)),
                        Err(e) => {
                            self.finish(drive);
                            return Err(e.into());
                        }
                    }
                }
                Action::Wait(ms) => {
                    let cycle_ms = drive.config().cycle_ms.max(1);
                    self.running = Some(Running::Wait {
                        cycles_left: ms.div_ceil(cycle_ms),
                    });
                }
                Action::Stop => drive.stop(),
            }
        }
    }
}
