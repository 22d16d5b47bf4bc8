use crate::{
    config::RobotConfig,
    drivetrain::Drivetrain,
    error::OpModeError,
    hardware::{HardwareMap, RunMode},
    opmode::{LoopControl, OpMode, OpModeContext, OpModeKind},
    plan::PlanExecutor,
    routines,
};

const ROUTINE: &str = "navigate_wall";

/// Autonomous: from the wall, drive straight until parked under the bridge.
pub struct NavigateWall {
    config: RobotConfig,
    drive: Option<Drivetrain>,
    plan: Option<PlanExecutor>,
}

impl NavigateWall {
    pub fn new(config: RobotConfig) -> Self {
        Self {
            config,
            drive: None,
            plan: None,
        }
    }

    pub fn drivetrain(&self) -> Option<&Drivetrain> {
        self.drive.as_ref()
    }
}

impl OpMode for NavigateWall {
    fn name(&self) -> &'static str {
        "NavigateWall"
    }

    fn kind(&self) -> OpModeKind {
        OpModeKind::Autonomous
    }

    fn init(
        &mut self,
        hardware: &mut dyn HardwareMap,
        ctx: &mut dyn OpModeContext,
    ) -> Result<(), OpModeError> {
        self.config.validate()?;
        let actions = routines::load(ROUTINE)?;
        let mut drive = Drivetrain::from_hardware(hardware, self.config.drive.clone())?;
        drive.set_run_mode(RunMode::StopAndResetEncoder)?;
        drive.set_run_mode(RunMode::RunUsingEncoder)?;
        self.drive = Some(drive);
        self.plan = Some(PlanExecutor::new(actions));
        super::report_mapped(ctx);
        Ok(())
    }

    fn run_loop(&mut self, ctx: &mut dyn OpModeContext) -> Result<LoopControl, OpModeError> {
        let (Some(drive), Some(plan)) = (self.drive.as_mut(), self.plan.as_mut()) else {
            return Ok(LoopControl::Finished);
        };
        let control = plan.step(drive, ctx.is_stop_requested())?;
        let telemetry = ctx.telemetry();
        telemetry.add_data(
            "Path",
            &match control {
                LoopControl::Continue => "driving",
                LoopControl::Finished => "complete",
            },
        );
        telemetry.update();
        Ok(control)
    }

    fn stop(&mut self, _ctx: &mut dyn OpModeContext) {
        if let Some(drive) = self.drive.as_mut() {
            drive.stop();
        }
    }
}
