use crate::{
    config::RobotConfig,
    drivetrain::Drivetrain,
    error::OpModeError,
    field::skystone_landmarks,
    hardware::{HardwareMap, RunMode},
    localization::Localizer,
    opmode::{LoopControl, OpMode, OpModeContext, OpModeKind},
    teleop::ArcadeDrive,
    vision::{TargetDetector, Targets},
};

/// Teleop: drive from the gamepad while reporting where the field targets
/// say the robot is.
///
/// Tracking starts at init so the location is already known when the match
/// begins.
pub struct DriveNav<D: TargetDetector> {
    config: RobotConfig,
    detector: D,
    arcade: ArcadeDrive,
    localizer: Localizer,
    drive: Option<Drivetrain>,
    targets: Option<Targets>,
}

impl<D: TargetDetector> DriveNav<D> {
    pub fn new(config: RobotConfig, detector: D) -> Self {
        let arcade = ArcadeDrive::new(config.teleop);
        Self {
            config,
            detector,
            arcade,
            localizer: Localizer::new(),
            drive: None,
            targets: None,
        }
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn targets(&self) -> Option<&Targets> {
        self.targets.as_ref()
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    fn track(&mut self, ctx: &mut dyn OpModeContext) {
        if let Some(targets) = self.targets.as_mut() {
            targets.process_frame(&mut self.detector);
            self.localizer.scan(targets.listeners_mut());
        }
        let telemetry = ctx.telemetry();
        self.localizer.publish(telemetry);
        telemetry.update();
    }
}

impl<D: TargetDetector> OpMode for DriveNav<D> {
    fn name(&self) -> &'static str {
        "DriveNav"
    }

    fn kind(&self) -> OpModeKind {
        OpModeKind::TeleOp
    }

    fn init(
        &mut self,
        hardware: &mut dyn HardwareMap,
        ctx: &mut dyn OpModeContext,
    ) -> Result<(), OpModeError> {
        self.config.validate()?;
        let mut drive = Drivetrain::from_hardware(hardware, self.config.drive.clone())?;
        drive.set_run_mode(RunMode::RunUsingEncoder)?;
        self.drive = Some(drive);

        let mut targets = Targets::new(&skystone_landmarks(), &self.config.camera);
        targets.activate();
        log::info!("DriveNav: tracking {} targets", targets.len());
        self.targets = Some(targets);
        super::report_mapped(ctx);
        Ok(())
    }

    fn init_loop(&mut self, ctx: &mut dyn OpModeContext) -> Result<(), OpModeError> {
        self.track(ctx);
        Ok(())
    }

    fn run_loop(&mut self, ctx: &mut dyn OpModeContext) -> Result<LoopControl, OpModeError> {
        if let Some(drive) = self.drive.as_mut() {
            let (left, right) = self.arcade.powers(&ctx.gamepad());
            if let Err(e) = drive.set_powers(left, right) {
                log::warn!("DriveNav: motor command failed: {e}");
                drive.stop();
                return Err(e.into());
            }
        }
        self.track(ctx);
        Ok(LoopControl::Continue)
    }

    fn stop(&mut self, _ctx: &mut dyn OpModeContext) {
        if let Some(drive) = self.drive.as_mut() {
            drive.stop();
        }
        if let Some(targets) = self.targets.as_mut() {
            targets.deactivate();
        }
    }
}
