//! Opmode lifecycle.
//!
//! The host owns the control loop. Each cycle it polls hardware, calls one
//! opmode callback and then yields through [`OpModeContext::idle`]. Opmodes
//! never sleep on their own; a long-running action is a state machine stepped
//! once per cycle that checks [`OpModeContext::is_stop_requested`] every step.

use crate::{
    error::OpModeError,
    hardware::{GamepadState, HardwareMap},
    telemetry::Telemetry,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpModeKind {
    Autonomous,
    TeleOp,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Finished,
}

/// What the host exposes to a running opmode.
pub trait OpModeContext {
    fn is_start_requested(&self) -> bool;
    fn is_stop_requested(&self) -> bool;
    fn telemetry(&mut self) -> &mut dyn Telemetry;
    fn gamepad(&self) -> GamepadState;
    /// Ends the current control cycle.
    fn idle(&mut self);
}

pub trait OpMode {
    fn name(&self) -> &'static str;
    fn kind(&self) -> OpModeKind;

    /// Maps hardware. An error here aborts the run before start.
    fn init(
        &mut self,
        hardware: &mut dyn HardwareMap,
        ctx: &mut dyn OpModeContext,
    ) -> Result<(), OpModeError>;

    /// Runs every cycle between init and start.
    fn init_loop(&mut self, _ctx: &mut dyn OpModeContext) -> Result<(), OpModeError> {
        Ok(())
    }

    fn start(&mut self, _ctx: &mut dyn OpModeContext) -> Result<(), OpModeError> {
        Ok(())
    }

    /// Runs once per cycle after start until it returns
    /// [`LoopControl::Finished`] or a stop is requested.
    fn run_loop(&mut self, ctx: &mut dyn OpModeContext) -> Result<LoopControl, OpModeError>;

    /// Leaves every actuator stopped. Called exactly once per run after a
    /// successful init, whatever ended the run.
    fn stop(&mut self, ctx: &mut dyn OpModeContext);
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub init_cycles: u64,
    pub loop_cycles: u64,
    pub stop_requested: bool,
}

/// Drives `opmode` through init, wait-for-start, loop and stop.
pub fn run(
    opmode: &mut dyn OpMode,
    hardware: &mut dyn HardwareMap,
    ctx: &mut dyn OpModeContext,
) -> Result<RunSummary, OpModeError> {
    log::info!("{} ({:?}): init", opmode.name(), opmode.kind());
    if let Err(e) = opmode.init(hardware, ctx) {
        log::error!("{}: init failed: {e}", opmode.name());
        return Err(e);
    }
    let mut summary = RunSummary::default();
    let result = run_initialized(opmode, ctx, &mut summary);
    opmode.stop(ctx);
    log::info!(
        "{}: stopped after {} loop cycles",
        opmode.name(),
        summary.loop_cycles
    );
    result.map(|()| summary)
}

fn run_initialized(
    opmode: &mut dyn OpMode,
    ctx: &mut dyn OpModeContext,
    summary: &mut RunSummary,
) -> Result<(), OpModeError> {
    while !ctx.is_start_requested() {
        if ctx.is_stop_requested() {
            summary.stop_requested = true;
            return Ok(());
        }
        opmode.init_loop(ctx)?;
        summary.init_cycles += 1;
        ctx.idle();
    }
    if ctx.is_stop_requested() {
        summary.stop_requested = true;
        return Ok(());
    }

    log::info!("{}: start", opmode.name());
    opmode.start(ctx)?;
    loop {
        if ctx.is_stop_requested() {
            summary.stop_requested = true;
            return Ok(());
        }
        let control = opmode.run_loop(ctx)?;
        summary.loop_cycles += 1;
        if control == LoopControl::Finished {
            return Ok(());
        }
        ctx.idle();
    }
}
