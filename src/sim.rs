//! Host-side stand-ins for the robot: encoder motors, a hardware map, a
//! scripted driver station and a scripted camera.
//!
//! A simulated motor advances `power * efficiency * ticks_per_cycle` encoder
//! ticks on every [`SimHardware::tick`]. The host ticks the hardware each time
//! the opmode ends a cycle.

use alloc::{
    boxed::Box,
    collections::VecDeque,
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};
use core::cell::RefCell;

use crate::{
    error::HardwareError,
    hardware::{DcMotor, GamepadState, HardwareMap, RunMode},
    opmode::OpModeContext,
    telemetry::{Telemetry, TelemetryBuffer},
    transform::Transform,
    vision::TargetDetector,
};

#[derive(Debug)]
struct MotorState {
    name: String,
    mode: RunMode,
    power: f64,
    position: f64,
    ticks_per_cycle: f64,
    efficiency: f64,
    fault: Option<String>,
}

/// A shared handle to one simulated motor.
#[derive(Clone, Debug)]
pub struct SimMotor(Rc<RefCell<MotorState>>);

impl SimMotor {
    pub fn new(name: &str, ticks_per_cycle: f64) -> Self {
        Self(Rc::new(RefCell::new(MotorState {
            name: name.to_string(),
            mode: RunMode::RunWithoutEncoder,
            power: 0.0,
            position: 0.0,
            ticks_per_cycle,
            efficiency: 1.0,
            fault: None,
        })))
    }

    /// Fraction of commanded power that turns into motion.
    pub fn set_efficiency(&self, efficiency: f64) {
        self.0.borrow_mut().efficiency = efficiency;
    }

    /// While set, every command and read fails with this reason.
    pub fn set_fault(&self, reason: Option<&str>) {
        self.0.borrow_mut().fault = reason.map(|r| r.to_string());
    }

    pub fn position(&self) -> f64 {
        self.0.borrow().position
    }

    pub fn tick(&self) {
        let mut m = self.0.borrow_mut();
        if m.mode != RunMode::StopAndResetEncoder {
            m.position += m.power * m.efficiency * m.ticks_per_cycle;
        }
    }

    fn check(&self) -> Result<(), HardwareError> {
        let m = self.0.borrow();
        match &m.fault {
            Some(reason) => Err(HardwareError::Device {
                name: m.name.clone(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DcMotor for SimMotor {
    fn set_mode(&mut self, mode: RunMode) -> Result<(), HardwareError> {
        self.check()?;
        let mut m = self.0.borrow_mut();
        m.mode = mode;
        if mode == RunMode::StopAndResetEncoder {
            m.position = 0.0;
            m.power = 0.0;
        }
        Ok(())
    }

    fn mode(&self) -> RunMode {
        self.0.borrow().mode
    }

    fn set_power(&mut self, power: f64) -> Result<(), HardwareError> {
        self.check()?;
        self.0.borrow_mut().power = power.clamp(-1.0, 1.0);
        Ok(())
    }

    fn power(&self) -> f64 {
        self.0.borrow().power
    }

    fn current_position(&self) -> Result<i32, HardwareError> {
        self.check()?;
        Ok(self.0.borrow().position as i32)
    }
}

/// Named simulated devices. Clones share the same motors.
#[derive(Clone, Debug, Default)]
pub struct SimHardware {
    motors: Rc<RefCell<Vec<SimMotor>>>,
}

impl SimHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_motor(&mut self, name: &str, ticks_per_cycle: f64) -> SimMotor {
        let motor = SimMotor::new(name, ticks_per_cycle);
        self.motors.borrow_mut().push(motor.clone());
        motor
    }

    pub fn motor_handle(&self, name: &str) -> Option<SimMotor> {
        self.motors
            .borrow()
            .iter()
            .find(|m| m.0.borrow().name == name)
            .cloned()
    }

    /// Advances every motor by one control cycle.
    pub fn tick(&self) {
        for m in self.motors.borrow().iter() {
            m.tick();
        }
    }
}

impl HardwareMap for SimHardware {
    fn motor(&mut self, name: &str) -> Result<Box<dyn DcMotor>, HardwareError> {
        self.motor_handle(name)
            .map(|m| Box::new(m) as Box<dyn DcMotor>)
            .ok_or_else(|| HardwareError::DeviceNotFound(name.to_string()))
    }
}

/// A driver station whose start and stop presses happen at fixed cycles.
pub struct SimHost {
    hardware: SimHardware,
    telemetry: TelemetryBuffer,
    gamepad: GamepadState,
    cycles: u64,
    start_at: u64,
    stop_at: Option<u64>,
    cycle_limit: u64,
}

impl SimHost {
    pub fn new(hardware: SimHardware) -> Self {
        Self {
            hardware,
            telemetry: TelemetryBuffer::new(),
            gamepad: GamepadState::default(),
            cycles: 0,
            start_at: 0,
            stop_at: None,
            cycle_limit: 100_000,
        }
    }

    /// Start is pressed once `cycles` cycles have elapsed.
    pub fn start_at(mut self, cycles: u64) -> Self {
        self.start_at = cycles;
        self
    }

    /// Stop is pressed once `cycles` cycles have elapsed.
    pub fn stop_at(mut self, cycles: u64) -> Self {
        self.stop_at = Some(cycles);
        self
    }

    /// Stop is forced after this many cycles even if never scripted.
    pub fn cycle_limit(mut self, cycles: u64) -> Self {
        self.cycle_limit = cycles;
        self
    }

    pub fn with_gamepad(mut self, gamepad: GamepadState) -> Self {
        self.gamepad = gamepad;
        self
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn telemetry_buffer(&self) -> &TelemetryBuffer {
        &self.telemetry
    }
}

impl OpModeContext for SimHost {
    fn is_start_requested(&self) -> bool {
        self.cycles >= self.start_at
    }

    fn is_stop_requested(&self) -> bool {
        self.cycles >= self.cycle_limit || self.stop_at.is_some_and(|s| self.cycles >= s)
    }

    fn telemetry(&mut self) -> &mut dyn Telemetry {
        &mut self.telemetry
    }

    fn gamepad(&self) -> GamepadState {
        self.gamepad
    }

    fn idle(&mut self) {
        self.hardware.tick();
        self.cycles += 1;
    }
}

/// A camera that replays prepared frames, one per [`TargetDetector::begin_frame`].
/// Once the script runs out every frame is empty.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDetector {
    frames: VecDeque<Vec<(usize, Transform)>>,
    current: Vec<(usize, Transform)>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a frame in which each `(index, camera_from_target)` is visible.
    pub fn push_frame(&mut self, sightings: &[(usize, Transform)]) {
        self.frames.push_back(sightings.to_vec());
    }

    pub fn push_empty_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frames.push_back(Vec::new());
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl TargetDetector for ScriptedDetector {
    fn begin_frame(&mut self) {
        self.current = self.frames.pop_front().unwrap_or_default();
    }

    fn camera_from_target(&mut self, index: usize) -> Option<Transform> {
        self.current
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, pose)| *pose)
    }
}
