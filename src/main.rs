#![no_main]
#![no_std]

extern crate alloc;

use alloc::{boxed::Box, format, rc::Rc, string::String, vec::Vec};
use core::{cell::RefCell, time::Duration};

use log::{LevelFilter, Metadata, Record};
use trainerbot::{
    HardwareError, LoopControl, OpMode, OpModeContext, OpModeError, RobotConfig,
    hardware::{DcMotor, GamepadState, HardwareMap, RunMode},
    opmodes::{DriveNav, NavigateWall},
    telemetry::{LogTelemetry, Telemetry},
    transform::Transform,
    vision::TargetDetector,
};
use vexide::prelude::*;

struct SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            println!("{} {} - {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

const GREEN_FREE_RPM: f64 = 200.0;
const MAX_VOLTS: f64 = 12.0;

struct VexMotor {
    name: String,
    motor: Rc<RefCell<Motor>>,
    mode: RunMode,
    power: f64,
    counts_per_rev: f64,
}

impl VexMotor {
    fn fault(&self, e: impl core::fmt::Debug) -> HardwareError {
        HardwareError::Device {
            name: self.name.clone(),
            reason: format!("{e:?}"),
        }
    }
}

impl DcMotor for VexMotor {
    fn set_mode(&mut self, mode: RunMode) -> Result<(), HardwareError> {
        if mode == RunMode::StopAndResetEncoder {
            let mut motor = self.motor.borrow_mut();
            motor.brake(BrakeMode::Brake).map_err(|e| self.fault(e))?;
            motor.reset_position().map_err(|e| self.fault(e))?;
            self.power = 0.0;
        }
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> RunMode {
        self.mode
    }

    fn set_power(&mut self, power: f64) -> Result<(), HardwareError> {
        let power = power.clamp(-1.0, 1.0);
        let mut motor = self.motor.borrow_mut();
        match self.mode {
            RunMode::StopAndResetEncoder => return Ok(()),
            RunMode::RunUsingEncoder => motor
                .set_velocity((power * GREEN_FREE_RPM) as i32)
                .map_err(|e| self.fault(e))?,
            RunMode::RunWithoutEncoder => motor
                .set_voltage(power * MAX_VOLTS)
                .map_err(|e| self.fault(e))?,
        }
        self.power = power;
        Ok(())
    }

    fn power(&self) -> f64 {
        self.power
    }

    fn current_position(&self) -> Result<i32, HardwareError> {
        let revs = self
            .motor
            .borrow()
            .position()
            .map_err(|e| self.fault(e))?
            .as_revolutions();
        Ok((revs * self.counts_per_rev) as i32)
    }
}

/// Motors by configured name. Each opmode maps its own handles to the same
/// physical motors.
struct VexHardware {
    motors: Vec<(String, Rc<RefCell<Motor>>)>,
    counts_per_rev: f64,
}

impl HardwareMap for VexHardware {
    fn motor(&mut self, name: &str) -> Result<Box<dyn DcMotor>, HardwareError> {
        let (_, motor) = self
            .motors
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| HardwareError::DeviceNotFound(name.into()))?;
        Ok(Box::new(VexMotor {
            name: name.into(),
            motor: motor.clone(),
            mode: RunMode::RunWithoutEncoder,
            power: 0.0,
            counts_per_rev: self.counts_per_rev,
        }))
    }
}

/// A competition period. The field controller ends it by dropping the
/// period's future, which drops the opmode and stops its drivetrain.
struct VexHost<'a> {
    controller: &'a Controller,
    telemetry: LogTelemetry,
}

impl OpModeContext for VexHost<'_> {
    fn is_start_requested(&self) -> bool {
        true
    }

    fn is_stop_requested(&self) -> bool {
        false
    }

    fn telemetry(&mut self) -> &mut dyn Telemetry {
        &mut self.telemetry
    }

    fn gamepad(&self) -> GamepadState {
        let state = self.controller.state().unwrap_or_default();
        GamepadState {
            left_stick_x: state.left_stick.x(),
            left_stick_y: -state.left_stick.y(),
            right_stick_x: state.right_stick.x(),
            right_stick_y: -state.right_stick.y(),
        }
    }

    fn idle(&mut self) {}
}

/// No phone camera on this robot; nothing is ever seen.
struct NoCamera;

impl TargetDetector for NoCamera {
    fn camera_from_target(&mut self, _index: usize) -> Option<Transform> {
        None
    }
}

async fn run_period(
    opmode: &mut dyn OpMode,
    hardware: &mut VexHardware,
    host: &mut VexHost<'_>,
    cycle: Duration,
) -> Result<(), OpModeError> {
    opmode.init(hardware, host)?;
    opmode.start(host)?;
    loop {
        if opmode.run_loop(host)? == LoopControl::Finished {
            opmode.stop(host);
            return Ok(());
        }
        host.idle();
        sleep(cycle).await;
    }
}

struct Robot {
    config: RobotConfig,
    hardware: VexHardware,
    controller: Controller,
}

impl Robot {
    fn cycle(&self) -> Duration {
        Duration::from_millis(self.config.drive.cycle_ms)
    }
}

impl Compete for Robot {
    async fn autonomous(&mut self) {
        let cycle = self.cycle();
        let mut opmode = NavigateWall::new(self.config.clone());
        let mut host = VexHost {
            controller: &self.controller,
            telemetry: LogTelemetry::new(),
        };
        if let Err(e) = run_period(&mut opmode, &mut self.hardware, &mut host, cycle).await {
            log::error!("autonomous: {e}");
        }
    }

    async fn driver(&mut self) {
        let cycle = self.cycle();
        let mut opmode = DriveNav::new(self.config.clone(), NoCamera);
        let mut host = VexHost {
            controller: &self.controller,
            telemetry: LogTelemetry::new(),
        };
        if let Err(e) = run_period(&mut opmode, &mut self.hardware, &mut host, cycle).await {
            log::error!("driver: {e}");
        }
    }
}

#[vexide::main]
async fn main(peripherals: Peripherals) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }

    let mut peripherals = DynamicPeripherals::new(peripherals);
    let config = RobotConfig::default();
    let left = Motor::new(
        peripherals.take_smart_port(1).expect("smart port 1"),
        Gearset::Green,
        Direction::Forward,
    );
    let right = Motor::new(
        peripherals.take_smart_port(2).expect("smart port 2"),
        Gearset::Green,
        Direction::Forward,
    );
    let hardware = VexHardware {
        motors: alloc::vec![
            (config.drive.left_motor.clone(), Rc::new(RefCell::new(left))),
            (config.drive.right_motor.clone(), Rc::new(RefCell::new(right))),
        ],
        counts_per_rev: config.drive.counts_per_motor_rev,
    };
    let robot = Robot {
        hardware,
        controller: peripherals.take_primary_controller().expect("primary controller"),
        config,
    };
    robot.compete().await;
}
