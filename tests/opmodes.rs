use approx::assert_relative_eq;
use trainerbot::{
    OpModeError, RobotConfig,
    drivetrain::DriveConfig,
    error::HardwareError,
    field::{CameraMount, skystone_landmarks},
    hardware::{DcMotor, GamepadState, HardwareMap},
    localization::Fix,
    opmodes::{DriveNav, NavigateWall},
    run,
    sim::{ScriptedDetector, SimHardware, SimHost, SimMotor},
    transform::{AngleUnit, AxesOrder, AxesReference, Transform, rotation, translation},
};

fn robot() -> (SimHardware, SimMotor, SimMotor) {
    let mut hw = SimHardware::new();
    let left = hw.add_motor("left_drive", 60.0);
    let right = hw.add_motor("right_drive", 60.0);
    (hw, left, right)
}

/// Inches travelled by each side, forward positive.
fn travelled(left: &SimMotor, right: &SimMotor) -> (f64, f64) {
    let cpi = DriveConfig::default().counts_per_inch();
    (-left.position() / cpi, right.position() / cpi)
}

#[test]
fn navigate_wall_parks_under_the_bridge() {
    let (mut hw, left, right) = robot();
    let mut host = SimHost::new(hw.clone()).start_at(5);
    let mut opmode = NavigateWall::new(RobotConfig::default());

    let summary = run(&mut opmode, &mut hw, &mut host).expect("run");
    assert!(!summary.stop_requested);
    assert_eq!(summary.init_cycles, 5);

    let (l, r) = travelled(&left, &right);
    assert!((l - 32.0).abs() < 0.3, "left travelled {l}");
    assert!((r - 32.0).abs() < 0.3, "right travelled {r}");
    assert_eq!(left.power(), 0.0);
    assert_eq!(right.power(), 0.0);
    assert_eq!(host.telemetry_buffer().get("Path"), Some("complete"));
}

#[test]
fn navigate_wall_reports_mapped_hardware() {
    let (mut hw, _, _) = robot();
    let mut host = SimHost::new(hw.clone()).start_at(100).stop_at(0);
    let mut opmode = NavigateWall::new(RobotConfig::default());

    let summary = run(&mut opmode, &mut hw, &mut host).expect("run");
    assert!(summary.stop_requested);
    assert_eq!(summary.loop_cycles, 0);
    assert_eq!(host.telemetry_buffer().get("Hardware"), Some("mapped"));
}

#[test]
fn navigate_wall_resets_encoders_at_init() {
    let (mut hw, left, right) = robot();
    let mut l = hw.motor("left_drive").expect("left");
    l.set_power(1.0).expect("power");
    hw.tick();
    assert!(left.position() != 0.0);

    let mut host = SimHost::new(hw.clone()).start_at(100).stop_at(1);
    let mut opmode = NavigateWall::new(RobotConfig::default());
    run(&mut opmode, &mut hw, &mut host).expect("run");
    assert_eq!(left.position(), 0.0);
    assert_eq!(right.position(), 0.0);
}

#[test]
fn stop_mid_drive_halts_the_robot() {
    let (mut hw, left, right) = robot();
    let mut host = SimHost::new(hw.clone()).stop_at(40);
    let mut opmode = NavigateWall::new(RobotConfig::default());

    let summary = run(&mut opmode, &mut hw, &mut host).expect("run");
    assert!(summary.stop_requested);
    assert_eq!(summary.loop_cycles, 40);
    assert_eq!(left.power(), 0.0);
    assert_eq!(right.power(), 0.0);

    let (l, _) = travelled(&left, &right);
    assert!(l > 1.0 && l < 32.0, "left travelled {l}");

    // Nothing moves once stopped.
    let before = left.position();
    hw.tick();
    assert_eq!(left.position(), before);
}

#[test]
fn missing_motor_fails_init() {
    let mut hw = SimHardware::new();
    hw.add_motor("left_drive", 60.0);
    let mut host = SimHost::new(hw.clone());
    let mut opmode = NavigateWall::new(RobotConfig::default());

    let err = run(&mut opmode, &mut hw, &mut host).unwrap_err();
    assert_eq!(
        err,
        OpModeError::Hardware(HardwareError::DeviceNotFound("right_drive".into()))
    );
    assert_eq!(host.cycles(), 0);
}

#[test]
fn invalid_config_fails_init() {
    let (mut hw, _, _) = robot();
    let mut host = SimHost::new(hw.clone());
    let mut config = RobotConfig::default();
    config.drive.cycle_ms = 0;
    let mut opmode = NavigateWall::new(config);
    assert!(matches!(
        run(&mut opmode, &mut hw, &mut host),
        Err(OpModeError::InvalidConfig(_))
    ));
}

fn robot_at(x_mm: f32, y_mm: f32, heading_deg: f32) -> Transform {
    translation(x_mm, y_mm, 0.0)
        * rotation(
            AxesReference::Extrinsic,
            AxesOrder::XYZ,
            AngleUnit::Degrees,
            0.0,
            0.0,
            heading_deg,
        )
}

/// What the camera reports for target `index` when the robot is at `field_from_robot`.
fn sighting(index: usize, field_from_robot: Transform) -> (usize, Transform) {
    let landmark = skystone_landmarks()[index];
    let field_from_camera = field_from_robot * CameraMount::default().robot_from_camera();
    (index, field_from_camera.inverse() * landmark.location)
}

#[test]
fn drive_nav_keeps_the_last_fix() {
    let (mut hw, _, _) = robot();
    let truth = robot_at(-600.0, -900.0, -90.0);
    let mut camera = ScriptedDetector::new();
    camera.push_empty_frames(3);
    camera.push_frame(&[sighting(5, truth)]);

    let mut host = SimHost::new(hw.clone()).start_at(3).stop_at(10);
    let mut opmode = DriveNav::new(RobotConfig::default(), camera);
    let summary = run(&mut opmode, &mut hw, &mut host).expect("run");
    assert_eq!(summary.init_cycles, 3);
    assert_eq!(summary.loop_cycles, 7);

    let report = opmode.localizer().report().expect("fix");
    assert_eq!(report.source, "Red Perimeter 1");
    assert_eq!(report.age, 6);
    assert_relative_eq!(report.x_in, -600.0 / 25.4, epsilon = 0.01);
    assert_relative_eq!(report.y_in, -900.0 / 25.4, epsilon = 0.01);
    assert_relative_eq!(report.heading, -90.0, epsilon = 0.05);

    let t = host.telemetry_buffer();
    assert_eq!(t.get("Visible Target"), None);
    assert_eq!(t.get("I see target"), None);
    assert_eq!(t.get("Fix age"), Some("6 cycles (Red Perimeter 1)"));
    assert!(!opmode.targets().expect("targets").is_active());
}

#[test]
fn drive_nav_tracks_before_start() {
    let (mut hw, left, _) = robot();
    let truth = robot_at(300.0, 1200.0, 45.0);

    let mut host = SimHost::new(hw.clone())
        .start_at(100)
        .stop_at(2)
        .with_gamepad(GamepadState {
            left_stick_y: -1.0,
            ..GamepadState::default()
        });
    let mut opmode = DriveNav::new(RobotConfig::default(), ScriptedDetector::new());
    opmode
        .detector_mut()
        .push_frame(&[sighting(9, truth), sighting(10, truth)]);
    let summary = run(&mut opmode, &mut hw, &mut host).expect("run");
    assert_eq!(summary.loop_cycles, 0);
    assert_eq!(left.position(), 0.0);

    match opmode.localizer().fix() {
        Fix::HasFix { source, age, .. } => {
            assert_eq!(source, "Blue Perimeter 1");
            assert_eq!(*age, 1);
        }
        Fix::NoFix => panic!("no fix during init"),
    }
}

#[test]
fn drive_nav_without_targets_reports_nothing() {
    let (mut hw, left, right) = robot();
    let mut host = SimHost::new(hw.clone())
        .cycle_limit(20)
        .with_gamepad(GamepadState {
            left_stick_y: -1.0,
            ..GamepadState::default()
        });
    let mut opmode = DriveNav::new(RobotConfig::default(), ScriptedDetector::new());
    run(&mut opmode, &mut hw, &mut host).expect("run");

    assert_eq!(opmode.localizer().fix(), &Fix::NoFix);
    assert_eq!(host.telemetry_buffer().get("I see target"), Some("nothing."));
    let (l, r) = travelled(&left, &right);
    assert!(l > 10.0 && r > 10.0, "left {l} right {r}");
    assert_eq!(left.power(), 0.0);
    assert_eq!(right.power(), 0.0);
}
