//! Device session behaviour against the simulated input subsystem

use procon_session::controller::{
    Axis, Button, DeviceSession, GamepadType, SensorKind, SessionError, SimDevice, SimDeviceId,
    SimulatedSubsystem, Vector3,
};
use std::time::Duration;

const BUTTON_ORDER: [&str; 18] = [
    "dpad_up",
    "dpad_down",
    "dpad_left",
    "dpad_right",
    "south",
    "east",
    "north",
    "west",
    "left_shoulder",
    "right_shoulder",
    "left_stick",
    "right_stick",
    "start",
    "back",
    "guide",
    "capture",
    "left_trigger",
    "right_trigger",
];

const AXIS_ORDER: [&str; 4] = ["left_x", "left_y", "right_x", "right_y"];

const PRO: SimDeviceId = SimDeviceId(1);

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn xbox(id: u32) -> SimDevice {
    SimDevice::new(id, GamepadType::XboxOne, "Xbox Wireless Controller")
}

fn pro(id: u32) -> SimDevice {
    SimDevice::pro_controller(id)
        .with_accel(Vector3::new(0.1, -9.8, 0.2))
        .with_gyro(Vector3::new(0.01, 0.02, 0.03))
}

fn session_with(devices: Vec<SimDevice>) -> DeviceSession<SimulatedSubsystem> {
    init_logging();
    let mut subsystem = SimulatedSubsystem::new();
    for device in devices {
        subsystem.attach(device);
    }
    DeviceSession::new(subsystem)
}

fn names<T>(pairs: &[(&'static str, T)]) -> Vec<&'static str> {
    pairs.iter().map(|(name, _)| *name).collect()
}

#[test]
fn scan_with_nothing_attached_fails() {
    let mut session = session_with(vec![]);
    assert!(matches!(session.scan(), Err(SessionError::NotFound)));
    assert!(!session.has_handle());
}

#[test]
fn scan_ignores_other_controller_types() {
    let mut joycon = SimDevice::new(2, GamepadType::NintendoSwitchJoyconLeft, "Pro Controller");
    joycon.sensors = SensorKind::ALL.into_iter().collect();
    let mut session = session_with(vec![xbox(0), joycon]);

    assert!(matches!(session.scan(), Err(SessionError::NotFound)));
    assert!(!session.has_handle());
    assert_eq!(session.subsystem().open_handles(), 0);
}

#[test]
fn failed_scan_keeps_existing_handle() {
    let mut session = session_with(vec![xbox(0), pro(1)]);
    session.scan().unwrap();
    let motion = session.motion();

    // Pro controller leaves the live set; only the xbox pad is enumerated now
    session.subsystem_mut().disconnect(PRO);
    assert!(matches!(session.scan(), Err(SessionError::NotFound)));

    assert!(session.has_handle());
    assert_eq!(session.device_id(), Some(PRO));
    assert_eq!(session.motion(), motion);
    assert_eq!(session.subsystem().open_handles(), 1);
}

#[test]
fn first_match_wins_and_one_handle_stays_open() {
    let mut session = session_with(vec![xbox(0), pro(2), pro(3)]);

    session.scan().unwrap();
    assert_eq!(session.device_id(), Some(SimDeviceId(2)));
    assert_eq!(session.subsystem().open_handles(), 1);

    // Re-scanning replaces the connection instead of stacking a second one
    session.scan().unwrap();
    assert_eq!(session.device_id(), Some(SimDeviceId(2)));
    assert_eq!(session.subsystem().open_handles(), 1);
    assert_eq!(session.subsystem().opened_total(), 2);
}

#[test]
fn scan_enables_sensors_and_refreshes_once() {
    let mut session = session_with(vec![xbox(0), pro(1)]);
    session.scan().unwrap();

    let device = session.subsystem().device(PRO).unwrap();
    assert!(device.is_sensor_enabled(SensorKind::Accelerometer));
    assert!(device.is_sensor_enabled(SensorKind::Gyroscope));

    let motion = session.motion().expect("initial refresh stores a sample");
    assert_eq!(motion.accel, Vector3::new(0.1, -9.8, 0.2));
    assert_eq!(motion.gyro, Vector3::new(0.01, 0.02, 0.03));
    assert_eq!(session.last_refresh(), Some(Duration::ZERO));
    assert_eq!(session.refresh_interval(), None);
}

#[test]
fn scan_succeeds_even_when_initial_refresh_fails() {
    let mut device = pro(1);
    device.sensors.clear();
    let mut session = session_with(vec![device]);

    session.scan().unwrap();
    assert!(session.is_connected());
    assert_eq!(session.motion(), None);
    assert_eq!(session.last_refresh(), None);
}

#[test]
fn partial_sensor_failure_leaves_state_untouched() {
    let mut session = session_with(vec![pro(1)]);
    session.scan().unwrap();
    session.subsystem_mut().advance(Duration::from_millis(100));
    session.refresh().unwrap();

    let motion = session.motion();
    let last = session.last_refresh();
    let interval = session.refresh_interval();

    let sim = session.subsystem_mut();
    sim.set_sensor(PRO, SensorKind::Accelerometer, Vector3::new(5.0, 5.0, 5.0));
    sim.set_sensor(PRO, SensorKind::Gyroscope, Vector3::new(1.0, 1.0, 1.0));
    sim.fail_sensor(PRO, SensorKind::Gyroscope, true);
    sim.advance(Duration::from_millis(100));

    let result = session.refresh();
    assert!(matches!(
        result,
        Err(SessionError::PartialSensorFailure {
            accelerometer: true,
            gyroscope: false
        })
    ));
    assert_eq!(session.motion(), motion);
    assert_eq!(session.last_refresh(), last);
    assert_eq!(session.refresh_interval(), interval);

    // Other channel failing the same way
    let sim = session.subsystem_mut();
    sim.fail_sensor(PRO, SensorKind::Gyroscope, false);
    sim.fail_sensor(PRO, SensorKind::Accelerometer, true);
    assert!(matches!(
        session.refresh(),
        Err(SessionError::PartialSensorFailure {
            accelerometer: false,
            gyroscope: true
        })
    ));
    assert_eq!(session.motion(), motion);
    assert_eq!(session.last_refresh(), last);
}

#[test]
fn refresh_interval_tracks_simulated_time() {
    let mut session = session_with(vec![pro(1)]);
    session.scan().unwrap();

    session.subsystem_mut().advance(Duration::from_millis(250));
    session.refresh().unwrap();
    assert_eq!(session.refresh_interval(), Some(Duration::from_millis(250)));
    assert_eq!(session.last_refresh(), Some(Duration::from_millis(250)));

    session.subsystem_mut().advance(Duration::from_secs(1));
    session.refresh().unwrap();
    assert_eq!(session.refresh_interval(), Some(Duration::from_secs(1)));
    assert_eq!(session.last_refresh(), Some(Duration::from_millis(1250)));
}

#[test]
fn accessors_are_neutral_without_handle() {
    let mut session = session_with(vec![pro(1)]);

    assert!(!session.is_connected());
    assert!(!session.is_button_pressed(Button::South));
    assert!(!session.is_trigger_engaged(Axis::RightTrigger));
    assert_eq!(session.axis_value(Axis::LeftX), 0);
    assert!(matches!(session.refresh(), Err(SessionError::NotConfigured)));
    assert!(session.decode_buttons().iter().all(|(_, pressed)| !pressed));
    assert!(session.decode_axes().iter().all(|(_, value)| *value == 0));
    assert!(session.report().is_none());
    assert!(session.describe_connected().is_none());
}

#[test]
fn decoded_name_order_is_stable() {
    let mut session = session_with(vec![pro(1)]);
    assert_eq!(names(&session.decode_buttons()), BUTTON_ORDER);
    assert_eq!(names(&session.decode_axes()), AXIS_ORDER);

    session.scan().unwrap();
    let sim = session.subsystem_mut();
    sim.set_button(PRO, Button::Guide, true);
    sim.set_button(PRO, Button::DPadLeft, true);
    sim.set_axis(PRO, Axis::RightY, -32768);

    let buttons = session.decode_buttons();
    assert_eq!(names(&buttons), BUTTON_ORDER);
    assert_eq!(names(&session.decode_axes()), AXIS_ORDER);
    assert_eq!(names(&session.decode_buttons()), BUTTON_ORDER);

    let pressed: Vec<_> = buttons
        .iter()
        .filter(|(_, pressed)| *pressed)
        .map(|(name, _)| *name)
        .collect();
    assert_eq!(pressed, vec!["dpad_left", "guide"]);
    assert_eq!(session.decode_axes()[3], ("right_y", -32768));
}

#[test]
fn trigger_engages_only_at_full_pull() {
    let mut session = session_with(vec![pro(1)]);
    session.scan().unwrap();

    for (value, engaged) in [(i16::MAX, true), (32766, false), (0, false)] {
        session
            .subsystem_mut()
            .set_axis(PRO, Axis::LeftTrigger, value);
        assert_eq!(session.is_trigger_engaged(Axis::LeftTrigger), engaged, "value {value}");
        assert_eq!(session.axis_value(Axis::LeftTrigger), value);
        let left_trigger = session.decode_buttons()[16];
        assert_eq!(left_trigger, ("left_trigger", engaged));
    }
}

#[test]
fn buttons_and_axes_are_read_live() {
    let mut session = session_with(vec![pro(1)]);
    session.scan().unwrap();

    assert!(!session.is_button_pressed(Button::East));
    session.subsystem_mut().set_button(PRO, Button::East, true);
    assert!(session.is_button_pressed(Button::East));

    session.subsystem_mut().set_axis(PRO, Axis::LeftX, 1234);
    assert_eq!(session.axis_value(Axis::LeftX), 1234);
}

#[test]
fn close_twice_is_a_no_op() {
    let mut session = session_with(vec![pro(1)]);
    session.scan().unwrap();

    session.close();
    assert!(!session.has_handle());
    assert_eq!(session.subsystem().open_handles(), 0);

    session.close();
    assert!(!session.has_handle());
    assert_eq!(session.subsystem().open_handles(), 0);
    assert_eq!(session.motion(), None);
}

#[test]
fn disconnect_is_detected_by_polling() {
    let mut session = session_with(vec![xbox(0), pro(1)]);

    session.scan().unwrap();
    assert_eq!(session.device_id(), Some(PRO));
    assert!(session.is_connected());
    assert!(session.is_connected());

    session.subsystem_mut().disconnect(PRO);
    assert!(!session.is_connected());
    assert!(session.has_handle());
    assert!(matches!(session.refresh(), Err(SessionError::Disconnected)));
    assert!(!session.is_button_pressed(Button::South));

    // Caller-driven recovery
    assert!(matches!(session.scan(), Err(SessionError::NotFound)));
    session.subsystem_mut().reconnect(PRO);
    session.scan().unwrap();
    assert!(session.is_connected());
    assert_eq!(session.subsystem().open_handles(), 1);
}

#[test]
fn describe_any_attached_device() {
    let mut session = session_with(vec![xbox(0), pro(1)]);

    let other = session.describe_device(SimDeviceId(0)).unwrap();
    assert_eq!(other.gamepad_type, GamepadType::XboxOne);
    assert_eq!(other.instance_id, "0");

    session.scan().unwrap();
    let description = session.describe_connected().unwrap();
    assert_eq!(description.gamepad_type, GamepadType::NintendoSwitchPro);
    assert_eq!(description.vendor_id, Some(0x057e));
    assert_eq!(description.product_id, Some(0x2009));
    assert_eq!(description.path.as_deref(), Some("/dev/hidraw1"));
    assert!(description.mapping.is_some());

    assert!(session.describe_device(SimDeviceId(42)).is_none());
}

#[test]
fn report_reflects_latest_refresh() {
    let mut session = session_with(vec![pro(1)]);
    session.scan().unwrap();
    session.subsystem_mut().set_button(PRO, Button::Start, true);
    session.subsystem_mut().advance(Duration::from_millis(1000));
    session.refresh().unwrap();

    let report = session.report().unwrap();
    assert_eq!(report.timestamp, Some(Duration::from_millis(1000)));
    assert_eq!(report.pressed_buttons().collect::<Vec<_>>(), vec!["start"]);

    let text = report.to_string();
    assert!(text.starts_with("Time:  1000\nDelta: 1000\n"));
    assert!(text.contains("Accel: 0.1000, -9.8000, 0.2000\n"));
    assert!(text.contains("start: pressed\n"));
    assert!(text.ends_with("right_y: 0\n"));
}
