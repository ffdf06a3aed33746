//! In-memory input subsystem
//!
//! Devices, their inputs and the clock are all set by hand, which makes the
//! backend deterministic. Used by the test suite and by `--simulate` runs on
//! machines without a controller.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::subsystem::{
    Axis, Button, DeviceDescription, GamepadType, InputSubsystem, SensorKind, SubsystemError,
    Vector3, NINTENDO_VENDOR_ID, SWITCH_PRO_PRODUCT_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimDeviceId(pub u32);

impl fmt::Display for SimDeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Open handle to a simulated device. Not `Clone`: one owner at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct SimHandle {
    device: SimDeviceId,
}

#[derive(Debug, Clone)]
pub struct SimDevice {
    pub id: SimDeviceId,
    pub gamepad_type: GamepadType,
    pub name: String,
    pub path: Option<String>,
    pub mapping: Option<String>,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub product_version: Option<u16>,
    pub connected: bool,
    pub sensors: HashSet<SensorKind>,
    enabled_sensors: HashSet<SensorKind>,
    failing_sensors: HashSet<SensorKind>,
    buttons: HashSet<Button>,
    axes: HashMap<Axis, i16>,
    accel: Vector3,
    gyro: Vector3,
}

impl SimDevice {
    pub fn new(id: u32, gamepad_type: GamepadType, name: impl Into<String>) -> Self {
        Self {
            id: SimDeviceId(id),
            gamepad_type,
            name: name.into(),
            path: None,
            mapping: None,
            vendor_id: None,
            product_id: None,
            product_version: None,
            connected: true,
            sensors: HashSet::new(),
            enabled_sensors: HashSet::new(),
            failing_sensors: HashSet::new(),
            buttons: HashSet::new(),
            axes: HashMap::new(),
            accel: Vector3::default(),
            gyro: Vector3::default(),
        }
    }

    /// A Switch Pro Controller with both motion sensors.
    pub fn pro_controller(id: u32) -> Self {
        let mut device = Self::new(id, GamepadType::NintendoSwitchPro, "Nintendo Switch Pro Controller");
        device.path = Some(format!("/dev/hidraw{id}"));
        device.mapping = Some(format!(
            "030000007e0500000920000000000000,Nintendo Switch Pro Controller,platform:Linux,instance:{id}"
        ));
        device.vendor_id = Some(NINTENDO_VENDOR_ID);
        device.product_id = Some(SWITCH_PRO_PRODUCT_ID);
        device.product_version = Some(0x8111);
        device.sensors = SensorKind::ALL.into_iter().collect();
        device
    }

    pub fn with_accel(mut self, accel: Vector3) -> Self {
        self.accel = accel;
        self
    }

    pub fn with_gyro(mut self, gyro: Vector3) -> Self {
        self.gyro = gyro;
        self
    }

    pub fn is_sensor_enabled(&self, kind: SensorKind) -> bool {
        self.enabled_sensors.contains(&kind)
    }
}

#[derive(Debug, Default)]
pub struct SimulatedSubsystem {
    devices: Vec<SimDevice>,
    clock: Duration,
    open_handles: usize,
    opened_total: usize,
}

impl SimulatedSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// An Xbox pad followed by a Pro Controller with plausible resting values.
    pub fn demo() -> Self {
        let mut subsystem = Self::new();
        let mut xbox = SimDevice::new(0, GamepadType::XboxOne, "Xbox Wireless Controller");
        xbox.vendor_id = Some(0x045e);
        xbox.product_id = Some(0x0b13);
        subsystem.attach(xbox);
        subsystem.attach(
            SimDevice::pro_controller(1)
                .with_accel(Vector3::new(0.12, -9.79, 0.31))
                .with_gyro(Vector3::new(0.002, -0.001, 0.0)),
        );
        subsystem.set_axis(SimDeviceId(1), Axis::LeftX, -412);
        subsystem.set_axis(SimDeviceId(1), Axis::LeftY, 235);
        subsystem
    }

    pub fn attach(&mut self, device: SimDevice) {
        debug!("Simulated device {} attached", device.id);
        self.devices.push(device);
    }

    /// Drop a device from the live set without invalidating open handles.
    pub fn disconnect(&mut self, id: SimDeviceId) {
        if let Some(device) = self.device_mut(id) {
            device.connected = false;
        }
    }

    pub fn reconnect(&mut self, id: SimDeviceId) {
        if let Some(device) = self.device_mut(id) {
            device.connected = true;
        }
    }

    pub fn device(&self, id: SimDeviceId) -> Option<&SimDevice> {
        self.devices.iter().find(|d| d.id == id)
    }

    fn device_mut(&mut self, id: SimDeviceId) -> Option<&mut SimDevice> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    pub fn set_button(&mut self, id: SimDeviceId, button: Button, pressed: bool) {
        if let Some(device) = self.device_mut(id) {
            if pressed {
                device.buttons.insert(button);
            } else {
                device.buttons.remove(&button);
            }
        }
    }

    pub fn set_axis(&mut self, id: SimDeviceId, axis: Axis, value: i16) {
        if let Some(device) = self.device_mut(id) {
            device.axes.insert(axis, value);
        }
    }

    pub fn set_sensor(&mut self, id: SimDeviceId, kind: SensorKind, value: Vector3) {
        if let Some(device) = self.device_mut(id) {
            match kind {
                SensorKind::Accelerometer => device.accel = value,
                SensorKind::Gyroscope => device.gyro = value,
            }
        }
    }

    /// Make reads of one sensor channel fail until cleared.
    pub fn fail_sensor(&mut self, id: SimDeviceId, kind: SensorKind, failing: bool) {
        if let Some(device) = self.device_mut(id) {
            if failing {
                device.failing_sensors.insert(kind);
            } else {
                device.failing_sensors.remove(&kind);
            }
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.clock += delta;
    }

    pub fn open_handles(&self) -> usize {
        self.open_handles
    }

    pub fn opened_total(&self) -> usize {
        self.opened_total
    }

    fn live(&self, id: SimDeviceId) -> Option<&SimDevice> {
        self.device(id).filter(|d| d.connected)
    }
}

impl InputSubsystem for SimulatedSubsystem {
    type DeviceId = SimDeviceId;
    type Handle = SimHandle;

    fn attached_devices(&self) -> Vec<SimDeviceId> {
        self.devices
            .iter()
            .filter(|d| d.connected)
            .map(|d| d.id)
            .collect()
    }

    fn device_type(&self, id: SimDeviceId) -> GamepadType {
        self.device(id)
            .map(|d| d.gamepad_type)
            .unwrap_or(GamepadType::Unknown)
    }

    fn open(&mut self, id: SimDeviceId) -> Result<SimHandle, SubsystemError> {
        if self.live(id).is_none() {
            return Err(SubsystemError::DeviceUnavailable(format!(
                "simulated device {id} is not attached"
            )));
        }
        self.open_handles += 1;
        self.opened_total += 1;
        Ok(SimHandle { device: id })
    }

    fn close(&mut self, handle: SimHandle) {
        self.open_handles = self.open_handles.saturating_sub(1);
        if let Some(device) = self.device_mut(handle.device) {
            device.enabled_sensors.clear();
        }
    }

    fn device_id(&self, handle: &SimHandle) -> SimDeviceId {
        handle.device
    }

    fn is_connected(&self, handle: &SimHandle) -> bool {
        self.live(handle.device).is_some()
    }

    fn has_sensor(&self, handle: &SimHandle, kind: SensorKind) -> bool {
        self.device(handle.device)
            .is_some_and(|d| d.sensors.contains(&kind))
    }

    fn enable_sensor(&mut self, handle: &SimHandle, kind: SensorKind) -> Result<(), SubsystemError> {
        let device = self.device_mut(handle.device).ok_or_else(|| {
            SubsystemError::DeviceUnavailable(format!("simulated device {}", handle.device))
        })?;
        if !device.sensors.contains(&kind) {
            return Err(SubsystemError::Unsupported("sensor not present on device"));
        }
        device.enabled_sensors.insert(kind);
        Ok(())
    }

    fn read_sensor(&self, handle: &SimHandle, kind: SensorKind) -> Option<Vector3> {
        let device = self.live(handle.device)?;
        if !device.enabled_sensors.contains(&kind) || device.failing_sensors.contains(&kind) {
            return None;
        }
        Some(match kind {
            SensorKind::Accelerometer => device.accel,
            SensorKind::Gyroscope => device.gyro,
        })
    }

    fn read_button(&self, handle: &SimHandle, button: Button) -> bool {
        self.live(handle.device)
            .is_some_and(|d| d.buttons.contains(&button))
    }

    fn read_axis(&self, handle: &SimHandle, axis: Axis) -> i16 {
        self.live(handle.device)
            .and_then(|d| d.axes.get(&axis).copied())
            .unwrap_or(0)
    }

    fn describe(&self, id: SimDeviceId) -> Option<DeviceDescription> {
        let device = self.device(id)?;
        Some(DeviceDescription {
            mapping: device.mapping.clone(),
            instance_id: id.to_string(),
            name: device.name.clone(),
            path: device.path.clone(),
            gamepad_type: device.gamepad_type,
            vendor_id: device.vendor_id,
            product_id: device.product_id,
            product_version: device.product_version,
        })
    }

    fn update(&mut self) {}

    fn now(&self) -> Duration {
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_devices_are_not_enumerated() {
        let mut sim = SimulatedSubsystem::demo();
        assert_eq!(sim.attached_devices(), vec![SimDeviceId(0), SimDeviceId(1)]);
        sim.disconnect(SimDeviceId(0));
        assert_eq!(sim.attached_devices(), vec![SimDeviceId(1)]);
    }

    #[test]
    fn sensor_reads_require_enable() {
        let mut sim = SimulatedSubsystem::demo();
        let handle = sim.open(SimDeviceId(1)).unwrap();
        assert_eq!(sim.read_sensor(&handle, SensorKind::Gyroscope), None);

        sim.enable_sensor(&handle, SensorKind::Gyroscope).unwrap();
        assert!(sim.read_sensor(&handle, SensorKind::Gyroscope).is_some());

        sim.close(handle);
        assert_eq!(sim.open_handles(), 0);
    }

    #[test]
    fn enabling_missing_sensor_is_unsupported() {
        let mut sim = SimulatedSubsystem::demo();
        let handle = sim.open(SimDeviceId(0)).unwrap();
        let result = sim.enable_sensor(&handle, SensorKind::Accelerometer);
        assert!(matches!(result, Err(SubsystemError::Unsupported(_))));
    }

    #[test]
    fn open_fails_for_unplugged_device() {
        let mut sim = SimulatedSubsystem::demo();
        sim.disconnect(SimDeviceId(1));
        assert!(matches!(
            sim.open(SimDeviceId(1)),
            Err(SubsystemError::DeviceUnavailable(_))
        ));
        assert_eq!(sim.open_handles(), 0);
    }

    #[test]
    fn clock_only_moves_when_advanced() {
        let mut sim = SimulatedSubsystem::new();
        assert_eq!(sim.now(), Duration::ZERO);
        sim.advance(Duration::from_millis(16));
        sim.advance(Duration::from_millis(16));
        assert_eq!(sim.now(), Duration::from_millis(32));
    }
}
