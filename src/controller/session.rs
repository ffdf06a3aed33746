//! Device session: lifecycle and state decoding for one Switch Pro Controller
//!
//! The session holds at most one open handle. Callers drive it from their own
//! loop:
//!
//! ```text
//! is_connected()? ──no──► scan() ──► refresh() ──► decode_buttons() / decode_axes()
//!       │                                ▲
//!       └────────────yes─────────────────┘
//! ```
//!
//! Nothing here sleeps, spawns or retries. A disconnect is only noticed when
//! the caller asks via [`DeviceSession::is_connected`].

use std::time::Duration;
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::layout::{ButtonSource, AXIS_LAYOUT, BUTTON_LAYOUT};
use super::report::SessionReport;
use super::subsystem::{
    Axis, Button, DeviceDescription, GamepadType, InputSubsystem, SensorKind, Vector3, AXIS_MAX,
};

/// Latest motion readings captured by a successful refresh
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    pub accel: Vector3,
    pub gyro: Vector3,
}

/// Filter predicate applied during [`DeviceSession::scan`].
pub fn is_supported(gamepad_type: GamepadType) -> bool {
    gamepad_type == GamepadType::NintendoSwitchPro
}

pub struct DeviceSession<S: InputSubsystem> {
    subsystem: S,
    handle: Option<S::Handle>,
    motion: Option<MotionSample>,
    last_refresh: Option<Duration>,
    refresh_interval: Option<Duration>,
}

impl<S: InputSubsystem> DeviceSession<S> {
    pub fn new(subsystem: S) -> Self {
        Self {
            subsystem,
            handle: None,
            motion: None,
            last_refresh: None,
            refresh_interval: None,
        }
    }

    pub fn subsystem(&self) -> &S {
        &self.subsystem
    }

    pub fn subsystem_mut(&mut self) -> &mut S {
        &mut self.subsystem
    }

    /// Connect to the first attached Switch Pro Controller.
    ///
    /// On success any previously held handle is closed first, both motion
    /// sensors are enabled (when the device has them) and one refresh is
    /// performed. A failed initial refresh is logged but does not fail the
    /// scan.
    ///
    /// # Errors
    ///
    /// * [`SessionError::NotFound`] - nothing attached or nothing matched; the
    ///   current handle is left as it was
    /// * [`SessionError::Subsystem`] - the matched device could not be opened;
    ///   the session is left unconnected
    pub fn scan(&mut self) -> Result<(), SessionError> {
        let devices = self.subsystem.attached_devices();
        if devices.is_empty() {
            info!("Gamepad not found.");
            return Err(SessionError::NotFound);
        }
        debug!("Scanning {} attached devices", devices.len());

        let matched = devices.into_iter().find(|id| {
            let gamepad_type = self.subsystem.device_type(*id);
            debug!("  device {}: type {}", id, gamepad_type);
            is_supported(gamepad_type)
        });

        let Some(id) = matched else {
            info!("No Switch Pro Controller among attached devices");
            return Err(SessionError::NotFound);
        };

        self.close();

        let handle = match self.subsystem.open(id) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to open gamepad {}: {}", id, e);
                return Err(e.into());
            }
        };
        self.handle = Some(handle);
        info!("Opened Switch Pro Controller {}", id);

        self.enable_sensors();

        if let Err(e) = self.refresh() {
            warn!("Initial refresh of gamepad {} failed: {}", id, e);
        }

        Ok(())
    }

    fn enable_sensors(&mut self) {
        let Some(handle) = self.handle.as_ref() else {
            warn!("Gamepad not configured.");
            return;
        };

        for kind in SensorKind::ALL {
            if !self.subsystem.has_sensor(handle, kind) {
                debug!("Gamepad has no {}", kind);
                continue;
            }
            match self.subsystem.enable_sensor(handle, kind) {
                Ok(()) => debug!("Enabled {}", kind),
                Err(e) => warn!("Failed to enable {}: {}", kind, e),
            }
        }
    }

    /// Whether the held handle is still reported live. False without a handle.
    pub fn is_connected(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| self.subsystem.is_connected(handle))
    }

    /// Pull the latest motion snapshot into the session.
    ///
    /// Both sensor channels must read successfully; otherwise nothing is
    /// stored and the previous sample and timestamps stay as they were.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        let Some(handle) = self.handle.as_ref() else {
            warn!("Gamepad not configured.");
            return Err(SessionError::NotConfigured);
        };

        self.subsystem.update();

        if !self.subsystem.is_connected(handle) {
            warn!("Gamepad {} disconnected", self.subsystem.device_id(handle));
            return Err(SessionError::Disconnected);
        }

        let accel = self.subsystem.read_sensor(handle, SensorKind::Accelerometer);
        let gyro = self.subsystem.read_sensor(handle, SensorKind::Gyroscope);

        match (accel, gyro) {
            (Some(accel), Some(gyro)) => {
                let now = self.subsystem.now();
                self.refresh_interval = self.last_refresh.map(|prev| now.saturating_sub(prev));
                self.last_refresh = Some(now);
                self.motion = Some(MotionSample { accel, gyro });
                debug!(
                    "Refreshed at {:?} (interval {:?})",
                    now, self.refresh_interval
                );
                Ok(())
            }
            (accel, gyro) => {
                debug!(
                    "Discarding refresh: accelerometer {}, gyroscope {}",
                    accel.is_some(),
                    gyro.is_some()
                );
                Err(SessionError::PartialSensorFailure {
                    accelerometer: accel.is_some(),
                    gyroscope: gyro.is_some(),
                })
            }
        }
    }

    pub fn is_button_pressed(&self, button: Button) -> bool {
        match self.handle.as_ref() {
            Some(handle) => self.subsystem.read_button(handle, button),
            None => {
                warn!("Gamepad not configured.");
                false
            }
        }
    }

    /// Live axis value in the device's native signed 16-bit range.
    pub fn axis_value(&self, axis: Axis) -> i16 {
        match self.handle.as_ref() {
            Some(handle) => self.subsystem.read_axis(handle, axis),
            None => {
                warn!("Gamepad not configured.");
                0
            }
        }
    }

    /// A trigger only counts as engaged at full pull.
    pub fn is_trigger_engaged(&self, axis: Axis) -> bool {
        self.axis_value(axis) == AXIS_MAX
    }

    /// Every named button in table order, triggers last.
    pub fn decode_buttons(&self) -> Vec<(&'static str, bool)> {
        let Some(handle) = self.handle.as_ref() else {
            warn!("Gamepad not configured.");
            return BUTTON_LAYOUT.iter().map(|(name, _)| (*name, false)).collect();
        };

        BUTTON_LAYOUT
            .iter()
            .map(|(name, source)| {
                let pressed = match *source {
                    ButtonSource::Digital(button) => self.subsystem.read_button(handle, button),
                    ButtonSource::Trigger(axis) => {
                        self.subsystem.read_axis(handle, axis) == AXIS_MAX
                    }
                };
                (*name, pressed)
            })
            .collect()
    }

    pub fn decode_axes(&self) -> Vec<(&'static str, i16)> {
        let Some(handle) = self.handle.as_ref() else {
            warn!("Gamepad not configured.");
            return AXIS_LAYOUT.iter().map(|(name, _)| (*name, 0)).collect();
        };

        AXIS_LAYOUT
            .iter()
            .map(|(name, axis)| (*name, self.subsystem.read_axis(handle, *axis)))
            .collect()
    }

    /// One-shot diagnostic query for any attached device. Not cached.
    pub fn describe_device(&self, id: S::DeviceId) -> Option<DeviceDescription> {
        self.subsystem.describe(id)
    }

    pub fn describe_connected(&self) -> Option<DeviceDescription> {
        self.device_id().and_then(|id| self.describe_device(id))
    }

    pub fn device_id(&self) -> Option<S::DeviceId> {
        self.handle
            .as_ref()
            .map(|handle| self.subsystem.device_id(handle))
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn motion(&self) -> Option<MotionSample> {
        self.motion
    }

    pub fn last_refresh(&self) -> Option<Duration> {
        self.last_refresh
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }

    /// Snapshot of everything the session can report, `None` without a handle.
    pub fn report(&self) -> Option<SessionReport> {
        self.handle.as_ref()?;

        Some(SessionReport {
            timestamp: self.last_refresh,
            refresh_interval: self.refresh_interval,
            motion: self.motion,
            buttons: self.decode_buttons(),
            axes: self.decode_axes(),
        })
    }

    /// Release the held handle. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            let id = self.subsystem.device_id(&handle);
            self.subsystem.close(handle);
            info!("Closed gamepad {}", id);
        }
        self.motion = None;
        self.last_refresh = None;
        self.refresh_interval = None;
    }
}

impl<S: InputSubsystem> Drop for DeviceSession<S> {
    fn drop(&mut self) {
        self.close();
    }
}
