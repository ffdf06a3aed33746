//! Line-oriented text dumps for console output

use std::fmt;
use std::time::Duration;

use super::session::MotionSample;
use super::subsystem::{DeviceDescription, Vector3};

/// Snapshot of one session at the time [`report`](super::session::DeviceSession::report)
/// was called.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub timestamp: Option<Duration>,
    pub refresh_interval: Option<Duration>,
    pub motion: Option<MotionSample>,
    pub buttons: Vec<(&'static str, bool)>,
    pub axes: Vec<(&'static str, i16)>,
}

impl SessionReport {
    pub fn pressed_buttons(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.buttons
            .iter()
            .filter(|(_, pressed)| *pressed)
            .map(|(name, _)| *name)
    }
}

fn write_vector(f: &mut fmt::Formatter<'_>, label: &str, v: &Vector3) -> fmt::Result {
    writeln!(f, "{label} {:.4}, {:.4}, {:.4}", v.x, v.y, v.z)
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp {
            Some(t) => writeln!(f, "Time:  {}", t.as_millis())?,
            None => writeln!(f, "Time:  -")?,
        }
        if let Some(interval) = self.refresh_interval {
            writeln!(f, "Delta: {}", interval.as_millis())?;
        }
        match &self.motion {
            Some(motion) => {
                write_vector(f, "Accel:", &motion.accel)?;
                write_vector(f, "Gyro: ", &motion.gyro)?;
            }
            None => writeln!(f, "Motion: unavailable")?,
        }
        for (name, pressed) in &self.buttons {
            writeln!(f, "{name}: {}", if *pressed { "pressed" } else { "released" })?;
        }
        for (name, value) in &self.axes {
            writeln!(f, "{name}: {value}")?;
        }
        Ok(())
    }
}

fn or_unknown<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "(unknown)".to_string())
}

impl fmt::Display for DeviceDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mapping: {}", or_unknown(&self.mapping))?;
        writeln!(f, "Device Index: {}", self.instance_id)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Path: {}", or_unknown(&self.path))?;
        writeln!(f, "Type: {}", self.gamepad_type)?;
        writeln!(f, "USB Vendor ID: {}", or_unknown(&self.vendor_id))?;
        writeln!(f, "USB Product ID: {}", or_unknown(&self.product_id))?;
        writeln!(f, "Product Version: {}", or_unknown(&self.product_version))
    }
}
