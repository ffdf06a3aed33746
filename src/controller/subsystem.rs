//! Input subsystem contract
//!
//! The session never talks to hardware directly. Everything it knows about
//! attached devices comes through [`InputSubsystem`], which a backend
//! implements over a real gamepad library ([`super::gilrs_backend`]) or over
//! in-memory state ([`super::simulated`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// Subsystem errors
#[derive(Debug, thiserror::Error)]
pub enum SubsystemError {
    #[error("Failed to initialize input subsystem: {0}")]
    Initialization(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Operation not supported by backend: {0}")]
    Unsupported(&'static str),
}

/// Controller classification reported by the subsystem.
///
/// Device filtering matches on this tag, never on the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamepadType {
    Unknown,
    Standard,
    Xbox360,
    XboxOne,
    Ps3,
    Ps4,
    Ps5,
    NintendoSwitchPro,
    NintendoSwitchJoyconLeft,
    NintendoSwitchJoyconRight,
    NintendoSwitchJoyconPair,
}

impl GamepadType {
    /// Short type label as used by common controller databases.
    pub fn label(self) -> &'static str {
        match self {
            GamepadType::Unknown => "unknown",
            GamepadType::Standard => "standard",
            GamepadType::Xbox360 => "xbox360",
            GamepadType::XboxOne => "xboxone",
            GamepadType::Ps3 => "ps3",
            GamepadType::Ps4 => "ps4",
            GamepadType::Ps5 => "ps5",
            GamepadType::NintendoSwitchPro => "switchpro",
            GamepadType::NintendoSwitchJoyconLeft => "joyconleft",
            GamepadType::NintendoSwitchJoyconRight => "joyconright",
            GamepadType::NintendoSwitchJoyconPair => "joyconpair",
        }
    }

    /// Classify a device from its USB vendor/product pair.
    pub fn from_usb_ids(vendor_id: u16, product_id: u16) -> Self {
        match (vendor_id, product_id) {
            (NINTENDO_VENDOR_ID, SWITCH_PRO_PRODUCT_ID) => GamepadType::NintendoSwitchPro,
            (NINTENDO_VENDOR_ID, 0x2006) => GamepadType::NintendoSwitchJoyconLeft,
            (NINTENDO_VENDOR_ID, 0x2007) => GamepadType::NintendoSwitchJoyconRight,
            (NINTENDO_VENDOR_ID, 0x200e) => GamepadType::NintendoSwitchJoyconPair,
            (0x045e, 0x028e) | (0x045e, 0x028f) | (0x045e, 0x0719) => GamepadType::Xbox360,
            (0x045e, _) => GamepadType::XboxOne,
            (0x054c, 0x0268) => GamepadType::Ps3,
            (0x054c, 0x05c4) | (0x054c, 0x09cc) => GamepadType::Ps4,
            (0x054c, 0x0ce6) | (0x054c, 0x0df2) => GamepadType::Ps5,
            _ => GamepadType::Standard,
        }
    }
}

impl fmt::Display for GamepadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const NINTENDO_VENDOR_ID: u16 = 0x057e;
pub const SWITCH_PRO_PRODUCT_ID: u16 = 0x2009;

// Digital buttons, named by position rather than by printed label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    South,
    East,
    West,
    North,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    /// Vendor button (capture on the Switch Pro Controller)
    Misc1,
}

// Analog axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

/// Full-pull value of a trigger axis.
pub const AXIS_MAX: i16 = i16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

impl SensorKind {
    pub const ALL: [SensorKind; 2] = [SensorKind::Accelerometer, SensorKind::Gyroscope];
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Accelerometer => f.write_str("accelerometer"),
            SensorKind::Gyroscope => f.write_str("gyroscope"),
        }
    }
}

/// One 3-axis sensor reading in device units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Diagnostic record for one attached device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescription {
    pub mapping: Option<String>,
    pub instance_id: String,
    pub name: String,
    pub path: Option<String>,
    pub gamepad_type: GamepadType,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub product_version: Option<u16>,
}

/// Capabilities the device session consumes from the host input layer.
///
/// `Handle` is the only long-lived resource: the subsystem hands it out on
/// [`open`](InputSubsystem::open) and takes it back on
/// [`close`](InputSubsystem::close). It is deliberately not required to be
/// `Clone`, so a handle can only have one owner.
pub trait InputSubsystem {
    type DeviceId: Copy + Eq + fmt::Debug + fmt::Display;
    type Handle;

    /// All currently attached devices, in enumeration order.
    fn attached_devices(&self) -> Vec<Self::DeviceId>;

    fn device_type(&self, id: Self::DeviceId) -> GamepadType;

    fn open(&mut self, id: Self::DeviceId) -> Result<Self::Handle, SubsystemError>;

    fn close(&mut self, handle: Self::Handle);

    fn device_id(&self, handle: &Self::Handle) -> Self::DeviceId;

    fn is_connected(&self, handle: &Self::Handle) -> bool;

    fn has_sensor(&self, handle: &Self::Handle, kind: SensorKind) -> bool;

    fn enable_sensor(
        &mut self,
        handle: &Self::Handle,
        kind: SensorKind,
    ) -> Result<(), SubsystemError>;

    /// Latest reading of one sensor channel, `None` if the read failed.
    fn read_sensor(&self, handle: &Self::Handle, kind: SensorKind) -> Option<Vector3>;

    fn read_button(&self, handle: &Self::Handle, button: Button) -> bool;

    fn read_axis(&self, handle: &Self::Handle, axis: Axis) -> i16;

    fn describe(&self, id: Self::DeviceId) -> Option<DeviceDescription>;

    /// Pull pending state from the devices.
    fn update(&mut self);

    /// Monotonic time since the subsystem was initialized.
    fn now(&self) -> Duration;
}
