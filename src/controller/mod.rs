//! Controller subsystem for the Switch Pro Controller session
//!
//! 1. [`subsystem`] - Input subsystem contract and shared value types
//! 2. [`session`] - Device lifecycle, refresh and decoding
//! 3. [`layout`] - Fixed button / axis name tables
//! 4. [`report`] - Text dumps for console output
//!
//! # Architecture
//!
//! ```text
//! gilrs / simulated ──► InputSubsystem ──► DeviceSession ──► SessionReport
//!                        (backend)         (caller-driven)    (text dump)
//! ```
//!
//! Everything runs on the caller's thread. Polling cadence is the caller's
//! business.

pub mod error;
pub mod gilrs_backend;
pub mod layout;
pub mod report;
pub mod session;
pub mod simulated;
pub mod subsystem;

// Re-export types that need to be public
pub use error::SessionError;
pub use gilrs_backend::GilrsSubsystem;
pub use report::SessionReport;
pub use session::{is_supported, DeviceSession, MotionSample};
pub use simulated::{SimDevice, SimDeviceId, SimulatedSubsystem};
pub use subsystem::{
    Axis, Button, DeviceDescription, GamepadType, InputSubsystem, SensorKind, SubsystemError,
    Vector3,
};
