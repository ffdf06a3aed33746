//! procon-session: device session manager for the Nintendo Switch Pro Controller
//!
//! Finds the controller among attached gamepads, keeps the connection alive
//! under caller control, enables the motion sensors and decodes buttons, axes
//! and sensor readings into named values.

pub mod config;
pub mod controller;

pub use config::AppConfig;
pub use controller::{DeviceSession, GilrsSubsystem, SessionError, SimulatedSubsystem};
