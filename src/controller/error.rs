use super::subsystem::SubsystemError;

/// Errors reported by [`DeviceSession`](super::session::DeviceSession)
///
/// None of these are fatal. The caller decides whether to retry, re-scan or
/// give up.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No attached device matched the supported controller type
    #[error("No supported controller found")]
    NotFound,

    /// Operation needs an open handle and none is held
    #[error("Gamepad not configured")]
    NotConfigured,

    /// At least one of the two motion channels could not be read
    #[error(
        "Sensor read failed (accelerometer ok: {accelerometer}, gyroscope ok: {gyroscope})"
    )]
    PartialSensorFailure { accelerometer: bool, gyroscope: bool },

    /// A handle is held but the device is no longer live
    #[error("Gamepad disconnected")]
    Disconnected,

    #[error("Subsystem error: {0}")]
    Subsystem(#[from] SubsystemError),
}
