use gilrs::{Axis as GilrsAxis, Button as GilrsButton, Gamepad, GamepadId, Gilrs};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::subsystem::{
    Axis, Button, DeviceDescription, GamepadType, InputSubsystem, SensorKind, SubsystemError,
    Vector3,
};

// Handle to a gamepad gilrs is tracking. gilrs has no open/close, so the
// handle only pins the id.
#[derive(Debug)]
pub struct GilrsHandle {
    id: GamepadId,
}

/// [`InputSubsystem`] backed by gilrs.
///
/// gilrs does not expose motion sensors, so sensor reads always fail here and
/// a session on this backend reports buttons and axes only.
pub struct GilrsSubsystem {
    gilrs: Gilrs,
    started: Instant,
}

impl GilrsSubsystem {
    pub fn new() -> Result<Self, SubsystemError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SubsystemError::Initialization(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            started: Instant::now(),
        })
    }

    fn gamepad(&self, id: GamepadId) -> Option<Gamepad<'_>> {
        self.gilrs.connected_gamepad(id)
    }
}

fn classify(gamepad: &Gamepad<'_>) -> GamepadType {
    match (gamepad.vendor_id(), gamepad.product_id()) {
        (Some(vendor), Some(product)) => GamepadType::from_usb_ids(vendor, product),
        _ => GamepadType::Unknown,
    }
}

// Map our button slots to gilrs buttons
fn map_button(button: Button) -> Option<GilrsButton> {
    match button {
        Button::South => Some(GilrsButton::South),
        Button::East => Some(GilrsButton::East),
        Button::West => Some(GilrsButton::West),
        Button::North => Some(GilrsButton::North),
        Button::Start => Some(GilrsButton::Start),
        Button::Back => Some(GilrsButton::Select),
        Button::Guide => Some(GilrsButton::Mode),
        Button::LeftShoulder => Some(GilrsButton::LeftTrigger),
        Button::RightShoulder => Some(GilrsButton::RightTrigger),
        Button::LeftStick => Some(GilrsButton::LeftThumb),
        Button::RightStick => Some(GilrsButton::RightThumb),
        Button::DPadUp => Some(GilrsButton::DPadUp),
        Button::DPadDown => Some(GilrsButton::DPadDown),
        Button::DPadLeft => Some(GilrsButton::DPadLeft),
        Button::DPadRight => Some(GilrsButton::DPadRight),
        // No standard gilrs slot for the capture button
        Button::Misc1 => None,
    }
}

// gilrs normalizes to [-1.0, 1.0]; scale back to the native i16 range
fn scale_axis(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

impl InputSubsystem for GilrsSubsystem {
    type DeviceId = GamepadId;
    type Handle = GilrsHandle;

    fn attached_devices(&self) -> Vec<GamepadId> {
        self.gilrs.gamepads().map(|(id, _)| id).collect()
    }

    fn device_type(&self, id: GamepadId) -> GamepadType {
        self.gamepad(id)
            .map(|gamepad| classify(&gamepad))
            .unwrap_or(GamepadType::Unknown)
    }

    fn open(&mut self, id: GamepadId) -> Result<GilrsHandle, SubsystemError> {
        let gamepad = self
            .gamepad(id)
            .ok_or_else(|| SubsystemError::DeviceUnavailable(format!("gamepad {id}")))?;
        debug!("Opening gamepad {} ({})", id, gamepad.name());
        Ok(GilrsHandle { id })
    }

    fn close(&mut self, handle: GilrsHandle) {
        debug!("Releasing gamepad {}", handle.id);
    }

    fn device_id(&self, handle: &GilrsHandle) -> GamepadId {
        handle.id
    }

    fn is_connected(&self, handle: &GilrsHandle) -> bool {
        self.gamepad(handle.id).is_some()
    }

    fn has_sensor(&self, _handle: &GilrsHandle, _kind: SensorKind) -> bool {
        false
    }

    fn enable_sensor(
        &mut self,
        _handle: &GilrsHandle,
        _kind: SensorKind,
    ) -> Result<(), SubsystemError> {
        Err(SubsystemError::Unsupported("gilrs has no motion sensor support"))
    }

    fn read_sensor(&self, _handle: &GilrsHandle, _kind: SensorKind) -> Option<Vector3> {
        None
    }

    fn read_button(&self, handle: &GilrsHandle, button: Button) -> bool {
        match (self.gamepad(handle.id), map_button(button)) {
            (Some(gamepad), Some(button)) => gamepad.is_pressed(button),
            _ => false,
        }
    }

    fn read_axis(&self, handle: &GilrsHandle, axis: Axis) -> i16 {
        let Some(gamepad) = self.gamepad(handle.id) else {
            return 0;
        };
        let value = match axis {
            Axis::LeftX => gamepad.value(GilrsAxis::LeftStickX),
            Axis::LeftY => gamepad.value(GilrsAxis::LeftStickY),
            Axis::RightX => gamepad.value(GilrsAxis::RightStickX),
            Axis::RightY => gamepad.value(GilrsAxis::RightStickY),
            Axis::LeftTrigger => gamepad
                .button_data(GilrsButton::LeftTrigger2)
                .map(|data| data.value())
                .unwrap_or(0.0),
            Axis::RightTrigger => gamepad
                .button_data(GilrsButton::RightTrigger2)
                .map(|data| data.value())
                .unwrap_or(0.0),
        };
        scale_axis(value)
    }

    fn describe(&self, id: GamepadId) -> Option<DeviceDescription> {
        let gamepad = self.gamepad(id)?;
        let uuid: String = gamepad.uuid().iter().map(|b| format!("{b:02x}")).collect();
        let mapping = gamepad
            .map_name()
            .map(|map_name| format!("{uuid},{map_name},source:{:?}", gamepad.mapping_source()));

        Some(DeviceDescription {
            mapping,
            instance_id: id.to_string(),
            name: gamepad.name().to_string(),
            path: None,
            gamepad_type: classify(&gamepad),
            vendor_id: gamepad.vendor_id(),
            product_id: gamepad.product_id(),
            product_version: None,
        })
    }

    fn update(&mut self) {
        let mut events = 0;
        while let Some(event) = self.gilrs.next_event() {
            debug!("Processing gilrs event: {:?}", event.event);
            events += 1;
        }
        if events > 0 {
            debug!("Drained {} gilrs events", events);
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}
