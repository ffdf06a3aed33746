//! Fixed button and axis tables
//!
//! Order is part of the output contract: consumers may read the decoded
//! lists positionally.

use super::subsystem::{Axis, Button};

// Where a named button reads its state from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSource {
    Digital(Button),
    /// Trigger axis treated as a press at full pull
    Trigger(Axis),
}

pub const BUTTON_LAYOUT: [(&str, ButtonSource); 18] = [
    ("dpad_up", ButtonSource::Digital(Button::DPadUp)),
    ("dpad_down", ButtonSource::Digital(Button::DPadDown)),
    ("dpad_left", ButtonSource::Digital(Button::DPadLeft)),
    ("dpad_right", ButtonSource::Digital(Button::DPadRight)),
    ("south", ButtonSource::Digital(Button::South)),
    ("east", ButtonSource::Digital(Button::East)),
    ("north", ButtonSource::Digital(Button::North)),
    ("west", ButtonSource::Digital(Button::West)),
    ("left_shoulder", ButtonSource::Digital(Button::LeftShoulder)),
    ("right_shoulder", ButtonSource::Digital(Button::RightShoulder)),
    ("left_stick", ButtonSource::Digital(Button::LeftStick)),
    ("right_stick", ButtonSource::Digital(Button::RightStick)),
    ("start", ButtonSource::Digital(Button::Start)),
    ("back", ButtonSource::Digital(Button::Back)),
    ("guide", ButtonSource::Digital(Button::Guide)),
    ("capture", ButtonSource::Digital(Button::Misc1)),
    ("left_trigger", ButtonSource::Trigger(Axis::LeftTrigger)),
    ("right_trigger", ButtonSource::Trigger(Axis::RightTrigger)),
];

pub const AXIS_LAYOUT: [(&str, Axis); 4] = [
    ("left_x", Axis::LeftX),
    ("left_y", Axis::LeftY),
    ("right_x", Axis::RightX),
    ("right_y", Axis::RightY),
];

pub fn button_names() -> impl Iterator<Item = &'static str> {
    BUTTON_LAYOUT.iter().map(|(name, _)| *name)
}

pub fn axis_names() -> impl Iterator<Item = &'static str> {
    AXIS_LAYOUT.iter().map(|(name, _)| *name)
}
