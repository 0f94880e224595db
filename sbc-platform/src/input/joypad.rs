//! Joystick / game-controller translation.

use crate::abi::{
    InputEvent, JoyAxis, JoyButton, JoypadButtonEvent, JoypadMotionEvent, JoystickId,
};
use crate::native::HatState;

/// Native axis value -> `[-1.0, 1.0]`. `i16::MIN` would land just below -1 and is clamped.
pub fn normalize_axis(value: i16) -> f32 {
    (f32::from(value) / 32767.0).clamp(-1.0, 1.0)
}

pub fn axis_event(device: JoystickId, axis: u8, value: i16) -> InputEvent {
    InputEvent::JoypadMotion(JoypadMotionEvent {
        device,
        axis: JoyAxis(axis),
        value: normalize_axis(value),
    })
}

pub fn button_event(device: JoystickId, button: JoyButton, pressed: bool) -> InputEvent {
    InputEvent::JoypadButton(JoypadButtonEvent {
        device,
        button,
        pressed,
        pressure: if pressed { 1.0 } else { 0.0 },
    })
}

/// Hat position as four D-pad button events, always UP, RIGHT, DOWN, LEFT.
pub fn hat_events(device: JoystickId, state: HatState) -> [InputEvent; 4] {
    [
        (HatState::UP, JoyButton::DPAD_UP),
        (HatState::RIGHT, JoyButton::DPAD_RIGHT),
        (HatState::DOWN, JoyButton::DPAD_DOWN),
        (HatState::LEFT, JoyButton::DPAD_LEFT),
    ]
    .map(|(bit, button)| button_event(device, button, state.contains(bit)))
}
