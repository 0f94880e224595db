//! Mouse translation and last-known pointer position.

use crate::abi::{
    InputEvent, MAIN_WINDOW_ID, MouseButton, MouseButtonEvent, MouseButtonMask, MouseMotionEvent,
    Vector2,
};

/// Host button for a native button number (1 left, 2 middle, 3 right, 4 X1, 5 X2).
pub fn map_native_button(button: u8) -> Option<MouseButton> {
    match button {
        1 => Some(MouseButton::LEFT),
        2 => Some(MouseButton::MIDDLE),
        3 => Some(MouseButton::RIGHT),
        4 => Some(MouseButton::XBUTTON1),
        5 => Some(MouseButton::XBUTTON2),
        _ => None,
    }
}

/// Pointer state carried across polls. Wheel events are placed at the last known position.
#[derive(Debug, Default)]
pub struct PointerState {
    last_position: Vector2,
}

impl PointerState {
    pub fn last_position(&self) -> Vector2 {
        self.last_position
    }

    pub fn motion(
        &mut self,
        x: i32,
        y: i32,
        xrel: i32,
        yrel: i32,
        mask: MouseButtonMask,
    ) -> InputEvent {
        let position = Vector2::new(x as f32, y as f32);
        self.last_position = position;
        InputEvent::MouseMotion(MouseMotionEvent {
            window_id: MAIN_WINDOW_ID,
            position,
            relative: Vector2::new(xrel as f32, yrel as f32),
            button_mask: mask,
            pressure: 1.0,
        })
    }

    pub fn button(
        &mut self,
        button: u8,
        clicks: u8,
        x: i32,
        y: i32,
        pressed: bool,
    ) -> Option<InputEvent> {
        let position = Vector2::new(x as f32, y as f32);
        self.last_position = position;
        let button = map_native_button(button)?;
        Some(InputEvent::MouseButton(MouseButtonEvent {
            window_id: MAIN_WINDOW_ID,
            position,
            button,
            pressed,
            double_click: clicks == 2,
        }))
    }

    /// Vertical component first, then horizontal. Wheel "buttons" are press-only.
    pub fn wheel(&self, x: i32, y: i32) -> impl Iterator<Item = InputEvent> {
        let vertical = match y.signum() {
            1 => Some(MouseButton::WHEEL_UP),
            -1 => Some(MouseButton::WHEEL_DOWN),
            _ => None,
        };
        let horizontal = match x.signum() {
            1 => Some(MouseButton::WHEEL_RIGHT),
            -1 => Some(MouseButton::WHEEL_LEFT),
            _ => None,
        };
        let position = self.last_position;
        vertical.into_iter().chain(horizontal).map(move |button| {
            InputEvent::MouseButton(MouseButtonEvent {
                window_id: MAIN_WINDOW_ID,
                position,
                button,
                pressed: true,
                double_click: false,
            })
        })
    }
}
