//! Touch translation. Native coordinates are normalized; the host wants window pixels.

use crate::abi::{InputEvent, MAIN_WINDOW_ID, ScreenDragEvent, ScreenTouchEvent, Size2i, Vector2};

fn scale(x: f32, y: f32, size: Size2i) -> Vector2 {
    Vector2::new(x * size.width as f32, y * size.height as f32)
}

pub fn touch_event(finger: i64, x: f32, y: f32, pressed: bool, window: Size2i) -> InputEvent {
    InputEvent::ScreenTouch(ScreenTouchEvent {
        window_id: MAIN_WINDOW_ID,
        index: finger,
        position: scale(x, y, window),
        pressed,
    })
}

pub fn drag_event(
    finger: i64,
    (x, y): (f32, f32),
    (dx, dy): (f32, f32),
    pressure: f32,
    window: Size2i,
) -> InputEvent {
    InputEvent::ScreenDrag(ScreenDragEvent {
        window_id: MAIN_WINDOW_ID,
        index: finger,
        position: scale(x, y, window),
        relative: scale(dx, dy, window),
        pressure: pressure.clamp(0.0, 1.0),
    })
}
