//! Abstract input events delivered to the host.
//!
//! Every variant carries only its own fields. Invariants the dispatcher upholds:
//! - axis values are in `[-1.0, 1.0]`
//! - pressures are in `[0.0, 1.0]`

use super::{JoystickId, Vector2};
use bitflags::bitflags;

/// Abstract host key.
///
/// Printable keys use their upper-case ASCII value; non-printable keys live above
/// [`Key::SPECIAL`]. Physical keys are [`Key::PHYSICAL_MASK`] combined with the native
/// scancode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u32);

impl Key {
    pub const NONE: Key = Key(0);
    pub const SPECIAL: u32 = 1 << 22;
    pub const PHYSICAL_MASK: u32 = 0x80_0000;

    pub const ESCAPE: Key = Key::special(0x01);
    pub const TAB: Key = Key::special(0x02);
    pub const BACKTAB: Key = Key::special(0x03);
    pub const BACKSPACE: Key = Key::special(0x04);
    pub const ENTER: Key = Key::special(0x05);
    pub const KP_ENTER: Key = Key::special(0x06);
    pub const INSERT: Key = Key::special(0x07);
    pub const DELETE: Key = Key::special(0x08);
    pub const PAUSE: Key = Key::special(0x09);
    pub const PRINT: Key = Key::special(0x0A);
    pub const SYSREQ: Key = Key::special(0x0B);
    pub const CLEAR: Key = Key::special(0x0C);
    pub const HOME: Key = Key::special(0x0D);
    pub const END: Key = Key::special(0x0E);
    pub const LEFT: Key = Key::special(0x0F);
    pub const UP: Key = Key::special(0x10);
    pub const RIGHT: Key = Key::special(0x11);
    pub const DOWN: Key = Key::special(0x12);
    pub const PAGE_UP: Key = Key::special(0x13);
    pub const PAGE_DOWN: Key = Key::special(0x14);
    pub const SHIFT: Key = Key::special(0x15);
    pub const CTRL: Key = Key::special(0x16);
    pub const META: Key = Key::special(0x17);
    pub const ALT: Key = Key::special(0x18);
    pub const CAPS_LOCK: Key = Key::special(0x19);
    pub const NUM_LOCK: Key = Key::special(0x1A);
    pub const SCROLL_LOCK: Key = Key::special(0x1B);
    /// F1; F2..F35 follow contiguously.
    pub const F1: Key = Key::special(0x1C);
    pub const MENU: Key = Key::special(0x42);
    pub const HELP: Key = Key::special(0x45);
    pub const VOLUME_DOWN: Key = Key::special(0x4C);
    pub const VOLUME_MUTE: Key = Key::special(0x4D);
    pub const VOLUME_UP: Key = Key::special(0x4E);
    pub const KP_MULTIPLY: Key = Key::special(0x81);
    pub const KP_DIVIDE: Key = Key::special(0x82);
    pub const KP_SUBTRACT: Key = Key::special(0x83);
    pub const KP_PERIOD: Key = Key::special(0x84);
    pub const KP_ADD: Key = Key::special(0x85);
    /// Keypad 0; keypad 1..9 follow contiguously.
    pub const KP_0: Key = Key::special(0x86);

    pub const SPACE: Key = Key(0x20);
    pub const APOSTROPHE: Key = Key(0x27);
    pub const COMMA: Key = Key(0x2C);
    pub const MINUS: Key = Key(0x2D);
    pub const PERIOD: Key = Key(0x2E);
    pub const SLASH: Key = Key(0x2F);
    pub const SEMICOLON: Key = Key(0x3B);
    pub const EQUAL: Key = Key(0x3D);
    pub const BRACKET_LEFT: Key = Key(0x5B);
    pub const BACKSLASH: Key = Key(0x5C);
    pub const BRACKET_RIGHT: Key = Key(0x5D);
    pub const QUOTE_LEFT: Key = Key(0x60);

    const fn special(code: u32) -> Key {
        Key(Key::SPECIAL | code)
    }

    /// Function key `F<n>` for `n` in `1..=35`.
    pub const fn function(n: u32) -> Key {
        Key(Key::F1.0 + n - 1)
    }

    /// Keypad digit key for `digit` in `0..=9`.
    pub const fn keypad(digit: u32) -> Key {
        Key(Key::KP_0.0 + digit)
    }

    /// Physical key for a native scancode.
    pub const fn physical(scancode: u32) -> Key {
        Key(Key::PHYSICAL_MASK | scancode)
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

bitflags! {
    /// Keyboard modifier state attached to key events.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT = 1 << 1;
        const CTRL = 1 << 2;
        const META = 1 << 3;
    }
}

/// Host mouse button index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MouseButton(pub u8);

impl MouseButton {
    pub const LEFT: MouseButton = MouseButton(1);
    pub const RIGHT: MouseButton = MouseButton(2);
    pub const MIDDLE: MouseButton = MouseButton(3);
    pub const WHEEL_UP: MouseButton = MouseButton(4);
    pub const WHEEL_DOWN: MouseButton = MouseButton(5);
    pub const WHEEL_LEFT: MouseButton = MouseButton(6);
    pub const WHEEL_RIGHT: MouseButton = MouseButton(7);
    pub const XBUTTON1: MouseButton = MouseButton(8);
    pub const XBUTTON2: MouseButton = MouseButton(9);
}

bitflags! {
    /// Set of held mouse buttons. Bit `n - 1` corresponds to `MouseButton(n)`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MouseButtonMask: u32 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const XBUTTON1 = 1 << 7;
        const XBUTTON2 = 1 << 8;
    }
}

/// Host joypad button index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JoyButton(pub u8);

impl JoyButton {
    pub const A: JoyButton = JoyButton(0);
    pub const B: JoyButton = JoyButton(1);
    pub const X: JoyButton = JoyButton(2);
    pub const Y: JoyButton = JoyButton(3);
    pub const BACK: JoyButton = JoyButton(4);
    pub const GUIDE: JoyButton = JoyButton(5);
    pub const START: JoyButton = JoyButton(6);
    pub const LEFT_STICK: JoyButton = JoyButton(7);
    pub const RIGHT_STICK: JoyButton = JoyButton(8);
    pub const LEFT_SHOULDER: JoyButton = JoyButton(9);
    pub const RIGHT_SHOULDER: JoyButton = JoyButton(10);
    pub const DPAD_UP: JoyButton = JoyButton(11);
    pub const DPAD_DOWN: JoyButton = JoyButton(12);
    pub const DPAD_LEFT: JoyButton = JoyButton(13);
    pub const DPAD_RIGHT: JoyButton = JoyButton(14);
    pub const MISC1: JoyButton = JoyButton(15);
}

/// Host joypad axis index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JoyAxis(pub u8);

impl JoyAxis {
    pub const LEFT_X: JoyAxis = JoyAxis(0);
    pub const LEFT_Y: JoyAxis = JoyAxis(1);
    pub const RIGHT_X: JoyAxis = JoyAxis(2);
    pub const RIGHT_Y: JoyAxis = JoyAxis(3);
    pub const TRIGGER_LEFT: JoyAxis = JoyAxis(4);
    pub const TRIGGER_RIGHT: JoyAxis = JoyAxis(5);
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    pub window_id: i32,
    pub keycode: Key,
    pub physical_keycode: Key,
    pub unicode: Option<char>,
    pub pressed: bool,
    /// Auto-repeat.
    pub echo: bool,
    pub modifiers: KeyModifiers,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MouseMotionEvent {
    pub window_id: i32,
    pub position: Vector2,
    pub relative: Vector2,
    pub button_mask: MouseButtonMask,
    pub pressure: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MouseButtonEvent {
    pub window_id: i32,
    pub position: Vector2,
    pub button: MouseButton,
    pub pressed: bool,
    pub double_click: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenTouchEvent {
    pub window_id: i32,
    pub index: i64,
    pub position: Vector2,
    pub pressed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenDragEvent {
    pub window_id: i32,
    pub index: i64,
    pub position: Vector2,
    pub relative: Vector2,
    pub pressure: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoypadMotionEvent {
    pub device: JoystickId,
    pub axis: JoyAxis,
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoypadButtonEvent {
    pub device: JoystickId,
    pub button: JoyButton,
    pub pressed: bool,
    pub pressure: f32,
}

/// One abstract input occurrence, as consumed by [`crate::abi::InputSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Key(KeyEvent),
    MouseMotion(MouseMotionEvent),
    MouseButton(MouseButtonEvent),
    ScreenTouch(ScreenTouchEvent),
    ScreenDrag(ScreenDragEvent),
    JoypadMotion(JoypadMotionEvent),
    JoypadButton(JoypadButtonEvent),
}
