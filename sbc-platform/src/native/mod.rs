//! Native layer boundary.
//!
//! Responsibilities:
//! - Describe the native occurrences the platform consumes ([`NativeEvent`]).
//! - Describe the native services the platform drives: event polling, input-device handles,
//!   the window and its displays.
//!
//! Notes / constraints:
//! - Everything here is a trait or plain data. The SDL2 implementation lives in
//!   `crate::backend::sdl` behind the `sdl` feature; tests use in-crate fakes.
//! - Numbering (keycodes, scancodes, modifier and hat bits, axis/button ids) follows SDL2.

mod keycode;

pub use keycode::{HatState, KeyMod, Keycode, Scancode};

use crate::abi::{JoystickId, Point2i, Rect2i, Size2i};
use bitflags::bitflags;
use thiserror::Error;

/// Failure reported by the native layer.
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("native call failed: {0}")]
    Call(String),
    #[error("display index {0} out of range")]
    InvalidDisplay(i32),
    #[error("device index {0} could not be opened: {1}")]
    DeviceOpen(u32, String),
    #[error("operation not supported by this backend")]
    Unsupported,
}

/// One native occurrence, in the vocabulary of the native layer.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeEvent {
    Quit,
    Key {
        keycode: Keycode,
        scancode: Scancode,
        keymod: KeyMod,
        pressed: bool,
        repeat: bool,
    },
    TextInput {
        text: String,
    },
    MouseMotion {
        x: i32,
        y: i32,
        xrel: i32,
        yrel: i32,
    },
    MouseButton {
        /// 1 left, 2 middle, 3 right, 4 X1, 5 X2.
        button: u8,
        clicks: u8,
        x: i32,
        y: i32,
        pressed: bool,
    },
    MouseWheel {
        x: i32,
        y: i32,
    },
    /// Coordinates are normalized to `[0, 1]`.
    Finger {
        finger_id: i64,
        x: f32,
        y: f32,
        pressed: bool,
    },
    FingerMotion {
        finger_id: i64,
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        pressure: f32,
    },
    JoyAxisMotion {
        which: JoystickId,
        axis: u8,
        value: i16,
    },
    JoyHatMotion {
        which: JoystickId,
        hat: u8,
        state: HatState,
    },
    JoyButton {
        which: JoystickId,
        button: u8,
        pressed: bool,
    },
    /// `index` is a device index, not an identity.
    JoyDeviceAdded {
        index: u32,
    },
    JoyDeviceRemoved {
        which: JoystickId,
    },
    ControllerAxisMotion {
        which: JoystickId,
        axis: u8,
        value: i16,
    },
    ControllerButton {
        which: JoystickId,
        button: u8,
        pressed: bool,
    },
    ControllerDeviceAdded {
        index: u32,
    },
    ControllerDeviceRemoved {
        which: JoystickId,
    },
    ControllerDeviceRemapped {
        which: JoystickId,
    },
    Unknown,
}

/// Source of pending native occurrences.
pub trait EventSource {
    /// Next pending occurrence, or `None` once the queue is drained.
    fn poll_event(&mut self) -> Option<NativeEvent>;
}

/// Native joystick / game-controller subsystem.
///
/// Handles close when passed back to `close_*` (or simply dropped).
pub trait InputDevices {
    type Controller;
    type Joystick;

    fn num_joysticks(&self) -> Result<u32, NativeError>;

    /// Whether the device at `index` has a game-controller mapping.
    fn is_game_controller(&self, index: u32) -> bool;

    fn open_controller(&mut self, index: u32) -> Result<Self::Controller, NativeError>;
    fn open_joystick(&mut self, index: u32) -> Result<Self::Joystick, NativeError>;

    fn controller_id(&self, controller: &Self::Controller) -> JoystickId;
    fn joystick_id(&self, joystick: &Self::Joystick) -> JoystickId;

    fn controller_name(&self, controller: &Self::Controller) -> String;
    fn joystick_name(&self, joystick: &Self::Joystick) -> String;

    /// Name of the device at `index` without opening it.
    fn device_name(&self, index: u32) -> Option<String>;

    fn close_controller(&mut self, controller: Self::Controller) {
        drop(controller);
    }

    fn close_joystick(&mut self, joystick: Self::Joystick) {
        drop(joystick);
    }
}

bitflags! {
    /// Native window state bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NativeWindowState: u32 {
        const FULLSCREEN = 1 << 0;
        const SHOWN = 1 << 1;
        const MINIMIZED = 1 << 2;
        const MAXIMIZED = 1 << 3;
        const INPUT_FOCUS = 1 << 4;
        const RESIZABLE = 1 << 5;
        const BORDERLESS = 1 << 6;
        const ALWAYS_ON_TOP = 1 << 7;
    }
}

/// The one native window plus the display queries that go through the video subsystem.
pub trait NativeWindow {
    fn set_title(&mut self, title: &str) -> Result<(), NativeError>;

    fn size(&self) -> Size2i;
    fn set_size(&mut self, size: Size2i) -> Result<(), NativeError>;

    /// Size including decorations. Backends without border queries report the client size.
    fn size_with_decorations(&self) -> Size2i {
        self.size()
    }

    fn position(&self) -> Point2i;
    fn set_position(&mut self, position: Point2i);

    fn min_size(&self) -> Size2i;
    fn set_min_size(&mut self, size: Size2i) -> Result<(), NativeError>;
    fn max_size(&self) -> Size2i;
    fn set_max_size(&mut self, size: Size2i) -> Result<(), NativeError>;

    fn state(&self) -> NativeWindowState;
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), NativeError>;
    fn minimize(&mut self);
    fn maximize(&mut self);
    fn restore(&mut self);
    fn raise(&mut self);
    fn flash(&mut self) -> Result<(), NativeError>;

    fn set_resizable(&mut self, resizable: bool);
    fn set_bordered(&mut self, bordered: bool);
    fn set_always_on_top(&mut self, on_top: bool);

    /// Display the window currently sits on.
    fn display_index(&self) -> Result<i32, NativeError>;
    fn num_displays(&self) -> Result<i32, NativeError>;
    fn display_bounds(&self, display: i32) -> Result<Rect2i, NativeError>;
    fn display_usable_bounds(&self, display: i32) -> Result<Rect2i, NativeError>;
    /// Diagonal DPI.
    fn display_dpi(&self, display: i32) -> Result<f32, NativeError>;
    fn display_refresh_rate(&self, display: i32) -> Result<f32, NativeError>;

    /// Name of the active video driver ("x11", "wayland", "KMSDRM", ...).
    fn video_driver(&self) -> String;

    /// Pointer position relative to the window.
    fn mouse_position(&self) -> Point2i;
    fn set_relative_mouse_mode(&mut self, enabled: bool);
    fn show_cursor(&mut self, visible: bool);
}
