//! sbc-platform host ABI module
//!
//! This module defines the contract between:
//! - **Host**: the game engine that embeds this platform layer
//! - **Platform**: the display/audio/input backends implemented by this crate
//!
//! ## High-level model
//! The platform owns the native window, the audio device and the attached input devices.
//! The host owns the event queue, the audio mixer and the main loop.
//!
//! ### Input (platform -> host)
//! - [`InputSink::parse_input_event`] receives one abstract [`InputEvent`] at a time, in
//!   native arrival order.
//! - [`InputSink::flush_buffered_events`] is called exactly once after every poll.
//! - [`InputSink::mouse_button_mask`] is queried when building mouse-motion events.
//!
//! ### Audio (host -> platform)
//! - [`AudioMixer::mix`] fills `frames * channels` interleaved 32-bit samples. The value range is
//!   the full `i32` range; the platform narrows to 16 bits by saturation.
//!
//! ### Main loop (platform -> host)
//! - [`MainLoop::initialize`] once, [`MainLoop::iteration`] once per tick until it returns `true`
//!   or a quit is requested, then [`MainLoop::finalize`].
//!
//! Notes:
//! - Keycodes, mouse buttons and joypad ids are host-defined numbers wrapped in newtypes here.
//!   The numbering is stable; the host matches on the associated constants.

mod event;

pub use event::{
    InputEvent, JoyAxis, JoyButton, JoypadButtonEvent, JoypadMotionEvent, Key, KeyEvent,
    KeyModifiers, MouseButton, MouseButtonEvent, MouseButtonMask, MouseMotionEvent,
    ScreenDragEvent, ScreenTouchEvent,
};

use bitflags::bitflags;

/// Identifier of the single window owned by a display server.
pub const MAIN_WINDOW_ID: i32 = 0;

/// Sentinel screen index meaning "the screen the main window is on".
pub const SCREEN_OF_MAIN_WINDOW: i32 = -1;

/// Opaque stable identity the native layer assigns to an attached input device.
pub type JoystickId = u32;

/// 2D float vector (positions and deltas in window pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Integer point (window/screen positions).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer size (window/screen sizes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size2i {
    pub width: i32,
    pub height: i32,
}

impl Size2i {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Integer rectangle (screen bounds, usable areas).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect2i {
    pub position: Point2i,
    pub size: Size2i,
}

impl Rect2i {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            position: Point2i::new(x, y),
            size: Size2i::new(width, height),
        }
    }
}

/// Window presentation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WindowMode {
    #[default]
    Windowed,
    Minimized,
    Maximized,
    Fullscreen,
}

/// Presentation synchronization mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VSyncMode {
    Disabled,
    #[default]
    Enabled,
    Adaptive,
    Mailbox,
}

bitflags! {
    /// Boolean window flags the host can toggle.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const RESIZE_DISABLED = 1 << 0;
        const BORDERLESS = 1 << 1;
        const ALWAYS_ON_TOP = 1 << 2;
    }
}

/// Mouse pointer mode requested by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MouseMode {
    #[default]
    Visible,
    Hidden,
    Captured,
    Confined,
}

/// Optional display-server capabilities the host can probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Mouse,
    Icon,
    SwapBuffers,
    Touchscreen,
    Clipboard,
    VirtualKeyboard,
}

/// Host input intake.
pub trait InputSink {
    /// Accept one abstract input event.
    fn parse_input_event(&mut self, event: InputEvent);

    /// Deliver everything accumulated since the previous flush.
    fn flush_buffered_events(&mut self);

    /// Current mouse-button mask as tracked by the host.
    fn mouse_button_mask(&self) -> MouseButtonMask;
}

/// Host audio mixer.
pub trait AudioMixer: Send {
    /// Fill `out` (exactly `frames * channels` samples, interleaved) with mixed audio.
    fn mix(&mut self, frames: usize, out: &mut [i32]);
}

/// Host main loop.
pub trait MainLoop {
    fn initialize(&mut self);

    /// Run one tick. Returns `true` when the host wants to stop.
    fn iteration(&mut self) -> bool;

    fn finalize(&mut self);
}
