//! Input module for sbc-platform.
//!
//! Responsibilities:
//! - Drain every pending native occurrence once per poll, in arrival order.
//! - Classify each occurrence and translate it into zero or more abstract [`InputEvent`]s.
//! - Forward those events to the host intake, then flush the host exactly once.
//! - Keep the device registry in step with hot-plug occurrences.
//!
//! Notes / constraints:
//! - Single-threaded: polling runs on the host's main tick and is never re-entered.
//! - Raw joystick occurrences from a device registered as a controller are suppressed, so
//!   one physical input never reaches the host twice.
//! - Controller remaps are logged only.
//!
//! [`InputEvent`]: crate::abi::InputEvent

pub mod devices;
pub mod joypad;
pub mod keyboard;
pub mod mouse;
pub mod touch;


pub use devices::{DeviceClass, DeviceRegistry};

use crate::abi::{InputSink, JoyButton};
use crate::native::{EventSource, InputDevices, NativeEvent, NativeWindow};
use log::{debug, info};
use mouse::PointerState;

/// Result of one poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// A quit occurrence was seen during this poll.
    pub quit_requested: bool,
    /// Native occurrences drained.
    pub processed: usize,
}

/// Native-to-host event pipeline.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    pointer: PointerState,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Drain `source`, forwarding translated events to `host`, then flush `host` once.
    pub fn process_events<S, D, W, H>(
        &mut self,
        source: &mut S,
        registry: &mut DeviceRegistry<D>,
        window: &W,
        host: &mut H,
    ) -> PollOutcome
    where
        S: EventSource + ?Sized,
        D: InputDevices,
        W: NativeWindow + ?Sized,
        H: InputSink + ?Sized,
    {
        let mut outcome = PollOutcome::default();
        while let Some(event) = source.poll_event() {
            outcome.processed += 1;
            if self.dispatch(event, registry, window, host) {
                outcome.quit_requested = true;
            }
        }
        host.flush_buffered_events();
        outcome
    }

    /// Translate and forward one occurrence. Returns `true` for a quit request.
    fn dispatch<D, W, H>(
        &mut self,
        event: NativeEvent,
        registry: &mut DeviceRegistry<D>,
        window: &W,
        host: &mut H,
    ) -> bool
    where
        D: InputDevices,
        W: NativeWindow + ?Sized,
        H: InputSink + ?Sized,
    {
        match event {
            NativeEvent::Quit => {
                info!("quit requested by the native layer");
                return true;
            }

            NativeEvent::Key {
                keycode,
                scancode,
                keymod,
                pressed,
                repeat,
            } => {
                if let Some(ev) = keyboard::key_event(keycode, scancode, keymod, pressed, repeat) {
                    host.parse_input_event(ev);
                }
            }
            NativeEvent::TextInput { text } => {
                for ev in keyboard::text_events(&text) {
                    host.parse_input_event(ev);
                }
            }

            NativeEvent::MouseMotion { x, y, xrel, yrel } => {
                let mask = host.mouse_button_mask();
                host.parse_input_event(self.pointer.motion(x, y, xrel, yrel, mask));
            }
            NativeEvent::MouseButton {
                button,
                clicks,
                x,
                y,
                pressed,
            } => {
                if let Some(ev) = self.pointer.button(button, clicks, x, y, pressed) {
                    host.parse_input_event(ev);
                }
            }
            NativeEvent::MouseWheel { x, y } => {
                for ev in self.pointer.wheel(x, y) {
                    host.parse_input_event(ev);
                }
            }

            NativeEvent::Finger {
                finger_id,
                x,
                y,
                pressed,
            } => {
                let size = window.size();
                host.parse_input_event(touch::touch_event(finger_id, x, y, pressed, size));
            }
            NativeEvent::FingerMotion {
                finger_id,
                x,
                y,
                dx,
                dy,
                pressure,
            } => {
                let size = window.size();
                host.parse_input_event(touch::drag_event(
                    finger_id,
                    (x, y),
                    (dx, dy),
                    pressure,
                    size,
                ));
            }

            NativeEvent::JoyDeviceAdded { index } | NativeEvent::ControllerDeviceAdded { index } => {
                registry.on_device_added(index);
            }
            NativeEvent::JoyDeviceRemoved { which }
            | NativeEvent::ControllerDeviceRemoved { which } => {
                registry.on_device_removed(which);
            }
            NativeEvent::ControllerDeviceRemapped { which } => {
                info!("controller {which} remapped");
            }

            NativeEvent::JoyAxisMotion { which, axis, value } => {
                if !registry.is_controller(which) {
                    host.parse_input_event(joypad::axis_event(which, axis, value));
                }
            }
            NativeEvent::JoyButton {
                which,
                button,
                pressed,
            } => {
                if !registry.is_controller(which) {
                    host.parse_input_event(joypad::button_event(which, JoyButton(button), pressed));
                }
            }
            NativeEvent::JoyHatMotion { which, hat, state } => {
                if !registry.is_controller(which) {
                    debug!("joystick {which} hat {hat} -> {state:?}");
                    for ev in joypad::hat_events(which, state) {
                        host.parse_input_event(ev);
                    }
                }
            }

            NativeEvent::ControllerAxisMotion { which, axis, value } => {
                host.parse_input_event(joypad::axis_event(which, axis, value));
            }
            NativeEvent::ControllerButton {
                which,
                button,
                pressed,
            } => {
                host.parse_input_event(joypad::button_event(which, JoyButton(button), pressed));
            }

            NativeEvent::Unknown => {}
        }
        false
    }
}
