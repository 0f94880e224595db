//! sbc-platform: display, audio and input platform layer for Linux single-board computers.
//!
//! The crate sits between a game engine (the host) and a native media library:
//! - `display`: one native window, screen queries, vsync and the per-tick input pipeline.
//! - `input`: device registry plus the dispatcher that turns native events into host events.
//! - `keymap`: native keycodes/scancodes to host keys.
//! - `audio`: push/pull streaming from the host mixer to an output device.
//! - `os`: platform identity, XDG paths, logging and the main loop.
//!
//! The native layer is reached only through the traits in `native` (windows, devices,
//! event source) and `audio` (`AudioBackend`). The SDL2 implementation lives in `backend`
//! behind the `sdl` feature.
//!
//! The host contract is defined in `crate::abi`.

pub mod abi;
pub mod audio;
pub mod config;
pub mod display;
pub mod input;
pub mod keymap;
pub mod native;
pub mod os;

#[cfg(feature = "sdl")]
pub mod backend;

#[cfg(test)]
mod test_support;

pub use audio::{AudioDriver, AudioError, SpeakerMode, StreamMode, WavCaptureBackend};
pub use config::{AudioConfig, ConfigError, DisplayConfig, PlatformConfig};
pub use display::{DisplayError, DisplayServer, RenderingDriver};
pub use os::{OsSbc, init_logging};
