//! Platform configuration.
//!
//! Defaults describe a typical SBC: fullscreen 800x600 with vsync, Vulkan with a GLES
//! fallback, 48 kHz stereo audio with a 2048-frame cycle on the default output device.
//!
//! Environment overrides (malformed values are logged and ignored):
//! - `SBC_RENDERING_DRIVER`: `vulkan`, `opengl3`, `opengl3_es`
//! - `SBC_WINDOW_SIZE`: `<width>x<height>`
//! - `SBC_WINDOW_MODE`: `windowed`, `fullscreen`, `maximized`, `minimized`
//! - `SBC_VSYNC`: `disabled`, `enabled`, `adaptive`, `mailbox`
//! - `SBC_AUDIO_DEVICE`: output device name, `Default` for the system default
//! - `SBC_AUDIO_MIX_RATE`, `SBC_AUDIO_LATENCY`: positive integers
//! - `SBC_AUDIO_MODE`: `push`, `pull`
//! - `SBC_SAFE_MODE`: `1`/`true`/`yes`/`on` to skip risky GPU reconfiguration

use crate::abi::{Size2i, VSyncMode, WindowFlags, WindowMode};
use crate::audio::StreamMode;
use crate::display::RenderingDriver;
use log::warn;
use std::str::FromStr;
use thiserror::Error;

pub const ENV_SAFE_MODE: &str = "SBC_SAFE_MODE";

/// Reserved output-device name selecting the system default.
pub const DEFAULT_OUTPUT_DEVICE: &str = "Default";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: expected {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    pub title: String,
    pub size: Size2i,
    pub mode: WindowMode,
    pub flags: WindowFlags,
    pub vsync: VSyncMode,
    pub rendering_driver: RenderingDriver,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: "sbc".to_string(),
            size: Size2i::new(800, 600),
            mode: WindowMode::Fullscreen,
            flags: WindowFlags::empty(),
            vsync: VSyncMode::Enabled,
            rendering_driver: RenderingDriver::Vulkan,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioConfig {
    pub mix_rate: u32,
    pub channels: u16,
    pub latency_frames: u16,
    pub output_device: String,
    pub mode: StreamMode,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            mix_rate: 48_000,
            channels: 2,
            latency_frames: 2048,
            output_device: DEFAULT_OUTPUT_DEVICE.to_string(),
            mode: StreamMode::Push,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlatformConfig {
    pub display: DisplayConfig,
    pub audio: AudioConfig,
    pub safe_mode: bool,
}

impl PlatformConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let env = |var: &'static str| lookup(var).map(|v| (var, v));

        if let Some((var, v)) = env("SBC_RENDERING_DRIVER") {
            apply(&mut cfg.display.rendering_driver, parse_driver(var, &v));
        }
        if let Some((var, v)) = env("SBC_WINDOW_SIZE") {
            apply(&mut cfg.display.size, parse_size(var, &v));
        }
        if let Some((var, v)) = env("SBC_WINDOW_MODE") {
            apply(&mut cfg.display.mode, parse_window_mode(var, &v));
        }
        if let Some((var, v)) = env("SBC_VSYNC") {
            apply(&mut cfg.display.vsync, parse_vsync(var, &v));
        }
        if let Some((_, v)) = env("SBC_AUDIO_DEVICE") {
            if !v.trim().is_empty() {
                cfg.audio.output_device = v.trim().to_string();
            }
        }
        if let Some((var, v)) = env("SBC_AUDIO_MIX_RATE") {
            apply(&mut cfg.audio.mix_rate, parse_positive(var, &v));
        }
        if let Some((var, v)) = env("SBC_AUDIO_LATENCY") {
            apply(&mut cfg.audio.latency_frames, parse_positive(var, &v));
        }
        if let Some((var, v)) = env("SBC_AUDIO_MODE") {
            apply(&mut cfg.audio.mode, parse_stream_mode(var, &v));
        }
        if let Some((var, v)) = env(ENV_SAFE_MODE) {
            apply(&mut cfg.safe_mode, parse_bool(var, &v));
        }
        cfg
    }
}

fn apply<T>(slot: &mut T, parsed: Result<T, ConfigError>) {
    match parsed {
        Ok(value) => *slot = value,
        Err(err) => warn!("ignoring configuration override: {err}"),
    }
}

fn invalid(var: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    }
}

/// Boolean-like environment value.
pub fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(var, "a boolean", value)),
    }
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(invalid(var, "a positive integer", value)),
    }
}

fn parse_size(var: &'static str, value: &str) -> Result<Size2i, ConfigError> {
    let err = || invalid(var, "<width>x<height>", value);
    let (w, h) = value.trim().split_once(['x', 'X']).ok_or_else(err)?;
    let width: i32 = w.trim().parse().map_err(|_| err())?;
    let height: i32 = h.trim().parse().map_err(|_| err())?;
    if width <= 0 || height <= 0 {
        return Err(err());
    }
    Ok(Size2i::new(width, height))
}

fn parse_driver(var: &'static str, value: &str) -> Result<RenderingDriver, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(var, "vulkan, opengl3 or opengl3_es", value))
}

fn parse_window_mode(var: &'static str, value: &str) -> Result<WindowMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "windowed" => Ok(WindowMode::Windowed),
        "fullscreen" => Ok(WindowMode::Fullscreen),
        "maximized" => Ok(WindowMode::Maximized),
        "minimized" => Ok(WindowMode::Minimized),
        _ => Err(invalid(var, "a window mode", value)),
    }
}

fn parse_vsync(var: &'static str, value: &str) -> Result<VSyncMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "disabled" | "off" => Ok(VSyncMode::Disabled),
        "enabled" | "on" => Ok(VSyncMode::Enabled),
        "adaptive" => Ok(VSyncMode::Adaptive),
        "mailbox" => Ok(VSyncMode::Mailbox),
        _ => Err(invalid(var, "a vsync mode", value)),
    }
}

fn parse_stream_mode(var: &'static str, value: &str) -> Result<StreamMode, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "push" | "callback" => Ok(StreamMode::Push),
        "pull" | "queue" => Ok(StreamMode::Pull),
        _ => Err(invalid(var, "push or pull", value)),
    }
}
