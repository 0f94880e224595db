//! SDL2 implementation of the native layer.
//!
//! Responsibilities:
//! - Convert SDL events into [`NativeEvent`]s.
//! - Expose the joystick / game-controller subsystems as [`InputDevices`].
//! - Wrap the SDL window and video subsystem as a [`NativeWindow`], plus GL swap control.
//! - Open SDL audio devices in queue or callback mode.
//! - Bootstrap all of the above from a [`PlatformConfig`] ([`SdlPlatform::init`]).
//!
//! Notes / constraints:
//! - The safe `sdl2` audio types are not `Send`, but the stream thread must own its device.
//!   Audio therefore goes through the raw `SDL_*AudioDevice*` calls, which SDL documents as
//!   callable from any thread once the audio subsystem is up.
//! - Audio devices must be closed before the [`SdlPlatform`] that initialized the audio
//!   subsystem is dropped.

use crate::abi::{AudioMixer, JoystickId, Point2i, Rect2i, Size2i, VSyncMode};
use crate::audio::{
    AudioBackend, AudioDevice, AudioDriver, AudioError, AudioSpec, PushFeed, SAMPLE_BYTES,
};
use crate::config::{DEFAULT_OUTPUT_DEVICE, DisplayConfig, PlatformConfig};
use crate::display::{
    DisplayServer, GlesContext, PresentModeControl, RenderingContext, RenderingDriver,
    SwapControl, VulkanContext, select_rendering_driver,
};
use crate::native::{
    EventSource, HatState, InputDevices, KeyMod, Keycode, NativeError, NativeEvent, NativeWindow,
    NativeWindowState, Scancode,
};
use anyhow::Context;
use log::{info, warn};
use sdl2::controller::GameController;
use sdl2::event::Event;
use sdl2::joystick::{HatState as SdlHat, Joystick};
use sdl2::mouse::{MouseButton, MouseUtil};
use sdl2::sys;
use sdl2::sys::SDL_WindowFlags;
use sdl2::video::{
    FlashOperation, FullscreenType, GLContext, GLProfile, SwapInterval, Window, WindowPos,
};
use sdl2::{EventPump, GameControllerSubsystem, JoystickSubsystem, Sdl, VideoSubsystem};
use std::cell::Cell;
use std::ffi::{CStr, CString, c_int, c_void};
use std::ptr;
use std::rc::Rc;

// --- Events ---

/// SDL event queue as an [`EventSource`].
pub struct SdlEvents {
    pump: EventPump,
}

impl SdlEvents {
    pub fn new(pump: EventPump) -> Self {
        Self { pump }
    }
}

impl EventSource for SdlEvents {
    fn poll_event(&mut self) -> Option<NativeEvent> {
        self.pump.poll_event().map(convert_event)
    }
}

fn mouse_button_id(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
        MouseButton::X1 => 4,
        MouseButton::X2 => 5,
        MouseButton::Unknown => 0,
    }
}

fn hat_state(state: SdlHat) -> HatState {
    match state {
        SdlHat::Centered => HatState::empty(),
        SdlHat::Up => HatState::UP,
        SdlHat::Right => HatState::RIGHT,
        SdlHat::Down => HatState::DOWN,
        SdlHat::Left => HatState::LEFT,
        SdlHat::RightUp => HatState::RIGHT | HatState::UP,
        SdlHat::RightDown => HatState::RIGHT | HatState::DOWN,
        SdlHat::LeftUp => HatState::LEFT | HatState::UP,
        SdlHat::LeftDown => HatState::LEFT | HatState::DOWN,
    }
}

fn key_event(
    keycode: Option<sdl2::keyboard::Keycode>,
    scancode: Option<sdl2::keyboard::Scancode>,
    keymod: sdl2::keyboard::Mod,
    pressed: bool,
    repeat: bool,
) -> NativeEvent {
    NativeEvent::Key {
        keycode: keycode.map_or(Keycode::UNKNOWN, |k| Keycode(k.into_i32())),
        scancode: scancode.map_or(Scancode::UNKNOWN, |s| Scancode(s as u32)),
        keymod: KeyMod::from_bits_truncate(keymod.bits()),
        pressed,
        repeat,
    }
}

fn convert_event(event: Event) -> NativeEvent {
    match event {
        Event::Quit { .. } => NativeEvent::Quit,

        Event::KeyDown {
            keycode,
            scancode,
            keymod,
            repeat,
            ..
        } => key_event(keycode, scancode, keymod, true, repeat),
        Event::KeyUp {
            keycode,
            scancode,
            keymod,
            repeat,
            ..
        } => key_event(keycode, scancode, keymod, false, repeat),
        Event::TextInput { text, .. } => NativeEvent::TextInput { text },

        Event::MouseMotion {
            x, y, xrel, yrel, ..
        } => NativeEvent::MouseMotion { x, y, xrel, yrel },
        Event::MouseButtonDown {
            mouse_btn,
            clicks,
            x,
            y,
            ..
        } => NativeEvent::MouseButton {
            button: mouse_button_id(mouse_btn),
            clicks,
            x,
            y,
            pressed: true,
        },
        Event::MouseButtonUp {
            mouse_btn,
            clicks,
            x,
            y,
            ..
        } => NativeEvent::MouseButton {
            button: mouse_button_id(mouse_btn),
            clicks,
            x,
            y,
            pressed: false,
        },
        Event::MouseWheel { x, y, .. } => NativeEvent::MouseWheel { x, y },

        Event::FingerDown {
            finger_id, x, y, ..
        } => NativeEvent::Finger {
            finger_id,
            x,
            y,
            pressed: true,
        },
        Event::FingerUp {
            finger_id, x, y, ..
        } => NativeEvent::Finger {
            finger_id,
            x,
            y,
            pressed: false,
        },
        Event::FingerMotion {
            finger_id,
            x,
            y,
            dx,
            dy,
            pressure,
            ..
        } => NativeEvent::FingerMotion {
            finger_id,
            x,
            y,
            dx,
            dy,
            pressure,
        },

        Event::JoyAxisMotion {
            which,
            axis_idx,
            value,
            ..
        } => NativeEvent::JoyAxisMotion {
            which,
            axis: axis_idx,
            value,
        },
        Event::JoyHatMotion {
            which,
            hat_idx,
            state,
            ..
        } => NativeEvent::JoyHatMotion {
            which,
            hat: hat_idx,
            state: hat_state(state),
        },
        Event::JoyButtonDown {
            which, button_idx, ..
        } => NativeEvent::JoyButton {
            which,
            button: button_idx,
            pressed: true,
        },
        Event::JoyButtonUp {
            which, button_idx, ..
        } => NativeEvent::JoyButton {
            which,
            button: button_idx,
            pressed: false,
        },
        Event::JoyDeviceAdded { which, .. } => NativeEvent::JoyDeviceAdded { index: which },
        Event::JoyDeviceRemoved { which, .. } => NativeEvent::JoyDeviceRemoved { which },

        Event::ControllerAxisMotion {
            which, axis, value, ..
        } => NativeEvent::ControllerAxisMotion {
            which,
            axis: axis as u8,
            value,
        },
        Event::ControllerButtonDown { which, button, .. } => NativeEvent::ControllerButton {
            which,
            button: button as u8,
            pressed: true,
        },
        Event::ControllerButtonUp { which, button, .. } => NativeEvent::ControllerButton {
            which,
            button: button as u8,
            pressed: false,
        },
        Event::ControllerDeviceAdded { which, .. } => {
            NativeEvent::ControllerDeviceAdded { index: which }
        }
        Event::ControllerDeviceRemoved { which, .. } => {
            NativeEvent::ControllerDeviceRemoved { which }
        }
        Event::ControllerDeviceRemapped { which, .. } => {
            NativeEvent::ControllerDeviceRemapped { which }
        }

        _ => NativeEvent::Unknown,
    }
}

// --- Input devices ---

/// Joystick and game-controller subsystems.
pub struct SdlDevices {
    joystick: JoystickSubsystem,
    controller: GameControllerSubsystem,
}

impl SdlDevices {
    pub fn new(joystick: JoystickSubsystem, controller: GameControllerSubsystem) -> Self {
        Self {
            joystick,
            controller,
        }
    }
}

impl InputDevices for SdlDevices {
    type Controller = GameController;
    type Joystick = Joystick;

    fn num_joysticks(&self) -> Result<u32, NativeError> {
        self.joystick.num_joysticks().map_err(NativeError::Call)
    }

    fn is_game_controller(&self, index: u32) -> bool {
        self.controller.is_game_controller(index)
    }

    fn open_controller(&mut self, index: u32) -> Result<GameController, NativeError> {
        self.controller
            .open(index)
            .map_err(|err| NativeError::DeviceOpen(index, err.to_string()))
    }

    fn open_joystick(&mut self, index: u32) -> Result<Joystick, NativeError> {
        self.joystick
            .open(index)
            .map_err(|err| NativeError::DeviceOpen(index, err.to_string()))
    }

    fn controller_id(&self, controller: &GameController) -> JoystickId {
        controller.instance_id()
    }

    fn joystick_id(&self, joystick: &Joystick) -> JoystickId {
        joystick.instance_id()
    }

    fn controller_name(&self, controller: &GameController) -> String {
        controller.name()
    }

    fn joystick_name(&self, joystick: &Joystick) -> String {
        joystick.name()
    }

    fn device_name(&self, index: u32) -> Option<String> {
        self.joystick.name_for_index(index).ok()
    }
}

// --- Window ---

fn size2i((width, height): (u32, u32)) -> Size2i {
    Size2i::new(
        i32::try_from(width).unwrap_or(i32::MAX),
        i32::try_from(height).unwrap_or(i32::MAX),
    )
}

fn rect2i(rect: sdl2::rect::Rect) -> Rect2i {
    let size = size2i((rect.width(), rect.height()));
    Rect2i::new(rect.x(), rect.y(), size.width, size.height)
}

fn dims(size: Size2i) -> (u32, u32) {
    (size.width.max(0) as u32, size.height.max(0) as u32)
}

fn sdl_bool(value: bool) -> sys::SDL_bool {
    if value {
        sys::SDL_bool::SDL_TRUE
    } else {
        sys::SDL_bool::SDL_FALSE
    }
}

/// SDL window plus the video and mouse services it needs.
pub struct SdlWindow {
    window: Window,
    video: VideoSubsystem,
    mouse: MouseUtil,
}

impl SdlWindow {
    pub fn new(window: Window, video: VideoSubsystem, mouse: MouseUtil) -> Self {
        Self {
            window,
            video,
            mouse,
        }
    }

    pub fn raw(&self) -> &Window {
        &self.window
    }
}

impl NativeWindow for SdlWindow {
    fn set_title(&mut self, title: &str) -> Result<(), NativeError> {
        self.window
            .set_title(title)
            .map_err(|err| NativeError::Call(err.to_string()))
    }

    fn size(&self) -> Size2i {
        size2i(self.window.size())
    }

    fn set_size(&mut self, size: Size2i) -> Result<(), NativeError> {
        let (width, height) = dims(size);
        self.window
            .set_size(width, height)
            .map_err(|err| NativeError::Call(err.to_string()))
    }

    fn size_with_decorations(&self) -> Size2i {
        let size = self.size();
        match self.window.border_size() {
            Ok((top, left, bottom, right)) => Size2i::new(
                size.width + i32::from(left) + i32::from(right),
                size.height + i32::from(top) + i32::from(bottom),
            ),
            Err(_) => size,
        }
    }

    fn position(&self) -> Point2i {
        let (x, y) = self.window.position();
        Point2i::new(x, y)
    }

    fn set_position(&mut self, position: Point2i) {
        self.window.set_position(
            WindowPos::Positioned(position.x),
            WindowPos::Positioned(position.y),
        );
    }

    fn min_size(&self) -> Size2i {
        size2i(self.window.minimum_size())
    }

    fn set_min_size(&mut self, size: Size2i) -> Result<(), NativeError> {
        let (width, height) = dims(size);
        self.window
            .set_minimum_size(width, height)
            .map_err(|err| NativeError::Call(err.to_string()))
    }

    fn max_size(&self) -> Size2i {
        size2i(self.window.maximum_size())
    }

    fn set_max_size(&mut self, size: Size2i) -> Result<(), NativeError> {
        let (width, height) = dims(size);
        self.window
            .set_maximum_size(width, height)
            .map_err(|err| NativeError::Call(err.to_string()))
    }

    fn state(&self) -> NativeWindowState {
        let flags = self.window.window_flags();
        let bits = [
            (SDL_WindowFlags::SDL_WINDOW_FULLSCREEN, NativeWindowState::FULLSCREEN),
            (SDL_WindowFlags::SDL_WINDOW_SHOWN, NativeWindowState::SHOWN),
            (SDL_WindowFlags::SDL_WINDOW_MINIMIZED, NativeWindowState::MINIMIZED),
            (SDL_WindowFlags::SDL_WINDOW_MAXIMIZED, NativeWindowState::MAXIMIZED),
            (SDL_WindowFlags::SDL_WINDOW_INPUT_FOCUS, NativeWindowState::INPUT_FOCUS),
            (SDL_WindowFlags::SDL_WINDOW_RESIZABLE, NativeWindowState::RESIZABLE),
            (SDL_WindowFlags::SDL_WINDOW_BORDERLESS, NativeWindowState::BORDERLESS),
            (SDL_WindowFlags::SDL_WINDOW_ALWAYS_ON_TOP, NativeWindowState::ALWAYS_ON_TOP),
        ];
        bits.into_iter()
            .filter(|(sdl, _)| flags & (*sdl as u32) != 0)
            .fold(NativeWindowState::empty(), |state, (_, bit)| state | bit)
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), NativeError> {
        let mode = if fullscreen {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        self.window.set_fullscreen(mode).map_err(NativeError::Call)
    }

    fn minimize(&mut self) {
        self.window.minimize();
    }

    fn maximize(&mut self) {
        self.window.maximize();
    }

    fn restore(&mut self) {
        self.window.restore();
    }

    fn raise(&mut self) {
        self.window.raise();
    }

    fn flash(&mut self) -> Result<(), NativeError> {
        self.window
            .flash(FlashOperation::UntilFocused)
            .map_err(NativeError::Call)
    }

    fn set_resizable(&mut self, resizable: bool) {
        // SAFETY: the window pointer is valid for the lifetime of `self.window`.
        unsafe { sys::SDL_SetWindowResizable(self.window.raw(), sdl_bool(resizable)) };
    }

    fn set_bordered(&mut self, bordered: bool) {
        self.window.set_bordered(bordered);
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        // SAFETY: the window pointer is valid for the lifetime of `self.window`.
        unsafe { sys::SDL_SetWindowAlwaysOnTop(self.window.raw(), sdl_bool(on_top)) };
    }

    fn display_index(&self) -> Result<i32, NativeError> {
        self.window.display_index().map_err(NativeError::Call)
    }

    fn num_displays(&self) -> Result<i32, NativeError> {
        self.video.num_video_displays().map_err(NativeError::Call)
    }

    fn display_bounds(&self, display: i32) -> Result<Rect2i, NativeError> {
        self.video
            .display_bounds(display)
            .map(rect2i)
            .map_err(NativeError::Call)
    }

    fn display_usable_bounds(&self, display: i32) -> Result<Rect2i, NativeError> {
        self.video
            .display_usable_bounds(display)
            .map(rect2i)
            .map_err(NativeError::Call)
    }

    fn display_dpi(&self, display: i32) -> Result<f32, NativeError> {
        self.video
            .display_dpi(display)
            .map(|(diagonal, _, _)| diagonal)
            .map_err(NativeError::Call)
    }

    fn display_refresh_rate(&self, display: i32) -> Result<f32, NativeError> {
        self.video
            .current_display_mode(display)
            .map(|mode| mode.refresh_rate as f32)
            .map_err(NativeError::Call)
    }

    fn video_driver(&self) -> String {
        self.video.current_video_driver().to_string()
    }

    fn mouse_position(&self) -> Point2i {
        let (mut x, mut y) = (0, 0);
        // SAFETY: both out-pointers reference live stack locals.
        unsafe { sys::SDL_GetMouseState(&mut x, &mut y) };
        Point2i::new(x, y)
    }

    fn set_relative_mouse_mode(&mut self, enabled: bool) {
        self.mouse.set_relative_mouse_mode(enabled);
    }

    fn show_cursor(&mut self, visible: bool) {
        self.mouse.show_cursor(visible);
    }
}

// --- Rendering contexts ---

/// GL swap control for an SDL window. Keeps the GL context alive.
pub struct SdlGlSwap {
    video: VideoSubsystem,
    window: Window,
    _context: GLContext,
}

impl SwapControl for SdlGlSwap {
    fn set_swap_interval(&mut self, interval: i32) -> Result<(), NativeError> {
        let interval = match interval {
            0 => SwapInterval::Immediate,
            1 => SwapInterval::VSync,
            -1 => SwapInterval::LateSwapTearing,
            _ => return Err(NativeError::Unsupported),
        };
        self.video
            .gl_set_swap_interval(interval)
            .map_err(NativeError::Call)
    }

    fn swap_interval(&self) -> i32 {
        match self.video.gl_get_swap_interval() {
            SwapInterval::Immediate => 0,
            SwapInterval::VSync => 1,
            SwapInterval::LateSwapTearing => -1,
        }
    }

    fn swap_window(&mut self) {
        self.window.gl_swap_window();
    }
}

/// Present mode shared between the display server and the Vulkan renderer.
///
/// The display server writes the requested mode; the renderer reads it when it rebuilds
/// its swapchain.
#[derive(Clone, Debug, Default)]
pub struct SharedPresentMode(Rc<Cell<VSyncMode>>);

impl SharedPresentMode {
    pub fn get(&self) -> VSyncMode {
        self.0.get()
    }
}

impl PresentModeControl for SharedPresentMode {
    fn set_present_mode(&mut self, mode: VSyncMode) -> Result<(), NativeError> {
        self.0.set(mode);
        Ok(())
    }

    fn present_mode(&self) -> VSyncMode {
        self.0.get()
    }
}

// --- Audio ---

const AUDIO_S16SYS: u16 = if cfg!(target_endian = "big") {
    0x9010
} else {
    0x8010
};

const ALLOW_FREQUENCY_CHANGE: c_int = 0x1;
const ALLOW_CHANNELS_CHANGE: c_int = 0x4;
const ALLOW_SAMPLES_CHANGE: c_int = 0x8;

unsafe extern "C" fn push_callback(userdata: *mut c_void, stream: *mut u8, len: c_int) {
    // SAFETY: `userdata` is the boxed feed owned by the device, which outlives every callback
    // because the device is closed before the box is dropped. SDL hands out a buffer of `len`
    // bytes aligned for the negotiated 16-bit format.
    let (feed, out) = unsafe {
        let feed = &*(userdata as *const PushFeed);
        let samples = usize::try_from(len).unwrap_or(0) / SAMPLE_BYTES;
        let out = std::slice::from_raw_parts_mut(stream.cast::<i16>(), samples);
        (feed, out)
    };
    feed.fill(out);
}

/// SDL audio subsystem. Requires a live [`SdlPlatform`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SdlAudioBackend;

impl SdlAudioBackend {
    fn open(
        name: Option<&str>,
        desired: &AudioSpec,
        feed: Option<Box<PushFeed>>,
    ) -> Result<SdlAudioDevice, AudioError> {
        let label = name.unwrap_or(DEFAULT_OUTPUT_DEVICE).to_string();
        let open_error = |reason: String| AudioError::DeviceOpen {
            name: label.clone(),
            reason,
        };
        let c_name = name
            .map(CString::new)
            .transpose()
            .map_err(|err| open_error(err.to_string()))?;

        let callback: sys::SDL_AudioCallback = if feed.is_some() {
            Some(push_callback)
        } else {
            None
        };
        let userdata = feed
            .as_deref()
            .map_or(ptr::null_mut(), |feed| feed as *const PushFeed as *mut c_void);
        let wanted = sys::SDL_AudioSpec {
            freq: i32::try_from(desired.mix_rate).unwrap_or(i32::MAX),
            format: AUDIO_S16SYS,
            channels: u8::try_from(desired.channels).unwrap_or(u8::MAX),
            silence: 0,
            samples: desired.latency_frames,
            padding: 0,
            size: 0,
            callback,
            userdata,
        };
        // SAFETY: all-zero is a valid SDL_AudioSpec (no callback, null userdata).
        let mut obtained: sys::SDL_AudioSpec = unsafe { std::mem::zeroed() };

        // SAFETY: `wanted` and `obtained` are live for the call; `c_name` outlives it.
        let id = unsafe {
            sys::SDL_OpenAudioDevice(
                c_name.as_ref().map_or(ptr::null(), |n| n.as_ptr()),
                0,
                &wanted,
                &mut obtained,
                ALLOW_FREQUENCY_CHANGE | ALLOW_CHANNELS_CHANGE | ALLOW_SAMPLES_CHANGE,
            )
        };
        if id == 0 {
            return Err(open_error(sdl2::get_error()));
        }

        let spec = AudioSpec {
            mix_rate: u32::try_from(obtained.freq).unwrap_or(desired.mix_rate),
            channels: u16::from(obtained.channels),
            latency_frames: obtained.samples,
        };
        if spec != *desired {
            warn!(
                "audio device {label:?} negotiated {} Hz, {} channel(s), {} frames",
                spec.mix_rate, spec.channels, spec.latency_frames
            );
        }
        Ok(SdlAudioDevice {
            id,
            spec,
            callback: feed.is_some(),
            _feed: feed,
        })
    }
}

impl AudioBackend for SdlAudioBackend {
    type Device = SdlAudioDevice;

    fn output_device_names(&self) -> Vec<String> {
        // SAFETY: plain queries; the returned names are copied before the next call.
        unsafe {
            let count = sys::SDL_GetNumAudioDevices(0);
            (0..count.max(0))
                .filter_map(|index| {
                    let name = sys::SDL_GetAudioDeviceName(index, 0);
                    (!name.is_null())
                        .then(|| CStr::from_ptr(name).to_string_lossy().into_owned())
                })
                .collect()
        }
    }

    fn open_queue(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<SdlAudioDevice, AudioError> {
        Self::open(name, desired, None)
    }

    fn open_callback(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
        feed: PushFeed,
    ) -> Result<SdlAudioDevice, AudioError> {
        Self::open(name, desired, Some(Box::new(feed)))
    }
}

/// Open SDL audio device. Closed on drop.
pub struct SdlAudioDevice {
    id: sys::SDL_AudioDeviceID,
    spec: AudioSpec,
    callback: bool,
    // Read by the SDL callback through a raw pointer; must drop after the device closes.
    _feed: Option<Box<PushFeed>>,
}

impl AudioDevice for SdlAudioDevice {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn queued_bytes(&self) -> usize {
        if self.callback {
            return 0;
        }
        // SAFETY: `id` is an open device.
        unsafe { sys::SDL_GetQueuedAudioSize(self.id) as usize }
    }

    fn queue(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        let len = u32::try_from(samples.len() * SAMPLE_BYTES)
            .map_err(|_| AudioError::Queue("block too large".into()))?;
        // SAFETY: `samples` is live for the call and SDL copies it.
        let rc = unsafe { sys::SDL_QueueAudio(self.id, samples.as_ptr().cast(), len) };
        if rc != 0 {
            return Err(AudioError::Queue(sdl2::get_error()));
        }
        Ok(())
    }

    fn clear(&mut self) {
        if !self.callback {
            // SAFETY: `id` is an open device.
            unsafe { sys::SDL_ClearQueuedAudio(self.id) };
        }
    }

    fn set_paused(&mut self, paused: bool) {
        // SAFETY: `id` is an open device.
        unsafe { sys::SDL_PauseAudioDevice(self.id, c_int::from(paused)) };
    }
}

impl Drop for SdlAudioDevice {
    fn drop(&mut self) {
        // SAFETY: `id` is open; closing waits for an in-flight callback to return.
        unsafe { sys::SDL_CloseAudioDevice(self.id) };
    }
}

// --- Bootstrap ---

/// Everything SDL-side the host needs: the display server, the event source and the
/// subsystems that must outlive them.
pub struct SdlPlatform {
    pub config: PlatformConfig,
    pub display: DisplayServer<SdlWindow, SdlDevices>,
    pub events: SdlEvents,
    /// Present mode for the Vulkan renderer. `None` on GL.
    pub present_mode: Option<SharedPresentMode>,
    _audio: sdl2::AudioSubsystem,
    _sdl: Sdl,
}

impl SdlPlatform {
    /// Bring up SDL video, input and audio, create the window and the display server.
    pub fn init(config: &PlatformConfig) -> anyhow::Result<Self> {
        let sdl = sdl2::init()
            .map_err(anyhow::Error::msg)
            .context("initializing SDL")?;
        let video = sdl
            .video()
            .map_err(anyhow::Error::msg)
            .context("initializing SDL video")?;
        let joystick = sdl
            .joystick()
            .map_err(anyhow::Error::msg)
            .context("initializing SDL joysticks")?;
        let controller = sdl
            .game_controller()
            .map_err(anyhow::Error::msg)
            .context("initializing SDL game controllers")?;
        let audio = sdl
            .audio()
            .map_err(anyhow::Error::msg)
            .context("initializing SDL audio")?;
        let events = sdl
            .event_pump()
            .map_err(anyhow::Error::msg)
            .context("creating SDL event pump")?;

        let (window, context, present_mode) = create_window(&video, &config.display)?;
        video.text_input().start();

        let window = SdlWindow::new(window, video, sdl.mouse());
        let devices = SdlDevices::new(joystick, controller);
        let display = DisplayServer::new(
            &config.display,
            config.safe_mode,
            window,
            devices,
            context,
        )
        .context("creating display server")?;

        Ok(Self {
            config: config.clone(),
            display,
            events: SdlEvents::new(events),
            present_mode,
            _audio: audio,
            _sdl: sdl,
        })
    }

    /// Audio driver on SDL output, configured from this platform's audio settings.
    ///
    /// Drop (or [`AudioDriver::finish`]) it before dropping the platform.
    pub fn audio_driver(&self, mixer: Box<dyn AudioMixer>) -> AudioDriver<SdlAudioBackend> {
        AudioDriver::new(SdlAudioBackend, mixer, &self.config.audio)
    }
}

type CreatedWindow = (Window, Box<dyn RenderingContext>, Option<SharedPresentMode>);

fn create_window(video: &VideoSubsystem, config: &DisplayConfig) -> anyhow::Result<CreatedWindow> {
    let (width, height) = dims(config.size);

    let vulkan = if config.rendering_driver == RenderingDriver::Vulkan {
        match video
            .window(&config.title, width, height)
            .position_centered()
            .vulkan()
            .build()
        {
            Ok(window) => match window.vulkan_instance_extensions() {
                Ok(_) => Some(window),
                Err(err) => {
                    warn!("Vulkan instance extensions unavailable: {err}");
                    None
                }
            },
            Err(err) => {
                warn!("Vulkan window creation failed: {err}");
                None
            }
        }
    } else {
        None
    };

    let driver = select_rendering_driver(config.rendering_driver, vulkan.is_some());
    if let Some(window) = vulkan {
        let present = SharedPresentMode::default();
        let context = VulkanContext::new(present.clone(), video.current_video_driver());
        info!(
            "Vulkan surface extension: {}",
            context.surface_extension()
        );
        return Ok((window, Box::new(context), Some(present)));
    }

    let gl_attr = video.gl_attr();
    match driver {
        RenderingDriver::OpenGl3 => {
            gl_attr.set_context_profile(GLProfile::Core);
            gl_attr.set_context_version(3, 3);
        }
        _ => {
            gl_attr.set_context_profile(GLProfile::GLES);
            gl_attr.set_context_version(3, 0);
        }
    }
    let window = video
        .window(&config.title, width, height)
        .position_centered()
        .opengl()
        .build()
        .with_context(|| format!("creating {driver} window"))?;
    let gl = window
        .gl_create_context()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("creating {driver} context"))?;
    let swap = SdlGlSwap {
        video: video.clone(),
        window: window.clone(),
        _context: gl,
    };
    Ok((window, Box::new(GlesContext::new(swap, driver)), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdl2::controller::{Axis, Button};
    use sdl2::keyboard::{Keycode as SdlKeycode, Mod, Scancode as SdlScancode};

    #[test]
    fn key_events_keep_native_numbering() {
        let ev = convert_event(Event::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(SdlKeycode::A),
            scancode: Some(SdlScancode::A),
            keymod: Mod::LSHIFTMOD,
            repeat: false,
        });
        assert_eq!(
            ev,
            NativeEvent::Key {
                keycode: Keycode::A,
                scancode: Scancode::A,
                keymod: KeyMod::LSHIFT,
                pressed: true,
                repeat: false,
            }
        );
    }

    #[test]
    fn diagonal_hats_set_two_bits() {
        assert_eq!(hat_state(SdlHat::LeftUp), HatState::LEFT | HatState::UP);
        assert!(hat_state(SdlHat::Centered).is_empty());
    }

    #[test]
    fn mouse_buttons_use_native_ids() {
        assert_eq!(mouse_button_id(MouseButton::Left), 1);
        assert_eq!(mouse_button_id(MouseButton::Middle), 2);
        assert_eq!(mouse_button_id(MouseButton::Right), 3);
        assert_eq!(mouse_button_id(MouseButton::X2), 5);
    }

    #[test]
    fn controller_ids_pass_through() {
        let ev = convert_event(Event::ControllerAxisMotion {
            timestamp: 0,
            which: 3,
            axis: Axis::TriggerRight,
            value: 100,
        });
        assert_eq!(
            ev,
            NativeEvent::ControllerAxisMotion {
                which: 3,
                axis: 5,
                value: 100,
            }
        );
        let ev = convert_event(Event::ControllerButtonUp {
            timestamp: 0,
            which: 3,
            button: Button::DPadRight,
        });
        assert_eq!(
            ev,
            NativeEvent::ControllerButton {
                which: 3,
                button: 14,
                pressed: false,
            }
        );
    }
}
