//! Display server for sbc-platform.
//!
//! Responsibilities:
//! - Own the single native window: title, geometry, mode, flags, vsync.
//! - Answer screen queries (count, bounds, DPI, usable area, refresh rate).
//! - Own the input pipeline (device registry + event dispatcher) and run it once per tick.
//! - Hold the rendering-context strategy chosen at construction.
//!
//! Notes / constraints:
//! - Geometry getters query the native window live; only the requested size is cached.
//! - The window mode changes only through [`DisplayServer::window_set_mode`].
//! - Screen queries never fail: a native failure is logged and a fixed default returned
//!   (1 screen, 96 DPI, 60 Hz, origin position, the requested size).
//! - With safe mode on, vsync changes are skipped on Vulkan.

mod rendering;


pub use rendering::{
    GlesContext, PresentModeControl, RenderingContext, RenderingDriver, SwapControl,
    VulkanContext, rendering_drivers, select_rendering_driver, swap_interval_for,
    vsync_for_swap_interval, vulkan_surface_extension,
};

use crate::abi::{
    Feature, InputEvent, InputSink, MAIN_WINDOW_ID, MouseMode, Point2i, Rect2i,
    SCREEN_OF_MAIN_WINDOW, Size2i, VSyncMode, WindowFlags, WindowMode,
};
use crate::config::DisplayConfig;
use crate::input::{DeviceRegistry, EventDispatcher, PollOutcome};
use crate::native::{EventSource, InputDevices, NativeError, NativeWindow, NativeWindowState};
use log::{info, warn};
use thiserror::Error;

pub const DEFAULT_DPI: i32 = 96;
pub const DEFAULT_REFRESH_RATE: f32 = 60.0;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error(transparent)]
    Native(#[from] NativeError),
    #[error("unknown rendering driver {0:?}")]
    UnknownDriver(String),
    #[error("failed to create {driver} rendering context: {reason}")]
    Context {
        driver: RenderingDriver,
        reason: String,
    },
}

type InputCallback = Box<dyn FnMut(&InputEvent)>;

/// Display server: one window, its rendering context and its input pipeline.
pub struct DisplayServer<W: NativeWindow, D: InputDevices> {
    window: W,
    context: Box<dyn RenderingContext>,
    registry: DeviceRegistry<D>,
    dispatcher: EventDispatcher,
    requested_size: Size2i,
    mode: WindowMode,
    mouse_mode: MouseMode,
    safe_mode: bool,
    input_callback: Option<InputCallback>,
}

impl<W: NativeWindow, D: InputDevices> DisplayServer<W, D> {
    /// Configure `window` from `config` and take ownership of the input devices.
    pub fn new(
        config: &DisplayConfig,
        safe_mode: bool,
        mut window: W,
        devices: D,
        context: Box<dyn RenderingContext>,
    ) -> Result<Self, DisplayError> {
        window.set_title(&config.title)?;
        window.set_size(config.size)?;

        let registry = DeviceRegistry::new(devices);
        registry.enumerate();

        let mut server = Self {
            window,
            context,
            registry,
            dispatcher: EventDispatcher::new(),
            requested_size: config.size,
            mode: WindowMode::Windowed,
            mouse_mode: MouseMode::Visible,
            safe_mode,
            input_callback: None,
        };
        server.window_set_flag(config.flags, true);
        server.window_set_mode(config.mode);
        server.window_set_vsync_mode(config.vsync);
        info!(
            "display server ready: {}x{} {:?}, {} renderer, video driver {}",
            config.size.width,
            config.size.height,
            server.mode,
            server.context.driver(),
            server.window.video_driver()
        );
        Ok(server)
    }

    pub fn get_name(&self) -> &'static str {
        "sbc"
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        matches!(feature, Feature::Mouse | Feature::Icon | Feature::SwapBuffers)
    }

    pub fn rendering_driver(&self) -> RenderingDriver {
        self.context.driver()
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn registry(&self) -> &DeviceRegistry<D> {
        &self.registry
    }

    // --- Input ---

    /// Drain native input and forward it to `host`.
    pub fn process_events<S, H>(&mut self, source: &mut S, host: &mut H) -> PollOutcome
    where
        S: EventSource + ?Sized,
        H: InputSink + ?Sized,
    {
        self.dispatcher
            .process_events(source, &mut self.registry, &self.window, host)
    }

    pub fn window_set_input_event_callback(&mut self, callback: InputCallback) {
        self.input_callback = Some(callback);
    }

    /// Hand a host-processed event back to the window's callback.
    pub fn dispatch_input_event(&mut self, event: &InputEvent) {
        if let Some(callback) = self.input_callback.as_mut() {
            callback(event);
        }
    }

    pub fn mouse_get_position(&self) -> Point2i {
        self.window.mouse_position()
    }

    pub fn mouse_set_mode(&mut self, mode: MouseMode) {
        self.window
            .set_relative_mouse_mode(mode == MouseMode::Captured);
        self.window
            .show_cursor(matches!(mode, MouseMode::Visible | MouseMode::Confined));
        self.mouse_mode = mode;
    }

    pub fn mouse_get_mode(&self) -> MouseMode {
        self.mouse_mode
    }

    // --- Screens ---

    fn resolve_screen(&self, screen: i32) -> i32 {
        if screen != SCREEN_OF_MAIN_WINDOW {
            return screen;
        }
        self.window.display_index().unwrap_or_else(|err| {
            warn!("could not query the window's display: {err}");
            0
        })
    }

    pub fn get_screen_count(&self) -> i32 {
        self.window.num_displays().unwrap_or_else(|err| {
            warn!("could not count displays: {err}");
            1
        })
    }

    pub fn get_primary_screen(&self) -> i32 {
        0
    }

    pub fn screen_get_position(&self, screen: i32) -> Point2i {
        let screen = self.resolve_screen(screen);
        match self.window.display_bounds(screen) {
            Ok(bounds) => bounds.position,
            Err(err) => {
                warn!("screen {screen} position unavailable: {err}");
                Point2i::default()
            }
        }
    }

    pub fn screen_get_size(&self, screen: i32) -> Size2i {
        let screen = self.resolve_screen(screen);
        match self.window.display_bounds(screen) {
            Ok(bounds) => bounds.size,
            Err(err) => {
                warn!("screen {screen} size unavailable: {err}");
                self.requested_size
            }
        }
    }

    pub fn screen_get_usable_rect(&self, screen: i32) -> Rect2i {
        let screen = self.resolve_screen(screen);
        match self.window.display_usable_bounds(screen) {
            Ok(rect) => rect,
            Err(err) => {
                warn!("screen {screen} usable area unavailable: {err}");
                Rect2i {
                    position: Point2i::default(),
                    size: self.requested_size,
                }
            }
        }
    }

    pub fn screen_get_dpi(&self, screen: i32) -> i32 {
        let screen = self.resolve_screen(screen);
        match self.window.display_dpi(screen) {
            Ok(dpi) if dpi > 0.0 => dpi.round() as i32,
            Ok(_) => DEFAULT_DPI,
            Err(err) => {
                warn!("screen {screen} DPI unavailable: {err}");
                DEFAULT_DPI
            }
        }
    }

    pub fn screen_get_refresh_rate(&self, screen: i32) -> f32 {
        let screen = self.resolve_screen(screen);
        match self.window.display_refresh_rate(screen) {
            Ok(rate) if rate > 0.0 => rate,
            Ok(_) => DEFAULT_REFRESH_RATE,
            Err(err) => {
                warn!("screen {screen} refresh rate unavailable: {err}");
                DEFAULT_REFRESH_RATE
            }
        }
    }

    // --- Window ---

    pub fn get_window_list(&self) -> Vec<i32> {
        vec![MAIN_WINDOW_ID]
    }

    pub fn get_window_at_screen_position(&self, _position: Point2i) -> i32 {
        MAIN_WINDOW_ID
    }

    pub fn window_set_title(&mut self, title: &str) {
        if let Err(err) = self.window.set_title(title) {
            warn!("failed to set window title: {err}");
        }
    }

    pub fn window_set_size(&mut self, size: Size2i) {
        self.requested_size = size;
        if let Err(err) = self.window.set_size(size) {
            warn!("failed to resize window to {}x{}: {err}", size.width, size.height);
        }
    }

    pub fn window_get_size(&self) -> Size2i {
        self.window.size()
    }

    pub fn window_get_size_with_decorations(&self) -> Size2i {
        self.window.size_with_decorations()
    }

    pub fn window_get_position(&self) -> Point2i {
        self.window.position()
    }

    pub fn window_get_position_with_decorations(&self) -> Point2i {
        self.window.position()
    }

    pub fn window_set_position(&mut self, position: Point2i) {
        self.window.set_position(position);
    }

    pub fn window_get_min_size(&self) -> Size2i {
        self.window.min_size()
    }

    pub fn window_set_min_size(&mut self, size: Size2i) {
        if let Err(err) = self.window.set_min_size(size) {
            warn!("failed to set minimum window size: {err}");
        }
    }

    pub fn window_get_max_size(&self) -> Size2i {
        self.window.max_size()
    }

    pub fn window_set_max_size(&mut self, size: Size2i) {
        if let Err(err) = self.window.set_max_size(size) {
            warn!("failed to set maximum window size: {err}");
        }
    }

    pub fn window_get_current_screen(&self) -> i32 {
        self.resolve_screen(SCREEN_OF_MAIN_WINDOW)
    }

    /// Move the window to the origin of `screen`.
    pub fn window_set_current_screen(&mut self, screen: i32) {
        match self.window.display_bounds(screen) {
            Ok(bounds) => self.window.set_position(bounds.position),
            Err(err) => warn!("cannot move window to screen {screen}: {err}"),
        }
    }

    pub fn window_set_mode(&mut self, mode: WindowMode) {
        let result = match mode {
            WindowMode::Fullscreen => self.window.set_fullscreen(true),
            WindowMode::Windowed => {
                if matches!(self.mode, WindowMode::Minimized | WindowMode::Maximized) {
                    self.window.restore();
                }
                self.window.set_fullscreen(false)
            }
            WindowMode::Minimized => {
                self.window.minimize();
                Ok(())
            }
            WindowMode::Maximized => {
                self.window.maximize();
                Ok(())
            }
        };
        match result {
            Ok(()) => self.mode = mode,
            Err(err) => warn!("failed to switch window to {mode:?}: {err}"),
        }
    }

    pub fn window_get_mode(&self) -> WindowMode {
        self.mode
    }

    /// Set or clear every flag in `flags`.
    pub fn window_set_flag(&mut self, flags: WindowFlags, enabled: bool) {
        if flags.contains(WindowFlags::RESIZE_DISABLED) {
            self.window.set_resizable(!enabled);
        }
        if flags.contains(WindowFlags::BORDERLESS) {
            self.window.set_bordered(!enabled);
        }
        if flags.contains(WindowFlags::ALWAYS_ON_TOP) {
            self.window.set_always_on_top(enabled);
        }
    }

    /// Whether every flag in `flags` is currently set on the native window.
    pub fn window_get_flag(&self, flags: WindowFlags) -> bool {
        let state = self.window.state();
        let mut current = WindowFlags::empty();
        current.set(
            WindowFlags::RESIZE_DISABLED,
            !state.contains(NativeWindowState::RESIZABLE),
        );
        current.set(
            WindowFlags::BORDERLESS,
            state.contains(NativeWindowState::BORDERLESS),
        );
        current.set(
            WindowFlags::ALWAYS_ON_TOP,
            state.contains(NativeWindowState::ALWAYS_ON_TOP),
        );
        current.contains(flags)
    }

    pub fn window_is_maximize_allowed(&self) -> bool {
        self.window.state().contains(NativeWindowState::RESIZABLE)
    }

    pub fn window_request_attention(&mut self) {
        if let Err(err) = self.window.flash() {
            warn!("window attention request failed: {err}");
        }
    }

    pub fn window_move_to_foreground(&mut self) {
        self.window.raise();
    }

    pub fn window_is_focused(&self) -> bool {
        self.window.state().contains(NativeWindowState::INPUT_FOCUS)
    }

    pub fn window_can_draw(&self) -> bool {
        !self.window.state().contains(NativeWindowState::MINIMIZED)
    }

    pub fn can_any_window_draw(&self) -> bool {
        self.window_can_draw()
    }

    // --- Presentation ---

    pub fn window_set_vsync_mode(&mut self, mode: VSyncMode) {
        if self.safe_mode && self.context.driver() == RenderingDriver::Vulkan {
            info!("safe mode: leaving Vulkan vsync unchanged (requested {mode:?})");
            return;
        }
        match self.context.set_vsync_mode(mode) {
            Ok(()) => info!("vsync set to {mode:?}"),
            Err(err) => warn!("failed to set vsync to {mode:?}: {err}"),
        }
    }

    pub fn window_get_vsync_mode(&self) -> VSyncMode {
        self.context.vsync_mode()
    }

    pub fn swap_buffers(&mut self) {
        self.context.swap_buffers();
    }
}
