//! Rendering-context strategies.
//!
//! The display server holds one [`RenderingContext`] chosen at construction. Swapchain and
//! surface mechanics stay with the renderer; a context only exposes vsync control and the
//! per-frame present call.

use super::DisplayError;
use crate::abi::VSyncMode;
use crate::native::NativeError;
use log::warn;
use std::fmt;
use std::str::FromStr;

/// GPU API the renderer drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderingDriver {
    #[default]
    Vulkan,
    OpenGl3,
    OpenGl3Es,
}

impl RenderingDriver {
    pub const ALL: [RenderingDriver; 3] = [
        RenderingDriver::Vulkan,
        RenderingDriver::OpenGl3,
        RenderingDriver::OpenGl3Es,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RenderingDriver::Vulkan => "vulkan",
            RenderingDriver::OpenGl3 => "opengl3",
            RenderingDriver::OpenGl3Es => "opengl3_es",
        }
    }

    pub fn is_gl(self) -> bool {
        !matches!(self, RenderingDriver::Vulkan)
    }
}

impl fmt::Display for RenderingDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RenderingDriver {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RenderingDriver::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DisplayError::UnknownDriver(s.to_string()))
    }
}

/// Names of the drivers this platform can create, in preference order.
pub fn rendering_drivers() -> Vec<&'static str> {
    RenderingDriver::ALL.iter().map(|d| d.name()).collect()
}

/// Driver actually used: Vulkan falls back to GLES 3 when its context could not be created.
pub fn select_rendering_driver(requested: RenderingDriver, vulkan_ok: bool) -> RenderingDriver {
    if requested == RenderingDriver::Vulkan && !vulkan_ok {
        warn!(
            "Vulkan initialization failed, falling back to {}",
            RenderingDriver::OpenGl3Es
        );
        return RenderingDriver::OpenGl3Es;
    }
    requested
}

/// Platform surface extension Vulkan needs for a given native video driver.
pub fn vulkan_surface_extension(video_driver: &str) -> &'static str {
    match video_driver.to_ascii_lowercase().as_str() {
        "x11" => "VK_KHR_xlib_surface",
        "wayland" => "VK_KHR_wayland_surface",
        _ => "VK_KHR_display",
    }
}

/// GL swap interval for a vsync mode.
pub fn swap_interval_for(mode: VSyncMode) -> i32 {
    match mode {
        VSyncMode::Disabled => 0,
        VSyncMode::Enabled => 1,
        VSyncMode::Adaptive => -1,
        VSyncMode::Mailbox => -2,
    }
}

/// Vsync mode for a GL swap interval. Unknown intervals read as enabled.
pub fn vsync_for_swap_interval(interval: i32) -> VSyncMode {
    match interval {
        0 => VSyncMode::Disabled,
        -1 => VSyncMode::Adaptive,
        _ => VSyncMode::Enabled,
    }
}

/// Rendering backend as seen by the display server.
pub trait RenderingContext {
    fn driver(&self) -> RenderingDriver;
    fn set_vsync_mode(&mut self, mode: VSyncMode) -> Result<(), NativeError>;
    fn vsync_mode(&self) -> VSyncMode;
    fn swap_buffers(&mut self);
}

/// Native GL swap control.
pub trait SwapControl {
    fn set_swap_interval(&mut self, interval: i32) -> Result<(), NativeError>;
    fn swap_interval(&self) -> i32;
    fn swap_window(&mut self);
}

/// Present-mode control owned by the Vulkan renderer.
pub trait PresentModeControl {
    /// Request a present mode; the renderer applies it on its next swapchain rebuild.
    fn set_present_mode(&mut self, mode: VSyncMode) -> Result<(), NativeError>;
    fn present_mode(&self) -> VSyncMode;
}

/// OpenGL / GLES strategy: vsync is the swap interval, presenting is a buffer swap.
pub struct GlesContext<S: SwapControl> {
    swap: S,
    driver: RenderingDriver,
}

impl<S: SwapControl> GlesContext<S> {
    pub fn new(swap: S, driver: RenderingDriver) -> Self {
        Self { swap, driver }
    }
}

impl<S: SwapControl> RenderingContext for GlesContext<S> {
    fn driver(&self) -> RenderingDriver {
        self.driver
    }

    fn set_vsync_mode(&mut self, mode: VSyncMode) -> Result<(), NativeError> {
        self.swap.set_swap_interval(swap_interval_for(mode))
    }

    fn vsync_mode(&self) -> VSyncMode {
        vsync_for_swap_interval(self.swap.swap_interval())
    }

    fn swap_buffers(&mut self) {
        self.swap.swap_window();
    }
}

/// Vulkan strategy: vsync is the present mode; the renderer presents on its own queue.
pub struct VulkanContext<P: PresentModeControl> {
    present: P,
    surface_extension: &'static str,
}

impl<P: PresentModeControl> VulkanContext<P> {
    pub fn new(present: P, video_driver: &str) -> Self {
        Self {
            present,
            surface_extension: vulkan_surface_extension(video_driver),
        }
    }

    pub fn surface_extension(&self) -> &'static str {
        self.surface_extension
    }
}

impl<P: PresentModeControl> RenderingContext for VulkanContext<P> {
    fn driver(&self) -> RenderingDriver {
        RenderingDriver::Vulkan
    }

    fn set_vsync_mode(&mut self, mode: VSyncMode) -> Result<(), NativeError> {
        self.present.set_present_mode(mode)
    }

    fn vsync_mode(&self) -> VSyncMode {
        self.present.present_mode()
    }

    fn swap_buffers(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_interval_mapping() {
        assert_eq!(swap_interval_for(VSyncMode::Disabled), 0);
        assert_eq!(swap_interval_for(VSyncMode::Enabled), 1);
        assert_eq!(swap_interval_for(VSyncMode::Adaptive), -1);
        assert_eq!(swap_interval_for(VSyncMode::Mailbox), -2);

        assert_eq!(vsync_for_swap_interval(0), VSyncMode::Disabled);
        assert_eq!(vsync_for_swap_interval(1), VSyncMode::Enabled);
        assert_eq!(vsync_for_swap_interval(-1), VSyncMode::Adaptive);
        // Mailbox has no GL equivalent.
        assert_eq!(vsync_for_swap_interval(-2), VSyncMode::Enabled);
    }

    #[test]
    fn driver_names_round_trip_through_from_str() {
        assert_eq!(rendering_drivers(), vec!["vulkan", "opengl3", "opengl3_es"]);
        assert_eq!(
            "OpenGL3_ES".parse::<RenderingDriver>().unwrap(),
            RenderingDriver::OpenGl3Es
        );
        assert!("metal".parse::<RenderingDriver>().is_err());
    }

    #[test]
    fn vulkan_failure_falls_back_to_gles() {
        assert_eq!(
            select_rendering_driver(RenderingDriver::Vulkan, false),
            RenderingDriver::OpenGl3Es
        );
        assert_eq!(
            select_rendering_driver(RenderingDriver::Vulkan, true),
            RenderingDriver::Vulkan
        );
        assert_eq!(
            select_rendering_driver(RenderingDriver::OpenGl3, false),
            RenderingDriver::OpenGl3
        );
    }

    #[test]
    fn surface_extension_by_video_driver() {
        assert_eq!(vulkan_surface_extension("x11"), "VK_KHR_xlib_surface");
        assert_eq!(vulkan_surface_extension("wayland"), "VK_KHR_wayland_surface");
        assert_eq!(vulkan_surface_extension("KMSDRM"), "VK_KHR_display");
    }

    #[derive(Default)]
    struct FakeSwap {
        interval: i32,
        swaps: usize,
    }

    impl SwapControl for FakeSwap {
        fn set_swap_interval(&mut self, interval: i32) -> Result<(), NativeError> {
            if interval == -2 {
                return Err(NativeError::Unsupported);
            }
            self.interval = interval;
            Ok(())
        }

        fn swap_interval(&self) -> i32 {
            self.interval
        }

        fn swap_window(&mut self) {
            self.swaps += 1;
        }
    }

    #[test]
    fn gles_context_drives_swap_interval() {
        let mut ctx = GlesContext::new(FakeSwap::default(), RenderingDriver::OpenGl3Es);
        ctx.set_vsync_mode(VSyncMode::Adaptive).unwrap();
        assert_eq!(ctx.vsync_mode(), VSyncMode::Adaptive);
        assert!(ctx.set_vsync_mode(VSyncMode::Mailbox).is_err());
        assert_eq!(ctx.vsync_mode(), VSyncMode::Adaptive);
        ctx.swap_buffers();
        assert_eq!(ctx.swap.swaps, 1);
    }
}
