//! Operating-system shim.
//!
//! Responsibilities:
//! - Identify the platform to the host ("sbc" / "linuxbsd") and answer feature probes.
//! - Resolve XDG config / data / cache directories.
//! - Own the host main loop and the quit flag, and drive the per-tick loop.
//! - Install the process logger.
//!
//! Notes / constraints:
//! - Environment lookups go through an injectable function so path resolution is testable
//!   without touching the process environment.
//! - A relative `XDG_*_HOME` is ignored (with one warning per variable per shim instance).

use crate::abi::{InputSink, MainLoop};
use crate::display::DisplayServer;
use crate::native::{EventSource, InputDevices, NativeWindow};
use anyhow::Context;
use log::{info, warn};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

/// Install `env_logger` with an `info` default, overridable through `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs a logger.
pub fn init_logging() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}

/// Session object for the OS layer.
pub struct OsSbc {
    main_loop: Option<Box<dyn MainLoop>>,
    quit_requested: bool,
    env: EnvLookup,
    warned: RefCell<HashSet<&'static str>>,
}

impl Default for OsSbc {
    fn default() -> Self {
        Self::new()
    }
}

impl OsSbc {
    /// Shim reading the process environment.
    pub fn new() -> Self {
        Self::with_env(|key| std::env::var(key).ok())
    }

    /// Shim reading `env` instead of the process environment.
    pub fn with_env(env: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            main_loop: None,
            quit_requested: false,
            env: Box::new(env),
            warned: RefCell::new(HashSet::new()),
        }
    }

    /// Install logging and verify the directories the host will write to can be resolved.
    pub fn initialize(&self) -> anyhow::Result<()> {
        init_logging();
        let config = self.get_config_path();
        std::fs::create_dir_all(&config)
            .with_context(|| format!("creating config directory {}", config.display()))?;
        info!("OS layer initialized (config: {})", config.display());
        Ok(())
    }

    pub fn get_name(&self) -> &'static str {
        "sbc"
    }

    pub fn get_identifier(&self) -> &'static str {
        "linuxbsd"
    }

    pub fn check_feature_support(&self, feature: &str) -> bool {
        matches!(feature, "pc" | "s3tc")
    }

    // --- Main loop ---

    pub fn set_main_loop(&mut self, main_loop: Box<dyn MainLoop>) {
        self.main_loop = Some(main_loop);
    }

    pub fn get_main_loop(&mut self) -> Option<&mut (dyn MainLoop + 'static)> {
        self.main_loop.as_deref_mut()
    }

    pub fn delete_main_loop(&mut self) {
        self.main_loop = None;
    }

    pub fn set_quit_requested(&mut self, quit: bool) {
        self.quit_requested = quit;
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Run the main loop until quit is requested or an iteration asks to stop.
    pub fn run<W, D, S, H>(&mut self, display: &mut DisplayServer<W, D>, source: &mut S, host: &mut H)
    where
        W: NativeWindow,
        D: InputDevices,
        S: EventSource + ?Sized,
        H: InputSink + ?Sized,
    {
        self.run_with(display, source, host, || {});
    }

    /// [`OsSbc::run`] with a hook invoked once per tick, after input and before the iteration.
    pub fn run_with<W, D, S, H, F>(
        &mut self,
        display: &mut DisplayServer<W, D>,
        source: &mut S,
        host: &mut H,
        mut per_tick: F,
    ) where
        W: NativeWindow,
        D: InputDevices,
        S: EventSource + ?Sized,
        H: InputSink + ?Sized,
        F: FnMut(),
    {
        let Some(main_loop) = self.main_loop.as_mut() else {
            warn!("run() called without a main loop");
            return;
        };

        main_loop.initialize();
        while !self.quit_requested {
            if display.process_events(source, host).quit_requested {
                self.quit_requested = true;
                break;
            }
            per_tick();
            if main_loop.iteration() {
                break;
            }
        }
        main_loop.finalize();
    }

    /// Finalize and drop the main loop.
    pub fn finalize(&mut self) {
        self.delete_main_loop();
        info!("OS layer finalized");
    }

    // --- Paths ---

    /// Absolute `var`, or `None` (warning once) when it is unset or relative.
    fn xdg_dir(&self, var: &'static str) -> Option<PathBuf> {
        let value = (self.env)(var)?;
        let path = PathBuf::from(value);
        if path.is_absolute() {
            return Some(path);
        }
        if self.warned.borrow_mut().insert(var) {
            warn!("{var} is not an absolute path, ignoring it");
        }
        None
    }

    fn home(&self) -> Option<PathBuf> {
        (self.env)("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
    }

    pub fn get_config_path(&self) -> PathBuf {
        if let Some(dir) = self.xdg_dir("XDG_CONFIG_HOME") {
            return dir;
        }
        match self.home() {
            Some(home) => home.join(".config"),
            None => PathBuf::from("."),
        }
    }

    pub fn get_data_path(&self) -> PathBuf {
        if let Some(dir) = self.xdg_dir("XDG_DATA_HOME") {
            return dir;
        }
        match self.home() {
            Some(home) => home.join(".local").join("share"),
            None => self.get_config_path(),
        }
    }

    pub fn get_cache_path(&self) -> PathBuf {
        if let Some(dir) = self.xdg_dir("XDG_CACHE_HOME") {
            return dir;
        }
        match self.home() {
            Some(home) => home.join(".cache"),
            None => self.get_config_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::display::{RenderingContext, RenderingDriver};
    use crate::native::{NativeError, NativeEvent};
    use crate::test_support::{FakeDevices, FakeWindow, RecordingSink, ScriptedEvents};
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::cell::Cell;

    fn shim(pairs: &[(&str, &str)]) -> OsSbc {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        OsSbc::with_env(move |key| map.get(key).cloned())
    }

    #[test]
    fn identifiers() {
        let os = shim(&[]);
        assert_eq!(os.get_name(), "sbc");
        assert_eq!(os.get_identifier(), "linuxbsd");
        assert!(os.check_feature_support("pc"));
        assert!(os.check_feature_support("s3tc"));
        assert!(!os.check_feature_support("mobile"));
    }

    #[test]
    fn absolute_xdg_dirs_win() {
        let os = shim(&[
            ("HOME", "/home/pi"),
            ("XDG_CONFIG_HOME", "/etc/xdg-pi"),
            ("XDG_DATA_HOME", "/srv/data"),
            ("XDG_CACHE_HOME", "/tmp/cache"),
        ]);
        assert_eq!(os.get_config_path(), PathBuf::from("/etc/xdg-pi"));
        assert_eq!(os.get_data_path(), PathBuf::from("/srv/data"));
        assert_eq!(os.get_cache_path(), PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn relative_xdg_dirs_fall_back_to_home() {
        let os = shim(&[("HOME", "/home/pi"), ("XDG_CONFIG_HOME", "cfg")]);
        assert_eq!(os.get_config_path(), PathBuf::from("/home/pi/.config"));
        assert_eq!(os.get_config_path(), PathBuf::from("/home/pi/.config"));
        assert_eq!(os.warned.borrow().len(), 1);
        assert_eq!(os.get_data_path(), PathBuf::from("/home/pi/.local/share"));
        assert_eq!(os.get_cache_path(), PathBuf::from("/home/pi/.cache"));
    }

    #[test]
    fn no_home_falls_back_to_current_dir() {
        let os = shim(&[]);
        assert_eq!(os.get_config_path(), PathBuf::from("."));
        assert_eq!(os.get_data_path(), PathBuf::from("."));
        assert_eq!(os.get_cache_path(), PathBuf::from("."));

        let os = os_with_config_only();
        assert_eq!(os.get_data_path(), PathBuf::from("/cfg"));
    }

    fn os_with_config_only() -> OsSbc {
        shim(&[("XDG_CONFIG_HOME", "/cfg")])
    }

    #[test]
    fn initialize_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("conf");
        let config_str = config.to_string_lossy().into_owned();
        let os = OsSbc::with_env(move |key| (key == "XDG_CONFIG_HOME").then(|| config_str.clone()));
        os.initialize().unwrap();
        assert!(config.is_dir());
    }

    struct CountingLoop {
        ticks: Rc<Cell<u32>>,
        stop_after: u32,
        finalized: Rc<Cell<bool>>,
    }

    impl MainLoop for CountingLoop {
        fn initialize(&mut self) {}

        fn iteration(&mut self) -> bool {
            self.ticks.set(self.ticks.get() + 1);
            self.ticks.get() >= self.stop_after
        }

        fn finalize(&mut self) {
            self.finalized.set(true);
        }
    }

    struct NullContext;

    impl RenderingContext for NullContext {
        fn driver(&self) -> RenderingDriver {
            RenderingDriver::OpenGl3Es
        }

        fn set_vsync_mode(&mut self, _mode: crate::abi::VSyncMode) -> Result<(), NativeError> {
            Ok(())
        }

        fn vsync_mode(&self) -> crate::abi::VSyncMode {
            crate::abi::VSyncMode::Enabled
        }

        fn swap_buffers(&mut self) {}
    }

    fn display() -> DisplayServer<FakeWindow, FakeDevices> {
        DisplayServer::new(
            &DisplayConfig::default(),
            false,
            FakeWindow::default(),
            FakeDevices::default(),
            Box::new(NullContext),
        )
        .unwrap()
    }

    fn counting_loop(stop_after: u32) -> (Box<dyn MainLoop>, Rc<Cell<u32>>, Rc<Cell<bool>>) {
        let ticks = Rc::new(Cell::new(0));
        let finalized = Rc::new(Cell::new(false));
        let main_loop = CountingLoop {
            ticks: Rc::clone(&ticks),
            stop_after,
            finalized: Rc::clone(&finalized),
        };
        (Box::new(main_loop), ticks, finalized)
    }

    #[test]
    fn run_stops_when_iteration_asks() {
        let mut os = shim(&[]);
        let (main_loop, ticks, finalized) = counting_loop(3);
        os.set_main_loop(main_loop);
        let mut ds = display();
        let mut sink = RecordingSink::default();
        let mut source = ScriptedEvents::default();
        let mut hook_calls = 0;
        os.run_with(&mut ds, &mut source, &mut sink, || hook_calls += 1);
        assert_eq!(ticks.get(), 3);
        assert_eq!(hook_calls, 3);
        assert_eq!(sink.flushes, 3);
        assert!(finalized.get());
        assert!(!os.is_quit_requested());
    }

    #[test]
    fn native_quit_ends_the_loop() {
        let mut os = shim(&[]);
        let (main_loop, ticks, finalized) = counting_loop(100);
        os.set_main_loop(main_loop);
        let mut ds = display();
        let mut sink = RecordingSink::default();
        let mut source = ScriptedEvents::new([NativeEvent::Quit]);
        os.run(&mut ds, &mut source, &mut sink);
        assert!(os.is_quit_requested());
        assert_eq!(ticks.get(), 0);
        assert!(finalized.get());
    }

    #[test]
    fn preset_quit_skips_iterations() {
        let mut os = shim(&[]);
        let (main_loop, ticks, _) = counting_loop(100);
        os.set_main_loop(main_loop);
        os.set_quit_requested(true);
        let mut ds = display();
        os.run(&mut ds, &mut ScriptedEvents::default(), &mut RecordingSink::default());
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn main_loop_ownership() {
        let mut os = shim(&[]);
        assert!(os.get_main_loop().is_none());
        let (main_loop, _, _) = counting_loop(1);
        os.set_main_loop(main_loop);
        assert!(os.get_main_loop().is_some());
        os.finalize();
        assert!(os.get_main_loop().is_none());
    }
}
