//! In-crate fakes for the native layer and the host.

use crate::abi::{
    InputEvent, InputSink, JoystickId, MouseButtonMask, Point2i, Rect2i, Size2i,
};
use crate::native::{
    EventSource, InputDevices, NativeError, NativeEvent, NativeWindow, NativeWindowState,
};
use std::collections::{BTreeMap, VecDeque};

/// Queue of scripted native occurrences.
#[derive(Default)]
pub struct ScriptedEvents {
    queue: VecDeque<NativeEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = NativeEvent>) -> Self {
        Self {
            queue: events.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl EventSource for ScriptedEvents {
    fn poll_event(&mut self) -> Option<NativeEvent> {
        self.queue.pop_front()
    }
}

/// Host intake that records everything it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<InputEvent>,
    pub flushes: usize,
    pub mask: MouseButtonMask,
}

impl InputSink for RecordingSink {
    fn parse_input_event(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    fn flush_buffered_events(&mut self) {
        self.flushes += 1;
    }

    fn mouse_button_mask(&self) -> MouseButtonMask {
        self.mask
    }
}

struct Slot {
    id: JoystickId,
    mapped: bool,
    name: String,
}

#[derive(Debug)]
pub struct FakeHandle {
    pub id: JoystickId,
    pub name: String,
}

/// Device subsystem with scripted attach slots and an open-handle counter.
#[derive(Default)]
pub struct FakeDevices {
    slots: BTreeMap<u32, Slot>,
    open: usize,
}

impl FakeDevices {
    pub fn attach(&mut self, index: u32, id: JoystickId, mapped: bool, name: &str) {
        self.slots.insert(
            index,
            Slot {
                id,
                mapped,
                name: name.to_string(),
            },
        );
    }

    pub fn set_mapped(&mut self, index: u32, mapped: bool) {
        if let Some(slot) = self.slots.get_mut(&index) {
            slot.mapped = mapped;
        }
    }

    pub fn open_handles(&self) -> usize {
        self.open
    }

    fn open(&mut self, index: u32) -> Result<FakeHandle, NativeError> {
        let slot = self
            .slots
            .get(&index)
            .ok_or_else(|| NativeError::DeviceOpen(index, "no such device".into()))?;
        let handle = FakeHandle {
            id: slot.id,
            name: slot.name.clone(),
        };
        self.open += 1;
        Ok(handle)
    }
}

impl InputDevices for FakeDevices {
    type Controller = FakeHandle;
    type Joystick = FakeHandle;

    fn num_joysticks(&self) -> Result<u32, NativeError> {
        Ok(self.slots.len() as u32)
    }

    fn is_game_controller(&self, index: u32) -> bool {
        self.slots.get(&index).is_some_and(|s| s.mapped)
    }

    fn open_controller(&mut self, index: u32) -> Result<FakeHandle, NativeError> {
        self.open(index)
    }

    fn open_joystick(&mut self, index: u32) -> Result<FakeHandle, NativeError> {
        self.open(index)
    }

    fn controller_id(&self, controller: &FakeHandle) -> JoystickId {
        controller.id
    }

    fn joystick_id(&self, joystick: &FakeHandle) -> JoystickId {
        joystick.id
    }

    fn controller_name(&self, controller: &FakeHandle) -> String {
        controller.name.clone()
    }

    fn joystick_name(&self, joystick: &FakeHandle) -> String {
        joystick.name.clone()
    }

    fn device_name(&self, index: u32) -> Option<String> {
        self.slots.get(&index).map(|s| s.name.clone())
    }

    fn close_controller(&mut self, _controller: FakeHandle) {
        self.open -= 1;
    }

    fn close_joystick(&mut self, _joystick: FakeHandle) {
        self.open -= 1;
    }
}

/// Window with in-memory geometry and one configurable display.
pub struct FakeWindow {
    pub title: String,
    pub size: Size2i,
    pub position: Point2i,
    pub min_size: Size2i,
    pub max_size: Size2i,
    pub state: NativeWindowState,
    pub displays: Vec<Rect2i>,
    pub dpi: f32,
    pub refresh_rate: f32,
    pub fail_display_queries: bool,
    pub video_driver: String,
    pub mouse: Point2i,
    pub relative_mouse: bool,
    pub cursor_visible: bool,
    pub flashes: usize,
}

impl Default for FakeWindow {
    fn default() -> Self {
        Self {
            title: String::new(),
            size: Size2i::new(800, 600),
            position: Point2i::default(),
            min_size: Size2i::default(),
            max_size: Size2i::default(),
            state: NativeWindowState::SHOWN,
            displays: vec![Rect2i::new(0, 0, 1920, 1080)],
            dpi: 110.0,
            refresh_rate: 75.0,
            fail_display_queries: false,
            video_driver: "KMSDRM".into(),
            mouse: Point2i::default(),
            relative_mouse: false,
            cursor_visible: true,
            flashes: 0,
        }
    }
}

impl FakeWindow {
    fn display(&self, display: i32) -> Result<Rect2i, NativeError> {
        if self.fail_display_queries {
            return Err(NativeError::Call("display query failed".into()));
        }
        usize::try_from(display)
            .ok()
            .and_then(|i| self.displays.get(i).copied())
            .ok_or(NativeError::InvalidDisplay(display))
    }
}

impl NativeWindow for FakeWindow {
    fn set_title(&mut self, title: &str) -> Result<(), NativeError> {
        self.title = title.to_string();
        Ok(())
    }

    fn size(&self) -> Size2i {
        self.size
    }

    fn set_size(&mut self, size: Size2i) -> Result<(), NativeError> {
        self.size = size;
        Ok(())
    }

    fn position(&self) -> Point2i {
        self.position
    }

    fn set_position(&mut self, position: Point2i) {
        self.position = position;
    }

    fn min_size(&self) -> Size2i {
        self.min_size
    }

    fn set_min_size(&mut self, size: Size2i) -> Result<(), NativeError> {
        self.min_size = size;
        Ok(())
    }

    fn max_size(&self) -> Size2i {
        self.max_size
    }

    fn set_max_size(&mut self, size: Size2i) -> Result<(), NativeError> {
        self.max_size = size;
        Ok(())
    }

    fn state(&self) -> NativeWindowState {
        self.state
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), NativeError> {
        self.state.set(NativeWindowState::FULLSCREEN, fullscreen);
        Ok(())
    }

    fn minimize(&mut self) {
        self.state.insert(NativeWindowState::MINIMIZED);
    }

    fn maximize(&mut self) {
        self.state.insert(NativeWindowState::MAXIMIZED);
    }

    fn restore(&mut self) {
        self.state
            .remove(NativeWindowState::MINIMIZED | NativeWindowState::MAXIMIZED);
    }

    fn raise(&mut self) {
        self.state.insert(NativeWindowState::INPUT_FOCUS);
    }

    fn flash(&mut self) -> Result<(), NativeError> {
        self.flashes += 1;
        Ok(())
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.state.set(NativeWindowState::RESIZABLE, resizable);
    }

    fn set_bordered(&mut self, bordered: bool) {
        self.state.set(NativeWindowState::BORDERLESS, !bordered);
    }

    fn set_always_on_top(&mut self, on_top: bool) {
        self.state.set(NativeWindowState::ALWAYS_ON_TOP, on_top);
    }

    fn display_index(&self) -> Result<i32, NativeError> {
        if self.fail_display_queries {
            return Err(NativeError::Call("display query failed".into()));
        }
        Ok(0)
    }

    fn num_displays(&self) -> Result<i32, NativeError> {
        if self.fail_display_queries {
            return Err(NativeError::Call("display query failed".into()));
        }
        Ok(self.displays.len() as i32)
    }

    fn display_bounds(&self, display: i32) -> Result<Rect2i, NativeError> {
        self.display(display)
    }

    fn display_usable_bounds(&self, display: i32) -> Result<Rect2i, NativeError> {
        self.display(display)
    }

    fn display_dpi(&self, display: i32) -> Result<f32, NativeError> {
        self.display(display).map(|_| self.dpi)
    }

    fn display_refresh_rate(&self, display: i32) -> Result<f32, NativeError> {
        self.display(display).map(|_| self.refresh_rate)
    }

    fn video_driver(&self) -> String {
        self.video_driver.clone()
    }

    fn mouse_position(&self) -> Point2i {
        self.mouse
    }

    fn set_relative_mouse_mode(&mut self, enabled: bool) {
        self.relative_mouse = enabled;
    }

    fn show_cursor(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }
}
