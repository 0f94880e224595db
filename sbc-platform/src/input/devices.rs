//! Attached input-device bookkeeping.
//!
//! Devices live in exactly one of two classes:
//! - **controllers**: devices with a game-controller mapping, reported through the
//!   controller event family;
//! - **joysticks**: everything else, reported through the raw joystick event family.
//!
//! The key sets of the two maps are the identity sets, so they cannot drift from the
//! handles they describe.

use crate::abi::JoystickId;
use crate::native::InputDevices;
use log::{info, warn};
use std::collections::BTreeMap;

/// Which class a device was registered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceClass {
    Controller,
    Joystick,
}

/// Owner of the native device subsystem and every open device handle.
pub struct DeviceRegistry<D: InputDevices> {
    devices: D,
    controllers: BTreeMap<JoystickId, D::Controller>,
    joysticks: BTreeMap<JoystickId, D::Joystick>,
}

impl<D: InputDevices> DeviceRegistry<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            controllers: BTreeMap::new(),
            joysticks: BTreeMap::new(),
        }
    }

    /// Log every device present at startup.
    ///
    /// Handles are opened later, when the native layer reports the attach.
    pub fn enumerate(&self) -> usize {
        let count = match self.devices.num_joysticks() {
            Ok(count) => count,
            Err(err) => {
                warn!("could not count joysticks: {err}");
                0
            }
        };
        info!("{count} joystick(s) connected");
        for index in 0..count {
            let name = self
                .devices
                .device_name(index)
                .unwrap_or_else(|| "<unnamed>".to_string());
            if self.devices.is_game_controller(index) {
                info!("  [{index}] controller: {name}");
            } else {
                info!("  [{index}] joystick: {name}");
            }
        }
        count as usize
    }

    /// Classify, open and register the device at `index`.
    ///
    /// A repeated attach of an already-registered identity closes the duplicate handle and
    /// leaves bookkeeping unchanged. Returns the identity and class on success.
    pub fn on_device_added(&mut self, index: u32) -> Option<(JoystickId, DeviceClass)> {
        if self.devices.is_game_controller(index) {
            let controller = match self.devices.open_controller(index) {
                Ok(c) => c,
                Err(err) => {
                    warn!("failed to open controller at index {index}: {err}");
                    return None;
                }
            };
            let id = self.devices.controller_id(&controller);
            if self.controllers.contains_key(&id) {
                self.devices.close_controller(controller);
                return Some((id, DeviceClass::Controller));
            }
            if let Some(stale) = self.joysticks.remove(&id) {
                self.devices.close_joystick(stale);
            }
            info!(
                "controller attached: {} (id {id})",
                self.devices.controller_name(&controller)
            );
            self.controllers.insert(id, controller);
            Some((id, DeviceClass::Controller))
        } else {
            let joystick = match self.devices.open_joystick(index) {
                Ok(j) => j,
                Err(err) => {
                    warn!("failed to open joystick at index {index}: {err}");
                    return None;
                }
            };
            let id = self.devices.joystick_id(&joystick);
            if self.joysticks.contains_key(&id) {
                self.devices.close_joystick(joystick);
                return Some((id, DeviceClass::Joystick));
            }
            if let Some(stale) = self.controllers.remove(&id) {
                self.devices.close_controller(stale);
            }
            info!(
                "joystick attached: {} (id {id})",
                self.devices.joystick_name(&joystick)
            );
            self.joysticks.insert(id, joystick);
            Some((id, DeviceClass::Joystick))
        }
    }

    /// Close and forget `id`. Unknown identities are ignored.
    pub fn on_device_removed(&mut self, id: JoystickId) -> Option<DeviceClass> {
        if let Some(controller) = self.controllers.remove(&id) {
            self.devices.close_controller(controller);
            info!("controller detached (id {id})");
            return Some(DeviceClass::Controller);
        }
        if let Some(joystick) = self.joysticks.remove(&id) {
            self.devices.close_joystick(joystick);
            info!("joystick detached (id {id})");
            return Some(DeviceClass::Joystick);
        }
        None
    }

    pub fn is_controller(&self, id: JoystickId) -> bool {
        self.controllers.contains_key(&id)
    }

    pub fn is_joystick(&self, id: JoystickId) -> bool {
        self.joysticks.contains_key(&id)
    }

    pub fn controller_ids(&self) -> impl Iterator<Item = JoystickId> + '_ {
        self.controllers.keys().copied()
    }

    pub fn joystick_ids(&self) -> impl Iterator<Item = JoystickId> + '_ {
        self.joysticks.keys().copied()
    }

    /// Name of a registered device.
    pub fn device_name(&self, id: JoystickId) -> Option<String> {
        if let Some(c) = self.controllers.get(&id) {
            return Some(self.devices.controller_name(c));
        }
        self.joysticks
            .get(&id)
            .map(|j| self.devices.joystick_name(j))
    }

    /// Close every open handle.
    pub fn close_all(&mut self) {
        for (_, controller) in std::mem::take(&mut self.controllers) {
            self.devices.close_controller(controller);
        }
        for (_, joystick) in std::mem::take(&mut self.joysticks) {
            self.devices.close_joystick(joystick);
        }
    }

    pub fn backend(&self) -> &D {
        &self.devices
    }
}

impl<D: InputDevices> Drop for DeviceRegistry<D> {
    fn drop(&mut self) {
        self.close_all();
    }
}
