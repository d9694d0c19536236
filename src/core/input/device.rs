// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Device and port descriptors
//!
//! A port lists the devices that can be plugged into it. Descriptor sets are
//! shared through `Arc` so several devices (or several systems) can point at
//! the same immutable layout without back-references.

use std::collections::HashSet;
use std::sync::Arc;

use bitflags::bitflags;
use serde::Serialize;

use super::layout::DeviceInputDescriptorSet;
use crate::core::error::ConfigurationError;

bitflags! {
    /// Per-device flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct DeviceFlags: u32 {
        /// Device is a keyboard; hosts may route raw keys to it
        const KEYBOARD = 1 << 0;
    }
}

/// One kind of device that can occupy a port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub short_name: String,
    pub full_name: String,
    pub description: String,
    pub input: Arc<DeviceInputDescriptorSet>,
    pub flags: DeviceFlags,
}

impl DeviceDescriptor {
    pub fn new(
        short_name: &str,
        full_name: &str,
        description: &str,
        input: Arc<DeviceInputDescriptorSet>,
    ) -> Self {
        Self {
            short_name: short_name.to_string(),
            full_name: full_name.to_string(),
            description: description.to_string(),
            input,
            flags: DeviceFlags::empty(),
        }
    }

    /// Placeholder for an empty port
    pub fn none() -> Self {
        Self::new(
            "none",
            "none",
            "",
            Arc::new(DeviceInputDescriptorSet::empty()),
        )
    }

    pub fn with_flags(mut self, flags: DeviceFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn is_keyboard(&self) -> bool {
        self.flags.contains(DeviceFlags::KEYBOARD)
    }
}

/// One physical input port and the devices it accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortDescriptor {
    short_name: String,
    full_name: String,
    devices: Vec<DeviceDescriptor>,
    default_device: String,
}

impl PortDescriptor {
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateDevice`] for repeated device names and
    /// [`ConfigurationError::UnknownDefaultDevice`] if `default_device` is not
    /// among `devices`.
    pub fn new(
        short_name: &str,
        full_name: &str,
        devices: Vec<DeviceDescriptor>,
        default_device: &str,
    ) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for device in &devices {
            if !seen.insert(device.short_name.as_str()) {
                return Err(ConfigurationError::DuplicateDevice {
                    port: short_name.to_string(),
                    name: device.short_name.clone(),
                });
            }
        }
        if !seen.contains(default_device) {
            return Err(ConfigurationError::UnknownDefaultDevice {
                port: short_name.to_string(),
                device: default_device.to_string(),
            });
        }

        Ok(Self {
            short_name: short_name.to_string(),
            full_name: full_name.to_string(),
            devices,
            default_device: default_device.to_string(),
        })
    }

    #[inline]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[inline]
    pub fn devices(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    #[inline]
    pub fn default_device_name(&self) -> &str {
        &self.default_device
    }

    /// Device with the given short name
    pub fn device(&self, short_name: &str) -> Option<&DeviceDescriptor> {
        self.devices.iter().find(|d| d.short_name == short_name)
    }

    /// The default device (always present after validation)
    pub fn default_device(&self) -> &DeviceDescriptor {
        self.device(&self.default_device)
            .unwrap_or(&self.devices[0])
    }
}

/// All input ports of one emulated system
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InputInfo {
    pub ports: Vec<PortDescriptor>,
}

impl InputInfo {
    pub fn new(ports: Vec<PortDescriptor>) -> Self {
        Self { ports }
    }

    pub fn port(&self, short_name: &str) -> Option<&PortDescriptor> {
        self.ports.iter().find(|p| p.short_name == short_name)
    }

    /// Export as pretty JSON for an external configuration UI
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::field::InputFieldDescriptor;

    fn gamepad() -> DeviceDescriptor {
        let set = DeviceInputDescriptorSet::new(vec![
            InputFieldDescriptor::button("a", "A", Some(0)),
            InputFieldDescriptor::button("b", "B", Some(1)),
        ])
        .unwrap();
        DeviceDescriptor::new("gamepad", "Gamepad", "Standard pad", Arc::new(set))
    }

    #[test]
    fn test_port_default_device() {
        let port = PortDescriptor::new(
            "port1",
            "Port 1",
            vec![DeviceDescriptor::none(), gamepad()],
            "gamepad",
        )
        .unwrap();
        assert_eq!(port.default_device().short_name, "gamepad");
        assert_eq!(port.device("none").unwrap().input.byte_size(), 0);
    }

    #[test]
    fn test_unknown_default_rejected() {
        let result = PortDescriptor::new("port1", "Port 1", vec![gamepad()], "mouse");
        assert_eq!(
            result,
            Err(ConfigurationError::UnknownDefaultDevice {
                port: "port1".to_string(),
                device: "mouse".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_device_rejected() {
        let result = PortDescriptor::new("port1", "Port 1", vec![gamepad(), gamepad()], "gamepad");
        assert!(matches!(
            result,
            Err(ConfigurationError::DuplicateDevice { .. })
        ));
    }

    #[test]
    fn test_devices_share_descriptor_set() {
        let pad = gamepad();
        let twin = DeviceDescriptor::new("twin", "Twin", "", pad.input.clone());
        assert!(Arc::ptr_eq(&pad.input, &twin.input));
    }

    #[test]
    fn test_keyboard_flag() {
        let kb = DeviceDescriptor::new(
            "keyboard",
            "Keyboard",
            "",
            Arc::new(DeviceInputDescriptorSet::empty()),
        )
        .with_flags(DeviceFlags::KEYBOARD);
        assert!(kb.is_keyboard());
        assert!(!gamepad().is_keyboard());
    }

    #[test]
    fn test_json_export() {
        let info = InputInfo::new(vec![PortDescriptor::new(
            "port1",
            "Port 1",
            vec![gamepad()],
            "gamepad",
        )
        .unwrap()]);
        let json = info.to_json().unwrap();
        assert!(json.contains("\"short_name\": \"port1\""));
        assert!(json.contains("\"setting_name\": \"a\""));
    }
}
