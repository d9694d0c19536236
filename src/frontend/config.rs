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

//! Host configuration
//!
//! Loaded from a TOML file. Every field has a default, so a missing file or
//! a partial one is fine.
//!
//! ```toml
//! core = "pattern"
//! sound_rate = 48000.0
//! sound_buffer_ms = 100
//! rotation = 0
//!
//! [[input.ports]]
//! port = "port1"
//! device = "gamepad"
//!
//! [input.ports.bindings]
//! ArrowUp = "up"
//! KeyX = "a"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::input::Rotation;

/// Explicit framebuffer size instead of the profile's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceOverride {
    pub width: u32,
    pub height: u32,
}

/// Physical key bindings for one port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBindings {
    /// Port short name
    pub port: String,
    /// Device short name to plug into the port
    pub device: String,
    /// Physical key name -> field setting name
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub ports: Vec<PortBindings>,
}

impl InputConfig {
    /// Keyboard layout for the pattern core's gamepad
    pub fn default_config() -> Self {
        let bindings = [
            ("ArrowUp", "up"),
            ("KeyW", "up"),
            ("ArrowDown", "down"),
            ("KeyS", "down"),
            ("ArrowLeft", "left"),
            ("KeyA", "left"),
            ("ArrowRight", "right"),
            ("KeyD", "right"),
            ("KeyX", "a"),
            ("KeyZ", "b"),
            ("Enter", "start"),
        ]
        .into_iter()
        .map(|(key, field)| (key.to_string(), field.to_string()))
        .collect();

        Self {
            ports: vec![PortBindings {
                port: "port1".to_string(),
                device: "gamepad".to_string(),
                bindings,
            }],
        }
    }

    pub fn port(&self, port: &str) -> Option<&PortBindings> {
        self.ports.iter().find(|p| p.port == port)
    }
}

/// Debug switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log every frame exchange at trace level
    #[serde(default)]
    pub trace_frames: bool,
    /// Log the core's profile as JSON when the host starts
    #[serde(default)]
    pub log_profile: bool,
}

/// Host-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Registered core to load
    pub core: String,
    /// Output sample rate in Hz, 0 disables audio
    pub sound_rate: f64,
    /// Sample buffer length in milliseconds
    pub sound_buffer_ms: u32,
    /// Output volume applied after the core
    pub sound_volume: f64,
    /// Screen rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,
    pub surface: Option<SurfaceOverride>,
    pub input: InputConfig,
    pub debug: DebugConfig,
}

impl HostConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        toml::from_str(&contents).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load from `path`, falling back to defaults if it is missing or broken
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path.as_ref()).unwrap_or_else(|e| {
            log::info!(
                "Using default host config ({}: {})",
                path.as_ref().display(),
                e
            );
            Self::default()
        })
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        std::fs::write(path.as_ref(), contents)
            .map_err(|e| format!("Failed to write config file: {}", e))
    }

    /// Configured rotation, `Deg0` for unsupported angles
    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.rotation).unwrap_or_else(|| {
            log::warn!("Ignoring unsupported rotation {}", self.rotation);
            Rotation::Deg0
        })
    }

    /// Sample buffer capacity in sound frames
    pub fn sound_capacity(&self) -> usize {
        if !self.sound_rate.is_finite() || self.sound_rate <= 0.0 {
            return 0;
        }
        (self.sound_rate * self.sound_buffer_ms as f64 / 1000.0).ceil() as usize
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            core: "pattern".to_string(),
            sound_rate: 48_000.0,
            sound_buffer_ms: 100,
            sound_volume: 1.0,
            rotation: 0,
            surface: None,
            input: InputConfig::default_config(),
            debug: DebugConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.core, "pattern");
        assert_eq!(config.sound_capacity(), 4800);
        assert_eq!(config.rotation(), Rotation::Deg0);
        let port = config.input.port("port1").unwrap();
        assert_eq!(port.bindings.get("KeyX").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_partial_toml() {
        let config: HostConfig = toml::from_str("sound_rate = 0.0\nrotation = 90\n").unwrap();
        assert_eq!(config.sound_capacity(), 0);
        assert_eq!(config.rotation(), Rotation::Deg90);
        assert_eq!(config.core, "pattern");
        assert!(!config.debug.trace_frames);
    }

    #[test]
    fn test_bad_rotation_falls_back() {
        let config = HostConfig {
            rotation: 45,
            ..HostConfig::default()
        };
        assert_eq!(config.rotation(), Rotation::Deg0);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = HostConfig::default();
        config.surface = Some(SurfaceOverride {
            width: 320,
            height: 240,
        });
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: HostConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
