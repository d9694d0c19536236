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

//! Emulated system profile
//!
//! Static description of a loaded system: its time base, framebuffer
//! geometry, audio layout and identity. Built once when a game is loaded and
//! shared read-only with the host afterwards.

use std::sync::Arc;

use serde::Serialize;

use crate::core::input::Rotation;
use crate::core::media::MediaTopology;

/// Fixed-point scale of [`SystemProfile::fps`] (65536 * 256)
pub const FPS_FIXED_ONE: f64 = 16_777_216.0;

/// Master clock rate as a 32.32 fixed-point number of units per second
///
/// Cycle counts reported through the frame exchange are in these units.
///
/// # Example
///
/// ```
/// use corelink::core::frame::MasterClock;
///
/// let clock = MasterClock::from_hz(1_000_000.0);
/// assert_eq!(clock.hz(), 1_000_000.0);
/// assert_eq!(clock.cycles_to_seconds(500_000), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MasterClock(pub i64);

impl MasterClock {
    pub fn from_hz(hz: f64) -> Self {
        MasterClock((hz * (1u64 << 32) as f64) as i64)
    }

    /// Clock rate in Hz
    pub fn hz(self) -> f64 {
        self.0 as f64 / (1u64 << 32) as f64
    }

    pub fn cycles_to_seconds(self, cycles: i64) -> f64 {
        let hz = self.hz();
        if hz == 0.0 {
            0.0
        } else {
            cycles as f64 / hz
        }
    }

    pub fn seconds_to_cycles(self, seconds: f64) -> i64 {
        (seconds * self.hz()).round() as i64
    }
}

/// Broadcast video standard of the emulated machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum VideoSystem {
    #[default]
    None,
    Pal,
    PalM,
    Ntsc,
    Secam,
}

/// What kind of content was loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum GameMedium {
    #[default]
    Cart,
    Arcade,
    Disk,
    CdRom,
    /// Music player formats (NSF, GSF, ...)
    Player,
}

/// A setting the system declares; interpreted by an external settings layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingDescriptor {
    pub name: String,
    pub description: String,
    pub default_value: String,
}

impl SettingDescriptor {
    pub fn new(name: &str, description: &str, default_value: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            default_value: default_value.to_string(),
        }
    }
}

/// Everything the host needs to know about a loaded system
#[derive(Debug, Clone, Serialize)]
pub struct SystemProfile {
    /// Short system name, e.g. "pattern"
    pub short_name: String,
    pub full_name: String,

    pub master_clock: MasterClock,
    /// Frames per second * 65536 * 256; 0 if unknown
    pub fps: u32,
    /// Resolution may change between frames
    pub multires: bool,

    pub lcm_width: u32,
    pub lcm_height: u32,
    pub nominal_width: u32,
    pub nominal_height: u32,
    /// Required surface pitch
    pub fb_width: u32,
    /// Minimum surface height
    pub fb_height: u32,

    pub sound_channels: u32,
    /// Preferred output rate, 0 if the host should choose
    pub sound_rate_hint: f64,
    pub rotated: Rotation,
    pub video_system: VideoSystem,
    pub game_medium: GameMedium,

    /// Content hash; `None` means not computed
    pub md5: Option<[u8; 16]>,
    /// Hash shared by every disc of a multi-disc set
    pub game_set_md5: Option<[u8; 16]>,
    /// Hash used to name save states
    pub state_md5: Option<[u8; 16]>,

    /// Device short name the game wants per port; `None` = don't care
    pub desired_input: Vec<Option<String>>,

    pub mouse_scale_x: f32,
    pub mouse_scale_y: f32,
    pub mouse_offset_x: f32,
    pub mouse_offset_y: f32,

    pub settings: Vec<SettingDescriptor>,
    /// Special cart mapper hint, if any
    pub cart_special: Option<String>,

    /// Removable media, `None` for systems without drives
    pub topology: Option<Arc<MediaTopology>>,
}

impl SystemProfile {
    /// Frame rate as a float
    pub fn frames_per_second(&self) -> f64 {
        self.fps as f64 / FPS_FIXED_ONE
    }

    /// Convert a float frame rate to the fixed-point representation
    pub fn fps_to_fixed(fps: f64) -> u32 {
        (fps * FPS_FIXED_ONE).round() as u32
    }

    /// Identity hash for save-state naming, preferring the dedicated state hash
    pub fn state_identity(&self) -> Option<[u8; 16]> {
        self.state_md5.or(self.md5)
    }

    /// Lowercase hex rendering of an identity hash
    pub fn hash_hex(hash: &[u8; 16]) -> String {
        hash.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for SystemProfile {
    fn default() -> Self {
        Self {
            short_name: String::new(),
            full_name: String::new(),
            master_clock: MasterClock::from_hz(1.0),
            fps: 0,
            multires: false,
            lcm_width: 0,
            lcm_height: 0,
            nominal_width: 0,
            nominal_height: 0,
            fb_width: 0,
            fb_height: 0,
            sound_channels: 2,
            sound_rate_hint: 0.0,
            rotated: Rotation::Deg0,
            video_system: VideoSystem::None,
            game_medium: GameMedium::Cart,
            md5: None,
            game_set_md5: None,
            state_md5: None,
            desired_input: Vec::new(),
            mouse_scale_x: 1.0,
            mouse_scale_y: 1.0,
            mouse_offset_x: 0.0,
            mouse_offset_y: 0.0,
            settings: Vec::new(),
            cart_special: None,
            topology: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_clock_fixed_point() {
        let clock = MasterClock::from_hz(3_579_545.0);
        assert_eq!(clock.0, 3_579_545i64 << 32);
        assert_eq!(clock.hz(), 3_579_545.0);
        assert_eq!(clock.seconds_to_cycles(1.0), 3_579_545);
    }

    #[test]
    fn test_fractional_clock() {
        let clock = MasterClock::from_hz(0.5);
        assert_eq!(clock.0, 1i64 << 31);
        assert_eq!(clock.cycles_to_seconds(1), 2.0);
    }

    #[test]
    fn test_fixed_fps() {
        let fixed = SystemProfile::fps_to_fixed(60.0);
        assert_eq!(fixed, 60 * 65536 * 256);
        let profile = SystemProfile {
            fps: fixed,
            ..SystemProfile::default()
        };
        assert_eq!(profile.frames_per_second(), 60.0);
    }

    #[test]
    fn test_state_identity_prefers_state_hash() {
        let mut profile = SystemProfile {
            md5: Some([1; 16]),
            ..SystemProfile::default()
        };
        assert_eq!(profile.state_identity(), Some([1; 16]));
        profile.state_md5 = Some([2; 16]);
        assert_eq!(profile.state_identity(), Some([2; 16]));
        assert_eq!(
            SystemProfile::hash_hex(&[0xAB; 16]),
            "abababababababababababababababab"
        );
    }

    #[test]
    fn test_profile_json_export() {
        let profile = SystemProfile {
            short_name: "test".to_string(),
            ..SystemProfile::default()
        };
        let json = profile.to_json().unwrap();
        assert!(json.contains("\"short_name\": \"test\""));
        assert!(json.contains("\"topology\": null"));
    }
}
