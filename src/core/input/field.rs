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

//! Input field descriptors
//!
//! A field is one logical input of a controller: a button, a multi-position
//! switch, an axis, a rumble output and so on. The kind determines how many
//! bits the field occupies in the packed per-frame state.

use bitflags::bitflags;
use serde::Serialize;

/// Bit width used by axis, analog, byte-special and rumble fields
pub const BYTE_FIELD_BITS: u8 = 8;

bitflags! {
    /// Per-field flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    pub struct FieldFlags: u8 {
        /// Analog data that may need scaling toward a square logical range
        /// (emulated analog sticks)
        const SQUARE_RANGE = 0x01;
        /// Undocumented/auxiliary setting, hidden from normal configuration
        const AUX_UNDOC = 0x80;
    }
}

/// Screen rotation used for remapping directional inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Rotation angle in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Slot in a field's rotation reference table (`None` for 0 degrees)
    pub fn slot(self) -> Option<usize> {
        match self {
            Rotation::Deg0 => None,
            Rotation::Deg90 => Some(0),
            Rotation::Deg180 => Some(1),
            Rotation::Deg270 => Some(2),
        }
    }

    /// Parse from degrees (0, 90, 180, 270)
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// One named position of a switch field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchPosition {
    pub setting_name: String,
    pub name: String,
    pub description: String,
}

impl SwitchPosition {
    pub fn new(setting_name: &str, name: &str, description: &str) -> Self {
        Self {
            setting_name: setting_name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// One displayable state of a status field (an LED, an indicator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusState {
    pub short_name: String,
    pub name: String,
    /// 0RGB display color, `None` when the state has no color
    pub color: Option<u32>,
}

impl StatusState {
    pub fn new(short_name: &str, name: &str, color: Option<u32>) -> Self {
        Self {
            short_name: short_name.to_string(),
            name: name.to_string(),
            color,
        }
    }
}

/// Category of an input field
///
/// Switch and status fields carry their own enumeration; no other kind has
/// associated data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InputKind {
    Button,
    RapidButton,
    Switch { positions: Vec<SwitchPosition> },
    Status { states: Vec<StatusState> },
    XAxis,
    YAxis,
    XAxisRel,
    YAxisRel,
    ByteSpecial,
    ResetButton,
    AnalogButton,
    Rumble,
}

impl InputKind {
    /// Number of enumerated positions/states, for switch and status kinds
    pub fn choice_count(&self) -> Option<usize> {
        match self {
            InputKind::Switch { positions } => Some(positions.len()),
            InputKind::Status { states } => Some(states.len()),
            _ => None,
        }
    }

    /// Packed bit width
    ///
    /// Returns `None` for a switch/status with fewer than two choices, which
    /// cannot be represented.
    pub fn bit_width(&self) -> Option<u8> {
        match self {
            InputKind::Button | InputKind::RapidButton | InputKind::ResetButton => Some(1),
            InputKind::XAxis
            | InputKind::YAxis
            | InputKind::XAxisRel
            | InputKind::YAxisRel
            | InputKind::ByteSpecial
            | InputKind::AnalogButton
            | InputKind::Rumble => Some(BYTE_FIELD_BITS),
            InputKind::Switch { .. } | InputKind::Status { .. } => {
                let n = self.choice_count().unwrap_or(0);
                if n < 2 {
                    None
                } else {
                    // ceil(log2(n))
                    Some((usize::BITS - (n - 1).leading_zeros()) as u8)
                }
            }
        }
    }

    /// Largest legal logical value
    pub fn max_value(&self) -> u32 {
        match self.choice_count() {
            Some(n) => n.saturating_sub(1) as u32,
            None => match self.bit_width() {
                Some(bits) => (1u32 << bits) - 1,
                None => 0,
            },
        }
    }

    /// True for the 1-bit button-like kinds
    pub fn is_button(&self) -> bool {
        matches!(
            self,
            InputKind::Button | InputKind::RapidButton | InputKind::ResetButton
        )
    }

    /// Short lowercase name, used in descriptor exports
    pub fn name(&self) -> &'static str {
        match self {
            InputKind::Button => "button",
            InputKind::RapidButton => "rapid_button",
            InputKind::Switch { .. } => "switch",
            InputKind::Status { .. } => "status",
            InputKind::XAxis => "x_axis",
            InputKind::YAxis => "y_axis",
            InputKind::XAxisRel => "x_axis_rel",
            InputKind::YAxisRel => "y_axis_rel",
            InputKind::ByteSpecial => "byte_special",
            InputKind::ResetButton => "reset_button",
            InputKind::AnalogButton => "analog_button",
            InputKind::Rumble => "rumble",
        }
    }
}

/// Description of one controller input
///
/// Build with the kind-specific constructors and the chaining modifiers;
/// bit width and offset are filled in when the field joins a
/// [`DeviceInputDescriptorSet`](super::DeviceInputDescriptorSet).
///
/// # Example
///
/// ```
/// use corelink::core::input::{InputFieldDescriptor, Rotation};
///
/// let up = InputFieldDescriptor::button("up", "UP ↑", Some(0))
///     .excludes("down")
///     .rotates(Rotation::Deg90, "right");
/// assert_eq!(up.setting_name(), "up");
/// assert_eq!(up.exclude(), Some("down"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFieldDescriptor {
    setting_name: String,
    name: String,
    /// Position in the in-game configuration sequence, `None` to skip
    config_order: Option<u32>,
    kind: InputKind,
    exclude: Option<String>,
    /// References for 90, 180 and 270 degrees
    rotate: [Option<String>; 3],
    flags: FieldFlags,
    pub(super) bit_size: u8,
    pub(super) bit_offset: u16,
}

impl InputFieldDescriptor {
    /// Field of any kind
    pub fn new(setting_name: &str, name: &str, config_order: Option<u32>, kind: InputKind) -> Self {
        Self {
            setting_name: setting_name.to_string(),
            name: name.to_string(),
            config_order,
            kind,
            exclude: None,
            rotate: [None, None, None],
            flags: FieldFlags::empty(),
            bit_size: 0,
            bit_offset: 0,
        }
    }

    pub fn button(setting_name: &str, name: &str, config_order: Option<u32>) -> Self {
        Self::new(setting_name, name, config_order, InputKind::Button)
    }

    pub fn rapid_button(setting_name: &str, name: &str, config_order: Option<u32>) -> Self {
        Self::new(setting_name, name, config_order, InputKind::RapidButton)
    }

    pub fn reset_button(setting_name: &str, name: &str, config_order: Option<u32>) -> Self {
        Self::new(setting_name, name, config_order, InputKind::ResetButton)
    }

    /// Multi-position switch
    ///
    /// `undoc_default_position` marks the field auxiliary, since the default
    /// position of most hardware switches is not something users configure.
    pub fn switch(
        setting_name: &str,
        name: &str,
        config_order: Option<u32>,
        positions: Vec<SwitchPosition>,
        undoc_default_position: bool,
    ) -> Self {
        let mut field = Self::new(
            setting_name,
            name,
            config_order,
            InputKind::Switch { positions },
        );
        if undoc_default_position {
            field.flags |= FieldFlags::AUX_UNDOC;
        }
        field
    }

    /// Status indicator; never part of the configuration sequence
    pub fn status(setting_name: &str, name: &str, states: Vec<StatusState>) -> Self {
        Self::new(setting_name, name, None, InputKind::Status { states })
    }

    /// Mark this field as physically exclusive with `other`
    pub fn excludes(mut self, other: &str) -> Self {
        self.exclude = Some(other.to_string());
        self
    }

    /// Remap this field to `other` at `rotation`; 0 degrees is ignored
    pub fn rotates(mut self, rotation: Rotation, other: &str) -> Self {
        if let Some(slot) = rotation.slot() {
            self.rotate[slot] = Some(other.to_string());
        }
        self
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn setting_name(&self) -> &str {
        &self.setting_name
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn config_order(&self) -> Option<u32> {
        self.config_order
    }

    #[inline]
    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    #[inline]
    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_deref()
    }

    /// Rotation reference for `rotation`, if any
    pub fn rotation_target(&self, rotation: Rotation) -> Option<&str> {
        rotation
            .slot()
            .and_then(|slot| self.rotate[slot].as_deref())
    }

    #[inline]
    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Packed width in bits (0 until registered in a descriptor set)
    #[inline]
    pub fn bit_size(&self) -> u8 {
        self.bit_size
    }

    /// Bit offset within the packed state (0 until registered)
    #[inline]
    pub fn bit_offset(&self) -> u16 {
        self.bit_offset
    }

    /// Largest legal logical value
    #[inline]
    pub fn max_value(&self) -> u32 {
        self.kind.max_value()
    }
}
