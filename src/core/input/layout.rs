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

//! Device input descriptor sets and packed layout
//!
//! # Layout
//!
//! Fields are laid out in declaration order starting at bit 0, with no gaps:
//!
//! ```text
//! bit:    0     1     2     3  4   5 ...
//!       [ a ] [ b ] [ c ] [ sw  ] [ ...
//! ```
//!
//! Bits are numbered least-significant-first within each byte, so bit 9 is
//! bit 1 of byte 1. The state buffer is `ceil(total_bits / 8)` bytes.

use std::collections::HashSet;

use serde::Serialize;

use super::field::{InputFieldDescriptor, Rotation};
use crate::core::error::ConfigurationError;

/// Ordered collection of input fields for one device, with derived layout
///
/// Construction validates the whole set; a value of this type is always
/// well-formed and immutable.
///
/// # Example
///
/// ```
/// use corelink::core::input::{DeviceInputDescriptorSet, InputFieldDescriptor, SwitchPosition};
///
/// let set = DeviceInputDescriptorSet::new(vec![
///     InputFieldDescriptor::button("a", "A", Some(0)),
///     InputFieldDescriptor::button("b", "B", Some(1)),
///     InputFieldDescriptor::button("c", "C", Some(2)),
///     InputFieldDescriptor::switch(
///         "speed",
///         "Speed",
///         None,
///         (0..4).map(|i| SwitchPosition::new(&i.to_string(), &i.to_string(), "")).collect(),
///         true,
///     ),
/// ])
/// .unwrap();
///
/// assert_eq!(set.byte_size(), 1);
/// assert_eq!(set.field("speed").unwrap().bit_offset(), 3);
/// assert_eq!(set.field("speed").unwrap().bit_size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInputDescriptorSet {
    fields: Vec<InputFieldDescriptor>,
    total_bits: usize,
    byte_size: usize,
}

impl DeviceInputDescriptorSet {
    /// Validate `fields` and compute widths and offsets
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::DuplicateField`] if two fields share a setting name
    /// - [`ConfigurationError::DegenerateEnumeration`] if a switch/status has < 2 choices
    /// - [`ConfigurationError::DanglingExclusion`] / [`ConfigurationError::DanglingRotation`]
    ///   if a name reference does not resolve within the set
    /// - [`ConfigurationError::LayoutOverflow`] if offsets no longer fit in 16 bits
    pub fn new(mut fields: Vec<InputFieldDescriptor>) -> Result<Self, ConfigurationError> {
        let mut names = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !names.insert(field.setting_name().to_string()) {
                return Err(ConfigurationError::DuplicateField {
                    name: field.setting_name().to_string(),
                });
            }
        }

        let mut offset = 0usize;
        for field in &mut fields {
            let bits = field.kind().bit_width().ok_or_else(|| {
                ConfigurationError::DegenerateEnumeration {
                    field: field.setting_name().to_string(),
                    count: field.kind().choice_count().unwrap_or(0),
                }
            })?;
            if offset > u16::MAX as usize {
                return Err(ConfigurationError::LayoutOverflow { bits: offset });
            }
            field.bit_size = bits;
            field.bit_offset = offset as u16;
            offset += bits as usize;
        }

        for field in &fields {
            if let Some(target) = field.exclude() {
                if !names.contains(target) {
                    return Err(ConfigurationError::DanglingExclusion {
                        field: field.setting_name().to_string(),
                        target: target.to_string(),
                    });
                }
            }
            for rotation in Rotation::ALL {
                if let Some(target) = field.rotation_target(rotation) {
                    if !names.contains(target) {
                        return Err(ConfigurationError::DanglingRotation {
                            field: field.setting_name().to_string(),
                            degrees: rotation.degrees(),
                            target: target.to_string(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            fields,
            total_bits: offset,
            byte_size: offset.div_ceil(8),
        })
    }

    /// Set with no fields, used by "none" devices
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            total_bits: 0,
            byte_size: 0,
        }
    }

    #[inline]
    pub fn fields(&self) -> &[InputFieldDescriptor] {
        &self.fields
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of all field widths
    #[inline]
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Size of the packed state buffer in bytes
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Index of the field with the given setting name
    pub fn index_of(&self, setting_name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.setting_name() == setting_name)
    }

    /// Field with the given setting name
    pub fn field(&self, setting_name: &str) -> Option<&InputFieldDescriptor> {
        self.index_of(setting_name).map(|i| &self.fields[i])
    }

    /// Fields in configuration order, skipping those not configured in-game
    pub fn config_sequence(&self) -> Vec<&InputFieldDescriptor> {
        let mut ordered: Vec<_> = self
            .fields
            .iter()
            .filter(|f| f.config_order().is_some())
            .collect();
        ordered.sort_by_key(|f| f.config_order());
        ordered
    }
}

impl Default for DeviceInputDescriptorSet {
    fn default() -> Self {
        Self::empty()
    }
}
