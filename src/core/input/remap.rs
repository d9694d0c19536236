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

//! Rotation remapping
//!
//! When the display is rotated, the physical input bound to one field should
//! drive a different logical field (pushing "up" on a rotated screen means
//! "right" to the game). The codec never applies this; the host's input
//! mapping layer does, using the table built here.

use super::field::Rotation;
use super::layout::DeviceInputDescriptorSet;

/// Precomputed physical-to-logical field index table per rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationRemap {
    /// `table[rotation][physical] = logical`
    table: [Vec<usize>; 4],
}

impl RotationRemap {
    /// Build from a validated descriptor set
    ///
    /// References were checked when the set was constructed, so every lookup
    /// resolves; an unresolved one would fall back to identity.
    pub fn new(set: &DeviceInputDescriptorSet) -> Self {
        let build = |rotation: Rotation| -> Vec<usize> {
            set.fields()
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    field
                        .rotation_target(rotation)
                        .and_then(|name| set.index_of(name))
                        .unwrap_or(i)
                })
                .collect()
        };

        Self {
            table: [
                build(Rotation::Deg0),
                build(Rotation::Deg90),
                build(Rotation::Deg180),
                build(Rotation::Deg270),
            ],
        }
    }

    fn row(&self, rotation: Rotation) -> &[usize] {
        let index = match rotation {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        };
        &self.table[index]
    }

    /// Logical field driven by `physical` at `rotation`
    pub fn logical_field(&self, physical: usize, rotation: Rotation) -> Option<usize> {
        self.row(rotation).get(physical).copied()
    }

    /// Translate per-field physical values into logical values
    ///
    /// When two physical inputs land on the same logical field the larger
    /// value wins, so an asserted button is never masked by a released one.
    pub fn apply(&self, physical: &[u32], rotation: Rotation) -> Vec<u32> {
        let row = self.row(rotation);
        let mut logical = vec![0u32; physical.len()];
        for (i, &value) in physical.iter().enumerate() {
            let target = row.get(i).copied().unwrap_or(i);
            if let Some(slot) = logical.get_mut(target) {
                *slot = (*slot).max(value);
            }
        }
        logical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::field::InputFieldDescriptor;

    fn dpad() -> DeviceInputDescriptorSet {
        DeviceInputDescriptorSet::new(vec![
            InputFieldDescriptor::button("up", "Up", Some(0))
                .rotates(Rotation::Deg90, "right")
                .rotates(Rotation::Deg180, "down")
                .rotates(Rotation::Deg270, "left"),
            InputFieldDescriptor::button("down", "Down", Some(1))
                .rotates(Rotation::Deg90, "left")
                .rotates(Rotation::Deg180, "up")
                .rotates(Rotation::Deg270, "right"),
            InputFieldDescriptor::button("left", "Left", Some(2))
                .rotates(Rotation::Deg90, "up")
                .rotates(Rotation::Deg180, "right")
                .rotates(Rotation::Deg270, "down"),
            InputFieldDescriptor::button("right", "Right", Some(3))
                .rotates(Rotation::Deg90, "down")
                .rotates(Rotation::Deg180, "left")
                .rotates(Rotation::Deg270, "up"),
            InputFieldDescriptor::button("fire", "Fire", Some(4)),
        ])
        .unwrap()
    }

    #[test]
    fn test_identity_at_zero_degrees() {
        let remap = RotationRemap::new(&dpad());
        for i in 0..5 {
            assert_eq!(remap.logical_field(i, Rotation::Deg0), Some(i));
        }
    }

    #[test]
    fn test_up_reports_as_down_at_180() {
        let set = dpad();
        let remap = RotationRemap::new(&set);
        let up = set.index_of("up").unwrap();
        let down = set.index_of("down").unwrap();

        // Physical "up" held
        let logical = remap.apply(&[1, 0, 0, 0, 0], Rotation::Deg180);
        assert_eq!(logical[down], 1);
        assert_eq!(logical[up], 0);
    }

    #[test]
    fn test_unrotated_field_keeps_identity() {
        let set = dpad();
        let remap = RotationRemap::new(&set);
        let fire = set.index_of("fire").unwrap();
        for rotation in Rotation::ALL {
            assert_eq!(remap.logical_field(fire, rotation), Some(fire));
        }
    }

    #[test]
    fn test_colliding_inputs_keep_asserted_value() {
        let set = DeviceInputDescriptorSet::new(vec![
            InputFieldDescriptor::button("a", "A", None).rotates(Rotation::Deg90, "b"),
            InputFieldDescriptor::button("b", "B", None),
        ])
        .unwrap();
        let remap = RotationRemap::new(&set);
        assert_eq!(remap.apply(&[1, 0], Rotation::Deg90), vec![0, 1]);
        assert_eq!(remap.apply(&[0, 1], Rotation::Deg90), vec![0, 1]);
    }
}
