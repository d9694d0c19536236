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

//! Host input mapping
//!
//! Turns physical key presses into a device's logical field values. Two host
//! policies live here rather than in the codec: rotation remapping of
//! directional fields, and mutual exclusion between fields such as opposing
//! d-pad directions (the later press wins).

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::core::error::InputError;
use crate::core::input::{
    DeviceInputDescriptorSet, InputKind, InputState, Rotation, RotationRemap,
};

/// Maps physical keys onto one device's input fields
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
/// use corelink::core::input::{DeviceInputDescriptorSet, InputFieldDescriptor, InputState, Rotation};
/// use corelink::frontend::InputMapper;
///
/// let set = Arc::new(
///     DeviceInputDescriptorSet::new(vec![InputFieldDescriptor::button("start", "Start", Some(0))])
///         .unwrap(),
/// );
/// let mut bindings = BTreeMap::new();
/// bindings.insert("Enter".to_string(), "start".to_string());
///
/// let mut mapper = InputMapper::new(Arc::clone(&set), &bindings, Rotation::Deg0);
/// assert!(mapper.handle_key("Enter", true));
///
/// let mut state = InputState::new(set);
/// mapper.write_state(&mut state).unwrap();
/// assert_eq!(state.get("start").unwrap(), 1);
/// ```
pub struct InputMapper {
    descriptors: Arc<DeviceInputDescriptorSet>,
    remap: RotationRemap,
    rotation: Rotation,
    /// Physical key name -> field index
    key_mapping: HashMap<String, usize>,
    /// Physical value per field, before rotation
    physical: Vec<u32>,
    /// Press sequence number per field, 0 when released
    pressed_at: Vec<u64>,
    sequence: u64,
}

impl InputMapper {
    /// Build a mapper from `bindings` (key name -> field setting name)
    ///
    /// Bindings naming unknown fields, or fields a key cannot drive, are
    /// skipped with a warning.
    pub fn new(
        descriptors: Arc<DeviceInputDescriptorSet>,
        bindings: &BTreeMap<String, String>,
        rotation: Rotation,
    ) -> Self {
        let mut key_mapping = HashMap::new();
        for (key, field_name) in bindings {
            let Some(index) = descriptors.index_of(field_name) else {
                log::warn!("Unknown input field in binding {} -> {}", key, field_name);
                continue;
            };
            if !key_drivable(descriptors.fields()[index].kind()) {
                log::warn!(
                    "Field '{}' cannot be driven by a key, ignoring binding for {}",
                    field_name,
                    key
                );
                continue;
            }
            key_mapping.insert(key.clone(), index);
        }

        let len = descriptors.len();
        Self {
            remap: RotationRemap::new(&descriptors),
            descriptors,
            rotation,
            key_mapping,
            physical: vec![0; len],
            pressed_at: vec![0; len],
            sequence: 0,
        }
    }

    pub fn descriptors(&self) -> &Arc<DeviceInputDescriptorSet> {
        &self.descriptors
    }

    #[inline]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Handle a key press or release
    ///
    /// # Returns
    ///
    /// `true` if the key is bound to a field
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> bool {
        let Some(&index) = self.key_mapping.get(key) else {
            return false;
        };
        if pressed {
            self.sequence += 1;
            self.physical[index] = self.descriptors.fields()[index].max_value();
            self.pressed_at[index] = self.sequence;
        } else {
            self.physical[index] = 0;
            self.pressed_at[index] = 0;
        }
        true
    }

    /// Set a field directly (switches, axes)
    ///
    /// # Errors
    ///
    /// [`InputError::UnknownField`] or [`InputError::ValueOutOfRange`]
    pub fn set_field(&mut self, setting_name: &str, value: u32) -> Result<(), InputError> {
        let index = self
            .descriptors
            .index_of(setting_name)
            .ok_or_else(|| InputError::UnknownField(setting_name.to_string()))?;
        let max = self.descriptors.fields()[index].max_value();
        if value > max {
            return Err(InputError::ValueOutOfRange {
                field: setting_name.to_string(),
                value,
                max,
            });
        }
        self.physical[index] = value;
        Ok(())
    }

    /// Release every field
    pub fn release_all(&mut self) {
        self.physical.fill(0);
        self.pressed_at.fill(0);
    }

    /// Logical field values after rotation and mutual exclusion
    pub fn logical_values(&self) -> Vec<u32> {
        let mut logical = self.remap.apply(&self.physical, self.rotation);

        let mut order = vec![0u64; logical.len()];
        for (physical, &seq) in self.pressed_at.iter().enumerate() {
            if let Some(target) = self.remap.logical_field(physical, self.rotation) {
                if let Some(slot) = order.get_mut(target) {
                    *slot = (*slot).max(seq);
                }
            }
        }

        for (i, field) in self.descriptors.fields().iter().enumerate() {
            let Some(other) = field.exclude().and_then(|name| self.descriptors.index_of(name))
            else {
                continue;
            };
            if logical[i] != 0 && logical[other] != 0 {
                let loser = if order[i] >= order[other] { other } else { i };
                logical[loser] = 0;
            }
        }
        logical
    }

    /// Encode the current values into `state`
    pub fn write_state(&self, state: &mut InputState) -> Result<(), InputError> {
        state.set_all(&self.logical_values())
    }

    pub fn key_mapping(&self) -> &HashMap<String, usize> {
        &self.key_mapping
    }

    /// Fields bound to more than one key, as (setting name, keys)
    pub fn detect_conflicts(&self) -> Vec<(String, Vec<String>)> {
        let mut field_to_keys: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (key, &index) in &self.key_mapping {
            field_to_keys.entry(index).or_default().push(key.clone());
        }

        field_to_keys
            .into_iter()
            .filter(|(_, keys)| keys.len() > 1)
            .map(|(index, mut keys)| {
                keys.sort();
                (
                    self.descriptors.fields()[index].setting_name().to_string(),
                    keys,
                )
            })
            .collect()
    }
}

fn key_drivable(kind: &InputKind) -> bool {
    kind.is_button() || matches!(kind, InputKind::AnalogButton)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::system::gamepad_descriptors;

    fn mapper(rotation: Rotation) -> InputMapper {
        let set = Arc::new(gamepad_descriptors().unwrap());
        let bindings: BTreeMap<String, String> = [
            ("ArrowUp", "up"),
            ("KeyW", "up"),
            ("ArrowDown", "down"),
            ("ArrowLeft", "left"),
            ("ArrowRight", "right"),
            ("KeyX", "a"),
            ("KeyQ", "mode"),
            ("KeyP", "nothing"),
        ]
        .into_iter()
        .map(|(k, f)| (k.to_string(), f.to_string()))
        .collect();
        InputMapper::new(set, &bindings, rotation)
    }

    fn value(mapper: &InputMapper, name: &str) -> u32 {
        let index = mapper.descriptors().index_of(name).unwrap();
        mapper.logical_values()[index]
    }

    #[test]
    fn test_bindings_skip_bad_fields() {
        let mapper = mapper(Rotation::Deg0);
        assert!(mapper.key_mapping().contains_key("KeyX"));
        // switch and unknown field
        assert!(!mapper.key_mapping().contains_key("KeyQ"));
        assert!(!mapper.key_mapping().contains_key("KeyP"));
    }

    #[test]
    fn test_press_and_release() {
        let mut mapper = mapper(Rotation::Deg0);
        assert!(mapper.handle_key("KeyX", true));
        assert_eq!(value(&mapper, "a"), 1);
        mapper.handle_key("KeyX", false);
        assert_eq!(value(&mapper, "a"), 0);
        assert!(!mapper.handle_key("KeyM", true));
    }

    #[test]
    fn test_later_press_wins() {
        let mut mapper = mapper(Rotation::Deg0);
        mapper.handle_key("ArrowUp", true);
        mapper.handle_key("ArrowDown", true);
        assert_eq!(value(&mapper, "up"), 0);
        assert_eq!(value(&mapper, "down"), 1);

        mapper.handle_key("ArrowDown", false);
        mapper.handle_key("ArrowUp", true);
        assert_eq!(value(&mapper, "up"), 1);
    }

    #[test]
    fn test_rotation_remaps_directions() {
        let mut mapper = mapper(Rotation::Deg90);
        mapper.handle_key("ArrowUp", true);
        assert_eq!(value(&mapper, "up"), 0);
        assert_eq!(value(&mapper, "right"), 1);

        mapper.set_rotation(Rotation::Deg0);
        assert_eq!(value(&mapper, "up"), 1);
    }

    #[test]
    fn test_set_field_checks_domain() {
        let mut mapper = mapper(Rotation::Deg0);
        mapper.set_field("mode", 2).unwrap();
        assert_eq!(value(&mapper, "mode"), 2);
        assert!(matches!(
            mapper.set_field("mode", 3),
            Err(InputError::ValueOutOfRange { .. })
        ));
        assert!(mapper.set_field("missing", 0).is_err());
    }

    #[test]
    fn test_write_state() {
        let mut mapper = mapper(Rotation::Deg0);
        mapper.handle_key("KeyX", true);
        let mut state = InputState::new(Arc::clone(mapper.descriptors()));
        mapper.write_state(&mut state).unwrap();
        assert_eq!(state.get("a").unwrap(), 1);

        mapper.release_all();
        mapper.write_state(&mut state).unwrap();
        assert_eq!(state.get("a").unwrap(), 0);
    }

    #[test]
    fn test_detect_conflicts() {
        let mapper = mapper(Rotation::Deg0);
        let conflicts = mapper.detect_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].0, "up");
        assert_eq!(conflicts[0].1, vec!["ArrowUp".to_string(), "KeyW".to_string()]);
    }
}
