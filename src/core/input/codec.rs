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

//! Input state codec
//!
//! Packs one logical value per field into the byte buffer a core reads each
//! frame, and unpacks it again. Values are `u32`:
//!
//! | Kind                         | Domain        |
//! |------------------------------|---------------|
//! | button, rapid, reset         | 0 or 1        |
//! | switch / status with N items | 0..N          |
//! | axes, analog, byte, rumble   | 0..=255       |

use std::sync::Arc;

use super::field::InputFieldDescriptor;
use super::layout::DeviceInputDescriptorSet;
use crate::core::error::InputError;

/// Write `value` into `buf` at the field's bit range
///
/// Bits outside the field are preserved. The caller guarantees `buf` is
/// large enough for the owning descriptor set.
fn write_bits(buf: &mut [u8], offset: usize, width: usize, value: u32) {
    let mut pos = offset;
    let mut remaining = width;
    let mut v = value;

    while remaining > 0 {
        let byte = pos / 8;
        let shift = pos % 8;
        let take = (8 - shift).min(remaining);
        let mask = ((1u16 << take) - 1) as u8;

        buf[byte] = (buf[byte] & !(mask << shift)) | (((v as u8) & mask) << shift);

        v = v.checked_shr(take as u32).unwrap_or(0);
        pos += take;
        remaining -= take;
    }
}

/// Read the field's bit range out of `buf`
fn read_bits(buf: &[u8], offset: usize, width: usize) -> u32 {
    let mut pos = offset;
    let mut got = 0usize;
    let mut value = 0u32;

    while got < width {
        let byte = pos / 8;
        let shift = pos % 8;
        let take = (8 - shift).min(width - got);
        let mask = ((1u16 << take) - 1) as u8;

        value |= (((buf[byte] >> shift) & mask) as u32) << got;

        pos += take;
        got += take;
    }

    value
}

fn check_value(field: &InputFieldDescriptor, value: u32) -> Result<(), InputError> {
    let max = field.max_value();
    if value > max {
        return Err(InputError::ValueOutOfRange {
            field: field.setting_name().to_string(),
            value,
            max,
        });
    }
    Ok(())
}

impl DeviceInputDescriptorSet {
    /// Pack one value per field into a new buffer of [`byte_size`](Self::byte_size) bytes
    ///
    /// # Errors
    ///
    /// - [`InputError::ValueCount`] if `values.len()` differs from the field count
    /// - [`InputError::ValueOutOfRange`] if a value lies outside its field's domain
    ///
    /// # Example
    ///
    /// ```
    /// use corelink::core::input::{DeviceInputDescriptorSet, InputFieldDescriptor, InputKind};
    ///
    /// let set = DeviceInputDescriptorSet::new(vec![
    ///     InputFieldDescriptor::button("a", "A", Some(0)),
    ///     InputFieldDescriptor::new("x", "X", None, InputKind::XAxis),
    /// ])
    /// .unwrap();
    ///
    /// let packed = set.encode(&[1, 0xAB]).unwrap();
    /// assert_eq!(packed, vec![0x57, 0x01]);
    /// assert_eq!(set.decode(&packed).unwrap(), vec![1, 0xAB]);
    /// ```
    pub fn encode(&self, values: &[u32]) -> Result<Vec<u8>, InputError> {
        let mut buf = vec![0u8; self.byte_size()];
        self.encode_into(values, &mut buf)?;
        Ok(buf)
    }

    /// Pack into an existing buffer, overwriting every field's bits
    pub fn encode_into(&self, values: &[u32], buf: &mut [u8]) -> Result<(), InputError> {
        if values.len() != self.len() {
            return Err(InputError::ValueCount {
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.check_buffer(buf.len())?;

        for (field, &value) in self.fields().iter().zip(values) {
            check_value(field, value)?;
        }
        for (field, &value) in self.fields().iter().zip(values) {
            write_bits(
                buf,
                field.bit_offset() as usize,
                field.bit_size() as usize,
                value,
            );
        }
        Ok(())
    }

    /// Unpack one value per field
    ///
    /// Exact inverse of [`encode`](Self::encode). Switch/status fields whose
    /// width admits more codes than declared choices return the raw code.
    ///
    /// # Errors
    ///
    /// [`InputError::BufferSize`] if `buf` is not exactly `byte_size` bytes.
    pub fn decode(&self, buf: &[u8]) -> Result<Vec<u32>, InputError> {
        self.check_buffer(buf.len())?;
        Ok(self
            .fields()
            .iter()
            .map(|f| read_bits(buf, f.bit_offset() as usize, f.bit_size() as usize))
            .collect())
    }

    /// Write a single field by index
    pub fn write_field(&self, buf: &mut [u8], index: usize, value: u32) -> Result<(), InputError> {
        self.check_buffer(buf.len())?;
        let field = self
            .fields()
            .get(index)
            .ok_or_else(|| InputError::UnknownField(format!("#{}", index)))?;
        check_value(field, value)?;
        write_bits(
            buf,
            field.bit_offset() as usize,
            field.bit_size() as usize,
            value,
        );
        Ok(())
    }

    /// Read a single field by index
    pub fn read_field(&self, buf: &[u8], index: usize) -> Result<u32, InputError> {
        self.check_buffer(buf.len())?;
        let field = self
            .fields()
            .get(index)
            .ok_or_else(|| InputError::UnknownField(format!("#{}", index)))?;
        Ok(read_bits(
            buf,
            field.bit_offset() as usize,
            field.bit_size() as usize,
        ))
    }

    fn check_buffer(&self, len: usize) -> Result<(), InputError> {
        if len != self.byte_size() {
            return Err(InputError::BufferSize {
                expected: self.byte_size(),
                actual: len,
            });
        }
        Ok(())
    }
}

/// Packed input state for one device, addressed by field name
///
/// The host fills this in before the frame exchange it affects; the core
/// reads [`as_bytes`](Self::as_bytes).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use corelink::core::input::{DeviceInputDescriptorSet, InputFieldDescriptor, InputState};
///
/// let set = Arc::new(
///     DeviceInputDescriptorSet::new(vec![
///         InputFieldDescriptor::button("start", "Start", Some(0)),
///     ])
///     .unwrap(),
/// );
/// let mut state = InputState::new(set);
/// state.set("start", 1).unwrap();
/// assert_eq!(state.get("start").unwrap(), 1);
/// assert_eq!(state.as_bytes(), &[0x01]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    descriptors: Arc<DeviceInputDescriptorSet>,
    data: Vec<u8>,
}

impl InputState {
    /// All-zero state for `descriptors`
    pub fn new(descriptors: Arc<DeviceInputDescriptorSet>) -> Self {
        let data = vec![0u8; descriptors.byte_size()];
        Self { descriptors, data }
    }

    pub fn descriptors(&self) -> &Arc<DeviceInputDescriptorSet> {
        &self.descriptors
    }

    /// Set the field named `setting_name`
    pub fn set(&mut self, setting_name: &str, value: u32) -> Result<(), InputError> {
        let index = self.index(setting_name)?;
        self.descriptors.write_field(&mut self.data, index, value)
    }

    /// Read the field named `setting_name`
    pub fn get(&self, setting_name: &str) -> Result<u32, InputError> {
        let index = self.index(setting_name)?;
        self.descriptors.read_field(&self.data, index)
    }

    /// Replace every field at once
    pub fn set_all(&mut self, values: &[u32]) -> Result<(), InputError> {
        self.descriptors.encode_into(values, &mut self.data)
    }

    /// All field values in declaration order
    pub fn values(&self) -> Vec<u32> {
        // data is always byte_size long, so decode cannot fail
        self.descriptors
            .decode(&self.data)
            .unwrap_or_else(|_| vec![0; self.descriptors.len()])
    }

    /// Release everything
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, setting_name: &str) -> Result<usize, InputError> {
        self.descriptors
            .index_of(setting_name)
            .ok_or_else(|| InputError::UnknownField(setting_name.to_string()))
    }
}
