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

//! Decoded cheat patch record

use serde::{Deserialize, Serialize};

/// How a patch takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatchKind {
    /// Reads of the address return the patch value (Game Genie style)
    Substitute,
    /// The value is written into memory each time cheats are applied
    Write,
}

/// One memory patch, 1 to 8 bytes wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryPatch {
    pub address: u32,
    pub value: u64,
    /// Width in bytes
    pub length: u8,
    /// Only patch while memory holds this value
    pub compare: Option<u64>,
    pub kind: PatchKind,
    pub big_endian: bool,
}

impl MemoryPatch {
    /// Single-byte patch
    pub fn byte(address: u32, value: u8, compare: Option<u8>, kind: PatchKind) -> Self {
        Self {
            address,
            value: value as u64,
            length: 1,
            compare: compare.map(|c| c as u64),
            kind,
            big_endian: false,
        }
    }

    /// Per-byte view: `(address, value, compare)` for each byte, lowest
    /// address first
    ///
    /// # Example
    ///
    /// ```
    /// use corelink::core::cheat::{MemoryPatch, PatchKind};
    ///
    /// let patch = MemoryPatch {
    ///     address: 0x100,
    ///     value: 0x1234,
    ///     length: 2,
    ///     compare: None,
    ///     kind: PatchKind::Write,
    ///     big_endian: true,
    /// };
    /// let bytes: Vec<_> = patch.bytes().collect();
    /// assert_eq!(bytes, vec![(0x100, 0x12, None), (0x101, 0x34, None)]);
    /// ```
    pub fn bytes(&self) -> impl Iterator<Item = (u32, u8, Option<u8>)> + '_ {
        let length = self.length.clamp(1, 8) as u32;
        (0..length).map(move |i| {
            let shift = if self.big_endian {
                (length - 1 - i) * 8
            } else {
                i * 8
            };
            (
                self.address.wrapping_add(i),
                (self.value >> shift) as u8,
                self.compare.map(|c| (c >> shift) as u8),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_bytes() {
        let patch = MemoryPatch {
            address: 0x10,
            value: 0xAABBCC,
            length: 3,
            compare: Some(0x112233),
            kind: PatchKind::Substitute,
            big_endian: false,
        };
        let bytes: Vec<_> = patch.bytes().collect();
        assert_eq!(
            bytes,
            vec![
                (0x10, 0xCC, Some(0x33)),
                (0x11, 0xBB, Some(0x22)),
                (0x12, 0xAA, Some(0x11)),
            ]
        );
    }

    #[test]
    fn test_single_byte() {
        let patch = MemoryPatch::byte(5, 0x7F, None, PatchKind::Write);
        assert_eq!(patch.bytes().collect::<Vec<_>>(), vec![(5, 0x7F, None)]);
    }
}
