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

//! Cheat hooks, format registry and patch application

use std::sync::Arc;

use super::format::CheatFormat;
use super::patch::{MemoryPatch, PatchKind};
use crate::core::error::CheatDecodeError;
use crate::core::log_context::LogContext;

/// Memory primitives a core exposes to cheat management
pub trait CheatHooks {
    /// Byte at `address` as the game sees it, without side effects
    fn mem_read(&self, address: u32) -> u8;

    fn mem_write(&mut self, address: u32, value: u8);

    /// Make reads of `address` return `value`, optionally only while the
    /// underlying byte equals `compare`
    fn install_read_patch(&mut self, address: u32, value: u8, compare: Option<u8>);

    /// Drop every installed read patch
    fn remove_read_patches(&mut self);
}

/// The cheat formats a system accepts, plus its display byte order
#[derive(Clone, Default)]
pub struct CheatInterface {
    formats: Vec<Arc<dyn CheatFormat>>,
    big_endian: bool,
}

impl CheatInterface {
    pub fn new(formats: Vec<Arc<dyn CheatFormat>>, big_endian: bool) -> Self {
        Self {
            formats,
            big_endian,
        }
    }

    pub fn formats(&self) -> &[Arc<dyn CheatFormat>] {
        &self.formats
    }

    /// Default byte order for cheat search and new cheats
    #[inline]
    pub fn big_endian(&self) -> bool {
        self.big_endian
    }

    /// Decode `code` with the first format that accepts it
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use corelink::core::cheat::{CheatInterface, RawHexFormat};
    ///
    /// let cheats = CheatInterface::new(vec![Arc::new(RawHexFormat::default())], false);
    /// let patch = cheats.decode("0010:FF").unwrap();
    /// assert_eq!(patch.address, 0x10);
    /// assert!(cheats.decode("not a cheat").is_err());
    /// ```
    pub fn decode(&self, code: &str) -> Result<MemoryPatch, CheatDecodeError> {
        self.formats
            .iter()
            .find_map(|format| format.decode(code).ok())
            .ok_or_else(|| CheatDecodeError::NoMatchingFormat(code.to_string()))
    }

    /// Decode `code` with the format named `format`
    pub fn decode_with(&self, format: &str, code: &str) -> Result<MemoryPatch, CheatDecodeError> {
        match self.formats.iter().find(|f| f.name() == format) {
            Some(f) => f.decode(code),
            None => Err(CheatDecodeError::NoMatchingFormat(code.to_string())),
        }
    }
}

impl std::fmt::Debug for CheatInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheatInterface")
            .field(
                "formats",
                &self.formats.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field("big_endian", &self.big_endian)
            .finish()
    }
}

/// Active cheat list, applied through a core's [`CheatHooks`]
#[derive(Debug, Clone, Default)]
pub struct CheatEngine {
    patches: Vec<MemoryPatch>,
}

impl CheatEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, patch: MemoryPatch) {
        self.patches.push(patch);
    }

    pub fn patches(&self) -> &[MemoryPatch] {
        &self.patches
    }

    /// Forget every patch; call [`CheatEngine::clear`] to also unhook them
    pub fn remove_all(&mut self) {
        self.patches.clear();
    }

    /// Reinstall substitutions and perform writes
    ///
    /// Writes with a compare value only land while memory holds that value.
    /// Returns the number of bytes written.
    pub fn apply(&self, hooks: &mut dyn CheatHooks, ctx: &LogContext) -> usize {
        hooks.remove_read_patches();

        let mut written = 0;
        for patch in &self.patches {
            match patch.kind {
                PatchKind::Substitute => {
                    for (address, value, compare) in patch.bytes() {
                        hooks.install_read_patch(address, value, compare);
                    }
                }
                PatchKind::Write => {
                    for (address, value, compare) in patch.bytes() {
                        if compare.is_some_and(|c| hooks.mem_read(address) != c) {
                            continue;
                        }
                        hooks.mem_write(address, value);
                        written += 1;
                    }
                }
            }
        }

        ctx.trace(format_args!(
            "applied {} cheats, {} bytes written",
            self.patches.len(),
            written
        ));
        written
    }

    /// Remove every read substitution from the core
    pub fn clear(&self, hooks: &mut dyn CheatHooks) {
        hooks.remove_read_patches();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cheat::format::RawHexFormat;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeMemory {
        ram: [u8; 16],
        subs: HashMap<u32, (u8, Option<u8>)>,
        removals: usize,
    }

    impl CheatHooks for FakeMemory {
        fn mem_read(&self, address: u32) -> u8 {
            self.ram[address as usize % 16]
        }

        fn mem_write(&mut self, address: u32, value: u8) {
            self.ram[address as usize % 16] = value;
        }

        fn install_read_patch(&mut self, address: u32, value: u8, compare: Option<u8>) {
            self.subs.insert(address, (value, compare));
        }

        fn remove_read_patches(&mut self) {
            self.subs.clear();
            self.removals += 1;
        }
    }

    struct NeverFormat;

    impl CheatFormat for NeverFormat {
        fn name(&self) -> &str {
            "Never"
        }

        fn description(&self) -> &str {
            "Rejects everything"
        }

        fn decode(&self, code: &str) -> Result<MemoryPatch, CheatDecodeError> {
            Err(CheatDecodeError::Malformed {
                format: "Never".to_string(),
                code: code.to_string(),
                reason: "never".to_string(),
            })
        }
    }

    fn interface() -> CheatInterface {
        CheatInterface::new(
            vec![Arc::new(NeverFormat), Arc::new(RawHexFormat::default())],
            false,
        )
    }

    #[test]
    fn test_decode_falls_through_formats() {
        let patch = interface().decode("02:AA").unwrap();
        assert_eq!(patch.value, 0xAA);
    }

    #[test]
    fn test_no_matching_format() {
        assert_eq!(
            interface().decode("xyz"),
            Err(CheatDecodeError::NoMatchingFormat("xyz".to_string()))
        );
        assert!(CheatInterface::default().decode("02:AA").is_err());
    }

    #[test]
    fn test_decode_with_named_format() {
        let cheats = interface();
        assert!(cheats.decode_with("Never", "02:AA").is_err());
        assert!(cheats.decode_with("Raw", "02:AA").is_ok());
        assert!(cheats.decode_with("Missing", "02:AA").is_err());
    }

    #[test]
    fn test_apply_writes_and_substitutes() {
        let ctx = LogContext::default();
        let cheats = interface();
        let mut engine = CheatEngine::new();
        engine.add(cheats.decode("01:11").unwrap());
        engine.add(cheats.decode("02:22?00").unwrap());
        // Compare fails: memory at 3 is 0, not 5
        engine.add(MemoryPatch {
            compare: Some(5),
            ..MemoryPatch::byte(3, 0x33, None, PatchKind::Write)
        });

        let mut memory = FakeMemory::default();
        let written = engine.apply(&mut memory, &ctx);

        assert_eq!(written, 1);
        assert_eq!(memory.ram[1], 0x11);
        assert_eq!(memory.ram[3], 0);
        assert_eq!(memory.subs.get(&2), Some(&(0x22, Some(0))));

        engine.clear(&mut memory);
        assert!(memory.subs.is_empty());
        assert_eq!(memory.removals, 2);
    }
}
