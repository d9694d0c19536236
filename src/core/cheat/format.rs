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

//! Cheat code formats

use super::patch::{MemoryPatch, PatchKind};
use crate::core::error::CheatDecodeError;

/// A code grammar a system understands
pub trait CheatFormat: Send + Sync {
    /// Display name, e.g. "Game Genie"
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Parse `code` into a patch
    ///
    /// # Errors
    ///
    /// [`CheatDecodeError::Malformed`] if `code` does not follow this grammar.
    fn decode(&self, code: &str) -> Result<MemoryPatch, CheatDecodeError>;
}

/// Plain hex `AAAAAA:VV[?CC]`
///
/// The value may be 1 to 8 bytes (2 to 16 hex digits); a compare value must
/// have the same width. Codes without a compare are writes, codes with one
/// are read substitutions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawHexFormat {
    pub big_endian: bool,
}

impl RawHexFormat {
    pub fn new(big_endian: bool) -> Self {
        Self { big_endian }
    }

    fn malformed(&self, code: &str, reason: &str) -> CheatDecodeError {
        CheatDecodeError::Malformed {
            format: self.name().to_string(),
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_value(&self, code: &str, digits: &str) -> Result<u64, CheatDecodeError> {
        if digits.is_empty() || digits.len() > 16 || digits.len() % 2 != 0 {
            return Err(self.malformed(code, "value must be 1 to 8 whole bytes"));
        }
        if !is_hex(digits) {
            return Err(self.malformed(code, "value is not hex"));
        }
        u64::from_str_radix(digits, 16).map_err(|_| self.malformed(code, "value is not hex"))
    }
}

fn is_hex(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_hexdigit())
}

impl CheatFormat for RawHexFormat {
    fn name(&self) -> &str {
        "Raw"
    }

    fn description(&self) -> &str {
        "Address and value in hex: AAAAAA:VV, or AAAAAA:VV?CC to substitute only while memory holds CC"
    }

    fn decode(&self, code: &str) -> Result<MemoryPatch, CheatDecodeError> {
        let trimmed = code.trim();
        let (address, rest) = trimmed
            .split_once(':')
            .ok_or_else(|| self.malformed(code, "missing ':' separator"))?;

        if address.is_empty() || address.len() > 8 || !is_hex(address) {
            return Err(self.malformed(code, "address must be 1 to 8 hex digits"));
        }
        let address = u32::from_str_radix(address, 16)
            .map_err(|_| self.malformed(code, "address is not hex"))?;

        let (value_digits, compare_digits) = match rest.split_once('?') {
            Some((v, c)) => (v, Some(c)),
            None => (rest, None),
        };
        let value = self.parse_value(code, value_digits)?;
        let length = (value_digits.len() / 2) as u8;

        let compare = match compare_digits {
            Some(digits) => {
                if digits.len() != value_digits.len() {
                    return Err(self.malformed(code, "compare width differs from value width"));
                }
                Some(self.parse_value(code, digits)?)
            }
            None => None,
        };

        Ok(MemoryPatch {
            address,
            value,
            length,
            compare,
            kind: if compare.is_some() {
                PatchKind::Substitute
            } else {
                PatchKind::Write
            },
            big_endian: self.big_endian,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_write() {
        let patch = RawHexFormat::default().decode("00C0DE:7F").unwrap();
        assert_eq!(patch.address, 0xC0DE);
        assert_eq!(patch.value, 0x7F);
        assert_eq!(patch.length, 1);
        assert_eq!(patch.compare, None);
        assert_eq!(patch.kind, PatchKind::Write);
    }

    #[test]
    fn test_decode_substitute_with_compare() {
        let patch = RawHexFormat::default().decode(" 1234:BEEF?0000 ").unwrap();
        assert_eq!(patch.value, 0xBEEF);
        assert_eq!(patch.length, 2);
        assert_eq!(patch.compare, Some(0));
        assert_eq!(patch.kind, PatchKind::Substitute);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let format = RawHexFormat::default();
        for code in ["", "1234", "ZZ:01", "12:1", "12:0102?01", "123456789:00", "12:GG"] {
            assert!(
                matches!(format.decode(code), Err(CheatDecodeError::Malformed { .. })),
                "accepted {:?}",
                code
            );
        }
    }
}
