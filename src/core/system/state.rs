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

//! Save state medium and container format
//!
//! ## Binary Format
//!
//! - 4 bytes: magic `CLST`
//! - 4 bytes: version (u32 little-endian)
//! - 8 bytes: timestamp (i64 little-endian, Unix seconds, UTC)
//! - remaining: bincode-encoded core snapshot
//!
//! Data-only states (used for rewind) omit the header.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::StateIoError;

/// Magic number for save states ("CLST" in ASCII)
pub const STATE_MAGIC: [u8; 4] = *b"CLST";

/// Current save state format version
pub const STATE_VERSION: u32 = 1;

/// magic + version + timestamp
pub const STATE_HEADER_SIZE: usize = 4 + 4 + 8;

/// Byte stream a core saves into or loads from
///
/// Saving appends at the end; loading reads from the cursor onward, so
/// several sections can share one medium.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateMedium {
    data: Vec<u8>,
    loc: usize,
}

impl StateMedium {
    /// Empty medium, ready for saving
    pub fn new() -> Self {
        Self::default()
    }

    /// Medium holding previously saved bytes, cursor at the start
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, loc: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move the read cursor back to the start
    pub fn rewind(&mut self) {
        self.loc = 0;
    }

    /// Bytes not yet consumed by a load
    pub fn remaining(&self) -> &[u8] {
        self.data.get(self.loc..).unwrap_or(&[])
    }

    fn advance(&mut self, n: usize) {
        self.loc = (self.loc + n).min(self.data.len());
    }

    fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

/// Fixed header preceding a full save state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHeader {
    pub version: u32,
    /// Unix seconds, UTC
    pub timestamp: i64,
}

impl StateHeader {
    /// Header for a state saved right now
    pub fn now() -> Self {
        Self {
            version: STATE_VERSION,
            timestamp: Utc::now().timestamp(),
        }
    }

    /// Save time, if the timestamp is representable
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    pub fn to_bytes(&self) -> [u8; STATE_HEADER_SIZE] {
        let mut out = [0u8; STATE_HEADER_SIZE];
        out[0..4].copy_from_slice(&STATE_MAGIC);
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..16].copy_from_slice(&self.timestamp.to_le_bytes());
        out
    }

    /// Parse and validate a header
    ///
    /// # Errors
    ///
    /// - [`StateIoError::Truncated`] if fewer than 16 bytes are available
    /// - [`StateIoError::BadMagic`] if the magic is not `CLST`
    /// - [`StateIoError::UnsupportedVersion`] for versions other than
    ///   [`STATE_VERSION`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StateIoError> {
        if bytes.len() < STATE_HEADER_SIZE {
            return Err(StateIoError::Truncated {
                needed: STATE_HEADER_SIZE,
                actual: bytes.len(),
            });
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != STATE_MAGIC {
            return Err(StateIoError::BadMagic(magic));
        }

        let mut word = [0u8; 4];
        word.copy_from_slice(&bytes[4..8]);
        let version = u32::from_le_bytes(word);
        if version != STATE_VERSION {
            return Err(StateIoError::UnsupportedVersion(version));
        }

        let mut quad = [0u8; 8];
        quad.copy_from_slice(&bytes[8..16]);
        Ok(Self {
            version,
            timestamp: i64::from_le_bytes(quad),
        })
    }
}

/// Append `snapshot` to `medium`, with a header unless `data_only`
pub fn save_snapshot<T: Serialize>(
    medium: &mut StateMedium,
    snapshot: &T,
    data_only: bool,
) -> Result<(), StateIoError> {
    // Encode first so a failure leaves the medium untouched
    let payload = bincode::serde::encode_to_vec(snapshot, bincode::config::standard())?;
    if !data_only {
        medium.append(&StateHeader::now().to_bytes());
    }
    medium.append(&payload);
    Ok(())
}

/// Decode a snapshot from `medium` at its cursor
///
/// The cursor only moves if the whole snapshot decoded.
pub fn load_snapshot<T: DeserializeOwned>(
    medium: &mut StateMedium,
    data_only: bool,
) -> Result<T, StateIoError> {
    let bytes = medium.remaining();
    let header_len = if data_only {
        0
    } else {
        StateHeader::from_bytes(bytes)?;
        STATE_HEADER_SIZE
    };

    let (snapshot, read) = bincode::serde::decode_from_slice::<T, _>(
        &bytes[header_len..],
        bincode::config::standard(),
    )?;
    medium.advance(header_len + read);
    Ok(snapshot)
}
