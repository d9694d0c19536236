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

//! Error types for the core/frontend interface
//!
//! Each concern has its own error enum so callers can match on exactly the
//! failures a given operation can produce. [`CoreError`] wraps all of them
//! for code that just wants to propagate with `?`.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Umbrella error type
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("media transition rejected: {0}")]
    Media(#[from] MediaTransitionRejected),

    #[error("cheat decode error: {0}")]
    Cheat(#[from] CheatDecodeError),

    #[error("state I/O error: {0}")]
    StateIo(#[from] StateIoError),

    #[error("frame contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("host configuration error: {0}")]
    HostConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Malformed static descriptor data, detected at registration time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("duplicate field name '{name}' in device input set")]
    DuplicateField { name: String },

    #[error("field '{field}' excludes unknown field '{target}'")]
    DanglingExclusion { field: String, target: String },

    #[error("field '{field}' rotation {degrees} refers to unknown field '{target}'")]
    DanglingRotation {
        field: String,
        degrees: u16,
        target: String,
    },

    #[error("field '{field}' declares {count} positions, at least 2 are required")]
    DegenerateEnumeration { field: String, count: usize },

    #[error("device input set exceeds addressable size ({bits} bits)")]
    LayoutOverflow { bits: usize },

    #[error("port '{port}' has no device named '{device}'")]
    UnknownDefaultDevice { port: String, device: String },

    #[error("duplicate device name '{name}' on port '{port}'")]
    DuplicateDevice { port: String, name: String },

    #[error("drive '{drive}' references media category {index}, only {count} exist")]
    CategoryOutOfRange {
        drive: String,
        index: usize,
        count: usize,
    },

    #[error("media item '{media}' references media category {index}, only {count} exist")]
    MediaCategoryOutOfRange {
        media: String,
        index: usize,
        count: usize,
    },

    #[error("drive '{drive}' declares no states")]
    NoDriveStates { drive: String },

    #[error("drive '{drive}' initial state {index} is out of range")]
    InitialStateOutOfRange { drive: String, index: usize },
}

/// Misuse of the input state codec at runtime
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("expected {expected} field values, got {actual}")]
    ValueCount { expected: usize, actual: usize },

    #[error("value {value} is outside the domain of field '{field}' (max {max})")]
    ValueOutOfRange { field: String, value: u32, max: u32 },

    #[error("expected a {expected}-byte input buffer, got {actual} bytes")]
    BufferSize { expected: usize, actual: usize },

    #[error("no field named '{0}'")]
    UnknownField(String),
}

/// Reason a drive state change was refused; the drive is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTransitionRejected {
    #[error("drive {0} does not exist")]
    UnknownDrive(usize),

    #[error("drive '{drive}' has no state {state}")]
    UnknownState { drive: String, state: usize },

    #[error("media item {0} does not exist")]
    UnknownMedia(usize),

    #[error("media '{media}' (category {category}) is not compatible with drive '{drive}'")]
    IncompatibleMedia {
        drive: String,
        media: String,
        category: usize,
    },

    #[error("drive '{drive}' needs {required_ms} ms between removal and insertion, only {elapsed_ms} ms elapsed")]
    TooSoon {
        drive: String,
        elapsed_ms: u64,
        required_ms: u32,
    },

    #[error("drive '{drive}' cannot change media in state '{state}'")]
    MediaLocked { drive: String, state: String },

    #[error("media item {media} has no orientation {orientation}")]
    UnknownOrientation { media: usize, orientation: usize },
}

/// A code string no registered cheat format accepted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheatDecodeError {
    #[error("code '{code}' does not match the {format} format: {reason}")]
    Malformed {
        format: String,
        code: String,
        reason: String,
    },

    #[error("code '{0}' matches no registered cheat format")]
    NoMatchingFormat(String),
}

/// Save state hook failure; the emulated state is unchanged
#[derive(Debug, Error)]
pub enum StateIoError {
    #[error("state data is truncated ({actual} bytes, need at least {needed})")]
    Truncated { needed: usize, actual: usize },

    #[error("bad state magic {0:02X?}")]
    BadMagic([u8; 4]),

    #[error("unsupported state version {0}")]
    UnsupportedVersion(u32),

    #[error("failed to encode state: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("failed to decode state: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("state payload does not match this core: {0}")]
    Mismatch(String),
}

/// Host-supplied frame exchange data violates the call's preconditions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("surface pitch {pitch} does not match framebuffer width {fb_width}")]
    SurfacePitch { pitch: usize, fb_width: usize },

    #[error("surface height {height} is less than framebuffer height {fb_height}")]
    SurfaceHeight { height: usize, fb_height: usize },

    #[error("surface pixel buffer holds {actual} pixels, pitch x height needs {needed}")]
    SurfaceStorage { needed: usize, actual: usize },

    #[error("line width array has {actual} entries, framebuffer height is {fb_height}")]
    LineWidths { actual: usize, fb_height: usize },

    #[error("sound enabled with rate {rate} but no buffer capacity")]
    SoundBuffer { rate: f64 },

    #[error("sound rate {rate} is not a finite, non-negative number")]
    SoundRate { rate: f64 },

    #[error("core produced {produced} sound frames into a {capacity}-frame buffer")]
    SoundOverrun { produced: usize, capacity: usize },
}

