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

//! Host command codes
//!
//! | Code        | Command                  |
//! |-------------|--------------------------|
//! | 0x01        | Reset                    |
//! | 0x02        | Power                    |
//! | 0x07        | Insert coin              |
//! | 0x10..=0x1F | Toggle DIP switch n      |
//! | 0x20..=0x2F | Insert disk n            |
//! | 0x30        | Insert disk              |
//! | 0x31        | Eject disk               |
//! | 0x32        | Select disk              |
//!
//! What "disk n" means is up to the core; the media dispatcher treats it as
//! a media item index.

use std::fmt;

/// Highest valid command code
pub const LAST_COMMAND_CODE: u8 = 0x3F;

/// DIP switches and disk indices are carried in the low nibble of the code
pub const MAX_COMMAND_INDEX: u8 = 0x0F;

/// A stimulus the host sends to a core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemCommand {
    Reset,
    Power,
    InsertCoin,
    ToggleDip(u8),
    InsertDiskIndex(u8),
    InsertDisk,
    EjectDisk,
    SelectDisk,
}

impl SystemCommand {
    /// Numeric command code
    ///
    /// `None` for a DIP switch or disk index above [`MAX_COMMAND_INDEX`],
    /// which has no code.
    pub fn code(self) -> Option<u8> {
        match self {
            SystemCommand::Reset => Some(0x01),
            SystemCommand::Power => Some(0x02),
            SystemCommand::InsertCoin => Some(0x07),
            SystemCommand::ToggleDip(n) if n <= MAX_COMMAND_INDEX => Some(0x10 + n),
            SystemCommand::InsertDiskIndex(n) if n <= MAX_COMMAND_INDEX => Some(0x20 + n),
            SystemCommand::ToggleDip(_) | SystemCommand::InsertDiskIndex(_) => None,
            SystemCommand::InsertDisk => Some(0x30),
            SystemCommand::EjectDisk => Some(0x31),
            SystemCommand::SelectDisk => Some(0x32),
        }
    }

    /// Decode a command code, `None` for unassigned codes
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(SystemCommand::Reset),
            0x02 => Some(SystemCommand::Power),
            0x07 => Some(SystemCommand::InsertCoin),
            0x10..=0x1F => Some(SystemCommand::ToggleDip(code - 0x10)),
            0x20..=0x2F => Some(SystemCommand::InsertDiskIndex(code - 0x20)),
            0x30 => Some(SystemCommand::InsertDisk),
            0x31 => Some(SystemCommand::EjectDisk),
            0x32 => Some(SystemCommand::SelectDisk),
            _ => None,
        }
    }

    /// True for the commands that concern removable media
    pub fn is_media_command(self) -> bool {
        matches!(
            self,
            SystemCommand::InsertDiskIndex(_)
                | SystemCommand::InsertDisk
                | SystemCommand::EjectDisk
                | SystemCommand::SelectDisk
        )
    }
}

impl fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemCommand::Reset => write!(f, "reset"),
            SystemCommand::Power => write!(f, "power"),
            SystemCommand::InsertCoin => write!(f, "insert coin"),
            SystemCommand::ToggleDip(n) => write!(f, "toggle DIP {}", n),
            SystemCommand::InsertDiskIndex(n) => write!(f, "insert disk {}", n),
            SystemCommand::InsertDisk => write!(f, "insert disk"),
            SystemCommand::EjectDisk => write!(f, "eject disk"),
            SystemCommand::SelectDisk => write!(f, "select disk"),
        }
    }
}
