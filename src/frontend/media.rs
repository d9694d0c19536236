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

//! Disk command dispatch
//!
//! Turns the host's disk commands into [`TransitionRequest`]s for one drive.
//! Which medium goes in next is a host-side choice, tracked here until an
//! insert commits it.

use std::sync::Arc;

use crate::core::error::MediaTransitionRejected;
use crate::core::media::{MediaTopology, SystemCommand, TransitionRequest};

/// Disk command handler for a single drive
pub struct MediaDispatcher {
    topology: Arc<MediaTopology>,
    drive: usize,
    /// Media items the drive accepts, in topology order
    compatible: Vec<usize>,
    /// Position in `compatible` of the selected medium
    selected: usize,
}

impl MediaDispatcher {
    /// # Errors
    ///
    /// [`MediaTransitionRejected::UnknownDrive`] if `drive` is not in the topology
    pub fn new(topology: Arc<MediaTopology>, drive: usize) -> Result<Self, MediaTransitionRejected> {
        if topology.drive(drive).is_none() {
            return Err(MediaTransitionRejected::UnknownDrive(drive));
        }
        let compatible = topology.compatible_media(drive);
        Ok(Self {
            topology,
            drive,
            compatible,
            selected: 0,
        })
    }

    #[inline]
    pub fn drive(&self) -> usize {
        self.drive
    }

    /// Media index the next insert will use
    pub fn selected_media(&self) -> Option<usize> {
        self.compatible.get(self.selected).copied()
    }

    /// Select the `n`th compatible medium
    pub fn select(&mut self, n: usize) -> Result<(), MediaTransitionRejected> {
        if n >= self.compatible.len() {
            return Err(MediaTransitionRejected::UnknownMedia(n));
        }
        self.selected = n;
        Ok(())
    }

    /// Advance the selection, wrapping around
    pub fn select_next(&mut self) {
        if !self.compatible.is_empty() {
            self.selected = (self.selected + 1) % self.compatible.len();
        }
    }

    /// Request for the drive's first media-absent state
    pub fn eject(&self, now_ms: u64) -> Option<TransitionRequest> {
        let info = self.topology.drive(self.drive)?;
        Some(TransitionRequest {
            drive: self.drive,
            target_state: info.first_absent_state()?,
            media: None,
            timestamp_ms: now_ms,
        })
    }

    /// Request for the drive's first media-present state with the selection
    pub fn insert(&self, now_ms: u64) -> Option<TransitionRequest> {
        let info = self.topology.drive(self.drive)?;
        Some(TransitionRequest {
            drive: self.drive,
            target_state: info.first_present_state()?,
            media: Some(self.selected_media()?),
            timestamp_ms: now_ms,
        })
    }

    /// Handle a disk command
    ///
    /// # Returns
    ///
    /// The request to queue, or `None` when the command only changes the
    /// selection, is not a disk command, or the drive has no matching state.
    pub fn dispatch(&mut self, command: SystemCommand, now_ms: u64) -> Option<TransitionRequest> {
        let request = match command {
            SystemCommand::EjectDisk => self.eject(now_ms),
            SystemCommand::InsertDisk => self.insert(now_ms),
            SystemCommand::SelectDisk => {
                self.select_next();
                log::debug!(
                    "drive {} selected media {:?}",
                    self.drive,
                    self.selected_media()
                );
                None
            }
            SystemCommand::InsertDiskIndex(n) => match self.select(n as usize) {
                Ok(()) => self.insert(now_ms),
                Err(e) => {
                    log::warn!("Ignoring {}: {}", command, e);
                    None
                }
            },
            _ => None,
        };
        if request.is_none() && command.is_media_command() {
            log::debug!("{} produced no transition for drive {}", command, self.drive);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::{Drive, DriveState, MediaCategory, MediaItem};

    fn topology() -> Arc<MediaTopology> {
        Arc::new(
            MediaTopology::new(
                vec![Drive::new(
                    "fdd",
                    vec![
                        DriveState::absent("Ejected"),
                        DriveState::present("Inserted", true),
                    ],
                    vec![1],
                    500,
                )],
                vec![MediaCategory::new("Tape"), MediaCategory::new("Floppy")],
                vec![
                    MediaItem::new("Tape 1", 0),
                    MediaItem::new("Disk 1", 1),
                    MediaItem::new("Disk 2", 1),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_unknown_drive() {
        assert!(matches!(
            MediaDispatcher::new(topology(), 3),
            Err(MediaTransitionRejected::UnknownDrive(3))
        ));
    }

    #[test]
    fn test_insert_uses_compatible_media() {
        let mut dispatcher = MediaDispatcher::new(topology(), 0).unwrap();
        let request = dispatcher.dispatch(SystemCommand::InsertDisk, 10).unwrap();
        assert_eq!(request.target_state, 1);
        assert_eq!(request.media, Some(1));
        assert_eq!(request.timestamp_ms, 10);
    }

    #[test]
    fn test_eject() {
        let mut dispatcher = MediaDispatcher::new(topology(), 0).unwrap();
        let request = dispatcher.dispatch(SystemCommand::EjectDisk, 0).unwrap();
        assert_eq!(request.target_state, 0);
        assert_eq!(request.media, None);
    }

    #[test]
    fn test_select_wraps_without_request() {
        let mut dispatcher = MediaDispatcher::new(topology(), 0).unwrap();
        assert!(dispatcher.dispatch(SystemCommand::SelectDisk, 0).is_none());
        assert_eq!(dispatcher.selected_media(), Some(2));
        dispatcher.dispatch(SystemCommand::SelectDisk, 0);
        assert_eq!(dispatcher.selected_media(), Some(1));
    }

    #[test]
    fn test_insert_by_index() {
        let mut dispatcher = MediaDispatcher::new(topology(), 0).unwrap();
        let request = dispatcher
            .dispatch(SystemCommand::InsertDiskIndex(1), 0)
            .unwrap();
        assert_eq!(request.media, Some(2));
        assert!(dispatcher
            .dispatch(SystemCommand::InsertDiskIndex(5), 0)
            .is_none());
        assert_eq!(dispatcher.selected_media(), Some(2));
    }

    #[test]
    fn test_non_disk_commands_ignored() {
        let mut dispatcher = MediaDispatcher::new(topology(), 0).unwrap();
        assert!(dispatcher.dispatch(SystemCommand::Reset, 0).is_none());
    }
}
