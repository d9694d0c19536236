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

//! Drive state transition validation
//!
//! # State Machine
//!
//! States are the drive's declared [`DriveState`](super::DriveState)s. Any
//! state may be requested, subject to two rules:
//!
//! 1. A selected medium must belong to one of the drive's compatible
//!    categories.
//! 2. Going from a media-absent state to a media-present state requires the
//!    drive's `media_present_delay_ms` to have elapsed since it last left a
//!    media-present state.
//! 3. The selected medium may only change while the current state has
//!    `media_can_change` set.
//!
//! A rejected request leaves the drive untouched. Drives start in their
//! first media-absent state unless the host chooses otherwise at load time,
//! and never terminate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::topology::MediaTopology;
use crate::core::error::{ConfigurationError, MediaTransitionRejected};

/// Runtime state of one drive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveStatus {
    /// Index into the drive's declared states
    pub state: usize,
    /// Medium currently selected for the drive, if any
    pub media: Option<usize>,
    /// Orientation of the selected medium
    pub orientation: usize,
    /// Timestamp of the last accepted transition
    pub last_transition_ms: Option<u64>,
    /// Timestamp at which the drive last left a media-present state
    pub last_removal_ms: Option<u64>,
}

/// A requested drive change, as issued by the host's media dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    pub drive: usize,
    pub target_state: usize,
    pub media: Option<usize>,
    pub timestamp_ms: u64,
}

/// Owns the runtime status of every drive in a topology and enforces the
/// transition rules
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use corelink::core::media::{Drive, DriveState, MediaCategory, MediaItem, MediaTopology, MediaValidator};
///
/// let topology = Arc::new(
///     MediaTopology::new(
///         vec![Drive::new(
///             "fdd0",
///             vec![DriveState::absent("empty"), DriveState::present("loaded", true)],
///             vec![0],
///             2000,
///         )],
///         vec![MediaCategory::new("floppy")],
///         vec![MediaItem::new("Disk 1", 0)],
///     )
///     .unwrap(),
/// );
///
/// let mut media = MediaValidator::new(topology);
/// media.request_transition(0, 1, Some(0), 0).unwrap();
/// media.request_transition(0, 0, None, 100).unwrap();
/// // Too soon after removal
/// assert!(media.request_transition(0, 1, Some(0), 600).is_err());
/// assert!(media.request_transition(0, 1, Some(0), 2100).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct MediaValidator {
    topology: Arc<MediaTopology>,
    drives: Vec<DriveStatus>,
}

impl MediaValidator {
    /// Every drive starts in its first media-absent state (state 0 if it has none)
    pub fn new(topology: Arc<MediaTopology>) -> Self {
        let drives = topology
            .drives()
            .iter()
            .map(|d| DriveStatus {
                state: d.first_absent_state().unwrap_or(0),
                media: None,
                orientation: 0,
                last_transition_ms: None,
                last_removal_ms: None,
            })
            .collect();
        Self { topology, drives }
    }

    /// Host override of a drive's initial state and medium at load time
    ///
    /// Not subject to the transition rules, but the medium must still fit.
    pub fn set_initial(
        &mut self,
        drive: usize,
        state: usize,
        media: Option<usize>,
    ) -> Result<(), ConfigurationError> {
        let info = self.topology.drive(drive).ok_or_else(|| {
            ConfigurationError::InitialStateOutOfRange {
                drive: format!("#{}", drive),
                index: state,
            }
        })?;
        if state >= info.states.len() {
            return Err(ConfigurationError::InitialStateOutOfRange {
                drive: info.name.clone(),
                index: state,
            });
        }
        if let Some(m) = media {
            let category = self
                .topology
                .media_item(m)
                .map(|item| item.category)
                .unwrap_or(usize::MAX);
            if !info.accepts_category(category) {
                return Err(ConfigurationError::CategoryOutOfRange {
                    drive: info.name.clone(),
                    index: category,
                    count: self.topology.categories().len(),
                });
            }
        }

        let status = &mut self.drives[drive];
        status.state = state;
        status.media = media;
        status.orientation = 0;
        Ok(())
    }

    pub fn topology(&self) -> &Arc<MediaTopology> {
        &self.topology
    }

    /// Runtime status of `drive`
    pub fn status(&self, drive: usize) -> Option<&DriveStatus> {
        self.drives.get(drive)
    }

    pub fn statuses(&self) -> &[DriveStatus] {
        &self.drives
    }

    /// Replace every drive status, e.g. after loading a save state
    ///
    /// Statuses that do not fit the topology are refused as a whole.
    pub fn restore(&mut self, statuses: Vec<DriveStatus>) -> Result<(), MediaTransitionRejected> {
        if statuses.len() != self.drives.len() {
            return Err(MediaTransitionRejected::UnknownDrive(statuses.len()));
        }
        for (i, status) in statuses.iter().enumerate() {
            let drive = &self.topology.drives()[i];
            if status.state >= drive.states.len() {
                return Err(MediaTransitionRejected::UnknownState {
                    drive: drive.name.clone(),
                    state: status.state,
                });
            }
            if let Some(m) = status.media {
                let item = self
                    .topology
                    .media_item(m)
                    .ok_or(MediaTransitionRejected::UnknownMedia(m))?;
                if !drive.accepts_category(item.category) {
                    return Err(MediaTransitionRejected::IncompatibleMedia {
                        drive: drive.name.clone(),
                        media: item.name.clone(),
                        category: item.category,
                    });
                }
                if status.orientation >= item.orientations.len().max(1) {
                    return Err(MediaTransitionRejected::UnknownOrientation {
                        media: m,
                        orientation: status.orientation,
                    });
                }
            }
        }
        self.drives = statuses;
        Ok(())
    }

    /// Whether `drive` currently holds usable media
    pub fn media_usable(&self, drive: usize) -> bool {
        match (self.topology.drive(drive), self.drives.get(drive)) {
            (Some(d), Some(s)) => d.states[s.state].media_usable,
            _ => false,
        }
    }

    /// Apply a transition request
    pub fn apply(&mut self, request: &TransitionRequest) -> Result<(), MediaTransitionRejected> {
        self.request_transition(
            request.drive,
            request.target_state,
            request.media,
            request.timestamp_ms,
        )
    }

    /// Move `drive` to `target_state`, optionally selecting `media`
    ///
    /// `now_ms` is a monotonic host timestamp in milliseconds.
    ///
    /// # Errors
    ///
    /// - [`MediaTransitionRejected::UnknownDrive`] / [`MediaTransitionRejected::UnknownState`] /
    ///   [`MediaTransitionRejected::UnknownMedia`] for indices out of range
    /// - [`MediaTransitionRejected::IncompatibleMedia`] if the medium's category does not fit
    /// - [`MediaTransitionRejected::TooSoon`] if the absent-to-present delay has not elapsed
    /// - [`MediaTransitionRejected::MediaLocked`] if `media` differs from the loaded
    ///   medium and the current state does not allow a change
    pub fn request_transition(
        &mut self,
        drive: usize,
        target_state: usize,
        media: Option<usize>,
        now_ms: u64,
    ) -> Result<(), MediaTransitionRejected> {
        let info = self
            .topology
            .drive(drive)
            .ok_or(MediaTransitionRejected::UnknownDrive(drive))?;
        let status = &self.drives[drive];

        let target = info
            .states
            .get(target_state)
            .ok_or_else(|| MediaTransitionRejected::UnknownState {
                drive: info.name.clone(),
                state: target_state,
            })?;

        if let Some(m) = media {
            let item = self
                .topology
                .media_item(m)
                .ok_or(MediaTransitionRejected::UnknownMedia(m))?;
            if !info.accepts_category(item.category) {
                return Err(MediaTransitionRejected::IncompatibleMedia {
                    drive: info.name.clone(),
                    media: item.name.clone(),
                    category: item.category,
                });
            }
        }

        let current = &info.states[status.state];
        if media.is_some() && media != status.media && !current.media_can_change {
            return Err(MediaTransitionRejected::MediaLocked {
                drive: info.name.clone(),
                state: current.name.clone(),
            });
        }
        if !current.media_present && target.media_present {
            if let Some(removed_at) = status.last_removal_ms {
                let elapsed_ms = now_ms.saturating_sub(removed_at);
                if elapsed_ms < info.media_present_delay_ms as u64 {
                    return Err(MediaTransitionRejected::TooSoon {
                        drive: info.name.clone(),
                        elapsed_ms,
                        required_ms: info.media_present_delay_ms,
                    });
                }
            }
        }

        let leaving_present = current.media_present && !target.media_present;
        let status = &mut self.drives[drive];
        if leaving_present {
            status.last_removal_ms = Some(now_ms);
        }
        if media.is_some() && media != status.media {
            status.orientation = 0;
        }
        status.state = target_state;
        if media.is_some() {
            status.media = media;
        }
        status.last_transition_ms = Some(now_ms);
        Ok(())
    }

    /// Choose the medium for a drive without changing its state
    ///
    /// Used for "select disk" while the drive is open. Refused with
    /// [`MediaTransitionRejected::MediaLocked`] when the current state does
    /// not allow a media change.
    pub fn select_media(&mut self, drive: usize, media: usize) -> Result<(), MediaTransitionRejected> {
        let info = self
            .topology
            .drive(drive)
            .ok_or(MediaTransitionRejected::UnknownDrive(drive))?;
        let item = self
            .topology
            .media_item(media)
            .ok_or(MediaTransitionRejected::UnknownMedia(media))?;
        if !info.accepts_category(item.category) {
            return Err(MediaTransitionRejected::IncompatibleMedia {
                drive: info.name.clone(),
                media: item.name.clone(),
                category: item.category,
            });
        }
        let current = &info.states[self.drives[drive].state];
        if self.drives[drive].media != Some(media) && !current.media_can_change {
            return Err(MediaTransitionRejected::MediaLocked {
                drive: info.name.clone(),
                state: current.name.clone(),
            });
        }
        let status = &mut self.drives[drive];
        if status.media != Some(media) {
            status.orientation = 0;
        }
        status.media = Some(media);
        Ok(())
    }
}
