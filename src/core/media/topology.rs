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

//! Removable media topology
//!
//! Static catalog of the drives a system has, the categories of media those
//! drives accept, and the concrete media items available for the loaded game.

use serde::Serialize;

use crate::core::error::ConfigurationError;

/// Classification of media (e.g. "3.5\" floppy", "CD")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaCategory {
    pub name: String,
}

impl MediaCategory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// One swappable medium (a disk image, a disc)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub name: String,
    /// Index into [`MediaTopology::categories`]
    pub category: usize,
    /// Physical orientations, e.g. disk sides; may be empty
    pub orientations: Vec<String>,
}

impl MediaItem {
    pub fn new(name: &str, category: usize) -> Self {
        Self {
            name: name.to_string(),
            category,
            orientations: Vec::new(),
        }
    }

    pub fn with_orientations(mut self, orientations: &[&str]) -> Self {
        self.orientations = orientations.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// One state a drive can be in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveState {
    pub name: String,
    pub media_present: bool,
    /// Usually equal to `media_present`; false for e.g. an open tray holding a disc
    pub media_usable: bool,
    pub media_can_change: bool,
}

impl DriveState {
    pub fn new(name: &str, media_present: bool, media_usable: bool, media_can_change: bool) -> Self {
        Self {
            name: name.to_string(),
            media_present,
            media_usable,
            media_can_change,
        }
    }

    /// Empty drive that accepts a new medium
    pub fn absent(name: &str) -> Self {
        Self::new(name, false, false, true)
    }

    /// Loaded, usable medium
    pub fn present(name: &str, media_can_change: bool) -> Self {
        Self::new(name, true, true, media_can_change)
    }
}

/// A physical drive/slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drive {
    pub name: String,
    pub states: Vec<DriveState>,
    /// Indices into [`MediaTopology::categories`]
    pub compatible_categories: Vec<usize>,
    /// Minimum milliseconds between a media-absent and a media-present state
    pub media_present_delay_ms: u32,
}

impl Drive {
    pub fn new(
        name: &str,
        states: Vec<DriveState>,
        compatible_categories: Vec<usize>,
        media_present_delay_ms: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            states,
            compatible_categories,
            media_present_delay_ms,
        }
    }

    /// Whether media of `category` fits this drive
    pub fn accepts_category(&self, category: usize) -> bool {
        self.compatible_categories.contains(&category)
    }

    /// First declared state without media
    pub fn first_absent_state(&self) -> Option<usize> {
        self.states.iter().position(|s| !s.media_present)
    }

    /// First declared state with media
    pub fn first_present_state(&self) -> Option<usize> {
        self.states.iter().position(|s| s.media_present)
    }

    /// Number of states claiming media is present
    pub fn present_state_count(&self) -> usize {
        self.states.iter().filter(|s| s.media_present).count()
    }
}

/// All drives, categories and media items for one emulated system
///
/// # Example
///
/// ```
/// use corelink::core::media::{Drive, DriveState, MediaCategory, MediaItem, MediaTopology};
///
/// let topology = MediaTopology::new(
///     vec![Drive::new(
///         "fdd0",
///         vec![DriveState::absent("empty"), DriveState::present("loaded", true)],
///         vec![0],
///         2000,
///     )],
///     vec![MediaCategory::new("floppy")],
///     vec![MediaItem::new("Disk 1", 0).with_orientations(&["Side A", "Side B"])],
/// )
/// .unwrap();
///
/// assert_eq!(topology.drives().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTopology {
    drives: Vec<Drive>,
    categories: Vec<MediaCategory>,
    media: Vec<MediaItem>,
}

impl MediaTopology {
    /// # Errors
    ///
    /// - [`ConfigurationError::NoDriveStates`] for a drive without states
    /// - [`ConfigurationError::CategoryOutOfRange`] for a bad drive category index
    /// - [`ConfigurationError::MediaCategoryOutOfRange`] for a bad media category index
    pub fn new(
        drives: Vec<Drive>,
        categories: Vec<MediaCategory>,
        media: Vec<MediaItem>,
    ) -> Result<Self, ConfigurationError> {
        let count = categories.len();

        for drive in &drives {
            if drive.states.is_empty() {
                return Err(ConfigurationError::NoDriveStates {
                    drive: drive.name.clone(),
                });
            }
            if let Some(&index) = drive.compatible_categories.iter().find(|&&c| c >= count) {
                return Err(ConfigurationError::CategoryOutOfRange {
                    drive: drive.name.clone(),
                    index,
                    count,
                });
            }
        }

        if let Some(item) = media.iter().find(|m| m.category >= count) {
            return Err(ConfigurationError::MediaCategoryOutOfRange {
                media: item.name.clone(),
                index: item.category,
                count,
            });
        }

        Ok(Self {
            drives,
            categories,
            media,
        })
    }

    #[inline]
    pub fn drives(&self) -> &[Drive] {
        &self.drives
    }

    #[inline]
    pub fn categories(&self) -> &[MediaCategory] {
        &self.categories
    }

    #[inline]
    pub fn media(&self) -> &[MediaItem] {
        &self.media
    }

    pub fn drive(&self, index: usize) -> Option<&Drive> {
        self.drives.get(index)
    }

    pub fn media_item(&self, index: usize) -> Option<&MediaItem> {
        self.media.get(index)
    }

    /// Drives with more than one media-present state
    ///
    /// This is allowed but unusual; registration logs a warning for each.
    pub fn multi_present_drives(&self) -> Vec<&str> {
        self.drives
            .iter()
            .filter(|d| d.present_state_count() > 1)
            .map(|d| d.name.as_str())
            .collect()
    }

    /// Media items a drive can accept
    pub fn compatible_media(&self, drive: usize) -> Vec<usize> {
        match self.drives.get(drive) {
            Some(d) => self
                .media
                .iter()
                .enumerate()
                .filter(|(_, m)| d.accepts_category(m.category))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Export as pretty JSON for an external media-management UI
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floppy_drive() -> Drive {
        Drive::new(
            "fdd0",
            vec![DriveState::absent("empty"), DriveState::present("loaded", true)],
            vec![0],
            2000,
        )
    }

    #[test]
    fn test_valid_topology() {
        let topology = MediaTopology::new(
            vec![floppy_drive()],
            vec![MediaCategory::new("floppy"), MediaCategory::new("tape")],
            vec![MediaItem::new("Disk 1", 0), MediaItem::new("Tape", 1)],
        )
        .unwrap();

        assert_eq!(topology.compatible_media(0), vec![0]);
        assert!(topology.multi_present_drives().is_empty());
        assert_eq!(topology.drive(0).unwrap().first_absent_state(), Some(0));
        assert_eq!(topology.drive(0).unwrap().first_present_state(), Some(1));
    }

    #[test]
    fn test_drive_category_out_of_range() {
        let mut drive = floppy_drive();
        drive.compatible_categories = vec![0, 3];
        let result = MediaTopology::new(vec![drive], vec![MediaCategory::new("floppy")], vec![]);
        assert_eq!(
            result,
            Err(ConfigurationError::CategoryOutOfRange {
                drive: "fdd0".to_string(),
                index: 3,
                count: 1,
            })
        );
    }

    #[test]
    fn test_media_category_out_of_range() {
        let result = MediaTopology::new(
            vec![floppy_drive()],
            vec![MediaCategory::new("floppy")],
            vec![MediaItem::new("Mystery", 1)],
        );
        assert!(matches!(
            result,
            Err(ConfigurationError::MediaCategoryOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_drive_without_states() {
        let drive = Drive::new("bad", vec![], vec![], 0);
        let result = MediaTopology::new(vec![drive], vec![], vec![]);
        assert!(matches!(
            result,
            Err(ConfigurationError::NoDriveStates { .. })
        ));
    }

    #[test]
    fn test_multiple_present_states_are_advisory() {
        let drive = Drive::new(
            "cd",
            vec![
                DriveState::absent("tray open"),
                DriveState::present("closed", false),
                DriveState::new("open with disc", true, false, true),
            ],
            vec![0],
            0,
        );
        let topology =
            MediaTopology::new(vec![drive], vec![MediaCategory::new("cd")], vec![]).unwrap();
        assert_eq!(topology.multi_present_drives(), vec!["cd"]);
    }

    #[test]
    fn test_orientations() {
        let item = MediaItem::new("Disk", 0).with_orientations(&["A", "B"]);
        assert_eq!(item.orientations, vec!["A".to_string(), "B".to_string()]);
        assert!(MediaItem::new("Cart", 0).orientations.is_empty());
    }
}
