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

//! Frame-boundary transition queue
//!
//! Media requests can arrive at any time, but drive state may only change
//! between frames. Requests are parked here and resolved at the start of the
//! next frame exchange, at most one per drive.

use super::validator::{MediaValidator, TransitionRequest};
use crate::core::error::MediaTransitionRejected;
use crate::core::log_context::LogContext;

/// Outcome of one resolved request
pub type TransitionResult = (TransitionRequest, Result<(), MediaTransitionRejected>);

/// Pending transition per drive
#[derive(Debug, Clone, Default)]
pub struct TransitionQueue {
    pending: Vec<Option<TransitionRequest>>,
}

impl TransitionQueue {
    pub fn new(drive_count: usize) -> Self {
        Self {
            pending: vec![None; drive_count],
        }
    }

    /// Park a request; a newer request for the same drive replaces the older one
    ///
    /// Requests for drives that do not exist are rejected immediately.
    pub fn enqueue(
        &mut self,
        request: TransitionRequest,
        ctx: &LogContext,
    ) -> Result<(), MediaTransitionRejected> {
        let slot = self
            .pending
            .get_mut(request.drive)
            .ok_or(MediaTransitionRejected::UnknownDrive(request.drive))?;
        if let Some(old) = slot.replace(request) {
            ctx.debug(format_args!(
                "drive {}: request for state {} superseded by state {}",
                request.drive, old.target_state, request.target_state
            ));
        }
        Ok(())
    }

    /// Number of drives with a pending request
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|p| p.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Drop every pending request
    pub fn clear(&mut self) {
        self.pending.iter_mut().for_each(|p| *p = None);
    }

    /// Resolve every pending request against `media`
    ///
    /// Call exactly once at the start of a frame exchange.
    pub fn resolve(&mut self, media: &mut MediaValidator, ctx: &LogContext) -> Vec<TransitionResult> {
        let mut results = Vec::new();
        for slot in &mut self.pending {
            if let Some(request) = slot.take() {
                let result = media.apply(&request);
                match &result {
                    Ok(()) => ctx.info(format_args!(
                        "drive {} -> state {} (media {:?})",
                        request.drive, request.target_state, request.media
                    )),
                    Err(e) => ctx.warn(format_args!("drive {}: {}", request.drive, e)),
                }
                results.push((request, result));
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::media::topology::{Drive, DriveState, MediaCategory, MediaItem, MediaTopology};
    use std::sync::Arc;

    fn two_drives() -> MediaValidator {
        let drive = |name: &str| {
            Drive::new(
                name,
                vec![DriveState::absent("empty"), DriveState::present("loaded", true)],
                vec![0],
                1000,
            )
        };
        let topology = MediaTopology::new(
            vec![drive("a"), drive("b")],
            vec![MediaCategory::new("disk")],
            vec![MediaItem::new("Disk", 0)],
        )
        .unwrap();
        MediaValidator::new(Arc::new(topology))
    }

    fn request(drive: usize, target_state: usize, timestamp_ms: u64) -> TransitionRequest {
        TransitionRequest {
            drive,
            target_state,
            media: Some(0),
            timestamp_ms,
        }
    }

    #[test]
    fn test_nothing_applies_until_resolved() {
        let ctx = LogContext::default();
        let mut media = two_drives();
        let mut queue = TransitionQueue::new(2);

        queue.enqueue(request(0, 1, 0), &ctx).unwrap();
        assert_eq!(media.status(0).unwrap().state, 0);
        assert_eq!(queue.pending(), 1);

        let results = queue.resolve(&mut media, &ctx);
        assert_eq!(results.len(), 1);
        assert!(results[0].1.is_ok());
        assert_eq!(media.status(0).unwrap().state, 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_at_most_one_per_drive() {
        let ctx = LogContext::default();
        let mut media = two_drives();
        let mut queue = TransitionQueue::new(2);

        queue.enqueue(request(0, 1, 0), &ctx).unwrap();
        queue.enqueue(request(0, 0, 5), &ctx).unwrap();
        queue.enqueue(request(1, 1, 5), &ctx).unwrap();

        let results = queue.resolve(&mut media, &ctx);
        assert_eq!(results.len(), 2);
        // Newest request for drive 0 won
        assert_eq!(media.status(0).unwrap().state, 0);
        assert_eq!(media.status(1).unwrap().state, 1);
    }

    #[test]
    fn test_rejections_are_reported() {
        let ctx = LogContext::default();
        let mut media = two_drives();
        let mut queue = TransitionQueue::new(2);

        queue.enqueue(request(0, 1, 0), &ctx).unwrap();
        queue.resolve(&mut media, &ctx);
        queue.enqueue(request(0, 0, 10), &ctx).unwrap();
        queue.resolve(&mut media, &ctx);
        queue.enqueue(request(0, 1, 20), &ctx).unwrap();

        let results = queue.resolve(&mut media, &ctx);
        assert!(matches!(
            results[0].1,
            Err(MediaTransitionRejected::TooSoon { .. })
        ));
    }

    #[test]
    fn test_unknown_drive_rejected_on_enqueue() {
        let ctx = LogContext::default();
        let mut queue = TransitionQueue::new(1);
        assert_eq!(
            queue.enqueue(request(4, 0, 0), &ctx),
            Err(MediaTransitionRejected::UnknownDrive(4))
        );
    }
}
