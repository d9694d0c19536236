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

//! Core session
//!
//! Wraps a [`Core`] with the host-side machinery that must run around every
//! frame: contract checks, the media transition queue and active cheats.

use std::sync::Arc;

use super::interface::Core;
use super::state::StateMedium;
use crate::core::cheat::{CheatEngine, MemoryPatch};
use crate::core::error::{CheatDecodeError, ContractViolation, MediaTransitionRejected, StateIoError};
use crate::core::frame::{FrameExchange, SystemProfile};
use crate::core::log_context::LogContext;
use crate::core::media::{SystemCommand, TransitionQueue, TransitionRequest, TransitionResult};

/// What happened at the start of a frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Frame number, counting from 1
    pub frame: u64,
    /// Media requests resolved before the core ran
    pub transitions: Vec<TransitionResult>,
}

/// A loaded core plus its per-frame host state
///
/// # Example
///
/// ```
/// use corelink::core::frame::{FrameExchange, PixelFormat, Surface};
/// use corelink::core::system::{CoreSession, PatternCore};
/// use corelink::core::LogContext;
///
/// let ctx = LogContext::new("corelink::example");
/// let core = PatternCore::new(&ctx).unwrap();
/// let mut session = CoreSession::new(Box::new(core), ctx);
///
/// let profile = session.profile();
/// let mut surface = Surface::new(profile.fb_width, profile.fb_height, PixelFormat::XRGB8888);
/// let mut exchange = FrameExchange::new(&mut surface, &[]);
/// let report = session.run_frame(&mut exchange).unwrap();
/// assert_eq!(report.frame, 1);
/// ```
pub struct CoreSession {
    core: Box<dyn Core>,
    queue: TransitionQueue,
    cheats: CheatEngine,
    ctx: LogContext,
    frames: u64,
}

impl CoreSession {
    pub fn new(core: Box<dyn Core>, ctx: LogContext) -> Self {
        let drives = core
            .media()
            .map(|media| media.topology().drives().len())
            .unwrap_or(0);
        if let Some(topology) = &core.profile().topology {
            for name in topology.multi_present_drives() {
                ctx.warn(format_args!(
                    "drive '{}' declares more than one media-present state",
                    name
                ));
            }
        }
        ctx.info(format_args!(
            "session started for '{}' ({} port(s), {} drive(s))",
            core.profile().short_name,
            core.input_info().ports.len(),
            drives
        ));

        Self {
            core,
            queue: TransitionQueue::new(drives),
            cheats: CheatEngine::new(),
            ctx,
            frames: 0,
        }
    }

    pub fn core(&self) -> &dyn Core {
        self.core.as_ref()
    }

    pub fn core_mut(&mut self) -> &mut dyn Core {
        self.core.as_mut()
    }

    pub fn profile(&self) -> Arc<SystemProfile> {
        Arc::clone(self.core.profile())
    }

    #[inline]
    pub fn context(&self) -> &LogContext {
        &self.ctx
    }

    /// Frames run so far
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Queue a drive change for the next frame boundary
    pub fn queue_transition(
        &mut self,
        request: TransitionRequest,
    ) -> Result<(), MediaTransitionRejected> {
        self.queue.enqueue(request, &self.ctx)
    }

    pub fn pending_transitions(&self) -> usize {
        self.queue.pending()
    }

    /// Forward a non-media command to the core
    pub fn command(&mut self, command: SystemCommand) -> bool {
        self.core.command(command, &self.ctx)
    }

    pub fn cheats(&self) -> &CheatEngine {
        &self.cheats
    }

    /// Decode `code` with the core's formats and activate it
    pub fn add_cheat(&mut self, code: &str) -> Result<MemoryPatch, CheatDecodeError> {
        let patch = self.core.cheat_interface().decode(code)?;
        self.ctx.info(format_args!(
            "cheat '{}' -> {:06X} = {:X}",
            code, patch.address, patch.value
        ));
        self.cheats.add(patch);
        Ok(patch)
    }

    /// Deactivate every cheat and unhook read substitutions
    pub fn clear_cheats(&mut self) {
        self.cheats.remove_all();
        if let Some(hooks) = self.core.cheat_hooks() {
            self.cheats.clear(hooks);
        }
    }

    /// Run one frame
    ///
    /// Checks the host buffers, resolves queued media transitions, applies
    /// cheats, runs the core, then checks what the core produced.
    ///
    /// # Errors
    ///
    /// A [`ContractViolation`] if the host buffers do not fit the profile
    /// (the core is not run) or the core overran the sound buffer.
    pub fn run_frame<'a>(
        &'a mut self,
        exchange: &mut FrameExchange<'a>,
    ) -> Result<FrameReport, ContractViolation> {
        let profile = Arc::clone(self.core.profile());
        if let Err(violation) = exchange.check_preconditions(&profile) {
            self.ctx.error(format_args!("refusing to run frame: {}", violation));
            return Err(violation);
        }

        let transitions = match self.core.media_mut() {
            Some(media) => self.queue.resolve(media, &self.ctx),
            None => Vec::new(),
        };

        if !self.cheats.patches().is_empty() {
            if let Some(hooks) = self.core.cheat_hooks() {
                self.cheats.apply(hooks, &self.ctx);
            }
        }

        exchange.reset_outputs();
        self.core.emulate(exchange, &self.ctx);
        self.frames += 1;

        if let Err(violation) = exchange.check_postconditions() {
            self.ctx.error(format_args!("core broke the frame contract: {}", violation));
            return Err(violation);
        }

        Ok(FrameReport {
            frame: self.frames,
            transitions,
        })
    }

    /// Full save state, header included
    pub fn save_state(&mut self) -> Result<Vec<u8>, StateIoError> {
        let mut medium = StateMedium::new();
        self.core.state_action(&mut medium, false, false, &self.ctx)?;
        Ok(medium.into_bytes())
    }

    /// Load a full save state; on failure nothing changes
    ///
    /// Transitions queued before a successful load are discarded.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateIoError> {
        let mut medium = StateMedium::from_bytes(bytes.to_vec());
        match self.core.state_action(&mut medium, true, false, &self.ctx) {
            Ok(()) => {
                self.queue.clear();
                Ok(())
            }
            Err(e) => {
                self.ctx.warn(format_args!("state load failed: {}", e));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::{PixelFormat, Surface};
    use crate::core::system::PatternCore;

    fn session() -> CoreSession {
        let ctx = LogContext::new("corelink::test");
        let core = PatternCore::new(&ctx).unwrap();
        CoreSession::new(Box::new(core), ctx)
    }

    fn surface(session: &CoreSession) -> Surface {
        let profile = session.profile();
        Surface::new(profile.fb_width, profile.fb_height, PixelFormat::XRGB8888)
    }

    #[test]
    fn test_bad_surface_does_not_run_core() {
        let mut session = session();
        let mut small = Surface::new(10, 10, PixelFormat::XRGB8888);
        let mut exchange = FrameExchange::new(&mut small, &[]);
        assert!(matches!(
            session.run_frame(&mut exchange),
            Err(ContractViolation::SurfacePitch { .. })
        ));
        drop(exchange);
        assert_eq!(session.frames(), 0);
    }

    #[test]
    fn test_transitions_resolve_at_frame_start() {
        let mut session = session();
        let mut surface = surface(&session);
        session
            .queue_transition(TransitionRequest {
                drive: 0,
                target_state: 1,
                media: Some(0),
                timestamp_ms: 0,
            })
            .unwrap();
        assert_eq!(session.pending_transitions(), 1);
        assert!(!session.core().media().unwrap().media_usable(0));

        let mut exchange = FrameExchange::new(&mut surface, &[]);
        let report = session.run_frame(&mut exchange).unwrap();
        assert_eq!(report.transitions.len(), 1);
        assert!(report.transitions[0].1.is_ok());
        drop(exchange);

        assert!(session.core().media().unwrap().media_usable(0));
        assert_eq!(session.pending_transitions(), 0);
    }

    #[test]
    fn test_cheats_apply_each_frame() {
        let mut session = session();
        let mut surface = surface(&session);
        session.add_cheat("000040:99").unwrap();
        assert!(session.add_cheat("garbage").is_err());

        let mut exchange = FrameExchange::new(&mut surface, &[]);
        session.run_frame(&mut exchange).unwrap();
        drop(exchange);

        let hooks = session.core_mut().cheat_hooks().unwrap();
        assert_eq!(hooks.mem_read(0x40), 0x99);
        session.clear_cheats();
        assert!(session.cheats().patches().is_empty());
    }

    #[test]
    fn test_failed_load_keeps_state_and_queue() {
        let mut session = session();
        let saved = session.save_state().unwrap();
        session
            .queue_transition(TransitionRequest {
                drive: 0,
                target_state: 1,
                media: Some(1),
                timestamp_ms: 0,
            })
            .unwrap();

        assert!(session.load_state(&saved[..saved.len() - 4]).is_err());
        assert_eq!(session.pending_transitions(), 1);

        session.load_state(&saved).unwrap();
        assert_eq!(session.pending_transitions(), 0);
    }
}
