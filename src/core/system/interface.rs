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

//! The contract every emulation core implements

use std::sync::Arc;

use super::state::StateMedium;
use crate::core::cheat::{CheatHooks, CheatInterface};
use crate::core::error::StateIoError;
use crate::core::frame::{FrameExchange, SystemProfile};
use crate::core::input::InputInfo;
use crate::core::log_context::LogContext;
use crate::core::media::{MediaValidator, SystemCommand};

/// An emulated system as seen by the host
///
/// Calls are single-threaded and never overlap: one `emulate` at a time,
/// and `state_action` only between frames.
pub trait Core {
    /// Static description of the loaded system
    fn profile(&self) -> &Arc<SystemProfile>;

    /// Ports and the devices each accepts
    fn input_info(&self) -> &Arc<InputInfo>;

    /// Code formats this system decodes
    fn cheat_interface(&self) -> &CheatInterface;

    /// Memory hooks for cheats, `None` if unsupported
    fn cheat_hooks(&mut self) -> Option<&mut dyn CheatHooks>;

    /// Runtime drive state, `None` for systems without removable media
    fn media(&self) -> Option<&MediaValidator>;

    fn media_mut(&mut self) -> Option<&mut MediaValidator>;

    /// Run one frame
    ///
    /// The core may substitute its own sample buffer for this call; `'a`
    /// keeps the core borrowed until the host is done with the exchange.
    fn emulate<'a>(&'a mut self, exchange: &mut FrameExchange<'a>, ctx: &LogContext);

    /// Save into or load from `medium`
    ///
    /// `data_only` states skip the header and are meant for rewind/netplay.
    ///
    /// # Errors
    ///
    /// Any [`StateIoError`]. A failed load leaves the core exactly as it was.
    fn state_action(
        &mut self,
        medium: &mut StateMedium,
        load: bool,
        data_only: bool,
        ctx: &LogContext,
    ) -> Result<(), StateIoError>;

    /// Handle a non-media host command; returns false if unsupported
    fn command(&mut self, command: SystemCommand, ctx: &LogContext) -> bool;
}
