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

//! Removable media
//!
//! - [`MediaTopology`]: static catalog of drives, categories and media items
//! - [`MediaValidator`]: runtime drive state with transition legality rules
//! - [`TransitionQueue`]: defers requests to the next frame boundary
//! - [`SystemCommand`]: numeric host command codes

mod command;
mod queue;
mod topology;
mod validator;

pub use command::{SystemCommand, LAST_COMMAND_CODE, MAX_COMMAND_INDEX};
pub use queue::{TransitionQueue, TransitionResult};
pub use topology::{Drive, DriveState, MediaCategory, MediaItem, MediaTopology};
pub use validator::{DriveStatus, MediaValidator, TransitionRequest};
