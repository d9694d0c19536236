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

//! Core side of the core/host boundary
//!
//! - [`input`]: input descriptors, bit layout and state codec
//! - [`media`]: drive topology and transition validation
//! - [`frame`]: system profile and the per-frame exchange
//! - [`cheat`]: cheat code formats and memory patching
//! - [`system`]: the [`system::Core`] trait, save states and sessions

pub mod cheat;
pub mod error;
pub mod frame;
pub mod input;
pub mod log_context;
pub mod media;
pub mod system;

pub use error::{CoreError, Result};
pub use log_context::LogContext;
