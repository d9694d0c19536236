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

//! Frontend module
//!
//! The host side of the core/host boundary: configuration, frame pacing,
//! input mapping, disk command dispatch and residual audio correction.
//!
//! # Architecture
//!
//! - [`Host`]: owns the per-frame buffers and drives a [`CoreSession`](crate::core::system::CoreSession)
//! - [`HostConfig`]: TOML host configuration
//! - [`InputMapper`]: physical keys to logical field values
//! - [`MediaDispatcher`]: disk commands to transition requests
//! - [`frame_timer`]: frame pacing from the core's refresh rate
//!
//! # Example
//!
//! ```
//! use corelink::core::system::{CoreSession, PatternCore};
//! use corelink::core::LogContext;
//! use corelink::frontend::{Host, HostConfig};
//!
//! let ctx = LogContext::new("corelink");
//! let core = PatternCore::new(&ctx).unwrap();
//! let mut host = Host::new(CoreSession::new(Box::new(core), ctx), HostConfig::default());
//! host.run_frame().unwrap();
//! ```

pub mod audio;
pub mod config;
pub mod frame_timer;
pub mod host;
pub mod input;
pub mod media;

pub use config::{HostConfig, InputConfig};
pub use frame_timer::FrameTimer;
pub use host::Host;
pub use input::InputMapper;
pub use media::MediaDispatcher;
