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

//! corelink: the contract between an emulation core and its host
//!
//! A core describes its controllers, removable media and output format with
//! static descriptors. The host uses them to build input buffers, validate
//! disk swaps and supply video/audio buffers every frame.
//!
//! # Architecture
//!
//! - [`core`]: descriptors, codecs, validators and the [`core::system::Core`] trait
//! - [`frontend`]: the host side (configuration, input mapping, frame loop)
//!
//! # Example
//!
//! ```
//! use corelink::core::system::{registry, CoreSession};
//! use corelink::core::LogContext;
//!
//! let ctx = LogContext::new("corelink");
//! let entry = registry::find("pattern").unwrap();
//! let core = (entry.create)(&ctx)?;
//! let session = CoreSession::new(core, ctx);
//! assert_eq!(session.profile().short_name, "pattern");
//! # Ok::<(), corelink::CoreError>(())
//! ```
//!
//! # Error Handling
//!
//! Each concern has its own error enum in [`core::error`]; all convert into
//! [`CoreError`], and [`Result<T>`] is an alias for `Result<T, CoreError>`.

pub mod core;
pub mod frontend;

// Re-export commonly used types
pub use core::error::{CoreError, Result};
