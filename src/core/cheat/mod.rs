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

//! Cheat interface
//!
//! Cores expose raw memory access and read-substitution hooks through
//! [`CheatHooks`] and list the code grammars they understand as
//! [`CheatFormat`]s. Search and cheat management sit on top.

mod engine;
mod format;
mod patch;

pub use engine::{CheatEngine, CheatHooks, CheatInterface};
pub use format::{CheatFormat, RawHexFormat};
pub use patch::{MemoryPatch, PatchKind};
