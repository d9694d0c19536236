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

//! Core registry
//!
//! Cores are looked up by short name. Each entry carries a factory that
//! builds the core and its immutable descriptors.

use super::interface::Core;
use super::pattern::PatternCore;
use crate::core::error::ConfigurationError;
use crate::core::log_context::LogContext;

/// Factory signature for a registered core
pub type CoreFactory = fn(&LogContext) -> Result<Box<dyn Core>, ConfigurationError>;

/// A core the host can instantiate
pub struct CoreEntry {
    /// Name used to select the core (e.g. "pattern")
    pub name: &'static str,
    pub full_name: &'static str,
    pub create: CoreFactory,
}

fn create_pattern(ctx: &LogContext) -> Result<Box<dyn Core>, ConfigurationError> {
    Ok(Box::new(PatternCore::new(ctx)?))
}

static CORES: [CoreEntry; 1] = [CoreEntry {
    name: "pattern",
    full_name: "Pattern Generator",
    create: create_pattern,
}];

/// Every registered core
pub fn all() -> &'static [CoreEntry] {
    &CORES
}

/// Look up a core by name
pub fn find(name: &str) -> Option<&'static CoreEntry> {
    CORES.iter().find(|entry| entry.name == name)
}
