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

//! Explicit logging context
//!
//! Cores and sessions never reach for an ambient logger of their own. Each
//! entry point receives a [`LogContext`] that names the log target, and every
//! message goes through the `log` facade with that target attached. The
//! process installs the actual sink (env_logger in the binary) exactly once.

use std::fmt::Arguments;

use log::Level;

/// Log target handle threaded through core entry points
///
/// # Example
///
/// ```
/// use corelink::core::LogContext;
///
/// let ctx = LogContext::new("corelink::pattern");
/// ctx.info(format_args!("loaded {} media items", 3));
/// let drive_ctx = ctx.child("drive0");
/// assert_eq!(drive_ctx.target(), "corelink::pattern::drive0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    target: String,
}

impl LogContext {
    /// Create a context logging under `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Derive a nested context (`parent::name`)
    pub fn child(&self, name: &str) -> Self {
        Self {
            target: format!("{}::{}", self.target, name),
        }
    }

    /// Log target string
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Emit a record at `level`
    pub fn log(&self, level: Level, args: Arguments<'_>) {
        log::log!(target: self.target.as_str(), level, "{}", args);
    }

    #[inline]
    pub fn error(&self, args: Arguments<'_>) {
        self.log(Level::Error, args);
    }

    #[inline]
    pub fn warn(&self, args: Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    #[inline]
    pub fn info(&self, args: Arguments<'_>) {
        self.log(Level::Info, args);
    }

    #[inline]
    pub fn debug(&self, args: Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    #[inline]
    pub fn trace(&self, args: Arguments<'_>) {
        self.log(Level::Trace, args);
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new("corelink")
    }
}
