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

//! Cores and the host-side session around them
//!
//! [`Core`] is the contract an emulated system implements. [`CoreSession`]
//! drives a core frame by frame, and [`registry`] lists the cores the host
//! can load.

mod interface;
mod pattern;
pub mod registry;
mod session;
mod state;

pub use interface::Core;
pub use pattern::{
    gamepad_descriptors, PatternCore, CYCLES_PER_FRAME, DISK_SWAP_DELAY_MS, MASTER_CLOCK_HZ,
    PATTERN_HEIGHT, PATTERN_WIDTH,
};
pub use registry::{CoreEntry, CoreFactory};
pub use session::{CoreSession, FrameReport};
pub use state::{
    load_snapshot, save_snapshot, StateHeader, StateMedium, STATE_HEADER_SIZE, STATE_MAGIC,
    STATE_VERSION,
};
