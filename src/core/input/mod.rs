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

//! Controller description and per-frame input state
//!
//! A core describes each controller it emulates declaratively:
//!
//! - [`InputFieldDescriptor`]: one input (button, switch, axis, ...)
//! - [`DeviceInputDescriptorSet`]: ordered fields plus the derived bit layout
//! - [`DeviceDescriptor`] / [`PortDescriptor`] / [`InputInfo`]: what can be
//!   plugged in where
//!
//! The host packs logical values into the layout with the codec methods on
//! [`DeviceInputDescriptorSet`] (or the [`InputState`] wrapper) and hands the
//! bytes to the core before each frame.
//!
//! Mutual exclusion and rotation references are validated here but applied
//! by the host's input mapping layer ([`RotationRemap`] and
//! `frontend::input`).

mod codec;
mod device;
mod field;
mod layout;
mod remap;

pub use codec::InputState;
pub use device::{DeviceDescriptor, DeviceFlags, InputInfo, PortDescriptor};
pub use field::{
    FieldFlags, InputFieldDescriptor, InputKind, Rotation, StatusState, SwitchPosition,
    BYTE_FIELD_BITS,
};
pub use layout::DeviceInputDescriptorSet;
pub use remap::RotationRemap;
