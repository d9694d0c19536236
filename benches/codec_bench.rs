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

//! Input codec benchmarks

use std::hint::black_box;
use std::sync::Arc;

use corelink::core::input::{DeviceInputDescriptorSet, InputFieldDescriptor, InputKind, InputState};
use corelink::core::system::gamepad_descriptors;
use criterion::{criterion_group, criterion_main, Criterion};

/// 64 buttons plus 8 byte-wide axes, a wide arcade panel
fn wide_panel() -> DeviceInputDescriptorSet {
    let mut fields: Vec<_> = (0..64)
        .map(|i| InputFieldDescriptor::button(&format!("b{}", i), &format!("Button {}", i), None))
        .collect();
    for i in 0..8 {
        fields.push(InputFieldDescriptor::new(
            &format!("axis{}", i),
            &format!("Axis {}", i),
            None,
            InputKind::XAxis,
        ));
    }
    DeviceInputDescriptorSet::new(fields).unwrap()
}

fn bench_gamepad(c: &mut Criterion) {
    let set = gamepad_descriptors().unwrap();
    let values = vec![1, 0, 1, 0, 1, 1, 0, 2, 1];
    let encoded = set.encode(&values).unwrap();

    c.bench_function("gamepad_encode", |b| {
        b.iter(|| set.encode(black_box(&values)).unwrap())
    });
    c.bench_function("gamepad_decode", |b| {
        b.iter(|| set.decode(black_box(&encoded)).unwrap())
    });
}

fn bench_wide_panel(c: &mut Criterion) {
    let set = Arc::new(wide_panel());
    let values: Vec<u32> = (0..set.len())
        .map(|i| if i < 64 { (i % 2) as u32 } else { 0x80 })
        .collect();
    let mut state = InputState::new(Arc::clone(&set));

    c.bench_function("wide_panel_set_all", |b| {
        b.iter(|| state.set_all(black_box(&values)).unwrap())
    });
    c.bench_function("wide_panel_field_by_name", |b| {
        b.iter(|| state.set(black_box("axis3"), black_box(0x40)).unwrap())
    });
}

criterion_group!(benches, bench_gamepad, bench_wide_panel);
criterion_main!(benches);
