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

//! End-to-end frame exchange tests against the pattern core

use corelink::core::error::ContractViolation;
use corelink::core::frame::{FrameExchange, MidSyncSink, PixelFormat, SoundBuffer, Surface};
use corelink::core::input::InputState;
use corelink::core::media::{SystemCommand, TransitionRequest};
use corelink::core::system::{CoreSession, PatternCore, CYCLES_PER_FRAME};
use corelink::core::LogContext;
use std::sync::Arc;

fn session() -> CoreSession {
    let ctx = LogContext::new("corelink::it");
    let core = PatternCore::new(&ctx).unwrap();
    CoreSession::new(Box::new(core), ctx)
}

fn make_surface(session: &CoreSession) -> Surface {
    let profile = session.profile();
    Surface::new(profile.fb_width, profile.fb_height, PixelFormat::XRGB8888)
}

#[derive(Default)]
struct Collector {
    samples: Vec<i16>,
    calls: usize,
}

impl MidSyncSink for Collector {
    fn partial_audio(&mut self, samples: &[i16]) {
        self.samples.extend_from_slice(samples);
        self.calls += 1;
    }
}

#[test]
fn test_first_frame_reports_format_change() {
    let mut session = session();
    let mut surface = make_surface(&session);
    let mut samples = vec![0i16; 2 * 2048];

    {
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.set_sound(&mut samples, 48000.0, 2);
        session.run_frame(&mut exchange).unwrap();
        assert!(exchange.video_format_changed);
        assert!(exchange.sound_format_changed);
        assert_eq!(exchange.master_cycles, CYCLES_PER_FRAME);
        assert!(exchange.display_rect.w > 0);
    }
    {
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.set_sound(&mut samples, 48000.0, 2);
        session.run_frame(&mut exchange).unwrap();
        assert!(!exchange.video_format_changed);
        assert!(!exchange.sound_format_changed);
    }
    {
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.set_sound(&mut samples, 44100.0, 2);
        session.run_frame(&mut exchange).unwrap();
        assert!(exchange.sound_format_changed);
    }
}

#[test]
fn test_audio_stays_within_capacity() {
    let mut session = session();
    let mut surface = make_surface(&session);
    let mut samples = vec![0i16; 2 * 64];

    let mut exchange = FrameExchange::new(&mut surface, &[]);
    exchange.set_sound(&mut samples, 96000.0, 2);
    session.run_frame(&mut exchange).unwrap();
    assert!(exchange.sound_frames <= exchange.sound_capacity());
    assert!(exchange.sound_frames_at_sync <= exchange.sound_frames);
}

#[test]
fn test_mid_sync_delivers_first_part() {
    let mut session = session();
    let mut surface = make_surface(&session);
    let mut samples = vec![0i16; 2 * 2048];
    let mut collector = Collector::default();

    let (frames, at_sync) = {
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.set_sound(&mut samples, 48000.0, 2);
        exchange.mid_sync_sink = Some(&mut collector);
        session.run_frame(&mut exchange).unwrap();
        (exchange.sound_frames, exchange.sound_frames_at_sync)
    };

    assert!(at_sync > 0 && at_sync < frames);
    assert_eq!(collector.calls, 1);
    assert_eq!(collector.samples.len(), at_sync * 2);
    assert_eq!(&collector.samples[..], &samples[..at_sync * 2]);
}

#[test]
fn test_sound_disabled_produces_nothing() {
    let mut session = session();
    let mut surface = make_surface(&session);

    let mut exchange = FrameExchange::new(&mut surface, &[]);
    session.run_frame(&mut exchange).unwrap();
    assert_eq!(exchange.sound_frames, 0);
    assert!(matches!(exchange.sound, SoundBuffer::Disabled));
}

#[test]
fn test_preconditions_fail_loudly() {
    let mut session = session();
    let profile = session.profile();

    let mut short = Surface::new(profile.fb_width, profile.fb_height - 1, PixelFormat::XRGB8888);
    let mut exchange = FrameExchange::new(&mut short, &[]);
    assert!(matches!(
        session.run_frame(&mut exchange),
        Err(ContractViolation::SurfaceHeight { .. })
    ));
    drop(exchange);

    let mut surface = make_surface(&session);
    let mut widths = vec![0u32; 3];
    let mut exchange = FrameExchange::new(&mut surface, &[]);
    exchange.line_widths = Some(&mut widths[..]);
    assert!(matches!(
        session.run_frame(&mut exchange),
        Err(ContractViolation::LineWidths { .. })
    ));
    drop(exchange);

    let mut surface = make_surface(&session);
    let mut exchange = FrameExchange::new(&mut surface, &[]);
    exchange.sound_rate = f64::NAN;
    assert!(matches!(
        session.run_frame(&mut exchange),
        Err(ContractViolation::SoundRate { .. })
    ));
    drop(exchange);

    assert_eq!(session.frames(), 0);
}

#[test]
fn test_input_is_read_through_descriptors() {
    let mut session = session();
    let mut surface = make_surface(&session);
    let descriptors = Arc::clone(&session.core().input_info().ports[0].default_device().input);
    let mut state = InputState::new(descriptors);
    state.set("mode", 2).unwrap();
    let input = [state];

    let mut exchange = FrameExchange::new(&mut surface, &input);
    session.run_frame(&mut exchange).unwrap();
    drop(exchange);

    // solid mode paints a single gray
    let a = surface.pixel(0, 100).unwrap();
    let b = surface.pixel(200, 100).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_disk_swap_honours_delay() {
    let mut session = session();
    let insert = |media, ms| TransitionRequest {
        drive: 0,
        target_state: 1,
        media: Some(media),
        timestamp_ms: ms,
    };
    let eject = |ms| TransitionRequest {
        drive: 0,
        target_state: 0,
        media: None,
        timestamp_ms: ms,
    };

    fn run(session: &mut CoreSession, request: TransitionRequest) -> bool {
        session.queue_transition(request).unwrap();
        let mut surface = make_surface(session);
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        let report = session.run_frame(&mut exchange).unwrap();
        report.transitions[0].1.is_ok()
    }

    assert!(run(&mut session, insert(0, 0)));
    assert!(run(&mut session, eject(100)));
    assert!(!run(&mut session, insert(1, 500)));
    assert!(run(&mut session, insert(1, 1100)));
    assert!(session.core().media().unwrap().media_usable(0));
}

#[test]
fn test_commands() {
    let mut session = session();
    assert!(session.command(SystemCommand::InsertCoin));
    assert!(session.command(SystemCommand::ToggleDip(3)));
    assert!(!session.command(SystemCommand::ToggleDip(12)));
    assert!(!session.command(SystemCommand::EjectDisk));
}
