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

//! Per-frame exchange between host and core
//!
//! # Call Protocol
//!
//! 1. The host builds a [`FrameExchange`] from buffers it owns and reuses
//!    across frames, then checks [`FrameExchange::check_preconditions`].
//! 2. The core's `emulate` fills in the core-written fields, optionally
//!    calling [`FrameExchange::mid_sync`] to hand partial audio to the host.
//! 3. The host checks [`FrameExchange::check_postconditions`], then applies
//!    any volume/speed/reverse correction the core left for it.
//!
//! Everything borrowed by the exchange is released when the call returns.
//! A core may point the exchange at its own sample buffer for that one call
//! ([`SoundBuffer::Core`]); the lifetime `'a` ties that borrow to the core
//! so it cannot outlive the call either.

use super::profile::SystemProfile;
use super::surface::{PixelFormat, Rect, Surface};
use crate::core::error::ContractViolation;
use crate::core::input::InputState;

/// Where this frame's audio lives
#[derive(Debug, Default)]
pub enum SoundBuffer<'a> {
    /// No audio this frame
    #[default]
    Disabled,
    /// Host-owned interleaved samples; capacity is `len / channels` frames
    Host(&'a mut [i16]),
    /// Core-owned samples substituted for this call only
    Core(&'a [i16]),
}

/// Interlace state of the rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interlace {
    pub enabled: bool,
    /// Which field was rendered, meaningful only when `enabled`
    pub odd_field: bool,
}

/// Receives audio as the core flushes it mid-frame
pub trait MidSyncSink {
    /// `samples` holds only the frames produced since the previous flush
    fn partial_audio(&mut self, samples: &[i16]);
}

/// One frame's worth of host inputs and core outputs
pub struct FrameExchange<'a> {
    // Host-written
    pub surface: &'a mut Surface,
    /// Per-scanline widths, at least `fb_height` entries when supplied
    pub line_widths: Option<&'a mut [u32]>,
    pub sound: SoundBuffer<'a>,
    /// Output rate in Hz, 0 disables audio
    pub sound_rate: f64,
    pub sound_channels: u32,
    /// Linear volume; 1.0 is neutral
    pub sound_volume: f64,
    /// Playback speed multiplier; 1.0 is neutral
    pub sound_speed: f64,
    pub rewind: bool,
    pub reverse_audio: bool,
    /// Host will not display this frame; rendering may be skipped
    pub skip: bool,
    /// One encoded state per port, complete before the call
    pub input: &'a [InputState],
    pub mid_sync_sink: Option<&'a mut dyn MidSyncSink>,

    // Core-written
    pub display_rect: Rect,
    /// Set when `line_widths` was filled in and should be used instead of
    /// `display_rect.w`
    pub line_widths_used: bool,
    pub interlace: Interlace,
    pub video_format_changed: bool,
    pub sound_format_changed: bool,
    /// Hint that this frame is full-motion video
    pub is_fmv: bool,
    /// Sound frames produced
    pub sound_frames: usize,
    /// Master clock cycles consumed, in the profile's clock base
    pub master_cycles: i64,
    pub sound_frames_at_sync: usize,
    pub master_cycles_at_sync: i64,

    host_capacity: usize,
}

impl<'a> FrameExchange<'a> {
    /// Exchange with audio disabled
    ///
    /// # Example
    ///
    /// ```
    /// use corelink::core::frame::{FrameExchange, PixelFormat, Surface};
    ///
    /// let mut surface = Surface::new(256, 240, PixelFormat::XRGB8888);
    /// let mut samples = vec![0i16; 2 * 1024];
    /// let mut exchange = FrameExchange::new(&mut surface, &[]);
    /// exchange.set_sound(&mut samples, 48000.0, 2);
    /// assert_eq!(exchange.sound_capacity(), 1024);
    /// ```
    pub fn new(surface: &'a mut Surface, input: &'a [InputState]) -> Self {
        Self {
            surface,
            line_widths: None,
            sound: SoundBuffer::Disabled,
            sound_rate: 0.0,
            sound_channels: 0,
            sound_volume: 1.0,
            sound_speed: 1.0,
            rewind: false,
            reverse_audio: false,
            skip: false,
            input,
            mid_sync_sink: None,
            display_rect: Rect::default(),
            line_widths_used: false,
            interlace: Interlace::default(),
            video_format_changed: false,
            sound_format_changed: false,
            is_fmv: false,
            sound_frames: 0,
            master_cycles: 0,
            sound_frames_at_sync: 0,
            master_cycles_at_sync: 0,
            host_capacity: 0,
        }
    }

    /// Supply the host sample buffer
    ///
    /// A zero rate, empty buffer or zero channel count disables audio.
    pub fn set_sound(&mut self, buffer: &'a mut [i16], rate: f64, channels: u32) {
        self.host_capacity = if channels == 0 {
            0
        } else {
            buffer.len() / channels as usize
        };
        self.sound = SoundBuffer::Host(buffer);
        self.sound_rate = rate;
        self.sound_channels = channels;
    }

    /// Host capacity in sound frames
    #[inline]
    pub fn sound_capacity(&self) -> usize {
        self.host_capacity
    }

    /// Whether the core should produce audio this call
    pub fn sound_enabled(&self) -> bool {
        self.sound_rate > 0.0
            && self.host_capacity > 0
            && !matches!(self.sound, SoundBuffer::Disabled)
    }

    /// Host sample buffer, if the host supplied one and the core has not
    /// substituted its own
    pub fn host_samples_mut(&mut self) -> Option<&mut [i16]> {
        match &mut self.sound {
            SoundBuffer::Host(buf) => Some(&mut **buf),
            _ => None,
        }
    }

    /// Point the exchange at core-owned samples for this call
    pub fn substitute_sound(&mut self, samples: &'a [i16], frames: usize) {
        self.sound = SoundBuffer::Core(samples);
        self.sound_frames = frames;
    }

    /// The `sound_frames` frames produced this call
    pub fn produced_samples(&self) -> &[i16] {
        let len = self.sound_frames * self.sound_channels as usize;
        match &self.sound {
            SoundBuffer::Disabled => &[],
            SoundBuffer::Host(buf) => &buf[..len.min(buf.len())],
            SoundBuffer::Core(buf) => &buf[..len.min(buf.len())],
        }
    }

    /// Clear every core-written field before a call
    pub fn reset_outputs(&mut self) {
        self.display_rect = Rect::default();
        self.line_widths_used = false;
        self.interlace = Interlace::default();
        self.video_format_changed = false;
        self.sound_format_changed = false;
        self.is_fmv = false;
        self.sound_frames = 0;
        self.master_cycles = 0;
        self.sound_frames_at_sync = 0;
        self.master_cycles_at_sync = 0;
    }

    /// Verify the host-supplied buffers against `profile`
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractViolation`] found: pitch, height and
    /// storage of the surface, then the line width array, then audio.
    pub fn check_preconditions(&self, profile: &SystemProfile) -> Result<(), ContractViolation> {
        let pitch = self.surface.pitch as usize;
        let height = self.surface.height as usize;
        let fb_width = profile.fb_width as usize;
        let fb_height = profile.fb_height as usize;

        if pitch != fb_width {
            return Err(ContractViolation::SurfacePitch { pitch, fb_width });
        }
        if height < fb_height {
            return Err(ContractViolation::SurfaceHeight { height, fb_height });
        }
        let needed = pitch * height;
        if self.surface.pixels.len() < needed {
            return Err(ContractViolation::SurfaceStorage {
                needed,
                actual: self.surface.pixels.len(),
            });
        }
        if let Some(widths) = &self.line_widths {
            if widths.len() < fb_height {
                return Err(ContractViolation::LineWidths {
                    actual: widths.len(),
                    fb_height,
                });
            }
        }

        let rate = self.sound_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ContractViolation::SoundRate { rate });
        }
        if rate > 0.0 && matches!(self.sound, SoundBuffer::Host(_)) && self.host_capacity == 0 {
            return Err(ContractViolation::SoundBuffer { rate });
        }
        Ok(())
    }

    /// Verify what the core wrote
    pub fn check_postconditions(&self) -> Result<(), ContractViolation> {
        let capacity = self.host_capacity;
        if self.sound_frames > capacity {
            return Err(ContractViolation::SoundOverrun {
                produced: self.sound_frames,
                capacity,
            });
        }
        if self.sound_frames_at_sync > self.sound_frames {
            return Err(ContractViolation::SoundOverrun {
                produced: self.sound_frames_at_sync,
                capacity: self.sound_frames,
            });
        }
        Ok(())
    }

    /// Snapshot progress so far and hand newly produced audio to the sink
    pub fn mid_sync(&mut self) {
        let channels = self.sound_channels as usize;
        let from = self.sound_frames_at_sync * channels;
        let to = self.sound_frames * channels;
        if let (Some(sink), SoundBuffer::Host(buf)) = (self.mid_sync_sink.as_mut(), &self.sound) {
            if from < to && to <= buf.len() {
                sink.partial_audio(&buf[from..to]);
            }
        }
        self.sound_frames_at_sync = self.sound_frames;
        self.master_cycles_at_sync = self.master_cycles;
    }
}

/// Tracks output formats across calls so the changed flags are exact
///
/// Lives in the core; [`FormatTracker::observe`] is the first thing a core's
/// `emulate` does.
#[derive(Debug, Clone, Default)]
pub struct FormatTracker {
    video: Option<(PixelFormat, u32)>,
    sound: Option<(u64, u32)>,
}

impl FormatTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the changed flags: true on the first call and whenever the format
    /// differs from the previous call
    pub fn observe(&mut self, exchange: &mut FrameExchange<'_>) {
        let video = (exchange.surface.format, exchange.surface.pitch);
        exchange.video_format_changed = self.video != Some(video);
        self.video = Some(video);

        let sound = (exchange.sound_rate.to_bits(), exchange.sound_channels);
        exchange.sound_format_changed = self.sound != Some(sound);
        self.sound = Some(sound);
    }

    /// Forget everything; the next call reports both formats as changed
    pub fn reset(&mut self) {
        self.video = None;
        self.sound = None;
    }
}
