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

//! Residual audio correction
//!
//! A core may absorb volume, speed and reverse requests itself by resetting
//! the corresponding exchange fields. Whatever it leaves set is applied here
//! after the call.

use crate::core::frame::FrameExchange;

/// Slowest playback speed the resampler honours
pub const MIN_SPEED: f64 = 1.0 / 16.0;

/// Fastest playback speed the resampler honours
pub const MAX_SPEED: f64 = 16.0;

/// Scale every sample by `volume`, saturating at the i16 range
pub fn apply_volume(samples: &mut [i16], volume: f64) {
    for sample in samples.iter_mut() {
        let scaled = (*sample as f64 * volume).round();
        *sample = scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
    }
}

/// Resample interleaved audio by linear interpolation
///
/// A `speed` of 2.0 halves the number of frames. Non-positive or non-finite
/// speeds return the input unchanged; others are clamped to
/// [`MIN_SPEED`]..=[`MAX_SPEED`].
pub fn resample_linear(samples: &[i16], channels: usize, speed: f64) -> Vec<i16> {
    if channels == 0 || !speed.is_finite() || speed <= 0.0 {
        return samples.to_vec();
    }
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    let frames = samples.len() / channels;
    if frames == 0 {
        return Vec::new();
    }

    let out_frames = ((frames as f64) / speed).floor() as usize;
    let mut out = Vec::with_capacity(out_frames * channels);
    for n in 0..out_frames {
        let pos = n as f64 * speed;
        let i = (pos.floor() as usize).min(frames - 1);
        let j = (i + 1).min(frames - 1);
        let t = pos - i as f64;
        for c in 0..channels {
            let a = samples[i * channels + c] as f64;
            let b = samples[j * channels + c] as f64;
            out.push((a + (b - a) * t).round() as i16);
        }
    }
    out
}

/// Reverse the order of interleaved frames, keeping channel order within each
pub fn reverse_frames(samples: &mut [i16], channels: usize) {
    if channels == 0 {
        return;
    }
    let frames = samples.len() / channels;
    for f in 0..frames / 2 {
        let back = frames - 1 - f;
        for c in 0..channels {
            samples.swap(f * channels + c, back * channels + c);
        }
    }
}

/// Produced audio with every unabsorbed correction applied
///
/// # Example
///
/// ```
/// use corelink::core::frame::{FrameExchange, PixelFormat, Surface};
/// use corelink::frontend::audio::finish_frame_audio;
///
/// let mut surface = Surface::new(4, 4, PixelFormat::XRGB8888);
/// let mut samples = vec![100i16, 100, 200, 200];
/// let mut exchange = FrameExchange::new(&mut surface, &[]);
/// exchange.set_sound(&mut samples, 48000.0, 2);
/// exchange.sound_frames = 2;
/// exchange.sound_volume = 0.5;
///
/// assert_eq!(finish_frame_audio(&exchange), vec![50, 50, 100, 100]);
/// ```
pub fn finish_frame_audio(exchange: &FrameExchange<'_>) -> Vec<i16> {
    let channels = exchange.sound_channels as usize;
    let mut samples = exchange.produced_samples().to_vec();

    if exchange.sound_volume != 1.0 {
        apply_volume(&mut samples, exchange.sound_volume);
    }
    if exchange.sound_speed != 1.0 {
        samples = resample_linear(&samples, channels, exchange.sound_speed);
    }
    if exchange.reverse_audio {
        reverse_frames(&mut samples, channels);
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_saturates() {
        let mut samples = [1000, -1000, 30000];
        apply_volume(&mut samples, 2.0);
        assert_eq!(samples, [2000, -2000, i16::MAX]);
    }

    #[test]
    fn test_resample_double_speed() {
        let samples = [0, 10, 20, 30, 40, 50, 60, 70];
        let out = resample_linear(&samples, 2, 2.0);
        assert_eq!(out, vec![0, 10, 40, 50]);
    }

    #[test]
    fn test_resample_half_speed_interpolates() {
        let samples = [0, 100];
        let out = resample_linear(&samples, 1, 0.5);
        assert_eq!(out, vec![0, 50, 100, 100]);
    }

    #[test]
    fn test_resample_bad_speed_is_identity() {
        let samples = [1, 2, 3];
        assert_eq!(resample_linear(&samples, 1, 0.0), samples.to_vec());
        assert_eq!(resample_linear(&samples, 1, f64::NAN), samples.to_vec());
    }

    #[test]
    fn test_resample_extreme_speed_is_clamped() {
        let samples = [0, 100, 200, 300];
        assert_eq!(resample_linear(&samples, 1, 1e-12).len(), 4 * 16);
        assert_eq!(resample_linear(&samples, 1, MIN_SPEED).len(), 4 * 16);

        let long = [7i16; 64];
        assert_eq!(resample_linear(&long, 2, 1e9).len(), 2 * 2);
    }

    #[test]
    fn test_reverse_keeps_channel_order() {
        let mut samples = [1, 2, 3, 4, 5, 6];
        reverse_frames(&mut samples, 2);
        assert_eq!(samples, [5, 6, 3, 4, 1, 2]);
    }
}
