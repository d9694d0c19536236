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

//! Frame pacing
//!
//! Derives the target frame period from a core's fixed-point frame rate and
//! tracks measured FPS and frame time.

use std::time::{Duration, Instant};

use crate::core::frame::{SystemProfile, FPS_FIXED_ONE};

/// Frame timer paced to an emulated system's refresh rate
///
/// # Example
///
/// ```
/// use corelink::frontend::FrameTimer;
///
/// let mut timer = FrameTimer::new(60.0);
///
/// if timer.should_run_frame() {
///     // Run emulation frame
///     timer.tick();
/// }
/// println!("FPS: {:.1}, Frame time: {:.2}ms", timer.fps(), timer.frame_time_ms());
/// ```
pub struct FrameTimer {
    /// Target frame period
    target_frame_time: Duration,
    /// Time when the last frame was executed
    last_frame: Instant,
    /// Total number of frames executed
    frame_count: u64,
    /// Measured frames per second
    fps: f32,
    /// Duration of the last frame in milliseconds
    frame_time_ms: f32,
    /// Start of the current FPS measurement window
    fps_start: Instant,
    /// Frames in the current FPS measurement window
    fps_frame_count: u64,
}

impl FrameTimer {
    /// Create a timer for `target_fps` frames per second
    ///
    /// # Arguments
    ///
    /// * `target_fps` - Target rate, must be finite and > 0
    ///
    /// # Panics
    ///
    /// Panics if `target_fps` is not a positive finite number
    ///
    /// # Example
    ///
    /// ```
    /// use corelink::frontend::FrameTimer;
    ///
    /// let timer = FrameTimer::new(59.94);
    /// assert_eq!(timer.fps(), 0.0); // No frames executed yet
    /// ```
    pub fn new(target_fps: f64) -> Self {
        assert!(
            target_fps.is_finite() && target_fps > 0.0,
            "target_fps must be a positive number"
        );
        let target_frame_time = Duration::from_secs_f64(1.0 / target_fps);
        let now = Instant::now();

        Self {
            target_frame_time,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
            frame_time_ms: 0.0,
            fps_start: now,
            fps_frame_count: 0,
        }
    }

    /// Create a timer from a fixed-point rate (fps * 65536 * 256)
    ///
    /// # Returns
    ///
    /// `None` if `fps_fixed` is 0
    pub fn from_fixed_fps(fps_fixed: u32) -> Option<Self> {
        if fps_fixed == 0 {
            return None;
        }
        Some(Self::new(fps_fixed as f64 / FPS_FIXED_ONE))
    }

    /// Create a timer paced to `profile`'s frame rate
    pub fn from_profile(profile: &SystemProfile) -> Option<Self> {
        Self::from_fixed_fps(profile.fps)
    }

    /// Update statistics after executing a frame
    ///
    /// The FPS reading is refreshed about once per second.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);

        self.frame_time_ms = elapsed.as_secs_f32() * 1000.0;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_start);
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_start = now;
        }

        self.last_frame = now;
    }

    /// Whether a full frame period has passed since the last frame
    #[inline(always)]
    pub fn should_run_frame(&self) -> bool {
        Instant::now().duration_since(self.last_frame) >= self.target_frame_time
    }

    /// When the next frame is due
    #[inline(always)]
    pub fn next_frame_instant(&self) -> Instant {
        self.last_frame + self.target_frame_time
    }

    /// Time left until the next frame is due, zero if already late
    pub fn time_until_next_frame(&self) -> Duration {
        self.next_frame_instant()
            .saturating_duration_since(Instant::now())
    }

    #[inline(always)]
    pub fn target_frame_time(&self) -> Duration {
        self.target_frame_time
    }

    /// Most recent FPS measurement
    #[inline(always)]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline(always)]
    pub fn frame_time_ms(&self) -> f32 {
        self.frame_time_ms
    }

    #[inline(always)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_frame_timer_new() {
        let timer = FrameTimer::new(60.0);
        assert_eq!(timer.fps(), 0.0);
        assert_eq!(timer.frame_time_ms(), 0.0);
        assert_eq!(timer.frame_count(), 0);
    }

    #[test]
    fn test_from_fixed_fps() {
        let fixed = SystemProfile::fps_to_fixed(50.0);
        let timer = FrameTimer::from_fixed_fps(fixed).unwrap();
        assert_eq!(timer.target_frame_time(), Duration::from_millis(20));
        assert!(FrameTimer::from_fixed_fps(0).is_none());
    }

    #[test]
    fn test_from_profile() {
        let profile = SystemProfile {
            fps: SystemProfile::fps_to_fixed(60.0),
            ..SystemProfile::default()
        };
        let timer = FrameTimer::from_profile(&profile).unwrap();
        let micros = timer.target_frame_time().as_micros();
        assert!((16_666..=16_667).contains(&micros));
    }

    #[test]
    fn test_frame_timer_tick() {
        let mut timer = FrameTimer::new(60.0);
        thread::sleep(Duration::from_millis(20));

        timer.tick();
        assert_eq!(timer.frame_count(), 1);
        assert!(timer.frame_time_ms() > 0.0);
        assert!(timer.time_until_next_frame() <= timer.target_frame_time());
    }

    #[test]
    fn test_frame_timer_fps_calculation() {
        let mut timer = FrameTimer::new(60.0);

        // 17ms * 60 frames crosses the one second window
        for _ in 0..60 {
            thread::sleep(Duration::from_millis(17));
            timer.tick();
        }

        assert!(timer.fps() > 0.0);
        assert_eq!(timer.frame_count(), 60);
    }

    #[test]
    #[should_panic]
    fn test_zero_fps_panics() {
        let _ = FrameTimer::new(0.0);
    }
}
