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

//! Pattern generator core
//!
//! A small synthetic system that drives every part of the core interface:
//! a gamepad (d-pad, two buttons, a 3-position mode switch and a power LED),
//! one disk drive, scrolling color-bar video and a square-wave tone.
//!
//! # Memory Map
//!
//! | Address | Contents                         |
//! |---------|----------------------------------|
//! | 0x00    | Frame counter (low byte)         |
//! | 0x10    | Picture brightness               |
//! | 0x20    | Coin counter                     |
//! | 0x21    | DIP switches (low byte)          |
//!
//! The remaining bytes of the 256-byte RAM are free for cheats.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::interface::Core;
use super::state::{load_snapshot, save_snapshot, StateMedium};
use crate::core::cheat::{CheatHooks, CheatInterface, RawHexFormat};
use crate::core::error::{ConfigurationError, StateIoError};
use crate::core::frame::{
    FormatTracker, FrameExchange, GameMedium, MasterClock, Rect, SettingDescriptor, Surface,
    SystemProfile, VideoSystem,
};
use crate::core::input::{
    DeviceDescriptor, DeviceInputDescriptorSet, InputFieldDescriptor, InputInfo, InputState,
    PortDescriptor, Rotation, StatusState, SwitchPosition,
};
use crate::core::log_context::LogContext;
use crate::core::media::{
    Drive, DriveState, DriveStatus, MediaCategory, MediaItem, MediaTopology, MediaValidator,
    SystemCommand,
};

/// Framebuffer width in pixels
pub const PATTERN_WIDTH: u32 = 256;

/// Framebuffer height in pixels
pub const PATTERN_HEIGHT: u32 = 224;

/// Master clock (Hz)
pub const MASTER_CLOCK_HZ: f64 = 1_789_773.0;

/// Master cycles per frame, roughly 60 Hz
pub const CYCLES_PER_FRAME: i64 = 29_830;

/// Delay the disk drive enforces between ejecting and inserting
pub const DISK_SWAP_DELAY_MS: u32 = 1000;

const RAM_SIZE: usize = 0x100;
const RAM_FRAME: u32 = 0x00;
const RAM_BRIGHTNESS: u32 = 0x10;
const RAM_COINS: u32 = 0x20;
const RAM_DIPS: u32 = 0x21;

/// Frames of rewind history kept
const HISTORY_LEN: usize = 120;

const BASE_TONE_HZ: f64 = 220.0;
const TONE_AMPLITUDE: f64 = 6000.0;

/// White, yellow, cyan, green, magenta, red, blue, black
const BARS: [(u8, u8, u8); 8] = [
    (0xFF, 0xFF, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0x00, 0xFF, 0xFF),
    (0x00, 0xFF, 0x00),
    (0xFF, 0x00, 0xFF),
    (0xFF, 0x00, 0x00),
    (0x00, 0x00, 0xFF),
    (0x00, 0x00, 0x00),
];

/// Mode switch positions
const MODE_BARS: u8 = 0;
const MODE_CHECKER: u8 = 1;
const MODE_SOLID: u8 = 2;

/// Emulated machine state; everything a save state carries besides drives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PatternState {
    frame: u64,
    scroll_x: i32,
    scroll_y: i32,
    mode: u8,
    /// Square wave phase in [0, 1)
    tone_phase: f64,
    /// Fractional sound frame carried between frames
    sample_carry: f64,
    ram: Vec<u8>,
}

impl PatternState {
    fn new() -> Self {
        let mut ram = vec![0u8; RAM_SIZE];
        ram[RAM_BRIGHTNESS as usize] = 0xFF;
        Self {
            frame: 0,
            scroll_x: 0,
            scroll_y: 0,
            mode: MODE_BARS,
            tone_phase: 0.0,
            sample_carry: 0.0,
            ram,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PatternSnapshot {
    state: PatternState,
    drives: Vec<DriveStatus>,
}

/// Gamepad descriptor set: d-pad, A, B, start, mode switch, power LED
pub fn gamepad_descriptors() -> Result<DeviceInputDescriptorSet, ConfigurationError> {
    DeviceInputDescriptorSet::new(vec![
        InputFieldDescriptor::button("up", "UP ↑", Some(0))
            .excludes("down")
            .rotates(Rotation::Deg90, "right")
            .rotates(Rotation::Deg180, "down")
            .rotates(Rotation::Deg270, "left"),
        InputFieldDescriptor::button("down", "DOWN ↓", Some(1))
            .excludes("up")
            .rotates(Rotation::Deg90, "left")
            .rotates(Rotation::Deg180, "up")
            .rotates(Rotation::Deg270, "right"),
        InputFieldDescriptor::button("left", "LEFT ←", Some(2))
            .excludes("right")
            .rotates(Rotation::Deg90, "up")
            .rotates(Rotation::Deg180, "right")
            .rotates(Rotation::Deg270, "down"),
        InputFieldDescriptor::button("right", "RIGHT →", Some(3))
            .excludes("left")
            .rotates(Rotation::Deg90, "down")
            .rotates(Rotation::Deg180, "left")
            .rotates(Rotation::Deg270, "up"),
        InputFieldDescriptor::button("a", "A", Some(4)),
        InputFieldDescriptor::button("b", "B", Some(5)),
        InputFieldDescriptor::button("start", "START", Some(6)),
        InputFieldDescriptor::switch(
            "mode",
            "Pattern Mode",
            Some(7),
            vec![
                SwitchPosition::new("bars", "Color Bars", "Eight vertical color bars"),
                SwitchPosition::new("checker", "Checkerboard", "Black and white checkerboard"),
                SwitchPosition::new("solid", "Solid", "Single gray field"),
            ],
            true,
        ),
        InputFieldDescriptor::status(
            "power_led",
            "Power LED",
            vec![
                StatusState::new("off", "Off", Some(0x000000)),
                StatusState::new("on", "On", Some(0xFF0000)),
            ],
        ),
    ])
}

fn input_info() -> Result<InputInfo, ConfigurationError> {
    let gamepad = DeviceDescriptor::new(
        "gamepad",
        "Gamepad",
        "D-pad, two buttons and a mode switch",
        Arc::new(gamepad_descriptors()?),
    );
    let port = PortDescriptor::new(
        "port1",
        "Port 1",
        vec![gamepad, DeviceDescriptor::none()],
        "gamepad",
    )?;
    Ok(InputInfo::new(vec![port]))
}

fn topology() -> Result<MediaTopology, ConfigurationError> {
    MediaTopology::new(
        vec![Drive::new(
            "disk",
            vec![
                DriveState::absent("Ejected"),
                DriveState::present("Inserted", true),
            ],
            vec![0],
            DISK_SWAP_DELAY_MS,
        )],
        vec![MediaCategory::new("Pattern Disk")],
        vec![
            MediaItem::new("Disk A", 0).with_orientations(&["Side A", "Side B"]),
            MediaItem::new("Disk B", 0),
        ],
    )
}

/// Reference core generating test patterns
pub struct PatternCore {
    profile: Arc<SystemProfile>,
    input_info: Arc<InputInfo>,
    cheats: CheatInterface,
    media: MediaValidator,
    state: PatternState,
    history: VecDeque<PatternState>,
    read_patches: HashMap<u32, (u8, Option<u8>)>,
    formats: FormatTracker,
    audio_scratch: Vec<i16>,
}

impl PatternCore {
    /// Build the core and its static descriptors
    ///
    /// # Example
    ///
    /// ```
    /// use corelink::core::system::{Core, PatternCore};
    /// use corelink::core::LogContext;
    ///
    /// let core = PatternCore::new(&LogContext::default()).unwrap();
    /// assert_eq!(core.profile().fb_width, 256);
    /// assert_eq!(core.input_info().ports.len(), 1);
    /// ```
    pub fn new(ctx: &LogContext) -> Result<Self, ConfigurationError> {
        let topology = Arc::new(topology()?);
        let input_info = Arc::new(input_info()?);

        let profile = Arc::new(SystemProfile {
            short_name: "pattern".to_string(),
            full_name: "Pattern Generator".to_string(),
            master_clock: MasterClock::from_hz(MASTER_CLOCK_HZ),
            fps: SystemProfile::fps_to_fixed(MASTER_CLOCK_HZ / CYCLES_PER_FRAME as f64),
            multires: false,
            lcm_width: PATTERN_WIDTH,
            lcm_height: PATTERN_HEIGHT,
            nominal_width: PATTERN_WIDTH,
            nominal_height: PATTERN_HEIGHT,
            fb_width: PATTERN_WIDTH,
            fb_height: PATTERN_HEIGHT,
            sound_channels: 2,
            video_system: VideoSystem::Ntsc,
            game_medium: GameMedium::Disk,
            desired_input: vec![Some("gamepad".to_string())],
            settings: vec![SettingDescriptor::new(
                "pattern.tone",
                "Base tone frequency in Hz",
                "220",
            )],
            topology: Some(Arc::clone(&topology)),
            ..SystemProfile::default()
        });

        ctx.info(format_args!(
            "{}: {}x{} @ {:.3} fps, {} drive(s)",
            profile.full_name,
            profile.fb_width,
            profile.fb_height,
            profile.frames_per_second(),
            topology.drives().len()
        ));

        Ok(Self {
            profile,
            input_info,
            cheats: CheatInterface::new(vec![Arc::new(RawHexFormat::new(false))], false),
            media: MediaValidator::new(topology),
            state: PatternState::new(),
            history: VecDeque::with_capacity(HISTORY_LEN),
            read_patches: HashMap::new(),
            formats: FormatTracker::new(),
            audio_scratch: Vec::new(),
        })
    }

    /// Frames emulated since power-on
    pub fn frame(&self) -> u64 {
        self.state.frame
    }

    /// Current pattern mode (switch position)
    pub fn mode(&self) -> u8 {
        self.state.mode
    }

    /// Byte as the emulated program sees it, read patches applied
    fn read(&self, address: u32) -> u8 {
        let raw = self.mem_read(address);
        match self.read_patches.get(&address) {
            Some(&(value, None)) => value,
            Some(&(value, Some(compare))) if raw == compare => value,
            _ => raw,
        }
    }

    fn advance(&mut self, input: Option<&InputState>) {
        let get = |name: &str| input.and_then(|s| s.get(name).ok()).unwrap_or(0);

        let dx = get("right") as i32 - get("left") as i32;
        let dy = get("down") as i32 - get("up") as i32;
        let state = &mut self.state;
        state.scroll_x = (state.scroll_x + dx * 2).rem_euclid(PATTERN_WIDTH as i32);
        state.scroll_y = (state.scroll_y + dy * 2).rem_euclid(PATTERN_HEIGHT as i32);
        state.mode = get("mode").min(MODE_SOLID as u32) as u8;

        let brightness = &mut state.ram[RAM_BRIGHTNESS as usize];
        if get("a") != 0 {
            *brightness = brightness.saturating_add(8);
        }
        if get("b") != 0 {
            *brightness = brightness.saturating_sub(8);
        }

        state.frame += 1;
        state.ram[RAM_FRAME as usize] = state.frame as u8;
    }

    fn render(&self, surface: &mut Surface) {
        let format = surface.format;
        let brightness = self.read(RAM_BRIGHTNESS) as u32;
        let scale = |c: u8| ((c as u32 * brightness) / 0xFF) as u8;

        let stripe = match (self.media.media_usable(0), self.media.status(0)) {
            (true, Some(status)) => match status.media {
                Some(0) => Some(format.rgb(0x00, 0xC0, 0x40)),
                Some(_) => Some(format.rgb(0x40, 0x40, 0xFF)),
                None => None,
            },
            _ => None,
        };

        let sx = self.state.scroll_x;
        let sy = self.state.scroll_y;
        for y in 0..PATTERN_HEIGHT {
            let Some(line) = surface.line_mut(y) else {
                break;
            };
            let py = (y as i32 + sy).rem_euclid(PATTERN_HEIGHT as i32) as u32;
            for (x, pixel) in line.iter_mut().take(PATTERN_WIDTH as usize).enumerate() {
                let px = (x as i32 + sx).rem_euclid(PATTERN_WIDTH as i32) as u32;
                let (r, g, b) = match self.state.mode {
                    MODE_CHECKER => {
                        if ((px / 16) + (py / 16)) % 2 == 0 {
                            (0xFF, 0xFF, 0xFF)
                        } else {
                            (0x00, 0x00, 0x00)
                        }
                    }
                    MODE_SOLID => (0x80, 0x80, 0x80),
                    _ => BARS[(px / (PATTERN_WIDTH / 8)) as usize % BARS.len()],
                };
                *pixel = format.rgb(scale(r), scale(g), scale(b));
            }
            if y < 8 {
                if let Some(color) = stripe {
                    line.iter_mut()
                        .take(PATTERN_WIDTH as usize)
                        .for_each(|p| *p = color);
                }
            }
        }
    }

    /// Fill `buf` with `frames` frames of square wave starting at `from`
    fn synth(&mut self, buf: &mut [i16], channels: usize, from: usize, frames: usize, step: f64, amplitude: i16) {
        for i in from..from + frames {
            let value = if self.state.tone_phase < 0.5 {
                amplitude
            } else {
                -amplitude
            };
            let start = i * channels;
            if let Some(frame) = buf.get_mut(start..start + channels) {
                frame.fill(value);
            }
            self.state.tone_phase = (self.state.tone_phase + step).fract();
        }
    }

    /// Produce this frame's audio, absorbing volume, speed and reversal
    fn generate_audio(&mut self, exchange: &mut FrameExchange<'_>) {
        if !exchange.sound_enabled() {
            return;
        }
        let channels = exchange.sound_channels as usize;
        let rate = exchange.sound_rate;
        let speed = if exchange.sound_speed > 0.0 {
            exchange.sound_speed
        } else {
            1.0
        };

        let exact = rate / (self.profile.frames_per_second() * speed) + self.state.sample_carry;
        let wanted = exact.floor();
        self.state.sample_carry = exact - wanted;
        let frames = (wanted as usize).min(exchange.sound_capacity());

        let tone = BASE_TONE_HZ * (1 + self.state.mode as u32) as f64;
        let step = tone / rate;
        let amplitude = (TONE_AMPLITUDE * exchange.sound_volume.clamp(0.0, 4.0))
            .clamp(i16::MIN as f64, i16::MAX as f64) as i16;
        let reverse = exchange.reverse_audio;
        let half = if reverse { 0 } else { frames / 2 };

        let mut buf = std::mem::take(&mut self.audio_scratch);
        buf.resize(frames * channels, 0);

        // First half, then a mid-sync flush so the host can start playback
        self.synth(&mut buf, channels, 0, half, step, amplitude);
        if half > 0 {
            if let Some(out) = exchange.host_samples_mut() {
                out[..half * channels].copy_from_slice(&buf[..half * channels]);
            }
            exchange.sound_frames = half;
            exchange.master_cycles = CYCLES_PER_FRAME / 2;
            exchange.mid_sync();
        }
        self.synth(&mut buf, channels, half, frames - half, step, amplitude);

        if reverse {
            let mut chunks: Vec<Vec<i16>> = buf.chunks(channels).map(|c| c.to_vec()).collect();
            chunks.reverse();
            buf = chunks.concat();
            exchange.reverse_audio = false;
        }

        if let Some(out) = exchange.host_samples_mut() {
            out[..frames * channels].copy_from_slice(&buf);
        }
        exchange.sound_frames = frames;
        exchange.sound_volume = 1.0;
        exchange.sound_speed = 1.0;
        self.audio_scratch = buf;
    }
}

impl CheatHooks for PatternCore {
    fn mem_read(&self, address: u32) -> u8 {
        self.state
            .ram
            .get(address as usize % RAM_SIZE)
            .copied()
            .unwrap_or(0)
    }

    fn mem_write(&mut self, address: u32, value: u8) {
        if let Some(byte) = self.state.ram.get_mut(address as usize % RAM_SIZE) {
            *byte = value;
        }
    }

    fn install_read_patch(&mut self, address: u32, value: u8, compare: Option<u8>) {
        self.read_patches
            .insert(address % RAM_SIZE as u32, (value, compare));
    }

    fn remove_read_patches(&mut self) {
        self.read_patches.clear();
    }
}

impl Core for PatternCore {
    fn profile(&self) -> &Arc<SystemProfile> {
        &self.profile
    }

    fn input_info(&self) -> &Arc<InputInfo> {
        &self.input_info
    }

    fn cheat_interface(&self) -> &CheatInterface {
        &self.cheats
    }

    fn cheat_hooks(&mut self) -> Option<&mut dyn CheatHooks> {
        Some(self)
    }

    fn media(&self) -> Option<&MediaValidator> {
        Some(&self.media)
    }

    fn media_mut(&mut self) -> Option<&mut MediaValidator> {
        Some(&mut self.media)
    }

    fn emulate<'a>(&'a mut self, exchange: &mut FrameExchange<'a>, ctx: &LogContext) {
        self.formats.observe(exchange);

        if exchange.rewind {
            match self.history.pop_back() {
                Some(previous) => self.state = previous,
                None => ctx.trace(format_args!("rewind history exhausted")),
            }
        } else {
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(self.state.clone());
            self.advance(exchange.input.first());
        }

        if !exchange.skip {
            self.render(exchange.surface);
        }
        exchange.display_rect = Rect::new(0, 0, PATTERN_WIDTH, PATTERN_HEIGHT);
        if let Some(widths) = exchange.line_widths.as_deref_mut() {
            widths.fill(PATTERN_WIDTH);
        }

        self.generate_audio(exchange);
        exchange.master_cycles = CYCLES_PER_FRAME;

        ctx.trace(format_args!(
            "frame {} mode {} scroll ({}, {}) {} sound frames",
            self.state.frame, self.state.mode, self.state.scroll_x, self.state.scroll_y, exchange.sound_frames
        ));
    }

    fn state_action(
        &mut self,
        medium: &mut StateMedium,
        load: bool,
        data_only: bool,
        ctx: &LogContext,
    ) -> Result<(), StateIoError> {
        if !load {
            let snapshot = PatternSnapshot {
                state: self.state.clone(),
                drives: self.media.statuses().to_vec(),
            };
            save_snapshot(medium, &snapshot, data_only)?;
            ctx.debug(format_args!("saved state at frame {}", self.state.frame));
            return Ok(());
        }

        // Decode and validate everything before touching live state
        let snapshot: PatternSnapshot = load_snapshot(medium, data_only)?;
        if snapshot.state.ram.len() != RAM_SIZE {
            return Err(StateIoError::Mismatch(format!(
                "RAM is {} bytes, expected {}",
                snapshot.state.ram.len(),
                RAM_SIZE
            )));
        }
        if snapshot.state.mode > MODE_SOLID {
            return Err(StateIoError::Mismatch(format!(
                "unknown mode {}",
                snapshot.state.mode
            )));
        }
        let mut media = self.media.clone();
        media
            .restore(snapshot.drives)
            .map_err(|e| StateIoError::Mismatch(e.to_string()))?;

        self.state = snapshot.state;
        self.media = media;
        if !data_only {
            self.history.clear();
        }
        ctx.info(format_args!("loaded state at frame {}", self.state.frame));
        Ok(())
    }

    fn command(&mut self, command: SystemCommand, ctx: &LogContext) -> bool {
        match command {
            SystemCommand::Reset => {
                let ram = std::mem::take(&mut self.state.ram);
                self.state = PatternState {
                    ram,
                    ..PatternState::new()
                };
            }
            SystemCommand::Power => {
                self.state = PatternState::new();
                self.history.clear();
            }
            SystemCommand::InsertCoin => {
                let coins = &mut self.state.ram[RAM_COINS as usize];
                *coins = coins.wrapping_add(1);
            }
            SystemCommand::ToggleDip(n) if n < 8 => {
                self.state.ram[RAM_DIPS as usize] ^= 1 << n;
            }
            _ => {
                ctx.debug(format_args!("command '{}' not handled by core", command));
                return false;
            }
        }
        ctx.info(format_args!("{}", command));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::PixelFormat;

    fn core() -> PatternCore {
        PatternCore::new(&LogContext::default()).unwrap()
    }

    fn gamepad_state(core: &PatternCore) -> InputState {
        let port = &core.input_info().ports[0];
        InputState::new(Arc::clone(&port.default_device().input))
    }

    #[test]
    fn test_profile() {
        let core = core();
        let profile = core.profile();
        assert_eq!(profile.master_clock.hz(), MASTER_CLOCK_HZ);
        assert!((profile.frames_per_second() - 60.0).abs() < 0.01);
        assert!(profile.topology.is_some());
    }

    #[test]
    fn test_gamepad_layout() {
        let set = gamepad_descriptors().unwrap();
        // 7 buttons + 2-bit switch + 1-bit LED
        assert_eq!(set.total_bits(), 10);
        assert_eq!(set.byte_size(), 2);
        assert_eq!(set.field("mode").unwrap().bit_offset(), 7);
    }

    #[test]
    fn test_frame_advances_and_renders() {
        let mut core = core();
        let input = [gamepad_state(&core)];
        let mut surface = Surface::new(PATTERN_WIDTH, PATTERN_HEIGHT, PixelFormat::XRGB8888);
        {
            let mut exchange = FrameExchange::new(&mut surface, &input);
            core.emulate(&mut exchange, &LogContext::default());
            assert_eq!(exchange.master_cycles, CYCLES_PER_FRAME);
            assert!(exchange.video_format_changed);
            assert_eq!(exchange.display_rect.w, PATTERN_WIDTH);
        }
        assert_eq!(core.frame(), 1);
        // First bar is white at full brightness
        assert_eq!(surface.pixel(0, 100), Some(0x00FF_FFFF));
    }

    #[test]
    fn test_input_moves_scroll_and_mode() {
        let mut core = core();
        let mut pad = gamepad_state(&core);
        pad.set("right", 1).unwrap();
        pad.set("mode", 2).unwrap();
        let input = [pad];
        let mut surface = Surface::new(PATTERN_WIDTH, PATTERN_HEIGHT, PixelFormat::XRGB8888);
        let mut exchange = FrameExchange::new(&mut surface, &input);
        core.emulate(&mut exchange, &LogContext::default());
        drop(exchange);
        assert_eq!(core.state.scroll_x, 2);
        assert_eq!(core.mode(), MODE_SOLID);
    }

    #[test]
    fn test_audio_absorbs_volume_and_speed() {
        let mut core = core();
        let mut surface = Surface::new(PATTERN_WIDTH, PATTERN_HEIGHT, PixelFormat::XRGB8888);
        let mut samples = vec![0i16; 2 * 2048];
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.set_sound(&mut samples, 48000.0, 2);
        exchange.sound_volume = 0.5;
        exchange.sound_speed = 2.0;
        core.emulate(&mut exchange, &LogContext::default());

        // 48000 / (60 * 2) frames, give or take rounding of the fixed-point fps
        assert!((399..=401).contains(&exchange.sound_frames));
        assert_eq!(exchange.sound_volume, 1.0);
        assert_eq!(exchange.sound_speed, 1.0);
        assert!(exchange.sound_frames_at_sync > 0);
        assert!(exchange.sound_frames_at_sync < exchange.sound_frames);
        assert_eq!(exchange.produced_samples()[0], (TONE_AMPLITUDE * 0.5) as i16);
        assert!(exchange.check_postconditions().is_ok());
    }

    #[test]
    fn test_audio_respects_capacity() {
        let mut core = core();
        let mut surface = Surface::new(PATTERN_WIDTH, PATTERN_HEIGHT, PixelFormat::XRGB8888);
        let mut samples = vec![0i16; 2 * 100];
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.set_sound(&mut samples, 48000.0, 2);
        core.emulate(&mut exchange, &LogContext::default());
        assert_eq!(exchange.sound_frames, 100);
        assert!(exchange.check_postconditions().is_ok());
    }

    #[test]
    fn test_rewind_restores_previous_frame() {
        let mut core = core();
        let ctx = LogContext::default();
        let mut surface = Surface::new(PATTERN_WIDTH, PATTERN_HEIGHT, PixelFormat::XRGB8888);
        for _ in 0..3 {
            let mut exchange = FrameExchange::new(&mut surface, &[]);
            core.emulate(&mut exchange, &ctx);
        }
        assert_eq!(core.frame(), 3);

        let mut exchange = FrameExchange::new(&mut surface, &[]);
        exchange.rewind = true;
        core.emulate(&mut exchange, &ctx);
        drop(exchange);
        assert_eq!(core.frame(), 2);
    }

    #[test]
    fn test_read_patch_changes_picture() {
        let mut core = core();
        core.install_read_patch(RAM_BRIGHTNESS, 0x00, None);
        let mut surface = Surface::new(PATTERN_WIDTH, PATTERN_HEIGHT, PixelFormat::XRGB8888);
        let mut exchange = FrameExchange::new(&mut surface, &[]);
        core.emulate(&mut exchange, &LogContext::default());
        drop(exchange);
        assert_eq!(surface.pixel(0, 100), Some(0));
        // Raw memory is untouched
        assert_eq!(core.mem_read(RAM_BRIGHTNESS), 0xFF);
    }

    #[test]
    fn test_commands() {
        let mut core = core();
        let ctx = LogContext::default();
        assert!(core.command(SystemCommand::InsertCoin, &ctx));
        assert!(core.command(SystemCommand::ToggleDip(3), &ctx));
        assert_eq!(core.mem_read(RAM_COINS), 1);
        assert_eq!(core.mem_read(RAM_DIPS), 0x08);
        assert!(!core.command(SystemCommand::EjectDisk, &ctx));

        assert!(core.command(SystemCommand::Reset, &ctx));
        assert_eq!(core.mem_read(RAM_COINS), 1);
        assert!(core.command(SystemCommand::Power, &ctx));
        assert_eq!(core.mem_read(RAM_COINS), 0);
    }

    #[test]
    fn test_corrupt_load_leaves_state_intact() {
        let mut core = core();
        let ctx = LogContext::default();
        core.mem_write(0x80, 0x5A);

        let mut before = StateMedium::new();
        core.state_action(&mut before, false, true, &ctx).unwrap();

        let mut saved = StateMedium::new();
        core.state_action(&mut saved, false, false, &ctx).unwrap();
        let mut bytes = saved.into_bytes();
        bytes.truncate(bytes.len() / 2);
        let mut corrupt = StateMedium::from_bytes(bytes);
        assert!(core.state_action(&mut corrupt, true, false, &ctx).is_err());

        let mut after = StateMedium::new();
        core.state_action(&mut after, false, true, &ctx).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_load_rejects_drive_state_outside_topology() {
        let mut core = core();
        let ctx = LogContext::default();
        core.media_mut().unwrap().request_transition(0, 1, Some(1), 0).unwrap();

        let mut before = StateMedium::new();
        core.state_action(&mut before, false, true, &ctx).unwrap();

        // Disk B has a single side
        let mut drives = core.media().unwrap().statuses().to_vec();
        drives[0].orientation = 3;
        let snapshot = PatternSnapshot {
            state: PatternState::new(),
            drives,
        };
        let mut forged = StateMedium::new();
        save_snapshot(&mut forged, &snapshot, false).unwrap();
        forged.rewind();

        assert!(matches!(
            core.state_action(&mut forged, true, false, &ctx),
            Err(StateIoError::Mismatch(_))
        ));

        let mut after = StateMedium::new();
        core.state_action(&mut after, false, true, &ctx).unwrap();
        assert_eq!(before, after);
        assert_eq!(core.media().unwrap().status(0).unwrap().orientation, 0);
    }
}
