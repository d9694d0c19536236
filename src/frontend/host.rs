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

//! Host frame loop
//!
//! [`Host`] owns everything the host side of the exchange supplies across
//! frames: the surface, the sample buffer and one input state per port. It
//! routes key presses through each port's [`InputMapper`] and disk commands
//! through a [`MediaDispatcher`].

use std::sync::Arc;

use super::audio::finish_frame_audio;
use super::config::HostConfig;
use super::input::InputMapper;
use super::media::MediaDispatcher;
use crate::core::error::{ContractViolation, InputError, StateIoError};
use crate::core::frame::{FrameExchange, PixelFormat, Surface, SystemProfile};
use crate::core::input::{InputInfo, InputState};
use crate::core::log_context::LogContext;
use crate::core::media::SystemCommand;
use crate::core::system::{CoreSession, FrameReport};

/// Per-port input plumbing
struct PortInput {
    device: String,
    mapper: Option<InputMapper>,
}

/// Host side of a running core
pub struct Host {
    session: CoreSession,
    config: HostConfig,
    profile: Arc<SystemProfile>,
    surface: Surface,
    line_widths: Vec<u32>,
    sound: Vec<i16>,
    inputs: Vec<InputState>,
    ports: Vec<PortInput>,
    dispatcher: Option<MediaDispatcher>,
    audio_out: Vec<i16>,
    rewind: bool,
    clock_ms: f64,
    ctx: LogContext,
}

impl Host {
    /// Set up buffers and input for `session` according to `config`
    pub fn new(session: CoreSession, config: HostConfig) -> Self {
        let profile = session.profile();
        let ctx = session.context().child("host");

        let (width, height) = match config.surface {
            Some(o) => (o.width, o.height),
            None => (profile.fb_width, profile.fb_height),
        };
        let surface = Surface::new(width, height, PixelFormat::XRGB8888);

        let channels = profile.sound_channels.max(1) as usize;
        let sound = vec![0i16; config.sound_capacity() * channels];

        let input_info = Arc::clone(session.core().input_info());
        let (inputs, ports) = Self::plug_devices(&input_info, &profile, &config, &ctx);

        let dispatcher = match session.core().media() {
            Some(media) if !media.topology().drives().is_empty() => {
                MediaDispatcher::new(Arc::clone(media.topology()), 0).ok()
            }
            _ => None,
        };

        ctx.info(format_args!(
            "host ready: {}x{} surface, {} sample frames, {} port(s)",
            width,
            height,
            config.sound_capacity(),
            ports.len()
        ));

        Self {
            session,
            line_widths: vec![0; height as usize],
            profile,
            surface,
            sound,
            inputs,
            ports,
            dispatcher,
            audio_out: Vec::new(),
            rewind: false,
            clock_ms: 0.0,
            config,
            ctx,
        }
    }

    /// Pick a device per port: the configured one, else the profile's
    /// desired device, else the port default
    fn plug_devices(
        info: &InputInfo,
        profile: &SystemProfile,
        config: &HostConfig,
        ctx: &LogContext,
    ) -> (Vec<InputState>, Vec<PortInput>) {
        let mut inputs = Vec::with_capacity(info.ports.len());
        let mut ports = Vec::with_capacity(info.ports.len());

        for (i, port) in info.ports.iter().enumerate() {
            let bindings = config.input.port(port.short_name());
            let wanted = bindings
                .map(|b| b.device.as_str())
                .or_else(|| profile.desired_input.get(i).and_then(|d| d.as_deref()));

            let device = match wanted.and_then(|name| port.device(name)) {
                Some(device) => device,
                None => {
                    if let Some(name) = wanted {
                        ctx.warn(format_args!(
                            "port '{}' has no device '{}', using '{}'",
                            port.short_name(),
                            name,
                            port.default_device_name()
                        ));
                    }
                    port.default_device()
                }
            };

            let mapper = bindings.map(|b| {
                InputMapper::new(Arc::clone(&device.input), &b.bindings, config.rotation())
            });
            inputs.push(InputState::new(Arc::clone(&device.input)));
            ports.push(PortInput {
                device: device.short_name.clone(),
                mapper,
            });
        }
        (inputs, ports)
    }

    pub fn session(&self) -> &CoreSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CoreSession {
        &mut self.session
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Log target for host-side messages, nested under the session's
    #[inline]
    pub fn context(&self) -> &LogContext {
        &self.ctx
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Device short name plugged into each port
    pub fn devices(&self) -> Vec<&str> {
        self.ports.iter().map(|p| p.device.as_str()).collect()
    }

    /// Forward a key event to every port's mapper
    ///
    /// # Returns
    ///
    /// `true` if any port has the key bound
    pub fn handle_key(&mut self, key: &str, pressed: bool) -> bool {
        let mut handled = false;
        for port in &mut self.ports {
            if let Some(mapper) = &mut port.mapper {
                handled |= mapper.handle_key(key, pressed);
            }
        }
        handled
    }

    /// Set a field on a port directly
    pub fn set_field(&mut self, port: usize, setting_name: &str, value: u32) -> Result<(), InputError> {
        match self.ports.get_mut(port).and_then(|p| p.mapper.as_mut()) {
            Some(mapper) => mapper.set_field(setting_name, value),
            None => match self.inputs.get_mut(port) {
                Some(state) => state.set(setting_name, value),
                None => Err(InputError::UnknownField(setting_name.to_string())),
            },
        }
    }

    pub fn input(&self, port: usize) -> Option<&InputState> {
        self.inputs.get(port)
    }

    /// Run the core backwards while set, if it supports rewind
    pub fn set_rewind(&mut self, rewind: bool) {
        self.rewind = rewind;
    }

    /// Host time in milliseconds, advanced by one frame period per frame
    pub fn clock_ms(&self) -> u64 {
        self.clock_ms as u64
    }

    /// Handle a command: disk commands become queued transitions, the rest
    /// go to the core
    ///
    /// # Returns
    ///
    /// `true` if the command was accepted
    pub fn command(&mut self, command: SystemCommand) -> bool {
        if !command.is_media_command() {
            return self.session.command(command);
        }
        let now = self.clock_ms();
        let Some(request) = self
            .dispatcher
            .as_mut()
            .and_then(|d| d.dispatch(command, now))
        else {
            return matches!(command, SystemCommand::SelectDisk) && self.dispatcher.is_some();
        };
        match self.session.queue_transition(request) {
            Ok(()) => true,
            Err(e) => {
                self.ctx.warn(format_args!("dropping {}: {}", command, e));
                false
            }
        }
    }

    /// Run one frame and collect its audio
    ///
    /// # Errors
    ///
    /// Any [`ContractViolation`] reported by the session
    pub fn run_frame(&mut self) -> Result<FrameReport, ContractViolation> {
        for (port, state) in self.ports.iter().zip(self.inputs.iter_mut()) {
            if let Some(mapper) = &port.mapper {
                if let Err(e) = mapper.write_state(state) {
                    self.ctx
                        .warn(format_args!("input for '{}' not updated: {}", port.device, e));
                }
            }
        }

        let channels = self.profile.sound_channels;
        let mut exchange = FrameExchange::new(&mut self.surface, &self.inputs);
        exchange.line_widths = Some(self.line_widths.as_mut_slice());
        exchange.set_sound(&mut self.sound, self.config.sound_rate, channels);
        exchange.sound_volume = self.config.sound_volume;
        exchange.rewind = self.rewind;
        exchange.reverse_audio = self.rewind;

        let report = self.session.run_frame(&mut exchange)?;
        let audio = finish_frame_audio(&exchange);
        if self.config.debug.trace_frames {
            self.ctx.trace(format_args!(
                "frame {}: {:?} display, {} sound frames, {} cycles",
                report.frame,
                exchange.display_rect,
                exchange.sound_frames,
                exchange.master_cycles
            ));
        }
        drop(exchange);

        self.audio_out.extend_from_slice(&audio);
        let fps = self.profile.frames_per_second();
        if fps > 0.0 {
            self.clock_ms += 1000.0 / fps;
        }
        Ok(report)
    }

    /// Audio collected since the last call
    pub fn take_audio(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.audio_out)
    }

    pub fn save_state(&mut self) -> Result<Vec<u8>, StateIoError> {
        self.session.save_state()
    }

    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateIoError> {
        self.session.load_state(bytes)
    }
}
