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

//! corelink command line
//!
//! Inspects registered cores and runs them headless.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use corelink::core::system::{registry, CoreSession};
use corelink::core::LogContext;
use corelink::frontend::{FrameTimer, Host, HostConfig};

#[derive(Parser)]
#[command(name = "corelink", version, about = "Emulation core host")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered cores
    List,

    /// Print a core's profile, input ports and media topology
    Describe {
        /// Core short name
        #[arg(default_value = "pattern")]
        core: String,

        /// Emit JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run a core for a number of frames without a window
    Run {
        #[arg(long, default_value_t = 60)]
        frames: u64,

        /// Host configuration (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Load this save state before the first frame
        #[arg(long)]
        state_in: Option<PathBuf>,

        /// Write a save state after the last frame
        #[arg(long)]
        state_out: Option<PathBuf>,

        /// Cheat code to activate (repeatable)
        #[arg(long)]
        cheat: Vec<String>,

        /// Pace frames at the core's refresh rate
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env may carry RUST_LOG
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let ctx = LogContext::new("corelink");

    match cli.command {
        Command::List => {
            for entry in registry::all() {
                println!("{:<12} {}", entry.name, entry.full_name);
            }
            Ok(())
        }
        Command::Describe { core, json } => describe(&core, json, &ctx),
        Command::Run {
            frames,
            config,
            state_in,
            state_out,
            cheat,
            realtime,
        } => {
            let config = match config {
                Some(path) => HostConfig::load_or_default(path),
                None => HostConfig::default(),
            };
            run(config, frames, state_in, state_out, &cheat, realtime, &ctx)
        }
    }
}

fn describe(name: &str, json: bool, ctx: &LogContext) -> Result<(), Box<dyn std::error::Error>> {
    let entry = registry::find(name).ok_or_else(|| format!("unknown core '{}'", name))?;
    let core = (entry.create)(ctx)?;
    let profile = core.profile();
    let input = core.input_info();

    if json {
        let doc = serde_json::json!({
            "profile": profile,
            "input": input,
            "cheat_formats": core
                .cheat_interface()
                .formats()
                .iter()
                .map(|f| f.name())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{} ({})", profile.full_name, profile.short_name);
    println!(
        "  video: {}x{} (nominal {}x{}), {:.3} fps, {:?}",
        profile.fb_width,
        profile.fb_height,
        profile.nominal_width,
        profile.nominal_height,
        profile.frames_per_second(),
        profile.video_system
    );
    println!(
        "  audio: {} channel(s), master clock {:.0} Hz",
        profile.sound_channels,
        profile.master_clock.hz()
    );

    for port in &input.ports {
        println!("  port {} ({})", port.short_name(), port.full_name());
        for device in port.devices() {
            let set = &device.input;
            println!(
                "    device {} - {} field(s), {} byte(s)",
                device.short_name,
                set.len(),
                set.byte_size()
            );
            for field in set.fields() {
                println!(
                    "      {:<10} {:<14} bit {:>3} width {}",
                    field.setting_name(),
                    field.kind().name(),
                    field.bit_offset(),
                    field.bit_size()
                );
            }
        }
    }

    if let Some(topology) = &profile.topology {
        for (i, drive) in topology.drives().iter().enumerate() {
            let states: Vec<_> = drive.states.iter().map(|s| s.name.as_str()).collect();
            println!("  drive {} '{}': {}", i, drive.name, states.join(" / "));
            for m in topology.compatible_media(i) {
                if let Some(item) = topology.media_item(m) {
                    println!("    media {} '{}'", m, item.name);
                }
            }
        }
    }

    for format in core.cheat_interface().formats() {
        println!("  cheat format {}: {}", format.name(), format.description());
    }
    Ok(())
}

fn run(
    config: HostConfig,
    frames: u64,
    state_in: Option<PathBuf>,
    state_out: Option<PathBuf>,
    cheats: &[String],
    realtime: bool,
    ctx: &LogContext,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry = registry::find(&config.core)
        .ok_or_else(|| format!("unknown core '{}'", config.core))?;
    let core = (entry.create)(ctx)?;
    let mut session = CoreSession::new(core, ctx.child(entry.name));

    if config.debug.log_profile {
        log::info!("profile: {}", session.profile().to_json()?);
    }
    for code in cheats {
        session.add_cheat(code)?;
    }
    if let Some(path) = &state_in {
        let bytes = std::fs::read(path)?;
        session.load_state(&bytes)?;
        log::info!("Loaded state from {}", path.display());
    }

    let mut host = Host::new(session, config);
    let mut timer = if realtime {
        FrameTimer::from_profile(&host.session().profile())
    } else {
        None
    };

    let mut samples = 0usize;
    for _ in 0..frames {
        if let Some(timer) = &mut timer {
            std::thread::sleep(timer.time_until_next_frame());
        }
        host.run_frame()?;
        samples += host.take_audio().len();
        if let Some(timer) = &mut timer {
            timer.tick();
        }
    }

    let checksum = host
        .surface()
        .pixels
        .iter()
        .fold(0u32, |acc, &p| acc.rotate_left(5) ^ p);
    println!(
        "ran {} frame(s): {} audio sample(s), surface checksum {:08x}",
        host.session().frames(),
        samples,
        checksum
    );

    if let Some(path) = &state_out {
        let bytes = host.save_state()?;
        std::fs::write(path, &bytes)?;
        log::info!("Saved {} byte state to {}", bytes.len(), path.display());
    }
    Ok(())
}
