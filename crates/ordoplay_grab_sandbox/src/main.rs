// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` Grab Sandbox - headless scripted play session
//!
//! Builds a small scene, drives the grab interaction with a timed input
//! script and logs what the hand does:
//! - First-person look rig with clamped pitch
//! - Fixed-step clock with pause and single-step
//! - RON settings for the interaction and the player rig
//!
//! Set `RUST_LOG` to change the log filter.

mod error;
mod looker;
mod play_mode;
mod scene;
mod script;
mod session;
mod settings;

use clap::Parser;
use error::Result;
use ordoplay_grab::InteractionSettings;
use script::InputScript;
use session::{Session, SessionReport};
use settings::SandboxSettings;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless scripted play session for the OrdoPlay grab interaction")]
struct Args {
    /// Interaction settings (RON). Defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Player rig settings (RON). Defaults are used when omitted
    #[arg(long)]
    sandbox: Option<PathBuf>,
    /// Input script (RON). The built-in demo script is used when omitted
    #[arg(long)]
    script: Option<PathBuf>,
    /// Session length in seconds
    #[arg(long, default_value_t = 6.0)]
    duration: f32,
    /// Rendered frames per second
    #[arg(long, default_value_t = 60.0)]
    frame_rate: f32,
    /// Simulated seconds per real second
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the default directives
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ordoplay_grab=debug,ordoplay_grab_sandbox=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OrdoPlay Grab Sandbox v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(report) => {
            tracing::info!(
                "Session finished: {} frames, {} steps, {} grabs, {} releases, holding {}",
                report.frames,
                report.steps,
                report.grabs,
                report.releases,
                report.held_at_end.as_deref().unwrap_or("nothing")
            );
        }
        Err(e) => {
            tracing::error!("Sandbox failed: {e}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<SessionReport> {
    let settings = match &args.settings {
        Some(path) => InteractionSettings::load(path)?,
        None => InteractionSettings::default(),
    };
    let sandbox = match &args.sandbox {
        Some(path) => SandboxSettings::load(path)?,
        None => SandboxSettings::default(),
    };
    let script = match &args.script {
        Some(path) => InputScript::load(path)?,
        None => InputScript::demo(),
    };

    let mut session = Session::new(&settings, &sandbox, script)?;
    session.set_time_scale(args.time_scale);
    session.run(args.duration, args.frame_rate)
}
