//! # winpick
//!
//! Finds the windows of a remote desktop session, lets the user pick some,
//! and switches between the picked ones.
//!
//! ## Overview
//!
//! This binary replays a directory of recorded screenshots as the remote
//! desktop and prints a JSON report of what was detected.
//!
//! ## Architecture
//!
//! This is the top layer that ties together:
//! - winpick-core: Core types and configuration
//! - winpick-detector: Window region detection
//! - winpick-session: Detection runs and the phase controller

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winpick::{Cli, DetectionReport, ReplayDesktop, RunOptions};
use winpick_core::RunId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.schema {
        println!(
            "{}",
            serde_json::to_string_pretty(&DetectionReport::json_schema())?
        );
        return Ok(());
    }

    let config = cli.load_config().context("failed to load configuration")?;

    // Initialize logging
    winpick::init_tracing(&config.logging.level);

    let run_id = RunId::new();
    tracing::info!("winpick v{} starting run {}", env!("CARGO_PKG_VERSION"), run_id);

    let Some(frames) = cli.frames.as_deref() else {
        anyhow::bail!("--frames is required");
    };
    let desktop = Arc::new(
        ReplayDesktop::from_dir(frames)
            .with_context(|| format!("failed to load frames from {}", frames.display()))?,
    );
    if desktop.is_empty() {
        tracing::warn!("No frames found in {}", frames.display());
    }

    let report = winpick::run(&config, desktop, &RunOptions::from(&cli), run_id).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
