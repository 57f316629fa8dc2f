//! winpick library
//!
//! Drives window mode over a recorded desktop and produces the JSON report.
//! The binary entry point is in main.rs.

pub mod cli;
pub mod replay;
pub mod report;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use winpick_core::{RunId, WinpickConfig};
use winpick_detector::RegionDetector;
use winpick_session::{DetectionSession, Phase, PhaseController};

// Re-export commonly used types
pub use cli::Cli;
pub use replay::ReplayDesktop;
pub use report::{DetectionReport, RegionReport};

/// Initialize logging to stderr. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// What to do after detection.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Indices into the detected list; `None` selects everything
    pub select: Option<Vec<usize>>,
    /// Index into the selection to switch to
    pub navigate: Option<usize>,
    /// Directory for region thumbnails
    pub thumbnails: Option<PathBuf>,
}

impl From<&Cli> for RunOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            select: cli.select.clone(),
            navigate: cli.navigate,
            thumbnails: cli.thumbnails.clone(),
        }
    }
}

/// Detect windows on `desktop`, select, optionally switch to one, and
/// report the final state.
pub async fn run(
    config: &WinpickConfig,
    desktop: Arc<ReplayDesktop>,
    options: &RunOptions,
    run_id: RunId,
) -> anyhow::Result<DetectionReport> {
    let detector =
        RegionDetector::with_settings(config.detection.clone(), config.thumbnail.clone());
    let session = DetectionSession::new(desktop.clone(), desktop)
        .with_detector(Arc::new(detector))
        .with_settings(config.cycling.clone());
    let controller = PhaseController::new(session);

    controller.subscribe(|snapshot| {
        info!(
            phase = %snapshot.phase,
            detected = snapshot.detected.len(),
            selected = snapshot.selected.len(),
            processing = snapshot.processing,
            "State changed"
        );
    });

    controller.start_window_detection().await;

    if controller.phase() == Phase::Selecting {
        let detected = controller.detected();
        let picks = match &options.select {
            Some(indices) => indices
                .iter()
                .map(|&i| {
                    detected.get(i).cloned().with_context(|| {
                        format!("selection index {} out of range ({} detected)", i, detected.len())
                    })
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => detected.to_vec(),
        };
        controller.select_windows(picks);
    }

    if let Some(index) = options.navigate {
        if controller.phase() != Phase::Navigating {
            warn!(
                "Not switching to window {}: window mode is in phase {}",
                index,
                controller.phase()
            );
        } else if !controller.navigate_to_window(index).await {
            warn!("Switch to window {} was rejected", index);
        }
    }

    let snapshot = controller.snapshot();
    let mut report = DetectionReport::from_snapshot(run_id, &snapshot);

    if let Some(dir) = &options.thumbnails {
        report
            .write_thumbnails(&snapshot.detected, dir)
            .with_context(|| format!("failed to write thumbnails to {}", dir.display()))?;
        info!("Wrote {} thumbnails to {}", report.detected.len(), dir.display());
    }

    Ok(report)
}
