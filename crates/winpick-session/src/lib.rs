//! # winpick-session
//!
//! Window detection runs and the window-mode phase controller.
//!
//! This crate provides:
//! - `FrameSource`/`Cycler` capabilities for the remote desktop
//! - The capture/detect/cycle loop with deduplication and a run timeout
//! - Replay of recorded cycle offsets to reach a window again
//! - The phase state machine with change notifications
//!
//! ## Architecture
//!
//! This layer depends on winpick-core and winpick-detector. Detection runs
//! on the blocking pool; everything else is async on tokio.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capture;
pub mod controller;
pub mod detection;
pub mod navigation;
pub mod testing;

// Re-export commonly used types
pub use capture::{Cycler, FrameSource};
pub use controller::{Phase, PhaseController, PhaseSnapshot, SubscriptionId};
pub use detection::{DedupKey, DetectionSession, RegionAccumulator};
pub use navigation::NavigationCalculator;
