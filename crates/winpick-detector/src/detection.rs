//! Core detection trait.

use winpick_core::{DetectedRegion, Frame};

/// Trait for per-frame region detectors.
///
/// Implementations must not fail: any internal problem (undecodable buffer,
/// degenerate frame) yields an empty result so a single bad frame never aborts
/// a detection run.
pub trait FrameDetector: Send + Sync {
    /// Detector name for debugging/logging.
    fn name(&self) -> &'static str;

    /// Detect regions in one frame, tagging each with `cycle_position`.
    fn detect(&self, frame: &Frame, cycle_position: u32) -> Vec<DetectedRegion>;
}
