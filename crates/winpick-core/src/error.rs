//! Error types for winpick.

use thiserror::Error;

/// Main error type for winpick operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The whole detection run exceeded its time budget
    #[error("Window detection timed out after {0}s")]
    DetectionTimeout(u64),

    /// Capture, decode or tracing fault during detection
    #[error("Window detection failed: {0}")]
    Detection(String),

    /// Detection finished but nothing survived filtering
    #[error("No windows detected. Make sure windows are open on the remote desktop and try again.")]
    EmptyDetectionResult,

    /// The user confirmed a selection with no regions in it
    #[error("No windows selected. Select at least one window to continue.")]
    EmptySelection,

    /// Cycling to the target window failed
    #[error("Failed to switch window: {0}")]
    Navigation(String),

    /// Region failed validation
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Frame buffer does not match its declared size
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Image decoding or encoding failure
    #[error("Image error: {0}")]
    Image(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
