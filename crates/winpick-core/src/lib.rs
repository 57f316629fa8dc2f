//! # winpick-core
//!
//! Core types for winpick.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other winpick crates. It provides:
//!
//! - Geometry types (Rect, Dimensions)
//! - Raw frames and pixel formats
//! - Detected regions and their size categories
//! - Detection run identifiers
//! - Configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other winpick crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod region;
pub mod session;

// Re-export commonly used types
pub use config::{
    CyclingSettings, DetectionSettings, LoggingSettings, ThumbnailSettings, WinpickConfig,
};
pub use error::{Error, Result};
pub use frame::{Frame, PixelFormat};
pub use geometry::{Dimensions, Rect};
pub use region::{DetectedRegion, RegionCategory};
pub use session::RunId;
