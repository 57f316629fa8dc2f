//! # winpick-detector
//!
//! Window region detection for remote desktop frames.
//!
//! This crate provides:
//! - Frame conversion to luminance and RGBA buffers
//! - Sobel edge extraction and binarization
//! - Coarse-grid bounding box tracing
//! - Size filtering, size classification and thumbnail rendering
//!
//! ## Architecture
//!
//! This layer depends only on winpick-core. It is synchronous and CPU bound;
//! winpick-session drives it from a blocking task during a detection run.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod detection;
pub mod detectors;
pub mod edges;
pub mod raster;
pub mod testing;
pub mod thumbnail;
pub mod trace;

// Re-export commonly used types
pub use detection::FrameDetector;
pub use detectors::RegionDetector;
pub use trace::PixelBox;
