//! Testing utilities for window region detection.
//!
//! Provides a synthetic desktop renderer for building frames with known
//! window geometry.

pub mod synthetic;

pub use synthetic::SyntheticScreen;
