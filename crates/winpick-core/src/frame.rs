//! Raw raster frames captured from the remote session.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Dimensions, Error, Result};

/// Pixel layout of a [`Frame`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit red, green, blue, alpha
    Rgba8,
    /// 8-bit blue, green, red, alpha (common for desktop capture APIs)
    Bgra8,
    /// 8-bit red, green, blue
    Rgb8,
    /// 8-bit luminance
    Gray8,
}

impl PixelFormat {
    /// Number of bytes used by a single pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// One full-screen frame.
///
/// The pixel buffer is shared, so cloning a frame does not copy pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: Arc<[u8]>,
    dimensions: Dimensions,
    format: PixelFormat,
}

impl Frame {
    /// Wrap a pixel buffer.
    ///
    /// No validation happens here: a remote session can hand over truncated
    /// buffers, and the detector treats those as degenerate frames. Use
    /// [`Frame::validate`] to check explicitly.
    pub fn new(
        pixels: impl Into<Arc<[u8]>>,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Self {
        Self {
            pixels: pixels.into(),
            dimensions: Dimensions::new(width, height),
            format,
        }
    }

    /// Raw pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Frame dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Frame width.
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    /// Frame height.
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Pixel layout.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Buffer length implied by the dimensions and pixel format.
    pub fn expected_len(&self) -> usize {
        self.dimensions.pixel_count() * self.format.bytes_per_pixel()
    }

    /// Check that the frame is non-empty and its buffer matches its dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.is_empty() {
            return Err(Error::InvalidFrame(format!(
                "degenerate size {}x{}",
                self.dimensions.width, self.dimensions.height
            )));
        }

        if self.pixels.len() != self.expected_len() {
            return Err(Error::InvalidFrame(format!(
                "buffer holds {} bytes, {}x{} {:?} needs {}",
                self.pixels.len(),
                self.dimensions.width,
                self.dimensions.height,
                self.format,
                self.expected_len()
            )));
        }

        Ok(())
    }
}
