//! Conversion from raw frames to `image` buffers.

use image::{GrayImage, RgbaImage};
use winpick_core::{Error, Frame, PixelFormat, Result};

/// Rec. 601 luma with integer weights (sum 1000).
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

/// Build a luminance image from a frame.
pub fn luminance(frame: &Frame) -> Result<GrayImage> {
    frame.validate()?;

    let pixels = frame.pixels();
    let gray: Vec<u8> = match frame.format() {
        PixelFormat::Gray8 => pixels.to_vec(),
        PixelFormat::Rgb8 => pixels
            .chunks_exact(3)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect(),
        PixelFormat::Rgba8 => pixels
            .chunks_exact(4)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect(),
        PixelFormat::Bgra8 => pixels
            .chunks_exact(4)
            .map(|p| luma(p[2], p[1], p[0]))
            .collect(),
    };

    GrayImage::from_raw(frame.width(), frame.height(), gray)
        .ok_or_else(|| Error::Image("luminance buffer size mismatch".to_string()))
}

/// Build an RGBA image from a frame.
pub fn to_rgba(frame: &Frame) -> Result<RgbaImage> {
    frame.validate()?;

    let pixels = frame.pixels();
    let rgba: Vec<u8> = match frame.format() {
        PixelFormat::Rgba8 => pixels.to_vec(),
        PixelFormat::Bgra8 => pixels
            .chunks_exact(4)
            .flat_map(|p| [p[2], p[1], p[0], p[3]])
            .collect(),
        PixelFormat::Rgb8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], u8::MAX])
            .collect(),
        PixelFormat::Gray8 => pixels.iter().flat_map(|&v| [v, v, v, u8::MAX]).collect(),
    };

    RgbaImage::from_raw(frame.width(), frame.height(), rgba)
        .ok_or_else(|| Error::Image("rgba buffer size mismatch".to_string()))
}
