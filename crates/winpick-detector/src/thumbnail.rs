//! Thumbnail rendering for detected regions.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use winpick_core::{Error, Result, ThumbnailSettings};

use crate::trace::PixelBox;

/// Crop `source` to `bounds`, scale it to fit the configured size (aspect
/// ratio kept) and PNG-encode the result.
pub fn render_thumbnail(
    source: &RgbaImage,
    bounds: &PixelBox,
    settings: &ThumbnailSettings,
) -> Result<Vec<u8>> {
    let (width, height) = source.dimensions();
    if bounds.x >= width || bounds.y >= height {
        return Err(Error::Image(format!(
            "crop origin ({}, {}) outside {}x{} frame",
            bounds.x, bounds.y, width, height
        )));
    }

    let crop_width = bounds.width.min(width - bounds.x);
    let crop_height = bounds.height.min(height - bounds.y);
    let cropped =
        imageops::crop_imm(source, bounds.x, bounds.y, crop_width, crop_height).to_image();

    let scaled = DynamicImage::ImageRgba8(cropped).resize(
        settings.width,
        settings.height,
        FilterType::Triangle,
    );

    let mut out = Cursor::new(Vec::new());
    scaled
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Error::Image(format!("thumbnail encoding failed: {e}")))?;

    Ok(out.into_inner())
}
