//! Sobel gradient magnitude and binarization.

use image::{GrayImage, Luma};

/// Pixel value for foreground in a binarized image.
pub const FOREGROUND: u8 = 255;

/// Pixel value for background in a binarized image.
pub const BACKGROUND: u8 = 0;

/// Compute the Sobel gradient magnitude of a luminance image.
///
/// The magnitude `sqrt(gx² + gy²)` is saturated to `0..=255`. The outermost
/// one-pixel border has no full 3×3 neighbourhood and is left at zero.
pub fn sobel_magnitude(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut out = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return out;
    }

    let src = gray.as_raw();
    let stride = width as usize;

    for y in 1..(height as usize - 1) {
        let above = (y - 1) * stride;
        let row = y * stride;
        let below = (y + 1) * stride;

        for x in 1..(width as usize - 1) {
            let p = |base: usize, dx: usize| i32::from(src[base + x + dx - 1]);

            let gx = (p(above, 2) + 2 * p(row, 2) + p(below, 2))
                - (p(above, 0) + 2 * p(row, 0) + p(below, 0));
            let gy = (p(below, 0) + 2 * p(below, 1) + p(below, 2))
                - (p(above, 0) + 2 * p(above, 1) + p(above, 2));

            let magnitude = f64::from(gx * gx + gy * gy).sqrt().min(255.0) as u8;
            out.put_pixel(x as u32, y as u32, Luma([magnitude]));
        }
    }

    out
}

/// Binarize an edge image: strictly above `threshold` becomes foreground.
pub fn binarize(edges: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = edges.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > threshold {
            FOREGROUND
        } else {
            BACKGROUND
        };
    }
    out
}
