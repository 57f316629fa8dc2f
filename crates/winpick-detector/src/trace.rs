//! Coarse-grid bounding box tracing over a binarized edge image.

use image::GrayImage;
use winpick_core::{Dimensions, Rect, Result};

use crate::edges::BACKGROUND;

/// Integer bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels (at least 1)
    pub width: u32,
    /// Height in pixels (at least 1)
    pub height: u32,
}

impl PixelBox {
    /// Create a new box.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area in pixels.
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// Whether the box is strictly larger than `min_size` on both sides and
    /// strictly smaller than `max_fraction` of the screen on both sides.
    pub fn fits(&self, screen: Dimensions, min_size: u32, max_fraction: f64) -> bool {
        self.width > min_size
            && self.height > min_size
            && f64::from(self.width) < max_fraction * f64::from(screen.width)
            && f64::from(self.height) < max_fraction * f64::from(screen.height)
    }

    /// Convert to floating-point bounds.
    pub fn to_rect(&self) -> Result<Rect> {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

/// Trace bounding boxes from seeds on a `stride` grid.
///
/// Every unvisited foreground pixel on the grid starts a box. The box grows to
/// cover each unvisited foreground pixel inside the `window`×`window` square
/// whose top-left corner is the seed, and those pixels are marked visited so
/// they never seed or join another box.
pub fn trace_boxes(binary: &GrayImage, stride: u32, window: u32) -> Vec<PixelBox> {
    let (width, height) = binary.dimensions();
    let stride = stride.max(1) as usize;
    let row_len = width as usize;
    let pixels = binary.as_raw();
    let mut visited = vec![false; pixels.len()];
    let mut boxes = Vec::new();

    for seed_y in (0..height).step_by(stride) {
        for seed_x in (0..width).step_by(stride) {
            let seed = seed_y as usize * row_len + seed_x as usize;
            if visited[seed] || pixels[seed] == BACKGROUND {
                continue;
            }

            let x_end = seed_x.saturating_add(window).min(width);
            let y_end = seed_y.saturating_add(window).min(height);

            let (mut min_x, mut min_y) = (seed_x, seed_y);
            let (mut max_x, mut max_y) = (seed_x, seed_y);

            for y in seed_y..y_end {
                let base = y as usize * row_len;
                for x in seed_x..x_end {
                    let idx = base + x as usize;
                    if visited[idx] || pixels[idx] == BACKGROUND {
                        continue;
                    }
                    visited[idx] = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }

            boxes.push(PixelBox::new(
                min_x,
                min_y,
                max_x - min_x + 1,
                max_y - min_y + 1,
            ));
        }
    }

    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::FOREGROUND;
    use image::Luma;

    /// Binary image with a one-pixel rectangle outline.
    fn outline(width: u32, height: u32, bx: PixelBox) -> GrayImage {
        let right = bx.x + bx.width - 1;
        let bottom = bx.y + bx.height - 1;
        GrayImage::from_fn(width, height, |x, y| {
            let on_vertical = (x == bx.x || x == right) && (bx.y..=bottom).contains(&y);
            let on_horizontal = (y == bx.y || y == bottom) && (bx.x..=right).contains(&x);
            if on_vertical || on_horizontal {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }

    #[test]
    fn test_single_outline_from_aligned_seed() {
        let expected = PixelBox::new(20, 10, 60, 40);
        let binary = outline(200, 100, expected);

        let boxes = trace_boxes(&binary, 5, 200);
        assert_eq!(boxes, vec![expected]);
    }

    #[test]
    fn test_window_limits_growth() {
        let binary = outline(300, 100, PixelBox::new(0, 0, 250, 50));

        let boxes = trace_boxes(&binary, 5, 100);

        // The first seed only reaches 100 columns; the rest of the top and
        // bottom edges seed further boxes.
        assert!(boxes.len() > 1);
        assert_eq!(boxes[0], PixelBox::new(0, 0, 100, 50));
    }

    #[test]
    fn test_visited_pixels_do_not_seed_again() {
        let binary = outline(200, 100, PixelBox::new(10, 10, 50, 50));
        let boxes = trace_boxes(&binary, 5, 200);
        assert_eq!(boxes.len(), 1);
    }

    #[test]
    fn test_unaligned_outline_is_missed() {
        // No grid point lands on the outline
        let binary = outline(100, 100, PixelBox::new(11, 11, 23, 23));
        assert!(trace_boxes(&binary, 5, 200).is_empty());
    }

    #[test]
    fn test_empty_image() {
        let binary = GrayImage::new(0, 0);
        assert!(trace_boxes(&binary, 5, 200).is_empty());
    }

    #[test]
    fn test_zero_stride_does_not_panic() {
        let binary = outline(50, 50, PixelBox::new(0, 0, 10, 10));
        assert_eq!(trace_boxes(&binary, 0, 200).len(), 1);
    }

    #[test]
    fn test_fits() {
        let screen = Dimensions::new(400, 300);
        assert!(PixelBox::new(0, 0, 51, 51).fits(screen, 50, 0.9));
        assert!(!PixelBox::new(0, 0, 50, 200).fits(screen, 50, 0.9));
        assert!(!PixelBox::new(0, 0, 360, 100).fits(screen, 50, 0.9));
        assert!(PixelBox::new(0, 0, 359, 269).fits(screen, 50, 0.9));
        assert!(!PixelBox::new(0, 0, 100, 270).fits(screen, 50, 0.9));
    }

    #[test]
    fn test_to_rect() {
        let rect = PixelBox::new(5, 6, 7, 8).to_rect().unwrap();
        assert_eq!(
            (rect.left(), rect.top(), rect.width(), rect.height()),
            (5.0, 6.0, 7.0, 8.0)
        );
    }
}
