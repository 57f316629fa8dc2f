//! Synthetic desktop frames.

use winpick_core::{Frame, PixelFormat};

/// Default desktop background colour.
pub const DEFAULT_BACKGROUND: [u8; 3] = [16, 16, 16];

/// Default window fill colour.
pub const DEFAULT_WINDOW: [u8; 3] = [235, 235, 235];

#[derive(Debug, Clone, Copy)]
struct Window {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    color: [u8; 3],
}

/// Builder for desktop frames made of flat-coloured windows on a flat
/// background. Windows are painted in insertion order, later ones on top.
///
/// ```
/// use winpick_detector::testing::SyntheticScreen;
///
/// let frame = SyntheticScreen::new(400, 300)
///     .with_window(50, 50, 150, 130)
///     .render();
/// assert_eq!(frame.width(), 400);
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticScreen {
    width: u32,
    height: u32,
    background: [u8; 3],
    windows: Vec<Window>,
}

impl SyntheticScreen {
    /// Create an empty desktop.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: DEFAULT_BACKGROUND,
            windows: Vec::new(),
        }
    }

    /// Set the background colour.
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }

    /// Add a window with the default fill colour.
    pub fn with_window(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.with_colored_window(x, y, width, height, DEFAULT_WINDOW)
    }

    /// Add a window with an explicit fill colour.
    pub fn with_colored_window(
        mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: [u8; 3],
    ) -> Self {
        self.windows.push(Window {
            x,
            y,
            width,
            height,
            color,
        });
        self
    }

    fn color_at(&self, x: u32, y: u32) -> [u8; 3] {
        self.windows
            .iter()
            .rev()
            .find(|w| {
                x >= w.x
                    && y >= w.y
                    && x < w.x.saturating_add(w.width)
                    && y < w.y.saturating_add(w.height)
            })
            .map_or(self.background, |w| w.color)
    }

    /// Render as an RGBA frame.
    pub fn render(&self) -> Frame {
        self.render_as(PixelFormat::Rgba8)
    }

    /// Render in the given pixel format. Gray output uses the red channel,
    /// so keep window colours neutral when comparing formats.
    pub fn render_as(&self, format: PixelFormat) -> Frame {
        let capacity = self.width as usize * self.height as usize * format.bytes_per_pixel();
        let mut pixels = Vec::with_capacity(capacity);

        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b] = self.color_at(x, y);
                match format {
                    PixelFormat::Rgba8 => pixels.extend_from_slice(&[r, g, b, u8::MAX]),
                    PixelFormat::Bgra8 => pixels.extend_from_slice(&[b, g, r, u8::MAX]),
                    PixelFormat::Rgb8 => pixels.extend_from_slice(&[r, g, b]),
                    PixelFormat::Gray8 => pixels.push(r),
                }
            }
        }

        Frame::new(pixels, self.width, self.height, format)
    }
}
