//! Geometry types for frame coordinates and regions.

use std::hash::{Hash, Hasher};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Pixel dimensions of a frame or screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count (width * height).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Screen area as a float, used as the denominator for size classification.
    pub fn area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    /// Whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle in frame coordinates.
///
/// Width and height are always strictly positive and every component is
/// finite; [`Rect::new`] rejects anything else, and the fields are only
/// reachable through accessors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawRect", into = "RawRect")]
pub struct Rect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Result<Self> {
        if !(left.is_finite() && top.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(Error::InvalidRegion(format!(
                "non-finite bounds ({left}, {top}, {width}, {height})"
            )));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::InvalidRegion(format!(
                "width and height must be positive, got {width}x{height}"
            )));
        }

        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.top
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Area (width * height).
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

// Construction rejects NaN, so the float comparison is total.
impl Eq for Rect {}

impl Hash for Rect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Adding 0.0 folds -0.0 into 0.0, keeping Hash consistent with ==.
        for value in [self.left, self.top, self.width, self.height] {
            (value + 0.0).to_bits().hash(state);
        }
    }
}

/// Unvalidated wire form of [`Rect`].
#[derive(Serialize, Deserialize, JsonSchema)]
struct RawRect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl TryFrom<RawRect> for Rect {
    type Error = Error;

    fn try_from(raw: RawRect) -> Result<Self> {
        Rect::new(raw.left, raw.top, raw.width, raw.height)
    }
}

impl From<Rect> for RawRect {
    fn from(rect: Rect) -> Self {
        Self {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        }
    }
}
