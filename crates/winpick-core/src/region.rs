//! Detected window regions and their size categories.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{Error, Rect, Result};

/// Share of the screen at or above which a region is [`RegionCategory::Large`].
pub const LARGE_REGION_THRESHOLD: f64 = 0.15;

/// Share of the screen at or above which a region is [`RegionCategory::Medium`].
pub const MEDIUM_REGION_THRESHOLD: f64 = 0.05;

/// Size class of a region relative to the whole screen.
///
/// Ordered `Small < Medium < Large`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RegionCategory {
    /// Below the medium threshold; never shown to the user
    Small,
    /// Between the medium and large thresholds
    Medium,
    /// At or above the large threshold
    Large,
}

impl RegionCategory {
    /// Classify a screen share with the default thresholds.
    ///
    /// # Example
    /// ```
    /// use winpick_core::RegionCategory;
    ///
    /// assert_eq!(RegionCategory::classify(0.15), RegionCategory::Large);
    /// assert_eq!(RegionCategory::classify(0.05), RegionCategory::Medium);
    /// assert_eq!(RegionCategory::classify(0.0499), RegionCategory::Small);
    /// ```
    pub fn classify(percentage: f64) -> Self {
        Self::classify_with(percentage, LARGE_REGION_THRESHOLD, MEDIUM_REGION_THRESHOLD)
    }

    /// Classify a screen share with explicit thresholds. Boundaries belong to
    /// the higher category.
    pub fn classify_with(percentage: f64, large: f64, medium: f64) -> Self {
        if percentage >= large {
            RegionCategory::Large
        } else if percentage >= medium {
            RegionCategory::Medium
        } else {
            RegionCategory::Small
        }
    }

    /// Lowercase name, as used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCategory::Small => "small",
            RegionCategory::Medium => "medium",
            RegionCategory::Large => "large",
        }
    }
}

impl fmt::Display for RegionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A window-like region found in a frame.
///
/// Immutable once built. Equality and hashing use the bounds, cycle position
/// and category only; two detections that differ just in thumbnail pixels are
/// the same region.
#[derive(Clone, Serialize)]
pub struct DetectedRegion {
    bounds: Rect,
    cycle_position: u32,
    #[serde(skip_serializing)]
    thumbnail: Arc<[u8]>,
    category: RegionCategory,
}

impl DetectedRegion {
    /// Build a region. Fails if the thumbnail is empty.
    pub fn new(
        bounds: Rect,
        cycle_position: u32,
        thumbnail: impl Into<Arc<[u8]>>,
        category: RegionCategory,
    ) -> Result<Self> {
        let thumbnail = thumbnail.into();
        if thumbnail.is_empty() {
            return Err(Error::InvalidRegion("thumbnail is empty".to_string()));
        }

        Ok(Self {
            bounds,
            cycle_position,
            thumbnail,
            category,
        })
    }

    /// Bounding box in frame coordinates.
    pub fn bounds(&self) -> &Rect {
        &self.bounds
    }

    /// Cycling round in which this region was first observed.
    pub fn cycle_position(&self) -> u32 {
        self.cycle_position
    }

    /// Encoded thumbnail bytes.
    pub fn thumbnail(&self) -> &[u8] {
        &self.thumbnail
    }

    /// Size category.
    pub fn category(&self) -> RegionCategory {
        self.category
    }

    /// Area of the bounds.
    pub fn area(&self) -> f64 {
        self.bounds.area()
    }

    /// Copy with a different category.
    pub fn with_category(&self, category: RegionCategory) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }

    /// Copy with a different cycle position.
    pub fn with_cycle_position(&self, cycle_position: u32) -> Self {
        Self {
            cycle_position,
            ..self.clone()
        }
    }

    /// Copy with a different thumbnail.
    pub fn with_thumbnail(&self, thumbnail: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::new(self.bounds, self.cycle_position, thumbnail, self.category)
    }
}

impl PartialEq for DetectedRegion {
    fn eq(&self, other: &Self) -> bool {
        self.bounds == other.bounds
            && self.cycle_position == other.cycle_position
            && self.category == other.category
    }
}

impl Eq for DetectedRegion {}

impl Hash for DetectedRegion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bounds.hash(state);
        self.cycle_position.hash(state);
        self.category.hash(state);
    }
}

impl fmt::Debug for DetectedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectedRegion")
            .field("bounds", &self.bounds)
            .field("cycle_position", &self.cycle_position)
            .field("thumbnail_len", &self.thumbnail.len())
            .field("category", &self.category)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn region(left: f64, cycle: u32, thumbnail: &[u8]) -> DetectedRegion {
        DetectedRegion::new(
            Rect::new(left, 0.0, 100.0, 80.0).unwrap(),
            cycle,
            thumbnail.to_vec(),
            RegionCategory::Medium,
        )
        .unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(RegionCategory::classify(0.15), RegionCategory::Large);
        assert_eq!(RegionCategory::classify(0.149999), RegionCategory::Medium);
        assert_eq!(RegionCategory::classify(0.05), RegionCategory::Medium);
        assert_eq!(RegionCategory::classify(0.0499), RegionCategory::Small);
        assert_eq!(RegionCategory::classify(0.0), RegionCategory::Small);
        assert_eq!(RegionCategory::classify(1.0), RegionCategory::Large);
    }

    #[test]
    fn test_category_ordering() {
        assert!(RegionCategory::Large > RegionCategory::Medium);
        assert!(RegionCategory::Medium > RegionCategory::Small);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(RegionCategory::Large.to_string(), "large");
        assert_eq!(
            serde_json::to_string(&RegionCategory::Medium).unwrap(),
            "\"medium\""
        );
    }

    #[test]
    fn test_empty_thumbnail_rejected() {
        let result = DetectedRegion::new(
            Rect::new(0.0, 0.0, 10.0, 10.0).unwrap(),
            0,
            Vec::new(),
            RegionCategory::Large,
        );
        assert!(matches!(result, Err(Error::InvalidRegion(_))));
    }

    #[test]
    fn test_equality_ignores_thumbnail() {
        let a = region(10.0, 1, &[1, 2, 3]);
        let b = region(10.0, 1, &[9, 9]);
        assert_eq!(a, b);

        let set: HashSet<DetectedRegion> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_equality_uses_cycle_position_and_category() {
        let a = region(10.0, 1, &[1]);
        assert_ne!(a, a.with_cycle_position(2));
        assert_ne!(a, a.with_category(RegionCategory::Large));
        assert_ne!(a, region(11.0, 1, &[1]));
    }

    #[test]
    fn test_copy_with_leaves_original_untouched() {
        let original = region(10.0, 3, &[1, 2]);
        let moved = original.with_cycle_position(5);
        assert_eq!(original.cycle_position(), 3);
        assert_eq!(moved.cycle_position(), 5);
        assert_eq!(moved.thumbnail(), original.thumbnail());

        let rethumbed = original.with_thumbnail(vec![4, 5, 6]).unwrap();
        assert_eq!(rethumbed.thumbnail(), &[4, 5, 6]);
        assert!(original.with_thumbnail(Vec::new()).is_err());
    }

    #[test]
    fn test_region_serialization_skips_thumbnail() {
        let json = serde_json::to_value(region(10.0, 2, &[1, 2, 3])).unwrap();
        assert_eq!(json["cycle_position"], 2);
        assert_eq!(json["category"], "medium");
        assert!(json.get("thumbnail").is_none());
    }
}
