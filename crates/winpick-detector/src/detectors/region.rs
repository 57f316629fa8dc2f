//! Edge-based window region detector.

use tracing::{debug, trace, warn};
use winpick_core::{
    DetectedRegion, DetectionSettings, Frame, RegionCategory, Result, ThumbnailSettings,
};

use crate::detection::FrameDetector;
use crate::edges::{binarize, sobel_magnitude};
use crate::raster::{luminance, to_rgba};
use crate::thumbnail::render_thumbnail;
use crate::trace::{trace_boxes, PixelBox};

/// Detector for window-like rectangles in a full-screen frame.
///
/// Pipeline: luminance → Sobel magnitude → threshold → coarse-grid box
/// tracing → size filter → classification → thumbnail.
#[derive(Debug, Clone, Default)]
pub struct RegionDetector {
    settings: DetectionSettings,
    thumbnail: ThumbnailSettings,
}

impl RegionDetector {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with explicit settings.
    pub fn with_settings(settings: DetectionSettings, thumbnail: ThumbnailSettings) -> Self {
        Self {
            settings,
            thumbnail,
        }
    }

    /// Detection settings in use.
    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Run detection, surfacing internal failures instead of swallowing them.
    pub fn try_detect(&self, frame: &Frame, cycle_position: u32) -> Result<Vec<DetectedRegion>> {
        let screen = frame.dimensions();
        let gray = luminance(frame)?;
        let binary = binarize(&sobel_magnitude(&gray), self.settings.edge_threshold);

        let traced = trace_boxes(&binary, self.settings.grid_stride, self.settings.trace_window);
        let traced_count = traced.len();
        let candidates: Vec<PixelBox> = traced
            .into_iter()
            .filter(|bx| {
                bx.fits(
                    screen,
                    self.settings.min_region_size,
                    self.settings.max_screen_fraction,
                )
            })
            .collect();

        trace!(
            "Traced {} boxes, {} pass the size filter",
            traced_count,
            candidates.len()
        );

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let source = to_rgba(frame)?;
        let screen_area = screen.area();
        let mut regions = Vec::with_capacity(candidates.len());

        for bx in candidates {
            let category = self.classify(bx.area() / screen_area);

            let thumbnail = match render_thumbnail(&source, &bx, &self.thumbnail) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Dropping region at ({}, {}): {}", bx.x, bx.y, e);
                    continue;
                }
            };

            regions.push(DetectedRegion::new(
                bx.to_rect()?,
                cycle_position,
                thumbnail,
                category,
            )?);
        }

        debug!(
            "Detected {} regions in {}x{} frame (cycle {})",
            regions.len(),
            screen.width,
            screen.height,
            cycle_position
        );

        Ok(regions)
    }

    /// Classify a screen share with this detector's thresholds.
    pub fn classify(&self, percentage: f64) -> RegionCategory {
        RegionCategory::classify_with(
            percentage,
            self.settings.large_threshold,
            self.settings.medium_threshold,
        )
    }
}

impl FrameDetector for RegionDetector {
    fn name(&self) -> &'static str {
        "region"
    }

    fn detect(&self, frame: &Frame, cycle_position: u32) -> Vec<DetectedRegion> {
        match self.try_detect(frame, cycle_position) {
            Ok(regions) => regions,
            Err(e) => {
                warn!("Region detection failed for cycle {}: {}", cycle_position, e);
                Vec::new()
            }
        }
    }
}
