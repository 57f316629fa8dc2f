//! JSON report of a window-mode run.

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use winpick_core::{DetectedRegion, Rect, RegionCategory, Result, RunId};
use winpick_session::{Phase, PhaseSnapshot};

/// One region as reported; the thumbnail itself is not embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegionReport {
    /// Position in its list
    pub index: usize,
    /// Bounding box in frame pixels
    pub bounds: Rect,
    /// Size class
    pub category: RegionCategory,
    /// Window switches from the starting window to this one
    pub cycle_position: u32,
    /// PNG thumbnail size in bytes
    pub thumbnail_bytes: usize,
    /// Where the thumbnail was written, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
}

impl RegionReport {
    /// Describe `region` at position `index`.
    pub fn new(index: usize, region: &DetectedRegion) -> Self {
        Self {
            index,
            bounds: *region.bounds(),
            category: region.category(),
            cycle_position: region.cycle_position(),
            thumbnail_bytes: region.thumbnail().len(),
            thumbnail_path: None,
        }
    }
}

/// Final state of a run, printed as JSON on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionReport {
    /// Identifier of this run
    pub run_id: RunId,
    /// RFC 3339 creation time
    pub generated_at: String,
    /// Phase the controller ended in
    pub phase: String,
    /// Last error, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Detected regions, largest first
    pub detected: Vec<RegionReport>,
    /// Regions that were selected
    pub selected: Vec<RegionReport>,
    /// Index into `selected` of the window in front, while navigating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
}

impl DetectionReport {
    /// Build a report from a controller snapshot.
    pub fn from_snapshot(run_id: RunId, snapshot: &PhaseSnapshot) -> Self {
        let describe = |regions: &[DetectedRegion]| {
            regions
                .iter()
                .enumerate()
                .map(|(i, r)| RegionReport::new(i, r))
                .collect()
        };

        Self {
            run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            phase: snapshot.phase.to_string(),
            error: Some(snapshot.error_message.clone()).filter(|e| !e.is_empty()),
            detected: describe(&snapshot.detected[..]),
            selected: describe(&snapshot.selected[..]),
            current_index: (snapshot.phase == Phase::Navigating).then_some(snapshot.current_index),
        }
    }

    /// JSON Schema of the report.
    pub fn json_schema() -> serde_json::Value {
        schemars::schema_for!(DetectionReport).to_value()
    }

    /// Write each detected region's thumbnail as `region-NN.png` into `dir`
    /// and record the paths in the report.
    pub fn write_thumbnails(&mut self, regions: &[DetectedRegion], dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        for (entry, region) in self.detected.iter_mut().zip(regions) {
            let path = dir.join(format!("region-{:02}.png", entry.index));
            std::fs::write(&path, region.thumbnail())?;
            entry.thumbnail_path = Some(path);
        }

        Ok(())
    }
}
