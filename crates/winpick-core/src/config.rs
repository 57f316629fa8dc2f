//! Configuration types for winpick.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::region::{LARGE_REGION_THRESHOLD, MEDIUM_REGION_THRESHOLD};
use crate::{Error, Result};

/// Lowest edge threshold known to separate window borders from content.
pub const MIN_EDGE_THRESHOLD: u8 = 150;

/// Highest edge threshold before real window borders start to drop out.
pub const MAX_EDGE_THRESHOLD: u8 = 200;

/// Configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WinpickConfig {
    /// Frame-level detection settings
    pub detection: DetectionSettings,
    /// Cycling loop settings
    pub cycling: CyclingSettings,
    /// Thumbnail rendering settings
    pub thumbnail: ThumbnailSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl WinpickConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: WinpickConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.cycling.validate()?;
        self.thumbnail.validate()?;
        Ok(())
    }
}

/// Settings for the per-frame region detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionSettings {
    /// Edge magnitude above which a pixel counts as foreground
    pub edge_threshold: u8,
    /// Distance between seed points of the tracing grid, in pixels
    pub grid_stride: u32,
    /// Side of the square window scanned from each seed, in pixels
    pub trace_window: u32,
    /// Boxes must be strictly wider and taller than this, in pixels
    pub min_region_size: u32,
    /// Boxes must be strictly smaller than this share of each screen side
    pub max_screen_fraction: f64,
    /// Screen share at or above which a region is large
    pub large_threshold: f64,
    /// Screen share at or above which a region is medium
    pub medium_threshold: f64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            edge_threshold: 175,
            grid_stride: 5,
            trace_window: 200,
            min_region_size: 50,
            max_screen_fraction: 0.9,
            large_threshold: LARGE_REGION_THRESHOLD,
            medium_threshold: MEDIUM_REGION_THRESHOLD,
        }
    }
}

impl DetectionSettings {
    /// Validate detection settings.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_EDGE_THRESHOLD..=MAX_EDGE_THRESHOLD).contains(&self.edge_threshold) {
            return Err(Error::Config(format!(
                "detection.edge_threshold must be within {MIN_EDGE_THRESHOLD}..={MAX_EDGE_THRESHOLD}, got {}",
                self.edge_threshold
            )));
        }

        if self.grid_stride == 0 || self.trace_window == 0 {
            return Err(Error::Config(
                "detection.grid_stride and detection.trace_window must be > 0".to_string(),
            ));
        }

        if !(self.max_screen_fraction > 0.0 && self.max_screen_fraction <= 1.0) {
            return Err(Error::Config(format!(
                "detection.max_screen_fraction must be within (0, 1], got {}",
                self.max_screen_fraction
            )));
        }

        if !(0.0 < self.medium_threshold && self.medium_threshold < self.large_threshold) {
            return Err(Error::Config(format!(
                "detection thresholds must satisfy 0 < medium ({}) < large ({})",
                self.medium_threshold, self.large_threshold
            )));
        }

        Ok(())
    }
}

/// Settings for the capture/detect/cycle loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CyclingSettings {
    /// Number of capture rounds; the cycler runs one time fewer
    pub max_attempts: u32,
    /// Wait after each cycle before the next capture, in milliseconds
    pub settle_delay_ms: u64,
    /// Budget for the whole detection run, in seconds
    pub timeout_secs: u64,
}

impl Default for CyclingSettings {
    fn default() -> Self {
        Self {
            max_attempts: 15,
            settle_delay_ms: 2500,
            timeout_secs: 180,
        }
    }
}

impl CyclingSettings {
    /// Validate cycling settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("cycling.max_attempts must be > 0".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Config("cycling.timeout_secs must be > 0".to_string()));
        }

        Ok(())
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Run budget as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Thumbnail rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThumbnailSettings {
    /// Maximum thumbnail width
    pub width: u32,
    /// Maximum thumbnail height
    pub height: u32,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: 200,
            height: 150,
        }
    }
}

impl ThumbnailSettings {
    /// Validate thumbnail settings.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config("thumbnail dimensions must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
