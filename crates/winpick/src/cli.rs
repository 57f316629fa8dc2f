//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use winpick_core::{Result, WinpickConfig};

/// Detect windows in recorded remote-desktop frames, pick some and switch
/// between them.
#[derive(Parser, Debug, Clone)]
#[command(name = "winpick", version)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of recorded frames (PNG or JPEG), replayed in file-name order
    #[arg(short, long, value_name = "DIR", required_unless_present = "schema")]
    pub frames: Option<PathBuf>,

    /// Indices of detected windows to select (default: all)
    #[arg(long, value_name = "INDEX", value_delimiter = ',')]
    pub select: Option<Vec<usize>>,

    /// Index of a selected window to switch to
    #[arg(long, value_name = "INDEX")]
    pub navigate: Option<usize>,

    /// Write every detected region's thumbnail as PNG into this directory
    #[arg(long, value_name = "DIR")]
    pub thumbnails: Option<PathBuf>,

    /// Override the settle delay after each window switch, in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_ms: Option<u64>,

    /// Print the JSON Schema of the report and exit
    #[arg(long)]
    pub schema: bool,
}

impl Cli {
    /// Load the configuration file (or defaults) and apply overrides.
    pub fn load_config(&self) -> Result<WinpickConfig> {
        let mut config = match &self.config {
            Some(path) => WinpickConfig::from_file(path)?,
            None => WinpickConfig::default(),
        };

        if let Some(ms) = self.settle_ms {
            config.cycling.settle_delay_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }
}
