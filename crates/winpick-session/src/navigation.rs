//! Navigation calculator for bringing a selected window to the front.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;
use winpick_core::{DetectedRegion, Error, Result};

use crate::capture::Cycler;

/// Navigation calculator for window switching.
///
/// A region remembers the detection round it was first seen in; reaching it
/// again means replaying that many cycler advances.
#[derive(Debug, Clone, Default)]
pub struct NavigationCalculator;

impl NavigationCalculator {
    /// Create a new navigation calculator.
    pub fn new() -> Self {
        Self
    }

    /// Calculate the cycler advances needed to reach `selected[index]`.
    ///
    /// # Example
    /// ```
    /// # use winpick_session::NavigationCalculator;
    /// # use winpick_core::{DetectedRegion, Rect, RegionCategory};
    /// let bounds = Rect::new(0.0, 0.0, 300.0, 200.0).unwrap();
    /// let region = DetectedRegion::new(bounds, 4, vec![1u8], RegionCategory::Large).unwrap();
    ///
    /// let calc = NavigationCalculator::new();
    /// assert_eq!(calc.calculate(&[region], 0).unwrap(), 4);
    /// ```
    pub fn calculate(&self, selected: &[DetectedRegion], index: usize) -> Result<u32> {
        selected
            .get(index)
            .map(|region| region.cycle_position())
            .ok_or_else(|| {
                Error::Navigation(format!(
                    "window {} is out of range ({} selected)",
                    index,
                    selected.len()
                ))
            })
    }

    /// Replay `cycles` advances, waiting `settle_delay` after each one.
    pub async fn replay(
        &self,
        cycler: &dyn Cycler,
        cycles: u32,
        settle_delay: Duration,
    ) -> Result<()> {
        for step in 0..cycles {
            cycler.advance().await.map_err(|e| match e {
                Error::Navigation(_) => e,
                other => Error::Navigation(other.to_string()),
            })?;
            sleep(settle_delay).await;
            debug!("Navigation step {}/{}", step + 1, cycles);
        }

        Ok(())
    }
}
