//! Test doubles for the session layer.
//!
//! Fakes for [`FrameSource`], [`Cycler`] and [`FrameDetector`] that record
//! how often they were called.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use winpick_core::{DetectedRegion, Error, Frame, PixelFormat, Rect, RegionCategory, Result};
use winpick_detector::FrameDetector;

use crate::capture::{Cycler, FrameSource};

/// Build a region with a placeholder thumbnail.
///
/// # Panics
/// Panics if the bounds are invalid.
pub fn region(
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    cycle_position: u32,
    category: RegionCategory,
) -> DetectedRegion {
    let bounds = Rect::new(left, top, width, height).expect("valid test bounds");
    DetectedRegion::new(bounds, cycle_position, b"thumb".to_vec(), category)
        .expect("non-empty test thumbnail")
}

/// A 1x1 gray frame, for sources whose content the detector ignores.
pub fn blank_frame() -> Frame {
    Frame::new(vec![0u8], 1, 1, PixelFormat::Gray8)
}

/// Frame source that replays a fixed script, then repeats its last entry.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Vec<Option<Frame>>,
    captures: AtomicUsize,
}

impl ScriptedSource {
    /// Source that returns `frame` on every capture.
    pub fn repeating(frame: Frame) -> Self {
        Self::new(vec![Some(frame)])
    }

    /// Source that never has a frame.
    pub fn empty() -> Self {
        Self::new(vec![None])
    }

    /// Source that follows `script`, one entry per capture.
    pub fn new(script: Vec<Option<Frame>>) -> Self {
        Self {
            script,
            captures: AtomicUsize::new(0),
        }
    }

    /// Number of captures so far.
    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn capture(&self) -> Result<Option<Frame>> {
        let n = self.captures.fetch_add(1, Ordering::SeqCst);
        let entry = self.script.get(n).or_else(|| self.script.last());
        Ok(entry.cloned().flatten())
    }
}

/// Frame source whose capture never completes.
#[derive(Debug, Default)]
pub struct PendingSource;

#[async_trait]
impl FrameSource for PendingSource {
    async fn capture(&self) -> Result<Option<Frame>> {
        std::future::pending().await
    }
}

/// Frame source whose capture always fails.
#[derive(Debug, Default)]
pub struct FailingSource;

#[async_trait]
impl FrameSource for FailingSource {
    async fn capture(&self) -> Result<Option<Frame>> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "remote session closed",
        )))
    }
}

/// Cycler that counts advances and can be switched into failing.
#[derive(Debug, Default)]
pub struct CountingCycler {
    advances: AtomicUsize,
    failing: AtomicBool,
}

impl CountingCycler {
    /// Create a working cycler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful advances so far.
    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }

    /// Make subsequent advances fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Cycler for CountingCycler {
    async fn advance(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Navigation("keyboard channel unavailable".to_string()));
        }
        self.advances.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Detector that returns canned regions per cycle position.
///
/// Returned regions are re-tagged with the cycle position they were
/// requested for.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    by_cycle: HashMap<u32, Vec<DetectedRegion>>,
    calls: Mutex<Vec<u32>>,
}

impl ScriptedDetector {
    /// Detector that finds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `regions` when called for `cycle`.
    pub fn on_cycle(mut self, cycle: u32, regions: Vec<DetectedRegion>) -> Self {
        self.by_cycle.insert(cycle, regions);
        self
    }

    /// Cycle positions this detector was called with, in order.
    pub fn calls(&self) -> Vec<u32> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl FrameDetector for ScriptedDetector {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn detect(&self, _frame: &Frame, cycle_position: u32) -> Vec<DetectedRegion> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cycle_position);
        }
        self.by_cycle
            .get(&cycle_position)
            .map(|regions| {
                regions
                    .iter()
                    .map(|r| r.with_cycle_position(cycle_position))
                    .collect()
            })
            .unwrap_or_default()
    }
}
