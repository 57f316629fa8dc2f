//! Detection run: capture, detect and cycle until every window was seen.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, instrument, Span};
use winpick_core::{
    CyclingSettings, DetectedRegion, Error, Frame, Rect, RegionCategory, Result, RunId,
};
use winpick_detector::{FrameDetector, RegionDetector};

use crate::capture::{Cycler, FrameSource};

/// Identity used to drop repeat sightings of the same window across rounds.
///
/// Bounds are truncated toward zero, so boxes that differ only in their
/// fractional parts collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey {
    /// Truncated left edge
    pub left: i64,
    /// Truncated top edge
    pub top: i64,
    /// Truncated width
    pub width: i64,
    /// Truncated height
    pub height: i64,
}

impl DedupKey {
    /// Key for a bounding box.
    pub fn of(bounds: &Rect) -> Self {
        Self {
            left: bounds.left().trunc() as i64,
            top: bounds.top().trunc() as i64,
            width: bounds.width().trunc() as i64,
            height: bounds.height().trunc() as i64,
        }
    }
}

/// Collects regions across rounds, keeping the first sighting of each box.
#[derive(Debug, Default)]
pub struct RegionAccumulator {
    seen: HashSet<DedupKey>,
    regions: Vec<DetectedRegion>,
}

impl RegionAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region unless its box was already seen. Returns whether it was added.
    pub fn insert(&mut self, region: DetectedRegion) -> bool {
        if !self.seen.insert(DedupKey::of(region.bounds())) {
            return false;
        }
        self.regions.push(region);
        true
    }

    /// Add every region, returning how many were new.
    pub fn insert_all(&mut self, regions: impl IntoIterator<Item = DetectedRegion>) -> usize {
        let mut added = 0;
        for region in regions {
            if self.insert(region) {
                added += 1;
            }
        }
        added
    }

    /// Number of unique regions so far.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Drop small regions and order the rest largest category first, then
    /// largest area first. Ties keep discovery order.
    pub fn finish(self) -> Vec<DetectedRegion> {
        let mut regions: Vec<DetectedRegion> = self
            .regions
            .into_iter()
            .filter(|r| r.category() != RegionCategory::Small)
            .collect();

        regions.sort_by(|a, b| {
            b.category()
                .cmp(&a.category())
                .then_with(|| b.area().total_cmp(&a.area()))
        });

        regions
    }
}

/// One window-detection run over the remote desktop.
///
/// Each round captures a frame, detects regions in it and advances the
/// cycler, so every window gets a turn in front.
#[derive(Clone)]
pub struct DetectionSession {
    source: Arc<dyn FrameSource>,
    cycler: Arc<dyn Cycler>,
    detector: Arc<dyn FrameDetector>,
    settings: CyclingSettings,
}

impl DetectionSession {
    /// Create a session with the default region detector and settings.
    pub fn new(source: Arc<dyn FrameSource>, cycler: Arc<dyn Cycler>) -> Self {
        Self {
            source,
            cycler,
            detector: Arc::new(RegionDetector::new()),
            settings: CyclingSettings::default(),
        }
    }

    /// Use a different detector.
    pub fn with_detector(mut self, detector: Arc<dyn FrameDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Use different cycling settings.
    pub fn with_settings(mut self, settings: CyclingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Cycling settings in use.
    pub fn settings(&self) -> &CyclingSettings {
        &self.settings
    }

    /// The cycler shared with navigation.
    pub fn cycler(&self) -> &Arc<dyn Cycler> {
        &self.cycler
    }

    /// Run detection under a fresh run id.
    pub async fn run(&self) -> Result<Vec<DetectedRegion>> {
        self.run_with_id(RunId::new()).await
    }

    /// Run detection, tagging logs with `run_id`.
    ///
    /// The whole run is bounded by the configured timeout; when it expires
    /// nothing collected so far is returned.
    #[instrument(skip_all, fields(run_id))]
    pub async fn run_with_id(&self, run_id: RunId) -> Result<Vec<DetectedRegion>> {
        Span::current().record("run_id", tracing::field::display(&run_id));

        info!(
            "Starting window detection ({} rounds, detector {})",
            self.settings.max_attempts,
            self.detector.name()
        );

        match timeout(self.settings.timeout(), self.cycle_all()).await {
            Ok(Ok(regions)) => {
                info!("Window detection finished with {} regions", regions.len());
                Ok(regions)
            }
            Ok(Err(e)) => {
                error!("Window detection failed: {}", e);
                Err(e)
            }
            Err(_) => {
                error!(
                    "Window detection timed out after {}s",
                    self.settings.timeout_secs
                );
                Err(Error::DetectionTimeout(self.settings.timeout_secs))
            }
        }
    }

    async fn cycle_all(&self) -> Result<Vec<DetectedRegion>> {
        let attempts = self.settings.max_attempts;
        let mut accumulator = RegionAccumulator::new();

        for cycle in 0..attempts {
            match self.source.capture().await.map_err(into_detection_error)? {
                Some(frame) => {
                    let found = self.detect(frame, cycle).await?;
                    let found_count = found.len();
                    let added = accumulator.insert_all(found);
                    debug!(
                        "Round {}: {} regions, {} new, {} total",
                        cycle,
                        found_count,
                        added,
                        accumulator.len()
                    );
                }
                None => debug!("Round {}: no frame available", cycle),
            }

            if cycle + 1 < attempts {
                self.cycler
                    .advance()
                    .await
                    .map_err(into_detection_error)?;
                sleep(self.settings.settle_delay()).await;
            }
        }

        Ok(accumulator.finish())
    }

    async fn detect(&self, frame: Frame, cycle: u32) -> Result<Vec<DetectedRegion>> {
        let detector = Arc::clone(&self.detector);
        tokio::task::spawn_blocking(move || detector.detect(&frame, cycle))
            .await
            .map_err(|e| Error::Detection(format!("detector task failed: {e}")))
    }
}

fn into_detection_error(e: Error) -> Error {
    match e {
        Error::Detection(_) | Error::DetectionTimeout(_) => e,
        other => Error::Detection(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        blank_frame, region, CountingCycler, FailingSource, PendingSource, ScriptedDetector,
        ScriptedSource,
    };
    use std::time::Duration;
    use winpick_core::RegionCategory::{Large, Medium, Small};
    use winpick_detector::testing::SyntheticScreen;

    fn session(
        source: Arc<dyn FrameSource>,
        cycler: Arc<CountingCycler>,
        detector: ScriptedDetector,
    ) -> DetectionSession {
        DetectionSession::new(source, cycler).with_detector(Arc::new(detector))
    }

    #[test]
    fn test_dedup_key_truncates() {
        let a = region(10.2, 5.0, 100.0, 80.0, 0, Large);
        let b = region(10.9, 5.0, 100.0, 80.0, 1, Large);
        let c = region(11.0, 5.0, 100.0, 80.0, 2, Large);

        assert_eq!(DedupKey::of(a.bounds()), DedupKey::of(b.bounds()));
        assert_ne!(DedupKey::of(b.bounds()), DedupKey::of(c.bounds()));
    }

    #[test]
    fn test_accumulator_keeps_first_sighting() {
        let mut acc = RegionAccumulator::new();
        assert!(acc.insert(region(10.2, 5.0, 100.0, 80.0, 0, Large)));
        assert!(!acc.insert(region(10.9, 5.0, 100.0, 80.0, 4, Large)));
        assert!(acc.insert(region(11.0, 5.0, 100.0, 80.0, 4, Large)));

        let regions = acc.finish();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].cycle_position(), 0);
    }

    #[test]
    fn test_accumulator_is_idempotent() {
        let batch = vec![
            region(0.0, 0.0, 200.0, 200.0, 0, Large),
            region(300.0, 0.0, 100.0, 100.0, 0, Medium),
        ];

        let mut acc = RegionAccumulator::new();
        assert_eq!(acc.insert_all(batch.clone()), 2);
        assert_eq!(acc.insert_all(batch), 0);
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_detector_output_is_idempotent() {
        let frame = SyntheticScreen::new(400, 300)
            .with_window(50, 50, 150, 130)
            .with_window(255, 50, 80, 80)
            .render();
        let detector = RegionDetector::new();

        let first = detector.detect(&frame, 0);
        assert_eq!(first.len(), 2);

        let mut acc = RegionAccumulator::new();
        assert_eq!(acc.insert_all(first.clone()), 2);
        assert_eq!(acc.insert_all(detector.detect(&frame, 1)), 0);

        let regions = acc.finish();
        assert_eq!(regions, first);
        assert!(regions.iter().all(|r| r.cycle_position() == 0));
    }

    #[test]
    fn test_finish_filters_small_and_sorts() {
        let mut acc = RegionAccumulator::new();
        acc.insert_all(vec![
            region(0.0, 0.0, 60.0, 60.0, 0, Small),
            region(0.0, 100.0, 100.0, 100.0, 0, Medium),
            region(0.0, 200.0, 300.0, 200.0, 1, Large),
            region(0.0, 300.0, 120.0, 100.0, 1, Medium),
            region(0.0, 400.0, 400.0, 300.0, 2, Large),
        ]);

        let regions = acc.finish();
        let summary: Vec<(RegionCategory, f64)> =
            regions.iter().map(|r| (r.category(), r.area())).collect();

        assert_eq!(
            summary,
            vec![
                (Large, 120_000.0),
                (Large, 60_000.0),
                (Medium, 12_000.0),
                (Medium, 10_000.0),
            ]
        );
    }

    #[test]
    fn test_finish_is_stable_for_equal_keys() {
        let mut acc = RegionAccumulator::new();
        acc.insert_all(vec![
            region(0.0, 0.0, 100.0, 100.0, 0, Medium),
            region(500.0, 0.0, 100.0, 100.0, 1, Medium),
        ]);

        let regions = acc.finish();
        assert_eq!(regions[0].bounds().left(), 0.0);
        assert_eq!(regions[1].bounds().left(), 500.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_cycles_attempts_minus_one_times() {
        let source = Arc::new(ScriptedSource::repeating(blank_frame()));
        let cycler = Arc::new(CountingCycler::new());
        let detector = ScriptedDetector::new();
        let session = session(source.clone(), cycler.clone(), detector);

        let regions = session.run().await.unwrap();

        assert!(regions.is_empty());
        assert_eq!(source.captures(), 15);
        assert_eq!(cycler.advances(), 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_still_cycles_without_frames() {
        let source = Arc::new(ScriptedSource::empty());
        let cycler = Arc::new(CountingCycler::new());
        let session = session(source.clone(), cycler.clone(), ScriptedDetector::new());

        let regions = session.run().await.unwrap();

        assert!(regions.is_empty());
        assert_eq!(source.captures(), 15);
        assert_eq!(cycler.advances(), 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_settle_delay_between_rounds() {
        let source = Arc::new(ScriptedSource::empty());
        let cycler = Arc::new(CountingCycler::new());
        let session = session(source, cycler, ScriptedDetector::new());

        let started = tokio::time::Instant::now();
        session.run().await.unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(14 * 2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_dedups_sorts_and_tags_cycles() {
        let window_a = region(50.0, 50.0, 400.0, 300.0, 0, Large);
        let window_b = region(600.0, 50.0, 150.0, 150.0, 0, Medium);
        let noise = region(10.0, 10.0, 55.0, 55.0, 0, Small);

        let detector = ScriptedDetector::new()
            .on_cycle(0, vec![window_b.clone(), noise])
            .on_cycle(1, vec![window_a.clone(), window_b.clone()])
            .on_cycle(2, vec![window_a.clone()]);

        let source = Arc::new(ScriptedSource::repeating(blank_frame()));
        let cycler = Arc::new(CountingCycler::new());
        let settings = CyclingSettings {
            max_attempts: 3,
            ..CyclingSettings::default()
        };
        let session = session(source, cycler.clone(), detector).with_settings(settings);

        let regions = session.run().await.unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].category(), Large);
        assert_eq!(regions[0].cycle_position(), 1);
        assert_eq!(regions[1].category(), Medium);
        assert_eq!(regions[1].cycle_position(), 0);
        assert_eq!(cycler.advances(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skipped_rounds_keep_their_cycle_numbers() {
        let detector = Arc::new(
            ScriptedDetector::new().on_cycle(2, vec![region(0.0, 0.0, 300.0, 300.0, 0, Large)]),
        );
        let source = Arc::new(ScriptedSource::new(vec![
            None,
            Some(blank_frame()),
            Some(blank_frame()),
        ]));
        let cycler = Arc::new(CountingCycler::new());
        let settings = CyclingSettings {
            max_attempts: 3,
            ..CyclingSettings::default()
        };
        let session = DetectionSession::new(source, cycler)
            .with_detector(detector.clone())
            .with_settings(settings);

        let regions = session.run().await.unwrap();

        assert_eq!(detector.calls(), vec![1, 2]);
        assert_eq!(regions[0].cycle_position(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out() {
        let cycler = Arc::new(CountingCycler::new());
        let session = session(Arc::new(PendingSource), cycler, ScriptedDetector::new());

        let err = session.run().await.unwrap_err();

        assert!(matches!(err, Error::DetectionTimeout(180)));
        assert_eq!(err.to_string(), "Window detection timed out after 180s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_covers_settle_delays() {
        let cycler = Arc::new(CountingCycler::new());
        let settings = CyclingSettings {
            timeout_secs: 10,
            ..CyclingSettings::default()
        };
        let session = session(
            Arc::new(ScriptedSource::empty()),
            cycler.clone(),
            ScriptedDetector::new(),
        )
        .with_settings(settings);

        let err = session.run().await.unwrap_err();

        assert!(matches!(err, Error::DetectionTimeout(10)));
        assert!(cycler.advances() < 14);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capture_failure_is_detection_error() {
        let cycler = Arc::new(CountingCycler::new());
        let session = session(Arc::new(FailingSource), cycler, ScriptedDetector::new());

        let err = session.run().await.unwrap_err();

        assert!(matches!(err, Error::Detection(_)));
        assert!(err.to_string().starts_with("Window detection failed:"));
        assert!(err.to_string().contains("remote session closed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycler_failure_is_detection_error() {
        let cycler = Arc::new(CountingCycler::new());
        cycler.set_failing(true);
        let session = session(
            Arc::new(ScriptedSource::empty()),
            cycler,
            ScriptedDetector::new(),
        );

        let err = session.run().await.unwrap_err();
        assert!(matches!(err, Error::Detection(_)));
    }
}
