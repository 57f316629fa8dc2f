//! Window-mode phase controller.
//!
//! Drives the user-facing flow: detect windows, let the user pick some, then
//! switch between the picked windows. Every state change is published to
//! subscribers as an immutable [`PhaseSnapshot`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::{AbortHandle, JoinError, JoinHandle};
use tracing::{debug, info, warn};
use winpick_core::{DetectedRegion, Error, RegionCategory, Result};

use crate::detection::DetectionSession;
use crate::navigation::NavigationCalculator;

/// Phase of the window-mode flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Regular remote-desktop view
    #[default]
    Normal,
    /// Detection run in progress
    Detecting,
    /// Waiting for the user to pick windows
    Selecting,
    /// Switching between picked windows
    Navigating,
}

impl Phase {
    /// Lowercase name, as used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Normal => "normal",
            Phase::Detecting => "detecting",
            Phase::Selecting => "selecting",
            Phase::Navigating => "navigating",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable view of the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSnapshot {
    /// Current phase
    pub phase: Phase,
    /// Regions from the last successful detection run
    pub detected: Arc<[DetectedRegion]>,
    /// Regions the user picked
    pub selected: Arc<[DetectedRegion]>,
    /// Index into `selected` of the window in front
    pub current_index: usize,
    /// Whether a detection run or navigation is in flight
    pub processing: bool,
    /// Last failure, empty when there is none
    pub error_message: String,
}

impl Default for PhaseSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Normal,
            detected: Arc::from(Vec::new()),
            selected: Arc::from(Vec::new()),
            current_index: 0,
            processing: false,
            error_message: String::new(),
        }
    }
}

impl PhaseSnapshot {
    /// Whether the fields agree with the phase.
    pub fn is_consistent(&self) -> bool {
        let pristine = self.selected.is_empty() && self.current_index == 0;
        match self.phase {
            Phase::Normal => pristine && self.detected.is_empty() && !self.processing,
            Phase::Detecting => {
                pristine
                    && self.detected.is_empty()
                    && self.processing
                    && self.error_message.is_empty()
            }
            Phase::Selecting => {
                pristine
                    && !self.detected.is_empty()
                    && !self.processing
                    && self.error_message.is_empty()
            }
            Phase::Navigating => self.current_index < self.selected.len(),
        }
    }

    /// Window in front while navigating.
    pub fn current_region(&self) -> Option<&DetectedRegion> {
        match self.phase {
            Phase::Navigating => self.selected.get(self.current_index),
            _ => None,
        }
    }

    /// Number of detected regions in `category`.
    pub fn detected_count(&self, category: RegionCategory) -> usize {
        self.detected
            .iter()
            .filter(|r| r.category() == category)
            .count()
    }
}

/// Handle returned by [`PhaseController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&PhaseSnapshot) + Send + Sync>;

struct ControllerState {
    snapshot: PhaseSnapshot,
    generation: u64,
    /// Detection run or navigation started for `generation`
    in_flight: Option<AbortHandle>,
}

impl ControllerState {
    /// Move on to a new generation, stopping whatever the old one runs.
    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(task) = self.in_flight.take() {
            debug!("Cancelling in-flight work");
            task.abort();
        }
    }
}

/// State machine for window mode.
///
/// Only one detection run or navigation is in flight at a time. Restart and
/// exit abort the running one, so no further capture or cycler call is made
/// on its behalf. Commands that do not apply to the current phase are
/// ignored with a warning.
///
/// Observers are called in transition order and must not issue commands
/// from inside the callback.
pub struct PhaseController {
    session: DetectionSession,
    navigator: NavigationCalculator,
    state: Mutex<ControllerState>,
    publish: Mutex<()>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

impl PhaseController {
    /// Create a controller in [`Phase::Normal`].
    pub fn new(session: DetectionSession) -> Self {
        Self {
            session,
            navigator: NavigationCalculator::new(),
            state: Mutex::new(ControllerState {
                snapshot: PhaseSnapshot::default(),
                generation: 0,
                in_flight: None,
            }),
            publish: Mutex::new(()),
            observers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_publish(&self) -> MutexGuard<'_, ()> {
        self.publish.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a callback invoked after every state change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PhaseSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.lock_observers();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    fn notify(&self, snapshot: &PhaseSnapshot) {
        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();

        for observer in observers {
            observer(snapshot);
        }
    }

    /// Apply `update` under the state lock and notify with the result.
    ///
    /// `update` returns `false` to leave the state untouched; nothing is
    /// published then. Returns the generation after the update.
    ///
    /// The publish lock is taken before the state lock is released, so
    /// observers see snapshots in the order the updates were applied.
    fn transition<F>(&self, update: F) -> Option<u64>
    where
        F: FnOnce(&mut ControllerState) -> bool,
    {
        let (generation, snapshot, _publishing) = {
            let mut state = self.lock_state();
            let from = state.snapshot.phase;
            if !update(&mut state) {
                return None;
            }
            if from != state.snapshot.phase {
                info!("Window mode: {} -> {}", from, state.snapshot.phase);
            }
            (state.generation, state.snapshot.clone(), self.lock_publish())
        };

        self.notify(&snapshot);
        Some(generation)
    }

    /// Record `task` as the work of `generation`, or abort it when the flow
    /// already moved on.
    fn track(&self, generation: u64, task: AbortHandle) {
        let mut state = self.lock_state();
        if state.generation == generation {
            state.in_flight = Some(task);
        } else {
            task.abort();
        }
    }

    /// Wait for tracked work. `None` when it was aborted.
    async fn join<T>(
        handle: JoinHandle<Result<T>>,
        on_panic: impl FnOnce(JoinError) -> Error,
    ) -> Option<Result<T>> {
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) if e.is_cancelled() => None,
            Err(e) => Some(Err(on_panic(e))),
        }
    }

    fn begin_detection(state: &mut ControllerState) {
        state.supersede();
        state.snapshot = PhaseSnapshot {
            phase: Phase::Detecting,
            processing: true,
            ..PhaseSnapshot::default()
        };
    }

    /// Start a detection run. Only valid in [`Phase::Normal`].
    ///
    /// Returns once the run has finished and its outcome was applied.
    pub async fn start_window_detection(&self) {
        let started = self.transition(|state| {
            if state.snapshot.phase != Phase::Normal {
                warn!("Ignoring start of detection in phase {}", state.snapshot.phase);
                return false;
            }
            Self::begin_detection(state);
            true
        });

        if let Some(generation) = started {
            self.run_detection(generation).await;
        }
    }

    /// Drop all state and start a new detection run, from any phase.
    pub async fn restart_detection(&self) {
        let started = self.transition(|state| {
            Self::begin_detection(state);
            true
        });

        if let Some(generation) = started {
            self.run_detection(generation).await;
        }
    }

    async fn run_detection(&self, generation: u64) {
        let session = self.session.clone();
        let handle = tokio::spawn(async move { session.run().await });
        self.track(generation, handle.abort_handle());

        let Some(outcome) = Self::join(handle, |e| {
            Error::Detection(format!("detection task failed: {e}"))
        })
        .await
        else {
            debug!("Detection run was cancelled");
            return;
        };

        self.transition(|state| {
            if state.generation != generation {
                debug!("Discarding stale detection result");
                return false;
            }

            state.in_flight = None;

            state.snapshot = match outcome {
                Ok(regions) if !regions.is_empty() => PhaseSnapshot {
                    phase: Phase::Selecting,
                    detected: Arc::from(regions),
                    ..PhaseSnapshot::default()
                },
                Ok(_) => PhaseSnapshot {
                    error_message: Error::EmptyDetectionResult.to_string(),
                    ..PhaseSnapshot::default()
                },
                Err(e) => PhaseSnapshot {
                    error_message: e.to_string(),
                    ..PhaseSnapshot::default()
                },
            };
            true
        });
    }

    /// Accept the user's picks. Only valid in [`Phase::Selecting`].
    ///
    /// An empty pick returns to [`Phase::Normal`] with an error message.
    pub fn select_windows(&self, regions: Vec<DetectedRegion>) {
        self.transition(|state| {
            if state.snapshot.phase != Phase::Selecting {
                warn!("Ignoring window selection in phase {}", state.snapshot.phase);
                return false;
            }

            if regions.is_empty() {
                state.snapshot = PhaseSnapshot {
                    error_message: Error::EmptySelection.to_string(),
                    ..PhaseSnapshot::default()
                };
            } else {
                info!("{} windows selected", regions.len());
                state.snapshot.phase = Phase::Navigating;
                state.snapshot.selected = Arc::from(regions);
                state.snapshot.current_index = 0;
            }
            true
        });
    }

    /// Bring `selected[index]` to the front.
    ///
    /// Returns `false` without doing anything when not navigating, when a
    /// switch is already running, or when `index` is out of range.
    pub async fn navigate_to_window(&self, index: usize) -> bool {
        let mut cycles = 0;
        let begun = self.transition(|state| {
            let snapshot = &mut state.snapshot;
            if snapshot.phase != Phase::Navigating || snapshot.processing {
                warn!(
                    "Ignoring navigation in phase {} (processing: {})",
                    snapshot.phase, snapshot.processing
                );
                return false;
            }

            match self.navigator.calculate(&snapshot.selected, index) {
                Ok(needed) => {
                    cycles = needed;
                    snapshot.processing = true;
                    snapshot.error_message.clear();
                    state.generation += 1;
                    true
                }
                Err(e) => {
                    warn!("Ignoring navigation: {}", e);
                    false
                }
            }
        });

        let Some(generation) = begun else {
            return false;
        };

        debug!("Navigating to window {} ({} cycles)", index, cycles);
        let navigator = self.navigator.clone();
        let cycler = Arc::clone(self.session.cycler());
        let settle_delay = self.session.settings().settle_delay();
        let handle = tokio::spawn(async move {
            navigator.replay(cycler.as_ref(), cycles, settle_delay).await
        });
        self.track(generation, handle.abort_handle());

        let Some(outcome) = Self::join(handle, |e| {
            Error::Navigation(format!("navigation task failed: {e}"))
        })
        .await
        else {
            debug!("Navigation to window {} was cancelled", index);
            return true;
        };

        self.transition(|state| {
            if state.generation != generation {
                debug!("Discarding stale navigation result");
                return false;
            }

            state.in_flight = None;
            state.snapshot.processing = false;
            match outcome {
                Ok(()) => state.snapshot.current_index = index,
                Err(e) => {
                    warn!("Navigation to window {} failed: {}", index, e);
                    state.snapshot.error_message = e.to_string();
                }
            }
            true
        });

        true
    }

    /// Leave window mode from any phase, dropping all state.
    pub fn exit_window_mode(&self) {
        self.transition(|state| {
            state.supersede();
            state.snapshot = PhaseSnapshot::default();
            true
        });
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.lock_state().snapshot.phase
    }

    /// Regions from the last detection run.
    pub fn detected(&self) -> Arc<[DetectedRegion]> {
        Arc::clone(&self.lock_state().snapshot.detected)
    }

    /// Regions the user picked.
    pub fn selected(&self) -> Arc<[DetectedRegion]> {
        Arc::clone(&self.lock_state().snapshot.selected)
    }

    /// Index of the window in front.
    pub fn current_index(&self) -> usize {
        self.lock_state().snapshot.current_index
    }

    /// Whether a detection run or navigation is in flight.
    pub fn is_processing(&self) -> bool {
        self.lock_state().snapshot.processing
    }

    /// Last failure message, empty when there is none.
    pub fn error_message(&self) -> String {
        self.lock_state().snapshot.error_message.clone()
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> PhaseSnapshot {
        self.lock_state().snapshot.clone()
    }

    /// Whether [`navigate_to_window`](Self::navigate_to_window) would accept `index`.
    pub fn can_navigate(&self, index: usize) -> bool {
        let state = self.lock_state();
        let snapshot = &state.snapshot;
        snapshot.phase == Phase::Navigating
            && !snapshot.processing
            && index < snapshot.selected.len()
    }

    /// Window in front while navigating.
    pub fn current_region(&self) -> Option<DetectedRegion> {
        self.lock_state().snapshot.current_region().cloned()
    }

    /// Check the state against the per-phase rules.
    pub fn validate_state(&self) -> bool {
        self.lock_state().snapshot.is_consistent()
    }
}

impl Drop for PhaseController {
    fn drop(&mut self) {
        if let Some(task) = self.lock_state().in_flight.take() {
            task.abort();
        }
    }
}

impl fmt::Debug for PhaseController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseController")
            .field("snapshot", &self.lock_state().snapshot)
            .finish_non_exhaustive()
    }
}
