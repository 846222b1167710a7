//! Workout progress tracking.
//!
//! The controller only asks one question of a tracker: has the active
//! workout's target been reached? How reps are counted (camera pose detection,
//! accelerometer, manual taps) is up to the implementation.

use serde::{Deserialize, Serialize};

use super::Workout;

/// Counts progress toward the active workout's target.
pub trait WorkoutTracker {
    /// Start counting for `workout`, discarding any previous progress.
    fn begin(&mut self, workout: &Workout);

    /// Record `count` reps (or seconds, for timed workouts).
    fn record_progress(&mut self, count: u32);

    /// Record a single rep.
    fn record_rep(&mut self) {
        self.record_progress(1);
    }

    /// Progress recorded since the last `begin`.
    fn progress(&self) -> u32;

    /// Whether a workout is being tracked (`begin` without a later `reset`).
    fn is_tracking(&self) -> bool;

    /// Whether the active workout's target has been reached.
    /// Always `false` when no workout is being tracked.
    fn is_target_met(&self) -> bool;

    /// Stop tracking and forget progress.
    fn reset(&mut self);
}

impl<T: WorkoutTracker + ?Sized> WorkoutTracker for &mut T {
    fn begin(&mut self, workout: &Workout) {
        (**self).begin(workout)
    }
    fn record_progress(&mut self, count: u32) {
        (**self).record_progress(count)
    }
    fn progress(&self) -> u32 {
        (**self).progress()
    }
    fn is_tracking(&self) -> bool {
        (**self).is_tracking()
    }
    fn is_target_met(&self) -> bool {
        (**self).is_target_met()
    }
    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<T: WorkoutTracker + ?Sized> WorkoutTracker for Box<T> {
    fn begin(&mut self, workout: &Workout) {
        (**self).begin(workout)
    }
    fn record_progress(&mut self, count: u32) {
        (**self).record_progress(count)
    }
    fn progress(&self) -> u32 {
        (**self).progress()
    }
    fn is_tracking(&self) -> bool {
        (**self).is_tracking()
    }
    fn is_target_met(&self) -> bool {
        (**self).is_target_met()
    }
    fn reset(&mut self) {
        (**self).reset()
    }
}

/// In-memory tracker fed by explicit rep events.
///
/// Serializable so front ends without a long-lived process can persist it
/// between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepCounter {
    target: Option<u32>,
    count: u32,
}

impl RepCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkoutTracker for RepCounter {
    fn begin(&mut self, workout: &Workout) {
        self.target = Some(workout.target);
        self.count = 0;
    }

    fn record_progress(&mut self, count: u32) {
        // Reps outside a workout are dropped.
        if self.target.is_some() {
            self.count = self.count.saturating_add(count);
        }
    }

    fn progress(&self) -> u32 {
        self.count
    }

    fn is_tracking(&self) -> bool {
        self.target.is_some()
    }

    fn is_target_met(&self) -> bool {
        matches!(self.target, Some(t) if self.count >= t)
    }

    fn reset(&mut self) {
        self.target = None;
        self.count = 0;
    }
}
