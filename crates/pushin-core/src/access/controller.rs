//! Access controller: the lock / earn / unlock / expire state machine.
//!
//! The controller has no internal clock and no thread. Every operation that
//! depends on time takes `now` from the caller, and `tick()` must be called
//! periodically for session expiry and re-locking to happen.
//!
//! ## State Transitions
//!
//! ```text
//! Locked | Expired --start_workout--> Earning
//! Earning --cancel_workout--> Locked
//! Earning --complete_workout (target met)--> Unlocked
//! Unlocked --tick (session elapsed)--> Expired
//! Expired --tick (grace elapsed)--> Locked
//! any --lock--> Locked
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut ctl = AccessController::new(targets, 5, RepCounter::new(), MemorySessionStore::new());
//! ctl.start_workout(Workout::from_kind(WorkoutKind::PushUps), now);
//! ctl.tracker_mut().record_progress(10);
//! ctl.complete_workout(now);
//! // In a loop:
//! ctl.tick(Utc::now());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::{add_secs, UnlockSession, UnlockSessionStore};
use super::target::BlockTarget;
use crate::enforcement::BlockEnforcer;
use crate::error::EnforcementError;
use crate::events::Event;
use crate::workout::{Workout, WorkoutTracker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessState {
    Locked,
    /// Mid-workout; targets stay blocked.
    Earning,
    Unlocked,
    /// Earned time ran out; waiting out the grace period.
    Expired,
}

impl AccessState {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessState::Locked => "locked",
            AccessState::Earning => "earning",
            AccessState::Unlocked => "unlocked",
            AccessState::Expired => "expired",
        }
    }

    /// Whether block targets are blocked in this state.
    pub fn blocks(self) -> bool {
        self != AccessState::Unlocked
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a command left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// `start_workout` while a workout is already running.
    WorkoutInProgress,
    /// `start_workout` while targets are unlocked.
    AlreadyUnlocked,
    /// `complete_workout` or `cancel_workout` with no active workout.
    NotEarning,
    /// The tracker has not reported the workout target as met.
    TargetNotMet,
    /// The session store could not record the new session.
    SessionStoreFailed,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            IgnoreReason::WorkoutInProgress => "a workout is already in progress",
            IgnoreReason::AlreadyUnlocked => "targets are already unlocked",
            IgnoreReason::NotEarning => "no workout is in progress",
            IgnoreReason::TargetNotMet => "workout target not met yet",
            IgnoreReason::SessionStoreFailed => "unlock session could not be recorded",
        };
        f.write_str(msg)
    }
}

/// Outcome of a controller command.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied(Event),
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }

    pub fn event(&self) -> Option<&Event> {
        match self {
            Transition::Applied(event) => Some(event),
            Transition::Ignored(_) => None,
        }
    }

    pub fn ignored_reason(&self) -> Option<IgnoreReason> {
        match self {
            Transition::Applied(_) => None,
            Transition::Ignored(reason) => Some(*reason),
        }
    }
}

/// Internal state with its payload. Carrying the workout and session inside
/// the variant keeps "earning iff workout" and "unlocked iff session" true by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum Phase {
    Locked,
    Earning { workout: Workout },
    Unlocked { session: UnlockSession },
    Expired { expired_at: DateTime<Utc> },
}

impl Phase {
    fn state(&self) -> AccessState {
        match self {
            Phase::Locked => AccessState::Locked,
            Phase::Earning { .. } => AccessState::Earning,
            Phase::Unlocked { .. } => AccessState::Unlocked,
            Phase::Expired { .. } => AccessState::Expired,
        }
    }
}

/// Serializable controller state, without its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedController {
    phase: Phase,
    targets: Vec<BlockTarget>,
    grace_period_secs: u64,
}

impl SavedController {
    pub fn state(&self) -> AccessState {
        self.phase.state()
    }

    pub fn targets(&self) -> &[BlockTarget] {
        &self.targets
    }

    pub fn grace_period_secs(&self) -> u64 {
        self.grace_period_secs
    }
}

/// Decides whether the configured block targets are blocked or accessible.
///
/// Generic over its collaborators; pass `&mut tracker` / `&mut store` to keep
/// ownership outside the controller.
#[derive(Debug)]
pub struct AccessController<T, S> {
    targets: Vec<BlockTarget>,
    grace_period_secs: u64,
    phase: Phase,
    tracker: T,
    store: S,
}

impl<T: WorkoutTracker, S: UnlockSessionStore> AccessController<T, S> {
    /// Create a controller in the `Locked` state.
    pub fn new(targets: Vec<BlockTarget>, grace_period_secs: u64, tracker: T, store: S) -> Self {
        Self {
            targets,
            grace_period_secs,
            phase: Phase::Locked,
            tracker,
            store,
        }
    }

    /// Rebuild a controller from saved state.
    ///
    /// A saved `Unlocked` phase is only trusted if the store still holds the
    /// same session; otherwise the controller comes back `Locked`. A stale
    /// store record next to any other phase is cleared.
    ///
    /// The tracker is brought in line with the phase: an idle tracker is
    /// started on a saved workout, and a tracker still counting outside
    /// `Earning` is reset.
    pub fn from_saved(saved: SavedController, mut tracker: T, mut store: S) -> Self {
        let stored = match store.current() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("session store unreadable while restoring: {e}");
                None
            }
        };

        let phase = match saved.phase {
            Phase::Unlocked { session } => {
                if stored.as_ref().map(|s| s.id) == Some(session.id) {
                    Phase::Unlocked { session }
                } else {
                    tracing::warn!(
                        session_id = %session.id,
                        "saved unlock session missing from store; restoring as locked"
                    );
                    Phase::Locked
                }
            }
            other => {
                if stored.is_some() {
                    if let Err(e) = store.clear() {
                        tracing::warn!("failed to clear stale unlock session: {e}");
                    }
                }
                other
            }
        };

        match &phase {
            Phase::Earning { workout } if !tracker.is_tracking() => {
                tracing::warn!(kind = %workout.kind, "workout progress lost; restarting count");
                tracker.begin(workout);
            }
            Phase::Earning { .. } => {}
            _ if tracker.is_tracking() => tracker.reset(),
            _ => {}
        }

        Self {
            targets: saved.targets,
            grace_period_secs: saved.grace_period_secs,
            phase,
            tracker,
            store,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AccessState {
        self.phase.state()
    }

    pub fn targets(&self) -> &[BlockTarget] {
        &self.targets
    }

    pub fn grace_period_secs(&self) -> u64 {
        self.grace_period_secs
    }

    pub fn active_workout(&self) -> Option<&Workout> {
        match &self.phase {
            Phase::Earning { workout } => Some(workout),
            _ => None,
        }
    }

    pub fn active_session(&self) -> Option<&UnlockSession> {
        match &self.phase {
            Phase::Unlocked { session } => Some(session),
            _ => None,
        }
    }

    /// When the last session expired, while in `Expired`.
    pub fn expired_at(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            Phase::Expired { expired_at } => Some(expired_at),
            _ => None,
        }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Targets blocked at `now`: all of them unless `Unlocked`.
    ///
    /// Answers from the current state only; call `tick(now)` first to apply
    /// any expiry that is due.
    pub fn get_blocked_targets(&self, _now: DateTime<Utc>) -> &[BlockTarget] {
        if self.state().blocks() {
            &self.targets
        } else {
            &[]
        }
    }

    /// Exact complement of [`get_blocked_targets`](Self::get_blocked_targets).
    pub fn get_accessible_targets(&self, _now: DateTime<Utc>) -> &[BlockTarget] {
        if self.state().blocks() {
            &[]
        } else {
            &self.targets
        }
    }

    /// Seconds left before an expired controller re-locks; 0 outside `Expired`.
    pub fn get_grace_period_remaining(&self, now: DateTime<Utc>) -> u64 {
        match self.phase {
            Phase::Expired { expired_at } => {
                let elapsed = (now - expired_at).num_seconds().max(0) as u64;
                self.grace_period_secs.saturating_sub(elapsed)
            }
            _ => 0,
        }
    }

    /// Seconds of earned time left; 0 outside `Unlocked`.
    pub fn session_remaining(&self, now: DateTime<Utc>) -> u64 {
        self.active_session()
            .map(|s| s.remaining_secs(now))
            .unwrap_or(0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        let workout = self.active_workout();
        Event::StateSnapshot {
            state: self.state(),
            blocked: self.get_blocked_targets(now).to_vec(),
            accessible: self.get_accessible_targets(now).to_vec(),
            workout: workout.map(|w| w.kind),
            workout_target: workout.map(|w| w.target),
            workout_progress: workout.map(|_| self.tracker.progress()),
            session_remaining_secs: self.session_remaining(now),
            grace_period_remaining_secs: self.get_grace_period_remaining(now),
            at: now,
        }
    }

    /// Capture the controller's state for persistence.
    pub fn to_saved(&self) -> SavedController {
        SavedController {
            phase: self.phase.clone(),
            targets: self.targets.clone(),
            grace_period_secs: self.grace_period_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_workout(&mut self, workout: Workout, now: DateTime<Utc>) -> Transition {
        match self.state() {
            AccessState::Locked | AccessState::Expired => {
                self.tracker.begin(&workout);
                let event = Event::WorkoutStarted {
                    kind: workout.kind,
                    target: workout.target,
                    earned_time_secs: workout.earned_time_secs,
                    at: now,
                };
                tracing::info!(
                    kind = %workout.kind,
                    target = workout.target,
                    from = %self.state(),
                    "workout started"
                );
                self.phase = Phase::Earning { workout };
                Transition::Applied(event)
            }
            AccessState::Earning => self.ignore("start_workout", IgnoreReason::WorkoutInProgress),
            AccessState::Unlocked => self.ignore("start_workout", IgnoreReason::AlreadyUnlocked),
        }
    }

    /// Unlock if the tracker reports the active workout's target as met.
    pub fn complete_workout(&mut self, now: DateTime<Utc>) -> Transition {
        let Phase::Earning { workout } = &self.phase else {
            return self.ignore("complete_workout", IgnoreReason::NotEarning);
        };
        if !self.tracker.is_target_met() {
            return self.ignore("complete_workout", IgnoreReason::TargetNotMet);
        }

        let session = UnlockSession::new(now, workout.earned_time_secs, workout.kind);
        if let Err(e) = self.store.create(&session) {
            tracing::warn!("failed to record unlock session: {e}");
            return self.ignore("complete_workout", IgnoreReason::SessionStoreFailed);
        }

        self.tracker.reset();
        let event = Event::Unlocked {
            session_id: session.id,
            kind: session.earned_by,
            duration_secs: session.duration_secs,
            at: now,
        };
        tracing::info!(
            session_id = %session.id,
            duration_secs = session.duration_secs,
            "targets unlocked"
        );
        self.phase = Phase::Unlocked { session };
        Transition::Applied(event)
    }

    pub fn cancel_workout(&mut self) -> Transition {
        let Phase::Earning { workout } = &self.phase else {
            return self.ignore("cancel_workout", IgnoreReason::NotEarning);
        };
        let event = Event::WorkoutCancelled { kind: workout.kind };
        tracing::info!(kind = %workout.kind, "workout cancelled");
        self.tracker.reset();
        self.phase = Phase::Locked;
        Transition::Applied(event)
    }

    /// Advance time. Returns the events applied, in order.
    ///
    /// A single call can expire the session and re-lock when the grace period
    /// is zero, so repeating `tick` with the same `now` is always a no-op.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = Vec::new();

        if let Phase::Unlocked { session } = &self.phase {
            if session.is_elapsed(now) {
                let session_id = session.id;
                self.phase = Phase::Expired { expired_at: now };
                self.clear_store();
                tracing::info!(%session_id, "unlock session expired");
                events.push(Event::SessionExpired {
                    session_id,
                    grace_period_secs: self.grace_period_secs,
                    at: now,
                });
            }
        }

        if let Phase::Expired { expired_at } = self.phase {
            if now >= add_secs(expired_at, self.grace_period_secs) {
                self.phase = Phase::Locked;
                tracing::info!("grace period elapsed; re-locked");
                events.push(Event::Relocked { at: now });
            }
        }

        events
    }

    /// Unconditionally lock, discarding any workout or session.
    pub fn lock(&mut self) -> Transition {
        let from = self.state();
        match from {
            AccessState::Earning => self.tracker.reset(),
            AccessState::Unlocked => self.clear_store(),
            AccessState::Locked | AccessState::Expired => {}
        }
        self.phase = Phase::Locked;
        tracing::info!(%from, "locked by override");
        Transition::Applied(Event::Locked { from })
    }

    /// Replace the target list. The access state is unaffected.
    pub fn update_blocked_apps(&mut self, targets: Vec<BlockTarget>) -> Event {
        self.targets = targets;
        tracing::debug!(count = self.targets.len(), "block targets updated");
        Event::TargetsUpdated {
            count: self.targets.len(),
        }
    }

    /// Change the grace period. An expiry already in progress is measured
    /// against the new value from the next query on.
    pub fn set_grace_period_secs(&mut self, grace_period_secs: u64) {
        self.grace_period_secs = grace_period_secs;
    }

    /// Push the current lists to `enforcer`. Failures are logged and returned
    /// but never change the controller's state.
    pub fn enforce<E: BlockEnforcer + ?Sized>(
        &self,
        now: DateTime<Utc>,
        enforcer: &mut E,
    ) -> Result<(), EnforcementError> {
        let result = enforcer.apply(
            self.get_blocked_targets(now),
            self.get_accessible_targets(now),
        );
        if let Err(e) = &result {
            tracing::warn!(state = %self.state(), "{e}");
        }
        result
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn ignore(&self, op: &'static str, reason: IgnoreReason) -> Transition {
        tracing::debug!(op, state = %self.state(), %reason, "transition ignored");
        Transition::Ignored(reason)
    }

    fn clear_store(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("failed to clear unlock session: {e}");
        }
    }
}
