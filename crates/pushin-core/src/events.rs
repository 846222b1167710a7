use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{AccessState, BlockTarget};
use crate::workout::WorkoutKind;

/// Every applied state change produces an Event.
/// Front ends print or forward them; the enforcement layer reacts to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WorkoutStarted {
        kind: WorkoutKind,
        target: u32,
        earned_time_secs: u64,
        at: DateTime<Utc>,
    },
    WorkoutCancelled {
        kind: WorkoutKind,
    },
    /// Workout target reached; targets are now accessible.
    Unlocked {
        session_id: Uuid,
        kind: WorkoutKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Earned time ran out; the grace period has begun.
    SessionExpired {
        session_id: Uuid,
        grace_period_secs: u64,
        at: DateTime<Utc>,
    },
    /// Grace period elapsed and the controller re-locked on its own.
    Relocked {
        at: DateTime<Utc>,
    },
    /// Explicit lock override.
    Locked {
        from: AccessState,
    },
    TargetsUpdated {
        count: usize,
    },
    StateSnapshot {
        state: AccessState,
        blocked: Vec<BlockTarget>,
        accessible: Vec<BlockTarget>,
        workout: Option<WorkoutKind>,
        workout_target: Option<u32>,
        workout_progress: Option<u32>,
        session_remaining_secs: u64,
        grace_period_remaining_secs: u64,
        at: DateTime<Utc>,
    },
}
