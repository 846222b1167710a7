//! Workouts: what the user must complete to earn screen time.
//!
//! A [`Workout`] is a value describing one exercise session. It is created when
//! the user picks an exercise, handed to the controller, and discarded once the
//! session is completed or cancelled. Progress is counted by a
//! [`WorkoutTracker`], never by the workout itself.

mod tracker;

pub use tracker::{RepCounter, WorkoutTracker};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How progress toward a workout target is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetUnit {
    Reps,
    Seconds,
}

/// Built-in exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    PushUps,
    Squats,
    JumpingJacks,
    SitUps,
    /// Held for a duration rather than counted.
    Plank,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 5] = [
        WorkoutKind::PushUps,
        WorkoutKind::Squats,
        WorkoutKind::JumpingJacks,
        WorkoutKind::SitUps,
        WorkoutKind::Plank,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkoutKind::PushUps => "push_ups",
            WorkoutKind::Squats => "squats",
            WorkoutKind::JumpingJacks => "jumping_jacks",
            WorkoutKind::SitUps => "sit_ups",
            WorkoutKind::Plank => "plank",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            WorkoutKind::PushUps => "Push-Ups",
            WorkoutKind::Squats => "Squats",
            WorkoutKind::JumpingJacks => "Jumping Jacks",
            WorkoutKind::SitUps => "Sit-Ups",
            WorkoutKind::Plank => "Plank",
        }
    }

    pub fn unit(self) -> TargetUnit {
        match self {
            WorkoutKind::Plank => TargetUnit::Seconds,
            _ => TargetUnit::Reps,
        }
    }

    /// Default target count (reps, or seconds for timed kinds).
    pub fn default_target(self) -> u32 {
        match self {
            WorkoutKind::PushUps => 10,
            WorkoutKind::Squats => 20,
            WorkoutKind::JumpingJacks => 30,
            WorkoutKind::SitUps => 15,
            WorkoutKind::Plank => 45,
        }
    }

    /// Default screen time granted on completion, in seconds.
    pub fn default_reward_secs(self) -> u64 {
        match self {
            WorkoutKind::PushUps => 180,
            WorkoutKind::Squats => 180,
            WorkoutKind::JumpingJacks => 120,
            WorkoutKind::SitUps => 150,
            WorkoutKind::Plank => 240,
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "push_ups" | "pushups" => Ok(WorkoutKind::PushUps),
            "squats" => Ok(WorkoutKind::Squats),
            "jumping_jacks" => Ok(WorkoutKind::JumpingJacks),
            "sit_ups" | "situps" => Ok(WorkoutKind::SitUps),
            "plank" => Ok(WorkoutKind::Plank),
            _ => Err(ValidationError::UnknownVariant {
                kind: "workout kind",
                value: s.to_string(),
            }),
        }
    }
}

/// One exercise session to complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub kind: WorkoutKind,
    /// Reps, or seconds when `kind.unit()` is [`TargetUnit::Seconds`].
    pub target: u32,
    pub earned_time_secs: u64,
}

impl Workout {
    /// Build a workout with an explicit target and reward.
    ///
    /// # Errors
    /// Returns [`ValidationError::Zero`] if either the target or the reward is
    /// zero, and [`ValidationError::InvalidValue`] if the reward exceeds
    /// `i64::MAX` seconds.
    pub fn new(kind: WorkoutKind, target: u32, earned_time_secs: u64) -> Result<Self, ValidationError> {
        if target == 0 {
            return Err(ValidationError::Zero { field: "target" });
        }
        if earned_time_secs == 0 {
            return Err(ValidationError::Zero {
                field: "earned_time_secs",
            });
        }
        if i64::try_from(earned_time_secs).is_err() {
            return Err(ValidationError::InvalidValue {
                field: "earned_time_secs".to_string(),
                message: format!("{earned_time_secs} seconds is out of range"),
            });
        }
        Ok(Self {
            kind,
            target,
            earned_time_secs,
        })
    }

    /// Workout using the kind's built-in target and reward.
    pub fn from_kind(kind: WorkoutKind) -> Self {
        Self {
            kind,
            target: kind.default_target(),
            earned_time_secs: kind.default_reward_secs(),
        }
    }

    pub fn unit(&self) -> TargetUnit {
        self.kind.unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_target_and_reward() {
        assert_eq!(
            Workout::new(WorkoutKind::PushUps, 0, 180),
            Err(ValidationError::Zero { field: "target" })
        );
        assert_eq!(
            Workout::new(WorkoutKind::PushUps, 10, 0),
            Err(ValidationError::Zero {
                field: "earned_time_secs"
            })
        );
        assert!(Workout::new(WorkoutKind::PushUps, 10, 180).is_ok());
    }

    #[test]
    fn new_rejects_reward_beyond_storable_range() {
        assert!(matches!(
            Workout::new(WorkoutKind::Squats, 10, u64::MAX),
            Err(ValidationError::InvalidValue { .. })
        ));
        assert!(Workout::new(WorkoutKind::Squats, 10, i64::MAX as u64).is_ok());
    }

    #[test]
    fn kind_parses_common_spellings() {
        assert_eq!("push-ups".parse::<WorkoutKind>(), Ok(WorkoutKind::PushUps));
        assert_eq!("Jumping Jacks".parse::<WorkoutKind>(), Ok(WorkoutKind::JumpingJacks));
        assert_eq!("situps".parse::<WorkoutKind>(), Ok(WorkoutKind::SitUps));
        assert!("burpees".parse::<WorkoutKind>().is_err());
    }

    #[test]
    fn kind_str_roundtrips_through_from_str() {
        for kind in WorkoutKind::ALL {
            assert_eq!(kind.as_str().parse::<WorkoutKind>(), Ok(kind));
        }
    }

    #[test]
    fn plank_is_timed() {
        assert_eq!(WorkoutKind::Plank.unit(), TargetUnit::Seconds);
        assert_eq!(Workout::from_kind(WorkoutKind::Squats).unit(), TargetUnit::Reps);
    }
}
