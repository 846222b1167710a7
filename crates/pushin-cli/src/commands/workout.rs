use chrono::{DateTime, Utc};
use clap::Subcommand;
use pushin_core::{
    AccessState, Config, IgnoreReason, Transition, Workout, WorkoutKind, WorkoutTracker,
};
use serde_json::json;

use super::{with_controller, CliResult};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Start a workout to earn screen time
    Start {
        /// Exercise (push_ups, squats, jumping_jacks, sit_ups, plank)
        kind: WorkoutKind,
        /// Override the configured target (reps, or seconds for plank)
        #[arg(long)]
        target: Option<u32>,
        /// Override the configured reward in seconds
        #[arg(long)]
        reward: Option<u64>,
    },
    /// Record completed reps (or seconds held)
    Rep {
        #[arg(default_value = "1")]
        count: u32,
    },
    /// Finish the workout and unlock, if the target was reached
    Complete,
    /// Abandon the workout and return to locked
    Cancel,
    /// List available exercises with their configured target and reward
    Kinds,
}

fn build_workout(
    config: &Config,
    kind: WorkoutKind,
    target: Option<u32>,
    reward: Option<u64>,
) -> Result<Workout, pushin_core::ValidationError> {
    let preset = config.workouts.preset(kind);
    Workout::new(
        kind,
        target.unwrap_or(preset.target),
        reward.unwrap_or(preset.reward_secs),
    )
}

pub fn run(action: WorkoutAction, now: DateTime<Utc>) -> CliResult {
    match action {
        WorkoutAction::Start {
            kind,
            target,
            reward,
        } => with_controller(now, |ctl, config| {
            let workout = build_workout(config, kind, target, reward)?;
            Ok(Some(ctl.start_workout(workout, now)))
        }),
        WorkoutAction::Rep { count } => with_controller(now, |ctl, _| {
            if ctl.state() != AccessState::Earning {
                return Ok(Some(Transition::Ignored(IgnoreReason::NotEarning)));
            }
            ctl.tracker_mut().record_progress(count);
            Ok(None)
        }),
        WorkoutAction::Complete => with_controller(now, |ctl, _| Ok(Some(ctl.complete_workout(now)))),
        WorkoutAction::Cancel => with_controller(now, |ctl, _| Ok(Some(ctl.cancel_workout()))),
        WorkoutAction::Kinds => {
            let config = Config::load()?;
            let kinds: Vec<_> = WorkoutKind::ALL
                .iter()
                .map(|&kind| {
                    let preset = config.workouts.preset(kind);
                    json!({
                        "kind": kind,
                        "name": kind.display_name(),
                        "unit": kind.unit(),
                        "target": preset.target,
                        "reward_secs": preset.reward_secs,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&kinds)?);
            Ok(())
        }
    }
}
