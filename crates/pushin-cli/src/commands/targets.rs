use chrono::{DateTime, Utc};
use clap::Subcommand;
use pushin_core::{BlockTarget, Config, TargetCategory};

use super::{with_controller, CliResult};

#[derive(Subcommand)]
pub enum TargetsAction {
    /// List configured block targets
    List,
    /// Add a target, or update its metadata if the id already exists
    Add {
        /// App or site identifier (e.g. "com.social.media")
        id: String,
        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "other")]
        category: TargetCategory,
    },
    /// Remove a target by id
    Remove {
        id: String,
    },
}

pub fn run(action: TargetsAction, now: DateTime<Utc>) -> CliResult {
    let mut config = Config::load()?;
    match action {
        TargetsAction::List => {
            println!("{}", serde_json::to_string_pretty(&config.targets)?);
            return Ok(());
        }
        TargetsAction::Add { id, name, category } => {
            let name = name.unwrap_or_else(|| id.clone());
            config.upsert_target(BlockTarget::new(id, name, category));
        }
        TargetsAction::Remove { id } => {
            if !config.remove_target(&id) {
                return Err(format!("unknown target: {id}").into());
            }
        }
    }
    config.save()?;

    // The controller picks up the new list when it syncs with the config.
    with_controller(now, |_, _| Ok(None))
}
