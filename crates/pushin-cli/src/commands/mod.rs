//! CLI command handlers.
//!
//! The CLI has no long-lived process, so every invocation restores the
//! controller from the database, ticks it to `now`, runs one command, pushes
//! the result to the enforcer and saves it again.

pub mod access;
pub mod config;
pub mod targets;
pub mod workout;

use chrono::{DateTime, Utc};
use pushin_core::{
    AccessController, Config, Database, Event, IgnoreReason, LogEnforcer, RepCounter,
    SavedController, SqliteSessionStore, Transition,
};
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

pub type Controller<'a> = AccessController<RepCounter, SqliteSessionStore<'a>>;

const CONTROLLER_KEY: &str = "access_controller";
const TRACKER_KEY: &str = "rep_counter";

/// JSON printed by every controller command.
#[derive(Serialize)]
pub struct Report {
    /// Transitions applied during this invocation, in order: config sync,
    /// tick, then the command itself.
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<IgnoreReason>,
    pub snapshot: Event,
}

fn load_tracker(db: &Database) -> RepCounter {
    match db.kv_get(TRACKER_KEY) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            tracing::warn!("discarding unreadable workout progress: {e}");
            RepCounter::new()
        }),
        Ok(None) => RepCounter::new(),
        Err(e) => {
            tracing::warn!("workout progress unavailable: {e}");
            RepCounter::new()
        }
    }
}

fn load_saved(db: &Database) -> Option<SavedController> {
    let json = db.kv_get(CONTROLLER_KEY).ok().flatten()?;
    match serde_json::from_str(&json) {
        Ok(saved) => Some(saved),
        Err(e) => {
            tracing::warn!("discarding unreadable controller state, starting locked: {e}");
            None
        }
    }
}

fn save(db: &Database, ctl: &Controller<'_>) -> CliResult {
    db.kv_set(CONTROLLER_KEY, &serde_json::to_string(&ctl.to_saved())?)?;
    db.kv_set(TRACKER_KEY, &serde_json::to_string(ctl.tracker())?)?;
    Ok(())
}

/// Restore the controller, apply `command`, then enforce, save and print.
///
/// `command` returns the transition it attempted, or `None` for commands that
/// only read or feed the tracker.
pub fn with_controller<F>(now: DateTime<Utc>, command: F) -> CliResult
where
    F: FnOnce(&mut Controller<'_>, &Config) -> CliResult<Option<Transition>>,
{
    let config = Config::load()?;
    let db = Database::open()?;
    let tracker = load_tracker(&db);
    let store = SqliteSessionStore::new(&db);

    let mut ctl = match load_saved(&db) {
        Some(saved) => Controller::from_saved(saved, tracker, store),
        // Targets arrive through the config sync below.
        None => Controller::new(Vec::new(), config.grace_period_secs, tracker, store),
    };

    // Configuration is the source of truth for targets and grace period.
    let mut events = Vec::new();
    if ctl.targets() != config.targets.as_slice() {
        events.push(ctl.update_blocked_apps(config.targets.clone()));
    }
    ctl.set_grace_period_secs(config.grace_period_secs);

    events.extend(ctl.tick(now));
    let mut ignored = None;
    match command(&mut ctl, &config)? {
        Some(Transition::Applied(event)) => events.push(event),
        Some(Transition::Ignored(reason)) => {
            eprintln!("note: {reason}");
            ignored = Some(reason);
        }
        None => {}
    }

    // Enforcement is best effort; failures are logged by the controller.
    let _ = ctl.enforce(now, &mut LogEnforcer::new());
    save(&db, &ctl)?;

    let report = Report {
        events,
        ignored,
        snapshot: ctl.snapshot(now),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
