//! Integration tests for persisting the controller across process restarts.
//!
//! Mirrors how the CLI works: each invocation opens the on-disk database,
//! rebuilds the controller from the saved snapshot, acts, and saves again.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pushin_core::{
    AccessController, AccessState, BlockTarget, Config, Database, RepCounter, SavedController,
    SqliteSessionStore, TargetCategory, UnlockSessionStore, WorkoutKind, WorkoutTracker,
};

const CONTROLLER_KEY: &str = "controller";
const TRACKER_KEY: &str = "tracker";

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 7, 0, 0).unwrap()
}

/// One "invocation": restore, run `f`, persist.
fn with_controller<F>(db: &Database, f: F)
where
    F: FnOnce(&mut AccessController<RepCounter, SqliteSessionStore<'_>>),
{
    let tracker = db
        .kv_get(TRACKER_KEY)
        .unwrap()
        .map(|json| serde_json::from_str::<RepCounter>(&json).unwrap())
        .unwrap_or_default();
    let store = SqliteSessionStore::new(db);
    let mut ctl = match db.kv_get(CONTROLLER_KEY).unwrap() {
        Some(json) => {
            let saved: SavedController = serde_json::from_str(&json).unwrap();
            AccessController::from_saved(saved, tracker, store)
        }
        None => AccessController::new(
            vec![BlockTarget::new("com.social.media", "Social", TargetCategory::Social)],
            5,
            tracker,
            store,
        ),
    };

    f(&mut ctl);

    db.kv_set(CONTROLLER_KEY, &serde_json::to_string(&ctl.to_saved()).unwrap())
        .unwrap();
    db.kv_set(TRACKER_KEY, &serde_json::to_string(ctl.tracker()).unwrap())
        .unwrap();
}

#[test]
fn test_cycle_survives_reopening_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pushin.db");
    let cfg = Config::default();

    {
        let db = Database::open_at(&path).unwrap();
        with_controller(&db, |ctl| {
            let workout = cfg.workout(WorkoutKind::PushUps).unwrap();
            assert!(ctl.start_workout(workout, t0()).is_applied());
        });
    }
    {
        let db = Database::open_at(&path).unwrap();
        with_controller(&db, |ctl| {
            assert_eq!(ctl.state(), AccessState::Earning);
            ctl.tracker_mut().record_progress(4);
        });
    }
    {
        let db = Database::open_at(&path).unwrap();
        with_controller(&db, |ctl| {
            assert_eq!(ctl.tracker().progress(), 4);
            ctl.tracker_mut().record_progress(6);
            assert!(ctl.complete_workout(t0() + Duration::seconds(60)).is_applied());
        });
    }
    {
        let db = Database::open_at(&path).unwrap();
        with_controller(&db, |ctl| {
            assert_eq!(ctl.state(), AccessState::Unlocked);
            assert_eq!(ctl.session_remaining(t0() + Duration::seconds(120)), 120);
            let _ = ctl.tick(t0() + Duration::seconds(240));
            assert_eq!(ctl.state(), AccessState::Expired);
        });
        assert!(SqliteSessionStore::new(&db).current().unwrap().is_none());
    }
    {
        let db = Database::open_at(&path).unwrap();
        with_controller(&db, |ctl| {
            assert_eq!(ctl.state(), AccessState::Expired);
            let _ = ctl.tick(t0() + Duration::seconds(245));
            assert_eq!(ctl.state(), AccessState::Locked);
        });
    }
}

#[test]
fn test_unlock_revoked_when_session_row_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pushin.db");

    {
        let db = Database::open_at(&path).unwrap();
        with_controller(&db, |ctl| {
            let _ = ctl.start_workout(
                pushin_core::Workout::new(WorkoutKind::Plank, 1, 600).unwrap(),
                t0(),
            );
            ctl.tracker_mut().record_rep();
            assert!(ctl.complete_workout(t0()).is_applied());
        });
        // Something outside the controller wiped the session.
        db.conn().execute("DELETE FROM unlock_session", []).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    with_controller(&db, |ctl| {
        assert_eq!(ctl.state(), AccessState::Locked);
        assert_eq!(ctl.get_blocked_targets(t0()).len(), 1);
    });
}
