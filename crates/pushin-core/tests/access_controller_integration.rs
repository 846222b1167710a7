//! Integration tests for the access controller.
//!
//! Covers the full lock/earn/unlock/expire/re-lock cycle through the public
//! API, plus property tests for the blocked/accessible partition and tick
//! idempotence.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use pushin_core::{
    AccessController, AccessState, BlockTarget, Event, MemorySessionStore, RepCounter,
    UnlockSessionStore, Workout, WorkoutKind, WorkoutTracker,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 18, 30, 0).unwrap()
}

fn at(offset: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(offset)
}

#[test]
fn test_single_target_full_cycle() {
    let mut tracker = RepCounter::new();
    let mut store = MemorySessionStore::new();
    let social = BlockTarget::from_id("com.social.media");

    {
        let mut ctl = AccessController::new(vec![social.clone()], 5, &mut tracker, &mut store);
        let workout = Workout::new(WorkoutKind::PushUps, 10, 180).unwrap();

        assert!(ctl.start_workout(workout, t0()).is_applied());
        assert_eq!(ctl.state(), AccessState::Earning);
        assert_eq!(ctl.get_blocked_targets(t0()), &[social.clone()]);

        ctl.tracker_mut().record_progress(10);
        assert!(ctl.complete_workout(at(10)).is_applied());
        assert_eq!(ctl.state(), AccessState::Unlocked);
        assert_eq!(ctl.get_accessible_targets(at(10)), &[social.clone()]);
        assert!(ctl.get_blocked_targets(at(10)).is_empty());

        let events = ctl.tick(at(191));
        assert!(matches!(events.as_slice(), [Event::SessionExpired { .. }]));
        assert_eq!(ctl.state(), AccessState::Expired);
        assert_eq!(ctl.get_blocked_targets(at(191)), &[social.clone()]);
        assert!(ctl.get_accessible_targets(at(191)).is_empty());

        let events = ctl.tick(at(196));
        assert_eq!(events, vec![Event::Relocked { at: at(196) }]);
        assert_eq!(ctl.state(), AccessState::Locked);
    }

    // Collaborators were borrowed, not consumed.
    assert!(store.current().unwrap().is_none());
    assert_eq!(tracker.progress(), 0);
}

#[test]
fn test_grace_window_boundaries() {
    let mut ctl = AccessController::new(
        vec![BlockTarget::from_id("com.video.app")],
        5,
        RepCounter::new(),
        MemorySessionStore::new(),
    );
    let _ = ctl.start_workout(Workout::new(WorkoutKind::Squats, 1, 180).unwrap(), t0());
    ctl.tracker_mut().record_rep();
    let _ = ctl.complete_workout(t0());

    let _ = ctl.tick(at(190));
    assert_eq!(ctl.state(), AccessState::Expired);
    let _ = ctl.tick(at(194));
    assert_eq!(ctl.state(), AccessState::Expired);
    let _ = ctl.tick(at(195));
    assert_eq!(ctl.state(), AccessState::Locked);
}

#[test]
fn test_grace_remaining_strictly_decreases() {
    let grace = 5;
    let mut ctl = AccessController::new(
        vec![BlockTarget::from_id("a")],
        grace,
        RepCounter::new(),
        MemorySessionStore::new(),
    );
    let _ = ctl.start_workout(Workout::new(WorkoutKind::Plank, 1, 60).unwrap(), t0());
    ctl.tracker_mut().record_progress(1);
    let _ = ctl.complete_workout(t0());
    let _ = ctl.tick(at(60));

    let mut previous = ctl.get_grace_period_remaining(at(60));
    assert_eq!(previous, grace);
    for offset in 61..=65 {
        let remaining = ctl.get_grace_period_remaining(at(offset));
        assert!(remaining < previous, "{remaining} !< {previous} at +{offset}");
        previous = remaining;
    }
    assert_eq!(previous, 0);

    let _ = ctl.tick(at(65));
    assert_eq!(ctl.get_grace_period_remaining(at(65)), 0);
}

#[test]
fn test_incomplete_workout_never_unlocks() {
    let mut ctl = AccessController::new(
        vec![BlockTarget::from_id("a")],
        5,
        RepCounter::new(),
        MemorySessionStore::new(),
    );
    let _ = ctl.start_workout(Workout::from_kind(WorkoutKind::JumpingJacks), t0());
    ctl.tracker_mut().record_progress(WorkoutKind::JumpingJacks.default_target() - 1);
    assert!(!ctl.complete_workout(at(30)).is_applied());
    assert_eq!(ctl.state(), AccessState::Earning);
    assert!(ctl.active_session().is_none());
    assert!(ctl.store().current().unwrap().is_none());
}

/// Operations the property tests can apply.
#[derive(Debug, Clone)]
enum Op {
    Start(u64),
    Reps(u32),
    Complete,
    Cancel,
    Tick,
    Lock,
    Retarget(usize),
    Advance(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..400).prop_map(Op::Start),
        (0u32..6).prop_map(Op::Reps),
        Just(Op::Complete),
        Just(Op::Cancel),
        Just(Op::Tick),
        Just(Op::Lock),
        (0usize..4).prop_map(Op::Retarget),
        (0i64..120).prop_map(Op::Advance),
    ]
}

fn targets(n: usize) -> Vec<BlockTarget> {
    (0..n).map(|i| BlockTarget::from_id(format!("app.{i}"))).collect()
}

fn check_invariants(ctl: &AccessController<RepCounter, MemorySessionStore>, now: DateTime<Utc>) {
    let blocked = ctl.get_blocked_targets(now);
    let accessible = ctl.get_accessible_targets(now);
    assert_eq!(blocked.len() + accessible.len(), ctl.targets().len());
    assert!(blocked.is_empty() || accessible.is_empty());
    for t in ctl.targets() {
        assert!(blocked.contains(t) != accessible.contains(t));
    }

    let stored = ctl.store().current().unwrap();
    match ctl.state() {
        AccessState::Unlocked => {
            let session = ctl.active_session().expect("unlocked without session");
            assert_eq!(stored.as_ref(), Some(session));
            assert!(ctl.active_workout().is_none());
        }
        AccessState::Earning => {
            assert!(ctl.active_session().is_none());
            assert!(stored.is_none());
            assert!(ctl.active_workout().is_some());
        }
        AccessState::Locked | AccessState::Expired => {
            assert!(ctl.active_session().is_none());
            assert!(stored.is_none());
            assert!(ctl.active_workout().is_none());
        }
    }

    if ctl.state() != AccessState::Expired {
        assert_eq!(ctl.get_grace_period_remaining(now), 0);
    } else {
        assert!(ctl.get_grace_period_remaining(now) <= ctl.grace_period_secs());
    }
}

proptest! {
    #[test]
    fn prop_invariants_hold_for_any_sequence(
        grace in 0u64..30,
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let mut ctl = AccessController::new(targets(2), grace, RepCounter::new(), MemorySessionStore::new());
        let mut now = t0();

        for op in ops {
            match op {
                Op::Start(reward) => {
                    let _ = ctl.start_workout(Workout::new(WorkoutKind::SitUps, 3, reward).unwrap(), now);
                }
                Op::Reps(n) => ctl.tracker_mut().record_progress(n),
                Op::Complete => { let _ = ctl.complete_workout(now); }
                Op::Cancel => { let _ = ctl.cancel_workout(); }
                Op::Tick => { let _ = ctl.tick(now); }
                Op::Lock => {
                    let _ = ctl.lock();
                    prop_assert_eq!(ctl.state(), AccessState::Locked);
                    prop_assert!(ctl.active_workout().is_none());
                    prop_assert!(ctl.active_session().is_none());
                }
                Op::Retarget(n) => {
                    let before = ctl.state();
                    let _ = ctl.update_blocked_apps(targets(n));
                    prop_assert_eq!(ctl.state(), before);
                }
                Op::Advance(secs) => now += Duration::seconds(secs),
            }
            check_invariants(&ctl, now);
        }
    }

    #[test]
    fn prop_tick_is_idempotent(
        grace in 0u64..30,
        reward in 1u64..300,
        complete_at in 0i64..60,
        tick_at in 0i64..600,
    ) {
        let mut ctl = AccessController::new(targets(1), grace, RepCounter::new(), MemorySessionStore::new());
        let _ = ctl.start_workout(Workout::new(WorkoutKind::PushUps, 1, reward).unwrap(), t0());
        ctl.tracker_mut().record_rep();
        let _ = ctl.complete_workout(at(complete_at));

        let _ = ctl.tick(at(tick_at));
        let state = ctl.state();
        let remaining = ctl.get_grace_period_remaining(at(tick_at));
        for _ in 0..3 {
            prop_assert!(ctl.tick(at(tick_at)).is_empty());
            prop_assert_eq!(ctl.state(), state);
            prop_assert_eq!(ctl.get_grace_period_remaining(at(tick_at)), remaining);
        }
    }
}
