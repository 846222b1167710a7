//! Unlock sessions and the bookkeeping trait that records them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::workout::WorkoutKind;

/// Access granted by a completed workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_secs: u64,
    /// Exercise that earned this session.
    pub earned_by: WorkoutKind,
}

impl UnlockSession {
    pub fn new(started_at: DateTime<Utc>, duration_secs: u64, earned_by: WorkoutKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            duration_secs,
            earned_by,
        }
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        add_secs(self.started_at, self.duration_secs)
    }

    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at()
    }

    /// Whole seconds left before the session elapses, clamped to
    /// `0..=duration_secs`.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let left = (self.ends_at() - now).num_seconds().max(0) as u64;
        left.min(self.duration_secs)
    }
}

/// `t + value` seconds, saturating at the latest representable time.
pub(crate) fn add_secs(t: DateTime<Utc>, value: u64) -> DateTime<Utc> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|d| t.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Records the active unlock session somewhere outside the controller.
///
/// The controller only relies on create-on-complete and clear-on-expire
/// semantics; the backing storage is up to the implementation.
pub trait UnlockSessionStore {
    /// Record `session` as the active one, replacing any previous record.
    fn create(&mut self, session: &UnlockSession) -> Result<(), StoreError>;

    /// The recorded session, if any.
    fn current(&self) -> Result<Option<UnlockSession>, StoreError>;

    /// Forget the recorded session. Clearing an empty store is not an error.
    fn clear(&mut self) -> Result<(), StoreError>;
}

impl<S: UnlockSessionStore + ?Sized> UnlockSessionStore for &mut S {
    fn create(&mut self, session: &UnlockSession) -> Result<(), StoreError> {
        (**self).create(session)
    }
    fn current(&self) -> Result<Option<UnlockSession>, StoreError> {
        (**self).current()
    }
    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

impl<S: UnlockSessionStore + ?Sized> UnlockSessionStore for Box<S> {
    fn create(&mut self, session: &UnlockSession) -> Result<(), StoreError> {
        (**self).create(session)
    }
    fn current(&self) -> Result<Option<UnlockSession>, StoreError> {
        (**self).current()
    }
    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// Session store that keeps the record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Option<UnlockSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnlockSessionStore for MemorySessionStore {
    fn create(&mut self, session: &UnlockSession) -> Result<(), StoreError> {
        self.session = Some(session.clone());
        Ok(())
    }

    fn current(&self) -> Result<Option<UnlockSession>, StoreError> {
        Ok(self.session.clone())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.session = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn session_window() {
        let s = UnlockSession::new(t0(), 180, WorkoutKind::PushUps);
        assert_eq!(s.ends_at(), t0() + Duration::seconds(180));
        assert!(!s.is_elapsed(t0() + Duration::seconds(179)));
        assert!(s.is_elapsed(t0() + Duration::seconds(180)));
    }

    #[test]
    fn remaining_is_clamped() {
        let s = UnlockSession::new(t0(), 60, WorkoutKind::Squats);
        assert_eq!(s.remaining_secs(t0() - Duration::seconds(30)), 60);
        assert_eq!(s.remaining_secs(t0() + Duration::seconds(15)), 45);
        assert_eq!(s.remaining_secs(t0() + Duration::seconds(600)), 0);
    }

    #[test]
    fn huge_duration_saturates() {
        let s = UnlockSession::new(t0(), u64::MAX, WorkoutKind::PushUps);
        assert_eq!(s.ends_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!s.is_elapsed(t0() + Duration::days(365)));
    }

    #[test]
    fn memory_store_create_and_clear() {
        let mut store = MemorySessionStore::new();
        assert!(store.current().unwrap().is_none());
        let s = UnlockSession::new(t0(), 60, WorkoutKind::Plank);
        store.create(&s).unwrap();
        assert_eq!(store.current().unwrap(), Some(s));
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.current().unwrap().is_none());
    }
}
