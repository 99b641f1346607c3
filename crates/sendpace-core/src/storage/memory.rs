//! In-memory schedule store.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{due_range, ScheduleStore};
use crate::clock::day_bounds;
use crate::error::StoreError;
use crate::send::{NewScheduledSend, ScheduledSend};

/// Schedule store backed by a `Vec` behind a mutex.
///
/// Honors the same conditional-commit contract as the SQLite store,
/// with the mutex as the critical section. Intended for tests and for
/// embedding without a database file. The `set_unavailable` switch
/// simulates a backing-store outage.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    sends: Vec<ScheduledSend>,
    next_id: i64,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.unavailable = unavailable;
        }
    }

    fn lock_inner(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        if inner.unavailable {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(inner)
    }
}

impl ScheduleStore for MemoryStore {
    fn query_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduledSend>, StoreError> {
        let inner = self.lock_inner()?;
        let mut sends: Vec<ScheduledSend> = inner
            .sends
            .iter()
            .filter(|s| s.scheduled_at >= start && s.scheduled_at <= end)
            .cloned()
            .collect();
        sends.sort_by_key(|s| s.scheduled_at);
        Ok(sends)
    }

    fn insert(
        &self,
        send: &NewScheduledSend,
        expected_day_count: usize,
    ) -> Result<i64, StoreError> {
        let (day_start, day_end) = day_bounds(send.scheduled_at);
        let mut inner = self.lock_inner()?;

        let day_count = inner
            .sends
            .iter()
            .filter(|s| s.scheduled_at >= day_start && s.scheduled_at <= day_end)
            .count();
        if day_count != expected_day_count {
            return Err(StoreError::Conflict);
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.sends.push(send.clone().with_id(id));
        Ok(id)
    }

    fn query_due(
        &self,
        now: DateTime<Utc>,
        window_minutes: i64,
    ) -> Result<Vec<ScheduledSend>, StoreError> {
        let (start, end) = due_range(now, window_minutes)?;
        self.query_day(start, end)
    }
}
