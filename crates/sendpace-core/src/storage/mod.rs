mod config;
pub mod memory;
pub mod schedule_db;

pub use config::{PacingConfig, PoolConfig};
pub use memory::MemoryStore;
pub use schedule_db::SqliteStore;

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::error::StoreError;
use crate::send::{NewScheduledSend, ScheduledSend};

/// Widest due window a store accepts: a full day either side of `now`.
pub const MAX_DUE_WINDOW_MINUTES: i64 = 1440;

/// Committed-schedule access the scheduling service depends on.
///
/// `insert` is conditional: the caller passes the day row count its
/// decision was based on, and the commit succeeds only if that count
/// is still current inside one store-level critical section. A changed
/// count fails with [`StoreError::Conflict`] and writes nothing; the
/// caller re-reads and decides again.
pub trait ScheduleStore: Send + Sync {
    /// Committed sends with `start <= scheduled_at <= end`, ascending
    /// by instant.
    fn query_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduledSend>, StoreError>;

    /// Commit a reservation if its day still holds exactly
    /// `expected_day_count` sends. Returns the assigned id.
    fn insert(&self, send: &NewScheduledSend, expected_day_count: usize)
        -> Result<i64, StoreError>;

    /// Committed sends within `window_minutes` either side of `now`,
    /// ascending by instant. The read side a delivery worker polls.
    /// Windows outside `0..=MAX_DUE_WINDOW_MINUTES` fail with
    /// [`StoreError::InvalidDueWindow`].
    fn query_due(
        &self,
        now: DateTime<Utc>,
        window_minutes: i64,
    ) -> Result<Vec<ScheduledSend>, StoreError>;
}

/// Bounds for a due query, or [`StoreError::InvalidDueWindow`] when the
/// window would not survive calendar arithmetic.
fn due_range(
    now: DateTime<Utc>,
    window_minutes: i64,
) -> Result<(DateTime<Utc>, DateTime<Utc>), StoreError> {
    if !(0..=MAX_DUE_WINDOW_MINUTES).contains(&window_minutes) {
        return Err(StoreError::InvalidDueWindow {
            minutes: window_minutes,
        });
    }
    let window = Duration::minutes(window_minutes);
    Ok((now - window, now + window))
}

/// Returns `~/.config/sendpace[-dev]/` based on SENDPACE_ENV, creating
/// it if needed.
///
/// Set SENDPACE_ENV=dev to use the development data directory, or
/// SENDPACE_DATA_DIR to point somewhere else entirely (tests use a
/// temporary directory through this).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    let dir = match std::env::var("SENDPACE_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("SENDPACE_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("sendpace-dev")
            } else {
                base_dir.join("sendpace")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
