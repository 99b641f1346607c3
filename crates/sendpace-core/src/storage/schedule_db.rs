//! SQLite-backed schedule store.
//!
//! One connection behind a mutex; the conditional insert runs as a
//! single immediate transaction so the count check and the write
//! cannot interleave with another writer on the same database.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, due_range, ScheduleStore};
use crate::clock::day_bounds;
use crate::error::StoreError;
use crate::send::{NewScheduledSend, ScheduledSend};

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a ScheduledSend from a database row
fn row_to_scheduled_send(row: &rusqlite::Row) -> Result<ScheduledSend, rusqlite::Error> {
    let scheduled_at_str: String = row.get(6)?;
    Ok(ScheduledSend {
        id: row.get(0)?,
        mailbox: row.get(1)?,
        recipient: row.get(2)?,
        subject: row.get(3)?,
        body_text: row.get(4)?,
        sender_name: row.get(5)?,
        scheduled_at: parse_datetime_fallback(&scheduled_at_str),
    })
}

/// Classify a failure inside the conditional insert. A busy or locked
/// database there means another writer holds the schedule; the caller
/// treats that as a lost commit and retries. Everything else, and any
/// read failure, stays [`StoreError::Unavailable`].
fn write_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(code, _) = &err {
        if code.code == rusqlite::ErrorCode::DatabaseBusy
            || code.code == rusqlite::ErrorCode::DatabaseLocked
        {
            return StoreError::Conflict;
        }
    }
    StoreError::Unavailable(err.to_string())
}

/// SQLite store for committed sends.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at `~/.config/sendpace/sendpace.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> crate::error::Result<Self> {
        let path = data_dir()?.join("sendpace.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection mutex poisoned".to_string()))
    }

    fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS scheduled_sends (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                mailbox      TEXT NOT NULL,
                recipient    TEXT NOT NULL,
                subject      TEXT NOT NULL DEFAULT '',
                body_text    TEXT NOT NULL DEFAULT '',
                sender_name  TEXT NOT NULL DEFAULT '',
                scheduled_at TEXT NOT NULL
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_scheduled_sends_scheduled_at
                ON scheduled_sends(scheduled_at);
            CREATE INDEX IF NOT EXISTS idx_scheduled_sends_mailbox_scheduled_at
                ON scheduled_sends(mailbox, scheduled_at);",
        )?;
        Ok(())
    }

    fn query_range(
        conn: &Connection,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduledSend>, rusqlite::Error> {
        let mut stmt = conn.prepare(
            "SELECT id, mailbox, recipient, subject, body_text, sender_name, scheduled_at
             FROM scheduled_sends
             WHERE scheduled_at >= ?1 AND scheduled_at <= ?2
             ORDER BY scheduled_at ASC",
        )?;
        let sends = stmt.query_map(
            params![start.to_rfc3339(), end.to_rfc3339()],
            row_to_scheduled_send,
        )?;
        sends.collect()
    }
}

impl ScheduleStore for SqliteStore {
    fn query_day(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ScheduledSend>, StoreError> {
        let conn = self.lock_conn()?;
        Ok(Self::query_range(&conn, start, end)?)
    }

    fn insert(
        &self,
        send: &NewScheduledSend,
        expected_day_count: usize,
    ) -> Result<i64, StoreError> {
        let (day_start, day_end) = day_bounds(send.scheduled_at);
        let conn = self.lock_conn()?;

        conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")
            .map_err(write_error)?;
        let result: Result<i64, StoreError> = (|| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM scheduled_sends
                     WHERE scheduled_at >= ?1 AND scheduled_at <= ?2",
                    params![day_start.to_rfc3339(), day_end.to_rfc3339()],
                    |row| row.get(0),
                )
                .map_err(write_error)?;
            if count as usize != expected_day_count {
                return Err(StoreError::Conflict);
            }
            conn.execute(
                "INSERT INTO scheduled_sends
                    (mailbox, recipient, subject, body_text, sender_name, scheduled_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    send.mailbox,
                    send.recipient,
                    send.subject,
                    send.body_text,
                    send.sender_name,
                    send.scheduled_at.to_rfc3339(),
                ],
            )
            .map_err(write_error)?;
            Ok(conn.last_insert_rowid())
        })();

        match result {
            Ok(id) => match conn.execute_batch("COMMIT;") {
                Ok(()) => Ok(id),
                Err(err) => {
                    // A failed commit must not leave the transaction
                    // open on the shared connection.
                    let _ = conn.execute_batch("ROLLBACK;");
                    Err(write_error(err))
                }
            },
            Err(err) => {
                let _ = conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    fn query_due(
        &self,
        now: DateTime<Utc>,
        window_minutes: i64,
    ) -> Result<Vec<ScheduledSend>, StoreError> {
        let (start, end) = due_range(now, window_minutes)?;
        let conn = self.lock_conn()?;
        Ok(Self::query_range(&conn, start, end)?)
    }
}
