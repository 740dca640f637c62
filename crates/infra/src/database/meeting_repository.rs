//! Meeting repository implementation using SQLite
//!
//! Attendance changes are optimistic: a consistent snapshot is read, the
//! change is applied in memory, and the result is written in an `IMMEDIATE`
//! transaction only if the row `version` still matches the snapshot. A lost
//! swap re-reads and re-evaluates, up to `max_cas_attempts` rounds.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use meetbook_core::meetings::ports::MeetingRepository as MeetingRepositoryPort;
use meetbook_domain::constants::DEFAULT_MAX_CAS_ATTEMPTS;
use meetbook_domain::{
    AttendanceChange, Meeting, MeetbookError, MeetingId, Result as DomainResult, UserId,
};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tokio::task;
use tracing::{debug, warn};
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::{map_join_error, map_storage_error, StorageError};

type StorageResult<T> = std::result::Result<T, StorageError>;

const MEETING_COLUMNS: &str =
    "id, name, scheduled_at_ms, capacity, available_seats, version, created_at_ms";

/// SQLite-backed implementation of `MeetingRepository`
pub struct SqliteMeetingRepository {
    db: Arc<DbManager>,
    max_cas_attempts: u32,
}

impl SqliteMeetingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db, max_cas_attempts: DEFAULT_MAX_CAS_ATTEMPTS }
    }

    /// Bound the compare-and-swap rounds of one attendance change.
    #[must_use]
    pub fn with_max_cas_attempts(mut self, attempts: u32) -> Self {
        self.max_cas_attempts = attempts.max(1);
        self
    }
}

#[async_trait]
impl MeetingRepositoryPort for SqliteMeetingRepository {
    async fn insert(&self, meeting: Meeting) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut conn = db.get_connection()?;
            insert_meeting(&mut conn, &meeting).map_err(|err| {
                if err.is_unique_violation() {
                    MeetbookError::Validation(format!("meeting {} already exists", meeting.id))
                } else {
                    map_storage_error(err)
                }
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_by_id(&self, id: MeetingId) -> DomainResult<Option<Meeting>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Meeting>> {
            let conn = db.get_connection()?;
            load_meeting(&conn, id).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Meeting>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Meeting>> {
            let conn = db.get_connection()?;
            load_meetings(
                &conn,
                &format!(
                    "SELECT {MEETING_COLUMNS} FROM meetings
                     WHERE scheduled_at_ms >= ?1 AND scheduled_at_ms < ?2
                     ORDER BY scheduled_at_ms, id"
                ),
                params![start.timestamp_millis(), end.timestamp_millis()],
            )
            .map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_all(&self) -> DomainResult<Vec<Meeting>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Vec<Meeting>> {
            let conn = db.get_connection()?;
            load_meetings(
                &conn,
                &format!("SELECT {MEETING_COLUMNS} FROM meetings ORDER BY scheduled_at_ms, id"),
                params![],
            )
            .map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete(&self, id: MeetingId) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            // meeting_attendees rows go with it (ON DELETE CASCADE)
            let removed = conn
                .execute("DELETE FROM meetings WHERE id = ?1", params![id.to_string()])
                .map_err(|err| map_storage_error(err.into()))?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn rename(&self, id: MeetingId, name: String) -> DomainResult<Option<Meeting>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<Option<Meeting>> {
            let mut conn = db.get_connection()?;
            rename_meeting(&mut conn, id, name).map_err(map_storage_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn apply_attendance(
        &self,
        id: MeetingId,
        change: AttendanceChange,
    ) -> DomainResult<Meeting> {
        let db = Arc::clone(&self.db);
        let max_attempts = self.max_cas_attempts;

        task::spawn_blocking(move || -> DomainResult<Meeting> {
            let mut conn = db.get_connection()?;

            for attempt in 1..=max_attempts {
                if let Some(meeting) = try_apply(&mut conn, id, &change)? {
                    return Ok(meeting);
                }
                debug!(meeting_id = %id, attempt, "version conflict, retrying attendance change");
            }

            warn!(meeting_id = %id, attempts = max_attempts, "attendance change kept conflicting");
            Err(map_storage_error(StorageError::Contention {
                meeting_id: id.to_string(),
                attempts: max_attempts,
            }))
        })
        .await
        .map_err(map_join_error)?
    }
}

/// One compare-and-swap round; `Ok(None)` means another writer committed
/// since the snapshot was read.
fn try_apply(
    conn: &mut Connection,
    id: MeetingId,
    change: &AttendanceChange,
) -> DomainResult<Option<Meeting>> {
    let current = read_snapshot(conn, id)
        .map_err(map_storage_error)?
        .ok_or_else(|| MeetbookError::NotFound(format!("meeting {id} not found")))?;

    // Precondition failures return before anything is written
    let next = current.apply(change)?;

    commit_change(conn, &current, &next, change).map_err(map_storage_error)
}

/// Meeting row and attendees as of one read transaction
fn read_snapshot(conn: &mut Connection, id: MeetingId) -> StorageResult<Option<Meeting>> {
    let tx = conn.transaction()?;
    let meeting = load_meeting(&tx, id)?;
    tx.commit()?;
    Ok(meeting)
}

/// Write `next` if the row is still at `current.version`.
fn commit_change(
    conn: &mut Connection,
    current: &Meeting,
    next: &Meeting,
    change: &AttendanceChange,
) -> StorageResult<Option<Meeting>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if !write_seats(&tx, current, next)? {
        return Ok(None);
    }

    match change {
        AttendanceChange::Join(user_id) => tx.execute(
            "INSERT INTO meeting_attendees (meeting_id, user_id, joined_at_ms) VALUES (?1, ?2, ?3)",
            params![next.id.to_string(), user_id.as_str(), Utc::now().timestamp_millis()],
        )?,
        AttendanceChange::Leave(user_id) => tx.execute(
            "DELETE FROM meeting_attendees WHERE meeting_id = ?1 AND user_id = ?2",
            params![next.id.to_string(), user_id.as_str()],
        )?,
    };

    tx.commit()?;
    Ok(Some(next.clone()))
}

/// Conditional update on `version`; `false` if another writer got there first.
fn write_seats(conn: &Connection, current: &Meeting, next: &Meeting) -> StorageResult<bool> {
    let updated = conn.execute(
        "UPDATE meetings SET available_seats = ?1, version = ?2 WHERE id = ?3 AND version = ?4",
        params![
            next.available_seats,
            to_sql_version(next.version)?,
            next.id.to_string(),
            to_sql_version(current.version)?,
        ],
    )?;
    Ok(updated == 1)
}

fn rename_meeting(
    conn: &mut Connection,
    id: MeetingId,
    name: String,
) -> StorageResult<Option<Meeting>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let Some(current) = load_meeting(&tx, id)? else {
        return Ok(None);
    };
    let next = current.renamed(name);

    tx.execute(
        "UPDATE meetings SET name = ?1, version = ?2 WHERE id = ?3",
        params![next.name, to_sql_version(next.version)?, id.to_string()],
    )?;
    tx.commit()?;
    Ok(Some(next))
}

fn insert_meeting(conn: &mut Connection, meeting: &Meeting) -> StorageResult<()> {
    let tx = conn.transaction()?;

    tx.execute(
        &format!("INSERT INTO meetings ({MEETING_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
        params![
            meeting.id.to_string(),
            meeting.name,
            meeting.scheduled_at.timestamp_millis(),
            meeting.capacity,
            meeting.available_seats,
            to_sql_version(meeting.version)?,
            meeting.created_at.timestamp_millis(),
        ],
    )?;

    let joined_at = meeting.created_at.timestamp_millis();
    for user_id in &meeting.attendees {
        tx.execute(
            "INSERT INTO meeting_attendees (meeting_id, user_id, joined_at_ms) VALUES (?1, ?2, ?3)",
            params![meeting.id.to_string(), user_id.as_str(), joined_at],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn load_meeting(conn: &Connection, id: MeetingId) -> StorageResult<Option<Meeting>> {
    let row = conn
        .query_row(
            &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
            params![id.to_string()],
            map_meeting_row,
        )
        .optional()?;

    row.map(|row| row.into_meeting(conn)).transpose()
}

fn load_meetings(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> StorageResult<Vec<Meeting>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_meeting_row)?.collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter().map(|row| row.into_meeting(conn)).collect()
}

fn load_attendees(conn: &Connection, meeting_id: &str) -> StorageResult<BTreeSet<UserId>> {
    let mut stmt =
        conn.prepare_cached("SELECT user_id FROM meeting_attendees WHERE meeting_id = ?1")?;
    let attendees = stmt
        .query_map(params![meeting_id], |row| row.get::<_, String>(0))?
        .map(|user_id| user_id.map(UserId::new))
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(attendees)
}

/// Raw `meetings` row, before attendees are attached
struct MeetingRow {
    id: String,
    name: String,
    scheduled_at_ms: i64,
    capacity: i64,
    available_seats: i64,
    version: i64,
    created_at_ms: i64,
}

fn map_meeting_row(row: &Row<'_>) -> rusqlite::Result<MeetingRow> {
    Ok(MeetingRow {
        id: row.get(0)?,
        name: row.get(1)?,
        scheduled_at_ms: row.get(2)?,
        capacity: row.get(3)?,
        available_seats: row.get(4)?,
        version: row.get(5)?,
        created_at_ms: row.get(6)?,
    })
}

impl MeetingRow {
    fn into_meeting(self, conn: &Connection) -> StorageResult<Meeting> {
        let id = Uuid::parse_str(&self.id)
            .map(MeetingId::from_uuid)
            .map_err(|err| StorageError::corrupt(format!("meetings.id {}: {err}", self.id)))?;

        let attendees = load_attendees(conn, &self.id)?;

        let meeting = Meeting {
            id,
            name: self.name,
            scheduled_at: from_millis(self.scheduled_at_ms, "scheduled_at_ms")?,
            capacity: to_u32(self.capacity, "capacity")?,
            available_seats: to_u32(self.available_seats, "available_seats")?,
            attendees,
            version: u64::try_from(self.version)
                .map_err(|_| StorageError::corrupt(format!("meetings.version {}", self.version)))?,
            created_at: from_millis(self.created_at_ms, "created_at_ms")?,
        };

        meeting
            .check_invariants()
            .map_err(|err| StorageError::corrupt(err.to_string()))?;
        Ok(meeting)
    }
}

fn from_millis(ms: i64, column: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::corrupt(format!("meetings.{column} {ms} out of range")))
}

fn to_u32(value: i64, column: &str) -> StorageResult<u32> {
    u32::try_from(value)
        .map_err(|_| StorageError::corrupt(format!("meetings.{column} {value} out of range")))
}

fn to_sql_version(version: u64) -> StorageResult<i64> {
    i64::try_from(version)
        .map_err(|_| StorageError::corrupt(format!("meetings.version {version} exceeds i64")))
}
