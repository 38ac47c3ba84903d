//! Reminder record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert-or-replace, point lookup, full listing and bulk clear over the
//!   `reminders` table.
//!
//! # Invariants
//! - `save` replaces every column of an existing row with the same id.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - Calls are blocking; async callers must move them off the runtime.

use crate::db::DbError;
use crate::model::reminder::{ReminderId, ReminderRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    location,
    latitude,
    longitude
FROM reminders";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of the underlying persistence engine.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidData(String),
    /// The shared connection is unusable (a previous holder panicked).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted reminder data: {message}"),
            Self::Unavailable(message) => write!(f, "reminder store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Blocking CRUD contract over persisted reminders.
pub trait ReminderStore: Send + Sync {
    /// Inserts or replaces by `record.id`.
    fn save(&self, record: &ReminderRecord) -> StoreResult<()>;
    /// Returns every stored record; empty when the table is empty.
    fn get_all(&self) -> StoreResult<Vec<ReminderRecord>>;
    fn get_by_id(&self, id: &str) -> StoreResult<Option<ReminderRecord>>;
    /// Returns the number of removed rows.
    fn delete_all(&self) -> StoreResult<usize>;
}

/// SQLite-backed reminder store sharing one serialized connection.
#[derive(Clone)]
pub struct SqliteReminderStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReminderStore {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Returns the shared connection handle.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|err| StoreError::Unavailable(format!("connection mutex poisoned: {err}")))
    }
}

impl ReminderStore for SqliteReminderStore {
    fn save(&self, record: &ReminderRecord) -> StoreResult<()> {
        check_coordinates(&record.id, record.latitude, record.longitude)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO reminders (
                id,
                title,
                description,
                location,
                latitude,
                longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.id.as_str(),
                record.title.as_str(),
                record.description.as_str(),
                record.location_label.as_str(),
                record.latitude,
                record.longitude,
            ],
        )?;
        Ok(())
    }

    fn get_all(&self) -> StoreResult<Vec<ReminderRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(REMINDER_SELECT_SQL)?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_reminder_row(row)?);
        }

        Ok(records)
    }

    fn get_by_id(&self, id: &str) -> StoreResult<Option<ReminderRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        stmt.query_row([id], RawReminderRow::read)
            .optional()?
            .map(RawReminderRow::into_record)
            .transpose()
    }

    fn delete_all(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM reminders;", [])?)
    }
}

/// SQLite stores NaN as NULL and accepts infinities, so both are refused on
/// write and reported on read.
fn check_coordinates(id: &str, latitude: Option<f64>, longitude: Option<f64>) -> StoreResult<()> {
    for (column, value) in [("latitude", latitude), ("longitude", longitude)] {
        if value.is_some_and(|degrees| !degrees.is_finite()) {
            return Err(StoreError::InvalidData(format!(
                "non-finite coordinate in reminders.{column} for `{id}`"
            )));
        }
    }
    Ok(())
}

struct RawReminderRow {
    id: ReminderId,
    title: String,
    description: String,
    location: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl RawReminderRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            location: row.get("location")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
        })
    }

    fn into_record(self) -> StoreResult<ReminderRecord> {
        if self.id.trim().is_empty() {
            return Err(StoreError::InvalidData(
                "empty id in reminders.id".to_string(),
            ));
        }
        check_coordinates(&self.id, self.latitude, self.longitude)?;

        Ok(ReminderRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            location_label: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

fn parse_reminder_row(row: &Row<'_>) -> StoreResult<ReminderRecord> {
    RawReminderRow::read(row)?.into_record()
}
