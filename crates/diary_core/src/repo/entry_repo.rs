//! Entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide point lookup, upsert, delete and key enumeration over `entries`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Entry::validate()` before SQL mutations.
//! - At most one row exists per date; upsert replaces the body wholesale.
//! - Deleting an absent date is a no-op, not an error.

use crate::db::DbError;
use crate::model::entry::{trim_body, DateKey, Entry, EntryValidationError};
use log::warn;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(EntryValidationError),
    Db(DbError),
    InvalidData(String),
    /// The background store thread is gone; no further requests can run.
    WorkerStopped,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
            Self::WorkerStopped => write!(f, "store worker is not running"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::WorkerStopped => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for entry operations.
pub trait EntryRepository {
    /// Looks up one entry; `None` means no entry exists for that date yet.
    fn get_entry(&self, date: DateKey) -> RepoResult<Option<Entry>>;
    /// Inserts or replaces the entry for `date`. `body` must not be blank.
    fn upsert_entry(&self, date: DateKey, body: &str) -> RepoResult<()>;
    /// Removes the entry for `date` if present.
    fn delete_entry(&self, date: DateKey) -> RepoResult<()>;
    /// Lists every date that currently has an entry, ascending.
    fn list_dates(&self) -> RepoResult<Vec<DateKey>>;
}

impl<R: EntryRepository + ?Sized> EntryRepository for &R {
    fn get_entry(&self, date: DateKey) -> RepoResult<Option<Entry>> {
        (**self).get_entry(date)
    }

    fn upsert_entry(&self, date: DateKey, body: &str) -> RepoResult<()> {
        (**self).upsert_entry(date, body)
    }

    fn delete_entry(&self, date: DateKey) -> RepoResult<()> {
        (**self).delete_entry(date)
    }

    fn list_dates(&self) -> RepoResult<Vec<DateKey>> {
        (**self).list_dates()
    }
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Wraps a connection whose schema was ensured by `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn get_entry(&self, date: DateKey) -> RepoResult<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT entry FROM entries WHERE date = ?1;")?;
        let mut rows = stmt.query([date.to_string()])?;
        if let Some(row) = rows.next()? {
            let body: Option<String> = row.get("entry")?;
            // Blank rows can only come from foreign writers; treat them as absent.
            return Ok(body
                .filter(|value| !trim_body(value).is_empty())
                .map(|body| Entry::new(date, body)));
        }

        Ok(None)
    }

    fn upsert_entry(&self, date: DateKey, body: &str) -> RepoResult<()> {
        Entry::new(date, body).validate()?;

        self.conn.execute(
            "INSERT INTO entries (date, entry) VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET entry = excluded.entry;",
            params![date.to_string(), body],
        )?;

        Ok(())
    }

    fn delete_entry(&self, date: DateKey) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM entries WHERE date = ?1;", [date.to_string()])?;
        Ok(())
    }

    fn list_dates(&self) -> RepoResult<Vec<DateKey>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM entries ORDER BY date ASC;")?;
        let mut rows = stmt.query([])?;
        let mut dates = Vec::new();
        while let Some(row) = rows.next()? {
            let raw: String = row.get("date")?;
            match raw.parse::<DateKey>() {
                Ok(key) => dates.push(key),
                Err(err) => {
                    warn!("event=list_dates module=repo status=skip reason=invalid_key error={err}");
                }
            }
        }
        Ok(dates)
    }
}
