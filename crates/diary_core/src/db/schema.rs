//! Entry table schema.
//!
//! # Invariants
//! - `entries.date` is the primary key, so one row exists per date.
//! - Running `ensure_schema` on a ready database changes nothing.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::Connection;

pub const ENTRIES_TABLE: &str = "entries";

const CREATE_ENTRIES_SQL: &str = "CREATE TABLE IF NOT EXISTS entries (
    date TEXT PRIMARY KEY,
    entry TEXT
);";

/// Creates the `entries` table when absent and verifies its shape.
///
/// # Errors
/// - Returns `DbError::Sqlite` when the statement cannot run.
/// - Returns `DbError::MissingRequiredColumn` when a pre-existing table lacks
///   `date` or `entry`.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(CREATE_ENTRIES_SQL)?;

    for column in ["date", "entry"] {
        if !table_has_column(conn, ENTRIES_TABLE, column)? {
            return Err(DbError::MissingRequiredColumn {
                table: ENTRIES_TABLE,
                column,
            });
        }
    }

    debug!("event=schema_ready module=db status=ok table={ENTRIES_TABLE}");
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::ensure_schema;
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        ensure_schema(&conn).expect("first run should succeed");
        ensure_schema(&conn).expect("second run should succeed");
    }

    #[test]
    fn ensure_schema_rejects_foreign_entries_table() {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch("CREATE TABLE entries (day TEXT PRIMARY KEY, text TEXT);")
            .expect("create foreign table");

        let err = ensure_schema(&conn).expect_err("foreign shape must be rejected");
        assert!(matches!(
            err,
            DbError::MissingRequiredColumn {
                table: "entries",
                column: "date"
            }
        ));
    }
}
