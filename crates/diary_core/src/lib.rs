//! Core domain logic for the diary.
//! This crate is the single source of truth for entry invariants.

pub mod app;
pub mod config;
pub mod dates;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use app::calendar::{
    CalendarAction, CalendarEvent, CalendarView, CalendarWidget, CellDiagnostic,
};
pub use app::editor::{EditorError, EntryEditor, SaveOutcome};
pub use app::messages::MessageLog;
pub use app::month_grid::{GridCell, MonthGrid};
pub use app::DiaryApp;
pub use config::DiaryConfig;
pub use dates::{
    date_key_to_cell_timestamp, normalize_to_midnight, to_date_key, to_dual_zone_strings,
    DualZoneDates, InvalidTimestamp, INVALID_DATE,
};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LogLevel};
pub use model::entry::{trim_body, DateKey, DateKeyError, Entry, EntryValidationError};
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use repo::worker::{Pending, StoreWorker};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
