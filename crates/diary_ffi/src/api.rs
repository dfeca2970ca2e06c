//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose entry load/save and highlight queries to a Flutter shell.
//! - Keep error semantics simple: envelopes with `ok` + message strings.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The store is opened once per process by `diary_open` and reused.
//! - Saves run through the same trim/empty-means-delete rule as the core editor.
//! - Status texts are the core's `app::messages` constants.

use diary_core::app::messages;
use diary_core::{
    core_version as core_version_inner, date_key_to_cell_timestamp,
    init_logging as init_logging_inner, to_date_key, to_dual_zone_strings, trim_body, DateKey,
    EntryEditor, EntryRepository, SaveOutcome, StoreWorker,
};
use log::{error, info};
use std::sync::OnceLock;

static STORE: OnceLock<StoreWorker> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.trim()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the diary database for this process.
///
/// # FFI contract
/// - Must succeed before any entry call; a failure is fatal for the shell.
/// - Repeated calls after success are no-ops, whatever `db_path` they pass.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_open(db_path: String) -> String {
    if STORE.get().is_some() {
        return String::new();
    }
    match StoreWorker::open(db_path.trim()) {
        Ok(worker) => {
            // A concurrent opener may have won; its worker is kept.
            let _ = STORE.set(worker);
            String::new()
        }
        Err(err) => {
            error!("event=diary_open module=ffi status=error error={err}");
            format!("diary_open failed: {err}")
        }
    }
}

/// Entry payload returned by `diary_load_entry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLoadResponse {
    /// Whether the lookup succeeded.
    pub ok: bool,
    /// Normalized date key the body belongs to.
    pub date: String,
    /// Entry body, empty when no entry exists.
    pub body: String,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Highlight listing returned by `diary_highlight_timestamps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResponse {
    /// Whether the listing succeeded; on `false` the shell keeps no marks.
    pub ok: bool,
    /// Local-midnight cell timestamps (epoch millis) to mark.
    pub timestamps: Vec<i64>,
    /// Status text for the notification area, empty on success.
    pub message: String,
}

/// UTC and +9h date strings for one widget timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualZoneResponse {
    pub utc: String,
    pub alternate: String,
}

/// Loads the entry for a picker timestamp (epoch millis, local day).
///
/// # FFI contract
/// - Malformed timestamps and store failures return `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_load_entry(timestamp_ms: f64) -> EntryLoadResponse {
    let date = match to_date_key(timestamp_ms) {
        Ok(date) => date,
        Err(err) => return load_failure(String::new(), err.to_string()),
    };
    let store = match store() {
        Ok(store) => store,
        Err(message) => return load_failure(date.to_string(), message),
    };

    let mut editor = EntryEditor::new(date);
    match editor.select(store, date) {
        Ok(()) => EntryLoadResponse {
            ok: true,
            date: date.to_string(),
            body: editor.text().to_string(),
            message: String::new(),
        },
        Err(err) => {
            error!("event=entry_load module=ffi status=error date={date} error={err}");
            load_failure(date.to_string(), messages::ENTRY_LOAD_FAILED.to_string())
        }
    }
}

/// Saves (or deletes, when blank) the entry for a `YYYY-MM-DD` date.
///
/// # FFI contract
/// - `ok=true` means the shell should refresh highlights.
/// - Message texts are ready for the status area.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_save_entry(date: String, text: String) -> EntryActionResponse {
    let deleting = trim_body(&text).is_empty();
    let failure = if deleting {
        messages::ENTRY_DELETE_FAILED
    } else {
        messages::ENTRY_SAVE_FAILED
    };
    let date: DateKey = match date.trim().parse() {
        Ok(date) => date,
        Err(err) => {
            error!("event=entry_save module=ffi status=error error_code=bad_date error={err}");
            return EntryActionResponse::failure(failure);
        }
    };
    let store = match store() {
        Ok(store) => store,
        Err(message) => {
            error!("event=entry_save module=ffi status=error date={date} error={message}");
            return EntryActionResponse::failure(failure);
        }
    };

    match EntryEditor::bound_to(date, text).save(store) {
        Ok(SaveOutcome::Saved) => {
            info!("event=entry_save module=ffi status=ok outcome=saved date={date}");
            EntryActionResponse::success(messages::ENTRY_SAVED)
        }
        Ok(SaveOutcome::Deleted) => {
            info!("event=entry_save module=ffi status=ok outcome=deleted date={date}");
            EntryActionResponse::success(messages::ENTRY_DELETED)
        }
        Err(err) => {
            error!("event=entry_save module=ffi status=error date={date} error={err}");
            EntryActionResponse::failure(failure)
        }
    }
}

/// Cell timestamps (local midnight, epoch millis) that should carry the
/// "has entry" marker.
///
/// # FFI contract
/// - `ok=false` when the store is unavailable or listing fails; the shell
///   shows `message` and leaves every cell unmarked.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_highlight_timestamps() -> HighlightResponse {
    highlights_from(store())
}

fn highlights_from(store: Result<&StoreWorker, String>) -> HighlightResponse {
    match store.and_then(|store| store.list_dates().map_err(|err| err.to_string())) {
        Ok(dates) => HighlightResponse {
            ok: true,
            timestamps: dates.into_iter().map(date_key_to_cell_timestamp).collect(),
            message: String::new(),
        },
        Err(message) => {
            error!("event=highlight_refresh module=ffi status=error error={message}");
            HighlightResponse {
                ok: false,
                timestamps: Vec::new(),
                message: messages::HIGHLIGHTS_FAILED.to_string(),
            }
        }
    }
}

/// Converts a widget timestamp to UTC and +9h date strings.
///
/// # FFI contract
/// - Never throws; invalid input yields `"Invalid date"` for both fields.
#[flutter_rust_bridge::frb(sync)]
pub fn diary_dual_zone_dates(timestamp_ms: f64) -> DualZoneResponse {
    let dates = to_dual_zone_strings(timestamp_ms);
    DualZoneResponse {
        utc: dates.utc,
        alternate: dates.alternate,
    }
}

fn store() -> Result<&'static StoreWorker, String> {
    STORE
        .get()
        .ok_or_else(|| "diary store is not open; call diary_open first".to_string())
}

fn load_failure(date: String, message: String) -> EntryLoadResponse {
    EntryLoadResponse {
        ok: false,
        date,
        body: String::new(),
        message,
    }
}
