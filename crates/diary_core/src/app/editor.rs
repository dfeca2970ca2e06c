//! Entry editor state.
//!
//! # Responsibility
//! - Hold the editable text bound to the selected date.
//! - Load the bound entry on selection and write it back on save.
//!
//! # Invariants
//! - Saving blank text deletes the bound entry instead of storing "".
//! - A failed load leaves selected date, bound date and text untouched.
//! - `save` without a bound date is a caller bug and performs no store call.

use crate::model::entry::{trim_body, DateKey};
use crate::repo::entry_repo::{EntryRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Inserted in place of focus traversal when the tab key is pressed.
pub const TAB_INSERT: &str = "  ";

/// What a successful save did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Deleted,
}

#[derive(Debug)]
pub enum EditorError {
    /// `save` was called before any entry was loaded.
    NoBoundDate,
    Repo(RepoError),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBoundDate => write!(f, "no date is bound to the editor"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NoBoundDate => None,
        }
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Text editor bound to one date at a time.
///
/// Cursor and selection positions count characters, not bytes.
#[derive(Debug, Clone)]
pub struct EntryEditor {
    selected_date: DateKey,
    bound_date: Option<DateKey>,
    text: String,
    selection_start: usize,
    selection_end: usize,
}

impl EntryEditor {
    /// Creates an empty editor whose selected date is `today`, with nothing bound.
    pub fn new(today: DateKey) -> Self {
        Self {
            selected_date: today,
            bound_date: None,
            text: String::new(),
            selection_start: 0,
            selection_end: 0,
        }
    }

    pub fn selected_date(&self) -> DateKey {
        self.selected_date
    }

    /// Date the next `save` writes to.
    pub fn bound_date(&self) -> Option<DateKey> {
        self.bound_date
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text and moves the cursor to its end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        let end = self.text.chars().count();
        self.selection_start = end;
        self.selection_end = end;
    }

    /// `(start, end)` of the selection; equal when it is just a cursor.
    pub fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    /// Sets the selection, clamped to the text and ordered.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.text.chars().count();
        let (start, end) = (start.min(len), end.min(len));
        self.selection_start = start.min(end);
        self.selection_end = start.max(end);
    }

    /// Editor bound to `date` with `text`, for hosts that already hold the
    /// text to write and need no load first.
    pub fn bound_to(date: DateKey, text: impl Into<String>) -> Self {
        let mut editor = Self::new(date);
        editor.bound_date = Some(date);
        editor.set_text(text);
        editor
    }

    /// Loads the entry for `date` and binds the editor to it.
    pub fn select<R: EntryRepository>(&mut self, repo: &R, date: DateKey) -> Result<(), RepoError> {
        let entry = repo.get_entry(date)?;
        self.selected_date = date;
        self.bound_date = Some(date);
        self.set_text(entry.map(|entry| entry.body).unwrap_or_default());
        Ok(())
    }

    /// Writes the trimmed text to the bound date, or deletes it when blank.
    pub fn save<R: EntryRepository>(&self, repo: &R) -> Result<SaveOutcome, EditorError> {
        let date = self.bound_date.ok_or(EditorError::NoBoundDate)?;
        let trimmed = trim_body(&self.text);
        if trimmed.is_empty() {
            repo.delete_entry(date)?;
            Ok(SaveOutcome::Deleted)
        } else {
            repo.upsert_entry(date, trimmed)?;
            Ok(SaveOutcome::Saved)
        }
    }

    /// Replaces the selection with two spaces and parks the cursor after them.
    pub fn insert_tab(&mut self) {
        let start = byte_offset(&self.text, self.selection_start);
        let end = byte_offset(&self.text, self.selection_end);
        self.text.replace_range(start..end, TAB_INSERT);

        let cursor = self.selection_start + TAB_INSERT.chars().count();
        self.selection_start = cursor;
        self.selection_end = cursor;
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

#[cfg(test)]
mod tests {
    use super::{EditorError, EntryEditor, SaveOutcome};
    use crate::db::open_db_in_memory;
    use crate::model::entry::{trim_body, DateKey};
    use crate::repo::entry_repo::{EntryRepository, SqliteEntryRepository};

    fn key(value: &str) -> DateKey {
        value.parse().expect("valid date key")
    }

    #[test]
    fn tab_replaces_selection_and_moves_cursor() {
        let mut editor = EntryEditor::new(key("2024-03-01"));
        editor.set_text("日記abc");
        editor.set_selection(2, 3);
        editor.insert_tab();
        assert_eq!(editor.text(), "日記  bc");
        assert_eq!(editor.selection(), (4, 4));
    }

    #[test]
    fn tab_at_end_appends_two_spaces() {
        let mut editor = EntryEditor::new(key("2024-03-01"));
        editor.set_text("line");
        editor.insert_tab();
        assert_eq!(editor.text(), "line  ");
        assert_eq!(editor.selection(), (6, 6));
    }

    #[test]
    fn save_without_bound_date_is_rejected() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteEntryRepository::new(&conn);
        let mut editor = EntryEditor::new(key("2024-03-01"));
        editor.set_text("orphan");

        let err = editor.save(&repo).expect_err("unbound save must fail");
        assert!(matches!(err, EditorError::NoBoundDate));
        assert!(repo.list_dates().expect("list").is_empty());
    }

    #[test]
    fn byte_order_mark_only_text_deletes_the_entry() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteEntryRepository::new(&conn);
        let date = key("2024-03-01");
        repo.upsert_entry(date, "old").expect("seed");

        let editor = EntryEditor::bound_to(date, "\u{feff} \n");
        assert_eq!(editor.save(&repo).expect("save"), SaveOutcome::Deleted);
        assert_eq!(repo.get_entry(date).expect("get"), None);
    }

    #[test]
    fn bound_editor_saves_without_loading_first() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteEntryRepository::new(&conn);
        let date = key("2024-03-02");

        let editor = EntryEditor::bound_to(date, "  direct ");
        assert_eq!(editor.bound_date(), Some(date));
        assert_eq!(editor.selected_date(), date);
        assert_eq!(editor.save(&repo).expect("save"), SaveOutcome::Saved);
        assert_eq!(
            repo.get_entry(date).expect("get").map(|entry| entry.body),
            Some("direct".to_string())
        );
    }

    #[test]
    fn select_then_save_roundtrips_trimmed_text() {
        let conn = open_db_in_memory().expect("open db");
        let repo = SqliteEntryRepository::new(&conn);
        let date = key("2024-03-01");
        let mut editor = EntryEditor::new(date);

        editor.select(&repo, date).expect("select");
        assert_eq!(editor.text(), "");
        editor.set_text("  hello diary \n");
        assert_eq!(editor.save(&repo).expect("save"), SaveOutcome::Saved);

        let mut reopened = EntryEditor::new(key("2024-01-01"));
        reopened.select(&repo, date).expect("reselect");
        assert_eq!(reopened.text(), "hello diary");
        assert_eq!(reopened.selected_date(), date);
    }
}
