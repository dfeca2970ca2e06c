//! Status message log shown under the editor.

pub const ENTRY_SAVED: &str = "Entry saved successfully.";
pub const ENTRY_SAVE_FAILED: &str = "Failed to save entry.";
pub const ENTRY_DELETED: &str = "Entry deleted successfully.";
pub const ENTRY_DELETE_FAILED: &str = "Failed to delete entry.";
pub const ENTRY_LOAD_FAILED: &str = "Failed to load entry.";
pub const HIGHLIGHTS_FAILED: &str = "Failed to load calendar highlights.";

/// Append-only, in-memory list of single-line status messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    lines: Vec<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one message, folding line breaks into spaces.
    pub fn append(&mut self, message: impl AsRef<str>) {
        self.lines.push(message.as_ref().replace(['\n', '\r'], " "));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn messages(&self) -> &[String] {
        &self.lines
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}
