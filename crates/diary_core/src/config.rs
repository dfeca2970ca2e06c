//! Process configuration for diary hosts.
//!
//! # Responsibility
//! - Name the database file and logging destination in one place.
//! - Resolve relative paths against the working directory.
//!
//! # Invariants
//! - Defaults need no environment variables or command-line flags.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "diary.db";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Host-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryConfig {
    /// SQLite file holding the `entries` table.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory; relative paths resolve against the cwd.
    pub log_dir: PathBuf,
}

impl Default for DiaryConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: default_log_level().to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl DiaryConfig {
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Absolute form of `log_dir`, as logging requires.
    pub fn resolved_log_dir(&self) -> io::Result<PathBuf> {
        absolutize(&self.log_dir)
    }
}

fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::{DiaryConfig, DEFAULT_DB_FILE};
    use std::path::PathBuf;

    #[test]
    fn defaults_point_at_working_directory_files() {
        let config = DiaryConfig::default();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_FILE));
        let log_dir = config.resolved_log_dir().expect("cwd available");
        assert!(log_dir.is_absolute());
        assert!(log_dir.ends_with("logs"));
    }

    #[test]
    fn builder_overrides_and_serde_shape() {
        let config = DiaryConfig::default()
            .with_db_path("/tmp/journal.db")
            .with_log_level("warn")
            .with_log_dir("/tmp/diary-logs");
        assert_eq!(
            config.resolved_log_dir().expect("absolute"),
            PathBuf::from("/tmp/diary-logs")
        );

        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["db_path"], "/tmp/journal.db");
        assert_eq!(json["log_level"], "warn");
    }
}
