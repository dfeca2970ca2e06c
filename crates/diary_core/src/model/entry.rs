//! Entry domain model.
//!
//! # Responsibility
//! - Define the journal record keyed by calendar date.
//! - Own parsing/formatting of the canonical `YYYY-MM-DD` date key.
//!
//! # Invariants
//! - `DateKey` always holds a real calendar date in years 0000..=9999, so
//!   its display form always parses back.
//! - `Entry::validate()` rejects blank bodies; empty saves are deletions.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date key regex"));

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

// Widest year range `%Y` renders as exactly four digits.
const MIN_KEY_YEAR: i32 = 0;
const MAX_KEY_YEAR: i32 = 9999;

/// Canonical calendar-date identifier of an entry.
///
/// Displays and serializes as zero-padded `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wraps `date`, `None` when its year has no four-digit key form.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        (MIN_KEY_YEAR..=MAX_KEY_YEAR)
            .contains(&date.year())
            .then_some(Self(date))
    }

    /// Wraps `date`, pinning years outside 0000..=9999 to the nearest end.
    pub fn saturating_from_date(date: NaiveDate) -> Self {
        let first = NaiveDate::from_ymd_opt(MIN_KEY_YEAR, 1, 1).unwrap_or(NaiveDate::MIN);
        let last = NaiveDate::from_ymd_opt(MAX_KEY_YEAR, 12, 31).unwrap_or(NaiveDate::MAX);
        Self(date.clamp(first, last))
    }

    /// Builds a key from calendar components, `None` when the date is not real.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).and_then(Self::from_date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !DATE_KEY_RE.is_match(value) {
            return Err(DateKeyError::Malformed(value.to_string()));
        }
        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError::NotACalendarDate(value.to_string()))
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateKey> for String {
    fn from(value: DateKey) -> Self {
        value.to_string()
    }
}

/// Date key parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    /// Input is not shaped like `YYYY-MM-DD`.
    Malformed(String),
    /// Input is shaped correctly but names no real date (e.g. `2023-02-30`).
    NotACalendarDate(String),
}

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "date key `{value}` is not YYYY-MM-DD"),
            Self::NotACalendarDate(value) => {
                write!(f, "date key `{value}` is not a calendar date")
            }
        }
    }
}

impl Error for DateKeyError {}

/// Validation failure for entry invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Blank bodies must be deleted instead of stored.
    EmptyBody(DateKey),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBody(date) => write!(f, "entry for {date} has an empty body"),
        }
    }
}

impl Error for EntryValidationError {}

/// Strips surrounding whitespace and byte order marks from entry text.
pub fn trim_body(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// One journal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique calendar-date key.
    pub date: DateKey,
    /// Free text, replaced wholesale on every save.
    pub body: String,
}

impl Entry {
    pub fn new(date: DateKey, body: impl Into<String>) -> Self {
        Self {
            date,
            body: body.into(),
        }
    }

    /// Checks persistence invariants.
    ///
    /// # Errors
    /// - `EmptyBody` when `body` is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if trim_body(&self.body).is_empty() {
            return Err(EntryValidationError::EmptyBody(self.date));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{trim_body, DateKey, DateKeyError, Entry, EntryValidationError};
    use chrono::NaiveDate;

    #[test]
    fn date_key_roundtrips_zero_padded_form() {
        let key: DateKey = "2024-03-01".parse().expect("valid key");
        assert_eq!(key.to_string(), "2024-03-01");
        assert_eq!((key.year(), key.month(), key.day()), (2024, 3, 1));
    }

    #[test]
    fn date_key_rejects_unpadded_and_impossible_dates() {
        assert!(matches!(
            "2024-3-1".parse::<DateKey>(),
            Err(DateKeyError::Malformed(_))
        ));
        assert!(matches!(
            "2023-02-30".parse::<DateKey>(),
            Err(DateKeyError::NotACalendarDate(_))
        ));
    }

    #[test]
    fn date_key_rejects_years_without_four_digit_form() {
        let far = NaiveDate::from_ymd_opt(11476, 8, 15).expect("chrono date");
        assert_eq!(DateKey::from_date(far), None);
        assert_eq!(DateKey::from_ymd(-1, 12, 31), None);

        let pinned = DateKey::saturating_from_date(far);
        assert_eq!(pinned.to_string(), "9999-12-31");
        assert_eq!(pinned.to_string().parse::<DateKey>(), Ok(pinned));

        let earliest = DateKey::from_ymd(0, 1, 1).expect("year zero");
        assert_eq!(earliest.to_string().parse::<DateKey>(), Ok(earliest));
    }

    #[test]
    fn trim_body_strips_byte_order_marks() {
        assert_eq!(trim_body("\u{feff} hi \n\u{feff}"), "hi");
        assert!(trim_body("\u{feff}\u{feff}").is_empty());
    }

    #[test]
    fn validate_rejects_whitespace_body() {
        let key = DateKey::from_ymd(2024, 3, 1).expect("valid date");
        let entry = Entry::new(key, " \n\t ");
        assert_eq!(entry.validate(), Err(EntryValidationError::EmptyBody(key)));
    }
}
