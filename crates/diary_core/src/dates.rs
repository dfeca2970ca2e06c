//! Date conversion helpers between UI timestamps and date keys.
//!
//! # Responsibility
//! - Convert widget timestamps (epoch millis, possibly fractional or NaN)
//!   into calendar date keys in the viewer's zone.
//! - Produce the per-cell midnight timestamps calendar widgets render.
//! - Produce UTC / +9h date strings for diagnostics.
//!
//! # Invariants
//! - Non-finite or out-of-range timestamps are rejected before any datetime
//!   value is constructed.
//! - Timestamps whose day falls outside years 0000..=9999 in the target zone
//!   yield no date key.
//! - `to_dual_zone_strings` never panics; bad input yields `INVALID_DATE`.

use crate::model::entry::DateKey;
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Sentinel returned for timestamps that cannot be converted.
pub const INVALID_DATE: &str = "Invalid date";

/// Fixed offset of the alternate reference zone (JST).
pub const ALTERNATE_ZONE_OFFSET_HOURS: i32 = 9;

// Largest magnitude a UI date value may carry (±100,000,000 days).
const MAX_TIMESTAMP_MILLIS: f64 = 8.64e15;

/// Rejected timestamp input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidTimestamp(pub f64);

impl Display for InvalidTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid timestamp: {}", self.0)
    }
}

impl Error for InvalidTimestamp {}

/// UTC and alternate-zone date strings for one timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualZoneDates {
    pub utc: String,
    pub alternate: String,
}

impl DualZoneDates {
    fn invalid() -> Self {
        Self {
            utc: INVALID_DATE.to_string(),
            alternate: INVALID_DATE.to_string(),
        }
    }
}

/// Validates a raw UI timestamp and converts it to a UTC datetime.
///
/// Fractional milliseconds truncate toward zero.
pub fn timestamp_to_utc(timestamp_ms: f64) -> Result<DateTime<Utc>, InvalidTimestamp> {
    if !timestamp_ms.is_finite() || timestamp_ms.abs() > MAX_TIMESTAMP_MILLIS {
        return Err(InvalidTimestamp(timestamp_ms));
    }
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms.trunc() as i64)
        .ok_or(InvalidTimestamp(timestamp_ms))
}

/// Date key of `timestamp_ms` in the viewer's local calendar.
pub fn to_date_key(timestamp_ms: f64) -> Result<DateKey, InvalidTimestamp> {
    to_date_key_in(timestamp_ms, &Local)
}

/// Date key of `timestamp_ms` in the calendar of `tz`.
pub fn to_date_key_in<Tz: TimeZone>(
    timestamp_ms: f64,
    tz: &Tz,
) -> Result<DateKey, InvalidTimestamp> {
    let utc = timestamp_to_utc(timestamp_ms)?;
    DateKey::from_date(utc.with_timezone(tz).date_naive())
        .ok_or(InvalidTimestamp(timestamp_ms))
}

/// Drops the time of day, keeping the zone of `value`.
pub fn normalize_to_midnight<Tz: TimeZone>(value: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = value.timezone();
    midnight_in(value.date_naive(), &tz)
}

/// Epoch millis of local midnight for `key`, the widget's cell convention.
pub fn date_key_to_cell_timestamp(key: DateKey) -> i64 {
    date_key_to_cell_timestamp_in(key, &Local)
}

/// Epoch millis of midnight for `key` in `tz`.
pub fn date_key_to_cell_timestamp_in<Tz: TimeZone>(key: DateKey, tz: &Tz) -> i64 {
    date_to_cell_timestamp_in(key.date(), tz)
}

pub(crate) fn date_to_cell_timestamp_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> i64 {
    midnight_in(date, tz).timestamp_millis()
}

/// Today's date key in `tz`.
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> DateKey {
    DateKey::saturating_from_date(Utc::now().with_timezone(tz).date_naive())
}

/// Formats `timestamp_ms` as UTC and +9h `YYYY-MM-DD` strings.
pub fn to_dual_zone_strings(timestamp_ms: f64) -> DualZoneDates {
    let Ok(utc) = timestamp_to_utc(timestamp_ms) else {
        log::error!("event=dual_zone module=dates status=error error_code=invalid_timestamp");
        return DualZoneDates::invalid();
    };
    let Some(offset) = FixedOffset::east_opt(ALTERNATE_ZONE_OFFSET_HOURS * 3600) else {
        return DualZoneDates::invalid();
    };

    DualZoneDates {
        utc: key_or_invalid(utc.date_naive()),
        alternate: key_or_invalid(utc.with_timezone(&offset).date_naive()),
    }
}

fn key_or_invalid(date: NaiveDate) -> String {
    DateKey::from_date(date).map_or_else(|| INVALID_DATE.to_string(), |key| key.to_string())
}

fn midnight_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let naive = date.and_time(NaiveTime::MIN);
    // Zones that skip midnight on a DST switch fall back to the UTC reading.
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::{
        date_key_to_cell_timestamp_in, normalize_to_midnight, to_date_key_in,
        to_dual_zone_strings, INVALID_DATE,
    };
    use crate::model::entry::DateKey;
    use chrono::{FixedOffset, TimeZone, Timelike, Utc};

    // 2024-03-01T20:30:00Z
    const EVENING_UTC_MS: f64 = 1_709_325_000_000.0;

    #[test]
    fn date_key_follows_viewer_zone() {
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("valid offset");
        assert_eq!(
            to_date_key_in(EVENING_UTC_MS, &Utc).expect("valid").to_string(),
            "2024-03-01"
        );
        assert_eq!(
            to_date_key_in(EVENING_UTC_MS, &tokyo).expect("valid").to_string(),
            "2024-03-02"
        );
    }

    #[test]
    fn date_key_rejects_non_finite_input() {
        assert!(to_date_key_in(f64::NAN, &Utc).is_err());
        assert!(to_date_key_in(f64::INFINITY, &Utc).is_err());
        assert!(to_date_key_in(9.0e15, &Utc).is_err());
    }

    #[test]
    fn date_key_rejects_days_beyond_four_digit_years() {
        // 11476-08-15 and -0001-..: finite, in range for the UI, no key form.
        assert!(to_date_key_in(3.0e14, &Utc).is_err());
        assert!(to_date_key_in(-6.3e13, &Utc).is_err());

        // 9999-12-31T23:59:59.999Z still has a key and it parses back.
        let key = to_date_key_in(253_402_300_799_999.0, &Utc).expect("last keyed day");
        assert_eq!(key.to_string(), "9999-12-31");
        assert_eq!(key.to_string().parse::<DateKey>(), Ok(key));
    }

    #[test]
    fn normalize_to_midnight_zeroes_time_components() {
        let tz = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let value = tz
            .with_ymd_and_hms(2024, 3, 1, 17, 45, 12)
            .single()
            .expect("unambiguous");
        let midnight = normalize_to_midnight(&value);
        assert_eq!(
            (midnight.hour(), midnight.minute(), midnight.second()),
            (0, 0, 0)
        );
        assert_eq!(midnight.date_naive(), value.date_naive());
        assert_eq!(midnight.timestamp_subsec_millis(), 0);
    }

    #[test]
    fn cell_timestamp_is_midnight_in_zone() {
        let key: DateKey = "2024-03-01".parse().expect("valid key");
        assert_eq!(date_key_to_cell_timestamp_in(key, &Utc), 1_709_251_200_000);
        let tokyo = FixedOffset::east_opt(9 * 3600).expect("valid offset");
        assert_eq!(
            date_key_to_cell_timestamp_in(key, &tokyo),
            1_709_251_200_000 - 9 * 3_600_000
        );
    }

    #[test]
    fn dual_zone_strings_cover_both_zones() {
        let dates = to_dual_zone_strings(EVENING_UTC_MS);
        assert_eq!(dates.utc, "2024-03-01");
        assert_eq!(dates.alternate, "2024-03-02");
    }

    #[test]
    fn dual_zone_strings_use_sentinel_for_bad_input() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, -1.0e16, 3.0e14] {
            let dates = to_dual_zone_strings(bad);
            assert_eq!(dates.utc, INVALID_DATE);
            assert_eq!(dates.alternate, INVALID_DATE);
        }
    }
}
