//! Instant and day parsing
//!
//! All day arithmetic is done in UTC. A meeting belongs to the UTC calendar
//! date of its instant; a day covers `[00:00, next 00:00)`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};

use crate::errors::{MeetbookError, Result};

/// Naive layouts accepted in addition to RFC 3339; read as UTC.
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a meeting instant.
///
/// Accepts RFC 3339 (offsets are converted to UTC) and the naive forms
/// `YYYY-MM-DDTHH:MM[:SS]` / `YYYY-MM-DD HH:MM[:SS]`, which are taken as UTC.
///
/// ```
/// use meetbook_domain::parse_scheduled_at;
///
/// let a = parse_scheduled_at("2024-03-10T09:00").unwrap();
/// let b = parse_scheduled_at("2024-03-10T10:00:00+01:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_scheduled_at(raw: &str) -> Result<DateTime<Utc>> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(MeetbookError::Validation("scheduled_at cannot be empty".to_string()));
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| MeetbookError::Validation(format!("unparsable scheduled_at: {raw}")))
}

/// Truncate an instant to whole milliseconds, the resolution instants are
/// persisted at.
#[must_use]
pub fn stored_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(3)
}

/// Parse a `YYYY-MM-DD` day key.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| MeetbookError::Validation(format!("expected YYYY-MM-DD, got: {raw}")))
}

/// UTC calendar day of an instant
#[must_use]
pub fn day_of(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Half-open UTC range `[start of day, start of next day)`.
#[must_use]
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}
