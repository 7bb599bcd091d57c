//! Conversion between wall-clock times supplied by users and absolute instants.
//!
//! Every function takes the timezone explicitly; nothing here consults the
//! process-local timezone.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// The documented input format, e.g. `2025-03-01 09:00`.
pub const LOCAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

const ACCEPTED_FORMATS: &[&str] = &[
    LOCAL_DATETIME_FORMAT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    // Older mobile clients send `01 Mar 2025, 9:00 AM`.
    "%d %b %Y, %I:%M %p",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeResolveError {
    #[error("invalid date time {input:?}: {reason}")]
    InvalidDateTime { input: String, reason: &'static str },

    #[error("invalid timezone {0:?}")]
    InvalidTimezone(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ResolvedTime {
    pub instant: DateTime<Utc>,
    pub timezone: Tz,
}

/// Resolves a local date time string in `timezone` to an absolute instant.
///
/// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
/// Times that fall into a DST gap are rejected.
pub fn resolve(local: &str, timezone: &str) -> Result<ResolvedTime, TimeResolveError> {
    let naive = parse_local(local)?;
    let timezone = parse_timezone(timezone)?;
    let instant = resolve_in(naive, timezone)?;

    Ok(ResolvedTime { instant, timezone })
}

pub fn parse_local(local: &str) -> Result<NaiveDateTime, TimeResolveError> {
    let trimmed = local.trim();

    ACCEPTED_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| TimeResolveError::InvalidDateTime {
            input: local.to_string(),
            reason: "expected YYYY-MM-DD HH:MM",
        })
}

pub fn parse_timezone(timezone: &str) -> Result<Tz, TimeResolveError> {
    timezone
        .trim()
        .parse::<Tz>()
        .map_err(|_| TimeResolveError::InvalidTimezone(timezone.to_string()))
}

pub fn resolve_in(naive: NaiveDateTime, timezone: Tz) -> Result<DateTime<Utc>, TimeResolveError> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(local) => Ok(local.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimeResolveError::InvalidDateTime {
            input: naive.format(LOCAL_DATETIME_FORMAT).to_string(),
            reason: "the local time does not exist in this timezone",
        }),
    }
}

pub fn to_local(instant: DateTime<Utc>, timezone: Tz) -> NaiveDateTime {
    instant.with_timezone(&timezone).naive_local()
}

pub fn format_local(instant: DateTime<Utc>, timezone: Tz) -> String {
    to_local(instant, timezone)
        .format(LOCAL_DATETIME_FORMAT)
        .to_string()
}
