//! Timestamp utilities
//!
//! Event timestamps arrive as loosely formatted strings. Everything is reduced to a
//! local wall-clock `NaiveDateTime`, from which calendar date and hour-of-day are read.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Naive (zone-less) layouts accepted in addition to RFC 3339.
/// `%.f` also matches when no fractional part is present.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Date layout used for every dashboard bucket name
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Get current local timestamp
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Get the server's current calendar date in its local time zone
pub fn local_today() -> NaiveDate {
    now().date_naive()
}

/// Parse an event timestamp into local wall-clock time
///
/// Values with an explicit offset are converted to the server's zone; naive values
/// are taken as already local. Returns `None` for blank or unrecognized input.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Render a calendar date as a bucket name (`YYYY-MM-DD`)
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
