//! Record-service date-time string handling.
//!
//! The record service speaks naive `%Y-%m-%d %H:%M:%S` strings with no zone
//! marker; date-only values occur in date fields and are normalized to
//! midnight.

use chrono::{NaiveDate, NaiveDateTime};

/// Wire format for date-time values on the record service.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a record-service timestamp, accepting the date-only short form.
pub fn deserialize_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Format a timestamp back into the record-service wire form.
pub fn serialize_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}
