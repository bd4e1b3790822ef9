//! Timestamp extraction and normalization.
//!
//! Exports mix several timestamp encodings: trailing `Z`, numeric offsets
//! like `-04:00`, fractional seconds, and occasionally offset-less values.
//! Everything accepted here is normalized to a `DateTime<Utc>`; values that
//! do not look like an extended date+time are silently ignored rather than
//! surfaced as errors.

use crate::io::reader::Record;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Parse one timestamp string.
///
/// Accepted forms: date, `T`, time, optional fractional seconds, and either
/// a literal `Z` (zero offset) or a numeric offset. A value lacking any
/// offset is assumed to already be UTC — never interpreted as local time.
/// Bare dates are rejected here; they are only permitted for window bounds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    None
}

/// Derive 0..N normalized instants from a record, in extraction order.
///
/// Named mode (`scan_all = false`): look up each candidate field name
/// directly and parse its value if present. Scan-all mode: attempt every
/// immediate string value; nested structures are not recursed into.
pub fn extract_times(record: &Record, fields: &[String], scan_all: bool) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();

    if !scan_all {
        for field in fields {
            if let Some(Value::String(s)) = record.get(field) {
                if let Some(dt) = parse_timestamp(s) {
                    out.push(dt);
                }
            }
        }
        return out;
    }

    for value in record.values() {
        if let Value::String(s) = value {
            if let Some(dt) = parse_timestamp(s) {
                out.push(dt);
            }
        }
    }
    out
}
