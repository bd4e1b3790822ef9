//! Run configuration.
//!
//! A [`SiftConfig`] is built once, up front, and passed by value to
//! [`crate::run::run`]. There is no module-wide shared state; two runs with
//! equal configs over equal inputs produce byte-identical output.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::path::PathBuf;

/// Default candidate timestamp field names in Google Timeline exports.
pub const DEFAULT_TIME_FIELDS: [&str; 2] = ["startTime", "endTime"];

/// What the run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Statistics only: scan every record, report min/max timestamps and
    /// counts. The selection predicate is ignored entirely.
    Scan,
    /// Write the filtered subset to the output path.
    Export,
}

/// How records are selected. A run uses exactly one selection.
#[derive(Debug, Clone)]
pub enum Selection {
    /// Keep records whose timestamps overlap an inclusive window.
    Window(TimeWindow),
    /// Keep records with at least one coordinate inside a named region.
    Region {
        /// Name, two-letter code, or name fragment (e.g. `"Mississippi"`,
        /// `"MS"`).
        query: String,
        /// GeoJSON FeatureCollection with the region boundaries. Fetching
        /// and caching this file is the caller's concern.
        boundaries: PathBuf,
    },
}

/// Inclusive time window; a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Window with both bounds set.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// True if neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// True if `end < start`, which selects nothing and is almost always a
    /// caller mistake.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if e < s)
    }
}

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct SiftConfig {
    /// Input export file (NDJSON, top-level array, or keyed array).
    pub input: PathBuf,
    /// Scan or export.
    pub mode: RunMode,
    /// Output path; required for [`RunMode::Export`].
    pub output: Option<PathBuf>,
    /// Record selection (time window or region).
    pub selection: Selection,
    /// Candidate timestamp field names, looked up in order.
    pub time_fields: Vec<String>,
    /// Attempt to parse every immediate string field as a timestamp instead
    /// of only the named candidates.
    pub scan_all_times: bool,
    /// Field name holding the record array when the input is a single
    /// object, e.g. `"semanticSegments"`.
    pub records_key: Option<String>,
    /// Stop writing (but keep scanning) after this many kept records.
    pub limit: Option<u64>,
}

impl SiftConfig {
    /// Scan-mode config over `input` with an unbounded window and default
    /// time fields.
    pub fn scan(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            mode: RunMode::Scan,
            output: None,
            selection: Selection::Window(TimeWindow::default()),
            time_fields: DEFAULT_TIME_FIELDS.iter().map(|s| s.to_string()).collect(),
            scan_all_times: false,
            records_key: None,
            limit: None,
        }
    }

    /// Export-mode config with the given selection.
    pub fn export(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        selection: Selection,
    ) -> Self {
        Self {
            input: input.into(),
            mode: RunMode::Export,
            output: Some(output.into()),
            selection,
            time_fields: DEFAULT_TIME_FIELDS.iter().map(|s| s.to_string()).collect(),
            scan_all_times: false,
            records_key: None,
            limit: None,
        }
    }
}

/// Parse a window bound: full ISO-8601 date-time (offset optional, assumed
/// UTC when absent) or a bare date, taken as midnight UTC.
///
/// Returns `None` for text that is neither.
pub fn parse_bound(s: &str) -> Option<DateTime<Utc>> {
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
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}
