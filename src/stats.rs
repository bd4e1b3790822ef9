//! Running statistics for a scan.

use chrono::{DateTime, Utc};

/// Counters and running time range, updated once per record.
///
/// The time range covers every scanned record's parseable timestamps,
/// independent of the keep decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Records decoded from the input.
    pub scanned: u64,
    /// Records written (or that would have been written) to the subset.
    pub kept: u64,
    /// Earliest timestamp seen across all scanned records.
    pub earliest: Option<DateTime<Utc>>,
    /// Latest timestamp seen across all scanned records.
    pub latest: Option<DateTime<Utc>>,
}

impl RunStatistics {
    /// Fold a record's extracted instants into the running range.
    pub fn observe_times(&mut self, times: &[DateTime<Utc>]) {
        for &t in times {
            self.earliest = Some(self.earliest.map_or(t, |e| e.min(t)));
            self.latest = Some(self.latest.map_or(t, |l| l.max(t)));
        }
    }

    /// The observed (earliest, latest) pair, if any timestamp parsed.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.earliest?, self.latest?))
    }
}
