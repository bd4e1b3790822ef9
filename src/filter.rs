//! Inclusion predicate.
//!
//! Inclusion is an existential check over a record's derived points: any
//! timestamp overlapping the window (time mode) or any coordinate inside
//! the region (region mode) keeps the record. A record with zero derived
//! points of the relevant kind is never kept, regardless of how open the
//! bounds are.

use crate::config::TimeWindow;
use crate::extract::geo::GeoPoint;
use crate::region::Region;
use chrono::{DateTime, Utc};

/// Time-mode decision over a record's extracted instants.
///
/// Keep iff (no end bound OR min ≤ end) AND (no start bound OR max ≥ start);
/// bounds are inclusive.
pub fn window_keeps(window: &TimeWindow, times: &[DateTime<Utc>]) -> bool {
    let (Some(min), Some(max)) = (times.iter().min(), times.iter().max()) else {
        return false;
    };
    if let Some(start) = window.start {
        if *max < start {
            return false;
        }
    }
    if let Some(end) = window.end {
        if *min > end {
            return false;
        }
    }
    true
}

/// Region-mode decision: any contained point keeps the record.
pub fn region_keeps(region: &Region, points: &[GeoPoint]) -> bool {
    points.iter().any(|p| region.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn no_times_never_kept() {
        assert!(!window_keeps(&TimeWindow::default(), &[]));
    }

    #[test]
    fn unbounded_window_keeps_any_timed_record() {
        assert!(window_keeps(
            &TimeWindow::default(),
            &[at(1999, 1, 1)]
        ));
    }

    #[test]
    fn bounds_are_inclusive() {
        let w = TimeWindow::between(at(2021, 3, 1), at(2021, 9, 1));
        assert!(window_keeps(&w, &[at(2021, 3, 1)]));
        assert!(window_keeps(&w, &[at(2021, 9, 1)]));
        assert!(!window_keeps(&w, &[at(2021, 2, 28)]));
        assert!(!window_keeps(&w, &[at(2021, 9, 2)]));
    }

    #[test]
    fn any_overlapping_time_suffices() {
        let w = TimeWindow {
            start: Some(at(2021, 6, 1)),
            end: None,
        };
        // one timestamp before the window, one after its start
        assert!(window_keeps(&w, &[at(2021, 1, 1), at(2021, 7, 1)]));
    }

    #[test]
    fn record_straddling_window_kept() {
        // startTime before the window, endTime after it: min > end is false,
        // max < start is false, so the record overlaps.
        let w = TimeWindow::between(at(2021, 5, 1), at(2021, 5, 31));
        assert!(window_keeps(&w, &[at(2021, 4, 1), at(2021, 6, 15)]));
    }

    #[test]
    fn no_points_never_kept() {
        let region = Region::new(
            "Unit Square",
            "US",
            geo_types::MultiPolygon(vec![geo_types::Polygon::new(
                geo_types::LineString::from(vec![
                    (0.0, 0.0),
                    (1.0, 0.0),
                    (1.0, 1.0),
                    (0.0, 1.0),
                    (0.0, 0.0),
                ]),
                vec![],
            )]),
        );
        assert!(!region_keeps(&region, &[]));
        assert!(region_keeps(
            &region,
            &[
                GeoPoint { lat: 9.0, lon: 9.0 },
                GeoPoint { lat: 0.5, lon: 0.5 }
            ]
        ));
    }
}
