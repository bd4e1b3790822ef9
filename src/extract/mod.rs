//! Derivation of time and coordinate points from records.

pub mod geo;
pub mod time;

pub use geo::{extract_points, parse_geo, GeoPoint};
pub use time::{extract_times, parse_timestamp};
