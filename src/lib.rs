//! # locsift
//!
//! A **streaming filter** for very large location-history JSON exports.
//! locsift extracts a subset of records selected by an inclusive time window
//! or by geographic-region containment, with memory bounded by the largest
//! single record rather than the file size.
//!
//! ## Key Features
//!
//! - **Three input shapes** - NDJSON, a top-level JSON array, or an array
//!   nested under a named key, sniffed once per run
//! - **Incremental reading** - a hand-rolled brace/string-aware scanner
//!   yields one decoded record at a time from multi-gigabyte arrays
//! - **Timestamp normalization** - `Z` suffixes, numeric offsets, fractional
//!   seconds, and offset-less values all normalized to UTC
//! - **Coordinate extraction** - `geo:<lat>,<lon>` strings pulled from the
//!   known visit/activity/path shapes plus a shallow variant scan
//! - **Region containment** - point-in-polygon against a GeoJSON boundary
//!   file (e.g. Census state boundaries)
//! - **Incremental writing** - the filtered subset is emitted as a valid
//!   JSON array without ever holding more than one record
//! - **Filters, never transforms** - kept records are re-emitted with field
//!   order and content preserved
//!
//! ## Quick Start
//!
//! ```no_run
//! use locsift::{run, Selection, SiftConfig, TimeWindow, parse_bound};
//!
//! # fn main() -> anyhow::Result<()> {
//! let window = TimeWindow {
//!     start: parse_bound("2021-03-01"),
//!     end: None,
//! };
//! let config = SiftConfig::export(
//!     "location-history.json",
//!     "subset.json",
//!     Selection::Window(window),
//! );
//! let report = run(&config)?;
//! println!("kept {} of {}", report.stats.kept, report.stats.scanned);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`io`] - input shape detection, the streaming record reader, and the
//!   incremental subset writer
//! - [`extract`] - derivation of UTC instants and coordinate pairs from
//!   records
//! - [`region`] - region resolution and polygon containment
//! - [`filter`] - the inclusion predicate
//! - [`config`] - immutable run configuration
//! - [`run`] - the orchestrator tying the pieces together
//! - [`stats`] - running scan statistics
//! - [`error`] - the [`SiftError`] type

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod io;
pub mod region;
pub mod run;
pub mod stats;

// General re-exports
pub use config::{parse_bound, RunMode, Selection, SiftConfig, TimeWindow, DEFAULT_TIME_FIELDS};
pub use error::SiftError;
pub use extract::{extract_points, extract_times, parse_geo, parse_timestamp, GeoPoint};
pub use filter::{region_keeps, window_keeps};
pub use io::{detect, DetectedInput, InputShape, Record, RecordReader, SubsetWriter};
pub use region::{GeoJsonRegions, Region, RegionSource};
pub use run::{run, run_with_regions, RunReport};
pub use stats::RunStatistics;
