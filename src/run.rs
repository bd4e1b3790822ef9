//! Run orchestration.
//!
//! A run is single-threaded, single-pass, and strictly sequential: detect
//! the input shape once, then for each record read → extract → filter →
//! write, then finalize. Ordering and statistics accumulation are
//! deterministic; identical configs over identical inputs produce
//! byte-identical subsets.
//!
//! Input and output files are owned by this module for the duration of the
//! run and released by scope on every exit path. A fatal detector or reader
//! error aborts the run; any partially written output is left as-is and the
//! error return carries no statistics.

use crate::config::{RunMode, Selection, SiftConfig};
use crate::extract::{extract_points, extract_times};
use crate::filter::{region_keeps, window_keeps};
use crate::io::{detect, RecordReader, SubsetWriter};
use crate::region::{GeoJsonRegions, Region, RegionSource};
use crate::stats::RunStatistics;
use anyhow::{bail, Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter};

/// How often to log scan progress, in records.
const PROGRESS_INTERVAL: u64 = 50_000;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stats: RunStatistics,
    /// Canonical (name, code) of the resolved region, for region exports.
    pub region: Option<(String, String)>,
}

/// Execute a run, loading region boundaries from the configured GeoJSON
/// file when the selection needs them.
///
/// # Errors
/// Fatal detector/reader/region errors, config validation failures, and
/// I/O failures. Statistics from a failed run are discarded.
pub fn run(config: &SiftConfig) -> Result<RunReport> {
    let region = match (&config.selection, config.mode) {
        (Selection::Region { query, boundaries }, RunMode::Export) => {
            let regions = GeoJsonRegions::from_file(boundaries).with_context(|| {
                format!("load region boundaries from {}", boundaries.display())
            })?;
            info!("loaded {} region boundaries", regions.len());
            Some(regions.resolve(query)?)
        }
        _ => None,
    };
    execute(config, region)
}

/// Execute a run against a caller-supplied region provider.
pub fn run_with_regions(config: &SiftConfig, regions: &dyn RegionSource) -> Result<RunReport> {
    let region = match (&config.selection, config.mode) {
        (Selection::Region { query, .. }, RunMode::Export) => Some(regions.resolve(query)?),
        _ => None,
    };
    execute(config, region)
}

fn execute(config: &SiftConfig, region: Option<Region>) -> Result<RunReport> {
    validate(config, region.as_ref())?;
    if let Some(region) = &region {
        info!("target region: {} ({})", region.name, region.code);
    }

    let input = File::open(&config.input)
        .with_context(|| format!("open {}", config.input.display()))?;
    let detected = detect(BufReader::new(input), config.records_key.as_deref())?;
    let reader = RecordReader::new(detected);

    let mut stats = RunStatistics::default();

    let mut writer = match (config.mode, &config.output) {
        (RunMode::Export, Some(path)) => {
            let out = File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            Some(SubsetWriter::new(BufWriter::new(out))?)
        }
        _ => None,
    };

    for record in reader {
        let record = record?;
        stats.scanned += 1;
        if stats.scanned % PROGRESS_INTERVAL == 0 {
            info!("processed {} records; kept {}", stats.scanned, stats.kept);
        }

        let keep = match (&config.selection, &region) {
            // Time statistics run over every scanned record, whether or not
            // the record is kept; scan mode ignores the predicate entirely.
            (Selection::Window(window), _) => {
                let times = extract_times(&record, &config.time_fields, config.scan_all_times);
                stats.observe_times(&times);
                config.mode == RunMode::Export && window_keeps(window, &times)
            }
            (Selection::Region { .. }, Some(region)) => {
                region_keeps(region, &extract_points(&record))
            }
            (Selection::Region { .. }, None) => false,
        };

        if keep && config.limit.is_none_or(|limit| stats.kept < limit) {
            if let Some(writer) = writer.as_mut() {
                writer.write_record(&record)?;
            }
            stats.kept += 1;
        }
    }

    if let Some(writer) = writer {
        writer.finish()?;
    }

    info!("done: scanned {} records, kept {}", stats.scanned, stats.kept);
    Ok(RunReport {
        stats,
        region: region.map(|r| (r.name, r.code)),
    })
}

fn validate(config: &SiftConfig, region: Option<&Region>) -> Result<()> {
    if config.mode == RunMode::Export && config.output.is_none() {
        bail!("export mode requires an output path");
    }
    match &config.selection {
        Selection::Window(window) => {
            if window.is_inverted() {
                bail!("window end is earlier than its start");
            }
            if config.mode == RunMode::Export && window.is_unbounded() {
                bail!("export with a time window requires at least one bound");
            }
        }
        Selection::Region { .. } => {
            if config.mode == RunMode::Export && region.is_none() {
                bail!("region export requires a resolved region");
            }
        }
    }
    Ok(())
}
