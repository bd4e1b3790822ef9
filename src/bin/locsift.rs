//! locsift CLI - subset large location-history JSON exports.
//!
//! Usage:
//!   locsift scan <input> [--records-key <key>] [--scan-all-times]
//!   locsift export <input> --out <path> [--from <ts>] [--to <ts>] [...]
//!   locsift export <input> --out <path> --region <query> --boundaries <geojson>

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use locsift::{parse_bound, RunMode, Selection, SiftConfig, TimeWindow};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "locsift")]
#[command(about = "Scan and subset large location-history JSON exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the record count and min/max timestamps without writing output
    Scan {
        /// Input JSON file
        input: PathBuf,

        /// Comma-separated fields to treat as timestamps
        #[arg(long, default_value = "startTime,endTime")]
        time_fields: String,

        /// Also attempt to parse any immediate string field as a timestamp
        #[arg(long)]
        scan_all_times: bool,

        /// Field name holding the record array when the input is one object
        #[arg(long)]
        records_key: Option<String>,
    },

    /// Write the subset of records matching a time window or a region
    Export {
        /// Input JSON file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        out: PathBuf,

        /// Start of the window, inclusive (e.g. 2021-01-01 or 2021-01-01T00:00:00Z)
        #[arg(long = "from")]
        from: Option<String>,

        /// End of the window, inclusive
        #[arg(long = "to")]
        to: Option<String>,

        /// Region name, two-letter code, or name fragment (e.g. "Mississippi" or "MS")
        #[arg(long, conflicts_with_all = ["from", "to"])]
        region: Option<String>,

        /// GeoJSON FeatureCollection with region boundaries (required with --region)
        #[arg(long, requires = "region")]
        boundaries: Option<PathBuf>,

        /// Comma-separated fields to treat as timestamps
        #[arg(long, default_value = "startTime,endTime")]
        time_fields: String,

        /// Also attempt to parse any immediate string field as a timestamp
        #[arg(long)]
        scan_all_times: bool,

        /// Field name holding the record array when the input is one object
        #[arg(long)]
        records_key: Option<String>,

        /// Stop writing after this many kept records (scanning continues)
        #[arg(long)]
        limit: Option<u64>,
    },
}

fn split_fields(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bound_arg(name: &str, value: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    parse_bound(value).with_context(|| format!("--{name} is not a recognized date/time: {value:?}"))
}

fn build_config(cli: Cli) -> Result<SiftConfig> {
    match cli.command {
        Commands::Scan {
            input,
            time_fields,
            scan_all_times,
            records_key,
        } => Ok(SiftConfig {
            time_fields: split_fields(&time_fields),
            scan_all_times,
            records_key,
            ..SiftConfig::scan(input)
        }),
        Commands::Export {
            input,
            out,
            from,
            to,
            region,
            boundaries,
            time_fields,
            scan_all_times,
            records_key,
            limit,
        } => {
            let selection = match region {
                Some(query) => {
                    let Some(boundaries) = boundaries else {
                        bail!("--region requires --boundaries");
                    };
                    Selection::Region { query, boundaries }
                }
                None => {
                    let start = from
                        .as_deref()
                        .map(|s| parse_bound_arg("from", s))
                        .transpose()?;
                    let end = to.as_deref().map(|s| parse_bound_arg("to", s)).transpose()?;
                    if start.is_none() && end.is_none() {
                        bail!("export requires --from, --to, or --region");
                    }
                    let window = TimeWindow { start, end };
                    if window.is_inverted() {
                        bail!("--to is earlier than --from");
                    }
                    Selection::Window(window)
                }
            };
            let mut config = SiftConfig::export(input, out, selection);
            config.time_fields = split_fields(&time_fields);
            config.scan_all_times = scan_all_times;
            config.records_key = records_key;
            config.limit = limit;
            Ok(config)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = build_config(cli)?;
    let mode = config.mode;
    let output = config.output.clone();

    let report = locsift::run(&config)?;

    println!("Records scanned: {}", report.stats.scanned);
    if let Some((earliest, latest)) = report.stats.time_range() {
        println!("Earliest (UTC): {}", earliest.to_rfc3339());
        println!("Latest   (UTC): {}", latest.to_rfc3339());
    }
    match mode {
        RunMode::Scan => {
            if report.stats.time_range().is_none() {
                bail!("no parseable timestamps found");
            }
        }
        RunMode::Export => {
            if let Some((name, code)) = &report.region {
                println!("Region: {name} ({code})");
            }
            println!("Records exported: {}", report.stats.kept);
            if let Some(out) = output {
                println!("Wrote: {}", out.display());
            }
        }
    }
    Ok(())
}
