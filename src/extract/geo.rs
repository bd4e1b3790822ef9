//! Coordinate extraction.
//!
//! Coordinates in location-history exports are encoded as `geo:<lat>,<lon>`
//! strings scattered across a handful of known nested shapes, plus whatever
//! variant shapes a given export vintage invents. Extraction checks the
//! named shapes and then shallow-scans all direct string fields for the
//! `geo:` prefix. The two passes are not mutually exclusive, so one physical
//! location can yield duplicate points; duplicates are kept (harmless for
//! containment checks).

use crate::io::reader::Record;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static GEO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^geo:\s*([-+]?\d+(?:\.\d+)?)\s*,\s*([-+]?\d+(?:\.\d+)?)\s*$")
        .expect("geo pattern is valid")
});

/// A (latitude, longitude) pair derived from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Parse a `geo:<lat>,<lon>` string. Signs and decimals are optional, the
/// prefix is case-insensitive, surrounding whitespace is tolerated.
pub fn parse_geo(s: &str) -> Option<GeoPoint> {
    let caps = GEO_RE.captures(s.trim())?;
    let lat: f64 = caps[1].parse().ok()?;
    let lon: f64 = caps[2].parse().ok()?;
    Some(GeoPoint { lat, lon })
}

fn parse_geo_value(v: Option<&Value>) -> Option<GeoPoint> {
    match v {
        Some(Value::String(s)) => parse_geo(s),
        _ => None,
    }
}

/// Derive 0..N coordinate pairs from a record, in extraction order.
///
/// Named shapes, checked first:
/// - `visit.topCandidate.placeLocation`
/// - `activity.start` and `activity.end`
/// - `timelinePath[].point`
///
/// followed by a shallow scan of all direct string fields for `geo:`.
pub fn extract_points(record: &Record) -> Vec<GeoPoint> {
    let mut pts = Vec::new();

    if let Some(Value::Object(visit)) = record.get("visit") {
        if let Some(Value::Object(candidate)) = visit.get("topCandidate") {
            if let Some(p) = parse_geo_value(candidate.get("placeLocation")) {
                pts.push(p);
            }
        }
    }

    if let Some(Value::Object(activity)) = record.get("activity") {
        if let Some(p) = parse_geo_value(activity.get("start")) {
            pts.push(p);
        }
        if let Some(p) = parse_geo_value(activity.get("end")) {
            pts.push(p);
        }
    }

    if let Some(Value::Array(steps)) = record.get("timelinePath") {
        for step in steps {
            if let Value::Object(step) = step {
                if let Some(p) = parse_geo_value(step.get("point")) {
                    pts.push(p);
                }
            }
        }
    }

    // Variant shapes sometimes put a geo: string directly on the record.
    for value in record.values() {
        if let Value::String(s) = value {
            if s.len() >= 4 && s.as_bytes()[..4].eq_ignore_ascii_case(b"geo:") {
                if let Some(p) = parse_geo(s) {
                    pts.push(p);
                }
            }
        }
    }

    pts
}
