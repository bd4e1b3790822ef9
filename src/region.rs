//! Region resolution and containment.
//!
//! A [`Region`] is an immutable named polygon obtained once per run. The
//! concrete provider here, [`GeoJsonRegions`], reads a GeoJSON
//! FeatureCollection (e.g. the Census cartographic boundary file for US
//! states) whose features carry `NAME` and `STUSPS` properties. Downloading
//! and caching that file across runs is entirely the caller's concern; this
//! module only consumes a ready-made geometry.

use crate::error::{Result, SiftError};
use crate::extract::geo::GeoPoint;
use geo::Contains;
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon};
use log::debug;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// An immutable named polygon used for containment filtering.
#[derive(Debug, Clone)]
pub struct Region {
    /// Canonical name, e.g. `"Mississippi"`.
    pub name: String,
    /// Canonical two-letter code, e.g. `"MS"`.
    pub code: String,
    polygon: MultiPolygon<f64>,
}

impl Region {
    /// Build a region from a named multipolygon.
    pub fn new(name: impl Into<String>, code: impl Into<String>, polygon: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            polygon,
        }
    }

    /// True if the point lies inside the region boundary.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        // geo uses (x, y) = (lon, lat)
        self.polygon.contains(&Point::new(point.lon, point.lat))
    }
}

/// Resolves a region query string to a [`Region`].
pub trait RegionSource {
    /// Match case-insensitively by exact name or two-letter code first,
    /// then by substring-of-name as a fallback.
    ///
    /// # Errors
    /// [`SiftError::RegionNotFound`] if nothing matches.
    fn resolve(&self, query: &str) -> Result<Region>;
}

/// Region provider backed by a GeoJSON FeatureCollection file.
#[derive(Debug)]
pub struct GeoJsonRegions {
    entries: Vec<Region>,
}

impl GeoJsonRegions {
    /// Load regions from a GeoJSON file.
    ///
    /// Features must carry `NAME` and `STUSPS` string properties and a
    /// Polygon or MultiPolygon geometry; other features are skipped.
    ///
    /// # Errors
    /// I/O errors opening or reading the file, or [`SiftError::Format`] if
    /// the document is not a usable FeatureCollection.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let doc: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            SiftError::Format(format!("invalid GeoJSON in {}: {e}", path.display()))
        })?;
        Self::from_value(&doc)
    }

    /// Load regions from an already-decoded GeoJSON document.
    ///
    /// # Errors
    /// [`SiftError::Format`] if the document has no usable features.
    pub fn from_value(doc: &Value) -> Result<Self> {
        let features = doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| SiftError::Format("GeoJSON document has no features array".into()))?;

        let mut entries = Vec::new();
        for feature in features {
            let Some(props) = feature.get("properties") else {
                continue;
            };
            let (Some(name), Some(code)) = (
                props.get("NAME").and_then(Value::as_str),
                props.get("STUSPS").and_then(Value::as_str),
            ) else {
                continue;
            };
            let Some(polygon) = feature.get("geometry").and_then(parse_geometry) else {
                debug!("skipping feature {name}: unsupported geometry");
                continue;
            };
            entries.push(Region::new(name, code, polygon));
        }

        if entries.is_empty() {
            return Err(SiftError::Format(
                "GeoJSON document has no features with NAME/STUSPS and polygon geometry".into(),
            ));
        }
        Ok(Self { entries })
    }

    /// Number of loaded regions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no regions were loaded (unreachable via the constructors).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RegionSource for GeoJsonRegions {
    fn resolve(&self, query: &str) -> Result<Region> {
        let q = query.trim().to_lowercase();

        if let Some(hit) = self
            .entries
            .iter()
            .find(|r| r.name.to_lowercase() == q || r.code.to_lowercase() == q)
        {
            return Ok(hit.clone());
        }
        if let Some(hit) = self
            .entries
            .iter()
            .find(|r| r.name.to_lowercase().contains(&q))
        {
            return Ok(hit.clone());
        }
        Err(SiftError::RegionNotFound(query.to_string()))
    }
}

/// Decode a GeoJSON Polygon or MultiPolygon geometry.
fn parse_geometry(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let kind = geometry.get("type")?.as_str()?;
    let coords = geometry.get("coordinates")?;
    match kind {
        "Polygon" => Some(MultiPolygon(vec![parse_polygon(coords)?])),
        "MultiPolygon" => {
            let polys = coords
                .as_array()?
                .iter()
                .map(parse_polygon)
                .collect::<Option<Vec<_>>>()?;
            Some(MultiPolygon(polys))
        }
        _ => None,
    }
}

fn parse_polygon(rings: &Value) -> Option<Polygon<f64>> {
    let rings = rings.as_array()?;
    let mut lines = rings.iter().map(parse_ring);
    let exterior = lines.next()??;
    let interiors = lines.collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn parse_ring(ring: &Value) -> Option<LineString<f64>> {
    let coords = ring
        .as_array()?
        .iter()
        .map(|pos| {
            let pos = pos.as_array()?;
            Some(Coord {
                x: pos.first()?.as_f64()?,
                y: pos.get(1)?.as_f64()?,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    Some(LineString::from(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn box_feature(name: &str, code: &str, lon: (f64, f64), lat: (f64, f64)) -> Value {
        json!({
            "type": "Feature",
            "properties": {"NAME": name, "STUSPS": code},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [lon.0, lat.0], [lon.1, lat.0], [lon.1, lat.1],
                    [lon.0, lat.1], [lon.0, lat.0]
                ]]
            }
        })
    }

    fn states() -> GeoJsonRegions {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                box_feature("Mississippi", "MS", (-91.7, -88.1), (30.2, 35.0)),
                box_feature("Texas", "TX", (-106.6, -93.5), (25.8, 36.5)),
            ]
        });
        GeoJsonRegions::from_value(&doc).unwrap()
    }

    #[test]
    fn resolve_by_exact_name_case_insensitive() {
        let r = states().resolve("mississippi").unwrap();
        assert_eq!(r.code, "MS");
    }

    #[test]
    fn resolve_by_code() {
        let r = states().resolve("tx").unwrap();
        assert_eq!(r.name, "Texas");
    }

    #[test]
    fn resolve_by_name_fragment() {
        let r = states().resolve("missi").unwrap();
        assert_eq!(r.code, "MS");
    }

    #[test]
    fn unknown_query_is_region_not_found() {
        let err = states().resolve("atlantis").unwrap_err();
        assert!(matches!(err, SiftError::RegionNotFound(_)));
    }

    #[test]
    fn containment_uses_lon_lat_axes() {
        let ms = states().resolve("MS").unwrap();
        assert!(ms.contains(&GeoPoint { lat: 32.35, lon: -90.21 }));
        assert!(!ms.contains(&GeoPoint { lat: -90.21, lon: 32.35 }));
    }

    #[test]
    fn multipolygon_geometry_supported() {
        let doc = json!({
            "features": [{
                "properties": {"NAME": "Twin Isles", "STUSPS": "TI"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,1.0],[0.0,0.0]]],
                        [[[5.0,5.0],[6.0,5.0],[6.0,6.0],[5.0,6.0],[5.0,5.0]]]
                    ]
                }
            }]
        });
        let regions = GeoJsonRegions::from_value(&doc).unwrap();
        let r = regions.resolve("TI").unwrap();
        assert!(r.contains(&GeoPoint { lat: 0.5, lon: 0.5 }));
        assert!(r.contains(&GeoPoint { lat: 5.5, lon: 5.5 }));
        assert!(!r.contains(&GeoPoint { lat: 3.0, lon: 3.0 }));
    }

    #[test]
    fn document_without_features_rejected() {
        let err = GeoJsonRegions::from_value(&json!({"type": "nope"})).unwrap_err();
        assert!(matches!(err, SiftError::Format(_)));
    }
}
