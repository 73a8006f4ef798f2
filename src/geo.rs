//! GeoJSON Boundary Loader
//! Reads state outlines for the choropleth map.

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Failed to read GeoJSON: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a FeatureCollection, found '{0}'")]
    NotFeatureCollection(String),
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// A named region made of one outer ring per polygon, as (lon, lat) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

/// All regions of a boundary file.
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    pub regions: Vec<Region>,
}

/// Longitude/latitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Load a boundary file, naming regions by `properties[feature_key]`.
pub fn load_boundaries(path: &Path, feature_key: &str) -> Result<Boundaries, GeoError> {
    let text = std::fs::read_to_string(path)?;
    let boundaries = Boundaries::from_geojson(&text, feature_key)?;
    info!(
        "loaded {} regions from {}",
        boundaries.regions.len(),
        path.display()
    );
    Ok(boundaries)
}

impl Boundaries {
    pub fn from_geojson(text: &str, feature_key: &str) -> Result<Self, GeoError> {
        let collection: FeatureCollection = serde_json::from_str(text)?;
        if collection.kind != "FeatureCollection" {
            return Err(GeoError::NotFeatureCollection(collection.kind));
        }

        let mut regions = Vec::new();
        for (idx, feature) in collection.features.into_iter().enumerate() {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(feature_key))
                .and_then(Value::as_str);
            let Some(name) = name else {
                warn!("feature {} has no '{}' property, skipped", idx, feature_key);
                continue;
            };

            let rings = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => {
                    coordinates.first().map(|r| vec![to_ring(r)]).unwrap_or_default()
                }
                Some(Geometry::MultiPolygon { coordinates }) => coordinates
                    .iter()
                    .filter_map(|polygon| polygon.first())
                    .map(|r| to_ring(r))
                    .collect(),
                Some(Geometry::Unsupported) | None => {
                    warn!("feature '{}' has no polygon geometry, skipped", name);
                    continue;
                }
            };

            regions.push(Region {
                name: name.to_string(),
                rings,
            });
        }

        Ok(Self { regions })
    }

    pub fn names(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self
            .regions
            .iter()
            .flat_map(|r| r.rings.iter())
            .flat_map(|ring| ring.iter());

        let &(lon, lat) = points.next()?;
        let init = Bounds {
            min_lon: lon,
            min_lat: lat,
            max_lon: lon,
            max_lat: lat,
        };
        Some(points.fold(init, |b, &(lon, lat)| Bounds {
            min_lon: b.min_lon.min(lon),
            min_lat: b.min_lat.min(lat),
            max_lon: b.max_lon.max(lon),
            max_lat: b.max_lat.max(lat),
        }))
    }
}

/// Positions may carry altitude; only lon/lat are kept.
fn to_ring(positions: &[Vec<f64>]) -> Vec<(f64, f64)> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}
