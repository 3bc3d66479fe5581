// src/geo/mod.rs
pub mod geojson;

use anyhow::{Context, Result};
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, info, warn};

use crate::analysis::JoinResult;
use geojson::{FeatureCollection, Geometry};

/// Closed ring of `(lon, lat)` points.
pub type Ring = Vec<(f64, f64)>;

/// Outer ring followed by any holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

/// Reference world geometry, one shape per named feature.
#[derive(Debug, Clone, Default)]
pub struct WorldGeometry {
    pub shapes: Vec<CountryShape>,
}

/// A shape paired with the value it will be coloured by.
#[derive(Debug, Clone, Copy)]
pub struct ShapeValue<'a> {
    pub shape: &'a CountryShape,
    pub value: f64,
}

fn to_ring(positions: Vec<Vec<f64>>) -> Option<Ring> {
    let ring: Ring = positions
        .into_iter()
        .filter_map(|p| match p.as_slice() {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Some((*lon, *lat)),
            _ => None,
        })
        .collect();
    (ring.len() >= 3).then_some(ring)
}

fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Option<Polygon> {
    let rings: Vec<Ring> = rings.into_iter().filter_map(to_ring).collect();
    (!rings.is_empty()).then_some(Polygon { rings })
}

impl WorldGeometry {
    /// Load a GeoJSON FeatureCollection, naming shapes by `name_property`.
    #[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_path<P: AsRef<Path>>(path: P, name_property: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open geometry file: {}", path.display()))?;
        Self::from_reader(BufReader::new(file), name_property)
            .with_context(|| format!("Failed to read geometry from {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R, name_property: &str) -> Result<Self> {
        let collection: FeatureCollection =
            serde_json::from_reader(reader).context("parsing GeoJSON FeatureCollection")?;

        let mut shapes = Vec::with_capacity(collection.features.len());
        let mut skipped = 0usize;
        for feature in collection.features {
            let Some(name) = feature.property_str(name_property).map(str::to_string) else {
                skipped += 1;
                debug!(name_property, "feature without a name; skipping");
                continue;
            };
            let polygons: Vec<Polygon> = match feature.geometry {
                Some(Geometry::Polygon { coordinates }) => {
                    to_polygon(coordinates).into_iter().collect()
                }
                Some(Geometry::MultiPolygon { coordinates }) => {
                    coordinates.into_iter().filter_map(to_polygon).collect()
                }
                Some(Geometry::Unsupported) | None => Vec::new(),
            };
            if polygons.is_empty() {
                skipped += 1;
                debug!(%name, "feature without polygon geometry; skipping");
                continue;
            }
            shapes.push(CountryShape { name, polygons });
        }

        info!(shapes = shapes.len(), skipped, "loaded world geometry");
        Ok(Self { shapes })
    }

    /// Exact-name join of `(country, value)` rows onto shapes.
    /// `unmatched_left`: data countries without a shape;
    /// `unmatched_right`: shapes without data.
    pub fn join<'a, I>(&'a self, values: I) -> JoinResult<ShapeValue<'a>, String>
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut by_name: HashMap<String, f64> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for (name, value) in values {
            if by_name.contains_key(&name) {
                warn!(%name, "country appears more than once; keeping the first value");
                continue;
            }
            order.push(name.clone());
            by_name.insert(name, value);
        }

        let mut matched = Vec::new();
        let mut unmatched_right = Vec::new();
        let mut used: HashSet<&str> = HashSet::new();
        for shape in &self.shapes {
            match by_name.get(&shape.name) {
                Some(&value) => {
                    used.insert(shape.name.as_str());
                    matched.push(ShapeValue { shape, value });
                }
                None => unmatched_right.push(shape.name.clone()),
            }
        }

        let unmatched_left = order
            .into_iter()
            .filter(|n| !used.contains(n.as_str()))
            .collect();

        JoinResult {
            matched,
            unmatched_left,
            unmatched_right,
        }
    }
}
