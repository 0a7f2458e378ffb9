use anyhow::{anyhow, Result};
use geo::{BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon, Rect};
use rstar::{RTree, primitives::{GeomWithData, Rectangle}};
use serde_json::{json, Map, Value};

use crate::types::Fips;

use super::error::{DataKind, LoadError};

/// One county outline from the geometry file.
#[derive(Debug, Clone)]
pub struct CountyFeature {
    pub fips: Option<Fips>, // None when the feature carries no usable identifier
    pub name: String,
    pub shape: MultiPolygon<f64>, // lon/lat
}

type Envelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Feature collection of county outlines, with a bounding-box index for hit testing.
#[derive(Debug, Clone, Default)]
pub struct CountyCollection {
    features: Vec<CountyFeature>,
    rtree: RTree<Envelope>,
}

impl CountyCollection {
    pub fn new(features: Vec<CountyFeature>) -> Self {
        let envelopes = features.iter().enumerate()
            .filter_map(|(i, f)| {
                f.shape.bounding_rect().map(|r| {
                    GeomWithData::new(Rectangle::from_corners([r.min().x, r.min().y], [r.max().x, r.max().y]), i)
                })
            })
            .collect();
        Self { features, rtree: RTree::bulk_load(envelopes) }
    }

    /// Parse a GeoJSON FeatureCollection. Features whose geometry is neither a
    /// Polygon nor a MultiPolygon are skipped.
    pub fn from_geojson_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|source| LoadError::Parse { kind: DataKind::Geometry, source })?;
        Self::from_geojson(&value).map_err(|e| LoadError::Format {
            kind: DataKind::Geometry,
            message: e.to_string(),
        })
    }

    pub fn from_geojson(value: &Value) -> Result<Self> {
        let features = value["features"].as_array()
            .ok_or_else(|| anyhow!("expected a FeatureCollection with a \"features\" array"))?;

        let mut out = Vec::with_capacity(features.len());
        for (i, feature) in features.iter().enumerate() {
            let Some(shape) = parse_geometry(&feature["geometry"])
                .map_err(|e| anyhow!("feature {i}: {e}"))? else {
                tracing::warn!(target: "countymap::load", index = i, "skipping feature without polygon geometry");
                continue;
            };

            let properties = &feature["properties"];
            let name = properties["NAME"].as_str()
                .or_else(|| properties["name"].as_str())
                .unwrap_or_default()
                .to_string();

            out.push(CountyFeature { fips: feature_fips(feature), name, shape });
        }

        Ok(Self::new(out))
    }

    /// Export as a GeoJSON FeatureCollection. Each feature's id is its FIPS code
    /// so that per-feature state can be addressed by FIPS.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self.features.iter().map(|f| {
            let mut properties = Map::new();
            if let Some(fips) = &f.fips {
                properties.insert("FIPS".to_string(), json!(fips.as_str()));
            }
            properties.insert("NAME".to_string(), json!(f.name));

            let mut feature = json!({
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": multipolygon_coords(&f.shape),
                },
                "properties": properties,
            });
            if let Some(fips) = &f.fips {
                feature["id"] = json!(fips.as_str());
            }
            feature
        }).collect();

        json!({ "type": "FeatureCollection", "features": features })
    }

    #[inline]
    pub fn len(&self) -> usize { self.features.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline]
    pub fn features(&self) -> &[CountyFeature] { &self.features }

    pub fn get(&self, fips: &str) -> Option<&CountyFeature> {
        self.features.iter().find(|f| f.fips.as_ref().is_some_and(|id| id.as_str() == fips))
    }

    /// Bounding box of all features, if any have coordinates.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.features.iter()
            .filter_map(|f| f.shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// Feature containing the given lon/lat point, if any.
    pub fn feature_at(&self, lon: f64, lat: f64) -> Option<&CountyFeature> {
        let point = Point::new(lon, lat);
        let mut hits: Vec<usize> = self.rtree.locate_all_at_point(&[lon, lat]).map(|e| e.data).collect();
        hits.sort_unstable();
        hits.into_iter()
            .map(|i| &self.features[i])
            .find(|f| f.shape.contains(&point))
    }
}

/// FIPS from `properties.FIPS`, then `properties.GEOID`, then the feature `id`.
fn feature_fips(feature: &Value) -> Option<Fips> {
    let properties = &feature["properties"];
    [&properties["FIPS"], &properties["GEOID"], &feature["id"]]
        .into_iter()
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(Fips::from(s.as_str())),
            Value::Number(n) => n.as_u64().map(Fips::from_numeric),
            _ => None,
        })
}

fn parse_geometry(geometry: &Value) -> Result<Option<MultiPolygon<f64>>> {
    let coords = &geometry["coordinates"];
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(Some(MultiPolygon(vec![parse_polygon(coords)?]))),
        Some("MultiPolygon") => {
            let polygons = coords.as_array()
                .ok_or_else(|| anyhow!("MultiPolygon coordinates must be an array"))?
                .iter()
                .map(parse_polygon)
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(MultiPolygon(polygons)))
        }
        _ => Ok(None),
    }
}

/// Parse `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &Value) -> Result<Polygon<f64>> {
    let rings = rings.as_array()
        .ok_or_else(|| anyhow!("Polygon coordinates must be an array of rings"))?;
    let (exterior, interiors) = rings.split_first()
        .ok_or_else(|| anyhow!("Polygon is missing its exterior ring"))?;

    Ok(Polygon::new(
        parse_ring(exterior)?,
        interiors.iter().map(parse_ring).collect::<Result<Vec<_>>>()?,
    ))
}

/// Parse a ring of `[lon, lat]` pairs, closing it if necessary.
fn parse_ring(ring: &Value) -> Result<LineString<f64>> {
    let positions = ring.as_array().ok_or_else(|| anyhow!("ring must be an array of positions"))?;

    let mut points = Vec::with_capacity(positions.len() + 1);
    for position in positions {
        let x = position[0].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
        let y = position[1].as_f64().ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }

    Ok(LineString(points))
}

fn multipolygon_coords(shape: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| -> Value {
        Value::Array(ls.coords().map(|c| json!([c.x, c.y])).collect())
    };
    Value::Array(shape.0.iter().map(|polygon| {
        let mut rings = vec![ring(polygon.exterior())];
        rings.extend(polygon.interiors().iter().map(ring));
        Value::Array(rings)
    }).collect())
}
