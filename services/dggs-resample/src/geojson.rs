//! GeoJSON FeatureCollection reading and writing.
//!
//! Only Polygon and MultiPolygon geometries are accepted. Properties map
//! onto attribute values: integers stay integers, other numbers become
//! floats, and strings, booleans and nulls keep their kind. Property order
//! is kept from input to output.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use dggs_common::{AttributeValue, Attributes, Feature, Layer};

#[derive(Error, Debug)]
pub enum GeoJsonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feature {index} has no geometry")]
    MissingGeometry { index: usize },

    #[error("Feature {index} has a position with fewer than two coordinates")]
    BadPosition { index: usize },
}

type Position = Vec<f64>;
type Ring = Vec<Position>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
struct GeoJsonFeature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
struct FeatureCollection {
    features: Vec<GeoJsonFeature>,
}

/// Parse a FeatureCollection into a layer.
pub fn parse_layer(json: &str) -> Result<Layer, GeoJsonError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    collection_to_layer(collection)
}

pub fn read_layer(path: impl AsRef<Path>) -> Result<Layer, GeoJsonError> {
    let reader = BufReader::new(File::open(path)?);
    let collection: FeatureCollection = serde_json::from_reader(reader)?;
    collection_to_layer(collection)
}

/// Serialize a layer as a FeatureCollection.
pub fn layer_to_string(layer: &Layer) -> Result<String, GeoJsonError> {
    Ok(serde_json::to_string(&layer_to_collection(layer))?)
}

pub fn write_layer(path: impl AsRef<Path>, layer: &Layer) -> Result<(), GeoJsonError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &layer_to_collection(layer))?;
    writer.flush()?;
    Ok(())
}

fn collection_to_layer(collection: FeatureCollection) -> Result<Layer, GeoJsonError> {
    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let geometry = feature
                .geometry
                .ok_or(GeoJsonError::MissingGeometry { index })?;
            let attributes: Attributes = feature
                .properties
                .unwrap_or_default()
                .iter()
                .map(|(name, value)| (name.as_str(), AttributeValue::from(value)))
                .collect();
            Ok(Feature::new(to_multi_polygon(geometry, index)?, attributes))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Layer::new)
}

fn to_multi_polygon(geometry: Geometry, index: usize) -> Result<MultiPolygon<f64>, GeoJsonError> {
    let polygons = match geometry {
        Geometry::Polygon { coordinates } => vec![coordinates],
        Geometry::MultiPolygon { coordinates } => coordinates,
    };
    polygons
        .into_iter()
        .map(|rings| to_polygon(rings, index))
        .collect::<Result<Vec<_>, _>>()
        .map(MultiPolygon)
}

fn to_polygon(rings: Vec<Ring>, index: usize) -> Result<Polygon<f64>, GeoJsonError> {
    let mut rings = rings
        .into_iter()
        .map(|ring| to_line_string(ring, index))
        .collect::<Result<Vec<_>, _>>()?;
    if rings.is_empty() {
        return Ok(Polygon::new(LineString::new(Vec::new()), Vec::new()));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

fn to_line_string(ring: Ring, index: usize) -> Result<LineString<f64>, GeoJsonError> {
    ring.into_iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(GeoJsonError::BadPosition { index }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn layer_to_collection(layer: &Layer) -> FeatureCollection {
    let features = layer
        .iter()
        .map(|feature| GeoJsonFeature {
            geometry: Some(from_multi_polygon(&feature.geometry)),
            properties: Some(
                feature
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.to_string(), Value::from(value)))
                    .collect(),
            ),
        })
        .collect();
    FeatureCollection { features }
}

fn from_multi_polygon(geometry: &MultiPolygon<f64>) -> Geometry {
    let mut polygons: Vec<Vec<Ring>> = geometry.iter().map(from_polygon).collect();
    if polygons.len() == 1 {
        Geometry::Polygon {
            coordinates: polygons.remove(0),
        }
    } else {
        Geometry::MultiPolygon {
            coordinates: polygons,
        }
    }
}

fn from_polygon(polygon: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]]
                },
                "properties": {"quadkey": "0231", "population": 1200, "density": 4.5, "urban": true, "note": null}
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[10, 10, 5], [11, 10, 5], [11, 11, 5], [10, 11, 5], [10, 10, 5]]],
                        [[[20, 20], [24, 20], [24, 24], [20, 24], [20, 20]],
                         [[21, 21], [22, 21], [22, 22], [21, 22], [21, 21]]]
                    ]
                },
                "properties": {"quadkey": "0232"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let layer = parse_layer(SAMPLE).unwrap();
        assert_eq!(layer.len(), 2);

        let first = &layer.features[0];
        assert_eq!(first.attribute("quadkey"), Some(&AttributeValue::from("0231")));
        assert_eq!(first.attribute("population"), Some(&AttributeValue::Integer(1200)));
        assert_eq!(first.attribute("density"), Some(&AttributeValue::Float(4.5)));
        assert_eq!(first.attribute("urban"), Some(&AttributeValue::Bool(true)));
        assert_eq!(first.attribute("note"), Some(&AttributeValue::Null));
        assert!((first.geometry.unsigned_area() - 4.0).abs() < 1e-12);

        let second = &layer.features[1];
        assert_eq!(second.geometry.0.len(), 2);
        // 1 + (16 - 1) once the hole is removed.
        assert!((second.geometry.unsigned_area() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_output_preserves_geometry_and_properties() {
        let layer = parse_layer(SAMPLE).unwrap();
        let json = layer_to_string(&layer).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["type"], "Feature");
        assert_eq!(value["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(value["features"][0]["properties"]["population"], 1200);
        assert_eq!(value["features"][1]["geometry"]["type"], "MultiPolygon");

        let reparsed = parse_layer(&json).unwrap();
        assert_eq!(reparsed.features[0].attributes, layer.features[0].attributes);
        assert!(
            (reparsed.features[1].geometry.unsigned_area()
                - layer.features[1].geometry.unsigned_area())
            .abs()
                < 1e-12
        );
    }

    #[test]
    fn test_property_order_is_kept() {
        let layer = parse_layer(SAMPLE).unwrap();
        let names: Vec<&str> = layer.features[0].attributes.names().collect();
        assert_eq!(names, vec!["quadkey", "population", "density", "urban", "note"]);

        let json = layer_to_string(&layer).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = value["features"][0]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, names);
    }

    #[test]
    fn test_rejects_unsupported_input() {
        let point = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [1, 2]}, "properties": {}}
        ]}"#;
        assert!(matches!(parse_layer(point), Err(GeoJsonError::Json(_))));

        let missing = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": null, "properties": {}}
        ]}"#;
        assert!(matches!(
            parse_layer(missing),
            Err(GeoJsonError::MissingGeometry { index: 0 })
        ));

        let short = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[1]]]}}
        ]}"#;
        assert!(matches!(
            parse_layer(short),
            Err(GeoJsonError::BadPosition { index: 0 })
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.geojson");

        let layer = parse_layer(SAMPLE).unwrap();
        write_layer(&path, &layer).unwrap();
        let read = read_layer(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read.features[1].attribute("quadkey"), Some(&AttributeValue::from("0232")));
    }
}
