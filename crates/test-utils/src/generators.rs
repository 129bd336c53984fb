//! Source layer generators with predictable geometry and values.
//!
//! Every generator builds axis-aligned squares in lon/lat, so planar
//! overlap areas are easy to reason about in assertions.

use geo::{coord, Polygon, Rect};

use dggs_common::{AttributeValue, Attributes, BoundingBox, Feature, Layer};

/// Axis-aligned square polygon with its lower-left corner at `(lon, lat)`.
pub fn square(lon: f64, lat: f64, size: f64) -> Polygon<f64> {
    Rect::new(coord! { x: lon, y: lat }, coord! { x: lon + size, y: lat + size }).to_polygon()
}

/// A square feature carrying the given attributes.
pub fn square_feature(
    lon: f64,
    lat: f64,
    size: f64,
    attributes: impl IntoIterator<Item = (&'static str, AttributeValue)>,
) -> Feature {
    Feature::from_polygon(square(lon, lat, size), attributes.into_iter().collect())
}

/// A feature covering exactly `bbox`.
pub fn bbox_feature(bbox: &BoundingBox, attributes: Attributes) -> Feature {
    Feature::from_polygon(bbox.to_polygon(), attributes)
}

/// Partition `bbox` into `cols` × `rows` equal rectangles, row-major from
/// the south-west. Each feature gets `id_field` = `"{prefix}{index}"` and
/// `value_field` = `value_of(index)`.
pub fn partition_layer(
    bbox: &BoundingBox,
    cols: usize,
    rows: usize,
    id_field: &str,
    value_field: &str,
    value_of: impl Fn(usize) -> AttributeValue,
) -> Layer {
    let width = bbox.width() / cols as f64;
    let height = bbox.height() / rows as f64;

    let mut features = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            let min_lon = bbox.min_lon + col as f64 * width;
            let min_lat = bbox.min_lat + row as f64 * height;
            let cell = BoundingBox::new(min_lon, min_lat, min_lon + width, min_lat + height);
            let attributes = Attributes::new()
                .with(id_field, format!("cell{}", index))
                .with(value_field, value_of(index));
            features.push(bbox_feature(&cell, attributes));
        }
    }
    Layer::new(features)
}

/// A partition whose values sum to `total`, split evenly.
pub fn uniform_partition(
    bbox: &BoundingBox,
    cols: usize,
    rows: usize,
    id_field: &str,
    value_field: &str,
    total: f64,
) -> Layer {
    let share = total / (cols * rows) as f64;
    partition_layer(bbox, cols, rows, id_field, value_field, |_| {
        AttributeValue::Float(share)
    })
}

/// Sum of a numeric attribute over a layer; non-numeric values count as 0.
pub fn sum_field(layer: &Layer, field: &str) -> f64 {
    layer
        .iter()
        .filter_map(|feature| feature.attribute(field).and_then(AttributeValue::as_f64))
        .sum()
}
