//! Cell geometry helpers and descriptive cell attributes.

use geo::{
    BoundingRect, Centroid, Coord, GeodesicArea, HaversineDistance, Intersects, LineString, Point,
    Polygon, Translate,
};

use dggs_common::{Attributes, BoundingBox, Cell, DggsFamily, Feature};

/// Inward nudge applied to extent edges before regular-grid tiling, so an
/// extent that coincides with cell borders does not pull in neighbours
/// that only touch it.
pub const EDGE_EPSILON: f64 = 1e-9;

/// Build a polygon from (lon, lat) vertices. The ring is closed automatically.
pub fn polygon_from_lonlat(vertices: &[(f64, f64)]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = vertices.iter().map(|&(x, y)| Coord { x, y }).collect();
    Polygon::new(LineString::from(coords), vec![])
}

/// Shift negative longitudes by 360 when a ring spans more than 180 degrees,
/// giving antimeridian-crossing cells a continuous outline.
pub fn unwrap_antimeridian(vertices: &mut [(f64, f64)]) {
    let (min_lon, max_lon) = vertices
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(lon, _)| (lo.min(lon), hi.max(lon)));
    if max_lon - min_lon > 180.0 {
        for vertex in vertices.iter_mut() {
            if vertex.0 < 0.0 {
                vertex.0 += 360.0;
            }
        }
    }
}

/// Longitude offsets under which two lon/lat shapes can meet once one of
/// them has been unwrapped across the antimeridian.
pub const WRAP_SHIFTS: [f64; 3] = [0.0, 360.0, -360.0];

/// Intersection test that also considers the extent shifted by ±360°, for
/// cells whose outline was unwrapped across the antimeridian.
pub fn intersects_wrapped(polygon: &Polygon<f64>, extent: &Polygon<f64>) -> bool {
    WRAP_SHIFTS
        .iter()
        .any(|&shift| polygon.intersects(&extent.translate(shift, 0.0)))
}

/// Shrink an extent by [`EDGE_EPSILON`] on every side that is wide enough.
pub fn shrink_for_tiling(extent: &BoundingBox) -> BoundingBox {
    let mut shrunk = *extent;
    if extent.width() > 2.0 * EDGE_EPSILON {
        shrunk.min_lon += EDGE_EPSILON;
        shrunk.max_lon -= EDGE_EPSILON;
    }
    if extent.height() > 2.0 * EDGE_EPSILON {
        shrunk.min_lat += EDGE_EPSILON;
        shrunk.max_lat -= EDGE_EPSILON;
    }
    shrunk
}

/// Turn a generated cell into a Target Cell feature carrying the family's
/// attribute schema.
///
/// Every family gets `<id field>`, `resolution`, `center_lat`, `center_lon`.
/// Graticule families (OLC, geohash, tilecode, quadkey) add `cell_width`,
/// `cell_height` and `cell_area`; the others add `avg_edge_len` and
/// `cell_area`. Areas are geodesic (m²), lengths haversine (m).
pub fn cell_to_feature(family: DggsFamily, cell: &Cell) -> Feature {
    let polygon = &cell.polygon;
    let center = polygon
        .centroid()
        .unwrap_or_else(|| Point::new(f64::NAN, f64::NAN));
    let cell_area = polygon.geodesic_area_unsigned();

    let mut attributes = Attributes::new()
        .with(family.id_field(), cell.id.as_str())
        .with("resolution", cell.resolution as i64)
        .with("center_lat", center.y())
        .with("center_lon", center.x());

    if family.is_graticule() {
        let (width, height) = polygon
            .bounding_rect()
            .map(|rect| {
                let c = rect.center();
                let width = Point::new(rect.min().x, c.y)
                    .haversine_distance(&Point::new(rect.max().x, c.y));
                let height = Point::new(c.x, rect.min().y)
                    .haversine_distance(&Point::new(c.x, rect.max().y));
                (width, height)
            })
            .unwrap_or((0.0, 0.0));
        attributes.insert("cell_width", width);
        attributes.insert("cell_height", height);
    } else {
        attributes.insert("avg_edge_len", average_edge_length(polygon));
    }
    attributes.insert("cell_area", cell_area);

    Feature::from_polygon(cell.polygon.clone(), attributes)
}

/// Mean haversine length of the exterior ring's non-degenerate edges.
fn average_edge_length(polygon: &Polygon<f64>) -> f64 {
    let lengths: Vec<f64> = polygon
        .exterior()
        .lines()
        .map(|line| Point::from(line.start).haversine_distance(&Point::from(line.end)))
        .filter(|length| *length > 0.0)
        .collect();
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.iter().sum::<f64>() / lengths.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use dggs_common::AttributeValue;

    #[test]
    fn test_unwrap_antimeridian() {
        let mut ring = vec![(179.0, 0.0), (-179.0, 0.0), (-179.0, 1.0), (179.0, 1.0)];
        unwrap_antimeridian(&mut ring);
        assert_eq!(ring[1].0, 181.0);
        assert_eq!(ring[0].0, 179.0);

        let mut local = vec![(10.0, 0.0), (11.0, 0.0), (11.0, 1.0)];
        unwrap_antimeridian(&mut local);
        assert_eq!(local[0].0, 10.0);
    }

    #[test]
    fn test_intersects_wrapped() {
        let cell = polygon_from_lonlat(&[(179.0, 0.0), (181.0, 0.0), (181.0, 1.0), (179.0, 1.0)]);
        let extent = BoundingBox::new(-180.0, 0.0, -179.5, 1.0).to_polygon();
        assert!(intersects_wrapped(&cell, &extent));
    }

    #[test]
    fn test_shrink_for_tiling_keeps_degenerate_axes() {
        let shrunk = shrink_for_tiling(&BoundingBox::new(0.0, 5.0, 1.0, 5.0));
        assert!(shrunk.min_lon > 0.0 && shrunk.max_lon < 1.0);
        assert_eq!(shrunk.min_lat, 5.0);
        assert_eq!(shrunk.max_lat, 5.0);
    }

    #[test]
    fn test_cell_to_feature_graticule_schema() {
        let cell = Cell::new("s0", 2, BoundingBox::new(0.0, 0.0, 1.0, 1.0).to_polygon());
        let feature = cell_to_feature(DggsFamily::Geohash, &cell);
        let names: Vec<&str> = feature.attributes.names().collect();
        assert_eq!(
            names,
            vec!["geohash", "resolution", "center_lat", "center_lon", "cell_width", "cell_height", "cell_area"]
        );
        assert_eq!(feature.attribute("resolution"), Some(&AttributeValue::Integer(2)));

        // One degree at the equator is ~111 km.
        let width = feature.attribute("cell_width").and_then(|v| v.as_f64()).unwrap();
        assert!((width - 111_000.0).abs() < 1_000.0);
    }

    #[test]
    fn test_cell_to_feature_geodesic_schema() {
        let cell = Cell::new("1", 1, polygon_from_lonlat(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]));
        let feature = cell_to_feature(DggsFamily::Qtm, &cell);
        let names: Vec<&str> = feature.attributes.names().collect();
        assert_eq!(
            names,
            vec!["qtm", "resolution", "center_lat", "center_lon", "avg_edge_len", "cell_area"]
        );
        let area = feature.attribute("cell_area").and_then(|v| v.as_f64()).unwrap();
        assert!(area > 0.0);
    }
}
