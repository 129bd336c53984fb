//! Quaternary Triangular Mesh.
//!
//! The globe is split into 8 octant facets in lon/lat space (ids `1`-`8`;
//! `1`-`4` north of the equator from 0° eastwards, `5`-`8` south). Each
//! facet is split into 4 children through its edge midpoints, appending a
//! digit `0`-`3`: `0` is the centre triangle, `1`-`3` the corner
//! triangles. Facets touching a pole keep the pole as an edge, so their
//! outline is a lon/lat trapezoid and siblings tile their parent exactly.

use geo::Polygon;
use tracing::debug;

use dggs_common::{AreaMetric, BoundingBox, Cell, DggsError, DggsFamily, DggsResult};

use crate::geometry::polygon_from_lonlat;
use crate::provider::GridProvider;
use crate::sink::CellSink;

const MIN_RESOLUTION: u8 = 1;
const MAX_RESOLUTION: u8 = 24;

type LonLat = (f64, f64);

fn midpoint(a: LonLat, b: LonLat) -> LonLat {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

#[derive(Debug, Clone, Copy)]
enum Facet {
    /// Ordinary lon/lat triangle.
    Triangle([LonLat; 3]),
    /// Facet whose third vertex is a pole, drawn as an edge at `pole_lat`
    /// spanning the base's longitudes.
    Polar { base: [LonLat; 2], pole_lat: f64 },
}

impl Facet {
    /// The 8 resolution-1 facets in id order.
    fn octants() -> [Facet; 8] {
        let octant = |lon: f64, pole_lat: f64| Facet::Polar {
            base: [(lon, 0.0), (lon + 90.0, 0.0)],
            pole_lat,
        };
        [
            octant(0.0, 90.0),
            octant(90.0, 90.0),
            octant(-180.0, 90.0),
            octant(-90.0, 90.0),
            octant(0.0, -90.0),
            octant(90.0, -90.0),
            octant(-180.0, -90.0),
            octant(-90.0, -90.0),
        ]
    }

    /// Children in digit order 0..=3.
    fn children(&self) -> [Facet; 4] {
        match *self {
            Facet::Triangle([v0, v1, v2]) => {
                let m01 = midpoint(v0, v1);
                let m12 = midpoint(v1, v2);
                let m20 = midpoint(v2, v0);
                [
                    Facet::Triangle([m01, m12, m20]),
                    Facet::Triangle([v0, m01, m20]),
                    Facet::Triangle([m01, v1, m12]),
                    Facet::Triangle([m20, m12, v2]),
                ]
            }
            Facet::Polar {
                base: [a, b],
                pole_lat,
            } => {
                let m01 = midpoint(a, b);
                let m12 = (b.0, (b.1 + pole_lat) / 2.0);
                let m20 = (a.0, (a.1 + pole_lat) / 2.0);
                [
                    Facet::Triangle([m01, m12, m20]),
                    Facet::Triangle([a, m01, m20]),
                    Facet::Triangle([m01, b, m12]),
                    Facet::Polar {
                        base: [m20, m12],
                        pole_lat,
                    },
                ]
            }
        }
    }

    fn vertices(&self) -> Vec<LonLat> {
        match *self {
            Facet::Triangle([v0, v1, v2]) => vec![v0, v1, v2],
            Facet::Polar {
                base: [a, b],
                pole_lat,
            } => vec![a, b, (b.0, pole_lat), (a.0, pole_lat)],
        }
    }

    fn bbox(&self) -> BoundingBox {
        self.vertices().iter().fold(
            BoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |acc, &(lon, lat)| BoundingBox::new(
                acc.min_lon.min(lon),
                acc.min_lat.min(lat),
                acc.max_lon.max(lon),
                acc.max_lat.max(lat),
            ),
        )
    }

    fn polygon(&self) -> Polygon<f64> {
        polygon_from_lonlat(&self.vertices())
    }
}

/// Resolve a QTM id to its facet.
fn facet_for_id(id: &str) -> Result<Facet, String> {
    let mut chars = id.chars();
    let octant = chars
        .next()
        .and_then(|c| c.to_digit(10))
        .filter(|d| (1..=8).contains(d))
        .ok_or_else(|| "first digit must be an octant 1-8".to_string())?;

    let mut facet = Facet::octants()[octant as usize - 1];
    for ch in chars {
        let digit = ch
            .to_digit(10)
            .filter(|d| *d <= 3)
            .ok_or_else(|| format!("invalid subdivision digit '{}'", ch))?;
        facet = facet.children()[digit as usize];
    }
    Ok(facet)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QtmProvider;

impl QtmProvider {
    fn descend(
        facet: Facet,
        id: &mut String,
        target: u8,
        extent: &BoundingBox,
        extent_polygon: &Polygon<f64>,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<bool> {
        use geo::Intersects;

        if !facet.bbox().intersects(extent) {
            return Ok(true);
        }

        if id.len() == target as usize {
            let polygon = facet.polygon();
            if polygon.intersects(extent_polygon) {
                return sink.push(Cell::new(id.clone(), target, polygon));
            }
            return Ok(true);
        }

        for (digit, child) in facet.children().into_iter().enumerate() {
            id.push(char::from(b'0' + digit as u8));
            let keep_going = Self::descend(child, id, target, extent, extent_polygon, sink)?;
            id.pop();
            if !keep_going {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl GridProvider for QtmProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Qtm
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (MIN_RESOLUTION..=MAX_RESOLUTION).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        if id.is_empty() || id.len() > MAX_RESOLUTION as usize {
            return Err(DggsError::decode(
                DggsFamily::Qtm,
                id,
                format!("length must be {}..={}", MIN_RESOLUTION, MAX_RESOLUTION),
            ));
        }
        facet_for_id(id).map_err(|reason| DggsError::decode(DggsFamily::Qtm, id, reason))?;
        Ok(id.len() as u8)
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(AreaMetric::from_cell_count(
            8 * 4u64.pow(resolution as u32 - 1),
        ))
    }

    fn generate(
        &self,
        resolution: u8,
        extent: &BoundingBox,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<()> {
        self.check_resolution(resolution)?;

        let extent = extent.clamp_to_valid();
        let extent_polygon = extent.to_polygon();
        let mut id = String::with_capacity(resolution as usize);

        for (index, octant) in Facet::octants().into_iter().enumerate() {
            id.push(char::from(b'1' + index as u8));
            let keep_going =
                Self::descend(octant, &mut id, resolution, &extent, &extent_polygon, sink)?;
            id.pop();
            if !keep_going {
                break;
            }
        }

        debug!(resolution, cells = sink.len(), "Generated QTM facets");
        Ok(())
    }
}
