//! Uber H3 hexagons, via `h3o`.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use geo::Polygon;
use h3o::{CellIndex, LatLng, Resolution};
use tracing::debug;

use dggs_common::{AreaMetric, BoundingBox, Cell, DggsError, DggsFamily, DggsResult};

use crate::geometry::{intersects_wrapped, polygon_from_lonlat, unwrap_antimeridian};
use crate::provider::GridProvider;
use crate::sink::CellSink;

fn h3_resolution(resolution: u8) -> DggsResult<Resolution> {
    Resolution::try_from(resolution)
        .map_err(|_| DggsError::invalid_resolution(DggsFamily::H3, resolution))
}

/// Cell outline in lon/lat, unwrapped across the antimeridian.
fn cell_polygon(cell: CellIndex) -> Polygon<f64> {
    let mut vertices: Vec<(f64, f64)> = cell
        .boundary()
        .iter()
        .map(|ll| (ll.lng(), ll.lat()))
        .collect();
    unwrap_antimeridian(&mut vertices);
    polygon_from_lonlat(&vertices)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct H3Provider;

impl GridProvider for H3Provider {
    fn family(&self) -> DggsFamily {
        DggsFamily::H3
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        Resolution::range(Resolution::Zero, Resolution::Fifteen)
            .map(u8::from)
            .collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        CellIndex::from_str(id)
            .map(|cell| u8::from(cell.resolution()))
            .map_err(|e| DggsError::decode(DggsFamily::H3, id, e.to_string()))
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        let res = h3_resolution(resolution)?;
        Ok(AreaMetric {
            num_cells: res.cell_count(),
            avg_edge_length_m: res.edge_length_m(),
            avg_area_m2: res.area_m2(),
        })
    }

    /// Flood-fills outwards from the cell under the extent's center, keeping
    /// every cell whose outline intersects the extent. The cells meeting a
    /// connected extent form a connected patch, so the fill reaches all of
    /// them. The start cell's neighbours are always visited: its straight
    /// lon/lat outline can miss a small extent near its edge.
    fn generate(
        &self,
        resolution: u8,
        extent: &BoundingBox,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<()> {
        let res = h3_resolution(resolution)?;

        let extent = extent.clamp_to_valid();
        let extent_polygon = extent.to_polygon();
        let (lon, lat) = extent.center();
        let start = LatLng::new(lat, lon)
            .map_err(|e| DggsError::InvalidExtent(e.to_string()))?
            .to_cell(res);

        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(cell) = queue.pop_front() {
            let polygon = cell_polygon(cell);
            if intersects_wrapped(&polygon, &extent_polygon) {
                if !sink.push(Cell::new(cell.to_string(), resolution, polygon))? {
                    break;
                }
            } else if cell != start {
                continue;
            }
            for neighbor in cell.grid_disk::<Vec<_>>(1) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        debug!(
            resolution,
            cells = sink.len(),
            visited = visited.len(),
            "Generated H3 cells"
        );
        Ok(())
    }
}
