//! Generated cells and per-resolution area metrics.

use geo::Polygon;
use serde::{Deserialize, Serialize};

/// Total surface area of the WGS84 ellipsoid in square meters.
pub const EARTH_SURFACE_AREA_M2: f64 = 510_065_621_724_000.0;

/// A single cell produced by a family generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Family-specific identifier (token, code, quadkey, ...).
    pub id: String,
    /// Resolution the cell was generated at.
    pub resolution: u8,
    /// Cell outline in WGS84 lon/lat.
    pub polygon: Polygon<f64>,
}

impl Cell {
    pub fn new(id: impl Into<String>, resolution: u8, polygon: Polygon<f64>) -> Self {
        Self {
            id: id.into(),
            resolution,
            polygon,
        }
    }
}

/// Expected cell statistics of a family at one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaMetric {
    /// Number of cells covering the globe.
    pub num_cells: u64,
    /// Average edge length in meters.
    pub avg_edge_length_m: f64,
    /// Average cell area in square meters.
    pub avg_area_m2: f64,
}

impl AreaMetric {
    /// Metric for a family whose `num_cells` cells evenly split the globe.
    pub fn from_cell_count(num_cells: u64) -> Self {
        let avg_area_m2 = EARTH_SURFACE_AREA_M2 / num_cells as f64;
        Self {
            num_cells,
            avg_edge_length_m: avg_area_m2.sqrt(),
            avg_area_m2,
        }
    }
}
