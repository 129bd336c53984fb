//! Web Mercator tile families: `z{z}x{x}y{y}` tile codes and quadkeys.

use tracing::debug;

use dggs_common::{AreaMetric, BoundingBox, Cell, DggsError, DggsFamily, DggsResult};

use crate::mercator::{tiles_in_extent, TileCoord, MAX_ZOOM};
use crate::provider::GridProvider;
use crate::sink::CellSink;

fn tile_metric(resolution: u8) -> AreaMetric {
    AreaMetric::from_cell_count(4u64.pow(resolution as u32))
}

fn generate_tiles(
    resolution: u8,
    extent: &BoundingBox,
    sink: &mut CellSink<'_>,
    id_of: impl Fn(&TileCoord) -> String,
) -> DggsResult<()> {
    for tile in tiles_in_extent(extent, resolution) {
        let cell = Cell::new(id_of(&tile), resolution, tile.bbox().to_polygon());
        if !sink.push(cell)? {
            break;
        }
    }
    debug!(resolution, cells = sink.len(), "Generated tiles");
    Ok(())
}

/// Tile codes (`z5x17y11`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TilecodeProvider;

impl GridProvider for TilecodeProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Tilecode
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (0..=MAX_ZOOM).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        TileCoord::from_tilecode(id)
            .map(|tile| tile.z)
            .map_err(|reason| DggsError::decode(DggsFamily::Tilecode, id, reason))
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(tile_metric(resolution))
    }

    fn generate(
        &self,
        resolution: u8,
        extent: &BoundingBox,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<()> {
        self.check_resolution(resolution)?;
        generate_tiles(resolution, extent, sink, TileCoord::to_tilecode)
    }
}

/// Quadkeys (`0231`).
#[derive(Debug, Default, Clone, Copy)]
pub struct QuadkeyProvider;

impl GridProvider for QuadkeyProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Quadkey
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (0..=MAX_ZOOM).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        TileCoord::from_quadkey(id)
            .map(|tile| tile.z)
            .map_err(|reason| DggsError::decode(DggsFamily::Quadkey, id, reason))
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(tile_metric(resolution))
    }

    fn generate(
        &self,
        resolution: u8,
        extent: &BoundingBox,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<()> {
        self.check_resolution(resolution)?;
        generate_tiles(resolution, extent, sink, TileCoord::to_quadkey)
    }
}
