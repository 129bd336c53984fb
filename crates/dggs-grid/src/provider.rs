//! The per-family capability interface.

use dggs_common::{AreaMetric, BoundingBox, DggsError, DggsFamily, DggsResult};

use crate::sink::CellSink;

/// Capabilities every DGGS family provides.
///
/// All operations are pure and synchronous. `generate` pushes cells into a
/// [`CellSink`], which enforces the cell limit and polls cancellation once
/// per generated cell.
pub trait GridProvider: Send + Sync {
    /// Family served by this provider.
    fn family(&self) -> DggsFamily;

    /// Valid resolutions in ascending order.
    ///
    /// Contiguous for most families; an explicit discrete list for OLC.
    fn valid_resolutions(&self) -> Vec<u8>;

    /// Decode a cell identifier to its resolution.
    fn decode(&self, id: &str) -> DggsResult<u8>;

    /// Expected cell statistics at `resolution`.
    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric>;

    /// Generate every cell at `resolution` whose polygon intersects `extent`.
    fn generate(&self, resolution: u8, extent: &BoundingBox, sink: &mut CellSink<'_>)
        -> DggsResult<()>;

    fn is_valid_resolution(&self, resolution: u8) -> bool {
        self.valid_resolutions().contains(&resolution)
    }

    /// Fail with `InvalidResolution` unless `resolution` is in range.
    fn check_resolution(&self, resolution: u8) -> DggsResult<()> {
        if self.is_valid_resolution(resolution) {
            Ok(())
        } else {
            Err(DggsError::invalid_resolution(self.family(), resolution))
        }
    }
}
