//! Routes "(family, resolution, extent) → cells" to the family's provider.

use tracing::{info, warn};

use dggs_common::{BoundingBox, DggsError, DggsFamily, Feature, Feedback};
use dggs_grid::{cell_to_feature, CellSink, DggsContext};

use crate::error::Result;

/// Target cells produced for one run, in generator order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetGrid {
    pub family: DggsFamily,
    pub resolution: u8,
    pub cells: Vec<Feature>,
    /// Generation stopped early on cancellation; `cells` is partial.
    pub canceled: bool,
}

impl TargetGrid {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Generate every `family` cell at `resolution` intersecting `extent`.
///
/// No deduplication or clipping happens here; the provider's output is
/// taken as is and converted to Target Cell features. An inverted or
/// non-finite extent is rejected before the provider runs.
pub fn generate_grid(
    context: &DggsContext,
    family: DggsFamily,
    resolution: u8,
    extent: &BoundingBox,
    max_cells: usize,
    feedback: &dyn Feedback,
) -> Result<TargetGrid> {
    let provider = context.provider(family)?;
    if !extent.is_valid() {
        return Err(DggsError::InvalidExtent(format!("{:?}", extent)).into());
    }

    let mut sink = CellSink::new(family, resolution, max_cells, feedback);
    provider.generate(resolution, extent, &mut sink)?;

    let canceled = sink.is_canceled();
    let cells: Vec<Feature> = sink
        .into_cells()
        .iter()
        .map(|cell| cell_to_feature(family, cell))
        .collect();

    if canceled {
        warn!(family = %family, resolution, cells = cells.len(), "Grid generation canceled");
    } else {
        info!(family = %family, resolution, cells = cells.len(), "Generated target grid");
    }

    Ok(TargetGrid {
        family,
        resolution,
        cells,
        canceled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResampleError;
    use dggs_common::NoopFeedback;

    #[test]
    fn test_generate_grid_features() {
        let context = DggsContext::with_default_providers();
        let extent = BoundingBox::new(105.0, 20.0, 105.5, 20.5);
        let grid =
            generate_grid(&context, DggsFamily::Geohash, 4, &extent, 1_000, &NoopFeedback).unwrap();

        assert!(!grid.is_empty());
        assert!(!grid.canceled);
        for cell in &grid.cells {
            let id = cell.attribute("geohash").and_then(|v| v.as_str()).unwrap();
            assert_eq!(id.len(), 4);
            assert!(cell.attribute("cell_area").is_some());
        }
    }

    #[test]
    fn test_unknown_family() {
        let context = DggsContext::new();
        let err = generate_grid(
            &context,
            DggsFamily::Qtm,
            3,
            &BoundingBox::default(),
            1_000,
            &NoopFeedback,
        )
        .unwrap_err();
        assert!(matches!(err, ResampleError::Dggs(DggsError::UnsupportedFamily(_))));
    }

    #[test]
    fn test_invalid_resolution() {
        let context = DggsContext::with_default_providers();
        let err = generate_grid(
            &context,
            DggsFamily::Olc,
            3,
            &BoundingBox::default(),
            1_000,
            &NoopFeedback,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ResampleError::Dggs(DggsError::InvalidResolution { resolution: 3, .. })
        ));
    }

    #[test]
    fn test_inverted_extent_is_rejected() {
        let context = DggsContext::with_default_providers();
        let extent = BoundingBox::new(10.0, 0.0, 0.0, 5.0);
        let err = generate_grid(&context, DggsFamily::Geohash, 2, &extent, 1_000, &NoopFeedback)
            .unwrap_err();
        assert!(matches!(err, ResampleError::Dggs(DggsError::InvalidExtent(_))));
    }
}
