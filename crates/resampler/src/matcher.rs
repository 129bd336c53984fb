//! Resolution equivalence between DGGS families.
//!
//! Families share no resolution axis; the only common currency is the
//! average cell area. The matcher decodes a source cell id, looks up its
//! family's average area at that resolution and picks the target
//! resolution whose average area is closest.

use tracing::{debug, info};

use dggs_common::{AttributeValue, DggsError, DggsFamily, Feedback, Layer};
use dggs_grid::DggsContext;

use crate::error::{ResampleError, Result};

/// Target resolution whose average cell area is closest to the source
/// cell's.
///
/// Candidates are scanned in ascending order and only a strictly smaller
/// area difference replaces the current best, so ties resolve to the
/// lowest resolution.
pub fn find_nearest_resolution(
    context: &DggsContext,
    source_family: DggsFamily,
    source_id: &str,
    target_family: DggsFamily,
) -> Result<u8> {
    let source_provider = context.provider(source_family)?;
    let target_provider = context.provider(target_family)?;

    let source_resolution = source_provider.decode(source_id)?;
    let source_area = source_provider.area_metric(source_resolution)?.avg_area_m2;
    debug!(
        family = %source_family,
        id = source_id,
        resolution = source_resolution,
        avg_area_m2 = source_area,
        "Decoded source cell"
    );

    let mut best: Option<(u8, f64)> = None;
    for resolution in target_provider.valid_resolutions() {
        let target_area = target_provider.area_metric(resolution)?.avg_area_m2;
        let diff = (target_area - source_area).abs();
        if best.map_or(true, |(_, best_diff)| diff < best_diff) {
            best = Some((resolution, diff));
        }
    }

    let (resolution, diff) = best.ok_or(ResampleError::NoResolutionFound(target_family))?;
    debug!(
        family = %target_family,
        resolution,
        area_diff_m2 = diff,
        "Selected nearest target resolution"
    );
    Ok(resolution)
}

/// Cell identifier of the layer's first feature, read from `id_field`.
///
/// Only the first feature is consulted: the whole layer is assumed to be
/// at one resolution.
pub fn first_cell_id(layer: &Layer, source_family: DggsFamily, id_field: &str) -> Result<String> {
    let first = layer.first().ok_or(ResampleError::EmptyInput)?;
    match first.attribute(id_field) {
        None | Some(AttributeValue::Null) => Err(ResampleError::missing_field(id_field, 0)),
        Some(AttributeValue::Text(id)) => Ok(id.clone()),
        Some(AttributeValue::Integer(id)) => Ok(id.to_string()),
        Some(other) => Err(DggsError::decode(
            source_family,
            other.to_string(),
            format!("a {} value is not a cell identifier", other.type_name()),
        )
        .into()),
    }
}

/// Resolve the target resolution for a whole source layer.
pub fn match_layer_resolution(
    context: &DggsContext,
    layer: &Layer,
    source_family: DggsFamily,
    id_field: &str,
    target_family: DggsFamily,
    feedback: &dyn Feedback,
) -> Result<u8> {
    let source_id = first_cell_id(layer, source_family, id_field)?;
    let resolution = find_nearest_resolution(context, source_family, &source_id, target_family)?;

    info!(
        source_family = %source_family,
        source_id = %source_id,
        target_family = %target_family,
        resolution,
        "Matched target resolution"
    );
    feedback.report_info(&format!(
        "{} cell {} matches {} resolution {}",
        source_family, source_id, target_family, resolution
    ));
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dggs_common::{Attributes, BoundingBox, Feature, NoopFeedback};

    fn layer_with_id(field: &str, id: AttributeValue) -> Layer {
        let attributes = Attributes::new().with(field, id);
        Layer::new(vec![Feature::from_polygon(
            BoundingBox::new(0.0, 0.0, 1.0, 1.0).to_polygon(),
            attributes,
        )])
    }

    #[test]
    fn test_same_grid_maps_to_same_resolution() {
        let context = DggsContext::with_default_providers();
        for (id, expected) in [("z0x0y0", 0), ("z5x17y11", 5), ("z12x2000y1000", 12)] {
            let resolution =
                find_nearest_resolution(&context, DggsFamily::Tilecode, id, DggsFamily::Quadkey)
                    .unwrap();
            assert_eq!(resolution, expected);
        }
    }

    #[test]
    fn test_geohash_to_quadkey() {
        // A 5-char geohash averages ~15.2 km²: level 13 (~7.6 km²) beats level 12 (~30.4 km²).
        let context = DggsContext::with_default_providers();
        let resolution =
            find_nearest_resolution(&context, DggsFamily::Geohash, "w3gvk", DggsFamily::Quadkey)
                .unwrap();
        assert_eq!(resolution, 13);
    }

    #[test]
    fn test_decode_failure_propagates() {
        let context = DggsContext::with_default_providers();
        let err = find_nearest_resolution(&context, DggsFamily::Quadkey, "z5x1y1", DggsFamily::H3)
            .unwrap_err();
        assert!(matches!(err, ResampleError::Dggs(DggsError::Decode { .. })));
    }

    #[test]
    fn test_unregistered_family() {
        let context = DggsContext::new();
        let err = find_nearest_resolution(&context, DggsFamily::H3, "8001fffffffffff", DggsFamily::S2)
            .unwrap_err();
        assert!(matches!(err, ResampleError::Dggs(DggsError::UnsupportedFamily(_))));
    }

    #[test]
    fn test_first_cell_id() {
        let layer = layer_with_id("s2", AttributeValue::Integer(1234));
        assert_eq!(first_cell_id(&layer, DggsFamily::S2, "s2").unwrap(), "1234");

        assert!(matches!(
            first_cell_id(&layer, DggsFamily::S2, "s2_token"),
            Err(ResampleError::MissingField { index: 0, .. })
        ));
        assert!(matches!(
            first_cell_id(&Layer::default(), DggsFamily::S2, "s2"),
            Err(ResampleError::EmptyInput)
        ));

        let layer = layer_with_id("s2", AttributeValue::Float(1.5));
        assert!(matches!(
            first_cell_id(&layer, DggsFamily::S2, "s2"),
            Err(ResampleError::Dggs(DggsError::Decode { .. }))
        ));
    }

    #[test]
    fn test_match_layer_resolution() {
        let context = DggsContext::with_default_providers();
        let layer = layer_with_id("quadkey", AttributeValue::from("0231"));
        let resolution = match_layer_resolution(
            &context,
            &layer,
            DggsFamily::Quadkey,
            "quadkey",
            DggsFamily::Tilecode,
            &NoopFeedback,
        )
        .unwrap();
        assert_eq!(resolution, 4);
    }
}
