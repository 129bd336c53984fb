//! Area-weighted resampling of a numeric field onto target cells.
//!
//! For each target cell `T`, in order:
//!
//! ```text
//! value(T) = Σ  S.value × area(T ∩ S) / area(S)
//!           S ∩ T ≠ ∅
//! ```
//!
//! Areas and intersections are planar in lon/lat degrees. Target cells no
//! source touches are dropped from the output rather than zero-filled.
//! The overlay is a plain double scan; a bounding-box test in front of the
//! exact predicate only skips pairs that cannot intersect, so it never
//! changes the result.
//!
//! Cells crossing the antimeridian carry longitudes beyond ±180, so each
//! source is also compared shifted by ±360 degrees and every shifted copy
//! that meets the target contributes its overlap.

use std::borrow::Cow;

use geo::{Area, BooleanOps, Intersects, MultiPolygon, Translate};
use tracing::{debug, info, warn};

use dggs_common::{AttributeValue, BoundingBox, Feature, Feedback, Layer};
use dggs_grid::geometry::WRAP_SHIFTS;

use crate::config::ResamplerConfig;
use crate::error::{ResampleError, Result};

/// Output of [`resample_features`].
#[derive(Debug, Clone, PartialEq)]
pub struct Resampled {
    /// Target cells that met at least one source, with the field attached.
    pub features: Vec<Feature>,
    /// Target cells dropped because no source intersected them.
    pub dropped: usize,
    /// The run stopped early on cancellation; `features` is partial.
    pub canceled: bool,
}

struct Source<'a> {
    index: usize,
    geometry: &'a MultiPolygon<f64>,
    bbox: Option<BoundingBox>,
    area: f64,
    value: &'a AttributeValue,
}

/// Redistribute `field` from `sources` onto `targets` by overlap area.
///
/// Fails before any processing when a source lacks `field`, and aborts the
/// whole run when an intersecting source value is not numeric. Checks for
/// cancellation once per target cell.
pub fn resample_features(
    sources: &Layer,
    targets: Vec<Feature>,
    field: &str,
    config: &ResamplerConfig,
    feedback: &dyn Feedback,
) -> Result<Resampled> {
    let sources = prepare_sources(sources, field)?;
    let total = targets.len();
    info!(field, sources = sources.len(), targets = total, "Resampling");

    let mut features = Vec::new();
    let mut dropped = 0usize;
    let mut canceled = false;
    let mut last_percent = None;

    for (position, mut target) in targets.into_iter().enumerate() {
        if feedback.is_canceled() {
            warn!(processed = position, total, "Resampling canceled");
            canceled = true;
            break;
        }

        match accumulate(&target.geometry, &sources, field)? {
            Some(value) => {
                target.attributes.insert(field, config.round_value(value));
                features.push(target);
            }
            None => dropped += 1,
        }

        let percent = ((position + 1) * 100 / total) as u8;
        if last_percent != Some(percent) {
            feedback.report_progress(percent);
            last_percent = Some(percent);
        }
    }

    if dropped > 0 {
        warn!(dropped, "Dropped target cells with no intersecting source");
    }
    debug!(emitted = features.len(), dropped, canceled, "Resampling finished");

    Ok(Resampled {
        features,
        dropped,
        canceled,
    })
}

/// Check every source carries `field` and precompute areas and bounds.
fn prepare_sources<'a>(layer: &'a Layer, field: &str) -> Result<Vec<Source<'a>>> {
    layer
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let value = feature
                .attribute(field)
                .ok_or_else(|| ResampleError::missing_field(field, index))?;
            Ok(Source {
                index,
                geometry: &feature.geometry,
                bbox: BoundingBox::of_geometry(&feature.geometry),
                area: feature.geometry.unsigned_area(),
                value,
            })
        })
        .collect()
}

/// Weighted sum over the sources meeting `target`, `None` when none does.
///
/// Touching counts as meeting: such a source contributes zero but keeps the
/// target in the output. A meeting source must hold a number even when its
/// area is zero; zero-area sources are then skipped since their weight is
/// undefined.
fn accumulate(target: &MultiPolygon<f64>, sources: &[Source<'_>], field: &str) -> Result<Option<f64>> {
    let Some(target_bbox) = BoundingBox::of_geometry(target) else {
        return Ok(None);
    };
    let mut sum = 0.0;
    let mut hit = false;

    for source in sources {
        let Some(source_bbox) = &source.bbox else {
            continue;
        };
        let copies: Vec<Cow<'_, MultiPolygon<f64>>> = WRAP_SHIFTS
            .iter()
            .filter(|&&shift| target_bbox.intersects(&source_bbox.shift_lon(shift)))
            .map(|&shift| {
                if shift == 0.0 {
                    Cow::Borrowed(source.geometry)
                } else {
                    Cow::Owned(source.geometry.translate(shift, 0.0))
                }
            })
            .filter(|copy| target.intersects(&**copy))
            .collect();
        if copies.is_empty() {
            continue;
        }

        let value = source.value.as_f64().ok_or_else(|| ResampleError::NonNumericValue {
            field: field.to_string(),
            index: source.index,
            kind: source.value.type_name(),
            value: source.value.to_string(),
        })?;
        if source.area <= 0.0 {
            continue;
        }

        let overlap: f64 = copies
            .iter()
            .map(|copy| target.intersection(&**copy).unsigned_area())
            .sum();
        sum += value * overlap / source.area;
        hit = true;
    }

    Ok(hit.then_some(sum))
}
