//! ISEA4T: aperture-4 triangles on the icosahedral Snyder equal-area
//! projection.
//!
//! Identifiers are a two-digit icosahedron face `00`-`19` followed by one
//! digit `0`-`3` per resolution. Decoding and metrics only; generation
//! needs an ISEA projection engine that is not bundled.

use dggs_common::{AreaMetric, BoundingBox, DggsError, DggsFamily, DggsResult};

use crate::provider::GridProvider;
use crate::sink::CellSink;

const MAX_RESOLUTION: u8 = 25;
const NUM_FACES: u8 = 20;

#[derive(Debug, Default, Clone, Copy)]
pub struct Isea4tProvider;

impl GridProvider for Isea4tProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Isea4t
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (0..=MAX_RESOLUTION).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        if id.len() < 2 || !id.is_ascii() {
            return Err(DggsError::decode(DggsFamily::Isea4t, id, "expected a two-digit face"));
        }
        let (face, digits) = id.split_at(2);
        let face_ok = face.bytes().all(|b| b.is_ascii_digit())
            && face.parse::<u8>().is_ok_and(|face| face < NUM_FACES);
        if !face_ok {
            return Err(DggsError::decode(
                DggsFamily::Isea4t,
                id,
                format!("face '{}' is not 00-19", face),
            ));
        }
        if let Some(bad) = digits.chars().find(|c| !('0'..='3').contains(c)) {
            return Err(DggsError::decode(
                DggsFamily::Isea4t,
                id,
                format!("invalid digit '{}'", bad),
            ));
        }
        if digits.len() > MAX_RESOLUTION as usize {
            return Err(DggsError::decode(
                DggsFamily::Isea4t,
                id,
                format!("more than {} digits", MAX_RESOLUTION),
            ));
        }
        Ok(digits.len() as u8)
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(AreaMetric::from_cell_count(
            NUM_FACES as u64 * 4u64.pow(resolution as u32),
        ))
    }

    fn generate(&self, resolution: u8, _extent: &BoundingBox, _sink: &mut CellSink<'_>) -> DggsResult<()> {
        self.check_resolution(resolution)?;
        Err(DggsError::GenerationUnavailable(DggsFamily::Isea4t))
    }
}
