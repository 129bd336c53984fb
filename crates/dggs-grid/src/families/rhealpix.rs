//! rHEALPix cells (N_side = 3).
//!
//! Identifiers are a face letter `N`, `O`, `P`, `Q`, `R` or `S` followed by
//! one base-9 digit per resolution. Cell generation needs a full rHEALPix
//! projection engine, which is not bundled; register a custom provider in
//! the [`DggsContext`](crate::DggsContext) to generate rHEALPix targets.

use dggs_common::{AreaMetric, BoundingBox, DggsError, DggsFamily, DggsResult};

use crate::provider::GridProvider;
use crate::sink::CellSink;

const FACES: &[u8; 6] = b"NOPQRS";
const MAX_RESOLUTION: u8 = 15;

#[derive(Debug, Default, Clone, Copy)]
pub struct RhealpixProvider;

impl GridProvider for RhealpixProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Rhealpix
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (0..=MAX_RESOLUTION).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        let bytes = id.as_bytes();
        let Some((face, digits)) = bytes.split_first() else {
            return Err(DggsError::decode(DggsFamily::Rhealpix, id, "empty identifier"));
        };
        if !FACES.contains(face) {
            return Err(DggsError::decode(
                DggsFamily::Rhealpix,
                id,
                "first character must be one of N, O, P, Q, R, S",
            ));
        }
        if let Some(bad) = digits.iter().find(|b| !(b'0'..=b'8').contains(b)) {
            return Err(DggsError::decode(
                DggsFamily::Rhealpix,
                id,
                format!("invalid digit '{}'", *bad as char),
            ));
        }
        if digits.len() > MAX_RESOLUTION as usize {
            return Err(DggsError::decode(
                DggsFamily::Rhealpix,
                id,
                format!("more than {} digits", MAX_RESOLUTION),
            ));
        }
        Ok(digits.len() as u8)
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(AreaMetric::from_cell_count(6 * 9u64.pow(resolution as u32)))
    }

    fn generate(&self, resolution: u8, _extent: &BoundingBox, _sink: &mut CellSink<'_>) -> DggsResult<()> {
        self.check_resolution(resolution)?;
        Err(DggsError::GenerationUnavailable(DggsFamily::Rhealpix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dggs_common::NoopFeedback;

    #[test]
    fn test_decode() {
        assert_eq!(RhealpixProvider.decode("N").unwrap(), 0);
        assert_eq!(RhealpixProvider.decode("P3187").unwrap(), 4);
        assert!(RhealpixProvider.decode("T12").is_err());
        assert!(RhealpixProvider.decode("N19").is_err());
        assert!(RhealpixProvider.decode("").is_err());
        assert!(RhealpixProvider.decode("N0123456701234567").is_err());
    }

    #[test]
    fn test_area_metric() {
        assert_eq!(RhealpixProvider.area_metric(0).unwrap().num_cells, 6);
        assert_eq!(RhealpixProvider.area_metric(2).unwrap().num_cells, 486);
        assert!(RhealpixProvider.area_metric(16).is_err());
    }

    #[test]
    fn test_generate_unavailable() {
        let mut sink = CellSink::new(DggsFamily::Rhealpix, 1, 10, &NoopFeedback);
        let err = RhealpixProvider
            .generate(1, &BoundingBox::default(), &mut sink)
            .unwrap_err();
        assert!(matches!(err, DggsError::GenerationUnavailable(DggsFamily::Rhealpix)));
    }
}
