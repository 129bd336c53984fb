//! Base-32 geohash grid.

use tracing::debug;

use dggs_common::{AreaMetric, BoundingBox, Cell, DggsError, DggsFamily, DggsResult};

use crate::geometry::shrink_for_tiling;
use crate::provider::GridProvider;
use crate::sink::CellSink;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";
const MAX_PRECISION: u8 = 10;

/// Longitude and latitude bit counts for a precision.
fn bit_split(precision: u8) -> (u32, u32) {
    let bits = 5 * precision as u32;
    (bits.div_ceil(2), bits / 2)
}

/// Cell size in degrees (lon, lat).
fn cell_size(precision: u8) -> (f64, f64) {
    let (lon_bits, lat_bits) = bit_split(precision);
    (
        360.0 / 2f64.powi(lon_bits as i32),
        180.0 / 2f64.powi(lat_bits as i32),
    )
}

/// Encode a point at the given precision.
pub fn encode(lon: f64, lat: f64, precision: u8) -> String {
    let (mut lon_lo, mut lon_hi) = (-180.0f64, 180.0f64);
    let (mut lat_lo, mut lat_hi) = (-90.0f64, 90.0f64);
    let mut hash = String::with_capacity(precision as usize);
    let mut even = true;
    let mut ch = 0usize;
    let mut bit = 0;

    while hash.len() < precision as usize {
        if even {
            let mid = (lon_lo + lon_hi) / 2.0;
            if lon >= mid {
                ch = (ch << 1) | 1;
                lon_lo = mid;
            } else {
                ch <<= 1;
                lon_hi = mid;
            }
        } else {
            let mid = (lat_lo + lat_hi) / 2.0;
            if lat >= mid {
                ch = (ch << 1) | 1;
                lat_lo = mid;
            } else {
                ch <<= 1;
                lat_hi = mid;
            }
        }
        even = !even;
        bit += 1;
        if bit == 5 {
            hash.push(BASE32[ch] as char);
            bit = 0;
            ch = 0;
        }
    }
    hash
}

/// Decode a geohash to its cell bounds.
pub fn decode_bbox(hash: &str) -> Result<BoundingBox, String> {
    let (mut lon_lo, mut lon_hi) = (-180.0f64, 180.0f64);
    let (mut lat_lo, mut lat_hi) = (-90.0f64, 90.0f64);
    let mut even = true;

    for ch in hash.bytes() {
        let value = BASE32
            .iter()
            .position(|&b| b == ch.to_ascii_lowercase())
            .ok_or_else(|| format!("invalid geohash character '{}'", ch as char))?;
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1 == 1;
            if even {
                let mid = (lon_lo + lon_hi) / 2.0;
                if bit {
                    lon_lo = mid;
                } else {
                    lon_hi = mid;
                }
            } else {
                let mid = (lat_lo + lat_hi) / 2.0;
                if bit {
                    lat_lo = mid;
                } else {
                    lat_hi = mid;
                }
            }
            even = !even;
        }
    }

    Ok(BoundingBox::new(lon_lo, lat_lo, lon_hi, lat_hi))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeohashProvider;

impl GridProvider for GeohashProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Geohash
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (1..=MAX_PRECISION).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        if id.is_empty() || id.len() > MAX_PRECISION as usize {
            return Err(DggsError::decode(
                DggsFamily::Geohash,
                id,
                format!("length must be 1..={}", MAX_PRECISION),
            ));
        }
        decode_bbox(id).map_err(|reason| DggsError::decode(DggsFamily::Geohash, id, reason))?;
        Ok(id.len() as u8)
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(AreaMetric::from_cell_count(32u64.pow(resolution as u32)))
    }

    fn generate(
        &self,
        resolution: u8,
        extent: &BoundingBox,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<()> {
        self.check_resolution(resolution)?;

        let (lon_step, lat_step) = cell_size(resolution);
        let cols = (360.0 / lon_step).round() as u64;
        let rows = (180.0 / lat_step).round() as u64;
        let area = shrink_for_tiling(&extent.clamp_to_valid());

        let col_of = |lon: f64| (((lon + 180.0) / lon_step).floor().max(0.0) as u64).min(cols - 1);
        let row_of = |lat: f64| (((lat + 90.0) / lat_step).floor().max(0.0) as u64).min(rows - 1);

        'rows: for row in row_of(area.min_lat)..=row_of(area.max_lat) {
            for col in col_of(area.min_lon)..=col_of(area.max_lon) {
                let min_lon = -180.0 + col as f64 * lon_step;
                let min_lat = -90.0 + row as f64 * lat_step;
                let bbox = BoundingBox::new(min_lon, min_lat, min_lon + lon_step, min_lat + lat_step);
                let (lon, lat) = bbox.center();
                let cell = Cell::new(encode(lon, lat, resolution), resolution, bbox.to_polygon());
                if !sink.push(cell)? {
                    break 'rows;
                }
            }
        }

        debug!(resolution, cells = sink.len(), "Generated geohash cells");
        Ok(())
    }
}
