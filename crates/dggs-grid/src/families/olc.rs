//! Open Location Code (plus code) grid.
//!
//! Resolution is the number of significant code digits. The pair section
//! (up to 10 digits) divides each cell 20×20; every grid-refinement digit
//! after that splits a cell into 4 columns × 5 rows.

use tracing::debug;

use dggs_common::{AreaMetric, BoundingBox, Cell, DggsError, DggsFamily, DggsResult};

use crate::geometry::shrink_for_tiling;
use crate::provider::GridProvider;
use crate::sink::CellSink;

const ALPHABET: &[u8; 20] = b"23456789CFGHJMPQRVWX";
const SEPARATOR: char = '+';
const SEPARATOR_POSITION: usize = 8;
const PADDING: char = '0';
const PAIR_CODE_LENGTH: u8 = 10;
const GRID_ROWS: u64 = 5;
const GRID_COLUMNS: u64 = 4;
const VALID_LENGTHS: [u8; 10] = [2, 4, 6, 8, 10, 11, 12, 13, 14, 15];

/// Cell size in degrees (lon, lat) for a code length.
fn cell_size(length: u8) -> (f64, f64) {
    let pairs = length.min(PAIR_CODE_LENGTH) / 2;
    let pair_size = 20.0 / 20f64.powi(pairs as i32 - 1);
    let grid_digits = length.saturating_sub(PAIR_CODE_LENGTH) as i32;
    (
        pair_size / (GRID_COLUMNS as f64).powi(grid_digits),
        pair_size / (GRID_ROWS as f64).powi(grid_digits),
    )
}

/// Encode a point into a full code of `length` significant digits.
pub fn encode(lon: f64, lat: f64, length: u8) -> String {
    let (_, lat_size) = cell_size(length);
    let mut lat = lat.clamp(-90.0, 90.0);
    if lat >= 90.0 {
        lat = 90.0 - lat_size / 2.0;
    }
    let lon = (lon + 180.0).rem_euclid(360.0);
    let lat = lat + 90.0;

    let mut digits = String::with_capacity(length as usize + 1);
    let mut lat_cell = 0.0f64;
    let mut lon_cell = 0.0f64;
    let mut size = 20.0f64;

    for _ in 0..length.min(PAIR_CODE_LENGTH) / 2 {
        let lat_digit = (((lat - lat_cell) / size).floor() as usize).min(19);
        let lon_digit = (((lon - lon_cell) / size).floor() as usize).min(19);
        lat_cell += lat_digit as f64 * size;
        lon_cell += lon_digit as f64 * size;
        digits.push(ALPHABET[lat_digit] as char);
        digits.push(ALPHABET[lon_digit] as char);
        size /= 20.0;
    }
    size *= 20.0;

    let (mut lat_size, mut lon_size) = (size, size);
    for _ in PAIR_CODE_LENGTH..length {
        lat_size /= GRID_ROWS as f64;
        lon_size /= GRID_COLUMNS as f64;
        let row = (((lat - lat_cell) / lat_size).floor() as u64).min(GRID_ROWS - 1);
        let col = (((lon - lon_cell) / lon_size).floor() as u64).min(GRID_COLUMNS - 1);
        lat_cell += row as f64 * lat_size;
        lon_cell += col as f64 * lon_size;
        digits.push(ALPHABET[(row * GRID_COLUMNS + col) as usize] as char);
    }

    while digits.len() < SEPARATOR_POSITION {
        digits.push(PADDING);
    }
    digits.insert(SEPARATOR_POSITION, SEPARATOR);
    digits
}

/// Significant digits of a full code, validated.
fn significant_digits(code: &str) -> Result<Vec<u8>, String> {
    let upper = code.to_ascii_uppercase();
    let separator = upper
        .find(SEPARATOR)
        .ok_or_else(|| "missing '+' separator".to_string())?;
    if upper.matches(SEPARATOR).count() != 1 {
        return Err("more than one '+' separator".to_string());
    }
    if separator != SEPARATOR_POSITION {
        return Err("short codes need a reference location".to_string());
    }

    let (head, tail) = (&upper[..separator], &upper[separator + 1..]);
    let significant = head.trim_end_matches(PADDING);
    if significant.contains(PADDING) {
        return Err("padding must only appear at the end".to_string());
    }
    if significant.len() < SEPARATOR_POSITION && !tail.is_empty() {
        return Err("padded codes cannot have digits after '+'".to_string());
    }
    if significant.len() % 2 != 0 {
        return Err("odd number of digits before padding".to_string());
    }

    let digits = significant
        .bytes()
        .chain(tail.bytes())
        .map(|b| {
            ALPHABET
                .iter()
                .position(|&a| a == b)
                .map(|p| p as u8)
                .ok_or_else(|| format!("invalid character '{}'", b as char))
        })
        .collect::<Result<Vec<u8>, String>>()?;

    if tail.len() == 1 {
        return Err("a single digit after '+' is not allowed".to_string());
    }
    if !digits.is_empty() && digits[0] > 8 {
        return Err("latitude out of range".to_string());
    }
    if digits.len() > 1 && digits[1] > 17 {
        return Err("longitude out of range".to_string());
    }
    Ok(digits)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OlcProvider;

impl GridProvider for OlcProvider {
    fn family(&self) -> DggsFamily {
        DggsFamily::Olc
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        VALID_LENGTHS.to_vec()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        let digits =
            significant_digits(id).map_err(|reason| DggsError::decode(DggsFamily::Olc, id, reason))?;
        let length = digits.len() as u8;
        if !VALID_LENGTHS.contains(&length) {
            return Err(DggsError::decode(
                DggsFamily::Olc,
                id,
                format!("{} significant digits is not a valid code length", length),
            ));
        }
        Ok(length)
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        let pairs = resolution.min(PAIR_CODE_LENGTH) as u32 / 2;
        let grid_digits = resolution.saturating_sub(PAIR_CODE_LENGTH) as u32;
        let num_cells =
            162 * 400u64.pow(pairs - 1) * (GRID_ROWS * GRID_COLUMNS).pow(grid_digits);
        Ok(AreaMetric::from_cell_count(num_cells))
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

        debug!(resolution, cells = sink.len(), "Generated OLC cells");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dggs_common::NoopFeedback;

    /// Cell bounds of a full code.
    fn decode_bbox(code: &str) -> Result<BoundingBox, String> {
        let digits = significant_digits(code)?;
        let mut lat = 0.0f64;
        let mut lon = 0.0f64;
        let mut size = 20.0f64;

        let pair_digits = digits.len().min(PAIR_CODE_LENGTH as usize);
        for pair in digits[..pair_digits].chunks(2) {
            lat += pair[0] as f64 * size;
            lon += pair[1] as f64 * size;
            size /= 20.0;
        }
        size *= 20.0;

        let (mut lat_size, mut lon_size) = (size, size);
        for &digit in &digits[pair_digits..] {
            lat_size /= GRID_ROWS as f64;
            lon_size /= GRID_COLUMNS as f64;
            lat += (digit as u64 / GRID_COLUMNS) as f64 * lat_size;
            lon += (digit as u64 % GRID_COLUMNS) as f64 * lon_size;
        }

        Ok(BoundingBox::new(
            lon - 180.0,
            lat - 90.0,
            lon - 180.0 + lon_size,
            lat - 90.0 + lat_size,
        ))
    }

    #[test]
    fn test_encode_known_values() {
        // Google Zurich office.
        assert_eq!(encode(8.524997, 47.365590, 10), "8FVC9G8F+6X");
        assert_eq!(encode(8.524997, 47.365590, 4), "8FVC0000+");
        assert_eq!(encode(8.524997, 47.365590, 2), "8F000000+");
    }

    #[test]
    fn test_decode_resolution() {
        assert_eq!(OlcProvider.decode("8FVC9G8F+6X").unwrap(), 10);
        assert_eq!(OlcProvider.decode("8FVC9G8F+6XR").unwrap(), 11);
        assert_eq!(OlcProvider.decode("8FVC0000+").unwrap(), 4);
        assert_eq!(OlcProvider.decode("8fvc9g8f+").unwrap(), 8);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in ["8FVC9G8F6X", "9G8F+6X", "8FVC9G8F+6", "8FV00000+", "8FVC9G8F+6XA", "WFVC9G8F+"] {
            assert!(
                matches!(OlcProvider.decode(bad), Err(DggsError::Decode { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_decode_bbox_matches_cell_size() {
        for length in VALID_LENGTHS {
            let code = encode(8.524997, 47.365590, length);
            let bbox = decode_bbox(&code).unwrap();
            let (lon_step, lat_step) = cell_size(length);
            assert!((bbox.min_lon..=bbox.max_lon).contains(&8.524997), "{}", code);
            assert!((bbox.min_lat..=bbox.max_lat).contains(&47.365590), "{}", code);
            assert!((bbox.width() - lon_step).abs() < 1e-9);
            assert!((bbox.height() - lat_step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_metric_counts() {
        assert_eq!(OlcProvider.area_metric(2).unwrap().num_cells, 162);
        assert_eq!(OlcProvider.area_metric(4).unwrap().num_cells, 64_800);
        assert_eq!(OlcProvider.area_metric(11).unwrap().num_cells, 162 * 400u64.pow(4) * 20);
        assert!(OlcProvider.area_metric(3).is_err());
    }

    #[test]
    fn test_generate_refinement_of_cell() {
        let parent = decode_bbox("8FVC9G8F+").unwrap();
        let mut sink = CellSink::new(DggsFamily::Olc, 10, 1_000, &NoopFeedback);
        OlcProvider.generate(10, &parent, &mut sink).unwrap();

        let cells = sink.into_cells();
        assert_eq!(cells.len(), 400);
        assert!(cells.iter().all(|c| c.id.starts_with("8FVC9G8F+")));
    }
}
