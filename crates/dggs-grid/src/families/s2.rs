//! S2 cells: cube-face projection with Hilbert-curve cell ids.
//!
//! A cell id packs the face (3 bits), two bits of Hilbert position per
//! level and a trailing marker bit. Identifiers are exchanged as tokens:
//! the hex form of the id with trailing zeros dropped.

use geo::Polygon;
use tracing::debug;

use dggs_common::{AreaMetric, BoundingBox, Cell, DggsError, DggsFamily, DggsResult};

use crate::geometry::{intersects_wrapped, polygon_from_lonlat, unwrap_antimeridian};
use crate::provider::GridProvider;
use crate::sink::CellSink;

const MAX_LEVEL: u8 = 30;
const NUM_FACES: u8 = 6;
const POS_BITS: u32 = 2 * MAX_LEVEL as u32 + 1;
const MAX_SIZE: u32 = 1 << MAX_LEVEL;

/// Lowest-set-bit positions that mark a valid level.
const LSB_LEVEL_MASK: u64 = 0x1555_5555_5555_5555;

const SWAP_MASK: u8 = 0x01;
const INVERT_MASK: u8 = 0x02;

// Hilbert curve tables, indexed by [orientation][ij or pos].
#[cfg(test)]
const IJ_TO_POS: [[u8; 4]; 4] = [[0, 1, 3, 2], [0, 3, 1, 2], [2, 3, 1, 0], [2, 1, 3, 0]];
const POS_TO_IJ: [[u8; 4]; 4] = [[0, 1, 3, 2], [0, 2, 3, 1], [3, 2, 0, 1], [3, 1, 0, 2]];
const POS_TO_ORIENTATION: [u8; 4] = [SWAP_MASK, 0, 0, INVERT_MASK | SWAP_MASK];

/// Quadratic st -> uv projection.
fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (4.0 * s * s - 1.0) / 3.0
    } else {
        (1.0 - 4.0 * (1.0 - s) * (1.0 - s)) / 3.0
    }
}

#[cfg(test)]
fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

fn face_uv_to_xyz(face: u8, u: f64, v: f64) -> [f64; 3] {
    match face {
        0 => [1.0, u, v],
        1 => [-u, 1.0, v],
        2 => [-u, -v, 1.0],
        3 => [-1.0, -v, -u],
        4 => [v, -1.0, -u],
        _ => [v, u, -1.0],
    }
}

#[cfg(test)]
fn xyz_to_face_uv([x, y, z]: [f64; 3]) -> (u8, f64, f64) {
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
    let (axis, value) = if ax >= ay && ax >= az {
        (0, x)
    } else if ay >= az {
        (1, y)
    } else {
        (2, z)
    };
    let face = if value < 0.0 { axis + 3 } else { axis };
    let (u, v) = match face {
        0 => (y / x, z / x),
        1 => (-x / y, z / y),
        2 => (-x / z, -y / z),
        3 => (z / x, y / x),
        4 => (z / y, -x / y),
        _ => (-y / z, -x / z),
    };
    (face, u, v)
}

fn xyz_to_lonlat([x, y, z]: [f64; 3]) -> (f64, f64) {
    let lat = z.atan2((x * x + y * y).sqrt()).to_degrees();
    let lon = y.atan2(x).to_degrees();
    (lon, lat)
}

#[cfg(test)]
fn lonlat_to_xyz(lon: f64, lat: f64) -> [f64; 3] {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Leaf-cell ij coordinate of an st value.
#[cfg(test)]
fn st_to_ij(s: f64) -> u32 {
    ((s * MAX_SIZE as f64).floor().max(0.0) as u32).min(MAX_SIZE - 1)
}

/// Lon/lat of a point given in face ij coordinates (may sit on a cell edge).
fn ij_to_lonlat(face: u8, i: u32, j: u32) -> (f64, f64) {
    let u = st_to_uv(i as f64 / MAX_SIZE as f64);
    let v = st_to_uv(j as f64 / MAX_SIZE as f64);
    xyz_to_lonlat(face_uv_to_xyz(face, u, v))
}

/// A 64-bit S2 cell identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct S2CellId(u64);

impl S2CellId {
    /// The level-0 cell covering a whole cube face.
    fn from_face(face: u8) -> Self {
        Self(((face as u64) << POS_BITS) | (1u64 << (POS_BITS - 1)))
    }

    /// The leaf cell containing a WGS84 point.
    #[cfg(test)]
    fn from_lon_lat(lon: f64, lat: f64) -> Self {
        let (face, u, v) = xyz_to_face_uv(lonlat_to_xyz(lon, lat));
        Self::from_face_ij(face, st_to_ij(uv_to_st(u)), st_to_ij(uv_to_st(v)))
    }

    /// The leaf cell at face coordinates (i, j).
    #[cfg(test)]
    fn from_face_ij(face: u8, i: u32, j: u32) -> Self {
        let mut n = (face as u64) << POS_BITS;
        let mut orientation = face & SWAP_MASK;
        for k in (0..MAX_LEVEL as u32).rev() {
            let ij = ((((i >> k) & 1) << 1) | ((j >> k) & 1)) as usize;
            let pos = IJ_TO_POS[orientation as usize][ij];
            n |= (pos as u64) << (2 * k + 1);
            orientation ^= POS_TO_ORIENTATION[pos as usize];
        }
        Self(n | 1)
    }

    /// Parse a token. Returns `None` for malformed hex or an invalid id.
    fn from_token(token: &str) -> Option<Self> {
        if token.is_empty() || token.len() > 16 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let padded = format!("{:0<16}", token);
        let id = Self(u64::from_str_radix(&padded, 16).ok()?);
        id.is_valid().then_some(id)
    }

    fn to_token(&self) -> String {
        if self.0 == 0 {
            return "X".to_string();
        }
        format!("{:016x}", self.0).trim_end_matches('0').to_string()
    }

    fn face(&self) -> u8 {
        (self.0 >> POS_BITS) as u8
    }

    fn lsb(&self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    fn is_valid(&self) -> bool {
        self.face() < NUM_FACES && self.lsb() & LSB_LEVEL_MASK != 0
    }

    fn level(&self) -> u8 {
        MAX_LEVEL - (self.0.trailing_zeros() / 2) as u8
    }

    /// Ancestor at `level`, which must not exceed this cell's level.
    #[cfg(test)]
    fn parent(&self, level: u8) -> Self {
        let lsb = 1u64 << (2 * (MAX_LEVEL - level) as u32);
        Self((self.0 & lsb.wrapping_neg()) | lsb)
    }

    /// The four children in Hilbert order. Must not be called on a leaf.
    fn children(&self) -> [Self; 4] {
        let lsb = self.lsb();
        let step = lsb >> 1;
        let first = self.0 - lsb + (lsb >> 2);
        [
            Self(first),
            Self(first + step),
            Self(first + 2 * step),
            Self(first + 3 * step),
        ]
    }

    /// Face and leaf-ij bounds: (face, i0, j0, size in leaf cells).
    fn face_ij_bounds(&self) -> (u8, u32, u32, u32) {
        let face = self.face();
        let mut orientation = face & SWAP_MASK;
        let (mut i, mut j) = (0u32, 0u32);
        for k in (0..MAX_LEVEL as u32).rev() {
            let pos = ((self.0 >> (2 * k + 1)) & 3) as usize;
            let ij = POS_TO_IJ[orientation as usize][pos] as u32;
            i |= (ij >> 1) << k;
            j |= (ij & 1) << k;
            orientation ^= POS_TO_ORIENTATION[pos];
        }
        let size = 1u32 << (MAX_LEVEL - self.level());
        let mask = !(size - 1);
        (face, i & mask, j & mask, size)
    }

    /// Corner vertices as (lon, lat), counter-clockwise in face space.
    fn vertices(&self) -> [(f64, f64); 4] {
        let (face, i0, j0, size) = self.face_ij_bounds();
        let (i1, j1) = (i0 + size, j0 + size);
        [
            ij_to_lonlat(face, i0, j0),
            ij_to_lonlat(face, i1, j0),
            ij_to_lonlat(face, i1, j1),
            ij_to_lonlat(face, i0, j1),
        ]
    }

    /// Cell outline, unwrapped across the antimeridian when needed.
    fn polygon(&self) -> Polygon<f64> {
        let mut vertices = self.vertices();
        unwrap_antimeridian(&mut vertices);
        polygon_from_lonlat(&vertices)
    }

    /// A lon/lat box guaranteed to contain the cell and all its descendants.
    fn search_bounds(&self) -> BoundingBox {
        let (face, i0, j0, size) = self.face_ij_bounds();

        let mut samples = Vec::with_capacity(9);
        for di in 0..=2u64 {
            for dj in 0..=2u64 {
                let i = (i0 as u64 + size as u64 * di / 2) as u32;
                let j = (j0 as u64 + size as u64 * dj / 2) as u32;
                samples.push(ij_to_lonlat(face, i, j));
            }
        }

        let (mut min_lon, mut min_lat, mut max_lon, mut max_lat) =
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for &(lon, lat) in &samples {
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
        }

        let margin = 0.25 * (max_lat - min_lat).max((max_lon - min_lon).min(180.0)) + 1e-9;
        let mut bounds = BoundingBox::new(
            min_lon - margin,
            (min_lat - margin).max(-90.0),
            max_lon + margin,
            (max_lat + margin).min(90.0),
        );

        let half = MAX_SIZE / 2;
        let contains_pole = (face == 2 || face == 5)
            && (i0..=i0 + size).contains(&half)
            && (j0..=j0 + size).contains(&half);
        if contains_pole {
            if face == 2 {
                bounds.max_lat = 90.0;
            } else {
                bounds.min_lat = -90.0;
            }
        }
        if contains_pole || max_lon - min_lon > 180.0 {
            bounds.min_lon = -180.0;
            bounds.max_lon = 180.0;
        }
        bounds
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct S2Provider;

impl S2Provider {
    fn descend(
        cell: S2CellId,
        target: u8,
        extent: &BoundingBox,
        extent_polygon: &Polygon<f64>,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<bool> {
        if !cell.search_bounds().intersects(extent) {
            return Ok(true);
        }

        if cell.level() == target {
            let polygon = cell.polygon();
            if intersects_wrapped(&polygon, extent_polygon) {
                return sink.push(Cell::new(cell.to_token(), target, polygon));
            }
            return Ok(true);
        }

        for child in cell.children() {
            if !Self::descend(child, target, extent, extent_polygon, sink)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl GridProvider for S2Provider {
    fn family(&self) -> DggsFamily {
        DggsFamily::S2
    }

    fn valid_resolutions(&self) -> Vec<u8> {
        (0..=MAX_LEVEL).collect()
    }

    fn decode(&self, id: &str) -> DggsResult<u8> {
        S2CellId::from_token(id)
            .map(|cell| cell.level())
            .ok_or_else(|| DggsError::decode(DggsFamily::S2, id, "not a valid S2 cell token"))
    }

    fn area_metric(&self, resolution: u8) -> DggsResult<AreaMetric> {
        self.check_resolution(resolution)?;
        Ok(AreaMetric::from_cell_count(
            NUM_FACES as u64 * 4u64.pow(resolution as u32),
        ))
    }

    fn generate(
        &self,
        resolution: u8,
        extent: &BoundingBox,
        sink: &mut CellSink<'_>,
    ) -> DggsResult<()> {
        self.check_resolution(resolution)?;

        let extent = extent.clamp_to_valid();
        let extent_polygon = extent.to_polygon();
        for face in 0..NUM_FACES {
            if !Self::descend(S2CellId::from_face(face), resolution, &extent, &extent_polygon, sink)? {
                break;
            }
        }

        debug!(resolution, cells = sink.len(), "Generated S2 cells");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dggs_common::NoopFeedback;
    use geo::Intersects;

    #[test]
    fn test_face_tokens() {
        let tokens: Vec<String> = (0..6).map(|f| S2CellId::from_face(f).to_token()).collect();
        assert_eq!(tokens, vec!["1", "3", "5", "7", "9", "b"]);
        assert!(S2CellId::from_face(0).children().iter().all(|c| c.level() == 1));
        assert_eq!(S2CellId::from_face(0).children()[0].to_token(), "04");
    }

    #[test]
    fn test_known_cells() {
        let origin = S2CellId::from_lon_lat(0.0, 0.0);
        assert_eq!(origin.to_token(), "1000000000000001");
        assert_eq!(origin.level(), MAX_LEVEL);
        assert_eq!(origin.parent(1).to_token(), "14");

        // New York City.
        let nyc = S2CellId::from_lon_lat(-74.0060, 40.7128);
        assert_eq!(nyc.parent(8).to_token(), "89c25");
    }

    #[test]
    fn test_decode_levels() {
        assert_eq!(S2Provider.decode("89c25").unwrap(), 8);
        assert_eq!(S2Provider.decode("89c24").unwrap(), 7);
        assert_eq!(S2Provider.decode("1000000000000001").unwrap(), 30);
        assert_eq!(S2Provider.decode("b").unwrap(), 0);

        // Marker bit on an odd position.
        assert!(S2Provider.decode("89c26").is_err());
        // Face 7 does not exist.
        assert!(S2Provider.decode("f").is_err());
        assert!(S2Provider.decode("X").is_err());
        assert!(S2Provider.decode("").is_err());
    }

    #[test]
    fn test_children_share_parent() {
        let cell = S2CellId::from_lon_lat(2.35, 48.85).parent(12);
        for child in cell.children() {
            assert_eq!(child.level(), 13);
            assert_eq!(child.parent(12), cell);
        }
    }

    #[test]
    fn test_cell_contains_its_point() {
        let (lon, lat) = (-74.0060, 40.7128);
        let cell = S2CellId::from_lon_lat(lon, lat).parent(10);
        let point = geo::Point::new(lon, lat);
        assert!(cell.polygon().intersects(&point));
    }

    #[test]
    fn test_generate_world_level_one() {
        let mut sink = CellSink::new(DggsFamily::S2, 1, 100, &NoopFeedback);
        S2Provider.generate(1, &BoundingBox::default(), &mut sink).unwrap();
        assert_eq!(sink.len(), 24);
    }

    #[test]
    fn test_generate_local_extent_includes_point_cell() {
        let extent = BoundingBox::new(-74.05, 40.70, -73.95, 40.75);
        let mut sink = CellSink::new(DggsFamily::S2, 12, 10_000, &NoopFeedback);
        S2Provider.generate(12, &extent, &mut sink).unwrap();

        let expected = S2CellId::from_lon_lat(-74.0060, 40.7128).parent(12).to_token();
        let cells = sink.into_cells();
        assert!(cells.iter().any(|c| c.id == expected));
        assert!(cells.iter().all(|c| c.id.starts_with("89c")));
    }
}
