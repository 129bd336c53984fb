//! Web Mercator XYZ tile math shared by the tilecode and quadkey families.

use dggs_common::BoundingBox;

use crate::geometry::shrink_for_tiling;

/// Latitude limit of the Web Mercator square.
pub const MAX_LAT: f64 = 85.051_128_779_806_59;

/// Deepest zoom level the tile families accept.
pub const MAX_ZOOM: u8 = 29;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level
    pub z: u8,
    /// Column (x)
    pub x: u32,
    /// Row (y), counted from the north
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Tiles per axis at this zoom.
    pub fn matrix_size(z: u8) -> u64 {
        1u64 << z
    }

    /// Whether x and y fall inside the zoom level's matrix.
    pub fn is_valid(&self) -> bool {
        self.z <= MAX_ZOOM
            && (self.x as u64) < Self::matrix_size(self.z)
            && (self.y as u64) < Self::matrix_size(self.z)
    }

    /// Geographic bounds of the tile.
    pub fn bbox(&self) -> BoundingBox {
        tile_to_bbox(self.z, self.x, self.y)
    }

    /// Tile code in `z{z}x{x}y{y}` form.
    pub fn to_tilecode(&self) -> String {
        format!("z{}x{}y{}", self.z, self.x, self.y)
    }

    /// Parse a `z{z}x{x}y{y}` tile code.
    pub fn from_tilecode(code: &str) -> Result<Self, String> {
        let rest = code
            .strip_prefix('z')
            .ok_or_else(|| "expected leading 'z'".to_string())?;
        let (z, rest) = rest
            .split_once('x')
            .ok_or_else(|| "missing 'x' component".to_string())?;
        let (x, y) = rest
            .split_once('y')
            .ok_or_else(|| "missing 'y' component".to_string())?;

        let z: u8 = parse_digits(z, "zoom")?;
        let x: u32 = parse_digits(x, "column")?;
        let y: u32 = parse_digits(y, "row")?;

        let tile = Self { z, x, y };
        if !tile.is_valid() {
            return Err(format!("tile {}/{}/{} is outside the zoom {} matrix", z, x, y, z));
        }
        Ok(tile)
    }

    /// Bing-style quadkey: one base-4 digit per zoom level.
    pub fn to_quadkey(&self) -> String {
        (1..=self.z)
            .rev()
            .map(|level| {
                let mask = 1u32 << (level - 1);
                let mut digit = b'0';
                if self.x & mask != 0 {
                    digit += 1;
                }
                if self.y & mask != 0 {
                    digit += 2;
                }
                digit as char
            })
            .collect()
    }

    /// Parse a quadkey. The empty quadkey is the zoom-0 world tile.
    pub fn from_quadkey(quadkey: &str) -> Result<Self, String> {
        if quadkey.len() > MAX_ZOOM as usize {
            return Err(format!("longer than {} digits", MAX_ZOOM));
        }
        let z = quadkey.len() as u8;
        let (mut x, mut y) = (0u32, 0u32);
        for (i, ch) in quadkey.chars().enumerate() {
            let mask = 1u32 << (z as usize - i - 1);
            match ch {
                '0' => {}
                '1' => x |= mask,
                '2' => y |= mask,
                '3' => {
                    x |= mask;
                    y |= mask;
                }
                other => return Err(format!("invalid quadkey digit '{}'", other)),
            }
        }
        Ok(Self { z, x, y })
    }
}

fn parse_digits<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {} '{}'", what, s));
    }
    s.parse().map_err(|_| format!("{} '{}' out of range", what, s))
}

/// Calculate the bounding box for a Web Mercator tile.
pub fn tile_to_bbox(z: u8, x: u32, y: u32) -> BoundingBox {
    let n = TileCoord::matrix_size(z) as f64;

    let lon_min = x as f64 / n * 360.0 - 180.0;
    let lon_max = (x as f64 + 1.0) / n * 360.0 - 180.0;

    let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (y as f64 + 1.0) / n))
        .sinh()
        .atan()
        .to_degrees();

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}

/// Convert geographic coordinates to Web Mercator tile coordinates.
///
/// Latitudes beyond the Mercator limit are clamped to the edge rows.
pub fn coords_to_tile(lon: f64, lat: f64, z: u8) -> (u32, u32) {
    let n = TileCoord::matrix_size(z) as f64;
    let max_index = (n - 1.0) as u32;

    let lon = lon.clamp(-180.0, 180.0);
    let lat = lat.clamp(-MAX_LAT, MAX_LAT);

    let x = ((lon + 180.0) / 360.0 * n).floor().max(0.0) as u32;
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n)
        .floor()
        .max(0.0) as u32;

    (x.min(max_index), y.min(max_index))
}

/// Tiles at zoom `z` covering `extent`, row-major from the north-west.
pub fn tiles_in_extent(extent: &BoundingBox, z: u8) -> impl Iterator<Item = TileCoord> {
    let shrunk = shrink_for_tiling(&extent.clamp_to_valid());
    let (x0, y0) = coords_to_tile(shrunk.min_lon, shrunk.max_lat, z);
    let (x1, y1) = coords_to_tile(shrunk.max_lon, shrunk.min_lat, z);

    (y0..=y1).flat_map(move |y| (x0..=x1).map(move |x| TileCoord { z, x, y }))
}
