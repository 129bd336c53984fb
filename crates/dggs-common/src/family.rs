//! The closed set of supported DGGS families.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DggsError;

/// A Discrete Global Grid System family.
///
/// Each family has its own identifier format and resolution semantics;
/// resolutions are only comparable across families through average cell area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DggsFamily {
    /// Uber H3 hexagonal grid.
    H3,
    /// Google S2 spherical quad-tree.
    S2,
    /// rHEALPix (healpix-based, 3x3 subdivision).
    Rhealpix,
    /// ISEA4T aperture-4 triangles.
    Isea4t,
    /// Quaternary Triangular Mesh.
    Qtm,
    /// Open Location Code (plus codes).
    Olc,
    /// Base-32 geohash.
    Geohash,
    /// Web Mercator tile written as `z{z}x{x}y{y}`.
    Tilecode,
    /// Web Mercator tile written as a base-4 quadkey.
    Quadkey,
}

impl DggsFamily {
    pub const ALL: [DggsFamily; 9] = [
        DggsFamily::H3,
        DggsFamily::S2,
        DggsFamily::Rhealpix,
        DggsFamily::Isea4t,
        DggsFamily::Qtm,
        DggsFamily::Olc,
        DggsFamily::Geohash,
        DggsFamily::Tilecode,
        DggsFamily::Quadkey,
    ];

    /// Lowercase family name, also used as the identifier attribute name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H3 => "h3",
            Self::S2 => "s2",
            Self::Rhealpix => "rhealpix",
            Self::Isea4t => "isea4t",
            Self::Qtm => "qtm",
            Self::Olc => "olc",
            Self::Geohash => "geohash",
            Self::Tilecode => "tilecode",
            Self::Quadkey => "quadkey",
        }
    }

    /// Name of the attribute holding cell identifiers in generated layers.
    pub fn id_field(&self) -> &'static str {
        self.as_str()
    }

    /// Whether generated cells carry graticule (width/height) metrics
    /// rather than geodesic edge metrics.
    pub fn is_graticule(&self) -> bool {
        matches!(
            self,
            Self::Olc | Self::Geohash | Self::Tilecode | Self::Quadkey
        )
    }
}

impl FromStr for DggsFamily {
    type Err = DggsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h3" => Ok(Self::H3),
            "s2" => Ok(Self::S2),
            "rhealpix" => Ok(Self::Rhealpix),
            "isea4t" => Ok(Self::Isea4t),
            "qtm" => Ok(Self::Qtm),
            "olc" | "pluscode" => Ok(Self::Olc),
            "geohash" => Ok(Self::Geohash),
            "tilecode" => Ok(Self::Tilecode),
            "quadkey" => Ok(Self::Quadkey),
            other => Err(DggsError::UnsupportedFamily(other.to_string())),
        }
    }
}

impl fmt::Display for DggsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for family in DggsFamily::ALL {
            assert_eq!(family.as_str().parse::<DggsFamily>().unwrap(), family);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("QuadKey".parse::<DggsFamily>().unwrap(), DggsFamily::Quadkey);
        assert_eq!(" H3 ".parse::<DggsFamily>().unwrap(), DggsFamily::H3);
    }

    #[test]
    fn test_unknown_family() {
        let err = "maidenhead".parse::<DggsFamily>().unwrap_err();
        assert!(matches!(err, DggsError::UnsupportedFamily(ref name) if name == "maidenhead"));
    }
}
