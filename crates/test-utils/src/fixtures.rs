//! Common test fixtures for DGGS resampling tests.
//!
//! Extents are given as `(min_lon, min_lat, max_lon, max_lat)` tuples, like
//! [`BoundingBox::new`] takes them.

use dggs_common::BoundingBox;

/// Common bounding box definitions for testing.
pub mod bbox {
    /// Global bounding box (-180 to 180, -90 to 90)
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Hanoi, Vietnam: about half a degree on a side
    pub const HANOI: (f64, f64, f64, f64) = (105.6, 20.8, 106.1, 21.3);

    /// Central Paris, a few kilometres across
    pub const PARIS: (f64, f64, f64, f64) = (2.30, 48.84, 2.36, 48.88);

    /// One degree square on the equator at the prime meridian
    pub const EQUATOR_DEGREE: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);

    /// Straddles the antimeridian in Fiji
    pub const FIJI: (f64, f64, f64, f64) = (179.5, -17.5, 180.0, -17.0);

    /// Invalid bbox (min > max)
    pub const INVALID: (f64, f64, f64, f64) = (10.0, 10.0, 5.0, 5.0);
}

/// Named points for exercising families at every resolution.
pub mod points {
    /// Hoan Kiem Lake, Hanoi
    pub const HANOI: (f64, f64) = (105.8524, 21.0287);

    /// Zurich
    pub const ZURICH: (f64, f64) = (8.524997, 47.365590);

    /// Southern mid-latitudes, west of the prime meridian
    pub const SANTIAGO: (f64, f64) = (-70.6693, -33.4489);
}

/// Build a [`BoundingBox`] from one of the [`bbox`] tuples.
pub fn extent(bounds: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(bounds.0, bounds.1, bounds.2, bounds.3)
}

/// A tiny extent of `half_width` degrees around a point.
pub fn extent_around(point: (f64, f64), half_width: f64) -> BoundingBox {
    BoundingBox::new(
        point.0 - half_width,
        point.1 - half_width,
        point.0 + half_width,
        point.1 + half_width,
    )
}
