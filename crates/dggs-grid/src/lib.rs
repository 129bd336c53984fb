//! DGGS family collaborators.
//!
//! Every supported Discrete Global Grid System family is exposed through the
//! [`GridProvider`] capability interface:
//!
//! - **decode**: identifier → resolution
//! - **area_metric**: resolution → expected cell count, edge length and area
//! - **valid_resolutions**: the ordered set of resolutions the family accepts
//! - **generate**: resolution × extent → cells intersecting the extent
//!
//! Providers are looked up by family through a caller-owned [`DggsContext`]
//! instead of branching on the family name at every call site.
//!
//! # Architecture
//!
//! ```text
//! DggsContext::with_default_providers()
//!      │
//!      ├─► H3Provider        (h3o)
//!      ├─► S2Provider        (cube faces + Hilbert cell ids)
//!      ├─► RhealpixProvider  (decode/metrics only)
//!      ├─► Isea4tProvider    (decode/metrics only)
//!      ├─► QtmProvider       (octant midpoint subdivision)
//!      ├─► OlcProvider       (plus-code grid)
//!      ├─► GeohashProvider   (base-32 grid)
//!      ├─► TilecodeProvider  ┐
//!      └─► QuadkeyProvider   ┴─ Web Mercator tiles
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dggs_common::{BoundingBox, DggsFamily, NoopFeedback};
//! use dggs_grid::{CellSink, DggsContext};
//!
//! let context = DggsContext::with_default_providers();
//! let provider = context.provider(DggsFamily::Geohash)?;
//! let mut sink = CellSink::new(DggsFamily::Geohash, 5, 10_000, &NoopFeedback);
//! provider.generate(5, &BoundingBox::new(105.0, 20.0, 105.5, 20.5), &mut sink)?;
//! let cells = sink.into_cells();
//! ```

pub mod context;
pub mod families;
pub mod geometry;
pub mod mercator;
pub mod provider;
pub mod sink;

pub use context::DggsContext;
pub use families::{
    GeohashProvider, H3Provider, Isea4tProvider, OlcProvider, QtmProvider, QuadkeyProvider,
    RhealpixProvider, S2Provider, TilecodeProvider,
};
pub use geometry::cell_to_feature;
pub use mercator::TileCoord;
pub use provider::GridProvider;
pub use sink::CellSink;
