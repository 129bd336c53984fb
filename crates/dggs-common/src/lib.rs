//! Common types shared across the DGGS resampling workspace.

pub mod bbox;
pub mod cell;
pub mod error;
pub mod family;
pub mod feature;
pub mod feedback;

pub use bbox::BoundingBox;
pub use cell::{AreaMetric, Cell, EARTH_SURFACE_AREA_M2};
pub use error::{DggsError, DggsResult};
pub use family::DggsFamily;
pub use feature::{AttributeValue, Attributes, Feature, Layer};
pub use feedback::{CancellationFlag, Feedback, NoopFeedback, TracingFeedback};
