//! Cross-DGGS resampling engine.
//!
//! Moves a numeric attribute from a layer indexed by one Discrete Global
//! Grid System family onto the cells of another family, at a comparable
//! resolution, redistributing values by geometric overlap.
//!
//! - **Matcher**: picks the target resolution whose average cell area is
//!   closest to the source cells'
//! - **Dispatcher**: generates the target grid over the source extent
//! - **Overlay**: area-weighted redistribution of the value field
//! - **Resampler**: sequences the three for one request
//!
//! # Architecture
//!
//! ```text
//! Source layer + ResampleRequest
//!      │
//!      ▼
//! Resampler::run
//!      │
//!      ├─► resolution == Auto ? matcher::match_layer_resolution
//!      │                          (first feature's id → decode → area)
//!      │
//!      ├─► dispatcher::generate_grid(target family, resolution, extent)
//!      │          │
//!      │          └─► DggsContext → GridProvider::generate → CellSink
//!      │
//!      └─► value field set ? overlay::resample_features
//!                               (drops targets no source meets)
//!               │
//!               ▼
//!          ResampleOutput
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dggs_common::{DggsFamily, TracingFeedback};
//! use dggs_grid::DggsContext;
//! use resampler::{ResampleRequest, Resampler, ResamplerConfig};
//!
//! let context = DggsContext::with_default_providers();
//! let resampler = Resampler::new(&context, ResamplerConfig::from_env());
//!
//! let request = ResampleRequest::new(DggsFamily::Quadkey, DggsFamily::H3)
//!     .with_value_field("population");
//! let output = resampler.run(&layer, &request, &TracingFeedback::new())?;
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod orchestrator;
pub mod overlay;

// Re-export commonly used types at crate root
pub use config::ResamplerConfig;
pub use dispatcher::{generate_grid, TargetGrid};
pub use error::{ResampleError, Result};
pub use matcher::{find_nearest_resolution, match_layer_resolution};
pub use orchestrator::{
    ResampleOutput, ResampleRequest, Resampler, TargetResolution, AUTO_RESOLUTION,
};
pub use overlay::{resample_features, Resampled};
