//! Sequences matching, grid generation and overlay for one request.

use std::fmt;
use std::str::FromStr;

use tracing::{error, info, warn};

use dggs_common::{DggsFamily, Feedback, Layer};
use dggs_grid::DggsContext;

use crate::config::ResamplerConfig;
use crate::dispatcher::generate_grid;
use crate::error::{ResampleError, Result};
use crate::matcher::match_layer_resolution;
use crate::overlay::resample_features;

/// Raw resolution value that asks for automatic matching.
pub const AUTO_RESOLUTION: i64 = -1;

/// Requested target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetResolution {
    /// Match the source layer's average cell area.
    #[default]
    Auto,
    Fixed(u8),
}

impl fmt::Display for TargetResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(r) => write!(f, "{}", r),
        }
    }
}

impl FromStr for TargetResolution {
    type Err = String;

    /// Accepts `auto`, [`AUTO_RESOLUTION`] or a resolution in `0..=255`.
    /// Whether a fixed resolution suits the target family is checked later
    /// by its provider.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        match s.parse::<i64>() {
            Ok(AUTO_RESOLUTION) => Ok(Self::Auto),
            Ok(raw) => u8::try_from(raw)
                .map(Self::Fixed)
                .map_err(|_| format!("resolution {} is out of range", raw)),
            Err(_) => Err(format!("invalid resolution '{}'", s)),
        }
    }
}

/// One resampling request.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleRequest {
    pub source_family: DggsFamily,
    pub target_family: DggsFamily,
    pub resolution: TargetResolution,
    /// Attribute holding source cell ids; defaults to the family's id field.
    pub id_field: Option<String>,
    /// Attribute to redistribute. `None` or empty returns the bare grid.
    pub value_field: Option<String>,
}

impl ResampleRequest {
    pub fn new(source_family: DggsFamily, target_family: DggsFamily) -> Self {
        Self {
            source_family,
            target_family,
            resolution: TargetResolution::Auto,
            id_field: None,
            value_field: None,
        }
    }

    pub fn with_resolution(mut self, resolution: TargetResolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = Some(field.into());
        self
    }

    pub fn id_field(&self) -> &str {
        self.id_field
            .as_deref()
            .unwrap_or_else(|| self.source_family.id_field())
    }

    pub fn value_field(&self) -> Option<&str> {
        self.value_field.as_deref().filter(|field| !field.is_empty())
    }
}

/// Result of a resampling run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResampleOutput {
    pub family: DggsFamily,
    pub resolution: u8,
    pub layer: Layer,
    /// Target cells dropped for lack of an intersecting source.
    pub dropped: usize,
    /// The run was canceled; `layer` holds the partial result.
    pub canceled: bool,
}

/// Runs resampling requests against a [`DggsContext`].
#[derive(Debug)]
pub struct Resampler<'a> {
    context: &'a DggsContext,
    config: ResamplerConfig,
}

impl<'a> Resampler<'a> {
    pub fn new(context: &'a DggsContext, config: ResamplerConfig) -> Self {
        Self { context, config }
    }

    pub fn config(&self) -> &ResamplerConfig {
        &self.config
    }

    /// Resolve the resolution, generate the target grid over the layer's
    /// extent and, when a value field is requested, redistribute it.
    ///
    /// Every error is reported through `feedback` before being returned.
    pub fn run(
        &self,
        layer: &Layer,
        request: &ResampleRequest,
        feedback: &dyn Feedback,
    ) -> Result<ResampleOutput> {
        self.execute(layer, request, feedback).inspect_err(|e| {
            error!(error = %e, "Resampling failed");
            feedback.report_error(&e.to_string());
        })
    }

    fn execute(
        &self,
        layer: &Layer,
        request: &ResampleRequest,
        feedback: &dyn Feedback,
    ) -> Result<ResampleOutput> {
        self.config.validate()?;
        let extent = layer.extent().ok_or(ResampleError::EmptyInput)?;

        let resolution = match request.resolution {
            TargetResolution::Fixed(resolution) => resolution,
            TargetResolution::Auto => match_layer_resolution(
                self.context,
                layer,
                request.source_family,
                request.id_field(),
                request.target_family,
                feedback,
            )?,
        };

        info!(
            source_family = %request.source_family,
            target_family = %request.target_family,
            resolution,
            features = layer.len(),
            "Generating target grid"
        );
        feedback.report_info(&format!(
            "Generating {} grid at resolution {}",
            request.target_family, resolution
        ));
        let grid = generate_grid(
            self.context,
            request.target_family,
            resolution,
            &extent,
            self.config.max_cells,
            feedback,
        )?;

        let Some(field) = request.value_field() else {
            return Ok(ResampleOutput {
                family: grid.family,
                resolution,
                layer: Layer::new(grid.cells),
                dropped: 0,
                canceled: grid.canceled,
            });
        };

        if grid.canceled {
            warn!("Canceled during grid generation; skipping resampling");
            return Ok(ResampleOutput {
                family: grid.family,
                resolution,
                layer: Layer::default(),
                dropped: 0,
                canceled: true,
            });
        }

        feedback.report_info(&format!(
            "Resampling '{}' onto {} cells",
            field,
            grid.len()
        ));
        let resampled = resample_features(layer, grid.cells, field, &self.config, feedback)?;

        info!(
            emitted = resampled.features.len(),
            dropped = resampled.dropped,
            canceled = resampled.canceled,
            "Resampling complete"
        );
        Ok(ResampleOutput {
            family: request.target_family,
            resolution,
            layer: Layer::new(resampled.features),
            dropped: resampled.dropped,
            canceled: resampled.canceled,
        })
    }
}
