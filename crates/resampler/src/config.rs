//! Configuration for resampling runs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ResampleError, Result};

/// Deepest rounding the resampler accepts.
pub const MAX_VALUE_DECIMALS: u32 = 12;

/// Configuration for a [`Resampler`](crate::Resampler).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResamplerConfig {
    /// Decimal places kept on resampled values.
    pub value_decimals: u32,

    /// Largest target grid the dispatcher will generate.
    pub max_cells: usize,
}

impl Default for ResamplerConfig {
    fn default() -> Self {
        Self {
            value_decimals: 3,
            max_cells: 2_000_000,
        }
    }
}

impl ResamplerConfig {
    /// Defaults overridden by environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a YAML file. Missing keys fall back to their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ResampleError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            ResampleError::config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Apply `RESAMPLE_VALUE_DECIMALS` and `RESAMPLE_MAX_CELLS` when set.
    /// Unparseable values are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("RESAMPLE_VALUE_DECIMALS") {
            match val.parse() {
                Ok(decimals) => self.value_decimals = decimals,
                Err(_) => warn!(value = %val, "Ignoring invalid RESAMPLE_VALUE_DECIMALS"),
            }
        }

        if let Ok(val) = std::env::var("RESAMPLE_MAX_CELLS") {
            match val.parse() {
                Ok(max_cells) => self.max_cells = max_cells,
                Err(_) => warn!(value = %val, "Ignoring invalid RESAMPLE_MAX_CELLS"),
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.value_decimals > MAX_VALUE_DECIMALS {
            return Err(ResampleError::config(format!(
                "value_decimals must be 0-{}",
                MAX_VALUE_DECIMALS
            )));
        }

        if self.max_cells == 0 {
            return Err(ResampleError::config("max_cells must be > 0"));
        }

        Ok(())
    }

    /// Round `value` to the configured number of decimals. Halfway cases
    /// go to the even neighbour.
    pub fn round_value(&self, value: f64) -> f64 {
        let factor = 10f64.powi(self.value_decimals as i32);
        (value * factor).round_ties_even() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ResamplerConfig::default();
        assert_eq!(config.value_decimals, 3);
        assert_eq!(config.max_cells, 2_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_value() {
        let config = ResamplerConfig::default();
        assert_eq!(config.round_value(1.23456), 1.235);
        assert_eq!(config.round_value(0.0004), 0.0);
        assert_eq!(config.round_value(100.0), 100.0);

        let coarse = ResamplerConfig {
            value_decimals: 0,
            ..Default::default()
        };
        assert_eq!(coarse.round_value(2.5), 2.0);
        assert_eq!(coarse.round_value(3.5), 4.0);
        assert_eq!(coarse.round_value(-2.5), -2.0);
    }

    #[test]
    fn test_round_value_halfway_goes_to_even() {
        let config = ResamplerConfig {
            value_decimals: 1,
            ..Default::default()
        };
        assert_eq!(config.round_value(0.25), 0.2);
        assert_eq!(config.round_value(0.75), 0.8);
        assert_eq!(config.round_value(0.26), 0.3);
    }

    #[test]
    fn test_validate() {
        let config = ResamplerConfig {
            value_decimals: 13,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ResampleError::Config(_))));

        let config = ResamplerConfig {
            max_cells: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_file_with_partial_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_cells: 5000").unwrap();

        let config = ResamplerConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.max_cells, 5000);
        assert_eq!(config.value_decimals, 3);
    }

    #[test]
    fn test_from_yaml_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            ResamplerConfig::from_yaml_file(&missing),
            Err(ResampleError::Config(_))
        ));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "max_cells: [not, a, number]").unwrap();
        assert!(ResamplerConfig::from_yaml_file(&bad).is_err());
    }
}
