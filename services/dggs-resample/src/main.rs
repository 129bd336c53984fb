//! DGGS resampling command.
//!
//! Reads a GeoJSON layer indexed by one DGGS family, resamples it onto
//! another family and writes the target cells as GeoJSON.

mod geojson;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dggs_common::{CancellationFlag, DggsFamily, TracingFeedback};
use dggs_grid::DggsContext;
use resampler::{ResampleRequest, Resampler, ResamplerConfig, TargetResolution};

#[derive(Parser, Debug)]
#[command(name = "dggs-resample")]
#[command(about = "Resample a DGGS-indexed GeoJSON layer onto another DGGS family")]
struct Args {
    /// Input GeoJSON FeatureCollection
    #[arg(short, long)]
    input: PathBuf,

    /// Output GeoJSON file
    #[arg(short, long)]
    output: PathBuf,

    /// DGGS family of the input layer
    #[arg(long)]
    from: DggsFamily,

    /// DGGS family to resample onto
    #[arg(long)]
    to: DggsFamily,

    /// Target resolution, or `auto` / -1 to match the input cell size
    #[arg(short, long, default_value = "auto", allow_negative_numbers = true)]
    resolution: TargetResolution,

    /// Attribute holding input cell ids (default: the family name)
    #[arg(long)]
    id_field: Option<String>,

    /// Numeric attribute to resample; omit to only generate the grid
    #[arg(long)]
    value_field: Option<String>,

    /// YAML configuration file
    #[arg(short, long, env = "RESAMPLE_CONFIG")]
    config: Option<PathBuf>,

    /// Decimal places kept on resampled values
    #[arg(long)]
    value_decimals: Option<u32>,

    /// Largest target grid to generate
    #[arg(long)]
    max_cells: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    let config = load_config(&args)?;
    info!(
        value_decimals = config.value_decimals,
        max_cells = config.max_cells,
        "Loaded configuration"
    );

    let layer = geojson::read_layer(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    info!(input = %args.input.display(), features = layer.len(), "Read input layer");

    let mut request = ResampleRequest::new(args.from, args.to)
        .with_resolution(args.resolution);
    if let Some(field) = &args.id_field {
        request = request.with_id_field(field);
    }
    if let Some(field) = &args.value_field {
        request = request.with_value_field(field);
    }

    let cancel = CancellationFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || handler_flag.cancel())
        .context("Failed to set Ctrl-C handler")?;
    let feedback = TracingFeedback::with_cancellation(cancel);

    let context = DggsContext::with_default_providers();
    let resampler = Resampler::new(&context, config);
    let output = resampler.run(&layer, &request, &feedback)?;

    if output.canceled {
        warn!(cells = output.layer.len(), "Canceled; writing partial result");
    }
    geojson::write_layer(&args.output, &output.layer)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        output = %args.output.display(),
        family = %output.family,
        resolution = output.resolution,
        cells = output.layer.len(),
        dropped = output.dropped,
        "Wrote resampled layer"
    );
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// YAML file first, then environment overrides, then flags.
fn load_config(args: &Args) -> Result<ResamplerConfig> {
    let base = match &args.config {
        Some(path) => ResamplerConfig::from_yaml_file(path)?,
        None => ResamplerConfig::default(),
    };
    let mut config = base.with_env_overrides();

    if let Some(decimals) = args.value_decimals {
        config.value_decimals = decimals;
    }
    if let Some(max_cells) = args.max_cells {
        config.max_cells = max_cells;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "dggs-resample",
            "--input",
            "in.geojson",
            "--output",
            "out.geojson",
            "--from",
            "quadkey",
            "--to",
            "h3",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let args = parse(&[]);
        assert_eq!(args.from, DggsFamily::Quadkey);
        assert_eq!(args.to, DggsFamily::H3);
        assert_eq!(args.resolution, TargetResolution::Auto);
        assert!(args.value_field.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn test_parse_negative_and_fixed_resolution() {
        assert_eq!(parse(&["--resolution", "-1"]).resolution, TargetResolution::Auto);
        assert_eq!(parse(&["--resolution", "auto"]).resolution, TargetResolution::Auto);
        assert_eq!(parse(&["-r", "7"]).resolution, TargetResolution::Fixed(7));
    }

    #[test]
    fn test_out_of_range_resolution_is_rejected() {
        for bad in ["-2", "256", "fine"] {
            let result = Args::try_parse_from([
                "dggs-resample",
                "-i",
                "a",
                "-o",
                "b",
                "--from",
                "quadkey",
                "--to",
                "h3",
                "--resolution",
                bad,
            ]);
            assert!(result.is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_unknown_family_is_rejected() {
        let result = Args::try_parse_from([
            "dggs-resample",
            "-i",
            "a",
            "-o",
            "b",
            "--from",
            "hexbin",
            "--to",
            "h3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "value_decimals: 5\nmax_cells: 1000").unwrap();

        let path = file.path().to_string_lossy().to_string();
        let args = parse(&["--config", &path, "--max-cells", "50"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.value_decimals, 5);
        assert_eq!(config.max_cells, 50);
    }
}
