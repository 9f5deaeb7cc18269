use anyhow::Context;
use clap::{Parser, Subcommand};
use plumb_tilt::config::{load_config_or_default, Config};
use plumb_tilt::logging::init_logging;
use plumb_tilt::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tilt")]
#[command(about = "Structural lean screening from photographs and device orientation")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the tilt of a single photograph
    Analyze {
        /// Path to the photograph
        #[arg(short, long)]
        image: PathBuf,

        /// Device pitch in degrees when the photo was taken
        #[arg(long, requires = "roll", allow_hyphen_values = true)]
        pitch: Option<f64>,

        /// Device roll in degrees when the photo was taken
        #[arg(long, requires = "pitch", allow_hyphen_values = true)]
        roll: Option<f64>,

        /// Output file for the estimate
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze several photographs of one structure and aggregate them
    Batch {
        /// Paths to the photographs
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// JSON array with one {"pitch", "roll"} object or null per image
        #[arg(long)]
        orientations: Option<PathBuf>,

        /// Output file for the report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify a tilt angle
    Severity {
        /// Tilt from vertical in degrees
        #[arg(short, long, allow_hyphen_values = true)]
        tilt: f64,
    },
}

/// Device attitude as written in an orientations file
#[derive(Debug, Clone, Copy, Deserialize)]
struct Attitude {
    pitch: f64,
    roll: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeverityReport {
    tilt_degrees: f64,
    severity: Severity,
    risk_points: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(cli.config.as_deref().and_then(Path::to_str));
    let _guard = init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Analyze {
            image,
            pitch,
            roll,
            output,
        } => {
            let orientation = pitch.zip(roll).map(|(p, r)| OrientationSample::now(p, r));
            handle_analyze(config, image, orientation, output)?;
        }
        Commands::Batch {
            images,
            orientations,
            output,
        } => {
            handle_batch(config, images, orientations, output)?;
        }
        Commands::Severity { tilt } => {
            let severity = Severity::from_tilt(tilt);
            let report = SeverityReport {
                tilt_degrees: tilt,
                severity,
                risk_points: severity.risk_points(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn handle_analyze(
    config: Config,
    image: PathBuf,
    orientation: Option<OrientationSample>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pipeline = TiltPipeline::new(config);
    let estimate = pipeline
        .analyze_source(&ImageSource::Path(image), orientation.as_ref())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Analysis failed, reporting degraded estimate");
            e.to_estimate()
        });

    write_json(&estimate, output.as_deref())
}

fn handle_batch(
    config: Config,
    images: Vec<PathBuf>,
    orientations: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let attitudes = match orientations {
        Some(path) => load_attitudes(&path, images.len())?,
        None => vec![None; images.len()],
    };

    let inputs: Vec<CaptureInput> = images
        .into_iter()
        .zip(attitudes)
        .map(|(image, attitude)| {
            CaptureInput::new(
                image,
                attitude.map(|a| OrientationSample::now(a.pitch, a.roll)),
            )
        })
        .collect();

    let analyzer = BatchAnalyzer::new(TiltPipeline::new(config))?;
    let report = analyzer.analyze(&inputs);
    let risk_points = report.aggregate.risk_points();

    let summary = serde_json::json!({
        "report": report,
        "riskPoints": risk_points,
    });
    write_json(&summary, output.as_deref())
}

fn load_attitudes(path: &Path, expected: usize) -> anyhow::Result<Vec<Option<Attitude>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read orientations file {}", path.display()))?;
    let attitudes: Vec<Option<Attitude>> =
        serde_json::from_str(&content).context("orientations file must be a JSON array")?;

    if attitudes.len() != expected {
        anyhow::bail!(
            "orientations file has {} entries but {} images were given",
            attitudes.len(),
            expected
        );
    }
    Ok(attitudes)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Results saved");
        }
        None => println!("{}", json),
    }
    Ok(())
}
