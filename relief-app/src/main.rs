//! Relief Application
//!
//! Turns a directory of images into a mesh by driving the external
//! reconstruction, meshing and conversion tools in sequence.
//!
//! Exit status: `0` on success, `2` when the reconstruction has no 3D
//! points, `1` for any other failure.

use clap::Parser;
use relief_pipeline::config::DEFAULT_SCENE_DIR;
use relief_pipeline::{LoggingConfig, Pipeline, PipelineConfig, PipelineOutcome, ProcessRunner};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Relief - image directory to mesh pipeline
#[derive(Parser, Debug)]
#[command(name = "relief")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scene directory holding the source images
    #[arg(default_value = DEFAULT_SCENE_DIR)]
    scene_dir: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(logging: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level)),
        )
        .with_target(false)
        .init();
}

fn report(outcome: &PipelineOutcome) {
    info!("Pipeline complete for {}", outcome.layout.root().display());
    if outcome.quality.has_advisory() {
        warn!("Finished with a low multi-view ratio; check the mesh quality");
    }
    match (outcome.artifact.tier(), outcome.artifact.path()) {
        (Some(tier), Some(path)) => info!("Final mesh ({}): {}", tier.label(), path.display()),
        _ => info!("No mesh artifact produced; conversion skipped"),
    }
    if let Some(converted) = &outcome.converted {
        for path in &converted.outputs {
            info!("Converted: {}", path.display());
        }
    }
}

fn main() {
    let args = Args::parse();
    let config = PipelineConfig::new(&args.scene_dir).with_log_level(args.log_level);
    init_logging(&config.logging);

    let mut pipeline = Pipeline::new(config, ProcessRunner);
    match pipeline.run() {
        Ok(outcome) => report(&outcome),
        Err(e) => {
            error!("{}", e);
            std::process::exit(e.exit_code());
        }
    }
}
