//! sdkgen - generates a Rust SDK from an OpenAPI specification

use clap::Parser;
use sdkgen::{GeneratorConfig, generate_sdk};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sdkgen", version, about = "Generate a Rust API client from an OpenAPI spec")]
struct Cli {
    /// OpenAPI document, JSON or YAML
    #[arg(long, default_value = "spec.json")]
    spec: PathBuf,

    /// Directory the generated files are written into
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Generator configuration, JSON or YAML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "sdkgen=info",
        1 => "sdkgen=debug",
        _ => "sdkgen=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => match GeneratorConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => GeneratorConfig::default(),
    };

    match generate_sdk(&cli.spec, &cli.out, &config) {
        Ok(patch) => {
            tracing::info!("done, {} additions recorded in the patch", patch.operations().len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
