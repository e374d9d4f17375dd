//! petrocost - crude-driven petrochemical cost and margin projection
//!
//! Loads the weekly price sheet, quotes front-month crude, projects SM and
//! ABS costs at the live price and across the risk scenario ladder, then
//! writes a dashboard chart and a result CSV.
//!
//! ```text
//! petrocost [--config petrocost.toml] [--verbose]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use service_cli::report::console;
use service_cli::{pipeline, AppConfig};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Petrochemical cost risk projection
#[derive(Parser)]
#[command(name = "petrocost")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path (defaults apply when absent)
    #[arg(short, long, default_value = "petrocost.toml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let loaded = AppConfig::load_with_env_and_validate(&cli.config);

    let directive = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.log_level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    if let Err(e) = init_tracing(&directive, cli.verbose) {
        eprintln!("failed to initialise logging: {:#}", e);
    }

    match loaded
        .with_context(|| format!("loading configuration from {}", cli.config.display()))
        .and_then(|config| run(&config))
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("petrocost run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the configured level unless `--verbose` is given.
fn init_tracing(directive: &str, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::try_new(directive)?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directive))?
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;
    Ok(())
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    info!(
        sheet = %config.sheet.source,
        preset = %config.model.preset,
        offline = config.crude.offline,
        "Starting petrocost run"
    );
    let output = pipeline::execute(config).context("projection run failed")?;
    print!("{}", console::render(&output));
    println!(
        "Chart: {}  |  CSV: {}",
        config.output.chart_path.display(),
        config.output.csv_path.display()
    );
    Ok(())
}
