//! # Bastion CLI
//!
//! ```bash
//! # Default blueprint
//! bastion
//!
//! # A metropolis on a river, from a config file, with stage logs
//! bastion --config city.toml --size metropolis --log debug
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use bastion::{parse_size, summary, City, CityConfig, CitySize};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Procedural walled city generator.
#[derive(Parser, Debug)]
#[command(name = "bastion", version, about)]
struct Args {
    /// TOML file with `[blueprint]` and `[generation]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Patch count or preset (auto, small_town, large_town, small_city,
    /// large_city, metropolis).
    #[arg(long, value_parser = parse_size)]
    size: Option<CitySize>,

    /// Seed, 0 for a fresh one.
    #[arg(long)]
    seed: Option<u32>,

    /// Draw the structural flags from the size.
    #[arg(long)]
    random: bool,

    /// Log filter, overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match &args.log {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => match CityConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "cannot load config");
                return ExitCode::FAILURE;
            }
        },
        None => CityConfig::default(),
    };
    if let Some(size) = args.size {
        config.blueprint.size = size;
    }
    if let Some(seed) = args.seed {
        config.blueprint.seed = seed;
    }
    if args.random {
        config.blueprint.random = true;
    }

    info!(size = ?config.blueprint.size, seed = config.blueprint.seed, "starting");
    match City::generate(&config) {
        Ok(city) => {
            print!("{}", summary(&city));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "generation failed");
            ExitCode::FAILURE
        }
    }
}
