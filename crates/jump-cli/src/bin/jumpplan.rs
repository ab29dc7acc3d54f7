//! Jump planner - plan skydives from wind forecasts.
//!
//! Usage:
//!   jumpplan plan --scenario scenario.json
//!   jumpplan profile --scenario scenario.json --step 100
//!   jumpplan mean-wind --scenario scenario.json --lower 0 --upper 1000
//!   jumpplan freefall --scenario scenario.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jump_cli::{commands, Config, LogFormat, Scenario};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print compact instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Landing pattern, jump run, freefall and circles
    Plan {
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Resampled wind profile
    Profile {
        #[arg(long)]
        scenario: PathBuf,
        /// Resampling step in meters
        #[arg(long)]
        step: Option<f64>,
    },
    /// Mean wind between two heights above ground
    MeanWind {
        #[arg(long)]
        scenario: PathBuf,
        /// Lower limit, meters AGL
        #[arg(long)]
        lower: f64,
        /// Upper limit, meters AGL
        #[arg(long)]
        upper: f64,
    },
    /// Freefall trajectory
    Freefall {
        #[arg(long)]
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env();
    if args.compact {
        config.pretty = false;
    }

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive("jump_cli=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    match args.command {
        Command::Plan { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            emit(&commands::plan(&scenario, config.profile_step_m)?, &config)
        }
        Command::Profile { scenario, step } => {
            let scenario = Scenario::load(&scenario)?;
            let step = step.unwrap_or(config.profile_step_m);
            emit(&commands::profile(&scenario, step)?, &config)
        }
        Command::MeanWind { scenario, lower, upper } => {
            let scenario = Scenario::load(&scenario)?;
            emit(&commands::mean_wind(&scenario, config.profile_step_m, lower, upper)?, &config)
        }
        Command::Freefall { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            emit(&commands::freefall(&scenario, config.profile_step_m)?, &config)
        }
    }
}

fn emit<T: Serialize>(value: &T, config: &Config) -> Result<()> {
    let text = if config.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
