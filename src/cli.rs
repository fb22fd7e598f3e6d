//! The command line interface for the planner.
use crate::dataset::InputDataset;
use crate::optimisation::run_scenario;
use crate::output::{create_output_directory, get_output_dir, write_results};
use crate::scenario::{get_scenario, scenario_registry};
use ::log::info;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// The command line interface for the planner.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Commands,
}

/// Options for the run command
#[derive(Args)]
pub struct RunOpts {
    /// The scenario to solve
    #[arg(short, long, default_value = "BASE")]
    pub scenario: String,
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Build and solve a model for one scenario.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// List the available scenarios.
    Scenarios,
    /// Load and validate a model without solving it.
    Validate {
        /// Path to the model directory.
        model_dir: PathBuf,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts),
            Self::Scenarios => handle_scenarios_command(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir),
        }
    }
}

/// Parse CLI arguments and execute the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    crate::log::init().context("Failed to initialise logging")?;
    cli.command.execute()
}

/// Handle the `run` command.
pub fn handle_run_command(model_dir: &Path, opts: &RunOpts) -> Result<()> {
    let dataset =
        InputDataset::from_path(model_dir).context("Failed to load model")?;
    let spec = get_scenario(&opts.scenario)?;

    let results = run_scenario(&dataset, &spec)?;

    let output_dir = match opts.output_dir.as_deref() {
        Some(path) => path.to_path_buf(),
        None => get_output_dir(model_dir, &opts.scenario)?,
    };
    create_output_directory(&output_dir)?;
    write_results(&output_dir, &results, &dataset)?;
    info!("Results written to {}", output_dir.display());

    Ok(())
}

/// Handle the `scenarios` command.
pub fn handle_scenarios_command() -> Result<()> {
    for (id, spec) in scenario_registry() {
        println!("{id}: {}", spec.description);
    }

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(model_dir: &Path) -> Result<()> {
    InputDataset::from_path(model_dir).context("Model validation failed")?;
    info!("Model is valid");

    Ok(())
}
