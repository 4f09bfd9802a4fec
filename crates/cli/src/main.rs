mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tractsim_sim::errors::SimulationError;

use args::{InitArgs, RunArgs, ValidateArgs};
use commands::{init, run, validate};

/// tractsim: A Forward-Time Admixture Simulator
///
/// This tool simulates how the ancestry tracts of admixed populations change
/// over time under recombination, migration and natural selection.
#[derive(Parser, Debug)]
#[command(name = "tractsim")]
#[command(author, version, about = "Simulates admixture and selection on ancestry tracts", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log filter (e.g. "warn", "debug", "tractsim_sim=debug")
    ///
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value = defaults::LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a template configuration.
    ///
    /// Sets up the parameters for a new experiment (subpopulations, migration,
    /// a selected site) but does not run it yet.
    Init(Box<InitArgs>),

    /// Run a simulation.
    ///
    /// Executes the simulation generation by generation and writes
    /// tab-separated statistics.
    Run(RunArgs),

    /// Check a configuration without running it.
    Validate(ValidateArgs),
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(defaults::LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 2 for a lost tracked site, 3 for a population collapse, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<SimulationError>() {
        Some(SimulationError::TrackedSiteLost { .. }) => 2,
        Some(SimulationError::PopulationCollapse { .. }) => 3,
        _ => 1,
    }
}

fn execute(cli: Cli) -> Result<()> {
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => init::init_simulation(&args),
        Commands::Run(args) => run::run_simulation(&args),
        Commands::Validate(args) => validate::validate_config(&args.config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
