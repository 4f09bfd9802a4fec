use clap::Args;
use std::path::PathBuf;

use crate::defaults;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override random seed (default: use configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override number of generations (ignored when an output schedule is set)
    #[arg(short = 'g', long)]
    pub generations: Option<usize>,

    /// Statistics output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration path
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,

    /// Number of generations
    #[arg(short = 'g', long, default_value_t = defaults::GENERATIONS)]
    pub generations: usize,

    /// Number of founding subpopulations (one ancestry each)
    #[arg(short = 'p', long, default_value_t = defaults::SUBPOPULATIONS)]
    pub subpopulations: usize,

    /// Males and females per subpopulation
    #[arg(short = 'n', long, default_value_t = defaults::SUBPOPULATION_SIZE)]
    pub size: usize,

    /// Total immigration rate into each subpopulation, split evenly over the
    /// other subpopulations
    #[arg(short = 'm', long, default_value_t = defaults::MIGRATION_RATE)]
    pub migration: f64,

    /// Chromosome lengths in Morgans (repeat for several chromosomes)
    #[arg(short = 'l', long = "chromosome", default_values_t = [defaults::CHROMOSOME_LENGTH])]
    pub chromosomes: Vec<f64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,
}
