//! Shared default values for the command-line front end.
//! These values are used by the `init` command (via clap) and logging setup.

pub const CONFIG_FILE: &str = "tractsim.json";
pub const LOG_LEVEL: &str = "info";

pub const GENERATIONS: usize = 20;
pub const SUBPOPULATIONS: usize = 2;
/// Males and females per founding subpopulation.
pub const SUBPOPULATION_SIZE: usize = 50;
/// Total immigration rate into each subpopulation.
pub const MIGRATION_RATE: f64 = 0.05;
pub const CHROMOSOME_LENGTH: f64 = 1.0;
