//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use tractsim_sim::prelude::*;
//!
//! let sim = SimulationBuilder::new()
//!     .generations(2)
//!     .chromosome(1.0)
//!     .subpopulation(4, 4)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! assert_eq!(sim.generation(), 0);
//! ```

pub use crate::base::{AncestryBlock, AncestryId, BlockArena, BlockId, FitnessValue, Locus, SiteKey};
pub use crate::errors::{ConfigError, SimulationError};
pub use crate::evolution::{CrossoverModel, FitnessCombination, SelectionModel};
pub use crate::genome::{Chromosome, Haplotype, Individual, Sex};
pub use crate::simulation::{
    Configuration, Reporter, ReportRequest, RunSummary, Simulation, SimulationBuilder, Statistic,
    SubpopulationSize, SubpopulationSnapshot,
};
