use std::io;

use thiserror::Error;

use crate::base::{BlockId, Locus};

/// Failures detected by the pre-flight validation of a [`Configuration`].
///
/// Every variant is fatal: a simulation is never constructed from a
/// configuration that fails validation.
///
/// [`Configuration`]: crate::simulation::Configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A scalar option is outside its valid range.
    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("at least one chromosome length is required")]
    NoChromosomes,

    #[error("chromosome {chromosome} has invalid length {length} (must be finite and > 0)")]
    InvalidChromosomeLength { chromosome: usize, length: f64 },

    #[error("the demography schedule is empty")]
    EmptyDemography,

    #[error("the first demography entry must be at generation 0, found {0}")]
    DemographyStart(usize),

    #[error("demography entries must be strictly increasing: generation {current} follows {previous}")]
    DemographyOrder { previous: usize, current: usize },

    #[error("generation {generation}: migration matrix must be {expected}x{expected}, found {rows} rows")]
    MigrationShape {
        generation: usize,
        expected: usize,
        rows: usize,
    },

    #[error("generation {generation}: migration rate [{destination}][{from}] = {rate} is outside [0, 1]")]
    MigrationRate {
        generation: usize,
        destination: usize,
        from: usize,
        rate: f64,
    },

    #[error(
        "generation {generation}: subpopulation {destination} draws migrants from subpopulation {from}, \
         which has no parents to give"
    )]
    EmptyMigrationSource {
        generation: usize,
        destination: usize,
        from: usize,
    },

    #[error("generation {generation}: immigration into subpopulation {destination} sums to {total} (> 1)")]
    MigrationRowSum {
        generation: usize,
        destination: usize,
        total: f64,
    },

    #[error(
        "generation {generation}: subpopulation {subpopulation} is created empty and must draw \
         all of its parents from other subpopulations (immigration sums to {total})"
    )]
    UnseededSubpopulation {
        generation: usize,
        subpopulation: usize,
        total: f64,
    },

    #[error(
        "generation {generation}: subpopulation {subpopulation} has {males} males and {females} females; \
         both sexes are needed outside hermaphroditic mode"
    )]
    MissingSex {
        generation: usize,
        subpopulation: usize,
        males: usize,
        females: usize,
    },

    #[error("generation {generation}: subpopulation {subpopulation} has males but the run is hermaphroditic")]
    MalesInHermaphroditicMode {
        generation: usize,
        subpopulation: usize,
    },

    #[error("ancestry proportions: {0}")]
    AncestryProportions(String),

    #[error("chromosome index {chromosome} is out of range ({count} chromosomes configured)")]
    UnknownChromosome { chromosome: usize, count: usize },

    #[error("site {position} lies outside chromosome {chromosome} of length {length}")]
    SiteOutOfBounds {
        chromosome: usize,
        position: Locus,
        length: f64,
    },

    #[error("site ({chromosome}, {position}) has no entry in the selection table")]
    UnknownSite { chromosome: usize, position: Locus },

    #[error("site ({chromosome}, {position}): {reason}")]
    InvalidSite {
        chromosome: usize,
        position: Locus,
        reason: String,
    },

    #[error("subpopulation index {subpopulation} referenced by {context} does not exist")]
    UnknownSubpopulation {
        subpopulation: usize,
        context: &'static str,
    },

    #[error("output schedule must be sorted: generation {current} follows {previous}")]
    OutputOrder { previous: usize, current: usize },
}

/// Errors that terminate a running simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pool that must supply parents has no individual with positive fitness.
    #[error("population collapse in subpopulation {subpopulation} at generation {generation}: {reason}")]
    PopulationCollapse {
        subpopulation: usize,
        generation: usize,
        reason: &'static str,
    },

    /// A monitored selected site has no remaining carriers.
    #[error("selected site lost at generation {generation}: chromosome {chromosome}, position {position}")]
    TrackedSiteLost {
        generation: usize,
        chromosome: usize,
        position: Locus,
    },

    #[error("failed to write statistics: {0}")]
    Report(#[from] io::Error),
}

/// Structural violations of the chromosome partition invariant.
///
/// These indicate implementation bugs rather than user errors; the engine
/// asserts on them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionError {
    #[error("chromosome has no blocks")]
    Empty,

    #[error("first block {block:?} starts at {start}, expected 0")]
    StartNotZero { block: BlockId, start: f64 },

    #[error("block {block:?} at slot {slot} starts at {start}, previous block ends at {expected}")]
    Discontiguous {
        slot: usize,
        block: BlockId,
        start: f64,
        expected: f64,
    },

    #[error("block {block:?} at slot {slot} is empty or inverted ([{start}, {end}))")]
    EmptyBlock {
        slot: usize,
        block: BlockId,
        start: f64,
        end: f64,
    },

    #[error("last block ends at {end}, expected chromosome length {length}")]
    EndMismatch { end: f64, length: f64 },

    #[error("block {0:?} is not allocated in the arena")]
    Dangling(BlockId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages_name_the_offender() {
        let err = ConfigError::UnknownSite {
            chromosome: 1,
            position: Locus::new(0.25),
        };
        assert_eq!(
            err.to_string(),
            "site (1, 0.25) has no entry in the selection table"
        );
    }

    #[test]
    fn test_simulation_error_wraps_config_error() {
        let err: SimulationError = ConfigError::EmptyDemography.into();
        assert!(matches!(err, SimulationError::Config(_)));
        assert_eq!(err.to_string(), "the demography schedule is empty");
    }

    #[test]
    fn test_tracked_site_lost_message() {
        let err = SimulationError::TrackedSiteLost {
            generation: 12,
            chromosome: 0,
            position: Locus::new(0.5),
        };
        assert!(err.to_string().contains("generation 12"));
        assert!(err.to_string().contains("position 0.5"));
    }
}
