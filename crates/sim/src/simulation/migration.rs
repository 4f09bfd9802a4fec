//! Migration between subpopulations.
//!
//! Migration is modelled backwards: `rates[dest][source]` is the probability
//! that an offspring born into `dest` has both parents drawn from `source`.
//! The self-rate is `1 - Σ` of the other entries in the row.

use rand::distr::weighted::WeightedIndex;
use rand::Rng;

use crate::errors::SimulationError;
use crate::simulation::{DemographyEntry, SubpopulationSize};

/// The active migration matrix, padded to the number of live subpopulation
/// slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationMatrix {
    rates: Vec<Vec<f64>>,
}

impl MigrationMatrix {
    /// Build from a demography entry. Subpopulation slots beyond the entry's
    /// matrix neither send nor receive migrants.
    pub fn from_entry(entry: &DemographyEntry, slots: usize) -> Self {
        let rates = (0..slots)
            .map(|dest| {
                (0..slots)
                    .map(|source| {
                        if source == dest {
                            0.0
                        } else {
                            entry
                                .migration
                                .get(dest)
                                .and_then(|row| row.get(source))
                                .copied()
                                .unwrap_or(0.0)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rates }
    }

    pub fn slots(&self) -> usize {
        self.rates.len()
    }

    pub fn rate(&self, dest: usize, source: usize) -> f64 {
        self.rates[dest][source]
    }

    /// True if `dest` receives no migrants.
    pub fn is_closed(&self, dest: usize) -> bool {
        self.rates[dest].iter().all(|&rate| rate == 0.0)
    }

    /// Source weights for offspring of `dest`, including the self-rate.
    pub fn source_weights(&self, dest: usize) -> Vec<f64> {
        let mut weights = self.rates[dest].clone();
        let outgoing: f64 = weights.iter().sum();
        weights[dest] = (1.0 - outgoing).max(0.0);
        weights
    }
}

/// Source subpopulation of every offspring slot, per destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceAssignment {
    pub males: Vec<usize>,
    pub females: Vec<usize>,
}

/// Assign a source subpopulation to every offspring slot.
///
/// Destinations are processed in index order, males before females. A
/// destination without immigration draws nothing from `rng`.
///
/// # Errors
/// Fails if a row's weights cannot form a distribution.
pub fn assign_sources<R: Rng + ?Sized>(
    matrix: &MigrationMatrix,
    targets: &[SubpopulationSize],
    generation: usize,
    rng: &mut R,
) -> Result<Vec<SourceAssignment>, SimulationError> {
    targets
        .iter()
        .enumerate()
        .map(|(dest, target)| {
            if matrix.is_closed(dest) {
                return Ok(SourceAssignment {
                    males: vec![dest; target.males],
                    females: vec![dest; target.females],
                });
            }
            let sources = WeightedIndex::new(matrix.source_weights(dest)).map_err(|_| {
                SimulationError::PopulationCollapse {
                    subpopulation: dest,
                    generation,
                    reason: "migration weights do not form a distribution",
                }
            })?;
            let males = (0..target.males).map(|_| rng.sample(&sources)).collect();
            let females = (0..target.females).map(|_| rng.sample(&sources)).collect();
            Ok(SourceAssignment { males, females })
        })
        .collect()
}
