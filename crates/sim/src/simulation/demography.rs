//! Demographic schedule: subpopulation sizes and migration over time.
//!
//! The schedule is a list of entries sorted by generation. The latest entry
//! whose generation is not after `g` is the one in force at generation `g`.
//! Structural events are expressed through the size list: a subpopulation
//! absent from (or sized 0 in) one entry and present with a positive size in
//! a later entry is created; sizing it 0 removes it.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Tolerance used when comparing summed migration rates against 1.
pub const RATE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubpopulationSize {
    pub males: usize,
    pub females: usize,
}

impl SubpopulationSize {
    pub fn new(males: usize, females: usize) -> Self {
        Self { males, females }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.males + self.females
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// One row of the demography schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographyEntry {
    pub generation: usize,
    pub subpopulations: Vec<SubpopulationSize>,
    /// `migration[dest][source]`: fraction of `dest`'s parents drawn from
    /// `source`. The diagonal is ignored. An empty matrix means no migration.
    #[serde(default)]
    pub migration: Vec<Vec<f64>>,
}

impl DemographyEntry {
    /// Target size of `subpopulation`; indices past the end are empty.
    pub fn size_of(&self, subpopulation: usize) -> SubpopulationSize {
        self.subpopulations
            .get(subpopulation)
            .copied()
            .unwrap_or_default()
    }

    /// Sum of the off-diagonal rates into `destination`.
    pub fn immigration(&self, destination: usize) -> f64 {
        self.migration.get(destination).map_or(0.0, |row| {
            row.iter()
                .enumerate()
                .filter(|&(source, _)| source != destination)
                .map(|(_, &rate)| rate)
                .sum()
        })
    }
}

/// The validated, generation-ordered demography schedule.
#[derive(Debug, Clone)]
pub struct DemographySchedule {
    entries: Vec<DemographyEntry>,
}

impl DemographySchedule {
    /// Validate and wrap the entries.
    ///
    /// # Errors
    /// Returns the first structural problem found; see [`validate`].
    pub fn new(entries: Vec<DemographyEntry>, hermaphroditic: bool) -> Result<Self, ConfigError> {
        validate(&entries, hermaphroditic)?;
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DemographyEntry] {
        &self.entries
    }

    /// Index of the entry in force at `generation`.
    pub fn active_index(&self, generation: usize) -> usize {
        self.entries
            .partition_point(|entry| entry.generation <= generation)
            .saturating_sub(1)
    }

    pub fn active(&self, generation: usize) -> &DemographyEntry {
        &self.entries[self.active_index(generation)]
    }

    /// Largest number of subpopulations named by any entry.
    pub fn max_subpopulations(&self) -> usize {
        max_subpopulations(&self.entries)
    }
}

pub(crate) fn max_subpopulations(entries: &[DemographyEntry]) -> usize {
    entries
        .iter()
        .map(|entry| entry.subpopulations.len())
        .max()
        .unwrap_or(0)
}

/// Check ordering, matrix shape and rates, that every newly created
/// subpopulation is fully seeded by immigration, and that no subpopulation
/// draws parents from an empty pool.
///
/// # Errors
/// Returns the first violation in schedule order.
pub fn validate(entries: &[DemographyEntry], hermaphroditic: bool) -> Result<(), ConfigError> {
    let first = entries.first().ok_or(ConfigError::EmptyDemography)?;
    if first.generation != 0 {
        return Err(ConfigError::DemographyStart(first.generation));
    }
    for pair in entries.windows(2) {
        if pair[1].generation <= pair[0].generation {
            return Err(ConfigError::DemographyOrder {
                previous: pair[0].generation,
                current: pair[1].generation,
            });
        }
    }

    let mut previous: Option<&DemographyEntry> = None;
    for entry in entries {
        let generation = entry.generation;
        let n = entry.subpopulations.len();

        if !entry.migration.is_empty()
            && (entry.migration.len() != n || entry.migration.iter().any(|row| row.len() != n))
        {
            return Err(ConfigError::MigrationShape {
                generation,
                expected: n,
                rows: entry.migration.len(),
            });
        }

        for (destination, row) in entry.migration.iter().enumerate() {
            for (from, &rate) in row.iter().enumerate() {
                if from != destination && !(0.0..=1.0).contains(&rate) {
                    return Err(ConfigError::MigrationRate {
                        generation,
                        destination,
                        from,
                        rate,
                    });
                }
            }
            let total = entry.immigration(destination);
            if total > 1.0 + RATE_TOLERANCE {
                return Err(ConfigError::MigrationRowSum {
                    generation,
                    destination,
                    total,
                });
            }
        }

        // The first generation under an entry breeds from the previous
        // entry's sizes, later ones from its own.
        for (destination, row) in entry.migration.iter().enumerate() {
            if entry.size_of(destination).is_empty() {
                continue;
            }
            for (from, &rate) in row.iter().enumerate() {
                let emptied = entry.size_of(from).is_empty()
                    || previous.is_some_and(|prev| prev.size_of(from).is_empty());
                if from != destination && rate > 0.0 && emptied {
                    return Err(ConfigError::EmptyMigrationSource {
                        generation,
                        destination,
                        from,
                    });
                }
            }
        }

        for (subpopulation, size) in entry.subpopulations.iter().enumerate() {
            if hermaphroditic && size.males > 0 {
                return Err(ConfigError::MalesInHermaphroditicMode {
                    generation,
                    subpopulation,
                });
            }
            if !hermaphroditic && !size.is_empty() && (size.males == 0 || size.females == 0) {
                return Err(ConfigError::MissingSex {
                    generation,
                    subpopulation,
                    males: size.males,
                    females: size.females,
                });
            }
            let created = previous.is_some_and(|prev| prev.size_of(subpopulation).is_empty());
            if created && !size.is_empty() {
                let total = entry.immigration(subpopulation);
                if total < 1.0 - RATE_TOLERANCE {
                    return Err(ConfigError::UnseededSubpopulation {
                        generation,
                        subpopulation,
                        total,
                    });
                }
            }
        }
        previous = Some(entry);
    }
    Ok(())
}
