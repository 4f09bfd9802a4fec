//! Simulation configuration.
//!
//! A [`Configuration`] is a single JSON document describing a complete run:
//! global options, the demography schedule, the selection table, the initial
//! ancestry and allele frequencies, and the output schedule. Deserializing it
//! does not check it; [`Configuration::validate`] performs the pre-flight
//! validation and is run by [`Simulation::new`].
//!
//! [`Simulation::new`]: crate::simulation::Simulation::new

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::base::{Locus, SiteKey};
use crate::errors::ConfigError;
use crate::evolution::{CrossoverModel, FitnessCombination, SelectionEntry, SiteEffect};
use crate::simulation::demography::{self, DemographyEntry, SubpopulationSize};

/// Tolerance on ancestry proportion rows summing to 1.
const PROPORTION_TOLERANCE: f64 = 1e-6;

/// The master configuration struct.
/// Can be deserialized from a file to fully reproduce a simulation setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub options: Options,
    pub demography: Vec<DemographyEntry>,
    #[serde(default)]
    pub selection: Vec<SelectionEntry>,
    /// `ancestry_proportions[subpopulation][ancestry]` for the founding
    /// generation. Absent: subpopulation `p` is founded by ancestry `p`.
    #[serde(default)]
    pub ancestry_proportions: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub allele_frequencies: Vec<FrequencyEntry>,
    #[serde(default)]
    pub output: Vec<OutputEntry>,
}

fn default_stats_frequency() -> usize {
    1
}

fn default_garbage_frequency() -> usize {
    10
}

/// Global run options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// The generation loop runs while `generation < generations`.
    pub generations: usize,
    /// Length of each chromosome in Morgans.
    pub chromosome_lengths: Vec<f64>,
    /// Cadence of tracked-site checks and of default reporting.
    #[serde(default = "default_stats_frequency")]
    pub stats_frequency: usize,
    /// Cadence of block garbage collection.
    #[serde(default = "default_garbage_frequency")]
    pub garbage_frequency: usize,
    #[serde(default)]
    pub hermaphroditic: bool,
    /// Selected sites whose loss terminates the run.
    #[serde(default)]
    pub tracked_sites: Vec<SiteKey>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub crossover: CrossoverModel,
    #[serde(default)]
    pub fitness_combination: FitnessCombination,
}

/// Initial frequency of a selected mutation, per ancestry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub chromosome: usize,
    pub position: Locus,
    /// One frequency for all ancestries, or one per ancestry.
    pub frequencies: Vec<f64>,
}

impl FrequencyEntry {
    pub fn site(&self) -> SiteKey {
        SiteKey {
            chromosome: self.chromosome,
            position: self.position,
        }
    }

    pub fn frequency(&self, ancestry: usize) -> f64 {
        if self.frequencies.len() == 1 {
            self.frequencies[0]
        } else {
            self.frequencies[ancestry]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Length-weighted ancestry proportions and their variance.
    Ancestry,
    /// Frequencies of the selected mutations.
    Sites,
    /// Tract length summaries per ancestry.
    Tracts,
    /// Pool sizes.
    Sizes,
}

impl Statistic {
    pub const ALL: [Statistic; 4] = [
        Statistic::Ancestry,
        Statistic::Sites,
        Statistic::Tracts,
        Statistic::Sizes,
    ];
}

fn all_statistics() -> Vec<Statistic> {
    Statistic::ALL.to_vec()
}

/// A generation at which statistics are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub generation: usize,
    #[serde(default = "all_statistics")]
    pub statistics: Vec<Statistic>,
    /// Report only these subpopulations. Absent: all of them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpopulations: Option<Vec<usize>>,
}

impl Configuration {
    /// Read a configuration from a JSON file.
    ///
    /// # Errors
    /// I/O and parse failures. The result is not validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A small two-subpopulation run with one selected site, used as the
    /// starting point written by `tractsim init`.
    pub fn template() -> Self {
        Self {
            options: Options {
                generations: 20,
                chromosome_lengths: vec![1.0],
                stats_frequency: 1,
                garbage_frequency: 10,
                hermaphroditic: false,
                tracked_sites: Vec::new(),
                seed: Some(42),
                crossover: CrossoverModel::Poisson,
                fitness_combination: FitnessCombination::Multiplicative,
            },
            demography: vec![DemographyEntry {
                generation: 0,
                subpopulations: vec![SubpopulationSize::new(50, 50), SubpopulationSize::new(50, 50)],
                migration: vec![vec![0.0, 0.05], vec![0.05, 0.0]],
            }],
            selection: vec![SelectionEntry {
                chromosome: 0,
                position: Locus::new(0.5),
                subpopulation: None,
                sex: None,
                effects: vec![SiteEffect::new(0.05, 0.5), SiteEffect::new(0.0, 0.5)],
            }],
            ancestry_proportions: None,
            allele_frequencies: vec![FrequencyEntry {
                chromosome: 0,
                position: Locus::new(0.5),
                frequencies: vec![0.5, 0.0],
            }],
            output: Vec::new(),
        }
    }

    /// Number of ancestral source populations.
    pub fn num_ancestries(&self) -> usize {
        self.ancestry_proportions
            .as_ref()
            .and_then(|rows| rows.first())
            .map(Vec::len)
            .unwrap_or_else(|| {
                self.demography
                    .first()
                    .map_or(0, |entry| entry.subpopulations.len())
            })
    }

    /// Pre-flight validation of the whole document.
    ///
    /// # Errors
    /// Returns the first problem found. Options and chromosomes are checked
    /// first, then demography, ancestry proportions, selection, frequencies,
    /// tracked sites and the output schedule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_options()?;
        demography::validate(&self.demography, self.options.hermaphroditic)?;
        self.validate_ancestry_proportions()?;
        self.validate_selection()?;
        self.validate_frequencies()?;
        self.validate_tracked_sites()?;
        self.validate_output()
    }

    fn validate_options(&self) -> Result<(), ConfigError> {
        let options = &self.options;
        if options.generations == 0 {
            return Err(ConfigError::InvalidOption {
                name: "generations",
                reason: "must be at least 1".into(),
            });
        }
        if options.stats_frequency == 0 {
            return Err(ConfigError::InvalidOption {
                name: "stats_frequency",
                reason: "must be at least 1".into(),
            });
        }
        if options.garbage_frequency == 0 {
            return Err(ConfigError::InvalidOption {
                name: "garbage_frequency",
                reason: "must be at least 1".into(),
            });
        }
        if options.chromosome_lengths.is_empty() {
            return Err(ConfigError::NoChromosomes);
        }
        for (chromosome, &length) in options.chromosome_lengths.iter().enumerate() {
            if !(length.is_finite() && length > 0.0) {
                return Err(ConfigError::InvalidChromosomeLength { chromosome, length });
            }
        }
        Ok(())
    }

    fn validate_ancestry_proportions(&self) -> Result<(), ConfigError> {
        let founders = self.demography.first().map_or(0, |e| e.subpopulations.len());
        let num_ancestries = self.num_ancestries();
        if num_ancestries == 0 {
            return Err(ConfigError::AncestryProportions(
                "at least one ancestry is required".into(),
            ));
        }
        if num_ancestries > usize::from(u16::MAX) + 1 {
            return Err(ConfigError::AncestryProportions(format!(
                "{num_ancestries} ancestries exceed the supported maximum"
            )));
        }

        let Some(rows) = &self.ancestry_proportions else {
            return Ok(());
        };
        if rows.len() != founders {
            return Err(ConfigError::AncestryProportions(format!(
                "expected one row per founding subpopulation ({founders}), found {}",
                rows.len()
            )));
        }
        for (subpopulation, row) in rows.iter().enumerate() {
            if row.len() != num_ancestries {
                return Err(ConfigError::AncestryProportions(format!(
                    "row {subpopulation} has {} entries, expected {num_ancestries}",
                    row.len()
                )));
            }
            if row.iter().any(|p| !(p.is_finite() && *p >= 0.0)) {
                return Err(ConfigError::AncestryProportions(format!(
                    "row {subpopulation} contains a negative or non-finite proportion"
                )));
            }
            let total: f64 = row.iter().sum();
            if (total - 1.0).abs() > PROPORTION_TOLERANCE {
                return Err(ConfigError::AncestryProportions(format!(
                    "row {subpopulation} sums to {total}, expected 1"
                )));
            }
        }
        Ok(())
    }

    fn check_site(&self, chromosome: usize, position: Locus) -> Result<(), ConfigError> {
        let lengths = &self.options.chromosome_lengths;
        let length = *lengths.get(chromosome).ok_or(ConfigError::UnknownChromosome {
            chromosome,
            count: lengths.len(),
        })?;
        let x = position.get();
        if !(x.is_finite() && x >= 0.0 && x < length) {
            return Err(ConfigError::SiteOutOfBounds {
                chromosome,
                position,
                length,
            });
        }
        Ok(())
    }

    fn check_subpopulation(&self, subpopulation: usize, context: &'static str) -> Result<(), ConfigError> {
        if subpopulation >= demography::max_subpopulations(&self.demography) {
            return Err(ConfigError::UnknownSubpopulation {
                subpopulation,
                context,
            });
        }
        Ok(())
    }

    fn validate_selection(&self) -> Result<(), ConfigError> {
        let num_ancestries = self.num_ancestries();
        let mut seen = BTreeSet::new();
        for entry in &self.selection {
            self.check_site(entry.chromosome, entry.position)?;
            let invalid = |reason: String| ConfigError::InvalidSite {
                chromosome: entry.chromosome,
                position: entry.position,
                reason,
            };

            if entry.effects.len() != 1 && entry.effects.len() != num_ancestries {
                return Err(invalid(format!(
                    "expected 1 or {num_ancestries} effects, found {}",
                    entry.effects.len()
                )));
            }
            if entry
                .effects
                .iter()
                .any(|e| !(e.selection.is_finite() && e.dominance.is_finite()))
            {
                return Err(invalid("selection and dominance must be finite".into()));
            }
            if let Some(subpopulation) = entry.subpopulation {
                self.check_subpopulation(subpopulation, "selection")?;
            }
            if !seen.insert((entry.site(), entry.subpopulation, entry.sex)) {
                return Err(invalid("duplicate rule for the same subpopulation and sex".into()));
            }
        }
        Ok(())
    }

    fn selected_sites(&self) -> BTreeSet<SiteKey> {
        self.selection.iter().map(SelectionEntry::site).collect()
    }

    fn validate_frequencies(&self) -> Result<(), ConfigError> {
        let num_ancestries = self.num_ancestries();
        let selected = self.selected_sites();
        let mut seen = BTreeSet::new();
        for entry in &self.allele_frequencies {
            self.check_site(entry.chromosome, entry.position)?;
            if !selected.contains(&entry.site()) {
                return Err(ConfigError::UnknownSite {
                    chromosome: entry.chromosome,
                    position: entry.position,
                });
            }
            let invalid = |reason: String| ConfigError::InvalidSite {
                chromosome: entry.chromosome,
                position: entry.position,
                reason,
            };
            if entry.frequencies.len() != 1 && entry.frequencies.len() != num_ancestries {
                return Err(invalid(format!(
                    "expected 1 or {num_ancestries} frequencies, found {}",
                    entry.frequencies.len()
                )));
            }
            if entry.frequencies.iter().any(|f| !(0.0..=1.0).contains(f)) {
                return Err(invalid("frequencies must lie in [0, 1]".into()));
            }
            if !seen.insert(entry.site()) {
                return Err(invalid("duplicate frequency entry".into()));
            }
        }
        Ok(())
    }

    fn validate_tracked_sites(&self) -> Result<(), ConfigError> {
        let selected = self.selected_sites();
        for site in &self.options.tracked_sites {
            self.check_site(site.chromosome, site.position)?;
            if !selected.contains(site) {
                return Err(ConfigError::UnknownSite {
                    chromosome: site.chromosome,
                    position: site.position,
                });
            }
        }
        Ok(())
    }

    fn validate_output(&self) -> Result<(), ConfigError> {
        for pair in self.output.windows(2) {
            if pair[1].generation < pair[0].generation {
                return Err(ConfigError::OutputOrder {
                    previous: pair[0].generation,
                    current: pair[1].generation,
                });
            }
        }
        for entry in &self.output {
            for &subpopulation in entry.subpopulations.iter().flatten() {
                self.check_subpopulation(subpopulation, "output")?;
            }
        }
        Ok(())
    }
}
