//! Builder pattern for creating simulations.
//!
//! Provides a fluent API over [`Configuration`] for tests, benchmarks and
//! embedding. The builder fills in the same defaults as a JSON document with
//! the optional fields left out.

use crate::base::{Locus, SiteKey};
use crate::errors::SimulationError;
use crate::evolution::{CrossoverModel, FitnessCombination, SelectionEntry, SiteEffect};
use crate::genome::Sex;
use crate::simulation::{
    Configuration, DemographyEntry, FrequencyEntry, Options, OutputEntry, Simulation,
    SubpopulationSize,
};

/// Builder for constructing [`Simulation`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use tractsim_sim::simulation::SimulationBuilder;
///
/// // Two admixing subpopulations, neutral
/// let sim = SimulationBuilder::new()
///     .generations(10)
///     .chromosome(1.0)
///     .subpopulation(20, 20)
///     .subpopulation(20, 20)
///     .migration(vec![vec![0.0, 0.1], vec![0.1, 0.0]])
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(sim.num_ancestries(), 2);
///
/// // With a selected site carried by ancestry 0 only
/// let sim = SimulationBuilder::new()
///     .generations(10)
///     .chromosome(1.0)
///     .subpopulation(20, 20)
///     .subpopulation(20, 20)
///     .selected_site(0, 0.5, vec![(0.05, 0.5), (0.0, 0.5)])
///     .allele_frequency(0, 0.5, vec![1.0, 0.0])
///     .seed(42)
///     .build()
///     .unwrap();
/// assert!(!sim.selection().is_neutral());
/// ```
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    generations: usize,
    chromosome_lengths: Vec<f64>,
    founders: Vec<SubpopulationSize>,
    founder_migration: Vec<Vec<f64>>,
    later_entries: Vec<DemographyEntry>,
    selection: Vec<SelectionEntry>,
    allele_frequencies: Vec<FrequencyEntry>,
    ancestry_proportions: Option<Vec<Vec<f64>>>,
    tracked_sites: Vec<SiteKey>,
    output: Vec<OutputEntry>,
    seed: Option<u64>,
    stats_frequency: usize,
    garbage_frequency: usize,
    hermaphroditic: bool,
    crossover: CrossoverModel,
    fitness_combination: FitnessCombination,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self {
            generations: 1,
            chromosome_lengths: Vec::new(),
            founders: Vec::new(),
            founder_migration: Vec::new(),
            later_entries: Vec::new(),
            selection: Vec::new(),
            allele_frequencies: Vec::new(),
            ancestry_proportions: None,
            tracked_sites: Vec::new(),
            output: Vec::new(),
            seed: None,
            stats_frequency: 1,
            garbage_frequency: 10,
            hermaphroditic: false,
            crossover: CrossoverModel::default(),
            fitness_combination: FitnessCombination::default(),
        }
    }

    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Add a chromosome of `length` Morgans.
    pub fn chromosome(mut self, length: f64) -> Self {
        self.chromosome_lengths.push(length);
        self
    }

    /// Add a founding subpopulation to the generation-0 demography.
    pub fn subpopulation(mut self, males: usize, females: usize) -> Self {
        self.founders.push(SubpopulationSize::new(males, females));
        self
    }

    /// Migration matrix of the generation-0 demography, `[dest][source]`.
    pub fn migration(mut self, rates: Vec<Vec<f64>>) -> Self {
        self.founder_migration = rates;
        self
    }

    /// Add a later demography entry.
    pub fn demography_entry(
        mut self,
        generation: usize,
        subpopulations: Vec<SubpopulationSize>,
        migration: Vec<Vec<f64>>,
    ) -> Self {
        self.later_entries.push(DemographyEntry {
            generation,
            subpopulations,
            migration,
        });
        self
    }

    /// Add a site selected in every subpopulation and both sexes. `effects`
    /// holds one `(selection, dominance)` pair per ancestry.
    pub fn selected_site(self, chromosome: usize, position: f64, effects: Vec<(f64, f64)>) -> Self {
        self.selection_rule(chromosome, position, None, None, effects)
    }

    /// Add a selection rule restricted to a subpopulation and/or a sex.
    pub fn selection_rule(
        mut self,
        chromosome: usize,
        position: f64,
        subpopulation: Option<usize>,
        sex: Option<Sex>,
        effects: Vec<(f64, f64)>,
    ) -> Self {
        self.selection.push(SelectionEntry {
            chromosome,
            position: Locus::new(position),
            subpopulation,
            sex,
            effects: effects
                .into_iter()
                .map(|(selection, dominance)| SiteEffect::new(selection, dominance))
                .collect(),
        });
        self
    }

    /// Initial frequency of the mutation at a selected site, per ancestry
    /// (or a single value for all of them).
    pub fn allele_frequency(mut self, chromosome: usize, position: f64, frequencies: Vec<f64>) -> Self {
        self.allele_frequencies.push(FrequencyEntry {
            chromosome,
            position: Locus::new(position),
            frequencies,
        });
        self
    }

    /// Stop the run if this selected mutation is lost.
    pub fn tracked_site(mut self, chromosome: usize, position: f64) -> Self {
        self.tracked_sites.push(SiteKey::new(chromosome, position));
        self
    }

    /// `proportions[subpopulation][ancestry]` for the founders.
    pub fn ancestry_proportions(mut self, proportions: Vec<Vec<f64>>) -> Self {
        self.ancestry_proportions = Some(proportions);
        self
    }

    pub fn output(mut self, entry: OutputEntry) -> Self {
        self.output.push(entry);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn stats_frequency(mut self, every: usize) -> Self {
        self.stats_frequency = every;
        self
    }

    pub fn garbage_frequency(mut self, every: usize) -> Self {
        self.garbage_frequency = every;
        self
    }

    pub fn hermaphroditic(mut self, hermaphroditic: bool) -> Self {
        self.hermaphroditic = hermaphroditic;
        self
    }

    pub fn crossover(mut self, model: CrossoverModel) -> Self {
        self.crossover = model;
        self
    }

    pub fn fitness_combination(mut self, combination: FitnessCombination) -> Self {
        self.fitness_combination = combination;
        self
    }

    /// Assemble the configuration without validating it.
    pub fn build_config(self) -> Configuration {
        let mut demography = Vec::with_capacity(1 + self.later_entries.len());
        demography.push(DemographyEntry {
            generation: 0,
            subpopulations: self.founders,
            migration: self.founder_migration,
        });
        demography.extend(self.later_entries);

        Configuration {
            options: Options {
                generations: self.generations,
                chromosome_lengths: self.chromosome_lengths,
                stats_frequency: self.stats_frequency,
                garbage_frequency: self.garbage_frequency,
                hermaphroditic: self.hermaphroditic,
                tracked_sites: self.tracked_sites,
                seed: self.seed,
                crossover: self.crossover,
                fitness_combination: self.fitness_combination,
            },
            demography,
            selection: self.selection,
            ancestry_proportions: self.ancestry_proportions,
            allele_frequencies: self.allele_frequencies,
            output: self.output,
        }
    }

    /// Validate the configuration and initialize the founders.
    ///
    /// # Errors
    /// Any configuration error found by [`Configuration::validate`].
    pub fn build(self) -> Result<Simulation, SimulationError> {
        Simulation::new(self.build_config())
    }
}
