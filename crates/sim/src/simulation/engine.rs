//! Simulation engine for admixture with selection.
//!
//! This module provides the generation step that orchestrates garbage
//! collection, fitness evaluation, demographic change, migration, parent
//! sampling and reproduction.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::{debug, info};

use crate::base::{BlockArena, SiteKey};
use crate::errors::SimulationError;
use crate::evolution::SelectionModel;
use crate::genome::Individual;
use crate::simulation::{
    assign_sources, create_offspring, initialize_ancestry, select_parents, Configuration,
    DemographySchedule, MigrationMatrix, Subpopulation, SubpopulationSize,
    SubpopulationSnapshot,
};

/// Main simulation engine.
#[derive(Debug)]
pub struct Simulation {
    config: Configuration,
    schedule: DemographySchedule,
    selection: SelectionModel,
    /// Owner of every ancestry block referenced by the population.
    arena: BlockArena,
    subpopulations: Vec<Subpopulation>,
    migration: MigrationMatrix,
    /// Index of the demography entry in force.
    active_entry: Option<usize>,
    /// Master generator; per-offspring streams are seeded from it.
    rng: Xoshiro256PlusPlus,
    generation: usize,
    num_ancestries: usize,
    blocks_freed: usize,
}

impl Simulation {
    /// Validate `config` and build the founding generation.
    ///
    /// # Errors
    /// Returns [`SimulationError::Config`] if validation fails.
    pub fn new(config: Configuration) -> Result<Self, SimulationError> {
        config.validate()?;
        let schedule = DemographySchedule::new(config.demography.clone(), config.options.hermaphroditic)?;
        let selection = SelectionModel::new(&config.selection, config.options.fitness_combination);
        let num_ancestries = config.num_ancestries();

        // Unseeded runs take their seed from the OS-seeded thread generator.
        let rng = match config.options.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };

        let mut sim = Self {
            config,
            schedule,
            selection,
            arena: BlockArena::new(),
            subpopulations: Vec::new(),
            migration: MigrationMatrix::default(),
            active_entry: None,
            rng,
            generation: 0,
            num_ancestries,
            blocks_freed: 0,
        };

        sim.update_demography(0);
        initialize_ancestry(&sim.config, &mut sim.arena, &mut sim.subpopulations, &mut sim.rng);
        sim.debug_check_partitions();
        info!(
            subpopulations = sim.subpopulations.len(),
            ancestries = sim.num_ancestries,
            blocks = sim.arena.live(),
            "initialized founding generation"
        );
        Ok(sim)
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// The generation of the current population.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn arena(&self) -> &BlockArena {
        &self.arena
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn subpopulations(&self) -> &[Subpopulation] {
        &self.subpopulations
    }

    pub fn num_ancestries(&self) -> usize {
        self.num_ancestries
    }

    pub fn chromosome_lengths(&self) -> &[f64] {
        &self.config.options.chromosome_lengths
    }

    /// Total number of blocks reclaimed by garbage collection so far.
    pub fn blocks_freed(&self) -> usize {
        self.blocks_freed
    }

    /// Sizes of the current pools.
    pub fn sizes(&self) -> Vec<SubpopulationSize> {
        self.subpopulations.iter().map(Subpopulation::size).collect()
    }

    /// A read-only view of subpopulation `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a subpopulation slot.
    pub fn snapshot(&self, index: usize) -> SubpopulationSnapshot<'_> {
        SubpopulationSnapshot {
            index,
            subpopulation: &self.subpopulations[index],
            arena: &self.arena,
            chromosome_lengths: &self.config.options.chromosome_lengths,
            num_ancestries: self.num_ancestries,
            selection: &self.selection,
            generation: self.generation,
        }
    }

    /// Advance the simulation by one generation.
    ///
    /// # Errors
    /// `TrackedSiteLost` if a tracked site has no carrier at a check
    /// generation, `PopulationCollapse` if parents cannot be drawn. On error
    /// the current population is left untouched.
    pub fn step(&mut self) -> Result<(), SimulationError> {
        let generation = self.generation + 1;
        let options = &self.config.options;

        if !options.tracked_sites.is_empty() && generation % options.stats_frequency == 0 {
            self.check_tracked_sites(generation)?;
        }
        if generation % self.config.options.garbage_frequency == 0 {
            self.garbage_collect();
        }

        self.compute_fitness();
        self.update_demography(generation);

        let targets: Vec<SubpopulationSize> = self.subpopulations.iter().map(Subpopulation::target).collect();
        let sources = assign_sources(&self.migration, &targets, generation, &mut self.rng)?;
        let parents = select_parents(
            &self.subpopulations,
            &sources,
            self.config.options.hermaphroditic,
            generation,
            &mut self.rng,
        )?;
        debug!(generation, offspring = parents.iter().map(|p| p.len()).sum::<usize>(), "parents selected");

        create_offspring(
            &mut self.arena,
            &mut self.subpopulations,
            &parents,
            &self.config.options.chromosome_lengths,
            self.config.options.crossover,
            self.config.options.hermaphroditic,
            &mut self.rng,
        );
        self.add_offspring();
        self.generation = generation;
        self.debug_check_partitions();

        debug!(generation, blocks = self.arena.live(), "generation complete");
        Ok(())
    }

    /// Run `generations` steps without reporting.
    ///
    /// # Errors
    /// Propagates the first error from [`Simulation::step`].
    pub fn run_for(&mut self, generations: usize) -> Result<(), SimulationError> {
        for _ in 0..generations {
            self.step()?;
        }
        Ok(())
    }

    /// Cache the fitness of every current individual.
    pub fn compute_fitness(&mut self) {
        for (index, subpop) in self.subpopulations.iter_mut().enumerate() {
            subpop.update_fitness(&self.arena, &self.selection, index);
        }
    }

    /// Activate the demography entry in force at `generation`.
    ///
    /// New subpopulation slots start empty; their first offspring must come
    /// from migration.
    pub fn update_demography(&mut self, generation: usize) {
        let index = self.schedule.active_index(generation);
        if self.active_entry == Some(index) {
            return;
        }
        let entry = &self.schedule.entries()[index];
        let slots = self.subpopulations.len().max(entry.subpopulations.len());
        self.subpopulations.resize_with(slots, Subpopulation::default);

        for (subpopulation, subpop) in self.subpopulations.iter_mut().enumerate() {
            let previous = subpop.target();
            let target = entry.size_of(subpopulation);
            if self.active_entry.is_some() {
                if previous.is_empty() && !target.is_empty() {
                    info!(generation, subpopulation, size = target.total(), "subpopulation created");
                } else if !previous.is_empty() && target.is_empty() {
                    info!(generation, subpopulation, "subpopulation removed");
                } else if previous != target {
                    info!(
                        generation,
                        subpopulation,
                        males = target.males,
                        females = target.females,
                        "subpopulation resized"
                    );
                }
            }
            subpop.set_target(target);
        }

        self.migration = MigrationMatrix::from_entry(entry, slots);
        self.active_entry = Some(index);
    }

    /// Replace every pool with its offspring, dropping the old generation.
    fn add_offspring(&mut self) {
        for subpop in &mut self.subpopulations {
            subpop.commit_offspring();
        }
    }

    fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.subpopulations.iter().flat_map(Subpopulation::individuals)
    }

    /// Carrier counts (haplotype copies) for every tracked site, over the
    /// whole population.
    pub fn tracked_site_counts(&self) -> BTreeMap<SiteKey, usize> {
        let mut counts: BTreeMap<SiteKey, usize> = self
            .config
            .options
            .tracked_sites
            .iter()
            .map(|&site| (site, 0))
            .collect();
        let tracked_chromosomes: Vec<bool> = (0..self.chromosome_lengths().len())
            .map(|chromosome| counts.keys().any(|site| site.chromosome == chromosome))
            .collect();

        for ind in self.individuals() {
            let (h1, h2) = ind.haplotypes();
            for haplotype in [h1, h2] {
                for (chromosome, chrom) in haplotype.iter().enumerate() {
                    if !tracked_chromosomes[chromosome] {
                        continue;
                    }
                    for block in chrom.iter_blocks(&self.arena) {
                        for &position in block.mutations() {
                            if let Some(count) = counts.get_mut(&SiteKey { chromosome, position }) {
                                *count += 1;
                            }
                        }
                    }
                }
            }
        }
        counts
    }

    fn check_tracked_sites(&self, generation: usize) -> Result<(), SimulationError> {
        let counts = self.tracked_site_counts();
        for (site, &count) in &counts {
            info!(generation, chromosome = site.chromosome, position = site.position.get(), count, "tracked site");
        }
        match counts.iter().find(|&(_, &count)| count == 0) {
            Some((site, _)) => Err(SimulationError::TrackedSiteLost {
                generation,
                chromosome: site.chromosome,
                position: site.position,
            }),
            None => Ok(()),
        }
    }

    /// Free every block no current individual references.
    ///
    /// Returns the number of freed blocks.
    pub fn garbage_collect(&mut self) -> usize {
        let allocated = self.arena.allocated_since_sweep();
        let roots: Vec<_> = self
            .subpopulations
            .iter()
            .flat_map(Subpopulation::block_ids)
            .collect();
        let freed = self.arena.sweep(roots);
        self.blocks_freed += freed;
        info!(
            generation = self.generation,
            allocated,
            freed,
            live = self.arena.live(),
            "garbage collection"
        );
        freed
    }

    fn debug_check_partitions(&self) {
        if cfg!(debug_assertions) {
            let lengths = self.chromosome_lengths();
            for ind in self.individuals() {
                let (h1, h2) = ind.haplotypes();
                for haplotype in [h1, h2] {
                    for (chrom, &length) in haplotype.iter().zip(lengths) {
                        if let Err(err) = chrom.check_partition(&self.arena, length) {
                            panic!("chromosome partition violated at generation {}: {err}", self.generation);
                        }
                    }
                }
            }
        }
    }
}
