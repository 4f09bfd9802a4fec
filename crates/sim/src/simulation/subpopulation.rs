use rayon::prelude::*;

use crate::base::{BlockArena, BlockId, FitnessValue};
use crate::evolution::{IndividualFitness, SelectionModel};
use crate::genome::{Individual, Sex};
use crate::simulation::SubpopulationSize;

/// One deme: the current male and female pools, the target size from the
/// demography schedule, and the offspring being built for the next
/// generation.
///
/// In hermaphroditic runs every individual lives in the female pool.
#[derive(Debug, Clone, Default)]
pub struct Subpopulation {
    males: Vec<Individual>,
    females: Vec<Individual>,
    target: SubpopulationSize,
    offspring_males: Vec<Individual>,
    offspring_females: Vec<Individual>,
}

impl Subpopulation {
    pub fn new(target: SubpopulationSize) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn with_individuals(males: Vec<Individual>, females: Vec<Individual>) -> Self {
        let target = SubpopulationSize::new(males.len(), females.len());
        Self {
            males,
            females,
            target,
            ..Self::default()
        }
    }

    #[inline]
    pub fn males(&self) -> &[Individual] {
        &self.males
    }

    #[inline]
    pub fn females(&self) -> &[Individual] {
        &self.females
    }

    #[inline]
    pub fn pool(&self, sex: Sex) -> &[Individual] {
        match sex {
            Sex::Male => &self.males,
            Sex::Female => &self.females,
        }
    }

    /// Current members, males first.
    pub fn individuals(&self) -> impl Iterator<Item = &Individual> {
        self.males.iter().chain(self.females.iter())
    }

    /// Target size for the offspring generation.
    #[inline]
    pub fn target(&self) -> SubpopulationSize {
        self.target
    }

    pub fn set_target(&mut self, target: SubpopulationSize) {
        self.target = target;
    }

    /// Actual size of the current pools.
    pub fn size(&self) -> SubpopulationSize {
        SubpopulationSize::new(self.males.len(), self.females.len())
    }

    pub fn is_empty(&self) -> bool {
        self.males.is_empty() && self.females.is_empty()
    }

    /// Compute fitness values for all members, males first.
    pub fn compute_fitness(&self, arena: &BlockArena, selection: &SelectionModel, index: usize) -> Vec<FitnessValue> {
        if selection.is_neutral() {
            return vec![FitnessValue::NEUTRAL; self.males.len() + self.females.len()];
        }
        self.males
            .par_iter()
            .chain(self.females.par_iter())
            .map(|ind| selection.individual_fitness(arena, ind, index))
            .collect()
    }

    /// Recompute and cache the fitness of every member.
    pub fn update_fitness(&mut self, arena: &BlockArena, selection: &SelectionModel, index: usize) {
        let fitness_values = self.compute_fitness(arena, selection, index);
        for (ind, fitness) in self
            .males
            .iter_mut()
            .chain(self.females.iter_mut())
            .zip(fitness_values)
        {
            ind.set_cached_fitness(fitness);
        }
    }

    /// Queue an offspring for the next generation.
    pub fn push_offspring(&mut self, offspring: Individual) {
        match offspring.sex() {
            Sex::Male => self.offspring_males.push(offspring),
            Sex::Female => self.offspring_females.push(offspring),
        }
    }

    pub fn offspring_size(&self) -> SubpopulationSize {
        SubpopulationSize::new(self.offspring_males.len(), self.offspring_females.len())
    }

    /// Replace the current pools with the queued offspring.
    pub fn commit_offspring(&mut self) {
        self.males = std::mem::take(&mut self.offspring_males);
        self.females = std::mem::take(&mut self.offspring_females);
    }

    /// Every block handle referenced by the current pools.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.individuals().flat_map(Individual::block_ids)
    }
}
