//! Offspring construction.
//!
//! Offspring are planned in parallel, each with its own RNG seeded from a
//! value drawn sequentially from the master RNG, and committed to the arena
//! sequentially in slot order. The result depends only on the master seed,
//! not on the number of threads.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;

use crate::base::BlockArena;
use crate::evolution::{commit_gamete, sample_gamete, CrossoverModel, Segment};
use crate::genome::{Haplotype, Individual, Sex};
use crate::simulation::{ParentPlan, ParentRef, Subpopulation};

/// The planned genome of one offspring, not yet allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct OffspringPlan {
    sex: Sex,
    paternal: Vec<Vec<Segment>>,
    maternal: Vec<Vec<Segment>>,
}

impl OffspringPlan {
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Allocate the planned pieces and build the individual.
    pub fn commit(self, arena: &mut BlockArena) -> Individual {
        let paternal: Haplotype = self
            .paternal
            .iter()
            .map(|segments| commit_gamete(arena, segments))
            .collect();
        let maternal: Haplotype = self
            .maternal
            .iter()
            .map(|segments| commit_gamete(arena, segments))
            .collect();
        Individual::new(self.sex, paternal, maternal)
    }
}

/// Plan one gamete per chromosome from each parent.
pub fn plan_offspring<R: Rng + ?Sized>(
    arena: &BlockArena,
    father: &Individual,
    mother: &Individual,
    sex: Sex,
    lengths: &[f64],
    model: CrossoverModel,
    rng: &mut R,
) -> OffspringPlan {
    let paternal = lengths
        .iter()
        .enumerate()
        .map(|(chromosome, &length)| sample_gamete(arena, father, chromosome, length, model, rng))
        .collect();
    let maternal = lengths
        .iter()
        .enumerate()
        .map(|(chromosome, &length)| sample_gamete(arena, mother, chromosome, length, model, rng))
        .collect();
    OffspringPlan {
        sex,
        paternal,
        maternal,
    }
}

/// Sample and commit one offspring.
pub fn make_offspring<R: Rng + ?Sized>(
    arena: &mut BlockArena,
    father: &Individual,
    mother: &Individual,
    sex: Sex,
    lengths: &[f64],
    model: CrossoverModel,
    rng: &mut R,
) -> Individual {
    plan_offspring(arena, father, mother, sex, lengths, model, rng).commit(arena)
}

fn parent<'a>(subpopulations: &'a [Subpopulation], parent: ParentRef) -> &'a Individual {
    &subpopulations[parent.subpopulation].pool(parent.pool)[parent.index]
}

/// Build every offspring of the next generation and queue it in its
/// destination subpopulation.
///
/// In hermaphroditic runs every offspring is female.
pub fn create_offspring(
    arena: &mut BlockArena,
    subpopulations: &mut [Subpopulation],
    parents: &[ParentPlan],
    lengths: &[f64],
    model: CrossoverModel,
    hermaphroditic: bool,
    rng: &mut Xoshiro256PlusPlus,
) {
    let male_sex = if hermaphroditic { Sex::Female } else { Sex::Male };
    let jobs: Vec<(usize, Sex, ParentRef, ParentRef)> = parents
        .iter()
        .enumerate()
        .flat_map(|(dest, plan)| {
            let males = plan.males.iter().map(move |p| (dest, male_sex, p.father, p.mother));
            let females = plan
                .females
                .iter()
                .map(move |p| (dest, Sex::Female, p.father, p.mother));
            males.chain(females)
        })
        .collect();

    // Generate seeds for each offspring
    let seeds: Vec<u64> = (0..jobs.len()).map(|_| rng.random()).collect();

    let plans: Vec<(usize, OffspringPlan)> = {
        let arena: &BlockArena = arena;
        let population: &[Subpopulation] = subpopulations;
        jobs.par_iter()
            .zip(seeds.par_iter())
            .map(|(&(dest, sex, father, mother), &seed)| {
                let mut local_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                let plan = plan_offspring(
                    arena,
                    parent(population, father),
                    parent(population, mother),
                    sex,
                    lengths,
                    model,
                    &mut local_rng,
                );
                (dest, plan)
            })
            .collect()
    };

    for (dest, plan) in plans {
        let offspring = plan.commit(arena);
        subpopulations[dest].push_offspring(offspring);
    }
}
