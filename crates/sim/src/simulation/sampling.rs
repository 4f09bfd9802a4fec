//! Fitness-weighted parent sampling.

use rand::distr::weighted::WeightedIndex;
use rand::Rng;

use crate::base::FitnessValue;
use crate::errors::SimulationError;
use crate::genome::{Individual, Sex};
use crate::simulation::{SourceAssignment, Subpopulation};

/// Draws member indices from one pool with probability proportional to
/// cached fitness.
#[derive(Debug, Clone)]
pub enum PoolSampler {
    /// Every member has the same positive fitness.
    Uniform(usize),
    Weighted(WeightedIndex<f64>),
}

impl PoolSampler {
    /// Returns `None` if no member of `pool` can be drawn (empty pool or
    /// zero total fitness).
    pub fn new(pool: &[Individual]) -> Option<Self> {
        let weights: Vec<f64> = pool
            .iter()
            .map(|ind| ind.cached_fitness().unwrap_or(FitnessValue::NEUTRAL).get())
            .collect();
        let first = *weights.first()?;
        if first > 0.0 && weights.iter().all(|&w| w == first) {
            return Some(PoolSampler::Uniform(weights.len()));
        }
        WeightedIndex::new(weights).ok().map(PoolSampler::Weighted)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            PoolSampler::Uniform(n) => rng.random_range(0..*n),
            PoolSampler::Weighted(weights) => rng.sample(weights),
        }
    }
}

/// A reference to a member of the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub subpopulation: usize,
    pub pool: Sex,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentPair {
    pub father: ParentRef,
    pub mother: ParentRef,
}

/// Parents of every offspring slot of one destination subpopulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentPlan {
    pub males: Vec<ParentPair>,
    pub females: Vec<ParentPair>,
}

impl ParentPlan {
    pub fn len(&self) -> usize {
        self.males.len() + self.females.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Samplers {
    males: Vec<Option<PoolSampler>>,
    females: Vec<Option<PoolSampler>>,
}

impl Samplers {
    fn new(subpopulations: &[Subpopulation], hermaphroditic: bool) -> Self {
        let males = subpopulations
            .iter()
            .map(|subpop| {
                if hermaphroditic {
                    None
                } else {
                    PoolSampler::new(subpop.males())
                }
            })
            .collect();
        let females = subpopulations
            .iter()
            .map(|subpop| PoolSampler::new(subpop.females()))
            .collect();
        Self { males, females }
    }

    fn draw<R: Rng + ?Sized>(
        &self,
        source: usize,
        pool: Sex,
        generation: usize,
        rng: &mut R,
    ) -> Result<ParentRef, SimulationError> {
        let (samplers, reason) = match pool {
            Sex::Male => (&self.males, "no male with positive fitness"),
            Sex::Female => (&self.females, "no female with positive fitness"),
        };
        let sampler = samplers
            .get(source)
            .and_then(Option::as_ref)
            .ok_or(SimulationError::PopulationCollapse {
                subpopulation: source,
                generation,
                reason,
            })?;
        Ok(ParentRef {
            subpopulation: source,
            pool,
            index: sampler.sample(rng),
        })
    }
}

/// Choose both parents of every offspring slot.
///
/// `sources` gives the source subpopulation of each slot. Fathers come from
/// the source's male pool and mothers from its female pool; in hermaphroditic
/// runs both come from the single (female) pool and may be the same
/// individual.
///
/// # Errors
/// `PopulationCollapse` if a pool that must supply a parent has no member
/// with positive fitness.
pub fn select_parents<R: Rng + ?Sized>(
    subpopulations: &[Subpopulation],
    sources: &[SourceAssignment],
    hermaphroditic: bool,
    generation: usize,
    rng: &mut R,
) -> Result<Vec<ParentPlan>, SimulationError> {
    let samplers = Samplers::new(subpopulations, hermaphroditic);
    let father_pool = if hermaphroditic { Sex::Female } else { Sex::Male };

    let mut pair = |source: usize| -> Result<ParentPair, SimulationError> {
        let father = samplers.draw(source, father_pool, generation, rng)?;
        let mother = samplers.draw(source, Sex::Female, generation, rng)?;
        Ok(ParentPair { father, mother })
    };

    let mut plans = Vec::with_capacity(sources.len());
    for assignment in sources {
        let males = assignment
            .males
            .iter()
            .map(|&source| pair(source))
            .collect::<Result<Vec<_>, _>>()?;
        let females = assignment
            .females
            .iter()
            .map(|&source| pair(source))
            .collect::<Result<Vec<_>, _>>()?;
        plans.push(ParentPlan { males, females });
    }
    Ok(plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{AncestryBlock, AncestryId, BlockArena, Locus};
    use crate::genome::{Chromosome, Haplotype};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn member(arena: &mut BlockArena, sex: Sex, fitness: f64) -> Individual {
        let mut hap = || -> Haplotype {
            let id = arena.allocate(AncestryBlock::new(0.0, 1.0, AncestryId::new(0), Vec::<Locus>::new()));
            [Chromosome::founder(id)].into_iter().collect()
        };
        let (h1, h2) = (hap(), hap());
        let mut ind = Individual::new(sex, h1, h2);
        ind.set_cached_fitness(fitness);
        ind
    }

    #[test]
    fn test_pool_sampler_variants() {
        let mut arena = BlockArena::new();
        let equal: Vec<_> = (0..3).map(|_| member(&mut arena, Sex::Male, 1.0)).collect();
        assert!(matches!(PoolSampler::new(&equal), Some(PoolSampler::Uniform(3))));

        let mixed = vec![member(&mut arena, Sex::Male, 0.5), member(&mut arena, Sex::Male, 1.5)];
        assert!(matches!(PoolSampler::new(&mixed), Some(PoolSampler::Weighted(_))));

        let dead = vec![member(&mut arena, Sex::Male, 0.0), member(&mut arena, Sex::Male, 0.0)];
        assert!(PoolSampler::new(&dead).is_none());
        assert!(PoolSampler::new(&[]).is_none());
    }

    #[test]
    fn test_zero_fitness_members_never_drawn() {
        let mut arena = BlockArena::new();
        let pool = vec![
            member(&mut arena, Sex::Female, 0.0),
            member(&mut arena, Sex::Female, 2.0),
            member(&mut arena, Sex::Female, 0.0),
        ];
        let sampler = PoolSampler::new(&pool).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        assert!((0..500).all(|_| sampler.sample(&mut rng) == 1));
    }

    #[test]
    fn test_weighted_sampling_follows_fitness() {
        let mut arena = BlockArena::new();
        let pool = vec![member(&mut arena, Sex::Female, 1.0), member(&mut arena, Sex::Female, 3.0)];
        let sampler = PoolSampler::new(&pool).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4);
        let draws = 20_000;
        let heavy = (0..draws).filter(|_| sampler.sample(&mut rng) == 1).count();
        let fraction = heavy as f64 / draws as f64;
        assert!((fraction - 0.75).abs() < 0.02, "fraction {fraction}");
    }

    #[test]
    fn test_select_parents_matches_slot_counts() {
        let mut arena = BlockArena::new();
        let subpops = vec![Subpopulation::with_individuals(
            vec![member(&mut arena, Sex::Male, 1.0)],
            vec![member(&mut arena, Sex::Female, 1.0), member(&mut arena, Sex::Female, 1.0)],
        )];
        let sources = vec![SourceAssignment {
            males: vec![0; 4],
            females: vec![0; 6],
        }];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let plans = select_parents(&subpops, &sources, false, 1, &mut rng).unwrap();

        assert_eq!(plans[0].males.len(), 4);
        assert_eq!(plans[0].females.len(), 6);
        for pair in plans[0].males.iter().chain(&plans[0].females) {
            assert_eq!(pair.father.pool, Sex::Male);
            assert_eq!(pair.father.index, 0);
            assert_eq!(pair.mother.pool, Sex::Female);
            assert!(pair.mother.index < 2);
        }
    }

    #[test]
    fn test_hermaphroditic_parents_come_from_single_pool() {
        let mut arena = BlockArena::new();
        let subpops = vec![Subpopulation::with_individuals(
            Vec::new(),
            vec![member(&mut arena, Sex::Female, 1.0)],
        )];
        let sources = vec![SourceAssignment {
            males: Vec::new(),
            females: vec![0; 3],
        }];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let plans = select_parents(&subpops, &sources, true, 1, &mut rng).unwrap();

        for pair in &plans[0].females {
            assert_eq!(pair.father, pair.mother);
            assert_eq!(pair.father.pool, Sex::Female);
        }
    }

    #[test]
    fn test_collapse_when_pool_cannot_supply_parents() {
        let mut arena = BlockArena::new();
        let subpops = vec![Subpopulation::with_individuals(
            vec![member(&mut arena, Sex::Male, 0.0)],
            vec![member(&mut arena, Sex::Female, 1.0)],
        )];
        let sources = vec![SourceAssignment {
            males: vec![0],
            females: Vec::new(),
        }];
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let err = select_parents(&subpops, &sources, false, 7, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::PopulationCollapse {
                subpopulation: 0,
                generation: 7,
                ..
            }
        ));
    }
}
