use serde::{Deserialize, Serialize};

use crate::base::{BlockId, FitnessValue};
use crate::genome::Haplotype;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// A diploid individual.
///
/// `haplotype1` is the paternal copy and `haplotype2` the maternal copy. The
/// cached fitness is `None` until the fitness phase of a generation fills it
/// in; offspring always start without one.
#[derive(Debug, Clone)]
pub struct Individual {
    sex: Sex,
    haplotype1: Haplotype,
    haplotype2: Haplotype,
    fitness: Option<FitnessValue>,
}

impl Individual {
    pub fn new(sex: Sex, haplotype1: Haplotype, haplotype2: Haplotype) -> Self {
        debug_assert_eq!(haplotype1.len(), haplotype2.len());
        Self {
            sex,
            haplotype1,
            haplotype2,
            fitness: None,
        }
    }

    #[inline]
    pub fn sex(&self) -> Sex {
        self.sex
    }

    /// Borrow the paternal haplotype.
    #[inline]
    pub fn haplotype1(&self) -> &Haplotype {
        &self.haplotype1
    }

    /// Borrow the maternal haplotype.
    #[inline]
    pub fn haplotype2(&self) -> &Haplotype {
        &self.haplotype2
    }

    /// Borrow both haplotypes as a pair of references.
    #[inline]
    pub fn haplotypes(&self) -> (&Haplotype, &Haplotype) {
        (&self.haplotype1, &self.haplotype2)
    }

    /// Return the cached fitness value for this individual.
    ///
    /// Returns `None` if the fitness has not yet been computed.
    #[inline]
    pub fn cached_fitness(&self) -> Option<FitnessValue> {
        self.fitness
    }

    #[inline]
    pub fn set_cached_fitness(&mut self, fitness: impl Into<FitnessValue>) {
        self.fitness = Some(fitness.into());
    }

    #[inline]
    pub fn clear_cached_fitness(&mut self) {
        self.fitness = None;
    }

    /// Every block handle this individual keeps alive.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.haplotype1.block_ids().chain(self.haplotype2.block_ids())
    }
}
