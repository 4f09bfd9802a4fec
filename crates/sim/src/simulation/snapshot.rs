use std::collections::BTreeMap;

use crate::base::{BlockArena, Locus};
use crate::evolution::SelectionModel;
use crate::genome::{Chromosome, Individual};
use crate::simulation::{Subpopulation, SubpopulationSize};

/// Read-only view of one subpopulation for computing statistics.
#[derive(Debug, Clone, Copy)]
pub struct SubpopulationSnapshot<'a> {
    pub(crate) index: usize,
    pub(crate) subpopulation: &'a Subpopulation,
    pub(crate) arena: &'a BlockArena,
    pub(crate) chromosome_lengths: &'a [f64],
    pub(crate) num_ancestries: usize,
    pub(crate) selection: &'a SelectionModel,
    pub(crate) generation: usize,
}

impl<'a> SubpopulationSnapshot<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn arena(&self) -> &'a BlockArena {
        self.arena
    }

    pub fn chromosome_lengths(&self) -> &'a [f64] {
        self.chromosome_lengths
    }

    pub fn num_ancestries(&self) -> usize {
        self.num_ancestries
    }

    pub fn size(&self) -> SubpopulationSize {
        self.subpopulation.size()
    }

    /// Members, males first.
    pub fn individuals(&self) -> impl Iterator<Item = &'a Individual> + 'a {
        self.subpopulation.individuals()
    }

    /// Number of haplotypes (twice the number of individuals).
    pub fn haplotype_count(&self) -> usize {
        2 * self.size().total()
    }

    /// Every copy of chromosome `chromosome` in the subpopulation.
    pub fn chromosomes(&self, chromosome: usize) -> impl Iterator<Item = &'a Chromosome> + 'a {
        self.individuals().flat_map(move |ind| {
            let (h1, h2) = ind.haplotypes();
            [&h1[chromosome], &h2[chromosome]]
        })
    }

    /// Fraction of the genetic material on `chromosome` from each ancestry,
    /// weighted by block length. All zeros for an empty subpopulation.
    pub fn ancestry_proportions(&self, chromosome: usize) -> Vec<f64> {
        let mut totals = vec![0.0; self.num_ancestries];
        for chrom in self.chromosomes(chromosome) {
            for block in chrom.iter_blocks(self.arena) {
                totals[block.ancestry().index()] += block.length();
            }
        }
        let denominator = self.haplotype_count() as f64 * self.chromosome_lengths[chromosome];
        if denominator > 0.0 {
            for total in &mut totals {
                *total /= denominator;
            }
        }
        totals
    }

    /// Frequency of every selected mutation on `chromosome`, as the fraction
    /// of haplotypes carrying it.
    pub fn site_frequencies(&self, chromosome: usize) -> BTreeMap<Locus, f64> {
        let mut counts: BTreeMap<Locus, usize> = self
            .selection
            .sites_on(chromosome)
            .map(|position| (position, 0))
            .collect();
        for chrom in self.chromosomes(chromosome) {
            for block in chrom.iter_blocks(self.arena) {
                for position in block.mutations() {
                    if let Some(count) = counts.get_mut(position) {
                        *count += 1;
                    }
                }
            }
        }
        let haplotypes = self.haplotype_count();
        counts
            .into_iter()
            .map(|(position, count)| {
                let frequency = if haplotypes > 0 {
                    count as f64 / haplotypes as f64
                } else {
                    0.0
                };
                (position, frequency)
            })
            .collect()
    }
}
