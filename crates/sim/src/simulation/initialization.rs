//! Founding generation.
//!
//! Every founder is single-ancestry: each of its chromosomes is one block
//! spanning the whole chromosome, tagged with the founder's ancestry. The
//! number of founders of each ancestry in a subpopulation is apportioned
//! from the configured proportions by the largest-remainder method, separately
//! for males and females. Selected mutations are then sprinkled onto the
//! founding blocks with the per-ancestry allele frequencies.

use rand::Rng;

use crate::base::{AncestryBlock, AncestryId, BlockArena, Locus};
use crate::genome::{Chromosome, Haplotype, Individual, Sex};
use crate::simulation::{Configuration, FrequencyEntry, Subpopulation};

/// Split `total` into integer counts proportional to `proportions`.
///
/// Floors first, then hands the remaining units to the largest fractional
/// remainders (ties go to the lower index). The result always sums to
/// `total`.
pub fn apportion(proportions: &[f64], total: usize) -> Vec<usize> {
    if proportions.is_empty() {
        return Vec::new();
    }
    let sum: f64 = proportions.iter().sum();
    let quotas: Vec<f64> = proportions
        .iter()
        .map(|&p| if sum > 0.0 { p / sum * total as f64 } else { 0.0 })
        .collect();
    let mut counts: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();

    let assigned: usize = counts.iter().sum();
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &index in order.iter().cycle().take(total.saturating_sub(assigned)) {
        counts[index] += 1;
    }
    counts
}

/// Founding ancestry proportions for `subpopulation`.
fn founding_proportions(config: &Configuration, subpopulation: usize, num_ancestries: usize) -> Vec<f64> {
    match &config.ancestry_proportions {
        Some(rows) => rows[subpopulation].clone(),
        None => (0..num_ancestries)
            .map(|ancestry| if ancestry == subpopulation { 1.0 } else { 0.0 })
            .collect(),
    }
}

/// Allele-frequency entries grouped by chromosome, in position order.
fn frequencies_by_chromosome(config: &Configuration) -> Vec<Vec<&FrequencyEntry>> {
    let mut grouped = vec![Vec::new(); config.options.chromosome_lengths.len()];
    for entry in &config.allele_frequencies {
        grouped[entry.chromosome].push(entry);
    }
    for entries in &mut grouped {
        entries.sort_by_key(|entry| entry.position);
    }
    grouped
}

fn founder_haplotype<R: Rng + ?Sized>(
    arena: &mut BlockArena,
    lengths: &[f64],
    frequencies: &[Vec<&FrequencyEntry>],
    ancestry: AncestryId,
    rng: &mut R,
) -> Haplotype {
    lengths
        .iter()
        .zip(frequencies)
        .map(|(&length, sites)| {
            let mutations: Vec<Locus> = sites
                .iter()
                .filter(|site| rng.random::<f64>() < site.frequency(ancestry.index()))
                .map(|site| site.position)
                .collect();
            Chromosome::founder(arena.allocate(AncestryBlock::new(0.0, length, ancestry, mutations)))
        })
        .collect()
}

/// Build the founding individuals of every subpopulation.
///
/// `subpopulations` must already carry the generation-0 targets.
pub fn initialize_ancestry<R: Rng + ?Sized>(
    config: &Configuration,
    arena: &mut BlockArena,
    subpopulations: &mut [Subpopulation],
    rng: &mut R,
) {
    let num_ancestries = config.num_ancestries();
    let lengths = &config.options.chromosome_lengths;
    let frequencies = frequencies_by_chromosome(config);

    for (index, subpopulation) in subpopulations.iter_mut().enumerate() {
        let target = subpopulation.target();
        if target.is_empty() {
            continue;
        }
        let proportions = founding_proportions(config, index, num_ancestries);

        for (sex, count) in [(Sex::Male, target.males), (Sex::Female, target.females)] {
            for (ancestry, founders) in apportion(&proportions, count).into_iter().enumerate() {
                let ancestry = AncestryId::new(ancestry as u16);
                for _ in 0..founders {
                    let h1 = founder_haplotype(arena, lengths, &frequencies, ancestry, rng);
                    let h2 = founder_haplotype(arena, lengths, &frequencies, ancestry, rng);
                    subpopulation.push_offspring(Individual::new(sex, h1, h2));
                }
            }
        }
        subpopulation.commit_offspring();
    }
}
