//! Ancestry composition analysis
//!
//! Functions for measuring how much of a chromosome descends from each
//! ancestral source population.
//!
//! These functions are flexible and work at multiple levels:
//! - Subpopulation level: No indices specified
//! - Individual level: Only individual_idx specified
//! - Haplotype level: individual_idx and haplotype_idx specified

use std::collections::BTreeMap;

use tractsim_sim::base::{BlockArena, Locus};
use tractsim_sim::genome::Chromosome;
use tractsim_sim::simulation::SubpopulationSnapshot;

/// Calculate length-weighted ancestry proportions flexibly based on provided
/// indices
///
/// This function adapts to different levels of analysis:
/// - **Subpopulation level**: `ancestry_composition(snap, None, None, c)` - Mean across all haplotypes
/// - **Individual level**: `ancestry_composition(snap, Some(i), None, c)` - Mean across both haplotypes
/// - **Haplotype level**: `ancestry_composition(snap, Some(i), Some(h), c)` - Single chromosome copy
///
/// # Arguments
///
/// * `snapshot` - The subpopulation to analyze
/// * `individual_idx` - Optional index of individual (males first)
/// * `haplotype_idx` - Optional haplotype index (0 paternal, 1 maternal)
/// * `chromosome` - Chromosome index
///
/// # Returns
///
/// One proportion per ancestry, summing to 1 unless there is nothing to
/// measure (empty subpopulation, index out of range), in which case all are
/// zero.
///
/// # Examples
///
/// ```
/// use tractsim_analysis::analysis::composition::ancestry_composition;
/// use tractsim_sim::simulation::SimulationBuilder;
///
/// let sim = SimulationBuilder::new()
///     .chromosome(1.0)
///     .subpopulation(2, 2)
///     .subpopulation(2, 2)
///     .seed(1)
///     .build()
///     .unwrap();
/// let snapshot = sim.snapshot(1);
///
/// // Subpopulation-wide proportions
/// assert_eq!(ancestry_composition(&snapshot, None, None, 0), vec![0.0, 1.0]);
///
/// // A single maternal chromosome copy
/// assert_eq!(ancestry_composition(&snapshot, Some(0), Some(1), 0), vec![0.0, 1.0]);
/// ```
pub fn ancestry_composition(
    snapshot: &SubpopulationSnapshot<'_>,
    individual_idx: Option<usize>,
    haplotype_idx: Option<usize>,
    chromosome: usize,
) -> Vec<f64> {
    match (individual_idx, haplotype_idx) {
        // Subpopulation level: every chromosome copy
        (None, None) => snapshot.ancestry_proportions(chromosome),

        // Individual level: both haplotypes
        (Some(ind_idx), None) => {
            let mut totals = vec![0.0; snapshot.num_ancestries()];
            let copies = chromosome_copies(snapshot, ind_idx, chromosome);
            for chrom in &copies {
                accumulate(&mut totals, snapshot.arena(), chrom);
            }
            normalize(&mut totals, copies.len() as f64 * snapshot.chromosome_lengths()[chromosome]);
            totals
        }

        // Haplotype level: one chromosome copy
        (Some(ind_idx), Some(hap_idx)) => {
            let mut totals = vec![0.0; snapshot.num_ancestries()];
            if let Some(chrom) = chromosome_copies(snapshot, ind_idx, chromosome).get(hap_idx) {
                accumulate(&mut totals, snapshot.arena(), chrom);
                normalize(&mut totals, snapshot.chromosome_lengths()[chromosome]);
            }
            totals
        }

        (None, Some(_)) => {
            tracing::warn!("invalid index combination for ancestry_composition; use None for all higher levels");
            vec![0.0; snapshot.num_ancestries()]
        }
    }
}

/// Variance, across chromosome copies, of each ancestry's share of the
/// chromosome.
///
/// Population variance (divides by the number of copies). Zero for an empty
/// subpopulation.
pub fn ancestry_variance(snapshot: &SubpopulationSnapshot<'_>, chromosome: usize) -> Vec<f64> {
    let num_ancestries = snapshot.num_ancestries();
    let length = snapshot.chromosome_lengths()[chromosome];
    let mut sum = vec![0.0; num_ancestries];
    let mut sum_sq = vec![0.0; num_ancestries];
    let mut copies = 0usize;

    let mut shares = vec![0.0; num_ancestries];
    for chrom in snapshot.chromosomes(chromosome) {
        shares.iter_mut().for_each(|share| *share = 0.0);
        accumulate(&mut shares, snapshot.arena(), chrom);
        for (ancestry, &share) in shares.iter().enumerate() {
            let fraction = share / length;
            sum[ancestry] += fraction;
            sum_sq[ancestry] += fraction * fraction;
        }
        copies += 1;
    }

    if copies == 0 {
        return vec![0.0; num_ancestries];
    }
    let n = copies as f64;
    sum.iter()
        .zip(&sum_sq)
        .map(|(&s, &sq)| {
            let mean = s / n;
            (sq / n - mean * mean).max(0.0)
        })
        .collect()
}

/// Frequency of every selected mutation on `chromosome`.
pub fn site_frequencies(snapshot: &SubpopulationSnapshot<'_>, chromosome: usize) -> BTreeMap<Locus, f64> {
    snapshot.site_frequencies(chromosome)
}

// ===== Helper functions =====

fn chromosome_copies<'a>(
    snapshot: &SubpopulationSnapshot<'a>,
    individual_idx: usize,
    chromosome: usize,
) -> Vec<&'a Chromosome> {
    match snapshot.individuals().nth(individual_idx) {
        Some(ind) => vec![&ind.haplotype1()[chromosome], &ind.haplotype2()[chromosome]],
        None => Vec::new(),
    }
}

fn accumulate(totals: &mut [f64], arena: &BlockArena, chrom: &Chromosome) {
    for block in chrom.iter_blocks(arena) {
        totals[block.ancestry().index()] += block.length();
    }
}

fn normalize(totals: &mut [f64], denominator: f64) {
    if denominator > 0.0 {
        for total in totals {
            *total /= denominator;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tractsim_sim::simulation::{Simulation, SimulationBuilder};

    fn admixed() -> Simulation {
        SimulationBuilder::new()
            .generations(10)
            .chromosome(1.0)
            .subpopulation(2, 2)
            .subpopulation(2, 2)
            .ancestry_proportions(vec![vec![0.5, 0.5], vec![0.0, 1.0]])
            .seed(4)
            .build()
            .unwrap()
    }

    #[test]
    fn test_levels_agree_for_founders() {
        let sim = admixed();
        let snapshot = sim.snapshot(0);

        let whole = ancestry_composition(&snapshot, None, None, 0);
        assert!((whole[0] - 0.5).abs() < 1e-12);
        assert!((whole[1] - 0.5).abs() < 1e-12);

        // Each founder carries a single ancestry on both copies.
        for ind_idx in 0..4 {
            let individual = ancestry_composition(&snapshot, Some(ind_idx), None, 0);
            let paternal = ancestry_composition(&snapshot, Some(ind_idx), Some(0), 0);
            assert_eq!(individual, paternal);
            assert!(individual == vec![1.0, 0.0] || individual == vec![0.0, 1.0]);
        }
    }

    #[test]
    fn test_out_of_range_individual_is_zero() {
        let sim = admixed();
        let snapshot = sim.snapshot(1);
        assert_eq!(ancestry_composition(&snapshot, Some(100), None, 0), vec![0.0, 0.0]);
        assert_eq!(ancestry_composition(&snapshot, Some(0), Some(5), 0), vec![0.0, 0.0]);
        assert_eq!(ancestry_composition(&snapshot, None, Some(0), 0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_variance_of_founders() {
        let sim = admixed();
        // Half the copies are all ancestry 0, half all ancestry 1.
        let mixed = ancestry_variance(&sim.snapshot(0), 0);
        assert!((mixed[0] - 0.25).abs() < 1e-12);
        assert!((mixed[1] - 0.25).abs() < 1e-12);
        // Every copy is pure ancestry 1.
        assert_eq!(ancestry_variance(&sim.snapshot(1), 0), vec![0.0, 0.0]);
    }

    #[test]
    fn test_variance_shrinks_after_mixing() {
        let mut sim = SimulationBuilder::new()
            .generations(20)
            .chromosome(1.0)
            .subpopulation(10, 10)
            .ancestry_proportions(vec![vec![0.5, 0.5]])
            .seed(5)
            .build()
            .unwrap();
        sim.run_for(10).unwrap();
        let variance = ancestry_variance(&sim.snapshot(0), 0);
        assert!(variance[0] < 0.25);
    }
}
