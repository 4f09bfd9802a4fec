//! Ancestry tract length analysis
//!
//! A tract is a maximal run of the same ancestry along one chromosome copy.
//! Neighbouring blocks with the same ancestry (split only because they carry
//! different mutations, or because they were inherited separately) belong to
//! the same tract.

use tractsim_sim::base::BlockArena;
use tractsim_sim::genome::Chromosome;
use tractsim_sim::simulation::SubpopulationSnapshot;

/// Count and total length of the tracts of one ancestry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TractSummary {
    pub count: usize,
    pub total_length: f64,
}

impl TractSummary {
    /// Mean tract length in Morgans, zero when there are no tracts.
    pub fn mean_length(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_length / self.count as f64
        }
    }

    fn add(&mut self, length: f64) {
        self.count += 1;
        self.total_length += length;
    }
}

/// Tracts of one chromosome copy as `(ancestry index, length)`, in position
/// order.
pub fn chromosome_tracts(arena: &BlockArena, chrom: &Chromosome) -> Vec<(usize, f64)> {
    let mut tracts: Vec<(usize, f64, f64)> = Vec::new();
    for block in chrom.iter_blocks(arena) {
        let ancestry = block.ancestry().index();
        match tracts.last_mut() {
            Some((last, _, end)) if *last == ancestry => *end = block.end(),
            _ => tracts.push((ancestry, block.start(), block.end())),
        }
    }
    tracts
        .into_iter()
        .map(|(ancestry, start, end)| (ancestry, end - start))
        .collect()
}

/// Lengths of every tract on `chromosome` in the subpopulation, grouped by
/// ancestry.
pub fn tract_lengths(snapshot: &SubpopulationSnapshot<'_>, chromosome: usize) -> Vec<Vec<f64>> {
    let mut lengths = vec![Vec::new(); snapshot.num_ancestries()];
    for chrom in snapshot.chromosomes(chromosome) {
        for (ancestry, length) in chromosome_tracts(snapshot.arena(), chrom) {
            lengths[ancestry].push(length);
        }
    }
    lengths
}

/// Tract count and length per ancestry on `chromosome`.
pub fn tract_summary(snapshot: &SubpopulationSnapshot<'_>, chromosome: usize) -> Vec<TractSummary> {
    let mut summaries = vec![TractSummary::default(); snapshot.num_ancestries()];
    for chrom in snapshot.chromosomes(chromosome) {
        for (ancestry, length) in chromosome_tracts(snapshot.arena(), chrom) {
            summaries[ancestry].add(length);
        }
    }
    summaries
}
