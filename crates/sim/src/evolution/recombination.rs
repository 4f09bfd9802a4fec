//! Recombination of ancestry-block chromosomes.
//!
//! A gamete is built in two phases. Planning reads the parental chromosomes
//! and produces a list of [`Segment`]s; it never touches the arena mutably, so
//! many gametes can be planned in parallel. Committing allocates the split
//! pieces in the arena and yields the new [`Chromosome`].

use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};

use crate::base::{BlockArena, BlockId};
use crate::genome::{Chromosome, Individual};

/// Distribution of the number of crossovers per gamete and chromosome.
///
/// Crossover positions are always uniform on `[0, length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossoverModel {
    /// Poisson with mean equal to the chromosome length in Morgans.
    #[default]
    Poisson,
    /// A fixed number of crossovers on every chromosome.
    Exact { count: usize },
    /// No recombination: each gamete copies one parental chromosome.
    None,
}

impl CrossoverModel {
    /// Sample sorted crossover positions for a chromosome of `length` Morgans.
    pub fn sample_breakpoints<R: Rng + ?Sized>(&self, length: f64, rng: &mut R) -> Vec<f64> {
        if length <= 0.0 {
            return Vec::new();
        }
        let count = match *self {
            CrossoverModel::Poisson => match Poisson::new(length) {
                Ok(dist) => dist.sample(rng) as usize,
                Err(_) => 0,
            },
            CrossoverModel::Exact { count } => count,
            CrossoverModel::None => 0,
        };

        let mut breakpoints: Vec<f64> = (0..count).map(|_| rng.random_range(0.0..length)).collect();
        breakpoints.sort_by(f64::total_cmp);
        breakpoints
    }
}

/// One piece of a planned gamete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// A parental block inherited whole; the gamete shares the handle.
    Shared(BlockId),
    /// The part `[start, end)` of a parental block; committed as a new block.
    Piece { source: BlockId, start: f64, end: f64 },
}

/// Plan a gamete from the two homologous chromosomes of one parent.
///
/// `first` selects which homolog (0 or 1) supplies the interval before the
/// first breakpoint; the source switches at every breakpoint. The resulting
/// segments partition `[0, length)`.
pub fn plan_gamete(
    arena: &BlockArena,
    homologs: [&Chromosome; 2],
    breakpoints: &[f64],
    first: usize,
    length: f64,
) -> Vec<Segment> {
    debug_assert!(first < 2);
    let mut segments = Vec::with_capacity(homologs[first].len() + breakpoints.len());
    let mut source = first;
    let mut lo = 0.0;

    for &breakpoint in breakpoints.iter().chain(std::iter::once(&length)) {
        let hi = breakpoint.min(length);
        if hi > lo {
            copy_interval(arena, homologs[source], lo, hi, &mut segments);
            lo = hi;
        }
        source ^= 1;
    }
    segments
}

fn copy_interval(arena: &BlockArena, chromosome: &Chromosome, lo: f64, hi: f64, out: &mut Vec<Segment>) {
    let blocks = chromosome.blocks();
    let mut slot = blocks.partition_point(|&id| arena.get(id).end() <= lo);
    while let Some(&id) = blocks.get(slot) {
        let block = arena.get(id);
        if block.start() >= hi {
            break;
        }
        push_segment(arena, out, id, block.start().max(lo), block.end().min(hi));
        slot += 1;
    }
}

/// Append `[start, end)` of block `id`, merging with the previous segment when
/// it is the adjacent part of the same block.
fn push_segment(arena: &BlockArena, out: &mut Vec<Segment>, id: BlockId, start: f64, end: f64) {
    let block = arena.get(id);
    let (start, end) = match out.last() {
        Some(&Segment::Piece {
            source,
            start: prev_start,
            end: prev_end,
        }) if source == id && prev_end == start => {
            out.pop();
            (prev_start, end)
        }
        _ => (start, end),
    };

    if start == block.start() && end == block.end() {
        out.push(Segment::Shared(id));
    } else {
        out.push(Segment::Piece { source: id, start, end });
    }
}

/// Allocate the planned pieces and assemble the gamete chromosome.
pub fn commit_gamete(arena: &mut BlockArena, segments: &[Segment]) -> Chromosome {
    let blocks = segments
        .iter()
        .map(|segment| match *segment {
            Segment::Shared(id) => id,
            Segment::Piece { source, start, end } => {
                let piece = arena.get(source).piece(start, end);
                arena.allocate(piece)
            }
        })
        .collect();
    Chromosome::from_blocks(blocks)
}

/// Draw breakpoints and the starting homolog, then plan the gamete that
/// `parent` transmits for chromosome `chromosome`.
pub fn sample_gamete<R: Rng + ?Sized>(
    arena: &BlockArena,
    parent: &Individual,
    chromosome: usize,
    length: f64,
    model: CrossoverModel,
    rng: &mut R,
) -> Vec<Segment> {
    let breakpoints = model.sample_breakpoints(length, rng);
    let first = usize::from(rng.random::<bool>());
    plan_gamete(
        arena,
        [&parent.haplotype1()[chromosome], &parent.haplotype2()[chromosome]],
        &breakpoints,
        first,
        length,
    )
}

/// Sample and commit a gamete in one step.
pub fn make_gamete<R: Rng + ?Sized>(
    arena: &mut BlockArena,
    parent: &Individual,
    chromosome: usize,
    length: f64,
    model: CrossoverModel,
    rng: &mut R,
) -> Chromosome {
    let plan = sample_gamete(arena, parent, chromosome, length, model, rng);
    commit_gamete(arena, &plan)
}
