//! Genome structures for representing chromosomes, haplotypes, and individuals.

mod chromosome;
mod haplotype;
mod individual;

pub use chromosome::Chromosome;
pub use haplotype::Haplotype;
pub use individual::{Individual, Sex};
