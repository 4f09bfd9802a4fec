//! # Simulation Crate
//!
//! The `sim` crate provides the core logic for the forward-time admixture
//! simulation. Genomes are stored as ancestry tracts in a shared block arena;
//! each generation applies demography, migration, fitness-weighted parent
//! sampling and recombination.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod genome;
pub mod prelude;
pub mod simulation;

pub use base::{AncestryBlock, AncestryId, BlockArena, BlockId, Locus};
