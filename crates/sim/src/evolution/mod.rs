//! Evolution module providing recombination and selection.
//!
//! - **Recombination**: crossover sampling and gamete construction over
//!   ancestry blocks
//! - **Selection**: per-site, per-ancestry effects combined into individual
//!   fitness

pub mod recombination;
pub mod selection;

pub use recombination::{
    commit_gamete, make_gamete, plan_gamete, sample_gamete, CrossoverModel, Segment,
};
pub use selection::{
    FitnessCombination, IndividualFitness, SelectionEntry, SelectionModel, SiteEffect,
};
