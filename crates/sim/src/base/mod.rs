//! Base types for ancestry representation.
//!
//! This module provides the foundational types shared by every layer of the
//! simulator: genomic positions, ancestry identifiers, ancestry blocks and the
//! arena that owns them, and fitness values.

mod arena;
mod block;
mod fitness;
mod locus;

pub use arena::{BlockArena, BlockId};
pub use block::AncestryBlock;
pub use fitness::{FitnessValue, LogFitnessValue};
pub use locus::{AncestryId, Locus, SiteKey};
