//! Population genetics analysis tools for tractsim
//!
//! This module provides statistics over subpopulation snapshots:
//! - Ancestry composition and its variance across chromosome copies
//! - Selected-site frequencies
//! - Ancestry tract lengths

pub mod composition;
pub mod tracts;

// Re-export commonly used functions
pub use composition::{ancestry_composition, ancestry_variance, site_frequencies};
pub use tracts::{chromosome_tracts, tract_lengths, tract_summary, TractSummary};
