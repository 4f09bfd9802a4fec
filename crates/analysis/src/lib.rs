//! # Analysis Crate
//!
//! Statistics over `tractsim` populations and the tab-separated text
//! reporter the command-line front end writes them with.

pub mod analysis;
pub mod report;

pub use report::TextReporter;
