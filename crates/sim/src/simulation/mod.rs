//! Simulation engine and population management.
//!
//! This module provides the configuration document, the demography schedule,
//! the per-generation operators and the generation loop.
//!
//! The most commonly used types are re-exported here so consumers can import
//! them from `tractsim_sim::simulation`:
//!
//! - `Configuration`: the JSON document describing a complete run.
//! - `Simulation`: the engine that steps generations.
//! - `SimulationBuilder`: fluent builder for tests and embedding.
//! - `Reporter`: the sink the generation loop writes statistics to.

pub mod builder;
pub mod configs;
pub mod demography;
pub mod driver;
pub mod engine;
pub mod initialization;
pub mod migration;
pub mod reproduction;
pub mod sampling;
pub mod snapshot;
pub mod subpopulation;

pub use builder::SimulationBuilder;
pub use configs::{Configuration, FrequencyEntry, Options, OutputEntry, Statistic};
pub use demography::{DemographyEntry, DemographySchedule, SubpopulationSize};
pub use driver::{OutputSchedule, ReportRequest, Reporter, RunSummary};
pub use engine::Simulation;
pub use initialization::{apportion, initialize_ancestry};
pub use migration::{assign_sources, MigrationMatrix, SourceAssignment};
pub use reproduction::{create_offspring, make_offspring, plan_offspring, OffspringPlan};
pub use sampling::{select_parents, ParentPair, ParentPlan, ParentRef, PoolSampler};
pub use snapshot::SubpopulationSnapshot;
pub use subpopulation::Subpopulation;
