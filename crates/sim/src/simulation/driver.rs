//! The generation loop with statistics reporting.
//!
//! The loop bound and the reporting cadence come from the output schedule:
//!
//! - Without a schedule the loop runs while `generation < generations` and
//!   every statistic is reported each `stats_frequency` generations
//!   (generation 0 included).
//! - With a schedule, entries are reported at their generation and the loop
//!   stops after the second-to-last entry; the final entry only marks the end
//!   of the run. A single-entry schedule stops after that entry.

use std::io;

use tracing::{info, warn};

use crate::errors::SimulationError;
use crate::simulation::{Options, OutputEntry, Simulation, Statistic, SubpopulationSize};

/// Statistics to write for one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub generation: usize,
    pub statistics: Vec<Statistic>,
    /// `None` means every subpopulation.
    pub subpopulations: Option<Vec<usize>>,
}

impl ReportRequest {
    pub fn includes(&self, statistic: Statistic) -> bool {
        self.statistics.contains(&statistic)
    }

    /// Subpopulation indices to report, out of `available` slots.
    pub fn selected_subpopulations(&self, available: usize) -> Vec<usize> {
        match &self.subpopulations {
            Some(indices) => indices.iter().copied().filter(|&i| i < available).collect(),
            None => (0..available).collect(),
        }
    }
}

/// Sink for statistics. Implementations live outside the core crate.
pub trait Reporter {
    /// Write the statistics named by `request` for the current state of `sim`.
    fn report(&mut self, sim: &Simulation, request: &ReportRequest) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Cursor over the output schedule.
#[derive(Debug, Clone)]
pub struct OutputSchedule {
    entries: Vec<OutputEntry>,
    cursor: usize,
    generations: usize,
    stats_frequency: usize,
}

impl OutputSchedule {
    pub fn new(options: &Options, entries: &[OutputEntry]) -> Self {
        Self {
            entries: entries.to_vec(),
            cursor: 0,
            generations: options.generations,
            stats_frequency: options.stats_frequency,
        }
    }

    /// The loop runs while the current generation plus one is below this.
    pub fn loop_bound(&self) -> usize {
        match self.entries.len() {
            0 => self.generations,
            1 => self.entries[0].generation + 1,
            n => self.entries[n - 2].generation + 1,
        }
    }

    /// Requests due at `generation`. Call with non-decreasing generations.
    pub fn due(&mut self, generation: usize) -> Vec<ReportRequest> {
        if self.entries.is_empty() {
            if generation % self.stats_frequency == 0 {
                return vec![ReportRequest {
                    generation,
                    statistics: Statistic::ALL.to_vec(),
                    subpopulations: None,
                }];
            }
            return Vec::new();
        }

        while self
            .entries
            .get(self.cursor)
            .is_some_and(|entry| entry.generation < generation)
        {
            self.cursor += 1;
        }
        let mut requests = Vec::new();
        while let Some(entry) = self.entries.get(self.cursor) {
            if entry.generation != generation {
                break;
            }
            requests.push(ReportRequest {
                generation,
                statistics: entry.statistics.clone(),
                subpopulations: entry.subpopulations.clone(),
            });
            self.cursor += 1;
        }
        requests
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Generation of the final population.
    pub generations: usize,
    pub blocks_freed: usize,
    pub live_blocks: usize,
    pub final_sizes: Vec<SubpopulationSize>,
}

impl Simulation {
    /// Run to the end of the schedule, reporting to `reporter`.
    ///
    /// # Errors
    /// The first simulation or reporting error. The reporter is flushed
    /// either way.
    pub fn run<R: Reporter + ?Sized>(&mut self, reporter: &mut R) -> Result<RunSummary, SimulationError> {
        self.run_with(reporter, |_| {})
    }

    /// Like [`Simulation::run`], calling `on_generation` after every step.
    ///
    /// # Errors
    /// See [`Simulation::run`].
    pub fn run_with<R, F>(&mut self, reporter: &mut R, on_generation: F) -> Result<RunSummary, SimulationError>
    where
        R: Reporter + ?Sized,
        F: FnMut(usize),
    {
        let mut schedule = OutputSchedule::new(&self.config().options, &self.config().output);
        let bound = schedule.loop_bound();
        info!(from = self.generation(), bound, "starting run");

        let outcome = self.drive(reporter, &mut schedule, bound, on_generation);
        let flushed = reporter.flush();
        if let Err(err) = &outcome {
            warn!(generation = self.generation(), %err, "run stopped");
        }
        outcome?;
        flushed?;

        let summary = RunSummary {
            generations: self.generation(),
            blocks_freed: self.blocks_freed(),
            live_blocks: self.arena().live(),
            final_sizes: self.sizes(),
        };
        info!(
            generations = summary.generations,
            blocks_freed = summary.blocks_freed,
            live_blocks = summary.live_blocks,
            "run complete"
        );
        Ok(summary)
    }

    fn drive<R, F>(
        &mut self,
        reporter: &mut R,
        schedule: &mut OutputSchedule,
        bound: usize,
        mut on_generation: F,
    ) -> Result<(), SimulationError>
    where
        R: Reporter + ?Sized,
        F: FnMut(usize),
    {
        for request in schedule.due(self.generation()) {
            reporter.report(self, &request)?;
        }
        while self.generation() + 1 < bound {
            self.step()?;
            for request in schedule.due(self.generation()) {
                reporter.report(self, &request)?;
            }
            on_generation(self.generation());
        }
        Ok(())
    }
}
