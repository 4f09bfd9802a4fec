use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tractsim_analysis::TextReporter;
use tractsim_sim::simulation::{Configuration, OutputSchedule, Simulation};

use crate::args::RunArgs;
use crate::printing::{format_parameters, format_summary};

/// Run a configuration to completion, writing statistics to `--output` or
/// stdout. Everything else goes to stderr.
pub fn run_simulation(args: &RunArgs) -> Result<()> {
    eprintln!("🧬 tractsim - Running Simulation");
    eprintln!("============================================");

    let mut config = Configuration::from_path(&args.config)
        .with_context(|| format!("Failed to read {}", args.config.display()))?;
    if let Some(seed) = args.seed {
        config.options.seed = Some(seed);
    }
    if let Some(generations) = args.generations {
        config.options.generations = generations;
    }

    eprint!("{}", format_parameters(&config));
    let mut sim = Simulation::new(config).context("Failed to initialize simulation")?;

    let steps = OutputSchedule::new(&sim.config().options, &sim.config().output)
        .loop_bound()
        .saturating_sub(1);
    let pb = if args.progress {
        let pb = ProgressBar::new(steps as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {per_sec}",
            )?
            .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut reporter = TextReporter::new(writer);

    eprintln!("\nRunning {steps} generations...");
    let outcome = sim.run_with(&mut reporter, |_| pb.inc(1));
    pb.finish_and_clear();
    let summary = outcome?;

    eprint!("{}", format_summary(&summary));
    if let Some(path) = &args.output {
        eprintln!("  Statistics: {} ({} values)", path.display(), reporter.lines());
    }
    Ok(())
}
