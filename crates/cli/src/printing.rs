use std::fmt::Write;

use tractsim_sim::simulation::{Configuration, OutputSchedule, RunSummary};

/// Human-readable summary of a configuration.
pub fn format_parameters(config: &Configuration) -> String {
    let mut out = String::new();
    let options = &config.options;
    let schedule = OutputSchedule::new(options, &config.output);

    let _ = writeln!(out, "\n📋 Simulation Configuration");
    if config.output.is_empty() {
        let _ = writeln!(out, "  • Generations: {}", options.generations);
        let _ = writeln!(out, "  • Statistics: every {} generations", options.stats_frequency);
    } else {
        let _ = writeln!(
            out,
            "  • Generations: {} (from output schedule, {} entries)",
            schedule.loop_bound(),
            config.output.len()
        );
    }
    match options.seed {
        Some(seed) => {
            let _ = writeln!(out, "  • Random Seed: {seed}");
        }
        None => {
            let _ = writeln!(out, "  • Random Seed: Random");
        }
    }
    let _ = writeln!(out, "  • Garbage Collection: every {} generations", options.garbage_frequency);
    if options.hermaphroditic {
        let _ = writeln!(out, "  • Mating: Hermaphroditic (selfing allowed)");
    }

    let _ = writeln!(out, "\n🧬 Genome");
    let _ = writeln!(out, "  • Chromosomes: {:?} Morgans", options.chromosome_lengths);
    let _ = writeln!(out, "  • Crossovers: {:?}", options.crossover);
    let _ = writeln!(out, "  • Ancestries: {}", config.num_ancestries());

    let _ = writeln!(out, "\n🌍 Demography");
    for entry in &config.demography {
        let sizes: Vec<String> = entry
            .subpopulations
            .iter()
            .map(|size| format!("{}♂/{}♀", size.males, size.females))
            .collect();
        let _ = writeln!(out, "  • Generation {}: [{}]", entry.generation, sizes.join(", "));
        if entry.migration.is_empty() {
            let _ = writeln!(out, "    - No migration");
        } else {
            for (destination, _) in entry.subpopulations.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "    - Into {destination}: {:.4} immigrant fraction",
                    entry.immigration(destination)
                );
            }
        }
    }

    let _ = writeln!(out, "\n🎯 Fitness & Selection");
    if config.selection.is_empty() {
        let _ = writeln!(out, "  • Regime: Neutral Evolution (No Selection)");
    } else {
        let _ = writeln!(
            out,
            "  • Regime: Selection Enabled ({} rules, {:?})",
            config.selection.len(),
            options.fitness_combination
        );
        for rule in &config.selection {
            let mut scope = String::new();
            if let Some(subpopulation) = rule.subpopulation {
                let _ = write!(scope, " in subpopulation {subpopulation}");
            }
            if let Some(sex) = rule.sex {
                let _ = write!(scope, " for {sex:?}");
            }
            let effects: Vec<String> = rule
                .effects
                .iter()
                .map(|e| format!("s={:.3},h={:.2}", e.selection, e.dominance))
                .collect();
            let _ = writeln!(
                out,
                "    - Site {}{scope}: [{}]",
                rule.site(),
                effects.join("; ")
            );
        }
    }
    if !options.tracked_sites.is_empty() {
        let tracked: Vec<String> = options.tracked_sites.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "  • Tracked sites: {}", tracked.join(", "));
    }
    out
}

pub fn format_summary(summary: &RunSummary) -> String {
    let sizes: Vec<String> = summary
        .final_sizes
        .iter()
        .map(|size| format!("{}♂/{}♀", size.males, size.females))
        .collect();
    format!(
        "\n✓ Simulation complete!\n  Final generation: {}\n  Final sizes: [{}]\n  Blocks freed: {} (live: {})\n",
        summary.generations,
        sizes.join(", "),
        summary.blocks_freed,
        summary.live_blocks
    )
}
