use anyhow::{bail, Context, Result};
use std::fs;
use tractsim_sim::base::Locus;
use tractsim_sim::evolution::SiteEffect;
use tractsim_sim::simulation::{Configuration, SubpopulationSize};

use crate::args::InitArgs;
use crate::printing::format_parameters;

pub fn init_simulation(args: &InitArgs) -> Result<()> {
    println!("🧬 tractsim - Admixture Simulator");
    println!("============================================\n");

    if args.output.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let config = build_config(args);
    config.validate().context("Generated configuration is invalid")?;

    let text = config.to_json_pretty()?;
    fs::write(&args.output, text + "\n")
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Configuration:");
    print!("{}", format_parameters(&config));
    println!("\n✓ Configuration written to {}", args.output.display());
    println!(
        "\n💡 Use 'tractsim run -c {}' to start the simulation",
        args.output.display()
    );
    Ok(())
}

/// The template configuration, resized to the requested layout.
///
/// Subpopulation `p` is founded by ancestry `p`. The template's selected site
/// stays on the first chromosome, beneficial on ancestry 0 and neutral on the
/// others.
pub fn build_config(args: &InitArgs) -> Configuration {
    let mut config = Configuration::template();
    let n = args.subpopulations;

    config.options.generations = args.generations;
    config.options.chromosome_lengths = args.chromosomes.clone();
    if args.seed.is_some() {
        config.options.seed = args.seed;
    }

    let demography = &mut config.demography[0];
    demography.subpopulations = vec![SubpopulationSize::new(args.size, args.size); n];
    demography.migration = if n > 1 {
        let rate = args.migration / (n - 1) as f64;
        (0..n)
            .map(|dest| (0..n).map(|source| if source == dest { 0.0 } else { rate }).collect())
            .collect()
    } else {
        Vec::new()
    };

    let position: Locus = (args.chromosomes.first().copied().unwrap_or(1.0) / 2.0).into();
    for rule in &mut config.selection {
        let beneficial = rule.effects.first().copied().unwrap_or(SiteEffect::new(0.05, 0.5));
        rule.position = position;
        rule.effects = (0..n)
            .map(|ancestry| if ancestry == 0 { beneficial } else { SiteEffect::new(0.0, 0.5) })
            .collect();
    }
    for entry in &mut config.allele_frequencies {
        let initial = entry.frequencies.first().copied().unwrap_or(0.5);
        entry.position = position;
        entry.frequencies = (0..n)
            .map(|ancestry| if ancestry == 0 { initial } else { 0.0 })
            .collect();
    }
    config
}
