use anyhow::{Context, Result};
use std::path::Path;
use tractsim_sim::simulation::Configuration;

use crate::printing::format_parameters;

pub fn validate_config(path: &Path) -> Result<()> {
    println!("🔍 Validating configuration: {}", path.display());

    let config = Configuration::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    config.validate().context("Configuration is invalid")?;

    print!("{}", format_parameters(&config));
    println!("\n✓ Configuration is valid");
    Ok(())
}
