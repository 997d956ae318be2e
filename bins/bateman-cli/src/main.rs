//! bateman — Command-line radioactive decay calculator.
//!
//! Reads a nuclide table and an initial inventory, decays the inventory
//! for the requested time and writes the results to an output directory.

mod config;

use anyhow::{Context, Result};
use bateman_core::error::BatemanError;
use bateman_core::types::{Inventory, NuclideRegistry};
use bateman_data::{read_inventory_path, read_nuclides_path, DecayReport, OutputWriter};
use bateman_decay::{EvolveOptions, PreparedChain};
use clap::Parser;
use tracing::{info, warn};

use crate::config::{Cli, CliConfig};

fn main() -> Result<()> {
    let config = CliConfig::from_cli(Cli::parse())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter())),
        )
        .init();

    run(&config)
}

/// Read, solve and write one decay run.
fn run(config: &CliConfig) -> Result<()> {
    let nuclides = read_nuclides_path(&config.nuclides)
        .with_context(|| format!("Failed to read nuclides from {}", config.nuclides.display()))?;
    let inventory = read_inventory_path(&config.inventory, &nuclides.registry)
        .with_context(|| format!("Failed to read inventory from {}", config.inventory.display()))?;

    let mut issues = nuclides.issues;
    issues.extend(inventory.issues);
    if !issues.is_clean() {
        warn!(count = issues.len(), "input data has issues, see error.log");
    }

    let writer = OutputWriter::new(&config.output_dir);
    writer.write_errors(&issues)?;
    writer.write_nuclides(&nuclides.registry)?;

    let initial = inventory.inventory;
    let (chain, decayed) = solve(&nuclides.registry, &initial, config.elapsed_secs, config.options)
        .context("Failed to decay inventory")?;
    info!(nuclides = chain.len(), elapsed_secs = config.elapsed_secs, "decay complete");

    let report = DecayReport::new(config.elapsed_secs, initial, decayed);
    writer.write_report(&report)?;
    if config.latex {
        writer.write_latex(&report)?;
    }
    if config.diagnostics {
        let diagnostics = chain.diagnostics(&report.initial, config.elapsed_secs)?;
        writer.write_diagnostics(&diagnostics)?;
    }

    print_summary(&report, issues.len());
    println!("\nOutput written to {}", writer.dir().display());
    Ok(())
}

fn solve(
    registry: &NuclideRegistry,
    initial: &Inventory,
    elapsed_secs: f64,
    options: EvolveOptions,
) -> Result<(PreparedChain, Inventory), BatemanError> {
    let chain = PreparedChain::for_inventory(registry, initial)?;
    let decayed = chain.evolve(initial, elapsed_secs, options)?;
    Ok((chain, decayed))
}

fn print_summary(report: &DecayReport, issues: usize) {
    println!("\n=== DECAY AFTER {} s ===", report.elapsed_secs);
    println!("{:<14} {:>14} {:>14}", "Nuclide", "Initial", "Decayed");
    for name in report.nuclides() {
        println!(
            "{:<14} {:>14.6e} {:>14.6e}",
            name,
            report.initial.atoms(name),
            report.decayed.atoms(name)
        );
    }
    if issues > 0 {
        println!("\n{issues} data issue(s) recorded in error.log");
    }
}
