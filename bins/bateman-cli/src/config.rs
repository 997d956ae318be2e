//! Command-line arguments and environment-driven settings.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bateman_core::units::parse_duration;
use bateman_decay::EvolveOptions;
use clap::Parser;

/// Environment variable naming the output directory.
pub const OUTPUT_DIR_ENV: &str = "BATEMAN_OUTPUT_DIR";
/// Environment variable holding the default verbosity level.
pub const LOG_LEVEL_ENV: &str = "BATEMAN_LOG_LEVEL";

#[derive(Parser, Debug)]
#[command(name = "bateman")]
#[command(version, about = "Calculates decays of radionuclides")]
pub struct Cli {
    /// Path to nuclide data CSV file
    pub nuclides: PathBuf,

    /// Path to inventory data CSV file
    pub inventory: PathBuf,

    /// Decay time, e.g. "3600", "4.48 h" or "2 y"
    #[arg(short, long)]
    pub time: String,

    /// Info message importance level (0 = warnings only, 3+ = everything)
    #[arg(short, long)]
    pub level: Option<u8>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write inventory.tex
    #[arg(long)]
    pub latex: bool,

    /// Also write diagnostics.json with every intermediate matrix
    #[arg(long)]
    pub diagnostics: bool,

    /// Leave out resulting atom counts at or below this magnitude
    #[arg(long, default_value_t = 0.0)]
    pub elide_below: f64,
}

/// Fully resolved run settings.
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub nuclides: PathBuf,
    pub inventory: PathBuf,
    /// Decay time in seconds.
    pub elapsed_secs: f64,
    pub level: u8,
    pub output_dir: PathBuf,
    pub latex: bool,
    pub diagnostics: bool,
    pub options: EvolveOptions,
}

impl CliConfig {
    /// Resolve against the process environment.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Self::resolve(cli, |key| std::env::var(key).ok())
    }

    /// Flags win over the environment, which wins over built-in defaults.
    pub fn resolve(cli: Cli, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let elapsed_secs = parse_duration(&cli.time)
            .with_context(|| format!("invalid --time value '{}'", cli.time))?;
        if !elapsed_secs.is_finite() || elapsed_secs < 0.0 {
            bail!("--time must be a non-negative duration, got {}", cli.time);
        }

        let level = match cli.level {
            Some(level) => level,
            None => env(LOG_LEVEL_ENV)
                .unwrap_or_else(|| "1".to_string())
                .parse()
                .with_context(|| format!("{LOG_LEVEL_ENV} must be a small non-negative integer"))?,
        };

        let output_dir = cli
            .output
            .or_else(|| env(OUTPUT_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("output"));

        if !cli.elide_below.is_finite() || cli.elide_below < 0.0 {
            bail!("--elide-below must be a non-negative number");
        }

        Ok(Self {
            nuclides: cli.nuclides,
            inventory: cli.inventory,
            elapsed_secs,
            level,
            output_dir,
            latex: cli.latex,
            diagnostics: cli.diagnostics,
            options: EvolveOptions {
                elide_below: cli.elide_below,
            },
        })
    }

    /// Default log filter for the configured level.
    pub fn log_filter(&self) -> &'static str {
        match self.level {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
