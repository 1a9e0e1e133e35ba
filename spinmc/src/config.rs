//! Configuration management for simulation runs.
//!
//! Runs are described by a YAML file with a `lattice` section (which
//! built-in geometry to construct) and a `simulation` section (the run
//! parameters). Command-line flags override individual file values.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, Result};
use lattice::{grid, LookupTables};
use serde::{Deserialize, Serialize};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "spinmc")]
#[command(about = "Metropolis Monte Carlo for interacting spin lattices", long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "spinmc/example/square_ising.yaml")]
    pub config_file: String,

    /// Random seed (overrides config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Temperature in reduced units (overrides config file)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Total number of sweeps (overrides config file)
    #[arg(long)]
    pub sweeps: Option<u64>,

    /// Number of equilibration sweeps (overrides config file)
    #[arg(long)]
    pub equilibration_sweeps: Option<u64>,

    /// Sweeps between samples (overrides config file)
    #[arg(long)]
    pub sample_interval: Option<u64>,

    /// Trace CSV output path (overrides config file)
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Final snapshot output path (overrides config file)
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

/// Spin representation selector. Unknown modes fail at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ising,
    Heisenberg,
}

/// Run parameters consumed by the simulation driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameters {
    pub mode: Mode,

    /// Seed for the run's random number generator.
    #[serde(default)]
    pub seed: u64,

    /// Total sweeps, equilibration included.
    #[serde(default = "default_sweeps")]
    pub sweeps: u64,

    /// Sweeps discarded before sampling starts.
    #[serde(default = "default_equilibration_sweeps")]
    pub equilibration_sweeps: u64,

    /// Sweeps between estimator samples.
    #[serde(default = "default_sample_interval")]
    pub sample_interval: u64,

    /// Temperature in reduced units (k_B = 1).
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-sample trace CSV destination (optional).
    #[serde(default)]
    pub trace_filepath: Option<PathBuf>,

    /// Final spin-configuration dump destination (optional).
    #[serde(default)]
    pub snapshot_filepath: Option<PathBuf>,
}

fn default_sweeps() -> u64 {
    400
}

fn default_equilibration_sweeps() -> u64 {
    100
}

fn default_sample_interval() -> u64 {
    1
}

fn default_temperature() -> f64 {
    1.0
}

impl Parameters {
    /// Reject unusable parameter sets before any sweep runs.
    pub fn validate(&self) -> Result<()> {
        if self.sweeps == 0 {
            bail!("sweeps must be positive");
        }
        if self.sample_interval == 0 {
            bail!("sample_interval must be positive");
        }
        if self.temperature < 0.0 {
            bail!("temperature must be non-negative, got {}", self.temperature);
        }
        if self.equilibration_sweeps >= self.sweeps {
            bail!(
                "equilibration_sweeps ({}) must be smaller than sweeps ({}), or the run can never sample",
                self.equilibration_sweeps,
                self.sweeps
            );
        }
        Ok(())
    }
}

/// Built-in lattice geometry selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatticeKind {
    Chain,
    Square,
    Cubic,
}

/// Lattice section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatticeConfig {
    pub kind: LatticeKind,

    /// Sites per axis: one value for chain/cubic, one or two for square.
    pub size: Vec<usize>,

    /// Uniform coupling constant on every bond. Negative is
    /// ferromagnetic.
    #[serde(default = "default_coupling")]
    pub coupling: f64,
}

fn default_coupling() -> f64 {
    -1.0
}

impl LatticeConfig {
    /// Construct the configured lookup tables.
    pub fn build(&self) -> Result<LookupTables> {
        if self.size.iter().any(|&length| length < 2) {
            bail!("lattice size values must be at least 2, got {:?}", self.size);
        }
        match self.kind {
            LatticeKind::Chain => match self.size[..] {
                [length] => Ok(grid::chain(length, self.coupling)),
                _ => bail!("chain lattice expects one size value, got {:?}", self.size),
            },
            LatticeKind::Square => match self.size[..] {
                [length] => Ok(grid::square(length, length, self.coupling)),
                [width, height] => Ok(grid::square(width, height, self.coupling)),
                _ => bail!(
                    "square lattice expects one or two size values, got {:?}",
                    self.size
                ),
            },
            LatticeKind::Cubic => match self.size[..] {
                [length] => Ok(grid::cubic(length, self.coupling)),
                _ => bail!("cubic lattice expects one size value, got {:?}", self.size),
            },
        }
    }
}

/// Top-level configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub lattice: LatticeConfig,
    pub simulation: Parameters,
}

impl Config {
    /// Apply command-line overrides on top of the file values.
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(seed) = args.seed {
            self.simulation.seed = seed;
        }
        if let Some(temperature) = args.temperature {
            self.simulation.temperature = temperature;
        }
        if let Some(sweeps) = args.sweeps {
            self.simulation.sweeps = sweeps;
        }
        if let Some(equilibration_sweeps) = args.equilibration_sweeps {
            self.simulation.equilibration_sweeps = equilibration_sweeps;
        }
        if let Some(sample_interval) = args.sample_interval {
            self.simulation.sample_interval = sample_interval;
        }
        if let Some(ref trace) = args.trace {
            self.simulation.trace_filepath = Some(trace.clone());
        }
        if let Some(ref snapshot) = args.snapshot {
            self.simulation.snapshot_filepath = Some(snapshot.clone());
        }
    }
}
