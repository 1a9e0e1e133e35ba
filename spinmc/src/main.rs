//! Spin-lattice Monte Carlo command-line interface.

use std::fs;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use lattice::LookupTables;
use tracing::info;

use spinmc::config::{Args, Config};
use spinmc::run::{run, SimulationOutput};

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    info!("Reading configuration from: {}", args.config_file);
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;
    let mut config: Config = serde_yml::from_str(&config_content)
        .wrap_err("Failed to parse configuration file")?;
    config.apply_overrides(&args);
    config.simulation.validate()?;

    let tables = config.lattice.build()?;
    info!(
        "Lattice: {} sites, {} sublattices, coordination {}",
        tables.number_sites,
        tables.number_sublattices,
        tables.coordination()
    );
    info!(
        "Simulation: {:?} at T = {}, {} sweeps ({} equilibration, sample every {}), seed {}",
        config.simulation.mode,
        config.simulation.temperature,
        config.simulation.sweeps,
        config.simulation.equilibration_sweeps,
        config.simulation.sample_interval,
        config.simulation.seed
    );

    let output = run(&tables, &config.simulation)?;
    report(&output, &tables);

    Ok(())
}

fn report(output: &SimulationOutput, tables: &LookupTables) {
    let estimators = output.estimators();
    let sites = tables.number_sites as f64;

    info!("Run finished.");
    info!("  Samples recorded:        {}", estimators.samples);
    info!(
        "  Acceptance rate:         {:.4}",
        output.stats().acceptance_rate()
    );
    info!(
        "  Mean energy per site:    {:.6}",
        estimators.mean_energy() / sites
    );
    info!(
        "  Mean magnetization/site: {:.6}",
        estimators.mean_magnetization() / sites
    );
    for sublattice in 0..tables.number_sublattices {
        match output {
            SimulationOutput::Ising(_) => info!(
                "  Sublattice {} mean magnetization: {:.6}",
                sublattice,
                estimators.mean_sublattice_magnetization(sublattice)
            ),
            SimulationOutput::Heisenberg(_) => {
                let vector = estimators.mean_spin_vector(sublattice);
                info!(
                    "  Sublattice {} mean spin vector: [{:.6}, {:.6}, {:.6}]",
                    sublattice, vector.x, vector.y, vector.z
                );
            }
        }
    }
}
