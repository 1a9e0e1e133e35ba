//! Simulation driver: equilibration, sampling, and observer wiring.

use color_eyre::eyre::Result;
use lattice::LookupTables;
use tracing::debug;

use crate::config::{Mode, Parameters};
use crate::estimators::Estimators;
use crate::io::{self, TraceWriter};
use crate::metropolis::{Metropolis, SweepStatistics};
use crate::state::{HeisenbergState, IsingState, SpinModel};

/// Run progression. Equilibration sweeps are discarded; sampling sweeps
/// feed the estimator accumulator every `sample_interval` sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Equilibrating,
    Sampling,
    Done,
}

/// Snapshot of one completed sweep, handed to observers.
#[derive(Debug, Clone, Copy)]
pub struct SweepReport {
    /// 1-based index of the completed sweep.
    pub sweep: u64,
    pub phase: Phase,
    /// Whether this sweep recorded an estimator sample.
    pub sampled: bool,
    /// Latest recorded total energy; meaningful once `sampled` has been
    /// true at least once.
    pub energy: f64,
    /// Latest recorded magnetization, same caveat as `energy`.
    pub magnetization: f64,
}

/// Sweep-boundary notification seam for tracing and persistence.
pub trait SweepObserver {
    fn sweep_finished(&mut self, report: &SweepReport) -> Result<()>;
}

/// Observer that ignores every notification.
#[derive(Debug, Default)]
pub struct NullObserver;

impl SweepObserver for NullObserver {
    fn sweep_finished(&mut self, _report: &SweepReport) -> Result<()> {
        Ok(())
    }
}

/// Everything a finished run hands back to the caller; read-only from
/// here on.
#[derive(Debug)]
pub struct SimulationData<M> {
    pub estimators: Estimators,
    pub state: M,
    pub stats: SweepStatistics,
    /// `Done` when the run completed all configured sweeps; the phase it
    /// was interrupted in otherwise.
    pub phase: Phase,
}

/// Drive a full simulation for one spin representation.
pub fn simulation<M: SpinModel>(
    tables: &LookupTables,
    parameters: &Parameters,
    observer: &mut dyn SweepObserver,
) -> Result<SimulationData<M>> {
    simulation_with_stop(tables, parameters, observer, || false)
}

/// [`simulation`], with a stop condition checked between sweeps.
///
/// The condition is never consulted mid-sweep; a sweep either runs in
/// full or not at all.
pub fn simulation_with_stop<M: SpinModel>(
    tables: &LookupTables,
    parameters: &Parameters,
    observer: &mut dyn SweepObserver,
    stop: impl Fn() -> bool,
) -> Result<SimulationData<M>> {
    parameters.validate()?;

    let mut engine = Metropolis::<M>::from_random_state(
        tables.number_sites,
        parameters.temperature,
        parameters.seed,
    );
    let mut estimators = Estimators::new(tables.number_sublattices);

    let mut completed = 0;
    for sweep in 1..=parameters.sweeps {
        if stop() {
            debug!("Stop requested after {} sweeps", completed);
            break;
        }

        engine.sweep(tables);
        completed = sweep;

        let phase = if sweep <= parameters.equilibration_sweeps {
            Phase::Equilibrating
        } else {
            Phase::Sampling
        };
        let sampled = phase == Phase::Sampling
            && (sweep - parameters.equilibration_sweeps) % parameters.sample_interval == 0;
        if sampled {
            estimators.record(&engine.state, tables);
        }

        observer.sweep_finished(&SweepReport {
            sweep,
            phase,
            sampled,
            energy: estimators.energy,
            magnetization: estimators.magnetization,
        })?;
    }

    let phase = if completed == parameters.sweeps {
        Phase::Done
    } else if completed >= parameters.equilibration_sweeps {
        Phase::Sampling
    } else {
        Phase::Equilibrating
    };
    debug!(
        "Run finished: {} sweeps, {} samples, acceptance rate {:.3}",
        completed,
        estimators.samples,
        engine.stats.acceptance_rate()
    );

    Ok(SimulationData {
        estimators,
        state: engine.state,
        stats: engine.stats,
        phase,
    })
}

/// Finished run for either spin representation.
#[derive(Debug)]
pub enum SimulationOutput {
    Ising(SimulationData<IsingState>),
    Heisenberg(SimulationData<HeisenbergState>),
}

impl SimulationOutput {
    pub fn estimators(&self) -> &Estimators {
        match self {
            SimulationOutput::Ising(data) => &data.estimators,
            SimulationOutput::Heisenberg(data) => &data.estimators,
        }
    }

    pub fn stats(&self) -> &SweepStatistics {
        match self {
            SimulationOutput::Ising(data) => &data.stats,
            SimulationOutput::Heisenberg(data) => &data.stats,
        }
    }
}

/// Dispatch on the configured mode and wire up the optional trace and
/// snapshot writers.
pub fn run(tables: &LookupTables, parameters: &Parameters) -> Result<SimulationOutput> {
    let mut observer: Box<dyn SweepObserver> = match &parameters.trace_filepath {
        Some(path) => Box::new(TraceWriter::create(path)?),
        None => Box::new(NullObserver),
    };

    match parameters.mode {
        Mode::Ising => {
            let data = simulation::<IsingState>(tables, parameters, observer.as_mut())?;
            if let Some(path) = &parameters.snapshot_filepath {
                io::write_snapshot_file(path, &data.state)?;
            }
            Ok(SimulationOutput::Ising(data))
        }
        Mode::Heisenberg => {
            let data = simulation::<HeisenbergState>(tables, parameters, observer.as_mut())?;
            if let Some(path) = &parameters.snapshot_filepath {
                io::write_snapshot_file(path, &data.state)?;
            }
            Ok(SimulationOutput::Heisenberg(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use lattice::grid;

    fn parameters(mode: Mode) -> Parameters {
        Parameters {
            mode,
            seed: 42,
            sweeps: 40,
            equilibration_sweeps: 10,
            sample_interval: 1,
            temperature: 1.0,
            trace_filepath: None,
            snapshot_filepath: None,
        }
    }

    #[test]
    fn test_sample_count_is_sweeps_minus_equilibration() {
        let tables = grid::chain(8, -1.0);
        let data =
            simulation::<IsingState>(&tables, &parameters(Mode::Ising), &mut NullObserver)
                .unwrap();
        assert_eq!(data.estimators.samples, 30);
        assert_eq!(data.phase, Phase::Done);
    }

    #[test]
    fn test_sample_interval_thins_the_trace() {
        let tables = grid::chain(8, -1.0);
        let mut params = parameters(Mode::Ising);
        params.sample_interval = 5;
        let data = simulation::<IsingState>(&tables, &params, &mut NullObserver).unwrap();
        assert_eq!(data.estimators.samples, 6);
    }

    #[test]
    fn test_estimator_trajectories_are_bit_identical_for_equal_seeds() {
        let tables = grid::square(4, 4, -1.0);
        let params = parameters(Mode::Heisenberg);
        let data_a = simulation::<HeisenbergState>(&tables, &params, &mut NullObserver).unwrap();
        let data_b = simulation::<HeisenbergState>(&tables, &params, &mut NullObserver).unwrap();
        assert_eq!(data_a.estimators.energy_trace, data_b.estimators.energy_trace);
        assert_eq!(
            data_a.estimators.magnetization_trace,
            data_b.estimators.magnetization_trace
        );
        assert_eq!(data_a.state, data_b.state);
    }

    #[test]
    fn test_reduced_observables_stay_in_bounds() {
        let tables = grid::square(4, 4, -1.0);
        let sites = tables.number_sites as f64;
        let energy_bound = tables.coordination() as f64 * tables.max_coupling();

        for temperature in [0.5, 2.269, 10.0] {
            let mut params = parameters(Mode::Ising);
            params.temperature = temperature;
            let data = simulation::<IsingState>(&tables, &params, &mut NullObserver).unwrap();

            for (&energy, &magnetization) in data
                .estimators
                .energy_trace
                .iter()
                .zip(data.estimators.magnetization_trace.iter())
            {
                assert!((energy / sites).abs() <= energy_bound);
                assert!((magnetization / sites).abs() <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_antiferromagnet_orders_staggered_not_uniform() {
        // J > 0 on a bipartite lattice: sublattice magnetizations lock
        // antiparallel while the uniform magnetization stays small.
        let tables = grid::square(4, 4, 1.0);
        let sites = tables.number_sites as f64;
        let mut params = parameters(Mode::Ising);
        params.sweeps = 400;
        params.equilibration_sweeps = 100;
        let data = simulation::<IsingState>(&tables, &params, &mut NullObserver).unwrap();

        let staggered = (data.estimators.mean_sublattice_magnetization(0)
            - data.estimators.mean_sublattice_magnetization(1))
        .abs()
            / sites;
        let uniform = data.estimators.mean_magnetization().abs() / sites;
        assert!(staggered <= 1.0 + 1e-12);
        assert!(
            staggered - uniform > 0.1,
            "staggered = {}, uniform = {}",
            staggered,
            uniform
        );
    }

    #[test]
    fn test_stop_condition_halts_between_sweeps() {
        let tables = grid::chain(8, -1.0);
        let data = simulation_with_stop::<IsingState>(
            &tables,
            &parameters(Mode::Ising),
            &mut NullObserver,
            || true,
        )
        .unwrap();
        assert_eq!(data.estimators.samples, 0);
        assert_eq!(data.phase, Phase::Equilibrating);
        assert_eq!(data.stats.attempts, 0);
    }

    #[test]
    fn test_observer_sees_every_sweep() {
        struct CountingObserver {
            sweeps: u64,
            sampled: u64,
        }
        impl SweepObserver for CountingObserver {
            fn sweep_finished(&mut self, report: &SweepReport) -> Result<()> {
                self.sweeps += 1;
                if report.sampled {
                    self.sampled += 1;
                }
                Ok(())
            }
        }

        let tables = grid::chain(8, -1.0);
        let mut observer = CountingObserver {
            sweeps: 0,
            sampled: 0,
        };
        simulation::<IsingState>(&tables, &parameters(Mode::Ising), &mut observer).unwrap();
        assert_eq!(observer.sweeps, 40);
        assert_eq!(observer.sampled, 30);
    }

    #[test]
    fn test_zero_temperature_run_is_rejected_only_when_negative() {
        let tables = grid::chain(8, -1.0);
        let mut params = parameters(Mode::Ising);
        params.temperature = 0.0;
        params.sweeps = 200;
        let data = simulation::<IsingState>(&tables, &params, &mut NullObserver).unwrap();
        // A quench on a ferromagnetic ring ends in the aligned ground
        // state.
        let final_energy = *data.estimators.energy_trace.last().unwrap();
        assert_relative_eq!(final_energy / 8.0, -1.0);

        params.temperature = -1.0;
        assert!(simulation::<IsingState>(&tables, &params, &mut NullObserver).is_err());
    }
}
