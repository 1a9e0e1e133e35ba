//! Estimator accumulation across sampling sweeps.

use itertools::izip;
use lattice::LookupTables;
use nalgebra::Vector3;

use crate::energy;
use crate::state::SpinModel;

/// Accumulated observables for one simulation run.
///
/// The scalar fields and the per-sublattice vectors hold the most recent
/// full-lattice sample; the traces and running sums grow by one entry per
/// sampling event and are never reset mid-run. Averages and error bars
/// beyond the helpers here are left to the caller.
#[derive(Debug, Clone)]
pub struct Estimators {
    /// Latest total-energy sample.
    pub energy: f64,
    /// Latest magnetization sample: the signed spin sum for Ising runs,
    /// the magnitude of the total spin vector for Heisenberg runs.
    pub magnetization: f64,
    /// Latest per-sublattice spin-vector sums (Heisenberg).
    pub spin_vector: Vec<Vector3<f64>>,
    /// Latest per-sublattice magnetization sums: signed scalar sums for
    /// Ising runs, vector-sum magnitudes for Heisenberg runs.
    pub sublattice_magnetization: Vec<f64>,
    /// One total-energy entry per sampling event.
    pub energy_trace: Vec<f64>,
    /// One magnetization entry per sampling event.
    pub magnetization_trace: Vec<f64>,
    /// Number of sampling events recorded.
    pub samples: usize,
    spin_vector_total: Vec<Vector3<f64>>,
    sublattice_magnetization_total: Vec<f64>,
}

impl Estimators {
    /// Zero-initialized accumulator for `number_sublattices` sublattices.
    pub fn new(number_sublattices: usize) -> Self {
        Self {
            energy: 0.0,
            magnetization: 0.0,
            spin_vector: vec![Vector3::zeros(); number_sublattices],
            sublattice_magnetization: vec![0.0; number_sublattices],
            energy_trace: Vec::new(),
            magnetization_trace: Vec::new(),
            samples: 0,
            spin_vector_total: vec![Vector3::zeros(); number_sublattices],
            sublattice_magnetization_total: vec![0.0; number_sublattices],
        }
    }

    /// Record one full-lattice sample: recompute the total energy once,
    /// let the state write its magnetization estimators, then extend the
    /// traces and running sums.
    pub fn record<M: SpinModel>(&mut self, state: &M, tables: &LookupTables) {
        self.energy = energy::total_energy(state, tables);
        state.accumulate(tables, self);

        self.energy_trace.push(self.energy);
        self.magnetization_trace.push(self.magnetization);
        for (total, &latest) in izip!(self.spin_vector_total.iter_mut(), self.spin_vector.iter())
        {
            *total += latest;
        }
        for (total, &latest) in izip!(
            self.sublattice_magnetization_total.iter_mut(),
            self.sublattice_magnetization.iter()
        ) {
            *total += latest;
        }
        self.samples += 1;
    }

    pub fn mean_energy(&self) -> f64 {
        mean(&self.energy_trace)
    }

    pub fn mean_magnetization(&self) -> f64 {
        mean(&self.magnetization_trace)
    }

    /// Sample mean of a sublattice's magnetization sum.
    pub fn mean_sublattice_magnetization(&self, sublattice: usize) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sublattice_magnetization_total[sublattice] / self.samples as f64
        }
    }

    /// Sample mean of a sublattice's spin-vector sum.
    pub fn mean_spin_vector(&self, sublattice: usize) -> Vector3<f64> {
        if self.samples == 0 {
            Vector3::zeros()
        } else {
            self.spin_vector_total[sublattice] / self.samples as f64
        }
    }

    /// Specific heat per site from the energy fluctuations:
    /// `(<E^2> - <E>^2) / (T^2 N)`.
    pub fn specific_heat(&self, temperature: f64, number_sites: usize) -> f64 {
        if self.samples < 2 {
            return 0.0;
        }
        variance(&self.energy_trace) / (temperature * temperature * number_sites as f64)
    }

    /// Magnetic susceptibility per site from the magnetization
    /// fluctuations: `(<M^2> - <M>^2) / (T N)`.
    pub fn magnetic_susceptibility(&self, temperature: f64, number_sites: usize) -> f64 {
        if self.samples < 2 {
            return 0.0;
        }
        variance(&self.magnetization_trace) / (temperature * number_sites as f64)
    }
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

fn variance(samples: &[f64]) -> f64 {
    let mean_value = mean(samples);
    let mean_squared =
        samples.iter().map(|value| value * value).sum::<f64>() / samples.len() as f64;
    mean_squared - mean_value * mean_value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{HeisenbergState, IsingState};
    use approx::assert_relative_eq;
    use lattice::grid;

    #[test]
    fn test_record_extends_traces() {
        let tables = grid::chain(4, -1.0);
        let state = IsingState { spins: vec![1; 4] };
        let mut estimators = Estimators::new(tables.number_sublattices);

        estimators.record(&state, &tables);
        estimators.record(&state, &tables);

        assert_eq!(estimators.samples, 2);
        assert_eq!(estimators.energy_trace, vec![-4.0, -4.0]);
        assert_eq!(estimators.magnetization_trace, vec![4.0, 4.0]);
        assert_relative_eq!(estimators.mean_energy(), -4.0);
        assert_relative_eq!(estimators.mean_magnetization(), 4.0);
    }

    #[test]
    fn test_ising_sublattice_sums_follow_labels() {
        let tables = grid::square(4, 4, 1.0);
        // Staggered configuration: +1 on sublattice 0, -1 on sublattice 1.
        let spins = tables
            .sublattice_table
            .iter()
            .map(|&s| if s == 0 { 1 } else { -1 })
            .collect();
        let state = IsingState { spins };
        let mut estimators = Estimators::new(tables.number_sublattices);
        estimators.record(&state, &tables);

        assert_relative_eq!(estimators.magnetization, 0.0);
        assert_relative_eq!(estimators.sublattice_magnetization[0], 8.0);
        assert_relative_eq!(estimators.sublattice_magnetization[1], -8.0);
        assert_relative_eq!(estimators.mean_sublattice_magnetization(0), 8.0);
    }

    #[test]
    fn test_heisenberg_sublattice_vectors() {
        let tables = grid::cubic(2, -1.0);
        let number_sites = tables.number_sites;
        let state = HeisenbergState {
            x: vec![0.0; number_sites],
            y: vec![0.0; number_sites],
            z: vec![1.0; number_sites],
        };
        let mut estimators = Estimators::new(tables.number_sublattices);
        estimators.record(&state, &tables);

        assert_relative_eq!(estimators.magnetization, number_sites as f64);
        assert_relative_eq!(estimators.spin_vector[0].z, 4.0);
        assert_relative_eq!(estimators.spin_vector[1].z, 4.0);
        assert_relative_eq!(estimators.sublattice_magnetization[0], 4.0);
        assert_relative_eq!(estimators.mean_spin_vector(0).z, 4.0);
    }

    #[test]
    fn test_fluctuation_helpers_need_two_samples() {
        let tables = grid::chain(4, -1.0);
        let state = IsingState { spins: vec![1; 4] };
        let mut estimators = Estimators::new(tables.number_sublattices);
        assert_eq!(estimators.specific_heat(1.0, 4), 0.0);

        estimators.record(&state, &tables);
        assert_eq!(estimators.magnetic_susceptibility(1.0, 4), 0.0);

        estimators.record(&state, &tables);
        assert_relative_eq!(estimators.specific_heat(1.0, 4), 0.0);
        assert_relative_eq!(estimators.magnetic_susceptibility(1.0, 4), 0.0);
    }
}
