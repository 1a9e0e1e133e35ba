//! Spin-state representations and their update proposals.
//!
//! Two physically distinct representations share one capability trait:
//! discrete ±1 spins and classical unit vectors. The engine and the
//! estimator accumulator only ever talk to [`SpinModel`], so the
//! Metropolis pathway is written once.

use std::f64::consts::PI;

use lattice::LookupTables;
use nalgebra::Vector3;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::estimators::Estimators;

/// Allowed drift of a Heisenberg vector's norm from 1.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-9;

/// Capability interface shared by both spin representations.
///
/// The engine mutates state exclusively through [`write_site`]; everything
/// else is read-only. `pair_energy` is the representation-specific inner
/// product scaled by the bond coupling, the one point where the two
/// models differ along the energy pathway.
///
/// [`write_site`]: SpinModel::write_site
pub trait SpinModel {
    type Spin: Copy;

    /// Draw a fresh random configuration for `number_sites` sites.
    fn sample_random_state(number_sites: usize, rng: &mut StdRng) -> Self;

    fn number_sites(&self) -> usize;

    /// O(1) spin read.
    fn read_site(&self, site: usize) -> Self::Spin;

    /// In-place spin write; the only mutation path.
    fn write_site(&mut self, site: usize, value: Self::Spin);

    /// Candidate value for a Metropolis move at `site`.
    fn propose(&self, site: usize, rng: &mut StdRng) -> Self::Spin;

    /// Energy of one bond: `J * (value . s_neighbor)`.
    fn pair_energy(&self, value: Self::Spin, neighbor: usize, coupling: f64) -> f64;

    /// Write this configuration's magnetization estimators into
    /// `estimators` (latest-sample fields only; the accumulator owns the
    /// traces and running sums).
    fn accumulate(&self, tables: &LookupTables, estimators: &mut Estimators);
}

/// Draw a unit vector uniformly on the sphere.
///
/// Azimuth is uniform in `[0, 2pi)`; the polar angle is `arccos` of a
/// uniform draw on `[-1, 1)`, which makes the construction area-uniform.
pub fn random_unit_vector(rng: &mut StdRng) -> Vector3<f64> {
    let theta = 2.0 * PI * rng.gen::<f64>();
    let phi = f64::acos(rng.gen_range(-1.0..1.0));
    let sin_phi = phi.sin();
    Vector3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), phi.cos())
}

/// Discrete spins, one of ±1 per site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsingState {
    pub spins: Vec<i8>,
}

impl SpinModel for IsingState {
    type Spin = i8;

    fn sample_random_state(number_sites: usize, rng: &mut StdRng) -> Self {
        let spins = (0..number_sites)
            .map(|_| if rng.gen_bool(0.5) { 1 } else { -1 })
            .collect();
        Self { spins }
    }

    fn number_sites(&self) -> usize {
        self.spins.len()
    }

    fn read_site(&self, site: usize) -> i8 {
        self.spins[site]
    }

    fn write_site(&mut self, site: usize, value: i8) {
        assert!(value == 1 || value == -1, "Ising spin must be +1 or -1");
        self.spins[site] = value;
    }

    /// The only possible move is the flip of the current sign.
    fn propose(&self, site: usize, _rng: &mut StdRng) -> i8 {
        -self.spins[site]
    }

    fn pair_energy(&self, value: i8, neighbor: usize, coupling: f64) -> f64 {
        coupling * value as f64 * self.spins[neighbor] as f64
    }

    fn accumulate(&self, tables: &LookupTables, estimators: &mut Estimators) {
        estimators.magnetization = self.spins.iter().map(|&s| s as f64).sum();
        for sum in estimators.sublattice_magnetization.iter_mut() {
            *sum = 0.0;
        }
        for (site, &spin) in self.spins.iter().enumerate() {
            estimators.sublattice_magnetization[tables.sublattice_table[site]] += spin as f64;
        }
    }
}

/// Classical unit vectors, stored as one array per spatial component.
#[derive(Debug, Clone, PartialEq)]
pub struct HeisenbergState {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl HeisenbergState {
    pub fn site_vector(&self, site: usize) -> Vector3<f64> {
        Vector3::new(self.x[site], self.y[site], self.z[site])
    }
}

impl SpinModel for HeisenbergState {
    type Spin = Vector3<f64>;

    fn sample_random_state(number_sites: usize, rng: &mut StdRng) -> Self {
        let mut x = Vec::with_capacity(number_sites);
        let mut y = Vec::with_capacity(number_sites);
        let mut z = Vec::with_capacity(number_sites);
        for _ in 0..number_sites {
            let spin = random_unit_vector(rng);
            x.push(spin.x);
            y.push(spin.y);
            z.push(spin.z);
        }
        Self { x, y, z }
    }

    fn number_sites(&self) -> usize {
        self.x.len()
    }

    fn read_site(&self, site: usize) -> Vector3<f64> {
        self.site_vector(site)
    }

    fn write_site(&mut self, site: usize, value: Vector3<f64>) {
        let deviation = (value.norm() - 1.0).abs();
        assert!(
            deviation <= UNIT_NORM_TOLERANCE,
            "spin vector off the unit sphere at site {}: deviation {:e}",
            site,
            deviation
        );
        self.x[site] = value.x;
        self.y[site] = value.y;
        self.z[site] = value.z;
    }

    /// Full reorientation: a fresh uniform draw on the sphere,
    /// independent of the current orientation.
    fn propose(&self, _site: usize, rng: &mut StdRng) -> Vector3<f64> {
        random_unit_vector(rng)
    }

    fn pair_energy(&self, value: Vector3<f64>, neighbor: usize, coupling: f64) -> f64 {
        coupling * value.dot(&self.site_vector(neighbor))
    }

    fn accumulate(&self, tables: &LookupTables, estimators: &mut Estimators) {
        for vector in estimators.spin_vector.iter_mut() {
            *vector = Vector3::zeros();
        }
        for site in 0..self.number_sites() {
            estimators.spin_vector[tables.sublattice_table[site]] += self.site_vector(site);
        }
        let total = estimators
            .spin_vector
            .iter()
            .fold(Vector3::zeros(), |acc, &v| acc + v);
        estimators.magnetization = total.norm();
        for (sum, vector) in estimators
            .sublattice_magnetization
            .iter_mut()
            .zip(estimators.spin_vector.iter())
        {
            *sum = vector.norm();
        }
    }
}
