//! Single-site Metropolis dynamics.

use lattice::LookupTables;
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::energy;
use crate::state::SpinModel;

/// Attempt/acceptance counters for a run.
#[derive(Debug, Clone, Default)]
pub struct SweepStatistics {
    pub attempts: u64,
    pub accepted: u64,
}

impl SweepStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }
}

/// Metropolis engine: owns the spin state, the temperature, and the
/// run's random number generator.
///
/// The generator is seeded once per run and never shared, so a run is a
/// deterministic function of its seed, configuration, and tables.
#[derive(Debug)]
pub struct Metropolis<M: SpinModel> {
    pub state: M,
    /// Temperature in reduced units (k_B = 1). Zero is a quench: only
    /// downhill and flat moves are accepted.
    pub temperature: f64,
    rng: StdRng,
    /// Completed sweep counter.
    pub step: u64,
    pub stats: SweepStatistics,
}

impl<M: SpinModel> Metropolis<M> {
    pub fn new(state: M, temperature: f64, seed: u64) -> Self {
        Self {
            state,
            temperature,
            rng: StdRng::seed_from_u64(seed),
            step: 0,
            stats: SweepStatistics::new(),
        }
    }

    /// Seed the generator, then draw the initial configuration from it,
    /// so state initialization and dynamics share one stream.
    pub fn from_random_state(number_sites: usize, temperature: f64, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = M::sample_random_state(number_sites, &mut rng);
        Self {
            state,
            temperature,
            rng,
            step: 0,
            stats: SweepStatistics::new(),
        }
    }

    /// One sweep: `number_sites` update attempts at uniformly random
    /// sites, drawn with replacement. Attempts later in the sweep observe
    /// the flips accepted earlier in it.
    pub fn sweep(&mut self, tables: &LookupTables) {
        for _ in 0..tables.number_sites {
            let site = self.rng.gen_range(0..tables.number_sites);
            self.attempt_update(site, tables);
        }
        self.step += 1;
    }

    /// Metropolis acceptance for one proposed update: accept on
    /// `delta_e <= 0`, otherwise with probability `exp(-delta_e / T)`.
    /// The flat-or-downhill branch short-circuits, so temperature zero
    /// never reaches the Boltzmann factor.
    fn attempt_update(&mut self, site: usize, tables: &LookupTables) -> bool {
        self.stats.attempts += 1;

        let old_energy = energy::site_energy(&self.state, site, tables);
        let candidate = self.state.propose(site, &mut self.rng);
        let new_energy = energy::spin_energy(&self.state, site, candidate, tables);
        let delta_e = new_energy - old_energy;

        let accept = if delta_e <= 0.0 {
            true
        } else if self.temperature == 0.0 {
            false
        } else {
            self.rng.gen::<f64>() < (-delta_e / self.temperature).exp()
        };

        if accept {
            self.state.write_site(site, candidate);
            self.stats.accepted += 1;
        }
        accept
    }
}
