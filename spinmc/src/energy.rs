//! Site and lattice energy evaluation.
//!
//! The Hamiltonian is `H = sum_bonds J_ij (s_i . s_j)` with J < 0
//! ferromagnetic. Per-site energies sum every bond touching the site, so
//! the lattice total halves the sum; the halving is valid because the
//! lookup tables record every bond from both endpoints with the same
//! coupling.

use itertools::izip;
use lattice::LookupTables;

use crate::state::SpinModel;

/// Energy of a candidate spin value placed in `site`'s neighborhood,
/// with the neighbors unchanged: `sum_j J_ij (value . s_j)`.
///
/// O(degree). This is the evaluation the Metropolis trial uses, so a move
/// never pays for a full lattice recomputation.
pub fn spin_energy<M: SpinModel>(
    state: &M,
    site: usize,
    value: M::Spin,
    tables: &LookupTables,
) -> f64 {
    let view = tables.neighbors(site);
    izip!(view.sites, view.couplings)
        .map(|(&neighbor, &coupling)| state.pair_energy(value, neighbor, coupling))
        .sum()
}

/// Interaction energy attributable to `site` at its current value.
pub fn site_energy<M: SpinModel>(state: &M, site: usize, tables: &LookupTables) -> f64 {
    spin_energy(state, site, state.read_site(site), tables)
}

/// Total lattice energy: `sum_i site_energy(i) / 2`.
///
/// Each undirected bond is counted once from each endpoint, hence the
/// division by two.
pub fn total_energy<M: SpinModel>(state: &M, tables: &LookupTables) -> f64 {
    let summed: f64 = (0..tables.number_sites)
        .map(|site| site_energy(state, site, tables))
        .sum();
    summed / 2.0
}
