//! Flattened neighbor lookup tables for spin lattices.
//!
//! All per-site neighbor lists live in one flattened array addressed by
//! per-site offsets and counts, with the coupling constants stored in a
//! second array aligned element-for-element. This keeps the per-move
//! neighbor gather a pair of contiguous slice reads instead of chasing
//! per-site heap allocations.

use itertools::izip;

/// Neighbor adjacency and per-bond couplings for a lattice, keyed by site.
///
/// Built once by a geometry front end and treated as read-only input by
/// the simulation engine. `neighbors_lookup_index[site]` is the start of
/// the site's block inside `neighbors_table`; the block spans
/// `neighbors_count[site]` entries, and `interaction_parameters_table`
/// carries the coupling J for each listed bond at the same offset.
///
/// Every bond is recorded from both endpoints with the same coupling.
/// The constructor enforces this; total-energy evaluation divides the
/// summed per-site energies by two on the strength of it.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTables {
    pub number_sites: usize,
    pub number_sublattices: usize,
    /// Site -> sublattice id, values in `[0, number_sublattices)`.
    pub sublattice_table: Vec<usize>,
    /// Neighbor count per site.
    pub neighbors_count: Vec<usize>,
    /// Start offset of each site's neighbor block.
    pub neighbors_lookup_index: Vec<usize>,
    /// Flattened neighbor site indices.
    pub neighbors_table: Vec<usize>,
    /// Coupling constant J for each listed bond. Negative favors
    /// alignment, positive favors anti-alignment.
    pub interaction_parameters_table: Vec<f64>,
}

/// A site's neighbors and their couplings as paired read-only slices.
///
/// Borrowed from [`LookupTables`] per energy evaluation; never stored.
#[derive(Debug, Clone, Copy)]
pub struct NeighborView<'a> {
    pub sites: &'a [usize],
    pub couplings: &'a [f64],
}

impl LookupTables {
    /// Build validated lookup tables from flattened neighbor data.
    ///
    /// The per-site offsets are derived from `neighbors_count` as a prefix
    /// sum, so each site's neighbor block is contiguous by construction.
    ///
    /// # Panics
    /// Panics if any table length disagrees with the site count, any
    /// sublattice or neighbor index is out of range, or the bond list is
    /// not symmetric. These are construction bugs in the caller, not
    /// recoverable runtime conditions.
    pub fn new(
        number_sublattices: usize,
        sublattice_table: Vec<usize>,
        neighbors_count: Vec<usize>,
        neighbors_table: Vec<usize>,
        interaction_parameters_table: Vec<f64>,
    ) -> Self {
        let number_sites = sublattice_table.len();
        assert_eq!(
            neighbors_count.len(),
            number_sites,
            "neighbors_count length must match the site count"
        );

        let total_bonds: usize = neighbors_count.iter().sum();
        assert_eq!(
            neighbors_table.len(),
            total_bonds,
            "neighbors_table length must equal the summed neighbor counts"
        );
        assert_eq!(
            interaction_parameters_table.len(),
            total_bonds,
            "interaction_parameters_table must align with neighbors_table"
        );
        assert!(
            sublattice_table.iter().all(|&s| s < number_sublattices),
            "sublattice id out of range"
        );
        assert!(
            neighbors_table.iter().all(|&n| n < number_sites),
            "neighbor site index out of range"
        );

        let mut neighbors_lookup_index = Vec::with_capacity(number_sites);
        let mut offset = 0;
        for &count in &neighbors_count {
            neighbors_lookup_index.push(offset);
            offset += count;
        }

        let tables = Self {
            number_sites,
            number_sublattices,
            sublattice_table,
            neighbors_count,
            neighbors_lookup_index,
            neighbors_table,
            interaction_parameters_table,
        };
        tables.assert_symmetric();
        tables
    }

    /// Slice out a site's neighbor block and its aligned couplings.
    ///
    /// O(1); panics on an out-of-range site index.
    pub fn neighbors(&self, site: usize) -> NeighborView<'_> {
        let start = self.neighbors_lookup_index[site];
        let end = start + self.neighbors_count[site];
        NeighborView {
            sites: &self.neighbors_table[start..end],
            couplings: &self.interaction_parameters_table[start..end],
        }
    }

    /// Largest neighbor count over all sites.
    pub fn coordination(&self) -> usize {
        self.neighbors_count.iter().copied().max().unwrap_or(0)
    }

    /// Largest coupling magnitude over all bonds.
    pub fn max_coupling(&self) -> f64 {
        self.interaction_parameters_table
            .iter()
            .fold(0.0, |acc, &j| acc.max(j.abs()))
    }

    // The undirected-bond invariant, checked as a multiset equality: the
    // directed bond list must equal its own reversal, couplings included.
    fn assert_symmetric(&self) {
        let mut forward = Vec::with_capacity(self.neighbors_table.len());
        let mut reverse = Vec::with_capacity(self.neighbors_table.len());
        for site in 0..self.number_sites {
            let view = self.neighbors(site);
            for (&neighbor, &coupling) in izip!(view.sites, view.couplings) {
                forward.push((site, neighbor, coupling.to_bits()));
                reverse.push((neighbor, site, coupling.to_bits()));
            }
        }
        forward.sort_unstable();
        reverse.sort_unstable();
        assert!(
            forward == reverse,
            "bond list is not symmetric: every neighbor pair must be recorded from both endpoints with the same coupling"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;
    use approx::assert_relative_eq;

    #[test]
    fn test_offsets_are_contiguous() {
        let tables = grid::square(4, 4, -1.0);
        for site in 0..tables.number_sites - 1 {
            assert_eq!(
                tables.neighbors_lookup_index[site + 1],
                tables.neighbors_lookup_index[site] + tables.neighbors_count[site]
            );
        }
        assert_eq!(tables.neighbors_table.len(), 4 * 16);
        assert_eq!(tables.interaction_parameters_table.len(), 4 * 16);
    }

    #[test]
    fn test_neighbor_view_pairs_sites_with_couplings() {
        let tables = grid::chain(4, -1.5);
        let view = tables.neighbors(0);
        assert_eq!(view.sites, &[3, 1]);
        assert_eq!(view.couplings, &[-1.5, -1.5]);

        let view = tables.neighbors(3);
        assert_eq!(view.sites, &[2, 0]);
    }

    #[test]
    fn test_two_site_bond_is_accepted() {
        let tables = LookupTables::new(
            2,
            vec![0, 1],
            vec![1, 1],
            vec![1, 0],
            vec![-1.0, -1.0],
        );
        assert_eq!(tables.number_sites, 2);
        assert_eq!(tables.coordination(), 1);
        assert_relative_eq!(tables.max_coupling(), 1.0);
    }

    #[test]
    #[should_panic(expected = "not symmetric")]
    fn test_one_sided_bond_is_rejected() {
        LookupTables::new(1, vec![0, 0], vec![1, 0], vec![1], vec![-1.0]);
    }

    #[test]
    #[should_panic(expected = "not symmetric")]
    fn test_mismatched_coupling_is_rejected() {
        LookupTables::new(
            1,
            vec![0, 0],
            vec![1, 1],
            vec![1, 0],
            vec![-1.0, -2.0],
        );
    }

    #[test]
    #[should_panic(expected = "neighbor site index out of range")]
    fn test_out_of_range_neighbor_is_rejected() {
        LookupTables::new(1, vec![0, 0], vec![1, 1], vec![1, 7], vec![-1.0, -1.0]);
    }

    #[test]
    #[should_panic(expected = "sublattice id out of range")]
    fn test_out_of_range_sublattice_is_rejected() {
        LookupTables::new(1, vec![0, 1], vec![0, 0], vec![], vec![]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_site_lookup_fails_fast() {
        let tables = grid::chain(4, -1.0);
        tables.neighbors(4);
    }
}
