//! Minimal periodic lattices with uniform couplings.
//!
//! These builders cover the geometries the tests and the command line
//! need: a 1D ring, a 2D torus, and a 3D torus, all with nearest-neighbor
//! bonds and a single coupling constant on every bond. Sites carry a
//! two-sublattice checkerboard label (parity of the coordinate sum) so
//! sublattice-resolved estimators work on every built-in geometry.
//! Arbitrary crystal structures come from an external geometry front end
//! that produces [`LookupTables`] directly.

use crate::tables::LookupTables;

/// 1D ring with `length` sites, coordination 2.
pub fn chain(length: usize, coupling: f64) -> LookupTables {
    assert!(length >= 2, "periodic chain needs at least 2 sites");

    let mut sublattice_table = Vec::with_capacity(length);
    let mut neighbors_table = Vec::with_capacity(2 * length);
    for site in 0..length {
        sublattice_table.push(site % 2);
        neighbors_table.push((site + length - 1) % length);
        neighbors_table.push((site + 1) % length);
    }

    LookupTables::new(
        2,
        sublattice_table,
        vec![2; length],
        neighbors_table,
        vec![coupling; 2 * length],
    )
}

/// 2D torus of `width` x `height` sites, coordination 4.
///
/// Sites are indexed row-major: `site = y * width + x`.
pub fn square(width: usize, height: usize, coupling: f64) -> LookupTables {
    assert!(
        width >= 2 && height >= 2,
        "periodic square lattice needs at least 2 sites per axis"
    );

    let number_sites = width * height;
    let mut sublattice_table = Vec::with_capacity(number_sites);
    let mut neighbors_table = Vec::with_capacity(4 * number_sites);
    for y in 0..height {
        for x in 0..width {
            sublattice_table.push((x + y) % 2);
            let left = y * width + (x + width - 1) % width;
            let right = y * width + (x + 1) % width;
            let up = ((y + height - 1) % height) * width + x;
            let down = ((y + 1) % height) * width + x;
            neighbors_table.extend_from_slice(&[left, right, up, down]);
        }
    }

    LookupTables::new(
        2,
        sublattice_table,
        vec![4; number_sites],
        neighbors_table,
        vec![coupling; 4 * number_sites],
    )
}

/// 3D torus of `length` sites per axis, coordination 6.
///
/// Sites are indexed `site = (z * length + y) * length + x`.
pub fn cubic(length: usize, coupling: f64) -> LookupTables {
    assert!(
        length >= 2,
        "periodic cubic lattice needs at least 2 sites per axis"
    );

    let number_sites = length * length * length;
    let index = |x: usize, y: usize, z: usize| (z * length + y) * length + x;
    let mut sublattice_table = Vec::with_capacity(number_sites);
    let mut neighbors_table = Vec::with_capacity(6 * number_sites);
    for z in 0..length {
        for y in 0..length {
            for x in 0..length {
                sublattice_table.push((x + y + z) % 2);
                neighbors_table.extend_from_slice(&[
                    index((x + length - 1) % length, y, z),
                    index((x + 1) % length, y, z),
                    index(x, (y + length - 1) % length, z),
                    index(x, (y + 1) % length, z),
                    index(x, y, (z + length - 1) % length),
                    index(x, y, (z + 1) % length),
                ]);
            }
        }
    }

    LookupTables::new(
        2,
        sublattice_table,
        vec![6; number_sites],
        neighbors_table,
        vec![coupling; 6 * number_sites],
    )
}
