//! Shared fixtures for unit tests.

use itertools::iproduct;
use nalgebra::Vector3;

use crate::auxiliary::cell::{Cell, PeriodicCell};

/// Returns the face-centred cubic cell of solid helium.
pub(crate) fn fcc_helium_cell() -> Cell {
    Cell::builder()
        .lattice([
            [0.0, 1.7834, 1.7834],
            [1.7834, 0.0, 1.7834],
            [1.7834, 1.7834, 0.0],
        ])
        .build()
        .expect("Unable to construct the fcc helium cell.")
}

/// Returns a $`\Gamma`$-centred Monkhorst-Pack grid of k-points in Cartesian coordinates, with
/// the last reciprocal axis running fastest.
pub(crate) fn make_kpts<C: PeriodicCell>(cell: &C, nks: [usize; 3]) -> Vec<Vector3<f64>> {
    let b = cell
        .reciprocal_vectors()
        .expect("Unable to obtain the reciprocal lattice vectors.");
    iproduct!(0..nks[0], 0..nks[1], 0..nks[2])
        .map(|(i, j, k)| {
            let scaled = Vector3::new(
                i as f64 / nks[0] as f64,
                j as f64 / nks[1] as f64,
                k as f64 / nks[2] as f64,
            );
            b.transpose() * scaled
        })
        .collect()
}

/// Returns the fingerprint $`\sum_i a_i \cos i`$ of a sequence of values.
pub(crate) fn finger<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| v * (i as f64).cos())
        .sum()
}
