//! Antipermutational symmetry checks for arrays carrying k-point indices.
//!
//! An `n`-particle array with k-point symmetry has `4n - 1` axes: `2n - 1` k-point axes (the
//! last k-point being fixed by momentum conservation) followed by `2n` orbital axes.

use log;
use ndarray::{ArrayBase, Data, IxDyn};
use num_complex::ComplexFloat;

use crate::error::KptsError;

#[cfg(test)]
#[path = "antisymmetry_tests.rs"]
mod antisymmetry_tests;

/// Default threshold on the norm of `A + Aᵖ` below which an array is deemed antisymmetric.
pub const ANTIPERM_TOL: f64 = 1e-8;

/// The largest number of particles supported.
const MAX_NPARTICLES: usize = 3;

/// Checks whether an array with k-point symmetry is antisymmetric with respect to swapping two
/// particles.
///
/// Swapping particles `idx1` and `idx2` swaps both their k-point axes and their orbital axes.
/// For example, for a two-particle array `t2[ki, kj, ka, i, j, a, b]`, `idx1 = 0` and
/// `idx2 = 1` swap `ki` with `kj` and `i` with `j`.
///
/// # Arguments
///
/// * `array` - The array to check, with `4n - 1` axes for `n` particles.
/// * `idx1` - The first particle index, which must be less than `2n - 1`.
/// * `idx2` - The second particle index, which must be less than `2n - 1`.
/// * `tolerance` - The threshold on the Frobenius norm of `A + Aᵖ`.
///
/// # Returns
///
/// `true` if the array is antisymmetric with respect to the swap within `tolerance`.
///
/// # Errors
///
/// Errors with [`KptsError::InvalidArgument`] if the number of axes is not of the form
/// `4n - 1`, if a particle index is out of range, or if the swapped axes have different
/// extents, and with [`KptsError::Unsupported`] for more than three particles.
pub fn check_kpt_antiperm_symmetry<S, T>(
    array: &ArrayBase<S, IxDyn>,
    idx1: usize,
    idx2: usize,
    tolerance: f64,
) -> Result<bool, KptsError>
where
    S: Data<Elem = T>,
    T: ComplexFloat,
    T::Real: Into<f64>,
{
    let ndim = array.ndim();
    if (ndim + 1) % 4 != 0 {
        return Err(KptsError::InvalidArgument(format!(
            "an array with k-point symmetry must have 4n - 1 axes, got {ndim}"
        )));
    }
    let nparticles = (ndim + 1) / 4;
    if nparticles > MAX_NPARTICLES {
        return Err(KptsError::Unsupported(format!(
            "antipermutational symmetry checks are only implemented for up to \
            {MAX_NPARTICLES} particles, got {nparticles}"
        )));
    }
    let nkpt_axes = 2 * nparticles - 1;
    if idx1 >= nkpt_axes || idx2 >= nkpt_axes {
        return Err(KptsError::InvalidArgument(format!(
            "particle indices ({idx1}, {idx2}) must be less than {nkpt_axes}; the last k-point \
            index is fixed by momentum conservation and cannot be swapped"
        )));
    }

    let mut perm = (0..ndim).collect::<Vec<_>>();
    perm.swap(idx1, idx2);
    perm.swap(nkpt_axes + idx1, nkpt_axes + idx2);
    let shape = array.shape();
    if let Some(axis) = (0..ndim).find(|&axis| shape[axis] != shape[perm[axis]]) {
        return Err(KptsError::InvalidArgument(format!(
            "axes {axis} and {} to be swapped have different extents {} and {}",
            perm[axis], shape[axis], shape[perm[axis]]
        )));
    }

    // The sign expected of a general permutation. Only the plain swap is tested for now.
    let sign = if (idx1.abs_diff(idx2) + 1) % 2 == 0 {
        1
    } else {
        -1
    };
    log::debug!(
        "Checking antipermutation of particles {idx1} and {idx2} (permutation {perm:?}, \
        sign {sign})."
    );

    let permuted = array.view().permuted_axes(perm);
    let norm = array
        .iter()
        .zip(permuted.iter())
        .map(|(&a, &b)| {
            let d: f64 = (a + b).abs().into();
            d * d
        })
        .sum::<f64>()
        .sqrt();
    log::debug!("Norm of A + Aᵖ: {norm:.3e}");
    Ok(norm < tolerance)
}
