//! Momentum conservation amongst k-points.
//!
//! For a set of k-points $`\{\mathbf{k}_n\}`$ of a lattice with real-space vectors
//! $`\mathbf{a}_w`$, momentum is conserved by a signed combination of k-points when
//! ```math
//!     \Big( \sum_n \pm \mathbf{k}_n \Big) \cdot \mathbf{a}_w = 2 \pi m_w,
//!     \quad m_w \in \mathbb{Z}
//! ```
//! for every $`w`$. The functions here locate, for every combination of the given k-points,
//! the one remaining k-point that closes such a relation.

use std::fmt;
use std::ops::Range;

use itertools::{iproduct, Itertools};
use log;
use nalgebra::{Matrix3, Vector3};
use ndarray::{Array3, ArrayD, IxDyn};
use rayon::prelude::*;

use crate::auxiliary::cell::PeriodicCell;
use crate::error::KptsError;


/// Default threshold on the deviation of $`\Delta\mathbf{k} \cdot \mathbf{a}_w / 2\pi`$ from the
/// nearest integer.
pub const KCONSERV_TOL: f64 = 1e-9;

// ================
// Enum definitions
// ================

/// An enumerated type to select the k-point indices spanned by one index of a conservation
/// array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KptIndexSelection {
    /// Variant for a single fixed k-point. The corresponding axis is squeezed from the result.
    Single(usize),

    /// Variant for a list of k-points. The corresponding axis is kept, even if it has length one.
    Multiple(Vec<usize>),
}

impl KptIndexSelection {
    /// Returns the selected k-point indices.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::Single(i) => vec![*i],
            Self::Multiple(is) => is.clone(),
        }
    }

    /// Returns `true` if this selection does not contribute an axis to the result.
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }
}

impl From<usize> for KptIndexSelection {
    fn from(value: usize) -> Self {
        Self::Single(value)
    }
}

impl From<Range<usize>> for KptIndexSelection {
    fn from(value: Range<usize>) -> Self {
        Self::Multiple(value.collect())
    }
}

impl From<Vec<usize>> for KptIndexSelection {
    fn from(value: Vec<usize>) -> Self {
        Self::Multiple(value)
    }
}

impl fmt::Display for KptIndexSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(i) => write!(f, "{i}"),
            Self::Multiple(is) => write!(f, "[{}]", is.iter().join(", ")),
        }
    }
}

// =================
// Utility functions
// =================

/// Returns an iterator over all ordered triples of k-point indices in lexicographic order.
pub fn loop_kkk(nkpts: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    iproduct!(0..nkpts, 0..nkpts, 0..nkpts)
}

/// Returns the largest deviation of the components of `a * dk` from their nearest integers.
fn integer_residual(a: &Matrix3<f64>, dk: &Vector3<f64>) -> f64 {
    (a * dk)
        .iter()
        .map(|x| (x - x.round()).abs())
        .fold(0.0, f64::max)
}

/// Finds the unique k-point $`\mathbf{k}_c`$ such that `ksum` $`- \mathbf{k}_c`$ is a
/// reciprocal lattice vector.
///
/// # Arguments
///
/// * `a` - The lattice vectors divided by $`2\pi`$.
/// * `ksum` - The signed sum of the given k-points.
/// * `kpts` - All candidate k-points.
/// * `thresh` - Threshold for the integer test.
/// * `label` - A description of the k-point tuple used in error messages.
///
/// # Errors
///
/// Errors if no candidate, or more than one candidate, closes the relation.
fn find_conserving_kpt<F>(
    a: &Matrix3<f64>,
    ksum: &Vector3<f64>,
    kpts: &[Vector3<f64>],
    thresh: f64,
    label: F,
) -> Result<usize, KptsError>
where
    F: Fn() -> String,
{
    let mut candidates = kpts
        .iter()
        .enumerate()
        .filter(|(_, kpt)| integer_residual(a, &(ksum - *kpt)) < thresh)
        .map(|(n, _)| n);
    match (candidates.next(), candidates.next()) {
        (Some(n), None) => Ok(n),
        (None, _) => Err(KptsError::ConservationNotFound(format!(
            "no k-point conserves momentum for {}",
            label()
        ))),
        (Some(n0), Some(n1)) => Err(KptsError::ConservationNotFound(format!(
            "k-points {n0}, {n1}, and possibly others all conserve momentum for {}",
            label()
        ))),
    }
}

/// Checks that all selected indices refer to existing k-points.
fn check_indices(indices: &[usize], nkpts: usize) -> Result<(), KptsError> {
    match indices.iter().find(|&&i| i >= nkpts) {
        Some(i) => Err(KptsError::InvalidArgument(format!(
            "k-point index {i} is out of range for {nkpts} k-points"
        ))),
        None => Ok(()),
    }
}

// ======================
// Conservation functions
// ======================

/// Computes the momentum conservation array for four k-points.
///
/// Given k-point indices $`(k, l, m)`$, the resulting array stores at `[k, l, m]` the index $`n`$
/// satisfying
/// ```math
///     (\mathbf{k}_k - \mathbf{k}_l + \mathbf{k}_m - \mathbf{k}_n) \cdot \mathbf{a}_w = 2 \pi m_w.
/// ```
/// Integrals of the form $`[\phi^*_{k}(1) \phi_{l}(1) | \phi^*_{m}(2) \phi_{n}(2)]`$ vanish unless
/// $`n`$ satisfies this relation.
///
/// # Arguments
///
/// * `cell` - The periodic cell providing the lattice vectors.
/// * `kpts` - The k-points in the same Cartesian frame as the lattice vectors.
/// * `thresh` - Threshold for the integer test, typically [`KCONSERV_TOL`].
///
/// # Returns
///
/// The conservation array of shape `(nkpts, nkpts, nkpts)`.
///
/// # Errors
///
/// Errors if any triple does not have exactly one momentum-conserving k-point.
pub fn get_kconserv<C: PeriodicCell>(
    cell: &C,
    kpts: &[Vector3<f64>],
    thresh: f64,
) -> Result<Array3<usize>, KptsError> {
    let nkpts = kpts.len();
    let a = cell.lattice_transform();
    log::debug!("Computing four-point momentum conservation for {nkpts} k-points...");
    let kconserv = loop_kkk(nkpts)
        .collect_vec()
        .into_par_iter()
        .map(|(k, l, m)| {
            let kklm = kpts[k] - kpts[l] + kpts[m];
            find_conserving_kpt(&a, &kklm, kpts, thresh, || {
                format!("k-point triple ({k}, {l}, {m})")
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("Computing four-point momentum conservation for {nkpts} k-points... Done.");
    Array3::from_shape_vec((nkpts, nkpts, nkpts), kconserv)
        .map_err(|err| KptsError::SizeMismatch(err.to_string()))
}

/// Computes the momentum conservation array for six k-points.
///
/// Given selections for $`(i, j, k, a, b)`$, the resulting array stores the index $`c`$
/// satisfying
/// ```math
///     (\mathbf{k}_i + \mathbf{k}_j + \mathbf{k}_k
///       - \mathbf{k}_a - \mathbf{k}_b - \mathbf{k}_c) \cdot \mathbf{a}_w = 2 \pi m_w.
/// ```
///
/// # Arguments
///
/// * `cell` - The periodic cell providing the lattice vectors.
/// * `kpts` - The k-points in the same Cartesian frame as the lattice vectors.
/// * `kijkab` - Selections of k-point indices for $`i`$, $`j`$, $`k`$, $`a`$, and $`b`$.
/// * `thresh` - Threshold for the integer test, typically [`KCONSERV_TOL`].
///
/// # Returns
///
/// The conservation array indexed by position within each selection, with the axes of
/// [`KptIndexSelection::Single`] selections removed.
///
/// # Errors
///
/// Errors if a selected index is out of range, or if any tuple does not have exactly one
/// momentum-conserving k-point.
pub fn get_kconserv3<C: PeriodicCell>(
    cell: &C,
    kpts: &[Vector3<f64>],
    kijkab: &[KptIndexSelection; 5],
    thresh: f64,
) -> Result<ArrayD<usize>, KptsError> {
    let nkpts = kpts.len();
    let a = cell.lattice_transform();
    let [is, js, ks, as_, bs] = kijkab.clone().map(|sel| sel.indices());
    for indices in [&is, &js, &ks, &as_, &bs] {
        check_indices(indices, nkpts)?;
    }
    log::debug!(
        "Computing six-point momentum conservation for selections ({})...",
        kijkab.iter().join(", ")
    );
    let kconserv = iproduct!(is.iter(), js.iter(), ks.iter(), as_.iter(), bs.iter())
        .collect_vec()
        .into_par_iter()
        .map(|(&i, &j, &k, &ka, &kb)| {
            let kijkab_sum = kpts[i] + kpts[j] + kpts[k] - kpts[ka] - kpts[kb];
            find_conserving_kpt(&a, &kijkab_sum, kpts, thresh, || {
                format!("k-point quintuple ({i}, {j}, {k}, {ka}, {kb})")
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!("Computing six-point momentum conservation... Done.");

    let shape = kijkab
        .iter()
        .filter(|sel| !sel.is_single())
        .map(|sel| sel.indices().len())
        .collect_vec();
    ArrayD::from_shape_vec(IxDyn(&shape), kconserv)
        .map_err(|err| KptsError::SizeMismatch(err.to_string()))
}

// ===============
// Packed offsets
// ===============

/// A structure describing how the four-index blocks of all k-point triples are packed into a
/// single buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KptArrayOffsets {
    /// The offset of each block, in [`loop_kkk`] order.
    pub offsets: Vec<usize>,

    /// The number of elements in each block, in [`loop_kkk`] order.
    pub sizes: Vec<usize>,

    /// The total number of elements of all blocks.
    pub total: usize,
}

/// Computes offsets and sizes of the blocks $`(kk, kl, km, kn)`$ of a four-index array with a
/// variable number of orbitals per k-point, where $`kn`$ is fixed by momentum conservation.
///
/// # Arguments
///
/// * `kconserv` - The four-point conservation array from [`get_kconserv`].
/// * `norb_per_kpt` - The number of orbitals at each k-point.
///
/// # Errors
///
/// Errors if `norb_per_kpt` does not have one entry per k-point, or if `kconserv` is not a
/// cube.
pub fn get_kpt_array_offsets(
    kconserv: &Array3<usize>,
    norb_per_kpt: &[usize],
) -> Result<KptArrayOffsets, KptsError> {
    let nkpts = norb_per_kpt.len();
    if kconserv.shape() != [nkpts, nkpts, nkpts] {
        return Err(KptsError::InvalidArgument(format!(
            "conservation array of shape {:?} is incompatible with {nkpts} k-points",
            kconserv.shape()
        )));
    }
    let mut offsets = Vec::with_capacity(kconserv.len());
    let mut sizes = Vec::with_capacity(kconserv.len());
    let mut offset = 0;
    for (kk, kl, km) in loop_kkk(nkpts) {
        let kn = kconserv[(kk, kl, km)];
        let norb_kn = norb_per_kpt.get(kn).ok_or_else(|| {
            KptsError::InvalidArgument(format!("conserving k-point index {kn} is out of range"))
        })?;
        let size = norb_per_kpt[kk] * norb_per_kpt[kl] * norb_per_kpt[km] * norb_kn;
        offsets.push(offset);
        sizes.push(size);
        offset += size;
    }
    Ok(KptArrayOffsets {
        offsets,
        sizes,
        total: offset,
    })
}
