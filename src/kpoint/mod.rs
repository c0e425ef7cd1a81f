//! Tolerance-based comparison and deduplication of k-points.

use nalgebra::Vector3;


/// Default threshold on the sum of absolute component differences below which two k-points are
/// considered identical.
pub const KPT_DIFF_TOL: f64 = 1e-6;

// =================
// Utility functions
// =================

/// Determines if a k-point vanishes.
///
/// # Arguments
///
/// * `kpt` - The k-point to be checked.
/// * `thresh` - Threshold on the sum of absolute component values.
///
/// # Returns
///
/// `true` if $`\sum_i |k_i| < `$ `thresh`.
pub fn is_zero(kpt: &Vector3<f64>, thresh: f64) -> bool {
    kpt.abs().sum() < thresh
}

/// Determines if a k-point is the $`\Gamma`$ point. This is the same as [`is_zero`].
pub fn gamma_point(kpt: &Vector3<f64>, thresh: f64) -> bool {
    is_zero(kpt, thresh)
}

/// Locates a k-point in a set of k-points.
///
/// # Arguments
///
/// * `kpt` - The k-point to be located.
/// * `kpts` - The k-points to search.
/// * `thresh` - Threshold for [`is_zero`].
///
/// # Returns
///
/// The indices of all k-points in `kpts` that coincide with `kpt` within `thresh`. This is
/// empty if there are none, and may contain more than one index if `kpts` are not distinct.
pub fn member(kpt: &Vector3<f64>, kpts: &[Vector3<f64>], thresh: f64) -> Vec<usize> {
    kpts.iter()
        .enumerate()
        .filter_map(|(i, k)| is_zero(&(k - kpt), thresh).then_some(i))
        .collect()
}

/// A structure holding the outcome of k-point deduplication.
#[derive(Clone, Debug, PartialEq)]
pub struct KptUniqueResult {
    /// The unique k-points in the order in which they first occur.
    pub unique_kpts: Vec<Vector3<f64>>,

    /// The index in the original list of the first occurrence of each unique k-point.
    pub unique_indices: Vec<usize>,

    /// For each original k-point, the index of its representative in [`Self::unique_kpts`].
    pub inverse: Vec<usize>,
}

/// Deduplicates a list of k-points.
///
/// The list is scanned from left to right. Each k-point that has not yet been seen opens a new
/// group, to which every k-point within `thresh` (in the sum of absolute component
/// differences) of it is assigned.
///
/// # Arguments
///
/// * `kpts` - The k-points to deduplicate.
/// * `thresh` - Threshold for k-point comparisons.
///
/// # Returns
///
/// The unique k-points, their first-occurrence indices, and the inverse map.
pub fn unique(kpts: &[Vector3<f64>], thresh: f64) -> KptUniqueResult {
    let nkpts = kpts.len();
    let mut unique_kpts = Vec::new();
    let mut unique_indices = Vec::new();
    let mut inverse = vec![0; nkpts];
    let mut seen = vec![false; nkpts];
    for (i, kpt) in kpts.iter().enumerate() {
        if seen[i] {
            continue;
        }
        let n = unique_kpts.len();
        unique_kpts.push(*kpt);
        unique_indices.push(i);
        kpts.iter().enumerate().for_each(|(j, other)| {
            if is_zero(&(other - kpt), thresh) {
                inverse[j] = n;
                seen[j] = true;
            }
        });
    }
    KptUniqueResult {
        unique_kpts,
        unique_indices,
        inverse,
    }
}
