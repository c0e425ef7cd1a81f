//! Transformations of four-index tensors between members of a k-point triple orbit.

use ndarray::{Array4, ArrayBase, Data, Ix4};
use num_complex::ComplexFloat;

use crate::symmetry::KptSymmetryOperation;

#[cfg(test)]
#[path = "symmetry_transformation_tests.rs"]
mod symmetry_transformation_tests;

// =================
// Trait definitions
// =================

/// Trait for four-index tensors that can be carried from the canonical triple of an orbit to
/// any other member.
pub trait KptSymmetryTransformable {
    /// The type of the transformed tensor.
    type Output;

    /// Transforms a tensor stored for a canonical triple into the tensor for the orbit member
    /// reached by `op`.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation mapping the canonical triple onto the target triple.
    ///
    /// # Returns
    ///
    /// An owned transformed tensor.
    fn transform_kpt_symm(&self, op: KptSymmetryOperation) -> Self::Output;
}

impl<S, T> KptSymmetryTransformable for ArrayBase<S, Ix4>
where
    S: Data<Elem = T>,
    T: ComplexFloat,
{
    type Output = Array4<T>;

    /// Transforms the tensor with axes ordered as $`(p, q, r, s)`$:
    ///
    /// * [`KptSymmetryOperation::Identity`]: unchanged,
    /// * [`KptSymmetryOperation::ParticleExchange`]: axes permuted to $`(2, 3, 0, 1)`$,
    /// * [`KptSymmetryOperation::ConjugateOrbitalSwap`]: axes permuted to $`(1, 0, 3, 2)`$ and
    /// complex-conjugated,
    /// * [`KptSymmetryOperation::ConjugateReversal`]: axes permuted to $`(3, 2, 1, 0)`$ and
    /// complex-conjugated.
    fn transform_kpt_symm(&self, op: KptSymmetryOperation) -> Array4<T> {
        let eri = self.view();
        match op {
            KptSymmetryOperation::Identity => eri.to_owned(),
            KptSymmetryOperation::ParticleExchange => eri.permuted_axes([2, 3, 0, 1]).to_owned(),
            KptSymmetryOperation::ConjugateOrbitalSwap => {
                eri.permuted_axes([1, 0, 3, 2]).mapv(|x| x.conj())
            }
            KptSymmetryOperation::ConjugateReversal => {
                eri.permuted_axes([3, 2, 1, 0]).mapv(|x| x.conj())
            }
        }
    }
}
