use ndarray::{ArrayD, IxDyn};
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::antisymmetry::{check_kpt_antiperm_symmetry, ANTIPERM_TOL};
use crate::error::KptsError;

fn random_tensor(shape: &[usize], seed: u64) -> ArrayD<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    ArrayD::from_shape_simple_fn(IxDyn(shape), || rng.gen::<f64>())
}

/// Returns `X - Xᵖ` for the permutation `perm`.
fn antisymmetrise(x: &ArrayD<f64>, perm: &[usize]) -> ArrayD<f64> {
    x - &x.view().permuted_axes(perm.to_vec())
}

#[test]
fn test_antiperm_two_particles() {
    let (nkpts, nocc, nvir) = (3, 4, 5);
    let x = random_tensor(&[nkpts, nkpts, nkpts, nocc, nocc, nvir, nvir], 0);
    let t2 = antisymmetrise(&x, &[1, 0, 2, 4, 3, 5, 6]);
    assert!(check_kpt_antiperm_symmetry(&t2, 0, 1, ANTIPERM_TOL).unwrap());
    assert!(check_kpt_antiperm_symmetry(&t2, 1, 0, ANTIPERM_TOL).unwrap());
    assert!(!check_kpt_antiperm_symmetry(&x, 0, 1, ANTIPERM_TOL).unwrap());

    // Swapping ka with ki also swaps the occupied and virtual orbital axes, whose extents
    // differ here.
    assert!(matches!(
        check_kpt_antiperm_symmetry(&t2, 0, 2, ANTIPERM_TOL),
        Err(KptsError::InvalidArgument(_))
    ));

    // A symmetric tensor is not antisymmetric.
    let s2 = &x + &x.view().permuted_axes(vec![1, 0, 2, 4, 3, 5, 6]);
    assert!(!check_kpt_antiperm_symmetry(&s2, 0, 1, ANTIPERM_TOL).unwrap());
}

#[test]
fn test_antiperm_tolerance() {
    let x = random_tensor(&[2, 2, 2, 3, 3, 3, 3], 1);
    let mut t2 = antisymmetrise(&x, &[0, 2, 1, 3, 5, 4, 6]);
    assert!(check_kpt_antiperm_symmetry(&t2, 1, 2, ANTIPERM_TOL).unwrap());
    t2[[0usize, 1, 0, 2, 1, 0, 2].as_slice()] += 1e-4;
    assert!(!check_kpt_antiperm_symmetry(&t2, 1, 2, ANTIPERM_TOL).unwrap());
    assert!(check_kpt_antiperm_symmetry(&t2, 1, 2, 1e-3).unwrap());
}

#[test]
fn test_antiperm_three_particles() {
    let x = random_tensor(&[2, 2, 2, 2, 2, 3, 3, 3, 2, 2, 2], 2);
    let t3 = antisymmetrise(&x, &[0, 2, 1, 3, 4, 5, 7, 6, 8, 9, 10]);
    assert!(check_kpt_antiperm_symmetry(&t3, 1, 2, ANTIPERM_TOL).unwrap());
    assert!(!check_kpt_antiperm_symmetry(&t3, 0, 1, ANTIPERM_TOL).unwrap());
    assert!(matches!(
        check_kpt_antiperm_symmetry(&t3, 3, 5, ANTIPERM_TOL),
        Err(KptsError::InvalidArgument(_))
    ));
}

#[test]
fn test_antiperm_complex() {
    let mut rng = StdRng::seed_from_u64(3);
    let x = ArrayD::from_shape_simple_fn(IxDyn(&[2, 2, 2, 2, 2, 2, 2]), || {
        Complex::new(rng.gen::<f64>(), rng.gen::<f64>())
    });
    let t2 = &x - &x.view().permuted_axes(vec![1, 0, 2, 4, 3, 5, 6]);
    assert!(check_kpt_antiperm_symmetry(&t2, 0, 1, ANTIPERM_TOL).unwrap());
    assert!(!check_kpt_antiperm_symmetry(&x, 0, 1, ANTIPERM_TOL).unwrap());
}

#[test]
fn test_antiperm_invalid() {
    let bad_ndim = ArrayD::<f64>::zeros(IxDyn(&[2, 2, 2, 2]));
    assert!(matches!(
        check_kpt_antiperm_symmetry(&bad_ndim, 0, 1, ANTIPERM_TOL),
        Err(KptsError::InvalidArgument(_))
    ));

    let t2 = ArrayD::<f64>::zeros(IxDyn(&[2, 2, 2, 2, 2, 2, 2]));
    assert!(matches!(
        check_kpt_antiperm_symmetry(&t2, 0, 3, ANTIPERM_TOL),
        Err(KptsError::InvalidArgument(_))
    ));

    // A one-particle array has a single k-point axis, which is fixed.
    let t1 = ArrayD::<f64>::zeros(IxDyn(&[2, 2, 2]));
    assert!(matches!(
        check_kpt_antiperm_symmetry(&t1, 0, 1, ANTIPERM_TOL),
        Err(KptsError::InvalidArgument(_))
    ));

    let t4 = ArrayD::<f64>::zeros(IxDyn(&[1; 15]));
    assert!(matches!(
        check_kpt_antiperm_symmetry(&t4, 0, 1, ANTIPERM_TOL),
        Err(KptsError::Unsupported(_))
    ));
}
