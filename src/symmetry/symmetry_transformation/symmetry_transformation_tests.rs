use ndarray::{Array3, Array4};
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::auxiliary::testing::{fcc_helium_cell, make_kpts};
use crate::conservation::{get_kconserv, loop_kkk, KCONSERV_TOL};
use crate::symmetry::symmetry_transformation::KptSymmetryTransformable;
use crate::symmetry::{KptSymmetryMap, KptSymmetryOperation};

type C128 = Complex<f64>;

fn random_c128(rng: &mut StdRng) -> C128 {
    C128::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
}

fn max_abs_diff(a: &Array4<C128>, b: &Array4<C128>) -> f64 {
    assert_eq!(a.shape(), b.shape());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

#[test]
fn test_symmetry_transformation_explicit() {
    let eri = Array4::from_shape_fn((2, 3, 4, 5), |(i, j, k, l)| {
        C128::new((1000 * i + 100 * j + 10 * k + l) as f64, (i + j) as f64 - 1.0)
    });

    let t0 = eri.transform_kpt_symm(KptSymmetryOperation::Identity);
    assert_eq!(t0, eri);

    let t1 = eri.transform_kpt_symm(KptSymmetryOperation::ParticleExchange);
    assert_eq!(t1.shape(), &[4, 5, 2, 3]);
    assert_eq!(t1[(3, 4, 1, 2)], eri[(1, 2, 3, 4)]);

    let t2 = eri.transform_kpt_symm(KptSymmetryOperation::ConjugateOrbitalSwap);
    assert_eq!(t2.shape(), &[3, 2, 5, 4]);
    assert_eq!(t2[(2, 1, 4, 3)], eri[(1, 2, 3, 4)].conj());

    let t3 = eri.transform_kpt_symm(KptSymmetryOperation::ConjugateReversal);
    assert_eq!(t3.shape(), &[5, 4, 3, 2]);
    assert_eq!(t3[(4, 3, 2, 1)], eri[(1, 2, 3, 4)].conj());

    // Real tensors are unaffected by the conjugation.
    let eri_real = eri.mapv(|x| x.re);
    let t3_real = eri_real.view().transform_kpt_symm(KptSymmetryOperation::ConjugateReversal);
    assert_eq!(t3_real[(4, 3, 2, 1)], eri_real[(1, 2, 3, 4)]);
}

#[test]
fn test_symmetry_transformation_involutions() {
    let mut rng = StdRng::seed_from_u64(7);
    let eri = Array4::from_shape_simple_fn((3, 3, 3, 3), || random_c128(&mut rng));
    for op in &KptSymmetryOperation::ALL[1..] {
        let twice = eri.transform_kpt_symm(*op).transform_kpt_symm(*op);
        assert_eq!(twice, eri);
        assert_ne!(eri.transform_kpt_symm(*op), eri);
    }

    // Composing two distinct non-trivial operations gives the third.
    let t12 = eri
        .transform_kpt_symm(KptSymmetryOperation::ParticleExchange)
        .transform_kpt_symm(KptSymmetryOperation::ConjugateOrbitalSwap);
    assert_eq!(
        t12,
        eri.transform_kpt_symm(KptSymmetryOperation::ConjugateReversal)
    );
}

/// Builds pair densities $`A_{pq}`$ with $`A_{qp}[g, j, i] = A_{pq}[g, i, j]^*`$, from which
/// $`(pq|rs) = \sum_g A_{pq}[g, i, j] A_{rs}[g, k, l]`$ obeys all four orbit symmetries.
fn pair_densities(
    nkpts: usize,
    ng: usize,
    norb: usize,
    rng: &mut StdRng,
) -> Vec<Vec<Array3<C128>>> {
    let mut dens = vec![vec![Array3::<C128>::zeros((ng, norb, norb)); nkpts]; nkpts];
    for p in 0..nkpts {
        for q in p..nkpts {
            let a = Array3::from_shape_simple_fn((ng, norb, norb), || random_c128(rng));
            let a_dagger =
                Array3::from_shape_fn((ng, norb, norb), |(g, j, i)| a[(g, i, j)].conj());
            if p == q {
                dens[p][p] = &a + &a_dagger;
            } else {
                dens[p][q] = a;
                dens[q][p] = a_dagger;
            }
        }
    }
    dens
}

#[test]
fn test_symmetry_transformation_eri_reconstruction_fcc_222() {
    let cell = fcc_helium_cell();
    let kpts = make_kpts(&cell, [2, 2, 2]);
    let nkpts = kpts.len();
    let kconserv = get_kconserv(&cell, &kpts, KCONSERV_TOL).unwrap();
    let symm_map = KptSymmetryMap::from_kconserv(&kconserv).unwrap();

    let (ng, norb) = (3, 2);
    let mut rng = StdRng::seed_from_u64(1234);
    let dens = pair_densities(nkpts, ng, norb, &mut rng);
    let eri = |p: usize, q: usize, r: usize| {
        let s = kconserv[(p, q, r)];
        Array4::from_shape_fn((norb, norb, norb, norb), |(i, j, k, l)| {
            (0..ng)
                .map(|g| dens[p][q][(g, i, j)] * dens[r][s][(g, k, l)])
                .sum::<C128>()
        })
    };

    for (canonical, members) in symm_map.orbits() {
        let eri_canonical = eri(canonical.0, canonical.1, canonical.2);
        for (p, q, r) in members.iter().copied() {
            let op = symm_map.operation(p, q, r).unwrap();
            let eri_reconstructed = eri_canonical.transform_kpt_symm(op);
            assert!(max_abs_diff(&eri_reconstructed, &eri(p, q, r)) < 1e-12);
        }
    }

    // Every triple is reachable from its canonical triple.
    for (p, q, r) in loop_kkk(nkpts) {
        let c = symm_map.canonical_triple(p, q, r).unwrap();
        let op = symm_map.operation(p, q, r).unwrap();
        let eri_reconstructed = eri(c.0, c.1, c.2).transform_kpt_symm(op);
        assert!(max_abs_diff(&eri_reconstructed, &eri(p, q, r)) < 1e-12);
    }
}
