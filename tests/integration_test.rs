use std::f64::consts::PI;

use itertools::iproduct;
use kptsym::auxiliary::cell::{Cell, PeriodicCell};
use kptsym::conservation::{get_kconserv3, KptIndexSelection, KCONSERV_TOL};
use kptsym::helper::{KptsHelper, KptsHelperParams};
use kptsym::kpoint::{is_zero, unique, KPT_DIFF_TOL};
use kptsym::nested::{nested_to_vector, vector_to_nested, Nested};
use kptsym::symmetry::symmetry_transformation::KptSymmetryTransformable;
use kptsym::symmetry::KptSymmetryOperation;
use nalgebra::Vector3;
use ndarray::Array4;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn simple_cubic_cell(a: f64) -> Cell {
    Cell::builder()
        .lattice([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
        .build()
        .unwrap()
}

fn grid(cell: &Cell, nks: [usize; 3]) -> Vec<Vector3<f64>> {
    let b = cell.reciprocal_vectors().unwrap();
    iproduct!(0..nks[0], 0..nks[1], 0..nks[2])
        .map(|(i, j, k)| {
            b.transpose()
                * Vector3::new(
                    i as f64 / nks[0] as f64,
                    j as f64 / nks[1] as f64,
                    k as f64 / nks[2] as f64,
                )
        })
        .collect()
}

#[test]
fn test_simple_cubic_conservation() {
    let cell = simple_cubic_cell(2.0);
    let kpts = grid(&cell, [3, 3, 3]);
    let helper = KptsHelper::new(&cell, &kpts, &KptsHelperParams::default()).unwrap();
    assert_eq!(helper.nkpts(), 27);

    let a = cell.lattice_vectors();
    for (k, l, m) in helper.loop_kkk() {
        let n = helper.kconserv()[(k, l, m)];
        let dk = kpts[k] - kpts[l] + kpts[m] - kpts[n];
        let frac = a * dk / (2.0 * PI);
        assert!(frac.iter().all(|x| (x - x.round()).abs() < 1e-9));
    }

    // Fractional coordinates are additive on a simple cubic grid.
    let index = |i: usize, j: usize, k: usize| 9 * i + 3 * j + k;
    for (i1, j1, k1, i2, j2, k2) in iproduct!(0..3, 0..3, 0..3, 0..3, 0..3, 0..3) {
        let (p, q) = (index(i1, j1, k1), index(i2, j2, k2));
        let r = index(0, 0, 0);
        assert_eq!(
            helper.kconserv()[(p, q, r)],
            index((i1 + 3 - i2) % 3, (j1 + 3 - j2) % 3, (k1 + 3 - k2) % 3)
        );
    }

    let kconserv3 = get_kconserv3(
        &cell,
        &kpts,
        &[
            KptIndexSelection::Single(1),
            KptIndexSelection::Single(2),
            KptIndexSelection::Single(3),
            KptIndexSelection::Multiple((0..27).collect()),
            KptIndexSelection::Single(0),
        ],
        KCONSERV_TOL,
    )
    .unwrap();
    assert_eq!(kconserv3.shape(), &[27]);
    for (ka, &kc) in kconserv3.iter().enumerate() {
        let dk = kpts[1] + kpts[2] + kpts[3] - kpts[ka] - kpts[0] - kpts[kc];
        let frac = a * dk / (2.0 * PI);
        assert!(frac.iter().all(|x| (x - x.round()).abs() < 1e-9));
    }
}

#[test]
fn test_unique_shifted_grid() {
    let cell = simple_cubic_cell(3.0);
    let kpts = grid(&cell, [2, 2, 1]);
    let b = cell.reciprocal_vectors().unwrap();
    // Every k-point appears twice, the second time displaced by a tiny amount.
    let doubled = kpts
        .iter()
        .chain(kpts.iter())
        .enumerate()
        .map(|(i, k)| if i >= kpts.len() { k + b.row(0).transpose() * 1e-9 } else { *k })
        .collect::<Vec<_>>();
    let res = unique(&doubled, KPT_DIFF_TOL);
    assert_eq!(res.unique_kpts.len(), 4);
    assert_eq!(res.unique_indices, vec![0, 1, 2, 3]);
    assert_eq!(res.inverse, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    for (kpt, &n) in doubled.iter().zip(res.inverse.iter()) {
        assert!(is_zero(&(kpt - res.unique_kpts[n]), KPT_DIFF_TOL));
    }
}

#[test]
fn test_reconstruct_and_pack_blocks() {
    let cell = simple_cubic_cell(2.5);
    let kpts = grid(&cell, [2, 2, 1]);
    let helper = KptsHelper::new(&cell, &kpts, &KptsHelperParams::default()).unwrap();
    let norb = 2;

    // Only canonical blocks are generated; all others are obtained by symmetry.
    let mut rng = StdRng::seed_from_u64(42);
    let canonical_blocks = helper
        .symm_map()
        .canonical_triples()
        .map(|&triple| {
            let block = Array4::from_shape_simple_fn((norb, norb, norb, norb), || {
                Complex::new(rng.gen::<f64>(), rng.gen::<f64>())
            });
            (triple, block)
        })
        .collect::<Vec<_>>();
    let blocks = helper
        .loop_kkk()
        .map(|(p, q, r)| {
            let (canonical, op) = helper.operation(p, q, r).unwrap();
            let (_, block) = canonical_blocks
                .iter()
                .find(|(triple, _)| *triple == canonical)
                .unwrap();
            if op == KptSymmetryOperation::Identity {
                assert_eq!(canonical, (p, q, r));
            }
            assert_eq!(
                helper.transform_symm(block, p, q, r).unwrap(),
                block.transform_kpt_symm(op)
            );
            helper.transform_symm(block, p, q, r).unwrap()
        })
        .collect::<Vec<_>>();

    let offsets = helper.kpt_array_offsets(&vec![norb; helper.nkpts()]).unwrap();
    let data = Nested::Sequence(blocks.iter().cloned().map(Nested::from).collect());
    let (vector, desc) = nested_to_vector(&data).unwrap();
    assert_eq!(vector.len(), offsets.total);
    assert_eq!(desc.size(), offsets.total);
    let packed = vector.as_array::<Complex<f64>>().unwrap();
    for (block, (&offset, &size)) in blocks
        .iter()
        .zip(offsets.offsets.iter().zip(offsets.sizes.iter()))
    {
        assert_eq!(block.len(), size);
        assert_eq!(packed[[offset]], block[[0, 0, 0, 0]]);
    }

    let (restored, consumed) = vector_to_nested(&vector, &desc, true).unwrap();
    assert_eq!(consumed, offsets.total);
    assert_eq!(restored, data);
}
