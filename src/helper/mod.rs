//! Cached momentum-conservation and symmetry data for a fixed set of k-points.

use std::fmt;

use anyhow::bail;
use derive_builder::Builder;
use itertools::Itertools;
use log;
use nalgebra::Vector3;
use ndarray::{Array3, Array4, ArrayBase, Data, Ix4};
use num_complex::ComplexFloat;
use serde::{Deserialize, Serialize};

use crate::auxiliary::cell::PeriodicCell;
use crate::auxiliary::format::{kptsym_output, log_subtitle, nice_bool, KptsymOutput};
use crate::conservation::{
    get_kconserv, get_kpt_array_offsets, loop_kkk, KptArrayOffsets, KCONSERV_TOL,
};
use crate::error::KptsError;
use crate::kpoint::{unique, KPT_DIFF_TOL};
use crate::symmetry::symmetry_transformation::KptSymmetryTransformable;
use crate::symmetry::{KptSymmetryMap, KptSymmetryOperation, KptTriple};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for building a [`KptsHelper`].
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct KptsHelperParams {
    /// Threshold on the sum of absolute component differences below which two k-points are
    /// considered identical.
    #[builder(default = "KPT_DIFF_TOL")]
    pub kpt_diff_threshold: f64,

    /// Threshold on the deviation from integers in momentum-conservation tests.
    #[builder(default = "KCONSERV_TOL")]
    pub conservation_threshold: f64,

    /// Boolean indicating if the canonical triple of every orbit is to be written to the output.
    #[builder(default = "false")]
    pub write_orbits: bool,
}

impl KptsHelperParams {
    /// Returns a builder to construct a [`KptsHelperParams`] structure.
    pub fn builder() -> KptsHelperParamsBuilder {
        KptsHelperParamsBuilder::default()
    }
}

impl Default for KptsHelperParams {
    fn default() -> Self {
        Self {
            kpt_diff_threshold: KPT_DIFF_TOL,
            conservation_threshold: KCONSERV_TOL,
            write_orbits: false,
        }
    }
}

impl fmt::Display for KptsHelperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "K-point difference threshold: {:.3e}", self.kpt_diff_threshold)?;
        writeln!(
            f,
            "Momentum conservation threshold: {:.3e}",
            self.conservation_threshold
        )?;
        writeln!(f, "Report orbit representatives: {}", nice_bool(self.write_orbits))?;
        Ok(())
    }
}

// ------
// Helper
// ------

/// A structure holding the momentum-conservation array and the k-point triple orbits of a
/// fixed set of k-points.
///
/// The structure is immutable once built and can be shared across threads.
#[derive(Clone, Debug)]
pub struct KptsHelper {
    /// The control parameters used to build this helper.
    parameters: KptsHelperParams,

    /// The k-points, all distinct.
    kpts: Vec<Vector3<f64>>,

    /// The four-point momentum conservation array.
    kconserv: Array3<usize>,

    /// The orbits of k-point triples.
    symm_map: KptSymmetryMap,
}

impl KptsHelper {
    /// Builds the helper for a set of k-points.
    ///
    /// # Arguments
    ///
    /// * `cell` - The periodic cell providing the lattice vectors.
    /// * `kpts` - The k-points in the same Cartesian frame as the lattice vectors.
    /// * `params` - The control parameters.
    ///
    /// # Errors
    ///
    /// Errors if `kpts` is empty or contains duplicates, or if momentum conservation or the
    /// orbits cannot be established.
    pub fn new<C: PeriodicCell>(
        cell: &C,
        kpts: &[Vector3<f64>],
        params: &KptsHelperParams,
    ) -> Result<Self, anyhow::Error> {
        log_subtitle("K-point helper");
        kptsym_output!("");
        params.log_output_display();
        kptsym_output!("");

        if kpts.is_empty() {
            bail!("At least one k-point is required.");
        }
        let unique_res = unique(kpts, params.kpt_diff_threshold);
        if unique_res.unique_kpts.len() != kpts.len() {
            let duplicates = unique_res
                .inverse
                .iter()
                .enumerate()
                .filter(|&(i, &n)| unique_res.unique_indices[n] != i)
                .map(|(i, &n)| format!("{i} ≡ {}", unique_res.unique_indices[n]))
                .join(", ");
            return Err(KptsError::InvalidArgument(format!(
                "duplicate k-points found: {duplicates}"
            ))
            .into());
        }

        let kconserv = get_kconserv(cell, kpts, params.conservation_threshold)?;
        let symm_map = KptSymmetryMap::from_kconserv(&kconserv)?;
        symm_map.log_output_display();
        if params.write_orbits {
            kptsym_output!("Orbit representatives:");
            symm_map.orbits().iter().for_each(|(canonical, members)| {
                kptsym_output!(
                    "  {canonical:?}: {}",
                    members.iter().map(|m| format!("{m:?}")).join(", ")
                );
            });
        }
        kptsym_output!("");
        log::debug!(
            "K-point helper built for {} k-points with {} orbits.",
            kpts.len(),
            symm_map.n_orbits()
        );

        Ok(Self {
            parameters: params.clone(),
            kpts: kpts.to_vec(),
            kconserv,
            symm_map,
        })
    }

    /// Returns the control parameters used to build this helper.
    pub fn parameters(&self) -> &KptsHelperParams {
        &self.parameters
    }

    /// Returns the number of k-points.
    pub fn nkpts(&self) -> usize {
        self.kpts.len()
    }

    /// Returns the k-points.
    pub fn kpts(&self) -> &[Vector3<f64>] {
        &self.kpts
    }

    /// Returns the four-point momentum conservation array.
    pub fn kconserv(&self) -> &Array3<usize> {
        &self.kconserv
    }

    /// Returns the orbits of k-point triples.
    pub fn symm_map(&self) -> &KptSymmetryMap {
        &self.symm_map
    }

    /// Returns an iterator over all ordered k-point triples.
    pub fn loop_kkk(&self) -> impl Iterator<Item = KptTriple> {
        loop_kkk(self.nkpts())
    }

    /// Returns the canonical triple of the orbit of `(p, q, r)` and the operation mapping it onto
    /// `(p, q, r)`.
    pub fn operation(
        &self,
        p: usize,
        q: usize,
        r: usize,
    ) -> Result<(KptTriple, KptSymmetryOperation), KptsError> {
        Ok((
            self.symm_map.canonical_triple(p, q, r)?,
            self.symm_map.operation(p, q, r)?,
        ))
    }

    /// Transforms a four-index tensor stored for the canonical triple of the orbit of
    /// `(p, q, r)` into the tensor for `(p, q, r)`.
    ///
    /// # Arguments
    ///
    /// * `eri` - The tensor for the canonical triple, with axes $`(p, q, r, s)`$.
    /// * `p`, `q`, `r` - The target triple.
    pub fn transform_symm<S, T>(
        &self,
        eri: &ArrayBase<S, Ix4>,
        p: usize,
        q: usize,
        r: usize,
    ) -> Result<Array4<T>, KptsError>
    where
        S: Data<Elem = T>,
        T: ComplexFloat,
    {
        let op = self.symm_map.operation(p, q, r)?;
        Ok(eri.transform_kpt_symm(op))
    }

    /// Computes the offsets of the blocks of a packed four-index array with `norb_per_kpt`
    /// orbitals at each k-point.
    pub fn kpt_array_offsets(&self, norb_per_kpt: &[usize]) -> Result<KptArrayOffsets, KptsError> {
        get_kpt_array_offsets(&self.kconserv, norb_per_kpt)
    }
}

impl fmt::Display for KptsHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parameters)?;
        writeln!(f)?;
        write!(f, "{}", self.symm_map)
    }
}
