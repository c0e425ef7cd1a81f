//! Symmetry orbits of k-point triples under momentum conservation.
//!
//! A four-index integral $`(p q | r s)`$ over Bloch orbitals at k-points $`(k_p, k_q, k_r, k_s)`$,
//! with $`k_s`$ fixed by momentum conservation, is related to three other integrals by
//! particle exchange and complex conjugation:
//! ```math
//!     (p q | r s) = (r s | p q) = (q p | s r)^* = (s r | q p)^*.
//! ```
//! The ordered triples $`(k_p, k_q, k_r)`$ therefore fall into orbits of four, only one member of
//! which needs to be computed and stored.

use std::fmt;

use indexmap::IndexMap;
use log;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::auxiliary::format::{kptsym_warn, write_subtitle};
use crate::conservation::loop_kkk;
use crate::error::KptsError;

pub mod symmetry_transformation;


/// An ordered triple of k-point indices $`(k_p, k_q, k_r)`$.
pub type KptTriple = (usize, usize, usize);

// ================
// Enum definitions
// ================

/// Enumerated type for the operations relating the members of a k-point triple orbit.
///
/// Each variant maps the canonical triple $`(p, q, r)`$, with conserving index $`s`$, to one
/// member of its orbit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KptSymmetryOperation {
    /// Variant for $`(p, q, r) \mapsto (p, q, r)`$, marking the canonical triple. Code `0`.
    Identity,

    /// Variant for $`(p, q, r) \mapsto (r, s, p)`$, exchanging the two particles. Code `1`.
    ParticleExchange,

    /// Variant for $`(p, q, r) \mapsto (q, p, s)`$, swapping the orbitals of each particle with
    /// complex conjugation. Code `2`.
    ConjugateOrbitalSwap,

    /// Variant for $`(p, q, r) \mapsto (s, r, q)`$, reversing all four orbitals with complex
    /// conjugation. Code `3`.
    ConjugateReversal,
}

impl KptSymmetryOperation {
    /// All operations in order of their codes.
    pub const ALL: [Self; 4] = [
        Self::Identity,
        Self::ParticleExchange,
        Self::ConjugateOrbitalSwap,
        Self::ConjugateReversal,
    ];

    /// Returns the integer code of this operation.
    pub fn code(&self) -> u8 {
        match self {
            Self::Identity => 0,
            Self::ParticleExchange => 1,
            Self::ConjugateOrbitalSwap => 2,
            Self::ConjugateReversal => 3,
        }
    }

    /// Returns the image of a canonical triple under this operation.
    ///
    /// # Arguments
    ///
    /// * `triple` - The canonical triple $`(p, q, r)`$.
    /// * `s` - The momentum-conserving fourth index of `triple`.
    pub fn image(&self, triple: KptTriple, s: usize) -> KptTriple {
        let (p, q, r) = triple;
        match self {
            Self::Identity => (p, q, r),
            Self::ParticleExchange => (r, s, p),
            Self::ConjugateOrbitalSwap => (q, p, s),
            Self::ConjugateReversal => (s, r, q),
        }
    }
}

impl TryFrom<u8> for KptSymmetryOperation {
    type Error = KptsError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| {
                KptsError::InconsistentSymmetry(format!("unknown operation code {code}"))
            })
    }
}

impl fmt::Display for KptSymmetryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::ParticleExchange => write!(f, "particle exchange"),
            Self::ConjugateOrbitalSwap => write!(f, "conjugated orbital swap"),
            Self::ConjugateReversal => write!(f, "conjugated reversal"),
        }
    }
}

// ==================
// Struct definitions
// ==================

/// A structure partitioning all ordered k-point triples into symmetry orbits.
#[derive(Clone, Debug)]
pub struct KptSymmetryMap {
    /// The number of k-points.
    nkpts: usize,

    /// The operation mapping the canonical triple of each triple's orbit onto the triple.
    operations: Array3<KptSymmetryOperation>,

    /// The canonical triple of each triple's orbit.
    canonical: Array3<KptTriple>,

    /// The orbits keyed by canonical triples in order of discovery. Each orbit lists the images
    /// of the canonical triple under [`KptSymmetryOperation::ALL`] and may contain repeats.
    orbits: IndexMap<KptTriple, [KptTriple; 4]>,
}

impl KptSymmetryMap {
    /// Partitions the ordered k-point triples into symmetry orbits.
    ///
    /// Triples are visited in lexicographic order. The first triple not yet covered by an orbit
    /// becomes canonical, and its images under all operations are assigned to its orbit. When
    /// an image coincides with an earlier member of the same orbit, the earlier operation is
    /// kept, so that canonical triples always carry [`KptSymmetryOperation::Identity`].
    ///
    /// # Arguments
    ///
    /// * `kconserv` - The four-point conservation array.
    ///
    /// # Errors
    ///
    /// Errors if `kconserv` is not a cube or contains out-of-range indices.
    pub fn from_kconserv(kconserv: &Array3<usize>) -> Result<Self, KptsError> {
        let nkpts = kconserv.shape()[0];
        if kconserv.shape() != [nkpts, nkpts, nkpts] {
            return Err(KptsError::InvalidArgument(format!(
                "conservation array of shape {:?} is not a cube",
                kconserv.shape()
            )));
        }
        if let Some(s) = kconserv.iter().find(|&&s| s >= nkpts) {
            return Err(KptsError::InvalidArgument(format!(
                "conserving k-point index {s} is out of range for {nkpts} k-points"
            )));
        }

        let mut completed = Array3::from_elem((nkpts, nkpts, nkpts), false);
        let mut operations =
            Array3::from_elem((nkpts, nkpts, nkpts), KptSymmetryOperation::Identity);
        let mut canonical = Array3::from_elem((nkpts, nkpts, nkpts), (0, 0, 0));
        let mut orbits = IndexMap::new();
        for triple in loop_kkk(nkpts) {
            if completed[triple] {
                continue;
            }
            let s = kconserv[triple];
            let members = KptSymmetryOperation::ALL.map(|op| op.image(triple, s));
            for (i, (op, member)) in KptSymmetryOperation::ALL
                .iter()
                .zip(members.iter())
                .enumerate()
            {
                if members[..i].contains(member) {
                    continue;
                }
                if completed[*member] {
                    kptsym_warn!(
                        "Triple {member:?} is reached from {triple:?} but already belongs to the \
                        orbit of {:?}.",
                        canonical[*member]
                    );
                    continue;
                }
                completed[*member] = true;
                operations[*member] = *op;
                canonical[*member] = triple;
            }
            orbits.insert(triple, members);
        }
        log::debug!(
            "{} ordered k-point triples partitioned into {} orbits.",
            nkpts.pow(3),
            orbits.len()
        );

        Ok(Self {
            nkpts,
            operations,
            canonical,
            orbits,
        })
    }

    /// Returns the number of k-points.
    pub fn nkpts(&self) -> usize {
        self.nkpts
    }

    /// Returns the number of orbits.
    pub fn n_orbits(&self) -> usize {
        self.orbits.len()
    }

    /// Returns the orbits keyed by their canonical triples in order of discovery.
    pub fn orbits(&self) -> &IndexMap<KptTriple, [KptTriple; 4]> {
        &self.orbits
    }

    /// Returns an iterator over the canonical triples in order of discovery.
    pub fn canonical_triples(&self) -> impl Iterator<Item = &KptTriple> {
        self.orbits.keys()
    }

    /// Returns the dense array of operations indexed by triple.
    pub fn operations(&self) -> &Array3<KptSymmetryOperation> {
        &self.operations
    }

    /// Returns the dense array of integer operation codes indexed by triple.
    pub fn operation_codes(&self) -> Array3<u8> {
        self.operations.mapv(|op| op.code())
    }

    fn check_triple(&self, triple: KptTriple) -> Result<(), KptsError> {
        let (p, q, r) = triple;
        if p < self.nkpts && q < self.nkpts && r < self.nkpts {
            Ok(())
        } else {
            Err(KptsError::InvalidArgument(format!(
                "k-point triple {triple:?} is out of range for {} k-points",
                self.nkpts
            )))
        }
    }

    /// Returns the operation mapping the canonical triple of the orbit of `(p, q, r)` onto
    /// `(p, q, r)`.
    pub fn operation(
        &self,
        p: usize,
        q: usize,
        r: usize,
    ) -> Result<KptSymmetryOperation, KptsError> {
        self.check_triple((p, q, r))?;
        Ok(self.operations[(p, q, r)])
    }

    /// Returns the canonical triple of the orbit containing `(p, q, r)`.
    pub fn canonical_triple(&self, p: usize, q: usize, r: usize) -> Result<KptTriple, KptsError> {
        self.check_triple((p, q, r))?;
        Ok(self.canonical[(p, q, r)])
    }
}

impl fmt::Display for KptSymmetryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subtitle(f, "K-point triple orbits")?;
        writeln!(f, "Number of k-points: {}", self.nkpts)?;
        writeln!(f, "Number of ordered triples: {}", self.nkpts.pow(3))?;
        writeln!(f, "Number of orbits: {}", self.orbits.len())?;
        Ok(())
    }
}
