//! Periodic cells supplying lattice geometry.

use std::f64::consts::PI;
use std::fmt;

use derive_builder::Builder;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::error::KptsError;

#[cfg(test)]
#[path = "cell_tests.rs"]
mod cell_tests;

// =================
// Trait definitions
// =================

/// Trait for periodic objects that can provide their real-space lattice vectors.
pub trait PeriodicCell {
    // ----------------
    // Required methods
    // ----------------
    /// Returns the real-space lattice vectors as the rows of a $`3 \times 3`$ matrix.
    fn lattice_vectors(&self) -> Matrix3<f64>;

    // ----------------
    // Provided methods
    // ----------------
    /// Returns the lattice vectors scaled by $`1 / 2\pi`$.
    ///
    /// For a k-point difference $`\Delta\mathbf{k}`$, the product of this matrix with
    /// $`\Delta\mathbf{k}`$ is an integer vector if and only if $`\Delta\mathbf{k}`$ is a
    /// reciprocal lattice vector.
    fn lattice_transform(&self) -> Matrix3<f64> {
        self.lattice_vectors() / (2.0 * PI)
    }

    /// Returns the reciprocal lattice vectors $`2\pi (\mathbf{A}^{-1})^{\mathsf{T}}`$ as the rows
    /// of a $`3 \times 3`$ matrix.
    ///
    /// # Errors
    ///
    /// Errors if the lattice vectors are linearly dependent.
    fn reciprocal_vectors(&self) -> Result<Matrix3<f64>, KptsError> {
        self.lattice_vectors()
            .try_inverse()
            .map(|inv| inv.transpose() * (2.0 * PI))
            .ok_or_else(|| {
                KptsError::InvalidArgument("the lattice vectors are linearly dependent".to_string())
            })
    }
}

impl PeriodicCell for Matrix3<f64> {
    fn lattice_vectors(&self) -> Matrix3<f64> {
        *self
    }
}

// ==================
// Struct definitions
// ==================

/// A structure holding the real-space lattice of a periodic system.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// The real-space lattice vectors stored as matrix rows.
    #[builder(setter(custom))]
    lattice: Matrix3<f64>,
}

impl CellBuilder {
    /// Sets the lattice vectors from an array of three row vectors.
    pub fn lattice(&mut self, rows: [[f64; 3]; 3]) -> &mut Self {
        self.lattice = Some(Matrix3::from_row_slice(
            &rows.iter().flatten().copied().collect::<Vec<_>>(),
        ));
        self
    }
}

impl Cell {
    /// Returns a builder to construct a new [`Cell`].
    pub fn builder() -> CellBuilder {
        CellBuilder::default()
    }
}

impl PeriodicCell for Cell {
    fn lattice_vectors(&self) -> Matrix3<f64> {
        self.lattice
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lattice vectors:")?;
        for row in self.lattice.row_iter() {
            writeln!(f, "  ({:+.6}, {:+.6}, {:+.6})", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
