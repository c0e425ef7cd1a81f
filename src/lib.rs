//! # kptsym: momentum conservation and k-point symmetry for periodic tensors
//!
//! `kptsym` provides the k-point bookkeeping needed when working with four-index quantities,
//! such as electron-repulsion integrals or coupled-cluster amplitudes, in periodic systems
//! sampled on a grid of k-points:
//! - tolerance-based k-point comparison and deduplication,
//! - four-point and six-point momentum-conservation arrays,
//! - orbits of k-point triples under particle exchange and complex conjugation, together with
//!   the tensor transformations relating the members of each orbit,
//! - antipermutational symmetry checks for arrays carrying k-point indices, and
//! - packing of nested collections of arrays into flat buffers and back.
//!
//! The [`helper::KptsHelper`] structure caches the momentum-conservation array and the orbits
//! for a fixed set of k-points.
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade and installs no logger of
//! its own. Main outputs are sent to the `kptsym-output` target at the `info` level; progress
//! messages are logged at the `debug` level.
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod antisymmetry;
pub mod auxiliary;
pub mod conservation;
pub mod error;
pub mod helper;
pub mod kpoint;
pub mod nested;
pub mod symmetry;
