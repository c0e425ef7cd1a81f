//! Error conditions raised by k-point symmetry utilities.

use std::error::Error;
use std::fmt;

/// Enumerated type for the failure modes of the k-point symmetry utilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KptsError {
    /// Variant for arguments that are out of range or otherwise malformed.
    InvalidArgument(String),

    /// Variant for requests that are well-formed but not supported.
    Unsupported(String),

    /// Variant for scalar types that do not agree with one another.
    TypeMismatch(String),

    /// Variant for buffer lengths or array shapes that do not agree with one another.
    SizeMismatch(String),

    /// Variant for tuples of k-points for which no unique momentum-conserving k-point exists.
    ConservationNotFound(String),

    /// Variant for symmetry operation data that are internally inconsistent.
    InconsistentSymmetry(String),
}

impl fmt::Display for KptsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            Self::Unsupported(msg) => write!(f, "Unsupported: {msg}"),
            Self::TypeMismatch(msg) => write!(f, "Type mismatch: {msg}"),
            Self::SizeMismatch(msg) => write!(f, "Size mismatch: {msg}"),
            Self::ConservationNotFound(msg) => {
                write!(f, "Momentum-conserving k-point not found: {msg}")
            }
            Self::InconsistentSymmetry(msg) => write!(f, "Inconsistent k-point symmetry: {msg}"),
        }
    }
}

impl Error for KptsError {}
