//! Packing of nested collections of dense arrays into flat buffers.
//!
//! A nested collection is a tree whose internal nodes are ordered sequences and whose leaves
//! are dense arrays sharing a single scalar type. Flattening concatenates the row-major
//! contents of all leaves, depth-first and left-to-right, into a one-dimensional buffer, and
//! records the structure as a [`NestedDescriptor`]. Restoring reverses the process.
//!
//! Besides plain `array` leaves, a descriptor may contain `composite` leaves, which view one
//! contiguous run of the buffer as a single array of a given shape that is assembled from
//! several differently-shaped pieces described by a sub-descriptor.

use std::fmt;

use duplicate::duplicate_item;
use ndarray::{Array, ArrayD, Dimension, IxDyn};
use num_complex::Complex;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

mod nested_flatten;
mod nested_restore;

pub use nested_flatten::{describe_nested, nested_to_vector, nested_to_vector_into};
pub use nested_restore::{vector_to_nested, vector_to_nested_into};


// ================
// Enum definitions
// ================

/// Enumerated type for the scalar types supported in nested collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    /// Variant for 32-bit signed integers.
    Int32,

    /// Variant for 64-bit signed integers.
    Int64,

    /// Variant for 32-bit floats.
    Float32,

    /// Variant for 64-bit floats.
    Float64,

    /// Variant for complex numbers with 32-bit float components.
    Complex64,

    /// Variant for complex numbers with 64-bit float components.
    Complex128,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Float32 => write!(f, "float32"),
            Self::Float64 => write!(f, "float64"),
            Self::Complex64 => write!(f, "complex64"),
            Self::Complex128 => write!(f, "complex128"),
        }
    }
}

/// Enumerated type for dense arrays of any supported scalar type.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericArray {
    /// Variant for arrays of 32-bit signed integers.
    Int32(ArrayD<i32>),

    /// Variant for arrays of 64-bit signed integers.
    Int64(ArrayD<i64>),

    /// Variant for arrays of 32-bit floats.
    Float32(ArrayD<f32>),

    /// Variant for arrays of 64-bit floats.
    Float64(ArrayD<f64>),

    /// Variant for arrays of complex numbers with 32-bit float components.
    Complex64(ArrayD<Complex<f32>>),

    /// Variant for arrays of complex numbers with 64-bit float components.
    Complex128(ArrayD<Complex<f64>>),
}

/// Evaluates an expression for the array wrapped in any variant of [`NumericArray`].
macro_rules! numeric_dispatch {
    ($array:expr, $inner:ident => $body:expr) => {
        match $array {
            NumericArray::Int32($inner) => $body,
            NumericArray::Int64($inner) => $body,
            NumericArray::Float32($inner) => $body,
            NumericArray::Float64($inner) => $body,
            NumericArray::Complex64($inner) => $body,
            NumericArray::Complex128($inner) => $body,
        }
    };
}

/// Evaluates an expression for two [`NumericArray`]s of the same variant, or a fallback
/// expression if their variants differ.
macro_rules! numeric_dispatch_pair {
    ($a:expr, $b:expr, $x:ident, $y:ident => $body:expr, _ => $mismatch:expr) => {
        match ($a, $b) {
            (NumericArray::Int32($x), NumericArray::Int32($y)) => $body,
            (NumericArray::Int64($x), NumericArray::Int64($y)) => $body,
            (NumericArray::Float32($x), NumericArray::Float32($y)) => $body,
            (NumericArray::Float64($x), NumericArray::Float64($y)) => $body,
            (NumericArray::Complex64($x), NumericArray::Complex64($y)) => $body,
            (NumericArray::Complex128($x), NumericArray::Complex128($y)) => $body,
            _ => $mismatch,
        }
    };
}

pub(crate) use {numeric_dispatch, numeric_dispatch_pair};

impl NumericArray {
    /// Creates a zero-filled array of the given scalar type and shape.
    pub fn zeros(dtype: Dtype, shape: &[usize]) -> Self {
        match dtype {
            Dtype::Int32 => Self::Int32(ArrayD::zeros(IxDyn(shape))),
            Dtype::Int64 => Self::Int64(ArrayD::zeros(IxDyn(shape))),
            Dtype::Float32 => Self::Float32(ArrayD::zeros(IxDyn(shape))),
            Dtype::Float64 => Self::Float64(ArrayD::zeros(IxDyn(shape))),
            Dtype::Complex64 => Self::Complex64(ArrayD::zeros(IxDyn(shape))),
            Dtype::Complex128 => Self::Complex128(ArrayD::zeros(IxDyn(shape))),
        }
    }

    /// Returns the scalar type of the array.
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::Int32(_) => Dtype::Int32,
            Self::Int64(_) => Dtype::Int64,
            Self::Float32(_) => Dtype::Float32,
            Self::Float64(_) => Dtype::Float64,
            Self::Complex64(_) => Dtype::Complex64,
            Self::Complex128(_) => Dtype::Complex128,
        }
    }

    /// Returns the shape of the array.
    pub fn shape(&self) -> &[usize] {
        numeric_dispatch!(self, a => a.shape())
    }

    /// Returns the number of dimensions of the array.
    pub fn ndim(&self) -> usize {
        numeric_dispatch!(self, a => a.ndim())
    }

    /// Returns the total number of scalar elements of the array.
    pub fn len(&self) -> usize {
        numeric_dispatch!(self, a => a.len())
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a shared reference to the underlying array if it holds scalars of type `T`.
    pub fn as_array<T: NestedScalar>(&self) -> Option<&ArrayD<T>> {
        T::peel(self)
    }
}

impl<T, D> From<Array<T, D>> for NumericArray
where
    T: NestedScalar,
    D: Dimension,
{
    fn from(value: Array<T, D>) -> Self {
        T::wrap(value.into_dyn())
    }
}

/// Enumerated type for the nodes of a nested collection of arrays.
#[derive(Clone, Debug, PartialEq)]
pub enum Nested {
    /// Variant for a leaf holding a dense array.
    Array(NumericArray),

    /// Variant for an ordered sequence of nodes.
    Sequence(Vec<Nested>),
}

impl<T, D> From<Array<T, D>> for Nested
where
    T: NestedScalar,
    D: Dimension,
{
    fn from(value: Array<T, D>) -> Self {
        Self::Array(NumericArray::from(value))
    }
}

impl From<NumericArray> for Nested {
    fn from(value: NumericArray) -> Self {
        Self::Array(value)
    }
}

impl From<Vec<Nested>> for Nested {
    fn from(value: Vec<Nested>) -> Self {
        Self::Sequence(value)
    }
}

// ===========
// Descriptors
// ===========

/// Enumerated type for the leaves of a [`NestedDescriptor`].
///
/// This serialises as a map with a `type` key of either `array` or `composite`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LeafDescriptor {
    /// Variant for a plain array of the given shape.
    Array {
        /// The shape of the array.
        shape: Vec<usize>,
    },

    /// Variant for a single array of the given shape and scalar type assembled from the pieces
    /// described by `data`.
    Composite {
        /// The shape of the assembled array.
        shape: Vec<usize>,

        /// The scalar type of the assembled array.
        dtype: Dtype,

        /// The description of the pieces. Each nesting level of sequences in `data` selects
        /// successive leading indices of the assembled array.
        data: Box<NestedDescriptor>,
    },
}

/// Enumerated type describing the structure of a nested collection of arrays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NestedDescriptor {
    /// Variant for a leaf.
    Leaf(LeafDescriptor),

    /// Variant for an ordered sequence of descriptors.
    Sequence(Vec<NestedDescriptor>),
}

impl NestedDescriptor {
    /// Returns a descriptor for a plain array leaf.
    pub fn array(shape: &[usize]) -> Self {
        Self::Leaf(LeafDescriptor::Array {
            shape: shape.to_vec(),
        })
    }

    /// Returns a descriptor for a composite leaf.
    pub fn composite(shape: &[usize], dtype: Dtype, data: NestedDescriptor) -> Self {
        Self::Leaf(LeafDescriptor::Composite {
            shape: shape.to_vec(),
            dtype,
            data: Box::new(data),
        })
    }

    /// Returns the total number of scalar elements described.
    pub fn size(&self) -> usize {
        match self {
            Self::Leaf(LeafDescriptor::Array { shape }) => shape.iter().product(),
            Self::Leaf(LeafDescriptor::Composite { shape, .. }) => shape.iter().product(),
            Self::Sequence(items) => items.iter().map(NestedDescriptor::size).sum(),
        }
    }
}

impl From<Vec<NestedDescriptor>> for NestedDescriptor {
    fn from(value: Vec<NestedDescriptor>) -> Self {
        Self::Sequence(value)
    }
}

// =================
// Trait definitions
// =================

/// Trait for scalar types that can be stored in a [`NumericArray`].
pub trait NestedScalar: Clone + Zero + Send + Sync + 'static {
    /// The scalar type tag of this type.
    const DTYPE: Dtype;

    /// Wraps an array of this scalar type.
    fn wrap(array: ArrayD<Self>) -> NumericArray;

    /// Returns the wrapped array if it holds this scalar type.
    fn peel(array: &NumericArray) -> Option<&ArrayD<Self>>;

    /// Returns the wrapped array mutably if it holds this scalar type.
    fn peel_mut(array: &mut NumericArray) -> Option<&mut ArrayD<Self>>;
}

#[duplicate_item(
    [
        dtype_ [ i32 ]
        variant_ [ Int32 ]
    ]
    [
        dtype_ [ i64 ]
        variant_ [ Int64 ]
    ]
    [
        dtype_ [ f32 ]
        variant_ [ Float32 ]
    ]
    [
        dtype_ [ f64 ]
        variant_ [ Float64 ]
    ]
    [
        dtype_ [ Complex<f32> ]
        variant_ [ Complex64 ]
    ]
    [
        dtype_ [ Complex<f64> ]
        variant_ [ Complex128 ]
    ]
)]
impl NestedScalar for dtype_ {
    const DTYPE: Dtype = Dtype::variant_;

    fn wrap(array: ArrayD<Self>) -> NumericArray {
        NumericArray::variant_(array)
    }

    fn peel(array: &NumericArray) -> Option<&ArrayD<Self>> {
        match array {
            NumericArray::variant_(a) => Some(a),
            _ => None,
        }
    }

    fn peel_mut(array: &mut NumericArray) -> Option<&mut ArrayD<Self>> {
        match array {
            NumericArray::variant_(a) => Some(a),
            _ => None,
        }
    }
}
