//! Restoration of nested collections of arrays from flat vectors.

use ndarray::{s, ArrayD, ArrayView1, ArrayViewMutD, Axis, Ix1, IxDyn};

use crate::error::KptsError;
use crate::nested::{
    numeric_dispatch, numeric_dispatch_pair, LeafDescriptor, Nested, NestedDescriptor,
    NestedScalar, NumericArray,
};

/// Restores a nested collection of arrays from a vector.
///
/// Elements are consumed depth-first and left-to-right. An `array` leaf consumes as many
/// elements as it has and reshapes them in row-major order. A `composite` leaf allocates a
/// zero-filled array of its declared shape and scalar type and fills it from its sub-descriptor,
/// each nesting level of which selects successive leading indices of the array.
///
/// # Arguments
///
/// * `vector` - The one-dimensional vector to read from.
/// * `desc` - The structure to restore.
/// * `ensure_size_matches` - If `true`, the whole of `vector` must be consumed.
///
/// # Returns
///
/// The restored collection and the number of elements of `vector` consumed.
///
/// # Errors
///
/// Errors with [`KptsError::SizeMismatch`] if `vector` is too short, or if
/// `ensure_size_matches` is set and `vector` is too long, with [`KptsError::TypeMismatch`] if a
/// composite leaf declares a scalar type different from that of `vector`, and with
/// [`KptsError::InvalidArgument`] if `vector` is not one-dimensional.
pub fn vector_to_nested(
    vector: &NumericArray,
    desc: &NestedDescriptor,
    ensure_size_matches: bool,
) -> Result<(Nested, usize), KptsError> {
    numeric_dispatch!(vector, v => {
        let v_1d = v
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| not_a_vector(vector.shape()))?;
        restore_typed(v_1d, desc, ensure_size_matches)
    })
}

/// Restores a nested collection of arrays from a vector into an existing array.
///
/// # Arguments
///
/// * `vector` - The one-dimensional vector to read from.
/// * `desc` - The structure to restore. Its outermost level describes the sub-array
/// `destination[destination_indexes]`.
/// * `ensure_size_matches` - If `true`, the whole of `vector` must be consumed.
/// * `destination` - The array to write into.
/// * `destination_indexes` - The leading indices of `destination` selecting the sub-array to
/// write into.
///
/// # Returns
///
/// The number of elements of `vector` consumed. Elements written before an error is
/// encountered are not rolled back.
///
/// # Errors
///
/// Errors with [`KptsError::SizeMismatch`] if a shape or a sequence length in `desc` does not
/// match the corresponding part of `destination`, or if `vector` has the wrong length, with
/// [`KptsError::TypeMismatch`] if `vector`, `destination`, and composite leaves in `desc` do not
/// share one scalar type, and with [`KptsError::InvalidArgument`] if `vector` is not
/// one-dimensional or `destination_indexes` are out of range.
pub fn vector_to_nested_into(
    vector: &NumericArray,
    desc: &NestedDescriptor,
    ensure_size_matches: bool,
    destination: &mut NumericArray,
    destination_indexes: &[usize],
) -> Result<usize, KptsError> {
    let dest_shape = destination.shape();
    if destination_indexes.len() > dest_shape.len()
        || destination_indexes
            .iter()
            .zip(dest_shape.iter())
            .any(|(i, n)| i >= n)
    {
        return Err(KptsError::InvalidArgument(format!(
            "destination indices {destination_indexes:?} are out of range for shape {dest_shape:?}"
        )));
    }
    let (vector_dtype, dest_dtype) = (vector.dtype(), destination.dtype());
    numeric_dispatch_pair!(vector, destination, v, dest => {
        let v_1d = v
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| not_a_vector(v.shape()))?;
        restore_into_typed(
            v_1d,
            desc,
            ensure_size_matches,
            &mut dest.view_mut(),
            destination_indexes,
        )
    }, _ => Err(KptsError::TypeMismatch(format!(
        "cannot restore {vector_dtype} elements into a {dest_dtype} array"
    ))))
}

fn not_a_vector(shape: &[usize]) -> KptsError {
    KptsError::InvalidArgument(format!("only vectors are accepted, got shape {shape:?}"))
}

/// Checks that `available` elements suffice for a leaf of `expected` elements.
fn check_leaf_size(
    available: usize,
    expected: usize,
    shape: &[usize],
    ensure_size_matches: bool,
) -> Result<(), KptsError> {
    if ensure_size_matches && available != expected {
        Err(KptsError::SizeMismatch(format!(
            "structure size mismatch: expected {shape:?} = {expected}, found {available}"
        )))
    } else if available < expected {
        Err(KptsError::SizeMismatch(format!(
            "additional {} = ({expected} = {shape:?}) - {available} vector elements are required",
            expected - available
        )))
    } else {
        Ok(())
    }
}

/// Checks that a sequence consumed the whole vector if required.
fn check_consumed(
    available: usize,
    consumed: usize,
    ensure_size_matches: bool,
) -> Result<(), KptsError> {
    if ensure_size_matches && available != consumed {
        Err(KptsError::SizeMismatch(format!(
            "{} additional elements found",
            available - consumed
        )))
    } else {
        Ok(())
    }
}

fn restore_typed<T: NestedScalar>(
    vector: ArrayView1<T>,
    desc: &NestedDescriptor,
    ensure_size_matches: bool,
) -> Result<(Nested, usize), KptsError> {
    match desc {
        NestedDescriptor::Leaf(LeafDescriptor::Array { shape }) => {
            let expected = shape.iter().product();
            check_leaf_size(vector.len(), expected, shape, ensure_size_matches)?;
            let array =
                ArrayD::from_shape_vec(IxDyn(shape), vector.slice(s![..expected]).to_vec())
                    .map_err(|err| KptsError::SizeMismatch(err.to_string()))?;
            Ok((Nested::Array(T::wrap(array)), expected))
        }
        NestedDescriptor::Leaf(LeafDescriptor::Composite { shape, dtype, data }) => {
            if *dtype != T::DTYPE {
                return Err(KptsError::TypeMismatch(format!(
                    "composite array of {dtype} elements cannot be restored from a {} vector",
                    T::DTYPE
                )));
            }
            let mut array = ArrayD::<T>::zeros(IxDyn(shape));
            let consumed = restore_into_typed(
                vector,
                data,
                ensure_size_matches,
                &mut array.view_mut(),
                &[],
            )?;
            Ok((Nested::Array(T::wrap(array)), consumed))
        }
        NestedDescriptor::Sequence(items) => {
            let mut offset = 0;
            let mut result = Vec::with_capacity(items.len());
            for item in items {
                let (nested, size) = restore_typed(vector.slice(s![offset..]), item, false)?;
                offset += size;
                result.push(nested);
            }
            check_consumed(vector.len(), offset, ensure_size_matches)?;
            Ok((Nested::Sequence(result), offset))
        }
    }
}

fn restore_into_typed<T: NestedScalar>(
    vector: ArrayView1<T>,
    desc: &NestedDescriptor,
    ensure_size_matches: bool,
    destination: &mut ArrayViewMutD<T>,
    destination_indexes: &[usize],
) -> Result<usize, KptsError> {
    let sub_shape = destination
        .shape()
        .get(destination_indexes.len()..)
        .unwrap_or_default()
        .to_vec();
    match desc {
        NestedDescriptor::Leaf(LeafDescriptor::Array { shape }) => {
            let expected = shape.iter().product();
            check_leaf_size(vector.len(), expected, shape, ensure_size_matches)?;
            if *shape != sub_shape {
                return Err(KptsError::SizeMismatch(format!(
                    "array shape mismatch: expected {shape:?}, found {sub_shape:?}"
                )));
            }
            let mut target = destination.view_mut();
            for &i in destination_indexes {
                target = target.index_axis_move(Axis(0), i);
            }
            target
                .iter_mut()
                .zip(vector.iter())
                .for_each(|(d, x)| *d = x.clone());
            Ok(expected)
        }
        NestedDescriptor::Leaf(LeafDescriptor::Composite { shape, dtype, data }) => {
            if *shape != sub_shape {
                return Err(KptsError::SizeMismatch(format!(
                    "composite array shape mismatch: expected {shape:?}, found {sub_shape:?}"
                )));
            }
            if *dtype != T::DTYPE {
                return Err(KptsError::TypeMismatch(format!(
                    "composite array of {dtype} elements cannot be restored into a {} array",
                    T::DTYPE
                )));
            }
            restore_into_typed(
                vector,
                data,
                ensure_size_matches,
                destination,
                destination_indexes,
            )
        }
        NestedDescriptor::Sequence(items) => {
            let expected_len = *sub_shape.first().ok_or_else(|| {
                KptsError::SizeMismatch(format!(
                    "nested sequence of length {} has no axis left to index",
                    items.len()
                ))
            })?;
            if items.len() != expected_len {
                return Err(KptsError::SizeMismatch(format!(
                    "nested length mismatch: expected {expected_len}, found {}",
                    items.len()
                )));
            }
            let mut indexes = destination_indexes.to_vec();
            indexes.push(0);
            let mut offset = 0;
            for (i, item) in items.iter().enumerate() {
                if let Some(last) = indexes.last_mut() {
                    *last = i;
                }
                offset += restore_into_typed(
                    vector.slice(s![offset..]),
                    item,
                    false,
                    destination,
                    &indexes,
                )?;
            }
            check_consumed(vector.len(), offset, ensure_size_matches)?;
            Ok(offset)
        }
    }
}
