//! Description and flattening of nested collections of arrays.

use ndarray::{s, ArrayViewMut1, Ix1};

use crate::error::KptsError;
use crate::nested::{numeric_dispatch, Dtype, Nested, NestedDescriptor, NestedScalar, NumericArray};

/// Describes a nested collection of arrays.
///
/// # Arguments
///
/// * `data` - The nested collection to describe.
///
/// # Returns
///
/// A tuple containing
/// * the descriptor in which each array is replaced by its shape,
/// * the total number of scalar elements, and
/// * the common scalar type, or `None` if the collection has no arrays.
///
/// # Errors
///
/// Errors with [`KptsError::TypeMismatch`] if two arrays have different scalar types.
pub fn describe_nested(
    data: &Nested,
) -> Result<(NestedDescriptor, usize, Option<Dtype>), KptsError> {
    match data {
        Nested::Array(array) => Ok((
            NestedDescriptor::array(array.shape()),
            array.len(),
            Some(array.dtype()),
        )),
        Nested::Sequence(items) => {
            let mut descs = Vec::with_capacity(items.len());
            let mut total_size = 0;
            let mut dtype: Option<Dtype> = None;
            for item in items {
                let (item_desc, item_size, item_dtype) = describe_nested(item)?;
                if let (Some(prev), Some(cur)) = (dtype, item_dtype) {
                    if prev != cur {
                        return Err(KptsError::TypeMismatch(format!(
                            "several different scalar types encountered: {prev} and {cur}"
                        )));
                    }
                }
                descs.push(item_desc);
                total_size += item_size;
                dtype = item_dtype.or(dtype);
            }
            Ok((NestedDescriptor::Sequence(descs), total_size, dtype))
        }
    }
}

/// Flattens a nested collection of arrays into a newly allocated vector.
///
/// # Arguments
///
/// * `data` - The nested collection to flatten.
///
/// # Returns
///
/// The one-dimensional vector holding all scalar elements and the descriptor required to
/// restore `data` from it. A collection without arrays gives an empty `float64` vector.
///
/// # Errors
///
/// Errors with [`KptsError::TypeMismatch`] if two arrays have different scalar types.
pub fn nested_to_vector(data: &Nested) -> Result<(NumericArray, NestedDescriptor), KptsError> {
    let (desc, total_size, dtype) = describe_nested(data)?;
    let mut vector = NumericArray::zeros(dtype.unwrap_or(Dtype::Float64), &[total_size]);
    let end = nested_to_vector_into(data, &mut vector, 0)?;
    if end != total_size {
        return Err(KptsError::SizeMismatch(format!(
            "{end} elements written into a vector of {total_size} elements"
        )));
    }
    Ok((vector, desc))
}

/// Flattens a nested collection of arrays into an existing vector.
///
/// # Arguments
///
/// * `data` - The nested collection to flatten.
/// * `destination` - The one-dimensional vector to write into.
/// * `offset` - The position in `destination` of the first element to write.
///
/// # Returns
///
/// The position in `destination` just after the last element written.
///
/// # Errors
///
/// Errors if `destination` is not one-dimensional, has a different scalar type from an array
/// in `data`, or is too short.
pub fn nested_to_vector_into(
    data: &Nested,
    destination: &mut NumericArray,
    offset: usize,
) -> Result<usize, KptsError> {
    if destination.ndim() != 1 {
        return Err(KptsError::InvalidArgument(format!(
            "only vectors are accepted as destinations, got shape {:?}",
            destination.shape()
        )));
    }
    numeric_dispatch!(destination, dest => {
        let mut dest_1d = dest
            .view_mut()
            .into_dimensionality::<Ix1>()
            .map_err(|err| KptsError::InvalidArgument(err.to_string()))?;
        flatten_into_typed(data, &mut dest_1d, offset)
    })
}

fn flatten_into_typed<T: NestedScalar>(
    data: &Nested,
    destination: &mut ArrayViewMut1<T>,
    offset: usize,
) -> Result<usize, KptsError> {
    match data {
        Nested::Array(array) => {
            let leaf = T::peel(array).ok_or_else(|| {
                KptsError::TypeMismatch(format!(
                    "cannot write {} elements into a {} vector",
                    array.dtype(),
                    T::DTYPE
                ))
            })?;
            let end = offset + leaf.len();
            if end > destination.len() {
                return Err(KptsError::SizeMismatch(format!(
                    "vector of {} elements is too short to hold elements {offset}..{end}",
                    destination.len()
                )));
            }
            destination
                .slice_mut(s![offset..end])
                .iter_mut()
                .zip(leaf.iter())
                .for_each(|(d, x)| *d = x.clone());
            Ok(end)
        }
        Nested::Sequence(items) => items.iter().try_fold(offset, |offset, item| {
            flatten_into_typed(item, destination, offset)
        }),
    }
}
