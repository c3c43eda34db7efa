//! Shape validation and overflow-checked size arithmetic.

use smallvec::SmallVec;

use crate::error::ArrayError;
use crate::kind::ElementKind;

/// Maximum number of dimensions an array may have.
pub const MAX_DIMS: usize = 16;

/// Largest permitted extent of a single dimension (`2^31 - 1`).
///
/// Every dimension must fit the 4-byte dimension words of the binary
/// format.
pub const MAX_DIM: usize = 0x7FFF_FFFF;

/// Dimension list of an array.
///
/// Uses `SmallVec<[usize; 4]>` so the common 1–4 dimensional transforms
/// never touch the heap for their shape.
pub type Dims = SmallVec<[usize; 4]>;

/// Check the number of dimensions and each extent.
///
/// Fails with [`ArrayError::InvalidArgument`] when `dims` is empty, has
/// more than [`MAX_DIMS`] entries, or any entry exceeds [`MAX_DIM`].
pub fn validate_dims(dims: &[usize]) -> Result<(), ArrayError> {
    if dims.is_empty() || dims.len() > MAX_DIMS {
        return Err(ArrayError::InvalidArgument {
            reason: format!(
                "bad number of dimensions: {} (expected 1..={MAX_DIMS})",
                dims.len()
            ),
        });
    }
    if let Some((axis, &extent)) = dims.iter().enumerate().find(|(_, &d)| d > MAX_DIM) {
        return Err(ArrayError::InvalidArgument {
            reason: format!("dimension {axis} out of range: {extent} > {MAX_DIM}"),
        });
    }
    Ok(())
}

/// Product of all dimensions, or `None` on overflow.
///
/// The product of an empty list is 1, matching a zero-dimensional scalar.
pub fn checked_element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Byte size of an array of `kind` with the given dimensions.
///
/// Fails with [`ArrayError::OutOfMemory`] if the element count or the
/// byte size overflows, or exceeds `isize::MAX` (the largest request any
/// allocator can honour).
pub fn checked_byte_size(kind: ElementKind, dims: &[usize]) -> Result<usize, ArrayError> {
    checked_element_count(dims)
        .and_then(|n| n.checked_mul(kind.byte_width()))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(ArrayError::OutOfMemory { requested: None })
}
