//! Buffer descriptions handed to external transform planners.
//!
//! A planner needs a base pointer, the element kind, the extents and the
//! per-axis strides; it never needs to know about proxies or allocators.

use spectra_core::{Dims, ElementKind, Layout};

/// Everything a transform planner needs to address an array's storage.
///
/// The pointer is only valid while the array it was taken from is alive,
/// and writes through it are only sound while no other borrow of that
/// array's bytes is live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Address of element `[0, 0, …]`.
    pub ptr: *mut u8,
    /// Element kind of the storage.
    pub kind: ElementKind,
    /// Index-to-offset convention.
    pub layout: Layout,
    /// Extent of each axis.
    pub dims: Dims,
    /// Distance, in elements, between consecutive indices on each axis.
    pub strides: Dims,
    /// Total bytes addressed.
    pub byte_len: usize,
    /// Alignment guaranteed for `ptr`.
    pub alignment: usize,
}

impl BufferDescriptor {
    /// Number of elements addressed.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Whether no elements are addressed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `ptr` meets an alignment of `simd_width` bytes.
    pub fn is_aligned_to(&self, simd_width: usize) -> bool {
        simd_width.is_power_of_two() && (self.ptr as usize) % simd_width == 0
    }
}

/// Contiguous element strides for `dims` under `layout`.
///
/// Row-major: the last axis has stride 1. Column-major: the first axis
/// has stride 1.
pub fn element_strides(layout: Layout, dims: &[usize]) -> Dims {
    let mut strides: Dims = smallvec::smallvec![0; dims.len()];
    let mut step = 1usize;
    match layout {
        Layout::RowMajor => {
            for (s, &d) in strides.iter_mut().zip(dims).rev() {
                *s = step;
                step = step.saturating_mul(d);
            }
        }
        Layout::ColumnMajor => {
            for (s, &d) in strides.iter_mut().zip(dims) {
                *s = step;
                step = step.saturating_mul(d);
            }
        }
    }
    strides
}

/// Element offset of `index` within an array of `dims`, or `None` if the
/// index has the wrong rank or is out of bounds on any axis.
pub fn linear_offset(layout: Layout, dims: &[usize], index: &[usize]) -> Option<usize> {
    if index.len() != dims.len() || index.iter().zip(dims).any(|(&i, &d)| i >= d) {
        return None;
    }
    let strides = element_strides(layout, dims);
    Some(index.iter().zip(&strides).map(|(&i, &s)| i * s).sum())
}
