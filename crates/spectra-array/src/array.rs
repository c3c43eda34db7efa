//! The [`NDArray`] value type and its shared-storage views.

use std::fmt;
use std::sync::Arc;

use spectra_arena::{default_allocator, AlignedBuf, Proxy, SharedAllocator};
use spectra_core::{
    checked_byte_size, checked_element_count, validate_dims, ArrayError, ArrayFlags, Dims,
    ElementKind, Layout,
};
use tracing::debug;

use crate::descriptor::{element_strides, linear_offset, BufferDescriptor};
use crate::element::Element;

/// Where an array's bytes live.
enum Storage {
    /// Sole owner of the allocation, with no proxy. The handle is never
    /// cloned while the array stays owned.
    Owned(Arc<AlignedBuf>),
    /// View into a proxy-shared allocation, `offset` bytes from its start.
    Shared { proxy: Proxy, offset: usize },
}

/// A multidimensional numeric array over aligned storage.
///
/// Invariant: `byte_len == kind.byte_width() * product(dims)` and
/// `1 <= dims.len() <= MAX_DIMS`. Dropping an array releases its buffer
/// directly if it owns it, or drops one proxy reference otherwise; the
/// buffer is freed exactly once whatever order views are dropped in.
///
/// # Examples
///
/// ```
/// use spectra_array::{ElementKind, Layout, NDArray};
///
/// let mut a = NDArray::create(ElementKind::Float64, Layout::RowMajor, &[4, 4]).unwrap();
/// a.as_slice_mut::<f64>().unwrap()[5] = 2.5;
/// assert_eq!(a.len(), 16);
/// assert_eq!(a.byte_len(), 128);
/// assert_eq!(a.get::<f64>(&[1, 1]).unwrap(), 2.5);
///
/// let view = a.share();
/// assert_eq!(view.refcount(), 2);
/// drop(a);
/// assert_eq!(view.refcount(), 1);
/// ```
pub struct NDArray {
    kind: ElementKind,
    layout: Layout,
    dims: Dims,
    byte_len: usize,
    storage: Storage,
}

impl NDArray {
    /// Create a zero-filled array from the process-wide default arena.
    ///
    /// Fails with [`ArrayError::InvalidArgument`] for a bad shape and
    /// [`ArrayError::OutOfMemory`] when the size overflows or the arena
    /// cannot satisfy the request.
    pub fn create(kind: ElementKind, layout: Layout, dims: &[usize]) -> Result<Self, ArrayError> {
        Self::create_in(&default_allocator(), kind, layout, dims)
    }

    /// Create a zero-filled array from an explicit allocator.
    pub fn create_in(
        allocator: &SharedAllocator,
        kind: ElementKind,
        layout: Layout,
        dims: &[usize],
    ) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let size = checked_byte_size(kind, dims)?;
        let buf = AlignedBuf::zeroed_in(allocator, size).map_err(|_| ArrayError::OutOfMemory {
            requested: Some(size),
        })?;
        Ok(Self::owned(kind, layout, dims, buf))
    }

    /// Create an array from the default arena holding a copy of `payload`.
    ///
    /// `payload` is in host byte order and must be exactly the array's
    /// byte size.
    pub fn from_bytes(
        kind: ElementKind,
        layout: Layout,
        dims: &[usize],
        payload: &[u8],
    ) -> Result<Self, ArrayError> {
        Self::from_bytes_in(&default_allocator(), kind, layout, dims, payload)
    }

    /// Like [`from_bytes`](Self::from_bytes) with an explicit allocator.
    pub fn from_bytes_in(
        allocator: &SharedAllocator,
        kind: ElementKind,
        layout: Layout,
        dims: &[usize],
        payload: &[u8],
    ) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let size = checked_byte_size(kind, dims)?;
        if payload.len() != size {
            return Err(ArrayError::InvalidArgument {
                reason: format!(
                    "payload is {} bytes, shape {dims:?} of {kind} needs {size}",
                    payload.len()
                ),
            });
        }
        let buf = AlignedBuf::copy_from_in(allocator, payload).map_err(|_| {
            ArrayError::OutOfMemory {
                requested: Some(size),
            }
        })?;
        Ok(Self::owned(kind, layout, dims, buf))
    }

    /// Adopt an already-filled buffer as an owned array.
    ///
    /// The buffer length must match the shape exactly.
    pub fn from_buf(
        kind: ElementKind,
        layout: Layout,
        dims: &[usize],
        buf: AlignedBuf,
    ) -> Result<Self, ArrayError> {
        validate_dims(dims)?;
        let size = checked_byte_size(kind, dims)?;
        if buf.len() != size {
            return Err(ArrayError::InvalidArgument {
                reason: format!(
                    "buffer is {} bytes, shape {dims:?} of {kind} needs {size}",
                    buf.len()
                ),
            });
        }
        Ok(Self::owned(kind, layout, dims, buf))
    }

    fn owned(kind: ElementKind, layout: Layout, dims: &[usize], buf: AlignedBuf) -> Self {
        Self {
            kind,
            layout,
            dims: Dims::from_slice(dims),
            byte_len: buf.len(),
            storage: Storage::Owned(Arc::new(buf)),
        }
    }

    // ── Metadata ────────────────────────────────────────────────

    /// Element kind.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Memory layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Packed flags word as written by the binary codec.
    pub fn flags(&self) -> ArrayFlags {
        ArrayFlags::new(self.kind, self.layout)
    }

    /// Extent of each axis.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of axes.
    pub fn num_dims(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.byte_len == 0
    }

    /// Size of the payload in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Whether the storage is held through a proxy.
    pub fn is_shared(&self) -> bool {
        matches!(self.storage, Storage::Shared { .. })
    }

    /// Number of live views on this array's storage (1 when owned outright).
    pub fn refcount(&self) -> usize {
        match &self.storage {
            Storage::Shared { proxy, .. } => proxy.refcount(),
            Storage::Owned(_) => 1,
        }
    }

    /// Whether two arrays are views on the same allocation.
    pub fn shares_storage_with(&self, other: &NDArray) -> bool {
        match (&self.storage, &other.storage) {
            (Storage::Shared { proxy: a, .. }, Storage::Shared { proxy: b, .. }) => {
                Proxy::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    /// The allocator that owns this array's memory.
    pub fn allocator(&self) -> &SharedAllocator {
        match &self.storage {
            Storage::Owned(buf) => buf.allocator(),
            Storage::Shared { proxy, .. } => proxy.buffer().allocator(),
        }
    }

    // ── Raw access ──────────────────────────────────────────────

    fn data_ptr(&self) -> *mut u8 {
        match &self.storage {
            Storage::Owned(buf) => buf.data_ptr(),
            Storage::Shared { proxy, offset } => proxy.buffer().data_ptr().wrapping_add(*offset),
        }
    }

    /// Payload bytes in host byte order.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(buf) => buf.as_bytes(),
            Storage::Shared { proxy, offset } => {
                &proxy.buffer().as_bytes()[*offset..*offset + self.byte_len]
            }
        }
    }

    /// Mutable payload bytes.
    ///
    /// Fails with [`ArrayError::Aliased`] while another live view shares
    /// the storage; call [`detach`](Self::detach) first to write anyway.
    pub fn as_bytes_mut(&mut self) -> Result<&mut [u8], ArrayError> {
        let byte_len = self.byte_len;
        match &mut self.storage {
            Storage::Owned(buf) => {
                let views = Arc::strong_count(buf);
                Arc::get_mut(buf)
                    .map(|buf| buf.as_bytes_mut())
                    .ok_or(ArrayError::Aliased { views })
            }
            Storage::Shared { proxy, offset } => {
                let views = proxy.refcount();
                let offset = *offset;
                match proxy.get_mut() {
                    Some(buf) => Ok(&mut buf.as_bytes_mut()[offset..offset + byte_len]),
                    None => Err(ArrayError::Aliased { views }),
                }
            }
        }
    }

    // ── Typed access ────────────────────────────────────────────

    fn check_kind<T: Element>(&self) -> Result<(), ArrayError> {
        if T::accepts(self.kind) {
            Ok(())
        } else {
            Err(ArrayError::InvalidArgument {
                reason: format!("array of {} cannot be viewed as {}", self.kind, T::KIND),
            })
        }
    }

    fn check_align<T: Element>(&self, ptr: *const u8) -> Result<(), ArrayError> {
        let align = std::mem::align_of::<T>();
        if (ptr as usize) % align == 0 {
            Ok(())
        } else {
            Err(ArrayError::InvalidArgument {
                reason: format!(
                    "storage at {ptr:p} is not aligned for {} (needs {align} bytes)",
                    T::KIND
                ),
            })
        }
    }

    /// The elements as a typed slice, in storage order.
    ///
    /// Fails with [`ArrayError::InvalidArgument`] when the kind does not
    /// match `T` or the storage start is not aligned for `T`.
    #[allow(unsafe_code)]
    pub fn as_slice<T: Element>(&self) -> Result<&[T], ArrayError> {
        self.check_kind::<T>()?;
        let bytes = self.as_bytes();
        self.check_align::<T>(bytes.as_ptr())?;
        // SAFETY: `T` is a POD type of exactly `kind.byte_width()` bytes
        // (`Element` contract), the pointer was checked to be aligned for
        // `T`, and `bytes` covers `len()` elements.
        Ok(unsafe {
            std::slice::from_raw_parts(bytes.as_ptr().cast::<T>(), bytes.len() / size_of::<T>())
        })
    }

    /// The elements as a mutable typed slice.
    ///
    /// Same aliasing rule as [`as_bytes_mut`](Self::as_bytes_mut).
    #[allow(unsafe_code)]
    pub fn as_slice_mut<T: Element>(&mut self) -> Result<&mut [T], ArrayError> {
        self.check_kind::<T>()?;
        self.check_align::<T>(self.data_ptr())?;
        let bytes = self.as_bytes_mut()?;
        let len = bytes.len() / size_of::<T>();
        // SAFETY: as for `as_slice`; exclusivity comes from `as_bytes_mut`.
        Ok(unsafe { std::slice::from_raw_parts_mut(bytes.as_mut_ptr().cast::<T>(), len) })
    }

    fn element_index(&self, index: &[usize]) -> Result<usize, ArrayError> {
        linear_offset(self.layout, &self.dims, index).ok_or_else(|| ArrayError::InvalidArgument {
            reason: format!("index {index:?} out of bounds for shape {:?}", self.dims),
        })
    }

    /// Read one element.
    pub fn get<T: Element>(&self, index: &[usize]) -> Result<T, ArrayError> {
        let at = self.element_index(index)?;
        Ok(self.as_slice::<T>()?[at])
    }

    /// Write one element.
    pub fn set<T: Element>(&mut self, index: &[usize], value: T) -> Result<(), ArrayError> {
        let at = self.element_index(index)?;
        self.as_slice_mut::<T>()?[at] = value;
        Ok(())
    }

    /// Fill every element with `value`.
    pub fn fill<T: Element>(&mut self, value: T) -> Result<(), ArrayError> {
        self.as_slice_mut::<T>()?.fill(value);
        Ok(())
    }

    // ── Views ───────────────────────────────────────────────────

    /// Move owned storage into a proxy (no-op if already shared) and
    /// return a new reference to it with this view's offset.
    fn promote(&mut self) -> (Proxy, usize) {
        let (proxy, offset) = match &self.storage {
            Storage::Owned(buf) => {
                debug!(kind = %self.kind, bytes = buf.len(), "array storage now shared");
                (Proxy::from_arc(Arc::clone(buf)), 0)
            }
            Storage::Shared { proxy, offset } => (proxy.clone(), *offset),
        };
        self.storage = Storage::Shared {
            proxy: proxy.clone(),
            offset,
        };
        (proxy, offset)
    }

    fn view(&self, proxy: Proxy, offset: usize, dims: &[usize], byte_len: usize) -> NDArray {
        NDArray {
            kind: self.kind,
            layout: self.layout,
            dims: Dims::from_slice(dims),
            byte_len,
            storage: Storage::Shared { proxy, offset },
        }
    }

    /// A second view of the whole array, sharing its storage.
    ///
    /// The first call creates the proxy; each view holds one reference.
    pub fn share(&mut self) -> NDArray {
        let (proxy, offset) = self.promote();
        let dims = self.dims.clone();
        self.view(proxy, offset, &dims, self.byte_len)
    }

    /// A view with a different shape over the same elements.
    ///
    /// The new shape must be valid and hold exactly as many elements.
    pub fn reshape(&mut self, dims: &[usize]) -> Result<NDArray, ArrayError> {
        validate_dims(dims)?;
        if checked_element_count(dims) != Some(self.len()) {
            return Err(ArrayError::InvalidArgument {
                reason: format!(
                    "cannot reshape {:?} ({} elements) to {dims:?}",
                    self.dims,
                    self.len()
                ),
            });
        }
        let (proxy, offset) = self.promote();
        Ok(self.view(proxy, offset, dims, self.byte_len))
    }

    /// A view of one sub-array along the outermost (slowest-varying) axis.
    ///
    /// Row-major arrays fix the first index; column-major arrays fix the
    /// last. The result has one fewer dimension and shares storage.
    pub fn slice_outer(&mut self, index: usize) -> Result<NDArray, ArrayError> {
        if self.dims.len() < 2 {
            return Err(ArrayError::InvalidArgument {
                reason: "cannot slice a one-dimensional array".into(),
            });
        }
        let (axis, sub_dims) = match self.layout {
            Layout::RowMajor => (0, &self.dims[1..]),
            Layout::ColumnMajor => (self.dims.len() - 1, &self.dims[..self.dims.len() - 1]),
        };
        if index >= self.dims[axis] {
            return Err(ArrayError::InvalidArgument {
                reason: format!(
                    "slice index {index} out of bounds for axis {axis} of extent {}",
                    self.dims[axis]
                ),
            });
        }
        let sub_dims = Dims::from_slice(sub_dims);
        // Fits: the sub-array is a part of an existing allocation.
        let sub_bytes = sub_dims.iter().product::<usize>() * self.kind.byte_width();
        let (proxy, offset) = self.promote();
        Ok(self.view(proxy, offset + index * sub_bytes, &sub_dims, sub_bytes))
    }

    /// Give this view private storage if any other view shares it.
    ///
    /// A sole holder of a whole proxy buffer takes it back without copying.
    pub fn detach(&mut self) -> Result<(), ArrayError> {
        let Storage::Shared { proxy, offset } = &self.storage else {
            return Ok(());
        };
        if proxy.refcount() == 1 && *offset == 0 && proxy.len() == self.byte_len {
            let buf = proxy.clone().into_arc();
            self.storage = Storage::Owned(buf);
            return Ok(());
        }
        self.storage = self.deep_copy()?.storage;
        Ok(())
    }

    /// An independent, proxy-less copy from the same allocator.
    pub fn deep_copy(&self) -> Result<NDArray, ArrayError> {
        Self::from_bytes_in(self.allocator(), self.kind, self.layout, &self.dims, self.as_bytes())
    }

    /// Describe the storage for an external transform planner.
    pub fn describe(&self) -> BufferDescriptor {
        BufferDescriptor {
            ptr: self.data_ptr(),
            kind: self.kind,
            layout: self.layout,
            dims: self.dims.clone(),
            strides: element_strides(self.layout, &self.dims),
            byte_len: self.byte_len,
            alignment: self.alignment(),
        }
    }

    /// Guaranteed alignment of the first element: the allocator's
    /// alignment, reduced for views that start inside the buffer.
    fn alignment(&self) -> usize {
        let base = self.allocator().alignment();
        match self.storage {
            Storage::Shared { offset, .. } if offset != 0 => {
                base.min(1 << offset.trailing_zeros())
            }
            _ => base,
        }
    }
}

impl PartialEq for NDArray {
    /// Same kind, layout, shape and payload bytes; storage identity is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.layout == other.layout
            && self.dims == other.dims
            && self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for NDArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NDArray")
            .field("kind", &self.kind)
            .field("layout", &self.layout)
            .field("dims", &self.dims.as_slice())
            .field("byte_len", &self.byte_len)
            .field("shared", &self.is_shared())
            .field("refcount", &self.refcount())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Complex64;
    use spectra_arena::{AlignedArena, ArenaConfig, ArenaError, BufferAllocator};
    use spectra_core::{MAX_DIM, MAX_DIMS};
    use std::ptr::NonNull;

    fn arena() -> (Arc<AlignedArena>, SharedAllocator) {
        let arena = AlignedArena::shared(ArenaConfig::default()).unwrap();
        let alloc: SharedAllocator = arena.clone();
        (arena, alloc)
    }

    #[test]
    fn create_float64_4x4() {
        let a = NDArray::create(ElementKind::Float64, Layout::RowMajor, &[4, 4]).unwrap();
        assert_eq!(a.dims(), &[4, 4]);
        assert_eq!(a.len(), 16);
        assert_eq!(a.byte_len(), 128);
        assert!(!a.is_shared());
        assert_eq!(a.refcount(), 1);
        assert!(a.as_slice::<f64>().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn create_rejects_bad_rank() {
        let err = NDArray::create(ElementKind::Int8, Layout::RowMajor, &[]).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidArgument { .. }));
        let err =
            NDArray::create(ElementKind::Int8, Layout::RowMajor, &[1; MAX_DIMS + 1]).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidArgument { .. }));
    }

    #[test]
    fn create_rejects_oversized_dimension() {
        let err =
            NDArray::create(ElementKind::Uint8, Layout::RowMajor, &[MAX_DIM + 1]).unwrap_err();
        assert!(matches!(err, ArrayError::InvalidArgument { .. }));
    }

    #[test]
    fn create_overflow_is_out_of_memory() {
        let (arena, alloc) = arena();
        let err = NDArray::create_in(
            &alloc,
            ElementKind::Complex64,
            Layout::RowMajor,
            &[MAX_DIM, MAX_DIM, MAX_DIM],
        )
        .unwrap_err();
        assert_eq!(err, ArrayError::OutOfMemory { requested: None });
        assert_eq!(arena.stats().total_allocations, 0);
    }

    #[test]
    fn zero_extent_array_is_valid() {
        let a = NDArray::create(ElementKind::Float32, Layout::ColumnMajor, &[0, 3]).unwrap();
        assert!(a.is_empty());
        assert_eq!(a.byte_len(), 0);
        assert!(a.as_slice::<f32>().unwrap().is_empty());
    }

    #[test]
    fn buffers_are_aligned() {
        let a = NDArray::create(ElementKind::Complex32, Layout::RowMajor, &[3, 5]).unwrap();
        assert!(a.describe().is_aligned_to(64));
    }

    #[test]
    fn wrong_element_type_rejected() {
        let a = NDArray::create(ElementKind::Float32, Layout::RowMajor, &[2]).unwrap();
        assert!(matches!(
            a.as_slice::<f64>(),
            Err(ArrayError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn get_and_set_respect_layout() {
        let mut row = NDArray::create(ElementKind::Int32, Layout::RowMajor, &[2, 3]).unwrap();
        row.set::<i32>(&[1, 0], 9).unwrap();
        assert_eq!(row.as_slice::<i32>().unwrap(), &[0, 0, 0, 9, 0, 0]);

        let mut col = NDArray::create(ElementKind::Int32, Layout::ColumnMajor, &[2, 3]).unwrap();
        col.set::<i32>(&[1, 0], 9).unwrap();
        assert_eq!(col.as_slice::<i32>().unwrap(), &[0, 9, 0, 0, 0, 0]);
        assert_eq!(col.get::<i32>(&[1, 0]).unwrap(), 9);
        assert!(col.get::<i32>(&[2, 0]).is_err());
    }

    #[test]
    fn from_bytes_checks_length() {
        let err = NDArray::from_bytes(ElementKind::Int16, Layout::RowMajor, &[3], &[0; 5])
            .unwrap_err();
        assert!(matches!(err, ArrayError::InvalidArgument { .. }));
        let a = NDArray::from_bytes(ElementKind::Int16, Layout::RowMajor, &[3], &[1; 6]).unwrap();
        assert_eq!(a.as_bytes(), &[1; 6]);
    }

    #[test]
    fn owned_array_frees_on_drop() {
        let (arena, alloc) = arena();
        let a = NDArray::create_in(&alloc, ElementKind::Float64, Layout::RowMajor, &[8]).unwrap();
        assert_eq!(arena.stats().live_bytes, 64);
        drop(a);
        assert_eq!(arena.stats().live_buffers, 0);
    }

    #[test]
    fn share_creates_proxy_on_first_use() {
        let (arena, alloc) = arena();
        let mut a = NDArray::create_in(&alloc, ElementKind::Int8, Layout::RowMajor, &[4]).unwrap();
        let b = a.share();
        assert!(a.is_shared());
        assert!(b.is_shared());
        assert!(a.shares_storage_with(&b));
        assert_eq!(a.refcount(), 2);
        let c = a.share();
        assert_eq!(c.refcount(), 3);
        assert_eq!(arena.stats().total_allocations, 1);
    }

    #[test]
    fn views_freed_exactly_once_original_first() {
        let (arena, alloc) = arena();
        let mut a =
            NDArray::create_in(&alloc, ElementKind::Float32, Layout::RowMajor, &[16]).unwrap();
        let b = a.share();
        drop(a);
        assert_eq!(arena.stats().live_buffers, 1);
        assert_eq!(b.refcount(), 1);
        drop(b);
        assert_eq!(arena.stats().live_buffers, 0);
    }

    #[test]
    fn views_freed_exactly_once_view_first() {
        let (arena, alloc) = arena();
        let mut a =
            NDArray::create_in(&alloc, ElementKind::Float32, Layout::RowMajor, &[16]).unwrap();
        let b = a.share();
        drop(b);
        assert_eq!(arena.stats().live_buffers, 1);
        drop(a);
        assert_eq!(arena.stats().live_buffers, 0);
    }

    #[test]
    fn aliased_write_is_rejected_until_other_view_drops() {
        let mut a = NDArray::create(ElementKind::Uint8, Layout::RowMajor, &[4]).unwrap();
        let b = a.share();
        assert_eq!(a.as_bytes_mut().unwrap_err(), ArrayError::Aliased { views: 2 });
        drop(b);
        a.as_bytes_mut().unwrap()[0] = 1;
        assert_eq!(a.as_bytes()[0], 1);
    }

    #[test]
    fn writes_before_share_are_visible_through_view() {
        let mut a = NDArray::create(ElementKind::Float64, Layout::RowMajor, &[2, 2]).unwrap();
        a.set::<f64>(&[1, 1], 4.0).unwrap();
        let b = a.share();
        assert_eq!(b.get::<f64>(&[1, 1]).unwrap(), 4.0);
    }

    #[test]
    fn reshape_keeps_elements() {
        let mut a = NDArray::create(ElementKind::Int16, Layout::RowMajor, &[2, 6]).unwrap();
        a.as_slice_mut::<i16>()
            .unwrap()
            .iter_mut()
            .enumerate()
            .for_each(|(i, v)| *v = i as i16);
        let r = a.reshape(&[3, 4]).unwrap();
        assert_eq!(r.dims(), &[3, 4]);
        assert_eq!(r.get::<i16>(&[2, 3]).unwrap(), 11);
        assert!(a.reshape(&[5]).is_err());
        assert!(a.reshape(&[]).is_err());
    }

    #[test]
    fn slice_outer_row_major() {
        let mut a = NDArray::create(ElementKind::Float64, Layout::RowMajor, &[3, 2]).unwrap();
        a.as_slice_mut::<f64>()
            .unwrap()
            .copy_from_slice(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let row = a.slice_outer(1).unwrap();
        assert_eq!(row.dims(), &[2]);
        assert_eq!(row.as_slice::<f64>().unwrap(), &[2.0, 3.0]);
        assert!(row.describe().is_aligned_to(8));
        assert!(a.slice_outer(3).is_err());
    }

    #[test]
    fn slice_outer_column_major() {
        let mut a = NDArray::create(ElementKind::Int32, Layout::ColumnMajor, &[2, 3]).unwrap();
        a.as_slice_mut::<i32>()
            .unwrap()
            .copy_from_slice(&[0, 1, 2, 3, 4, 5]);
        let col = a.slice_outer(2).unwrap();
        assert_eq!(col.dims(), &[2]);
        assert_eq!(col.as_slice::<i32>().unwrap(), &[4, 5]);
    }

    #[test]
    fn slice_of_one_dimension_rejected() {
        let mut a = NDArray::create(ElementKind::Int32, Layout::RowMajor, &[3]).unwrap();
        assert!(a.slice_outer(0).is_err());
        assert!(!a.is_shared());
    }

    #[test]
    fn slices_keep_buffer_alive() {
        let (arena, alloc) = arena();
        let mut a =
            NDArray::create_in(&alloc, ElementKind::Complex64, Layout::RowMajor, &[4, 2]).unwrap();
        a.set(&[3, 1], Complex64::new(1.0, -1.0)).unwrap();
        let last = a.slice_outer(3).unwrap();
        drop(a);
        assert_eq!(arena.stats().live_buffers, 1);
        assert_eq!(last.get::<Complex64>(&[1]).unwrap(), Complex64::new(1.0, -1.0));
        drop(last);
        assert_eq!(arena.stats().live_buffers, 0);
    }

    #[test]
    fn detach_copies_when_aliased() {
        let (arena, alloc) = arena();
        let mut a = NDArray::create_in(&alloc, ElementKind::Uint8, Layout::RowMajor, &[4]).unwrap();
        let b = a.share();
        a.detach().unwrap();
        assert!(!a.is_shared());
        assert_eq!(b.refcount(), 1);
        assert_eq!(arena.stats().live_buffers, 2);
        a.as_bytes_mut().unwrap()[0] = 5;
        assert_eq!(b.as_bytes()[0], 0);
    }

    #[test]
    fn detach_reclaims_sole_proxy_without_copy() {
        let (arena, alloc) = arena();
        let mut a = NDArray::create_in(&alloc, ElementKind::Uint8, Layout::RowMajor, &[4]).unwrap();
        drop(a.share());
        assert!(a.is_shared());
        a.detach().unwrap();
        assert!(!a.is_shared());
        assert_eq!(arena.stats().total_allocations, 1);
    }

    #[test]
    fn share_detach_cycle_keeps_one_buffer() {
        let (arena, alloc) = arena();
        let mut a = NDArray::create_in(&alloc, ElementKind::Uint8, Layout::RowMajor, &[4]).unwrap();
        for round in 1..=3u8 {
            let view = a.share();
            assert_eq!(a.refcount(), 2);
            assert!(matches!(a.as_bytes_mut(), Err(ArrayError::Aliased { views: 2 })));
            drop(view);
            a.detach().unwrap();
            assert!(!a.is_shared());
            a.as_bytes_mut().unwrap()[0] = round;
        }
        assert_eq!(a.as_bytes(), &[3, 0, 0, 0]);
        let stats = arena.stats();
        assert_eq!(stats.total_allocations, 1);
        assert_eq!(stats.live_buffers, 1);
    }

    /// Hands out pointers that are 4-aligned but never 8-aligned.
    #[derive(Debug)]
    struct FourByteAllocator {
        inner: Arc<AlignedArena>,
    }

    #[allow(unsafe_code)]
    unsafe impl BufferAllocator for FourByteAllocator {
        fn alignment(&self) -> usize {
            4
        }

        fn allocate(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
            let base = self.inner.allocate(size + 4)?;
            // SAFETY: `base` is valid for `size + 4` bytes.
            Ok(unsafe { NonNull::new_unchecked(base.as_ptr().add(4)) })
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize) {
            // SAFETY: undoes the offset applied in `allocate`.
            unsafe {
                self.inner
                    .deallocate(NonNull::new_unchecked(ptr.as_ptr().sub(4)), size + 4)
            };
        }
    }

    #[test]
    fn misaligned_storage_rejected_for_typed_access() {
        let inner = AlignedArena::shared(ArenaConfig::default()).unwrap();
        let alloc: SharedAllocator = Arc::new(FourByteAllocator {
            inner: Arc::clone(&inner),
        });

        let mut wide =
            NDArray::create_in(&alloc, ElementKind::Float64, Layout::RowMajor, &[3]).unwrap();
        assert_eq!(wide.describe().alignment, 4);
        assert!(matches!(
            wide.as_slice::<f64>(),
            Err(ArrayError::InvalidArgument { .. })
        ));
        assert!(wide.as_slice_mut::<f64>().is_err());
        assert!(wide.get::<f64>(&[0]).is_err());
        assert!(wide.set::<f64>(&[0], 1.0).is_err());
        assert_eq!(wide.as_bytes(), &[0; 24]);

        let mut narrow =
            NDArray::create_in(&alloc, ElementKind::Float32, Layout::RowMajor, &[2]).unwrap();
        narrow.set::<f32>(&[1], 2.5).unwrap();
        assert_eq!(narrow.as_slice::<f32>().unwrap(), &[0.0, 2.5]);

        drop(wide);
        drop(narrow);
        assert_eq!(inner.stats().live_buffers, 0);
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut a = NDArray::create(ElementKind::Float32, Layout::RowMajor, &[3]).unwrap();
        a.fill(1.5f32).unwrap();
        let mut b = a.deep_copy().unwrap();
        assert_eq!(a, b);
        b.fill(0.0f32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn describe_reports_strides() {
        let a = NDArray::create(ElementKind::Float64, Layout::ColumnMajor, &[4, 5]).unwrap();
        let d = a.describe();
        assert_eq!(d.kind, ElementKind::Float64);
        assert_eq!(d.strides.as_slice(), &[1, 4]);
        assert_eq!(d.byte_len, 160);
        assert_eq!(d.alignment, 64);
        assert_eq!(d.len(), 20);
    }

    #[test]
    fn array_moves_across_threads() {
        let mut a = NDArray::create(ElementKind::Int64, Layout::RowMajor, &[8]).unwrap();
        let b = a.share();
        let h = std::thread::spawn(move || b.len());
        assert_eq!(h.join().unwrap(), 8);
        assert_eq!(a.refcount(), 1);
    }
}
