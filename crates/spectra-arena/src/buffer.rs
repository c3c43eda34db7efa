//! Exclusively owned aligned buffers.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use crate::alloc::SharedAllocator;
use crate::error::ArenaError;

/// One allocation from a [`BufferAllocator`](crate::BufferAllocator),
/// owned outright.
///
/// The buffer keeps a handle to the allocator that produced it and
/// returns the memory there on drop, exactly once. Contents start zeroed.
pub struct AlignedBuf {
    ptr: NonNull<u8>,
    len: usize,
    allocator: SharedAllocator,
}

// SAFETY: `AlignedBuf` uniquely owns its allocation (like `Box<[u8]>`);
// the allocator handle is `Send + Sync` by the trait bound.
#[allow(unsafe_code)]
unsafe impl Send for AlignedBuf {}

// SAFETY: shared access only hands out `&[u8]`; mutation needs `&mut self`.
#[allow(unsafe_code)]
unsafe impl Sync for AlignedBuf {}

impl AlignedBuf {
    /// Allocate `len` zeroed bytes from `allocator`.
    pub fn zeroed_in(allocator: &SharedAllocator, len: usize) -> Result<Self, ArenaError> {
        let ptr = allocator.allocate(len)?;
        Ok(Self {
            ptr,
            len,
            allocator: Arc::clone(allocator),
        })
    }

    /// Allocate a buffer from `allocator` holding a copy of `bytes`.
    pub fn copy_from_in(allocator: &SharedAllocator, bytes: &[u8]) -> Result<Self, ArenaError> {
        let mut buf = Self::zeroed_in(allocator, bytes.len())?;
        buf.as_bytes_mut().copy_from_slice(bytes);
        Ok(buf)
    }

    /// Length in bytes (the size tag of the allocation).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length buffer.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment guaranteed for the start of the buffer.
    pub fn alignment(&self) -> usize {
        self.allocator.alignment()
    }

    /// The allocator this buffer will be returned to.
    pub fn allocator(&self) -> &SharedAllocator {
        &self.allocator
    }

    /// Raw start pointer.
    ///
    /// The pointer is valid for `len()` bytes while the buffer lives.
    /// Writing through it while any `&[u8]` borrow of this buffer is alive
    /// is undefined behaviour.
    pub fn data_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The contents as bytes.
    #[allow(unsafe_code)]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `ptr` is valid, aligned and initialised (zeroed at
        // allocation) for `len` bytes for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The contents as mutable bytes.
    #[allow(unsafe_code)]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as for `as_bytes`; `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for AlignedBuf {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        // SAFETY: `ptr` was returned by `self.allocator.allocate(self.len)`
        // and ownership is unique, so this is the only release.
        unsafe { self.allocator.deallocate(self.ptr, self.len) };
    }
}

impl fmt::Debug for AlignedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuf")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("alignment", &self.alignment())
            .finish()
    }
}
