//! Low-level primitives for arena memory operations.
//!
//! The only module in this crate that calls into `std::alloc`. Every
//! `unsafe` operation carries a `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

/// Layout for a non-empty request, or `None` if size/alignment are invalid.
pub(crate) fn layout(size: usize, alignment: usize) -> Option<Layout> {
    Layout::from_size_align(size, alignment).ok()
}

/// A well-aligned, non-null pointer usable for zero-length buffers.
///
/// Never dereferenced and never passed to the system allocator.
pub(crate) fn dangling(alignment: usize) -> NonNull<u8> {
    NonNull::new(ptr::without_provenance_mut::<u8>(alignment)).unwrap_or(NonNull::dangling())
}

/// Allocate zeroed memory for `layout`. `layout.size()` must be non-zero.
pub(crate) fn alloc_zeroed(layout: Layout) -> Option<NonNull<u8>> {
    debug_assert!(layout.size() > 0);
    // SAFETY: callers route zero-size requests to `dangling()`, so the
    // layout has a non-zero size as `alloc_zeroed` requires.
    NonNull::new(unsafe { alloc::alloc_zeroed(layout) })
}

/// Return memory obtained from [`alloc_zeroed`] to the system allocator.
///
/// # Safety
///
/// `ptr` must have been returned by [`alloc_zeroed`] with this exact
/// `layout`, and must not have been freed already.
pub(crate) unsafe fn dealloc(ptr: NonNull<u8>, layout: Layout) {
    // SAFETY: forwarded from the caller's contract.
    unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
}
