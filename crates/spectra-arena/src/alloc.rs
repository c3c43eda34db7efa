//! The [`BufferAllocator`] seam and its default [`AlignedArena`] implementation.

use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::raw;

/// Source of aligned, zero-initialised array storage.
///
/// Threaded explicitly into array construction so the alignment
/// requirement is visible at every call site.
///
/// # Safety
///
/// Implementations must guarantee that a pointer returned by
/// [`allocate(size)`](BufferAllocator::allocate):
///
/// - is aligned to [`alignment()`](BufferAllocator::alignment),
/// - is valid for reads and writes of `size` bytes and zero-initialised,
/// - stays valid until passed to [`deallocate`](BufferAllocator::deallocate)
///   with the same `size`.
#[allow(unsafe_code)]
pub unsafe trait BufferAllocator: Send + Sync + fmt::Debug {
    /// Alignment, in bytes, of every pointer this allocator returns.
    ///
    /// A power of two. No lower bound is assumed: typed element access
    /// checks the actual pointer before reinterpreting bytes.
    fn alignment(&self) -> usize;

    /// Allocate `size` zeroed bytes. `size == 0` is legal.
    fn allocate(&self, size: usize) -> Result<NonNull<u8>, ArenaError>;

    /// Release memory obtained from [`allocate`](BufferAllocator::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must come from `self.allocate(size)` and must not have been
    /// released before. Each allocation is released exactly once.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize);
}

/// Shared handle to an allocator, carried by every buffer it produced.
pub type SharedAllocator = Arc<dyn BufferAllocator>;

/// Point-in-time allocation counters of an [`AlignedArena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Buffers allocated and not yet freed (zero-length buffers included).
    pub live_buffers: usize,
    /// Bytes allocated and not yet freed.
    pub live_bytes: usize,
    /// Allocations served since the arena was created.
    pub total_allocations: u64,
}

/// Aligned allocator over the system heap.
///
/// Each request becomes a `Layout` of `(size, alignment)` and is served
/// by the global allocator; memory is zeroed. Counters are maintained
/// atomically so tests and diagnostics can verify that every buffer is
/// freed exactly once.
pub struct AlignedArena {
    config: ArenaConfig,
    live_buffers: AtomicUsize,
    live_bytes: AtomicUsize,
    total_allocations: AtomicU64,
}

static GLOBAL_ARENA: OnceLock<Arc<AlignedArena>> = OnceLock::new();

// Compile-time assertion: AlignedArena must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<AlignedArena>();
};

impl AlignedArena {
    /// Create an arena after validating `config`.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            config,
            live_buffers: AtomicUsize::new(0),
            live_bytes: AtomicUsize::new(0),
            total_allocations: AtomicU64::new(0),
        })
    }

    /// Create an arena with the given alignment.
    pub fn with_alignment(alignment: usize) -> Result<Self, ArenaError> {
        Self::new(ArenaConfig::with_alignment(alignment))
    }

    /// Create an arena and wrap it for sharing.
    pub fn shared(config: ArenaConfig) -> Result<Arc<Self>, ArenaError> {
        Self::new(config).map(Arc::new)
    }

    /// The process-wide default arena (default config, created on first use).
    pub fn global() -> Arc<AlignedArena> {
        Arc::clone(GLOBAL_ARENA.get_or_init(|| {
            Arc::new(Self {
                config: ArenaConfig::default(),
                live_buffers: AtomicUsize::new(0),
                live_bytes: AtomicUsize::new(0),
                total_allocations: AtomicU64::new(0),
            })
        }))
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Snapshot of the allocation counters.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            live_buffers: self.live_buffers.load(Ordering::Acquire),
            live_bytes: self.live_bytes.load(Ordering::Acquire),
            total_allocations: self.total_allocations.load(Ordering::Acquire),
        }
    }

    fn record_alloc(&self, size: usize) {
        self.live_buffers.fetch_add(1, Ordering::AcqRel);
        self.live_bytes.fetch_add(size, Ordering::AcqRel);
        self.total_allocations.fetch_add(1, Ordering::AcqRel);
    }

    fn record_free(&self, size: usize) {
        self.live_buffers.fetch_sub(1, Ordering::AcqRel);
        self.live_bytes.fetch_sub(size, Ordering::AcqRel);
    }
}

impl fmt::Debug for AlignedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedArena")
            .field("alignment", &self.config.alignment)
            .field("stats", &self.stats())
            .finish()
    }
}

// SAFETY: `allocate` builds a `Layout` with `self.config.alignment`
// (validated power of two) and uses `alloc_zeroed`, or returns an aligned
// dangling pointer for zero-size requests; `deallocate` rebuilds the same
// layout from `size` and releases non-empty allocations exactly once.
#[allow(unsafe_code)]
unsafe impl BufferAllocator for AlignedArena {
    fn alignment(&self) -> usize {
        self.config.alignment
    }

    fn allocate(&self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        let alignment = self.config.alignment;
        if size == 0 {
            self.record_alloc(0);
            return Ok(raw::dangling(alignment));
        }
        let oom = ArenaError::OutOfMemory {
            requested: size,
            alignment,
        };
        let Some(layout) = raw::layout(size, alignment) else {
            warn!(size, alignment, "arena request exceeds the addressable layout range");
            return Err(oom);
        };
        match raw::alloc_zeroed(layout) {
            Some(ptr) => {
                self.record_alloc(size);
                debug!(size, alignment, "arena allocated buffer");
                Ok(ptr)
            }
            None => {
                warn!(size, alignment, "arena allocation failed");
                Err(oom)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, size: usize) {
        self.record_free(size);
        if size == 0 {
            return;
        }
        // `allocate` succeeded with this size, so the layout is valid.
        if let Some(layout) = raw::layout(size, self.config.alignment) {
            debug!(size, "arena freed buffer");
            // SAFETY: the caller guarantees `ptr` came from `allocate(size)`
            // on this arena, which used exactly this layout.
            unsafe { raw::dealloc(ptr, layout) };
        }
    }
}

/// The process-wide default arena as a [`SharedAllocator`].
pub fn default_allocator() -> SharedAllocator {
    AlignedArena::global()
}
