//! Shared-ownership records for buffers aliased by several array views.
//!
//! A [`Proxy`] is created the first time a buffer has to be shared. Each
//! view holds one clone; the reference count is atomic, so views may
//! move between threads. The buffer is returned to its allocator exactly
//! when the last clone is dropped.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::buffer::AlignedBuf;

/// Reference-counted owner of one [`AlignedBuf`].
#[derive(Clone)]
pub struct Proxy {
    inner: Arc<AlignedBuf>,
}

impl Proxy {
    /// Take ownership of `buf` with a reference count of one.
    pub fn new(buf: AlignedBuf) -> Self {
        Self::from_arc(Arc::new(buf))
    }

    /// Start sharing a buffer that its sole owner already keeps behind an
    /// `Arc`. The owner's handle counts as one holder.
    pub fn from_arc(inner: Arc<AlignedBuf>) -> Self {
        debug!(len = inner.len(), "buffer promoted to shared proxy");
        Self { inner }
    }

    /// Give up proxy semantics and return the underlying handle.
    pub fn into_arc(self) -> Arc<AlignedBuf> {
        self.inner
    }

    /// Number of live holders of this proxy (always ≥ 1).
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Size tag of the shared buffer in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the shared buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The shared buffer.
    pub fn buffer(&self) -> &AlignedBuf {
        &self.inner
    }

    /// Mutable access to the buffer, only while this is the sole holder.
    pub fn get_mut(&mut self) -> Option<&mut AlignedBuf> {
        Arc::get_mut(&mut self.inner)
    }

    /// Recover the buffer if this is the sole holder.
    pub fn try_unwrap(self) -> Result<AlignedBuf, Self> {
        Arc::try_unwrap(self.inner).map_err(|inner| Self { inner })
    }

    /// Whether two proxies share the same buffer.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("len", &self.len())
            .field("refcount", &self.refcount())
            .finish()
    }
}
