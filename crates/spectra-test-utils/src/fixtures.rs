//! Reusable fixtures.
//!
//! - [`patterned_array`] — an array whose payload is a fixed byte pattern.
//! - [`counting_arena`] — a private arena for asserting on live buffers.
//! - [`TempPath`] — a unique path under the temp dir, removed on drop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use spectra_arena::{AlignedArena, ArenaConfig, SharedAllocator};
use spectra_array::NDArray;
use spectra_core::{checked_byte_size, ElementKind, Layout};

/// Three entries in the text wisdom format.
pub const SAMPLE_WISDOM: &str = "(spectra-wisdom-1
  (dft_r2hc_1 #x40 #x1a2b3c4d #x0 #xff #x10)
  (rdft_rank_geq2 #x0 #x00c0ffee #x1 #x2 #x3)
  (dft_buffered #x41 #xdeadbeef #x7 #x7 #x7)
)
";

/// Conflicts with the second entry of [`SAMPLE_WISDOM`] and adds one more.
pub const SAMPLE_WISDOM_CONFLICT: &str = "(spectra-wisdom-1
  (rdft_vrank3_transpose #x0 #x00c0ffee #x1 #x2 #x3)
  (dft_nop #x2 #x1 #x1 #x1 #x1)
)
";

/// Deterministic payload of `len` bytes.
pub fn patterned_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) + 7) as u8).collect()
}

/// An array from the default arena filled with [`patterned_bytes`].
pub fn patterned_array(kind: ElementKind, layout: Layout, dims: &[usize]) -> NDArray {
    let size = checked_byte_size(kind, dims).unwrap();
    NDArray::from_bytes(kind, layout, dims, &patterned_bytes(size)).unwrap()
}

/// One patterned array per element kind, all with the same shape.
pub fn every_kind(layout: Layout, dims: &[usize]) -> Vec<NDArray> {
    ElementKind::ALL
        .iter()
        .map(|&kind| patterned_array(kind, layout, dims))
        .collect()
}

/// A fresh default-config arena and the same arena as a [`SharedAllocator`].
pub fn counting_arena() -> (Arc<AlignedArena>, SharedAllocator) {
    let arena = AlignedArena::shared(ArenaConfig::default()).unwrap();
    let alloc: SharedAllocator = arena.clone();
    (arena, alloc)
}

/// A unique path in the temp directory; the file (if any) is removed on drop.
pub struct TempPath {
    path: PathBuf,
}

impl TempPath {
    pub fn new(stem: &str) -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "spectra-{stem}-{}-{n}",
            std::process::id()
        ));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for TempPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
