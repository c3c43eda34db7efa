//! Benchmark profiles for the spectra crates.
//!
//! - [`signal_profile`]: 1024x1024 complex128 array, the size of a typical 2-D transform input
//! - [`volume_profile`]: 64^3 float32 array in column-major order
//! - [`wisdom_profile`]: a store of `n` distinct entries

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use spectra_array::{Complex64, NDArray};
use spectra_core::{ElementKind, Layout};
use spectra_wisdom::{WisdomEntry, WisdomStore};

/// A 1024x1024 complex128 row-major array holding a deterministic ramp.
pub fn signal_profile() -> NDArray {
    let mut a = NDArray::create(ElementKind::Complex64, Layout::RowMajor, &[1024, 1024])
        .expect("1024x1024 complex array");
    for (i, v) in a
        .as_slice_mut::<Complex64>()
        .expect("fresh array is exclusive")
        .iter_mut()
        .enumerate()
    {
        *v = Complex64::new(i as f64, -(i as f64));
    }
    a
}

/// A 64x64x64 float32 column-major array holding a deterministic ramp.
pub fn volume_profile() -> NDArray {
    let mut a = NDArray::create(ElementKind::Float32, Layout::ColumnMajor, &[64, 64, 64])
        .expect("64^3 float array");
    for (i, v) in a
        .as_slice_mut::<f32>()
        .expect("fresh array is exclusive")
        .iter_mut()
        .enumerate()
    {
        *v = i as f32 * 0.25;
    }
    a
}

/// A store of `n` entries with distinct problem hashes.
pub fn wisdom_profile(n: u32) -> WisdomStore {
    let mut store = WisdomStore::new();
    for i in 0..n {
        let entry = WisdomEntry::new(format!("solver_{}", i % 7), i % 3, [i, i ^ 0x5a5a, !i, 42])
            .expect("generated solver names are valid");
        store.insert(entry);
    }
    store
}
