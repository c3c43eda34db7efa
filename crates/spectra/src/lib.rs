//! Spectra: aligned numeric arrays for FFT-style transform code.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! spectra sub-crates. For most users, adding `spectra` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use spectra::prelude::*;
//!
//! // A 4x4 float64 array from the default 64-byte-aligned arena.
//! let mut a = NDArray::create(ElementKind::Float64, Layout::RowMajor, &[4, 4]).unwrap();
//! a.set::<f64>(&[2, 3], 1.5).unwrap();
//! assert!(a.describe().is_aligned_to(64));
//!
//! // Serialize and read it back.
//! let mut buf = Vec::new();
//! encode_array(&mut buf, &a).unwrap();
//! let b = decode_array(&mut buf.as_slice()).unwrap();
//! assert_eq!(a, b);
//!
//! // Remember a planning decision and export it.
//! spectra::wisdom::global::record(WisdomEntry::new("dft_direct", 0, [1, 2, 3, 4]).unwrap());
//! assert!(spectra::wisdom::global::export_to_string().contains("dft_direct"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `spectra-core` | Element kinds, layouts, flags, shape checks |
//! | [`arena`] | `spectra-arena` | Aligned allocator, owned buffers, proxies |
//! | [`array`] | `spectra-array` | `NDArray`, element types, buffer descriptors |
//! | [`codec`] | `spectra-codec` | Binary array format and framed streams |
//! | [`wisdom`] | `spectra-wisdom` | Wisdom store, text format, process-wide hooks |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element kinds, layouts, flags and shape validation (`spectra-core`).
pub use spectra_core as types;

/// Aligned allocation (`spectra-arena`).
///
/// [`arena::AlignedArena`] is the default allocator; implement
/// [`arena::BufferAllocator`] to supply your own.
pub use spectra_arena as arena;

/// Multidimensional arrays (`spectra-array`).
pub use spectra_array as array;

/// Binary array encoding (`spectra-codec`).
///
/// Single arrays via [`codec::encode_array`] / [`codec::decode_array`],
/// streams via [`codec::ArrayWriter`] / [`codec::ArrayReader`].
pub use spectra_codec as codec;

/// Planner wisdom (`spectra-wisdom`).
///
/// The process-wide store lives in [`wisdom::global`].
pub use spectra_wisdom as wisdom;

/// Common imports for typical spectra usage.
///
/// ```rust
/// use spectra::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use spectra_core::{ArrayFlags, ElementKind, Layout, MAX_DIMS};

    // Allocation
    pub use spectra_arena::{AlignedArena, ArenaConfig, BufferAllocator, SharedAllocator};

    // Arrays
    pub use spectra_array::{BufferDescriptor, Complex32, Complex64, Element, NDArray};

    // Codec
    pub use spectra_codec::{decode_array, encode_array, ArrayReader, ArrayWriter};

    // Wisdom
    pub use spectra_wisdom::{WisdomConfig, WisdomEntry, WisdomStore};

    // Errors
    pub use spectra_arena::ArenaError;
    pub use spectra_codec::CodecError;
    pub use spectra_core::ArrayError;
    pub use spectra_wisdom::WisdomError;
}
