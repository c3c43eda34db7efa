//! Core types for the Spectra aligned-array workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the arena, array, codec and wisdom crates:
//! element kinds and their byte widths, memory layouts, the packed
//! flags word used on the wire, shape validation and the array error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod kind;
pub mod shape;

pub use error::ArrayError;
pub use kind::{ArrayFlags, ElementKind, Layout};
pub use shape::{checked_byte_size, checked_element_count, validate_dims, Dims, MAX_DIM, MAX_DIMS};
