//! Test fixtures shared across the spectra crates.
//!
//! Deterministic arrays of every element kind, an arena whose counters
//! can be asserted on, sample wisdom documents, and self-deleting
//! temporary paths.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    counting_arena, every_kind, patterned_array, patterned_bytes, TempPath, SAMPLE_WISDOM,
    SAMPLE_WISDOM_CONFLICT,
};
