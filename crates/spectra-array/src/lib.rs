//! Aligned, reference-counted multidimensional arrays.
//!
//! An [`NDArray`] couples a shape, an [`ElementKind`] and a [`Layout`]
//! with storage obtained from a
//! [`BufferAllocator`](spectra_arena::BufferAllocator). Storage is either
//! owned outright or shared with other views through a
//! [`Proxy`](spectra_arena::Proxy); either way it is freed exactly once.
//! This crate is one of two that may contain `unsafe` code (along with
//! `spectra-arena`), limited to reinterpreting aligned bytes as
//! [`Element`] slices.
//!
//! Transform planners never see an `NDArray` directly: they receive a
//! [`BufferDescriptor`] from [`NDArray::describe`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
pub mod descriptor;
pub mod element;

pub use array::NDArray;
pub use descriptor::{element_strides, linear_offset, BufferDescriptor};
pub use element::{Complex32, Complex64, Element};

pub use spectra_core::{ArrayError, ElementKind, Layout};
