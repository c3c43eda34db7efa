//! SIMD-aligned buffer allocation for Spectra arrays.
//!
//! Every byte of array storage flows through a [`BufferAllocator`]. The
//! default implementation, [`AlignedArena`], hands out zero-initialised
//! memory aligned to the widest vector register the downstream transform
//! code may use. This crate is one of two that may contain `unsafe` code
//! (along with `spectra-array`).
//!
//! # Architecture
//!
//! ```text
//! Arc<dyn BufferAllocator>  (AlignedArena by default)
//! ├── AlignedBuf   exclusive owner, frees on drop via its allocator
//! └── Proxy        Arc<AlignedBuf>: shared owner for array views,
//!                  the buffer is freed when the last view drops
//! ```
//!
//! Buffers remember the allocator that produced them, so memory is
//! always returned through the matching routine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod buffer;
pub mod config;
pub mod error;
pub mod proxy;
mod raw;

pub use alloc::{default_allocator, AlignedArena, ArenaStats, BufferAllocator, SharedAllocator};
pub use buffer::AlignedBuf;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use proxy::Proxy;
