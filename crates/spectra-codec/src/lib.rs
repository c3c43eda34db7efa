//! Portable binary encoding for spectra arrays.
//!
//! The format is bit-compatible with the bigarray custom block layout:
//! big-endian header words, then the payload grouped by element width.
//! Decoded arrays always own freshly allocated, aligned storage; sharing
//! between views is never reconstructed.
//!
//! # Architecture
//!
//! - [`encode_array`] / [`decode_array`] handle a single array
//! - [`ArrayWriter`] / [`ArrayReader`] handle identifier-framed streams
//! - All I/O goes through `&mut dyn Write` / `&mut dyn Read`
//!
//! # Format
//!
//! ```text
//! [identifier "fftw3_bigarray\0"]          (framed streams only)
//! [numDims u32] [flags u32] [dim u32]*numDims [payload]
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{decode_array, decode_array_in, decode_header, encode_array, ArrayHeader};
pub use error::CodecError;
pub use reader::{ArrayIter, ArrayReader};
pub use writer::ArrayWriter;

/// Custom block identifier written before each framed array.
pub const IDENTIFIER: &str = "fftw3_bigarray";

/// Identifier of the generic bigarray block, also accepted on read.
pub const GENERIC_IDENTIFIER: &str = "_bigarray";

/// Longest identifier accepted on read, excluding the terminator.
pub const MAX_IDENTIFIER_LEN: usize = 64;
