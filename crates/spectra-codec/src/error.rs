//! Error types for array encoding and decoding.

use std::fmt;
use std::io;

/// Errors that can occur while encoding or decoding arrays.
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The input is not a well-formed encoded array (truncated, bad kind,
    /// bad rank, bad marker). No array is produced.
    CorruptData {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// Storage for the decoded payload could not be allocated.
    OutOfMemory {
        /// Payload size in bytes, or `None` if computing it overflowed.
        requested: Option<usize>,
    },
    /// A framed stream carried an identifier this codec does not read.
    UnknownIdentifier {
        /// The identifier found in the stream.
        found: String,
    },
}

impl CodecError {
    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptData {
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::CorruptData { detail } => write!(f, "corrupt array data: {detail}"),
            Self::OutOfMemory {
                requested: Some(size),
            } => write!(f, "out of memory for array payload of {size} bytes"),
            Self::OutOfMemory { requested: None } => {
                write!(f, "out of memory: array payload size overflows")
            }
            Self::UnknownIdentifier { found } => {
                write!(f, "unknown custom block identifier {found:?}")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::corrupt("truncated input")
        } else {
            Self::Io(e)
        }
    }
}
