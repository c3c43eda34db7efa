//! Error type for array construction and access.

use std::error::Error;
use std::fmt;

/// Errors from creating, viewing, or accessing an array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// Bad shape, index, or element type supplied by the caller.
    InvalidArgument {
        /// Human-readable description of the offending argument.
        reason: String,
    },
    /// Storage could not be obtained.
    ///
    /// Raised both when the allocator fails and when the size computation
    /// itself overflows.
    OutOfMemory {
        /// Requested size in bytes, or `None` if the size overflowed.
        requested: Option<usize>,
    },
    /// Mutable access was requested while another live view shares the
    /// same storage.
    Aliased {
        /// Number of views currently sharing the storage.
        views: usize,
    },
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::OutOfMemory {
                requested: Some(bytes),
            } => write!(f, "out of memory: cannot allocate {bytes} bytes"),
            Self::OutOfMemory { requested: None } => {
                write!(f, "out of memory: array size overflows the address space")
            }
            Self::Aliased { views } => {
                write!(f, "storage is shared by {views} live views")
            }
        }
    }
}

impl Error for ArrayError {}
