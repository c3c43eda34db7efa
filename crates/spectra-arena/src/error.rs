//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The system allocator refused the request, or the request cannot be
    /// described as a valid layout at the arena's alignment.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment the request was made at.
        alignment: usize,
    },
    /// An alignment that is not a power of two or lies outside
    /// [`ArenaConfig::MIN_ALIGNMENT`](crate::ArenaConfig::MIN_ALIGNMENT)..=
    /// [`ArenaConfig::MAX_ALIGNMENT`](crate::ArenaConfig::MAX_ALIGNMENT).
    InvalidAlignment {
        /// The rejected alignment.
        alignment: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                alignment,
            } => {
                write!(
                    f,
                    "out of memory: requested {requested} bytes at {alignment}-byte alignment"
                )
            }
            Self::InvalidAlignment { alignment } => {
                write!(f, "invalid arena alignment: {alignment}")
            }
        }
    }
}

impl Error for ArenaError {}
