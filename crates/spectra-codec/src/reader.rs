//! Framed array stream reader.
//!
//! [`ArrayReader`] reads arrays written by
//! [`ArrayWriter`](crate::ArrayWriter), or by any other producer of the
//! bigarray custom block format.

use std::io::Read;

use spectra_arena::{default_allocator, SharedAllocator};
use spectra_array::NDArray;

use crate::codec::{decode_array_in, read_identifier};
use crate::error::CodecError;
use crate::{GENERIC_IDENTIFIER, IDENTIFIER};

/// Decode the next framed array, or `None` on clean EOF.
fn decode_framed(
    r: &mut dyn Read,
    allocator: &SharedAllocator,
) -> Result<Option<NDArray>, CodecError> {
    let Some(id) = read_identifier(r)? else {
        return Ok(None);
    };
    if id != IDENTIFIER && id != GENERIC_IDENTIFIER {
        return Err(CodecError::UnknownIdentifier { found: id });
    }
    decode_array_in(r, allocator).map(Some)
}

/// Reads a sequence of arrays from a byte stream.
///
/// Decoded arrays draw their storage from the reader's allocator.
pub struct ArrayReader<R: Read> {
    reader: R,
    allocator: SharedAllocator,
    arrays_read: u64,
}

impl<R: Read> ArrayReader<R> {
    /// Read from `reader`, allocating from the default arena.
    pub fn new(reader: R) -> Self {
        Self::with_allocator(reader, default_allocator())
    }

    /// Read from `reader`, allocating from `allocator`.
    pub fn with_allocator(reader: R, allocator: SharedAllocator) -> Self {
        Self {
            reader,
            allocator,
            arrays_read: 0,
        }
    }

    /// Read the next array, or `None` if the stream is exhausted.
    pub fn next_array(&mut self) -> Result<Option<NDArray>, CodecError> {
        let array = decode_framed(&mut self.reader, &self.allocator)?;
        if array.is_some() {
            self.arrays_read += 1;
        }
        Ok(array)
    }

    /// Number of arrays read so far.
    pub fn arrays_read(&self) -> u64 {
        self.arrays_read
    }

    /// Convert into an array iterator.
    pub fn arrays(self) -> ArrayIter<R> {
        ArrayIter {
            reader: self.reader,
            allocator: self.allocator,
            done: false,
        }
    }
}

/// Iterator adapter over framed arrays. Stops after the first error.
pub struct ArrayIter<R: Read> {
    reader: R,
    allocator: SharedAllocator,
    done: bool,
}

impl<R: Read> Iterator for ArrayIter<R> {
    type Item = Result<NDArray, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match decode_framed(&mut self.reader, &self.allocator) {
            Ok(Some(array)) => Some(Ok(array)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
