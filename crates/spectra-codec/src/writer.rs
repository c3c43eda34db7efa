//! Framed array stream writer.
//!
//! [`ArrayWriter`] streams arrays to any `Write` sink, each preceded by
//! its NUL-terminated custom block identifier.

use std::io::Write;

use spectra_array::NDArray;

use crate::codec::{encode_array, write_identifier};
use crate::error::CodecError;
use crate::IDENTIFIER;

/// Writes a sequence of arrays to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use spectra_array::{ElementKind, Layout, NDArray};
/// use spectra_codec::{ArrayReader, ArrayWriter};
///
/// let a = NDArray::create(ElementKind::Float64, Layout::RowMajor, &[4, 4]).unwrap();
/// let b = NDArray::create(ElementKind::Int8, Layout::ColumnMajor, &[3]).unwrap();
///
/// let mut buf = Vec::new();
/// let mut writer = ArrayWriter::new(&mut buf);
/// writer.write_array(&a).unwrap();
/// writer.write_array(&b).unwrap();
/// assert_eq!(writer.arrays_written(), 2);
/// drop(writer);
///
/// let mut reader = ArrayReader::new(buf.as_slice());
/// assert_eq!(reader.next_array().unwrap().unwrap(), a);
/// assert_eq!(reader.next_array().unwrap().unwrap(), b);
/// assert!(reader.next_array().unwrap().is_none());
/// ```
pub struct ArrayWriter<W: Write> {
    writer: W,
    arrays_written: u64,
}

impl<W: Write> ArrayWriter<W> {
    /// Wrap a sink. Nothing is written until the first array.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            arrays_written: 0,
        }
    }

    /// Append one array.
    pub fn write_array(&mut self, array: &NDArray) -> Result<(), CodecError> {
        write_identifier(&mut self.writer, IDENTIFIER)?;
        encode_array(&mut self.writer, array)?;
        self.arrays_written += 1;
        Ok(())
    }

    /// Number of arrays written so far.
    pub fn arrays_written(&self) -> u64 {
        self.arrays_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), CodecError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
