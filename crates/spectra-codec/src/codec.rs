//! Binary encode/decode of arrays.
//!
//! Every header word is a big-endian `u32`:
//!
//! ```text
//! [numDims] [flags] [dim 0] ... [dim numDims-1] [payload]
//! ```
//!
//! `flags` carries the kind code and layout bit only; the managed bit is
//! never written and is forced on when reading.
//!
//! The payload is the array's storage in layout order, with each scalar
//! component written big-endian (complex values as two components).
//! Platform integers use a compact form: a marker byte `0` followed by
//! 32-bit words when every value fits, otherwise `1` followed by 64-bit
//! words.

use std::io::{self, Read, Write};

use spectra_arena::{default_allocator, AlignedBuf, SharedAllocator};
use spectra_array::NDArray;
use spectra_core::{
    checked_byte_size, ArrayError, ArrayFlags, Dims, ElementKind, Layout, MAX_DIM, MAX_DIMS,
};
use tracing::trace;

use crate::error::CodecError;
use crate::MAX_IDENTIFIER_LEN;

const SCRATCH_LEN: usize = 4096;

/// Range of [`ElementKind::Int`] values that fit the narrow encoding.
const INT_NARROW: (i64, i64) = (-(1 << 30), (1 << 30) - 1);
/// Range of [`ElementKind::NativeInt`] values that fit the narrow encoding.
const NATIVE_INT_NARROW: (i64, i64) = (i32::MIN as i64, i32::MAX as i64);

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CodecError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a big-endian u32.
pub fn write_u32_be(w: &mut dyn Write, v: u32) -> Result<(), CodecError> {
    w.write_all(&v.to_be_bytes())?;
    Ok(())
}

/// Write a big-endian i32.
pub fn write_i32_be(w: &mut dyn Write, v: i32) -> Result<(), CodecError> {
    w.write_all(&v.to_be_bytes())?;
    Ok(())
}

/// Write a big-endian i64.
pub fn write_i64_be(w: &mut dyn Write, v: i64) -> Result<(), CodecError> {
    w.write_all(&v.to_be_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a big-endian u32.
pub fn read_u32_be(r: &mut dyn Read) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Read a big-endian i32.
pub fn read_i32_be(r: &mut dyn Read) -> Result<i32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

/// Read a big-endian i64.
pub fn read_i64_be(r: &mut dyn Read) -> Result<i64, CodecError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

// ── Header ──────────────────────────────────────────────────────

/// Decoded array header: everything but the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayHeader {
    /// Flags word as read, with the managed bit forced on.
    pub flags: ArrayFlags,
    /// Validated element kind.
    pub kind: ElementKind,
    /// Extent of each axis.
    pub dims: Dims,
}

impl ArrayHeader {
    /// Header describing a live array.
    pub fn of(array: &NDArray) -> Self {
        Self {
            flags: array.flags(),
            kind: array.kind(),
            dims: Dims::from_slice(array.dims()),
        }
    }

    /// Memory layout.
    pub fn layout(&self) -> Layout {
        self.flags.layout()
    }
}

/// Encode an array header.
pub fn encode_header(w: &mut dyn Write, header: &ArrayHeader) -> Result<(), CodecError> {
    write_u32_be(w, header.dims.len() as u32)?;
    write_u32_be(w, header.flags.wire_bits())?;
    for &d in &header.dims {
        let d = u32::try_from(d)
            .map_err(|_| CodecError::corrupt(format!("dimension {d} does not fit 32 bits")))?;
        write_u32_be(w, d)?;
    }
    Ok(())
}

/// Decode and validate an array header.
///
/// The managed bit is forced on: decoded arrays always own fresh storage.
/// Rank, extents and kind are checked here, before anything is allocated.
pub fn decode_header(r: &mut dyn Read) -> Result<ArrayHeader, CodecError> {
    let num_dims = read_u32_be(r)? as usize;
    if !(1..=MAX_DIMS).contains(&num_dims) {
        return Err(CodecError::corrupt(format!(
            "bad number of dimensions: {num_dims}"
        )));
    }
    let flags = ArrayFlags(read_u32_be(r)?).managed();

    let mut dims = Dims::with_capacity(num_dims);
    for axis in 0..num_dims {
        let d = read_u32_be(r)? as usize;
        if d > MAX_DIM {
            return Err(CodecError::corrupt(format!(
                "dimension {axis} out of range: {d}"
            )));
        }
        dims.push(d);
    }

    let Some(kind) = flags.kind() else {
        return Err(CodecError::corrupt(format!(
            "bad array kind {}",
            flags.kind_code()
        )));
    };
    trace!(%kind, layout = %flags.layout(), dims = ?dims.as_slice(), "decoded array header");
    Ok(ArrayHeader { flags, kind, dims })
}

// ── Payload ─────────────────────────────────────────────────────

/// Convert each `width`-byte group between host and big-endian order.
fn swap_groups(bytes: &mut [u8], width: usize) {
    if cfg!(target_endian = "little") && width > 1 {
        for group in bytes.chunks_exact_mut(width) {
            group.reverse();
        }
    }
}

fn write_groups(w: &mut dyn Write, bytes: &[u8], width: usize) -> Result<(), CodecError> {
    if width == 1 || cfg!(target_endian = "big") {
        w.write_all(bytes)?;
        return Ok(());
    }
    let mut scratch = [0u8; SCRATCH_LEN];
    for chunk in bytes.chunks(SCRATCH_LEN) {
        let out = &mut scratch[..chunk.len()];
        out.copy_from_slice(chunk);
        swap_groups(out, width);
        w.write_all(out)?;
    }
    Ok(())
}

fn write_platform_ints(
    w: &mut dyn Write,
    kind: ElementKind,
    values: &[isize],
) -> Result<(), CodecError> {
    let (min, max) = match kind {
        ElementKind::Int => INT_NARROW,
        _ => NATIVE_INT_NARROW,
    };
    let narrow = size_of::<isize>() == 4
        || values.iter().all(|&v| (min..=max).contains(&(v as i64)));

    write_u8(w, if narrow { 0 } else { 1 })?;
    let width = if narrow { 4 } else { 8 };
    let mut scratch = [0u8; SCRATCH_LEN];
    for chunk in values.chunks(SCRATCH_LEN / width) {
        let out = &mut scratch[..chunk.len() * width];
        for (slot, &v) in out.chunks_exact_mut(width).zip(chunk) {
            if narrow {
                slot.copy_from_slice(&(v as i32).to_be_bytes());
            } else {
                slot.copy_from_slice(&(v as i64).to_be_bytes());
            }
        }
        w.write_all(out)?;
    }
    Ok(())
}

fn read_platform_ints(r: &mut dyn Read, out: &mut [u8]) -> Result<(), CodecError> {
    let width = size_of::<isize>();
    match read_u8(r)? {
        0 => {
            for slot in out.chunks_exact_mut(width) {
                let v = read_i32_be(r)? as isize;
                slot.copy_from_slice(&v.to_ne_bytes());
            }
        }
        1 if width == 8 => {
            for slot in out.chunks_exact_mut(width) {
                let v = read_i64_be(r)? as isize;
                slot.copy_from_slice(&v.to_ne_bytes());
            }
        }
        1 => {
            return Err(CodecError::corrupt(
                "cannot read 64-bit integer array on a 32-bit host",
            ))
        }
        marker => {
            return Err(CodecError::corrupt(format!(
                "bad integer array marker {marker}"
            )))
        }
    }
    Ok(())
}

// ── Arrays ──────────────────────────────────────────────────────

/// Encode one array: header followed by payload.
pub fn encode_array(w: &mut dyn Write, array: &NDArray) -> Result<(), CodecError> {
    encode_header(w, &ArrayHeader::of(array))?;
    let kind = array.kind();
    if kind.is_platform_int() {
        let values = array
            .as_slice::<isize>()
            .map_err(|e| CodecError::corrupt(e.to_string()))?;
        write_platform_ints(w, kind, values)
    } else {
        write_groups(w, array.as_bytes(), kind.base_width())
    }
}

/// Decode one array into storage from the default arena.
pub fn decode_array(r: &mut dyn Read) -> Result<NDArray, CodecError> {
    decode_array_in(r, &default_allocator())
}

/// Decode one array into storage from `allocator`.
///
/// Either a complete, independently owned array is returned or nothing
/// is; a failed decode never leaves storage allocated.
pub fn decode_array_in(
    r: &mut dyn Read,
    allocator: &SharedAllocator,
) -> Result<NDArray, CodecError> {
    let header = decode_header(r)?;
    let kind = header.kind;
    let size = checked_byte_size(kind, &header.dims)
        .map_err(|_| CodecError::OutOfMemory { requested: None })?;
    let mut buf = AlignedBuf::zeroed_in(allocator, size).map_err(|_| CodecError::OutOfMemory {
        requested: Some(size),
    })?;

    let bytes = buf.as_bytes_mut();
    if kind.is_platform_int() {
        read_platform_ints(r, bytes)?;
    } else {
        r.read_exact(bytes)?;
        swap_groups(bytes, kind.base_width());
    }

    NDArray::from_buf(kind, header.layout(), &header.dims, buf).map_err(|e| match e {
        ArrayError::OutOfMemory { requested } => CodecError::OutOfMemory { requested },
        other => CodecError::corrupt(other.to_string()),
    })
}

// ── Custom block identifiers ────────────────────────────────────

/// Write a NUL-terminated identifier.
pub fn write_identifier(w: &mut dyn Write, id: &str) -> Result<(), CodecError> {
    w.write_all(id.as_bytes())?;
    write_u8(w, 0)
}

/// Read a NUL-terminated identifier.
///
/// Returns `Ok(None)` on clean EOF (no bytes available), `Ok(Some(id))`
/// on success, or an error on truncated or oversized input.
pub fn read_identifier(r: &mut dyn Read) -> Result<Option<String>, CodecError> {
    let mut first = [0u8; 1];
    loop {
        match r.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CodecError::Io(e)),
        }
    }

    let mut id = Vec::new();
    let mut byte = first[0];
    while byte != 0 {
        if id.len() == MAX_IDENTIFIER_LEN {
            return Err(CodecError::corrupt(format!(
                "identifier longer than {MAX_IDENTIFIER_LEN} bytes"
            )));
        }
        id.push(byte);
        byte = read_u8(r)?;
    }
    String::from_utf8(id)
        .map(Some)
        .map_err(|e| CodecError::corrupt(format!("invalid UTF-8 identifier: {e}")))
}
