//! Element kinds, memory layouts, and the packed [`ArrayFlags`] word.
//!
//! The numeric codes here are part of the binary array format and must
//! not change: readers written against the external format decode the
//! low byte of the flags word as the kind and bit 8 as the layout.

use std::fmt;

/// Mask selecting the element-kind bits of an [`ArrayFlags`] word.
pub const KIND_MASK: u32 = 0xFF;
/// Mask selecting the layout bit of an [`ArrayFlags`] word.
pub const LAYOUT_MASK: u32 = 0x100;
/// Flag marking an array whose storage is owned (and freed) by the array.
pub const MANAGED: u32 = 0x200;
/// Mask covering every ownership-mode bit.
pub const MANAGED_MASK: u32 = 0x600;

/// Scalar type tag of an array. Determines the element byte width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum ElementKind {
    /// 32-bit IEEE float.
    Float32 = 0,
    /// 64-bit IEEE float.
    Float64 = 1,
    /// Signed 8-bit integer.
    Int8 = 2,
    /// Unsigned 8-bit integer.
    Uint8 = 3,
    /// Signed 16-bit integer.
    Int16 = 4,
    /// Unsigned 16-bit integer.
    Uint16 = 5,
    /// Signed 32-bit integer.
    Int32 = 6,
    /// Signed 64-bit integer.
    Int64 = 7,
    /// Generic platform integer with a 31-bit portable range.
    ///
    /// Stored at native pointer width; values outside `[-2^30, 2^30 - 1]`
    /// force the wide wire encoding.
    Int = 8,
    /// Native pointer-width signed integer.
    NativeInt = 9,
    /// Complex number with 32-bit float components.
    Complex32 = 10,
    /// Complex number with 64-bit float components.
    Complex64 = 11,
}

impl ElementKind {
    /// Every kind, in code order.
    pub const ALL: [ElementKind; 12] = [
        Self::Float32,
        Self::Float64,
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Int64,
        Self::Int,
        Self::NativeInt,
        Self::Complex32,
        Self::Complex64,
    ];

    /// Wire code of this kind (the low byte of the flags word).
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Decode a wire code. Returns `None` for codes past [`ElementKind::Complex64`].
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Size of one element in bytes. Complex kinds count both components.
    pub fn byte_width(self) -> usize {
        self.base_width() * self.components()
    }

    /// Size of one scalar component in bytes.
    ///
    /// This is also the grouping width used when the payload is
    /// byte-swapped on the wire.
    pub fn base_width(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Float32 | Self::Int32 | Self::Complex32 => 4,
            Self::Float64 | Self::Int64 | Self::Complex64 => 8,
            Self::Int | Self::NativeInt => std::mem::size_of::<isize>(),
        }
    }

    /// Number of scalar components per element: 2 for complex kinds, else 1.
    pub fn components(self) -> usize {
        if self.is_complex() {
            2
        } else {
            1
        }
    }

    /// Whether this kind is a complex number.
    pub fn is_complex(self) -> bool {
        matches!(self, Self::Complex32 | Self::Complex64)
    }

    /// Whether this kind is stored at native pointer width.
    pub fn is_platform_int(self) -> bool {
        matches!(self, Self::Int | Self::NativeInt)
    }

    /// Short lowercase name, used in log events and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Int => "int",
            Self::NativeInt => "nativeint",
            Self::Complex32 => "complex32",
            Self::Complex64 => "complex64",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index-to-offset convention of an array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Last index varies fastest (C order).
    #[default]
    RowMajor,
    /// First index varies fastest (Fortran order).
    ColumnMajor,
}

impl Layout {
    /// Bits this layout contributes to an [`ArrayFlags`] word.
    pub fn bits(self) -> u32 {
        match self {
            Self::RowMajor => 0,
            Self::ColumnMajor => LAYOUT_MASK,
        }
    }

    fn from_bits(bits: u32) -> Self {
        if bits & LAYOUT_MASK != 0 {
            Self::ColumnMajor
        } else {
            Self::RowMajor
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowMajor => f.write_str("row-major"),
            Self::ColumnMajor => f.write_str("column-major"),
        }
    }
}

/// Packed kind + layout + ownership word, as stored in the binary format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArrayFlags(pub u32);

impl ArrayFlags {
    /// Flags for a managed array of the given kind and layout.
    pub fn new(kind: ElementKind, layout: Layout) -> Self {
        Self(kind.code() | layout.bits() | MANAGED)
    }

    /// Raw kind code. May be out of range when decoded from untrusted input.
    pub fn kind_code(self) -> u32 {
        self.0 & KIND_MASK
    }

    /// Decoded element kind, or `None` if the kind code is unknown.
    pub fn kind(self) -> Option<ElementKind> {
        ElementKind::from_code(self.kind_code())
    }

    /// Decoded layout.
    pub fn layout(self) -> Layout {
        Layout::from_bits(self.0)
    }

    /// Whether the managed bit is set.
    pub fn is_managed(self) -> bool {
        self.0 & MANAGED_MASK == MANAGED
    }

    /// Copy of these flags with the ownership bits forced to managed.
    pub fn managed(self) -> Self {
        Self((self.0 & !MANAGED_MASK) | MANAGED)
    }

    /// The word as serialised: kind and layout bits only. Ownership is a
    /// property of the live process and never goes on the wire.
    pub fn wire_bits(self) -> u32 {
        self.0 & (KIND_MASK | LAYOUT_MASK)
    }
}

impl fmt::Display for ArrayFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
