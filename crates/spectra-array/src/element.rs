//! Rust scalar types that can view array storage.

use spectra_core::ElementKind;

/// Complex number with `f32` components, laid out as `[re, im]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex32 {
    /// Real part.
    pub re: f32,
    /// Imaginary part.
    pub im: f32,
}

impl Complex32 {
    /// Build a complex number from its parts.
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

/// Complex number with `f64` components, laid out as `[re, im]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex64 {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex64 {
    /// Build a complex number from its parts.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A scalar type whose slices may alias array storage.
///
/// Sealed: implemented only for the primitive types below and the
/// `#[repr(C)]` complex pairs, all of which have no padding, accept every
/// bit pattern, and have an alignment no larger than their size.
///
/// # Safety
///
/// `size_of::<Self>()` must equal `KIND.byte_width()` and every bit
/// pattern of that size must be a valid `Self`.
#[allow(unsafe_code)]
pub unsafe trait Element: sealed::Sealed + Copy + 'static {
    /// The kind this type is the natural view of.
    const KIND: ElementKind;

    /// Whether storage of `kind` may be viewed as `Self`.
    fn accepts(kind: ElementKind) -> bool {
        kind == Self::KIND
    }
}

macro_rules! impl_element {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            // SAFETY: primitive / repr(C) POD type of exactly
            // `ElementKind::$kind.byte_width()` bytes.
            #[allow(unsafe_code)]
            unsafe impl Element for $ty {
                const KIND: ElementKind = ElementKind::$kind;
            }
        )*
    };
}

impl_element! {
    f32 => Float32,
    f64 => Float64,
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    i64 => Int64,
    Complex32 => Complex32,
    Complex64 => Complex64,
}

impl sealed::Sealed for isize {}

// SAFETY: both platform-int kinds are stored at pointer width, which is
// `size_of::<isize>()`.
#[allow(unsafe_code)]
unsafe impl Element for isize {
    const KIND: ElementKind = ElementKind::NativeInt;

    fn accepts(kind: ElementKind) -> bool {
        kind.is_platform_int()
    }
}
