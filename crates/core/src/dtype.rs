//! Element types for blob-backed arrays

use crate::codec::JsonCodec;
use std::fmt;

/// Element type tag written into an ndarray descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// IEEE-754 binary64
    Float64,
    /// IEEE-754 binary32
    Float32,
    /// Unsigned 8-bit integer
    Uint8,
    /// Unsigned 16-bit integer
    Uint16,
    /// Unsigned 32-bit integer
    Uint32,
    /// Unsigned 64-bit integer
    Uint64,
    /// Signed 8-bit integer
    Int8,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Boolean stored as one byte (0 or 1)
    Bool,
    /// Pair of binary64 values, real part first
    Complex64,
}

impl DType {
    /// All tags, in descriptor order.
    pub const ALL: [DType; 12] = [
        DType::Float64,
        DType::Float32,
        DType::Uint8,
        DType::Uint16,
        DType::Uint32,
        DType::Uint64,
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Bool,
        DType::Complex64,
    ];

    /// Wire tag (`"float64"`, `"int32"`, ...).
    pub fn tag(self) -> &'static str {
        match self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Uint8 => "uint8",
            DType::Uint16 => "uint16",
            DType::Uint32 => "uint32",
            DType::Uint64 => "uint64",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Bool => "bool",
            DType::Complex64 => "complex64",
        }
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.tag() == tag)
    }

    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            DType::Uint8 | DType::Int8 | DType::Bool => 1,
            DType::Uint16 | DType::Int16 => 2,
            DType::Float32 | DType::Uint32 | DType::Int32 => 4,
            DType::Float64 | DType::Uint64 | DType::Int64 => 8,
            DType::Complex64 => 16,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A fixed-width element that can live in a blob chunk.
pub trait Element: JsonCodec + Copy {
    /// Descriptor tag for this element type
    const DTYPE: DType;

    /// Append the little-endian bytes of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Read one element from exactly `DTYPE.element_size()` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Value used for range tracking; `None` for non-finite values and for
    /// types without an ordering.
    fn range_value(self) -> Option<f64>;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {$(
        impl Element for $ty {
            const DTYPE: DType = DType::$dtype;

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                buf.copy_from_slice(bytes);
                <$ty>::from_le_bytes(buf)
            }

            #[inline]
            fn range_value(self) -> Option<f64> {
                let v = self as f64;
                v.is_finite().then_some(v)
            }
        }
    )*};
}

impl_element! {
    f64 => Float64,
    f32 => Float32,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn range_value(self) -> Option<f64> {
        Some(if self { 1.0 } else { 0.0 })
    }
}
