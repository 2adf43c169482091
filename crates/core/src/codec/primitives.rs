//! Scalar codecs: booleans, integers, floats and strings

use super::{string_size_hint, write_string, JsonCodec};
use crate::decode::{DecodeContext, DecodeResult};
use crate::encode::EncodeContext;
use crate::format::{self, F32_SIZE_HINT, F64_SIZE_HINT, INT32_SIZE_HINT, INT64_SIZE_HINT};
use std::any::type_name;
use std::ops::Deref;

/// Sequence hooks for element types that may be stored as blob arrays.
macro_rules! blob_seq_methods {
    () => {
        fn seq_size_hint(items: &[Self], ctx: &$crate::encode::EncodeContext) -> usize {
            if ctx.use_blobs_for(items.len()) {
                $crate::descriptor::descriptor_size_hint(1)
            } else {
                $crate::codec::inline_seq_size_hint(items, ctx)
            }
        }

        fn write_seq(items: &[Self], ctx: &mut $crate::encode::EncodeContext) {
            if ctx.use_blobs_for(items.len()) {
                $crate::descriptor::write_blob_array(ctx, &[items.len()], items);
            } else {
                $crate::codec::write_inline_seq(items, ctx);
            }
        }

        fn read_seq(
            ctx: &mut $crate::decode::DecodeContext<'_>,
        ) -> $crate::decode::DecodeResult<Vec<Self>> {
            $crate::descriptor::read_seq_or_blob(ctx)
        }
    };
}
pub(crate) use blob_seq_methods;

impl JsonCodec for bool {
    #[inline]
    fn size_hint(&self, _ctx: &EncodeContext) -> usize {
        5
    }

    #[inline]
    fn write_json(&self, ctx: &mut EncodeContext) {
        ctx.push_str(if *self { "true" } else { "false" });
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        if ctx.match_literal("true") {
            Ok(true)
        } else if ctx.match_literal("false") {
            Ok(false)
        } else {
            ctx.skip_space();
            ctx.fail(type_name::<bool>(), "expected true or false")
        }
    }

    blob_seq_methods!();
}

fn read_integer<T: std::str::FromStr>(ctx: &mut DecodeContext<'_>) -> DecodeResult<T> {
    let expected = type_name::<T>();
    ctx.skip_space();
    let start = ctx.position();
    let token = ctx.number_token(expected)?;
    match token.parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => ctx.fail_at(expected, format!("{} is not a valid {}", token, expected), start),
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $hint:expr, $write:ident as $wide:ty, $($blob:ident)?);* $(;)?) => {$(
        impl JsonCodec for $ty {
            #[inline]
            fn size_hint(&self, _ctx: &EncodeContext) -> usize {
                $hint
            }

            #[inline]
            fn write_json(&self, ctx: &mut EncodeContext) {
                format::$write(ctx.buffer_mut(), *self as $wide);
            }

            fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
                read_integer(ctx)
            }

            $($blob!();)?
        }
    )*};
}

impl_integer! {
    u8 => INT32_SIZE_HINT, write_u64 as u64, blob_seq_methods;
    u16 => INT32_SIZE_HINT, write_u64 as u64, blob_seq_methods;
    u32 => INT32_SIZE_HINT, write_u64 as u64, blob_seq_methods;
    u64 => INT64_SIZE_HINT, write_u64 as u64, blob_seq_methods;
    i8 => INT32_SIZE_HINT, write_i64 as i64, blob_seq_methods;
    i16 => INT32_SIZE_HINT, write_i64 as i64, blob_seq_methods;
    i32 => INT32_SIZE_HINT, write_i64 as i64, blob_seq_methods;
    i64 => INT64_SIZE_HINT, write_i64 as i64, blob_seq_methods;
    usize => INT64_SIZE_HINT, write_u64 as u64, ;
    isize => INT64_SIZE_HINT, write_i64 as i64, ;
}

macro_rules! impl_float {
    ($($ty:ty => $hint:expr, $write:ident);* $(;)?) => {$(
        impl JsonCodec for $ty {
            #[inline]
            fn size_hint(&self, _ctx: &EncodeContext) -> usize {
                $hint
            }

            #[inline]
            fn write_json(&self, ctx: &mut EncodeContext) {
                format::$write(ctx.buffer_mut(), *self);
            }

            /// `null` reads as NaN.
            fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
                let expected = type_name::<$ty>();
                if ctx.match_literal("null") {
                    return Ok(<$ty>::NAN);
                }
                ctx.skip_space();
                let start = ctx.position();
                let token = ctx.number_token(expected)?;
                match token.parse::<$ty>() {
                    Ok(v) => Ok(v),
                    Err(_) => ctx.fail_at(expected, "expected number", start),
                }
            }

            blob_seq_methods!();
        }
    )*};
}

impl_float! {
    f64 => F64_SIZE_HINT, write_f64;
    f32 => F32_SIZE_HINT, write_f32;
}

impl JsonCodec for String {
    fn size_hint(&self, _ctx: &EncodeContext) -> usize {
        string_size_hint(self.as_bytes())
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        write_string(ctx, self.as_bytes());
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        let expected = type_name::<String>();
        ctx.skip_space();
        let start = ctx.position();
        let mut bytes = Vec::new();
        ctx.string_bytes(expected, &mut bytes)?;
        match String::from_utf8(bytes) {
            Ok(s) => Ok(s),
            Err(_) => ctx.fail_at(expected, "invalid UTF-8 in string", start),
        }
    }
}

/// A string of arbitrary bytes.
///
/// Encodes like `String` but reads back without UTF-8 validation, so any byte
/// sequence (embedded NUL, control bytes, invalid UTF-8) round-trips.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByteString(pub Vec<u8>);

impl ByteString {
    /// Wrap a byte vector.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        ByteString(bytes.into())
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap into the byte vector.
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        ByteString(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        ByteString(bytes.to_vec())
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        ByteString(s.as_bytes().to_vec())
    }
}

impl JsonCodec for ByteString {
    fn size_hint(&self, _ctx: &EncodeContext) -> usize {
        string_size_hint(&self.0)
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        write_string(ctx, &self.0);
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        let mut bytes = Vec::new();
        ctx.string_bytes(type_name::<ByteString>(), &mut bytes)?;
        Ok(ByteString(bytes))
    }
}
