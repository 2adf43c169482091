//! Typed codec
//!
//! Every encodable type implements [`JsonCodec`]: a size hint, a writer and a
//! reader. Containers compose their element codecs recursively.
//!
//! ## Sequences
//!
//! `Vec<T>` does not encode itself element by element directly. It defers to
//! the hidden `seq_*` hooks on `T`, which default to an inline JSON array.
//! Numeric, boolean and complex element types override the hooks so that,
//! when a blob store is attached, the whole sequence becomes one blob chunk
//! plus an ndarray descriptor.
//!
//! ## Modules
//!
//! - `primitives`: booleans, integers, floats, strings
//! - `containers`: `Vec`, `Option`, `Box`, `Arc`, maps, pairs
//! - `structs`: the [`json_struct!`](crate::json_struct) macro

mod containers;
mod primitives;
mod structs;

pub use primitives::ByteString;
pub(crate) use primitives::blob_seq_methods;

use crate::decode::{DecodeContext, DecodeResult};
use crate::encode::EncodeContext;
use std::any::type_name;

/// A type that can be written to and read from the encoded text.
pub trait JsonCodec: Sized {
    /// Upper bound on the bytes [`write_json`](Self::write_json) appends.
    fn size_hint(&self, ctx: &EncodeContext) -> usize;

    /// Append the encoding of `self`.
    fn write_json(&self, ctx: &mut EncodeContext);

    /// Read one value at the cursor.
    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self>;

    #[doc(hidden)]
    fn seq_size_hint(items: &[Self], ctx: &EncodeContext) -> usize {
        inline_seq_size_hint(items, ctx)
    }

    #[doc(hidden)]
    fn write_seq(items: &[Self], ctx: &mut EncodeContext) {
        write_inline_seq(items, ctx);
    }

    #[doc(hidden)]
    fn read_seq(ctx: &mut DecodeContext<'_>) -> DecodeResult<Vec<Self>> {
        read_inline_seq(ctx)
    }
}

/// Encoded length of one byte inside a string literal.
#[inline]
fn escaped_len(c: u8) -> usize {
    match c {
        b'"' | b'\\' | b'\n' => 2,
        0x00..=0x1f => 6,
        _ => 1,
    }
}

/// Exact encoded length of a string literal, quotes included.
pub fn string_size_hint(bytes: &[u8]) -> usize {
    2 + bytes.iter().map(|&c| escaped_len(c)).sum::<usize>()
}

/// Append `bytes` as a string literal.
///
/// `"` and `\` are backslash-escaped, newline becomes `\n`, other control
/// bytes become `\u00XX`. Bytes `>= 0x80` pass through unchanged.
pub fn write_string(ctx: &mut EncodeContext, bytes: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let out = ctx.buffer_mut();
    out.push(b'"');
    let mut run = 0;
    for (i, &c) in bytes.iter().enumerate() {
        if escaped_len(c) == 1 {
            continue;
        }
        out.extend_from_slice(&bytes[run..i]);
        run = i + 1;
        match c {
            b'"' => out.extend_from_slice(b"\\\""),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.extend_from_slice(&[
                b'\\',
                b'u',
                b'0',
                b'0',
                HEX[(c >> 4) as usize],
                HEX[(c & 0xf) as usize],
            ]),
        }
    }
    out.extend_from_slice(&bytes[run..]);
    out.push(b'"');
}

/// Size hint for an inline array of `items`.
pub fn inline_seq_size_hint<T: JsonCodec>(items: &[T], ctx: &EncodeContext) -> usize {
    inline_iter_size_hint(items, ctx)
}

/// Size hint for an inline array over any iterator of elements.
pub fn inline_iter_size_hint<'i, T, I>(items: I, ctx: &EncodeContext) -> usize
where
    T: JsonCodec + 'i,
    I: IntoIterator<Item = &'i T>,
{
    2 + items
        .into_iter()
        .map(|item| item.size_hint(ctx) + 1)
        .sum::<usize>()
}

/// Write `items` as an inline JSON array.
pub fn write_inline_seq<T: JsonCodec>(items: &[T], ctx: &mut EncodeContext) {
    write_inline_iter(items, ctx);
}

/// Write any iterator of elements as an inline JSON array.
pub fn write_inline_iter<'i, T, I>(items: I, ctx: &mut EncodeContext)
where
    T: JsonCodec + 'i,
    I: IntoIterator<Item = &'i T>,
{
    ctx.push(b'[');
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            ctx.push(b',');
        }
        item.write_json(ctx);
    }
    ctx.push(b']');
}

/// Read an inline JSON array. A trailing comma before `]` is tolerated.
pub fn read_inline_seq<T: JsonCodec>(ctx: &mut DecodeContext<'_>) -> DecodeResult<Vec<T>> {
    let expected = type_name::<Vec<T>>();
    ctx.expect_byte(expected, b'[', "expected [")?;
    let mut items = Vec::new();
    loop {
        if ctx.eat(b']') {
            return Ok(items);
        }
        items.push(T::read_json(ctx)?);
        if ctx.eat(b',') {
            continue;
        }
        if ctx.eat(b']') {
            return Ok(items);
        }
        return ctx.fail(expected, "expected , or ]");
    }
}

/// Read an object, calling `member` for each key with the cursor on its
/// value. `member` must consume the value (or skip it with
/// [`DecodeContext::skip_value`]).
pub fn read_object<'a, F>(
    ctx: &mut DecodeContext<'a>,
    expected: &'static str,
    mut member: F,
) -> DecodeResult<()>
where
    F: FnMut(&mut DecodeContext<'a>, &[u8]) -> DecodeResult<()>,
{
    ctx.expect_byte(expected, b'{', "expected {")?;
    let mut key = Vec::new();
    loop {
        if ctx.eat(b'}') {
            return Ok(());
        }
        key.clear();
        ctx.string_bytes(expected, &mut key)?;
        ctx.expect_byte(expected, b':', "expected :")?;
        member(ctx, &key)?;
        if ctx.eat(b',') {
            continue;
        }
        if ctx.eat(b'}') {
            return Ok(());
        }
        return ctx.fail(expected, "expected , or }");
    }
}
