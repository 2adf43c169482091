//! ndarray descriptors
//!
//! When a blob store is attached, a numeric array is written as one blob
//! chunk and the text holds a small descriptor in its place:
//!
//! ```text
//! {"dtype":"float64","shape":[1000],"offset":8,"byteLength":8000,"range":{"min":0,"max":3.5}}
//! ```
//!
//! Reading validates the descriptor against the requested element type
//! before touching the blob store: the dtype tag, the shape rank, and
//! `product(shape) * element_size == byteLength` must all agree.

use crate::codec::{read_inline_seq, read_object, JsonCodec};
use crate::decode::{DecodeContext, DecodeResult};
use crate::dtype::{DType, Element};
use crate::encode::EncodeContext;
use crate::format::{F64_SIZE_HINT, INT64_SIZE_HINT};
use std::any::type_name;
use tracing::trace;

/// Min and max over the finite elements of an array
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumericRange {
    /// Smallest finite element (0 when there is none)
    pub min: f64,
    /// Largest finite element (0 when there is none)
    pub max: f64,
}

impl NumericRange {
    /// Range over the finite elements of `data`.
    pub fn of<E: Element>(data: &[E]) -> Self {
        let mut finite = data.iter().filter_map(|&v| v.range_value());
        match finite.next() {
            Some(first) => finite.fold(
                NumericRange {
                    min: first,
                    max: first,
                },
                |r, v| NumericRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            ),
            None => NumericRange::default(),
        }
    }
}

crate::json_struct!(NumericRange { min, max });

/// Descriptor of one blob-backed array
#[derive(Debug, Clone, PartialEq)]
pub struct NdArrayDescriptor {
    /// Element type
    pub dtype: DType,
    /// Dimensions, outermost first
    pub shape: Vec<usize>,
    /// Payload offset in the blob store
    pub offset: u64,
    /// Payload length in bytes
    pub byte_length: u64,
    /// Range of the finite elements
    pub range: NumericRange,
}

impl NdArrayDescriptor {
    /// Number of elements implied by `shape`, or `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Byte length implied by `shape` and `dtype`, or `None` on overflow.
    pub fn expected_byte_length(&self) -> Option<u64> {
        let count = u64::try_from(self.element_count()?).ok()?;
        count.checked_mul(self.dtype.element_size() as u64)
    }
}

const DESCRIPTOR_EXPECTED: &str = "ndarray descriptor";

/// Fixed part of the descriptor text: member names and punctuation (78 bytes
/// with the longest dtype tag, rounded up) plus bounds for offset,
/// byteLength and the two range values.
const DESCRIPTOR_BASE_HINT: usize = 96 + 2 * INT64_SIZE_HINT + 2 * F64_SIZE_HINT;

/// Upper bound on the text length of a descriptor of the given rank.
pub fn descriptor_size_hint(rank: usize) -> usize {
    DESCRIPTOR_BASE_HINT + rank * (INT64_SIZE_HINT + 1)
}

impl JsonCodec for NdArrayDescriptor {
    fn size_hint(&self, _ctx: &EncodeContext) -> usize {
        descriptor_size_hint(self.shape.len())
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        ctx.push(b'{');
        ctx.write_key("dtype");
        ctx.push(b'"');
        ctx.push_str(self.dtype.tag());
        ctx.push(b'"');
        ctx.push(b',');
        ctx.write_key("shape");
        self.shape.write_json(ctx);
        ctx.push(b',');
        ctx.write_key("offset");
        self.offset.write_json(ctx);
        ctx.push(b',');
        ctx.write_key("byteLength");
        self.byte_length.write_json(ctx);
        ctx.push(b',');
        ctx.write_key("range");
        self.range.write_json(ctx);
        ctx.push(b'}');
    }

    /// `range` is optional; unknown members are skipped.
    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        ctx.skip_space();
        let start = ctx.position();
        let mut dtype = None;
        let mut shape = None;
        let mut offset = None;
        let mut byte_length = None;
        let mut range = NumericRange::default();
        read_object(ctx, DESCRIPTOR_EXPECTED, |ctx, key| {
            match key {
                b"dtype" => {
                    let mut tag = Vec::new();
                    ctx.string_bytes(DESCRIPTOR_EXPECTED, &mut tag)?;
                    match std::str::from_utf8(&tag).ok().and_then(DType::from_tag) {
                        Some(d) => dtype = Some(d),
                        None => {
                            return ctx.fail(
                                DESCRIPTOR_EXPECTED,
                                format!("unknown dtype {}", String::from_utf8_lossy(&tag)),
                            )
                        }
                    }
                }
                b"shape" => shape = Some(read_inline_seq::<usize>(ctx)?),
                b"offset" => offset = Some(u64::read_json(ctx)?),
                b"byteLength" => byte_length = Some(u64::read_json(ctx)?),
                b"range" => range = NumericRange::read_json(ctx)?,
                _ => ctx.skip_value(DESCRIPTOR_EXPECTED)?,
            }
            Ok(())
        })?;
        match (dtype, shape, offset, byte_length) {
            (Some(dtype), Some(shape), Some(offset), Some(byte_length)) => Ok(NdArrayDescriptor {
                dtype,
                shape,
                offset,
                byte_length,
                range,
            }),
            _ => ctx.fail_at(
                DESCRIPTOR_EXPECTED,
                "descriptor needs dtype, shape, offset and byteLength",
                start,
            ),
        }
    }
}

/// Write `data` to the blob store and a descriptor with `shape` to the text.
///
/// Empty arrays write no chunk and record offset 0.
pub fn write_blob_array<E: Element>(ctx: &mut EncodeContext, shape: &[usize], data: &[E]) {
    let dtype = E::DTYPE;
    let mut bytes = Vec::with_capacity(data.len() * dtype.element_size());
    for &v in data {
        v.write_le(&mut bytes);
    }
    let offset = ctx.write_chunk(&bytes);
    trace!(
        target: "blobjson::blobs",
        dtype = dtype.tag(),
        offset,
        len = bytes.len(),
        "array written to blob store"
    );
    let descriptor = NdArrayDescriptor {
        dtype,
        shape: shape.to_vec(),
        offset,
        byte_length: bytes.len() as u64,
        range: NumericRange::of(data),
    };
    descriptor.write_json(ctx);
}

/// Read a descriptor of the given rank and load its elements.
///
/// Failures are reported against `expected` at the descriptor's start.
pub fn read_blob_array<E: Element>(
    ctx: &mut DecodeContext<'_>,
    expected: &'static str,
    rank: usize,
) -> DecodeResult<(Vec<usize>, Vec<E>)> {
    ctx.skip_space();
    let start = ctx.position();
    let Some(blobs) = ctx.blobs().cloned() else {
        return ctx.fail(expected, "ndarray descriptor without a blob store");
    };
    let desc = NdArrayDescriptor::read_json(ctx)?;
    if desc.dtype != E::DTYPE {
        return ctx.fail_at(
            expected,
            format!("dtype {} does not match {}", desc.dtype, E::DTYPE),
            start,
        );
    }
    if desc.shape.len() != rank {
        return ctx.fail_at(
            expected,
            format!("shape rank {} does not match {}", desc.shape.len(), rank),
            start,
        );
    }
    if desc.expected_byte_length() != Some(desc.byte_length) {
        return ctx.fail_at(
            expected,
            format!(
                "byteLength {} does not match shape {:?} of {}",
                desc.byte_length, desc.shape, desc.dtype
            ),
            start,
        );
    }
    let in_bounds = desc
        .offset
        .checked_add(desc.byte_length)
        .map_or(false, |end| end <= blobs.bytes_reserved());
    let len = match usize::try_from(desc.byte_length) {
        Ok(len) if in_bounds || len == 0 => len,
        _ => {
            return ctx.fail_at(
                expected,
                format!(
                    "blob range {}+{} is outside the blob store",
                    desc.offset, desc.byte_length
                ),
                start,
            )
        }
    };
    let mut bytes = vec![0u8; len];
    if len > 0 {
        if let Err(e) = blobs.read_chunk(desc.offset, &mut bytes) {
            return ctx.fail_at(expected, format!("blob read failed: {}", e), start);
        }
    }
    let data = bytes
        .chunks_exact(E::DTYPE.element_size())
        .map(E::read_le)
        .collect();
    Ok((desc.shape, data))
}

/// Read either an inline array (`[`) or a rank-1 descriptor (`{`).
pub fn read_seq_or_blob<E: Element>(ctx: &mut DecodeContext<'_>) -> DecodeResult<Vec<E>> {
    let expected = type_name::<Vec<E>>();
    ctx.skip_space();
    match ctx.peek() {
        Some(b'[') => read_inline_seq(ctx),
        Some(b'{') => read_blob_array(ctx, expected, 1).map(|(_, data)| data),
        _ => ctx.fail(expected, "expected [ or {"),
    }
}
