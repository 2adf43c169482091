//! Linear-algebra value codecs
//!
//! `Complex64` is always available and is a blob element (`complex64`, 16
//! bytes per value). With the `ndarray` feature, `Array1`, `Array2` and
//! `Vec<Array1>` use the blob side channel the same way numeric `Vec`s do.

use crate::codec::read_object;
use crate::codec::JsonCodec;
use crate::decode::{DecodeContext, DecodeResult};
use crate::dtype::{DType, Element};
use crate::encode::EncodeContext;
use crate::format::F64_SIZE_HINT;

/// Complex number, encoded as `{"real":r,"imag":i}`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex64 {
    /// Real part
    pub re: f64,
    /// Imaginary part
    pub im: f64,
}

impl Complex64 {
    /// Create a complex number.
    pub const fn new(re: f64, im: f64) -> Self {
        Complex64 { re, im }
    }
}

impl JsonCodec for Complex64 {
    fn size_hint(&self, _ctx: &EncodeContext) -> usize {
        // {"real":,"imag":}
        17 + 2 * F64_SIZE_HINT
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        ctx.push(b'{');
        ctx.write_key("real");
        self.re.write_json(ctx);
        ctx.push(b',');
        ctx.write_key("imag");
        self.im.write_json(ctx);
        ctx.push(b'}');
    }

    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        let expected = std::any::type_name::<Complex64>();
        let mut value = Complex64::default();
        read_object(ctx, expected, |ctx, key| match key {
            b"real" => f64::read_json(ctx).map(|v| value.re = v),
            b"imag" => f64::read_json(ctx).map(|v| value.im = v),
            _ => ctx.skip_value(expected),
        })?;
        Ok(value)
    }

    crate::codec::blob_seq_methods!();
}

/// Stored as the real part then the imaginary part, each little-endian.
///
/// Complex values have no ordering, so complex arrays always record the
/// range `{0, 0}`.
impl Element for Complex64 {
    const DTYPE: DType = DType::Complex64;

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        self.re.write_le(out);
        self.im.write_le(out);
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        let (re, im) = bytes.split_at(8);
        Complex64::new(f64::read_le(re), f64::read_le(im))
    }

    #[inline]
    fn range_value(self) -> Option<f64> {
        None
    }
}

#[cfg(feature = "ndarray")]
mod arrays {
    use crate::codec::{
        inline_iter_size_hint, inline_seq_size_hint, read_inline_seq, write_inline_iter,
        write_inline_seq, JsonCodec,
    };
    use crate::decode::{DecodeContext, DecodeResult};
    use crate::descriptor::{
        descriptor_size_hint, read_blob_array, read_seq_or_blob, write_blob_array,
    };
    use crate::dtype::Element;
    use crate::encode::EncodeContext;
    use ndarray::{Array1, Array2};
    use std::any::type_name;

    /// Shared row length when every row has the same non-zero length.
    fn packed_row_len<E>(rows: &[Array1<E>]) -> Option<usize> {
        let n = rows.first().map_or(0, |r| r.len());
        (n > 0 && rows.iter().all(|r| r.len() == n)).then_some(n)
    }

    impl<E: Element> JsonCodec for Array1<E> {
        fn size_hint(&self, ctx: &EncodeContext) -> usize {
            if ctx.use_blobs_for(self.len()) {
                descriptor_size_hint(1)
            } else {
                inline_iter_size_hint(self.iter(), ctx)
            }
        }

        fn write_json(&self, ctx: &mut EncodeContext) {
            if ctx.use_blobs_for(self.len()) {
                match self.as_slice() {
                    Some(data) => write_blob_array(ctx, &[self.len()], data),
                    None => {
                        let data: Vec<E> = self.iter().copied().collect();
                        write_blob_array(ctx, &[data.len()], &data);
                    }
                }
            } else {
                write_inline_iter(self.iter(), ctx);
            }
        }

        fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
            read_seq_or_blob(ctx).map(Array1::from_vec)
        }

        /// Equal-length rows pack into one `[count, n]` chunk.
        fn seq_size_hint(items: &[Self], ctx: &EncodeContext) -> usize {
            match packed_row_len(items) {
                Some(n) if ctx.use_blobs_for(items.len() * n) => descriptor_size_hint(2),
                _ => inline_seq_size_hint(items, ctx),
            }
        }

        fn write_seq(items: &[Self], ctx: &mut EncodeContext) {
            match packed_row_len(items) {
                Some(n) if ctx.use_blobs_for(items.len() * n) => {
                    let data: Vec<E> = items.iter().flat_map(|r| r.iter().copied()).collect();
                    write_blob_array(ctx, &[items.len(), n], &data);
                }
                _ => write_inline_seq(items, ctx),
            }
        }

        fn read_seq(ctx: &mut DecodeContext<'_>) -> DecodeResult<Vec<Self>> {
            ctx.skip_space();
            if ctx.peek() != Some(b'{') {
                return read_inline_seq(ctx);
            }
            let expected = type_name::<Vec<Self>>();
            let start = ctx.position();
            let (shape, data) = read_blob_array::<E>(ctx, expected, 2)?;
            let (count, n) = (shape[0], shape[1]);
            if n == 0 {
                // Zero-width rows are never packed; the count carries no data.
                if count > 0 {
                    return ctx.fail_at(expected, "packed rows must have non-zero width", start);
                }
                return Ok(Vec::new());
            }
            Ok(data
                .chunks_exact(n)
                .map(|row| Array1::from_vec(row.to_vec()))
                .collect())
        }
    }

    impl<E: Element> JsonCodec for Array2<E> {
        fn size_hint(&self, ctx: &EncodeContext) -> usize {
            if ctx.use_blobs_for(self.len()) {
                descriptor_size_hint(2)
            } else {
                2 + self
                    .rows()
                    .into_iter()
                    .map(|row| inline_iter_size_hint(row.iter(), ctx) + 1)
                    .sum::<usize>()
            }
        }

        /// Row-major; inline form is an array of row arrays.
        fn write_json(&self, ctx: &mut EncodeContext) {
            if ctx.use_blobs_for(self.len()) {
                let data: Vec<E> = self.iter().copied().collect();
                write_blob_array(ctx, &[self.nrows(), self.ncols()], &data);
                return;
            }
            ctx.push(b'[');
            for (i, row) in self.rows().into_iter().enumerate() {
                if i > 0 {
                    ctx.push(b',');
                }
                write_inline_iter(row.iter(), ctx);
            }
            ctx.push(b']');
        }

        fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
            let expected = type_name::<Self>();
            ctx.skip_space();
            let start = ctx.position();
            let (rows, cols, data) = if ctx.peek() == Some(b'{') {
                let (shape, data) = read_blob_array::<E>(ctx, expected, 2)?;
                (shape[0], shape[1], data)
            } else {
                let rows: Vec<Vec<E>> = read_inline_seq(ctx)?;
                let cols = rows.first().map_or(0, Vec::len);
                if rows.iter().any(|r| r.len() != cols) {
                    return ctx.fail_at(expected, "rows have different lengths", start);
                }
                (rows.len(), cols, rows.into_iter().flatten().collect())
            };
            match Array2::from_shape_vec((rows, cols), data) {
                Ok(a) => Ok(a),
                Err(e) => ctx.fail_at(expected, e.to_string(), start),
            }
        }
    }
}
