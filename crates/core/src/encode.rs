//! Encode context
//!
//! Encoding writes into one growable buffer. Each top-level call first asks
//! the value for its size hint and reserves that many bytes, so the write pass
//! normally runs without reallocating. The hint is an upper bound; if a value
//! ever writes more than it promised, the buffer still grows safely and the
//! mismatch is reported.

use crate::blob::SharedBlobStore;
use crate::codec::JsonCodec;
use crate::error::BlobError;
use crate::value::Value;
use tracing::warn;

/// Encoding options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Arrays with fewer elements than this are written inline even when a
    /// blob store is attached (default: 0, always use the blob store).
    pub inline_threshold: usize,
}

impl EncodeOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inline threshold (builder pattern).
    pub fn with_inline_threshold(mut self, threshold: usize) -> Self {
        self.inline_threshold = threshold;
        self
    }
}

/// Output buffer and blob handle for one encode
#[derive(Default)]
pub struct EncodeContext {
    out: Vec<u8>,
    blobs: Option<SharedBlobStore>,
    options: EncodeOptions,
    blob_error: Option<BlobError>,
}

impl EncodeContext {
    /// Context that writes everything inline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that sends numeric arrays to `blobs`.
    pub fn with_blobs(blobs: SharedBlobStore) -> Self {
        EncodeContext {
            blobs: Some(blobs),
            ..Self::default()
        }
    }

    /// Replace the encoding options (builder pattern).
    pub fn with_options(mut self, options: EncodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Attached blob store, if any.
    pub fn blobs(&self) -> Option<&SharedBlobStore> {
        self.blobs.as_ref()
    }

    /// Current options.
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// True when an array of `len` elements should go to the blob store.
    #[inline]
    pub fn use_blobs_for(&self, len: usize) -> bool {
        self.blobs.is_some() && len >= self.options.inline_threshold
    }

    /// Reserve room for `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.out.reserve(additional);
    }

    /// Append one byte.
    #[inline]
    pub fn push(&mut self, c: u8) {
        self.out.push(c);
    }

    /// Append raw bytes.
    #[inline]
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Append a string verbatim.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Append `"key":` for a key that needs no escaping.
    pub fn write_key(&mut self, key: &str) {
        self.out.push(b'"');
        self.out.extend_from_slice(key.as_bytes());
        self.out.extend_from_slice(b"\":");
    }

    /// Output buffer, for formatting helpers.
    pub fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.out
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Text written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Append `data` to the blob store and return its payload offset.
    ///
    /// Failures do not interrupt the encode: they are logged, the first one is
    /// kept for the top-level call to report, and offset 0 is returned.
    pub fn write_chunk(&mut self, data: &[u8]) -> u64 {
        if data.is_empty() {
            return 0;
        }
        let Some(blobs) = &self.blobs else {
            return 0;
        };
        match blobs.write_chunk(data) {
            Ok(offset) => offset,
            Err(e) => {
                warn!(target: "blobjson::blobs", len = data.len(), error = %e, "blob chunk write failed");
                if self.blob_error.is_none() {
                    self.blob_error = Some(e);
                }
                0
            }
        }
    }

    /// First blob write failure seen by this context.
    pub fn blob_error(&self) -> Option<&BlobError> {
        self.blob_error.as_ref()
    }

    /// Encode one top-level value into this context.
    ///
    /// Reserves the value's size hint, writes it, and checks that the hint
    /// held.
    pub fn encode_value<T: JsonCodec>(&mut self, value: &T) {
        let start = self.out.len();
        let hint = value.size_hint(self);
        self.out.reserve(hint);
        value.write_json(self);
        let written = self.out.len() - start;
        if written > hint {
            warn!(
                target: "blobjson::encode",
                type_name = std::any::type_name::<T>(),
                hint,
                written,
                "size hint underestimated encoded length"
            );
            debug_assert!(
                written <= hint,
                "size hint for {} was {} but {} bytes were written",
                std::any::type_name::<T>(),
                hint,
                written
            );
        }
    }

    /// Finish into a [`Value`] sharing this context's blob store.
    ///
    /// Returns the first blob write failure if any occurred.
    pub fn into_value(self) -> Result<Value, BlobError> {
        if let Some(e) = self.blob_error {
            return Err(e);
        }
        Ok(Value::from_parts(self.out, self.blobs))
    }
}

/// Encode `value` as plain text; every array is written inline.
pub fn encode<T: JsonCodec>(value: &T) -> Value {
    let mut ctx = EncodeContext::new();
    ctx.encode_value(value);
    Value::from_parts(ctx.out, None)
}

/// Encode `value`, sending numeric arrays to `blobs`.
pub fn encode_with_blobs<T: JsonCodec>(
    value: &T,
    blobs: SharedBlobStore,
) -> Result<Value, BlobError> {
    encode_with(value, EncodeContext::with_blobs(blobs))
}

/// Encode `value` into a prepared context.
pub fn encode_with<T: JsonCodec>(value: &T, mut ctx: EncodeContext) -> Result<Value, BlobError> {
    ctx.encode_value(value);
    ctx.into_value()
}
