//! Encoded value container
//!
//! A [`Value`] is a complete encoded text plus an optional handle to the blob
//! store its ndarray descriptors point into. Cloning is cheap: the text and
//! the store are both reference counted.

use crate::blob::SharedBlobStore;
use crate::codec::JsonCodec;
use crate::decode::{decode_bytes, DecodeContext, DecodeResult};
use crate::encode::{self, EncodeContext};
use crate::error::{BlobError, DecodeError};
use std::fmt;
use std::sync::Arc;

/// Encoded text with an optional blob store
#[derive(Clone)]
pub struct Value {
    text: Arc<[u8]>,
    blobs: Option<SharedBlobStore>,
}

impl Value {
    /// The literal `null`.
    pub fn null() -> Self {
        Value::from_text("null")
    }

    /// Wrap existing encoded text.
    pub fn from_text(text: impl AsRef<[u8]>) -> Self {
        Value {
            text: Arc::from(text.as_ref()),
            blobs: None,
        }
    }

    /// Wrap encoded text and the blob store its descriptors refer to.
    pub fn from_parts(text: Vec<u8>, blobs: Option<SharedBlobStore>) -> Self {
        Value {
            text: Arc::from(text),
            blobs,
        }
    }

    /// Attach a blob store (builder pattern).
    pub fn with_blobs(mut self, blobs: SharedBlobStore) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// Encode `value` as plain text.
    pub fn encode<T: JsonCodec>(value: &T) -> Self {
        encode::encode(value)
    }

    /// Encode `value`, sending numeric arrays to `blobs`.
    pub fn encode_with_blobs<T: JsonCodec>(
        value: &T,
        blobs: SharedBlobStore,
    ) -> Result<Self, BlobError> {
        encode::encode_with_blobs(value, blobs)
    }

    /// Decode into `T`, resolving descriptors against the attached store.
    pub fn decode<T: JsonCodec>(&self) -> Result<T, DecodeError> {
        decode_bytes(&self.text, self.blobs.clone())
    }

    /// Encoded text.
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Encoded text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.text).ok()
    }

    /// Length of the encoded text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// True when the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True when the text is empty or the literal `null`.
    pub fn is_null(&self) -> bool {
        let text: &[u8] = &self.text;
        let start = text.iter().position(|c| !c.is_ascii_whitespace());
        let end = text.iter().rposition(|c| !c.is_ascii_whitespace());
        match (start, end) {
            (Some(start), Some(end)) => &text[start..=end] == b"null",
            _ => true,
        }
    }

    /// Attached blob store, if any.
    pub fn blobs(&self) -> Option<&SharedBlobStore> {
        self.blobs.as_ref()
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::null()
    }
}

impl PartialEq for Value {
    /// Values compare by text only.
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("text", &String::from_utf8_lossy(&self.text))
            .field("has_blobs", &self.blobs.is_some())
            .finish()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.text))
    }
}

/// A nested `Value` is copied into the output verbatim. Its descriptors must
/// refer to the blob store of the enclosing encode.
impl JsonCodec for Value {
    fn size_hint(&self, _ctx: &EncodeContext) -> usize {
        if self.text.is_empty() {
            4
        } else {
            self.text.len()
        }
    }

    fn write_json(&self, ctx: &mut EncodeContext) {
        if self.text.is_empty() {
            ctx.push_str("null");
        } else {
            ctx.push_bytes(&self.text);
        }
    }

    /// Captures the text of one value and shares the context's blob store.
    fn read_json(ctx: &mut DecodeContext<'_>) -> DecodeResult<Self> {
        ctx.skip_space();
        let start = ctx.position();
        ctx.skip_value(std::any::type_name::<Value>())?;
        let span = ctx.text()[start..ctx.position()].to_vec();
        Ok(Value::from_parts(span, ctx.blobs().cloned()))
    }
}
