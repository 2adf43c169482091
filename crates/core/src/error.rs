//! Error types for blobjson
//!
//! This module defines all error types used by the codec:
//! - [`DecodeError`]: recoverable grammar/type failure with an exact text offset
//! - [`BlobError`]: failure in the binary side channel
//! - [`Error`]: union of the above plus raw I/O, returned by top-level entry points
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for blobjson operations
pub type Result<T> = std::result::Result<T, Error>;

/// Texts shorter than this are echoed in full (with a caret) by
/// [`DecodeError::format_failure`].
pub const MAX_ECHO_LEN: usize = 500;

/// A decode failure.
///
/// Records the type that was being decoded, a short human reason and the
/// byte offset into the decoded text where decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decoding {expected} failed at offset {offset}: {reason}")]
pub struct DecodeError {
    /// Name of the type that was expected at `offset`
    pub expected: &'static str,
    /// Short human description of what went wrong
    pub reason: String,
    /// Byte offset into the decoded text
    pub offset: usize,
    /// Full decoded text, kept only when shorter than [`MAX_ECHO_LEN`]
    pub text: Option<Vec<u8>>,
}

impl DecodeError {
    /// Create a decode error without a text excerpt.
    pub fn new(expected: &'static str, reason: impl Into<String>, offset: usize) -> Self {
        DecodeError {
            expected,
            reason: reason.into(),
            offset,
            text: None,
        }
    }

    /// Attach the decoded text if it is short enough to echo.
    pub fn with_text(mut self, text: &[u8]) -> Self {
        if text.len() < MAX_ECHO_LEN {
            self.text = Some(text.to_vec());
        }
        self
    }

    /// Render a multi-line diagnostic.
    ///
    /// The first line names the expected type, the reason and the offset.
    /// Short texts are echoed on the following line with a `^` under the
    /// failing byte.
    pub fn format_failure(&self) -> String {
        let mut out = format!(
            "decode {}: {} at offset {}",
            self.expected, self.reason, self.offset
        );
        if let Some(text) = &self.text {
            let cut = self.offset.min(text.len());
            let echo: String = String::from_utf8_lossy(text)
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            let column = String::from_utf8_lossy(&text[..cut]).chars().count();
            out.push('\n');
            out.push_str(&echo);
            out.push('\n');
            out.extend(std::iter::repeat(' ').take(column));
            out.push('^');
        }
        out
    }
}

/// Errors from the binary side channel
#[derive(Debug, Error)]
pub enum BlobError {
    /// I/O error on the backing file
    #[error("blob I/O error: {0}")]
    Io(#[from] io::Error),

    /// Requested range lies outside the loaded blob data
    #[error("blob range out of bounds: offset {offset} + {len} exceeds {available} bytes")]
    OutOfRange {
        /// Requested payload offset
        offset: u64,
        /// Requested payload length
        len: u64,
        /// Bytes available in the store
        available: u64,
    },

    /// Write attempted on a read-only store
    #[error("blob store is read-only")]
    ReadOnly,

    /// Read attempted on a write-only store
    #[error("blob store is write-only")]
    WriteOnly,

    /// Write attempted after the store was finished
    #[error("blob store is closed")]
    Closed,

    /// An earlier write on this store failed; the sticky failure flag is set
    #[error("blob store has a failed write")]
    Failed,
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or mistyped encoded text
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Blob side-channel failure
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// I/O error outside the blob store
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
