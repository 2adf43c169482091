//! Decode context and failure reporting
//!
//! Readers advance a shared cursor and return [`DecodeResult`]. The first
//! failure records the expected type, a reason and the exact offset in the
//! context; later failures while unwinding do not overwrite it. Only the
//! outermost entry point turns that record into a [`DecodeError`].

use crate::blob::SharedBlobStore;
use crate::codec::JsonCodec;
use crate::error::DecodeError;
use crate::lexer::{LexError, Lexer};

/// Marker returned up the stack once a failure has been recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failed;

/// Result type for codec readers
pub type DecodeResult<T> = Result<T, Failed>;

/// Read cursor, blob handle and sticky failure state for one decode
pub struct DecodeContext<'a> {
    lexer: Lexer<'a>,
    blobs: Option<SharedBlobStore>,
    failure: Option<DecodeError>,
}

impl<'a> DecodeContext<'a> {
    /// Decode `text` without a blob store.
    pub fn new(text: &'a [u8]) -> Self {
        Self::with_blobs(text, None)
    }

    /// Decode `text`, resolving ndarray descriptors against `blobs`.
    pub fn with_blobs(text: &'a [u8], blobs: Option<SharedBlobStore>) -> Self {
        DecodeContext {
            lexer: Lexer::new(text),
            blobs,
            failure: None,
        }
    }

    /// The text being decoded.
    pub fn text(&self) -> &'a [u8] {
        self.lexer.text()
    }

    /// Attached blob store, if any.
    pub fn blobs(&self) -> Option<&SharedBlobStore> {
        self.blobs.as_ref()
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    /// Direct access to the tokenizer.
    pub fn lexer(&mut self) -> &mut Lexer<'a> {
        &mut self.lexer
    }

    /// Record a failure at the current position.
    pub fn fail<R>(&mut self, expected: &'static str, reason: impl Into<String>) -> DecodeResult<R> {
        let offset = self.position();
        self.fail_at(expected, reason, offset)
    }

    /// Record a failure at `offset`. Only the first failure is kept.
    pub fn fail_at<R>(
        &mut self,
        expected: &'static str,
        reason: impl Into<String>,
        offset: usize,
    ) -> DecodeResult<R> {
        if self.failure.is_none() {
            self.failure = Some(DecodeError::new(expected, reason, offset));
        }
        Err(Failed)
    }

    fn lex_failed<R>(&mut self, expected: &'static str, err: LexError) -> DecodeResult<R> {
        self.fail(expected, err.reason)
    }

    /// The recorded failure, if any.
    pub fn failure(&self) -> Option<&DecodeError> {
        self.failure.as_ref()
    }

    /// Convert the recorded failure into an error carrying the text.
    pub fn into_error(self) -> DecodeError {
        let text = self.lexer.text();
        let offset = self.lexer.position();
        self.failure
            .unwrap_or_else(|| DecodeError::new("value", "decode failed", offset))
            .with_text(text)
    }

    /// Skip whitespace.
    #[inline]
    pub fn skip_space(&mut self) {
        self.lexer.skip_space();
    }

    /// Byte under the cursor.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.lexer.peek()
    }

    /// Skip whitespace, then consume `c` if present.
    #[inline]
    pub fn eat(&mut self, c: u8) -> bool {
        self.lexer.skip_space();
        self.lexer.eat(c)
    }

    /// Skip whitespace, then consume `c` or fail with `reason`.
    pub fn expect_byte(
        &mut self,
        expected: &'static str,
        c: u8,
        reason: &'static str,
    ) -> DecodeResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            self.fail(expected, reason)
        }
    }

    /// See [`Lexer::match_literal`].
    pub fn match_literal(&mut self, pattern: &str) -> bool {
        self.lexer.match_literal(pattern)
    }

    /// See [`Lexer::match_key`].
    pub fn match_key(&mut self, key: &str) -> bool {
        self.lexer.match_key(key)
    }

    /// Scan a number token after whitespace.
    pub fn number_token(&mut self, expected: &'static str) -> DecodeResult<&'a str> {
        self.skip_space();
        let start = self.position();
        match self.lexer.scan_number() {
            Ok(bytes) => match std::str::from_utf8(bytes) {
                Ok(token) => Ok(token),
                Err(_) => self.fail_at(expected, "expected number", start),
            },
            Err(e) => self.lex_failed(expected, e),
        }
    }

    /// Scan a string literal after whitespace, appending unescaped bytes to
    /// `out`.
    pub fn string_bytes(&mut self, expected: &'static str, out: &mut Vec<u8>) -> DecodeResult<()> {
        self.skip_space();
        if self.peek() != Some(b'"') {
            return self.fail(expected, "expected string");
        }
        match self.lexer.scan_string(Some(out)) {
            Ok(()) => Ok(()),
            Err(e) => self.lex_failed(expected, e),
        }
    }

    /// Skip one value of any type.
    pub fn skip_value(&mut self, expected: &'static str) -> DecodeResult<()> {
        match self.lexer.skip_value(0) {
            Ok(()) => Ok(()),
            Err(e) => self.lex_failed(expected, e),
        }
    }

    /// Skip one `"key": value` member.
    pub fn skip_member(&mut self, expected: &'static str) -> DecodeResult<()> {
        match self.lexer.skip_member(0) {
            Ok(()) => Ok(()),
            Err(e) => self.lex_failed(expected, e),
        }
    }

    /// Require that only whitespace remains.
    pub fn finish(&mut self, expected: &'static str) -> DecodeResult<()> {
        self.skip_space();
        if self.lexer.at_end() {
            Ok(())
        } else {
            self.fail(expected, "trailing text after value")
        }
    }
}

/// Decode a complete text into `T`.
pub fn decode_bytes<T: JsonCodec>(
    text: &[u8],
    blobs: Option<SharedBlobStore>,
) -> Result<T, DecodeError> {
    let mut ctx = DecodeContext::with_blobs(text, blobs);
    let expected = std::any::type_name::<T>();
    match T::read_json(&mut ctx).and_then(|v| ctx.finish(expected).map(|()| v)) {
        Ok(v) => Ok(v),
        Err(Failed) => Err(ctx.into_error()),
    }
}

/// Decode a complete text into `T` without a blob store.
pub fn decode_str<T: JsonCodec>(text: &str) -> Result<T, DecodeError> {
    decode_bytes(text.as_bytes(), None)
}
