//! Shared JSON tokenizer
//!
//! One scanner for string literals, numbers and nested containers, used both
//! by the materializing readers in [`crate::codec`] and by the
//! non-materializing skip path. Keeping a single copy of the escape and number
//! grammar means skipping a value and reading it can never disagree about
//! where that value ends.
//!
//! The lexer works on raw bytes. Bytes `>= 0x80` inside strings are passed
//! through untouched; no UTF-8 validation happens here.

/// Maximum container nesting accepted by [`Lexer::skip_value`]
pub const MAX_NESTING_DEPTH: usize = 512;

/// Lexical failure; the lexer position is left at the offending byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    /// Short description of the problem
    pub reason: &'static str,
}

impl LexError {
    const fn new(reason: &'static str) -> Self {
        LexError { reason }
    }
}

/// Cursor over an encoded JSON text
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    text: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer positioned at the start of `text`.
    pub fn new(text: &'a [u8]) -> Self {
        Lexer { text, pos: 0 }
    }

    /// The complete text being scanned.
    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Positions past the end are clamped.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
    }

    /// True once every byte has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Byte under the cursor.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.text.get(self.pos).copied()
    }

    /// Byte `n` positions past the cursor.
    #[inline]
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.text.get(self.pos + n).copied()
    }

    /// Consume and return the byte under the cursor.
    #[inline]
    pub fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    /// Consume `c` if it is under the cursor.
    #[inline]
    pub fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Skip JSON whitespace (space, tab, newline, carriage return only).
    #[inline]
    pub fn skip_space(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Match `pattern` after leading whitespace.
    ///
    /// A space inside `pattern` matches any run of whitespace. On mismatch the
    /// cursor is left where it was.
    pub fn match_literal(&mut self, pattern: &str) -> bool {
        let start = self.pos;
        self.skip_space();
        for &p in pattern.as_bytes() {
            if p == b' ' {
                self.skip_space();
                continue;
            }
            if !self.eat(p) {
                self.pos = start;
                return false;
            }
        }
        true
    }

    /// Match `"key"` followed by `:` and trailing whitespace.
    ///
    /// The key is compared byte for byte without escape processing. On
    /// mismatch the cursor is left where it was.
    pub fn match_key(&mut self, key: &str) -> bool {
        let start = self.pos;
        self.skip_space();
        let matched = self.eat(b'"')
            && key.as_bytes().iter().all(|&k| self.eat(k))
            && self.eat(b'"')
            && {
                self.skip_space();
                self.eat(b':')
            };
        if matched {
            self.skip_space();
        } else {
            self.pos = start;
        }
        matched
    }

    /// Scan a number token and return its bytes.
    ///
    /// Accepts an optional sign, digits with an optional fraction, and an
    /// optional exponent. At least one mantissa digit is required.
    pub fn scan_number(&mut self) -> Result<&'a [u8], LexError> {
        let start = self.pos;
        if let Some(b'-' | b'+') = self.peek() {
            self.pos += 1;
        }
        let mut digits = self.skip_digits();
        if self.eat(b'.') {
            digits += self.skip_digits();
        }
        if digits == 0 {
            self.pos = start;
            return Err(LexError::new("expected number"));
        }
        if let Some(b'e' | b'E') = self.peek() {
            let mark = self.pos;
            self.pos += 1;
            if let Some(b'-' | b'+') = self.peek() {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                self.pos = mark;
                return Err(LexError::new("expected exponent digits"));
            }
        }
        Ok(&self.text[start..self.pos])
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek() {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Scan a string literal.
    ///
    /// With `out` present the unescaped bytes are appended to it; with `None`
    /// the literal is only skipped. Supported escapes: `\" \\ \/ \b \f \n \r
    /// \t`, `\xHH` (one raw byte) and `\uHHHH` (one code point, encoded as
    /// UTF-8). Unknown escapes yield the escaped character itself. Surrogate
    /// code units from `\u` have no single-character encoding and are dropped.
    pub fn scan_string(&mut self, mut out: Option<&mut Vec<u8>>) -> Result<(), LexError> {
        if !self.eat(b'"') {
            return Err(LexError::new("expected string"));
        }
        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(LexError::new("no closing quote")),
            };
            match c {
                b'"' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'\\' => {
                    self.pos += 1;
                    self.scan_escape(out.as_deref_mut())?;
                }
                0x00..=0x1f => return Err(LexError::new("surprising control character")),
                _ => {
                    self.pos += 1;
                    if let Some(out) = out.as_deref_mut() {
                        out.push(c);
                    }
                }
            }
        }
    }

    fn scan_escape(&mut self, out: Option<&mut Vec<u8>>) -> Result<(), LexError> {
        let c = self.bump().ok_or(LexError::new("no closing quote"))?;
        let mut utf8 = [0u8; 4];
        let bytes: &[u8] = match c {
            b'b' => &[0x08],
            b'f' => &[0x0c],
            b'n' => &[0x0a],
            b'r' => &[0x0d],
            b't' => &[0x09],
            b'x' => {
                utf8[0] = self.scan_hex(2)? as u8;
                &utf8[..1]
            }
            b'u' => {
                let code = self.scan_hex(4)?;
                match char::from_u32(code) {
                    Some(ch) => ch.encode_utf8(&mut utf8).as_bytes(),
                    None => &[],
                }
            }
            _ => {
                utf8[0] = c;
                &utf8[..1]
            }
        };
        if let Some(out) = out {
            out.extend_from_slice(bytes);
        }
        Ok(())
    }

    fn scan_hex(&mut self, count: usize) -> Result<u32, LexError> {
        let mut value = 0u32;
        for _ in 0..count {
            let digit = self
                .peek()
                .and_then(|c| (c as char).to_digit(16))
                .ok_or(LexError::new("expected hex digit in escape"))?;
            self.pos += 1;
            value = (value << 4) | digit;
        }
        Ok(value)
    }

    /// Skip one complete value without materializing it.
    ///
    /// Understands the full string and number grammar, so brackets inside
    /// string literals are not counted. `depth` is the current nesting level;
    /// pass 0 at the top.
    pub fn skip_value(&mut self, depth: usize) -> Result<(), LexError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(LexError::new("nesting too deep"));
        }
        self.skip_space();
        match self.peek() {
            Some(b'"') => self.scan_string(None),
            Some(b'[') => {
                self.pos += 1;
                loop {
                    self.skip_space();
                    if self.eat(b']') {
                        return Ok(());
                    }
                    self.skip_value(depth + 1)?;
                    self.skip_space();
                    if self.eat(b',') {
                        continue;
                    }
                    if self.eat(b']') {
                        return Ok(());
                    }
                    return Err(LexError::new("expected , or ]"));
                }
            }
            Some(b'{') => {
                self.pos += 1;
                loop {
                    self.skip_space();
                    if self.eat(b'}') {
                        return Ok(());
                    }
                    self.skip_member(depth + 1)?;
                    self.skip_space();
                    if self.eat(b',') {
                        continue;
                    }
                    if self.eat(b'}') {
                        return Ok(());
                    }
                    return Err(LexError::new("expected , or }"));
                }
            }
            Some(b't') => self.expect_word("true"),
            Some(b'f') => self.expect_word("false"),
            Some(b'n') => self.expect_word("null"),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.scan_number().map(|_| ()),
            Some(_) => Err(LexError::new("expected value")),
            None => Err(LexError::new("unexpected end of text")),
        }
    }

    /// Skip one `"key": value` object member.
    pub fn skip_member(&mut self, depth: usize) -> Result<(), LexError> {
        self.skip_space();
        self.scan_string(None)?;
        self.skip_space();
        if !self.eat(b':') {
            return Err(LexError::new("expected :"));
        }
        self.skip_value(depth)
    }

    fn expect_word(&mut self, word: &str) -> Result<(), LexError> {
        let end = self.pos + word.len();
        if self.text.get(self.pos..end) == Some(word.as_bytes()) {
            self.pos = end;
            Ok(())
        } else {
            Err(LexError::new("unexpected literal"))
        }
    }
}
