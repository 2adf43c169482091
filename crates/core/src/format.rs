//! Number formatting
//!
//! Integers are written in plain decimal. Floats follow the C `%g` layout:
//! `%.17g` for `f64` and `%.9g` for `f32`, which is enough digits to read the
//! exact value back. Trailing fractional zeros are stripped, fixed notation is
//! used while the decimal exponent lies in `[-5, precision)`, and scientific
//! notation (`d.ddde±XX`) otherwise.
//!
//! Special values:
//! - zero is written as `0` and `1.0` as `1`
//! - NaN is written as `null`
//! - +inf/-inf are written as `1e308`/`-1e308`

use std::fmt::{self, Write as _};

/// Upper bound on the text length of a 32-bit (or narrower) integer
pub const INT32_SIZE_HINT: usize = 12;
/// Upper bound on the text length of a 64-bit integer
pub const INT64_SIZE_HINT: usize = 20;
/// Upper bound on the text length of an `f32`
pub const F32_SIZE_HINT: usize = 20;
/// Upper bound on the text length of an `f64`
pub const F64_SIZE_HINT: usize = 25;

/// Significant digits written for `f64`
pub const F64_PRECISION: usize = 17;
/// Significant digits written for `f32`
pub const F32_PRECISION: usize = 9;

/// Write an unsigned integer.
pub fn write_u64(out: &mut Vec<u8>, mut v: u64) {
    if v == 0 {
        out.push(b'0');
        return;
    }
    let mut buf = [0u8; 20];
    let mut i = buf.len();
    while v > 0 {
        i -= 1;
        buf[i] = b'0' + (v % 10) as u8;
        v /= 10;
    }
    out.extend_from_slice(&buf[i..]);
}

/// Write a signed integer.
pub fn write_i64(out: &mut Vec<u8>, v: i64) {
    if v < 0 {
        out.push(b'-');
    }
    write_u64(out, v.unsigned_abs());
}

/// Write an `f64` with 17 significant digits.
pub fn write_f64(out: &mut Vec<u8>, v: f64) {
    if let Some(special) = special_text(v) {
        out.extend_from_slice(special);
        return;
    }
    write_general(out, v, F64_PRECISION);
}

/// Write an `f32` with 9 significant digits.
pub fn write_f32(out: &mut Vec<u8>, v: f32) {
    let wide = f64::from(v);
    if let Some(special) = special_text(wide) {
        out.extend_from_slice(special);
        return;
    }
    write_general_f32(out, v);
}

fn special_text(v: f64) -> Option<&'static [u8]> {
    if v.is_nan() {
        Some(b"null")
    } else if v == f64::INFINITY {
        Some(b"1e308")
    } else if v == f64::NEG_INFINITY {
        Some(b"-1e308")
    } else if v == 0.0 {
        Some(b"0")
    } else if v == 1.0 {
        Some(b"1")
    } else {
        None
    }
}

/// Stack buffer for the intermediate `{:e}` rendering.
struct DigitBuf {
    buf: [u8; 64],
    len: usize,
}

impl DigitBuf {
    fn new() -> Self {
        DigitBuf {
            buf: [0; 64],
            len: 0,
        }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for DigitBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

fn write_general(out: &mut Vec<u8>, v: f64, precision: usize) {
    let mut sci = DigitBuf::new();
    if write!(sci, "{:.*e}", precision - 1, v.abs()).is_err() {
        out.extend_from_slice(v.to_string().as_bytes());
        return;
    }
    layout_general(out, v.is_sign_negative(), sci.as_bytes(), precision);
}

fn write_general_f32(out: &mut Vec<u8>, v: f32) {
    let mut sci = DigitBuf::new();
    if write!(sci, "{:.*e}", F32_PRECISION - 1, v.abs()).is_err() {
        out.extend_from_slice(v.to_string().as_bytes());
        return;
    }
    layout_general(out, v.is_sign_negative(), sci.as_bytes(), F32_PRECISION);
}

/// Lay out a `d.ddd…e[-]X` rendering in `%g` style.
fn layout_general(out: &mut Vec<u8>, negative: bool, sci: &[u8], precision: usize) {
    let split = sci.iter().position(|&c| c == b'e').unwrap_or(sci.len());
    let (mantissa, exponent) = sci.split_at(split);

    let mut digits = [0u8; 40];
    let mut n = 0;
    for &c in mantissa {
        if c.is_ascii_digit() && n < digits.len() {
            digits[n] = c;
            n += 1;
        }
    }
    while n > 1 && digits[n - 1] == b'0' {
        n -= 1;
    }
    let digits = &digits[..n.max(1)];

    let exp = parse_exponent(exponent.get(1..).unwrap_or(&[]));

    if negative {
        out.push(b'-');
    }
    if exp < -4 || exp >= precision as i32 {
        out.push(digits[0]);
        if digits.len() > 1 {
            out.push(b'.');
            out.extend_from_slice(&digits[1..]);
        }
        out.push(b'e');
        out.push(if exp < 0 { b'-' } else { b'+' });
        let magnitude = exp.unsigned_abs();
        if magnitude < 10 {
            out.push(b'0');
        }
        write_u64(out, u64::from(magnitude));
    } else if exp >= 0 {
        let int_len = exp as usize + 1;
        if digits.len() <= int_len {
            out.extend_from_slice(digits);
            out.extend(std::iter::repeat(b'0').take(int_len - digits.len()));
        } else {
            out.extend_from_slice(&digits[..int_len]);
            out.push(b'.');
            out.extend_from_slice(&digits[int_len..]);
        }
    } else {
        out.extend_from_slice(b"0.");
        out.extend(std::iter::repeat(b'0').take((-exp - 1) as usize));
        out.extend_from_slice(digits);
    }
}

fn parse_exponent(text: &[u8]) -> i32 {
    let (negative, digits) = match text.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, text),
    };
    let magnitude = digits
        .iter()
        .filter(|c| c.is_ascii_digit())
        .fold(0i32, |acc, &c| acc * 10 + i32::from(c - b'0'));
    if negative {
        -magnitude
    } else {
        magnitude
    }
}
