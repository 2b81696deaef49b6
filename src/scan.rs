//! Stateless byte scanning helpers.
//!
//! The scanners distinguish *incomplete* input (`None`: the terminator has
//! not arrived yet) from *malformed* input (`Err`). The parser relies on that
//! distinction to decide between carrying bytes over and failing.

use std::ops::Range;

use memchr::{memchr, memchr2};

use crate::error::ParseError;
use crate::types::Version;

/// Length of `HTTP/x.y`.
pub(crate) const VERSION_LEN: usize = 8;

/// Advance past ASCII spaces starting at `pos`.
pub fn skip_spaces(buf: &[u8], pos: usize) -> usize {
    let rest = buf.get(pos..).unwrap_or(&[]);
    pos + rest.iter().take_while(|&&b| b == b' ').count()
}

/// Index of the first ASCII space at or after `pos`.
pub fn find_space(buf: &[u8], pos: usize) -> Option<usize> {
    memchr(b' ', buf.get(pos..)?).map(|i| pos + i)
}

/// Index of the `\r` of the first CRLF at or after `pos`.
///
/// * `Ok(None)`: no complete CRLF yet (including a lone `\r` as last byte).
/// * `Err(_)`: a bare `\n`, or a `\r` followed by something other than `\n`.
pub fn find_crlf(buf: &[u8], pos: usize) -> Result<Option<usize>, ParseError> {
    let Some(rest) = buf.get(pos..) else {
        return Ok(None);
    };
    let Some(i) = memchr2(b'\r', b'\n', rest) else {
        return Ok(None);
    };
    let at = pos + i;
    if buf[at] == b'\n' {
        return Err(ParseError::UnexpectedByte {
            expected: "CR before LF",
            found: b'\n',
        });
    }
    match buf.get(at + 1) {
        None => Ok(None),
        Some(b'\n') => Ok(Some(at)),
        Some(&other) => Err(ParseError::UnexpectedByte {
            expected: "LF after CR",
            found: other,
        }),
    }
}

/// Split a header line into name and value ranges (relative to `line`).
///
/// Strict mode requires the name to be followed by exactly `": "`. Lenient
/// mode accepts any amount of optional whitespace around the value and
/// trims it.
pub fn split_field(line: &[u8], lenient: bool) -> Result<(Range<usize>, Range<usize>), ParseError> {
    let invalid = || ParseError::InvalidHeader(ParseError::lossy(line));

    let colon = memchr(b':', line).ok_or_else(invalid)?;
    if colon == 0 || !line[..colon].iter().all(|&b| is_tchar(b)) {
        return Err(invalid());
    }

    if lenient {
        let is_ows = |b: &u8| *b == b' ' || *b == b'\t';
        let leading = line[colon + 1..].iter().take_while(|b| is_ows(b)).count();
        let start = colon + 1 + leading;
        let trailing = line[start..].iter().rev().take_while(|b| is_ows(b)).count();
        return Ok((0..colon, start..line.len() - trailing));
    }

    match line.get(colon + 1..colon + 3) {
        Some([b' ', next]) if *next != b' ' => Ok((0..colon, colon + 2..line.len())),
        // Empty value: the line ends right after ": ".
        None if line.get(colon + 1) == Some(&b' ') => Ok((0..colon, line.len()..line.len())),
        _ => Err(invalid()),
    }
}

/// Parse exactly `HTTP/<digit>.<digit>`.
pub fn parse_version(token: &[u8]) -> Result<Version, ParseError> {
    match token {
        [b'H', b'T', b'T', b'P', b'/', major, b'.', minor]
            if major.is_ascii_digit() && minor.is_ascii_digit() =>
        {
            Ok(Version::new(major - b'0', minor - b'0'))
        }
        _ => Err(ParseError::InvalidVersion(ParseError::lossy(token))),
    }
}

/// Parse exactly three ASCII digits.
pub fn parse_status_code(token: &[u8]) -> Result<u16, ParseError> {
    match token {
        [a, b, c] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            Ok(u16::from(a - b'0') * 100 + u16::from(b - b'0') * 10 + u16::from(c - b'0'))
        }
        _ => Err(ParseError::InvalidStatusCode(ParseError::lossy(token))),
    }
}

/// Number of decimal digits needed to print `n`.
pub fn decimal_width(n: u32) -> usize {
    match n.checked_ilog10() {
        Some(log) => log as usize + 1,
        None => 1,
    }
}

/// `tchar`: characters allowed in HTTP tokens (method, header names).
///
/// ```text
/// tchar = "!" / "#" / "$" / "%" / "&" / "'" / "*" / "+" / "-" / "." /
///         "^" / "_" / "`" / "|" / "~" / DIGIT / ALPHA
/// ```
#[inline]
pub fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

/// Visible, non-control bytes allowed inside a request target.
#[inline]
pub(crate) fn is_uri_byte(b: u8) -> bool {
    b > b' ' && b != 0x7F
}
