//! Message body framing.
//!
//! The header-block parser hands over to this module once the blank line is
//! seen. It decides how the body is delimited and decodes chunked bodies.

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::types::{DocumentKind, HeaderList};

/// How the body following the header block is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    /// No body; the message ends with the header block.
    None,
    /// Exactly this many bytes follow.
    Length(usize),
    /// `Transfer-Encoding: chunked`.
    Chunked,
    /// Everything up to end of stream (responses only).
    UntilClose,
}

/// Inspect the parsed headers to decide how to read the body.
pub(crate) fn framing(
    kind: DocumentKind,
    status: u16,
    headers: &HeaderList<'_>,
    config: &ParserConfig,
) -> Result<Framing, ParseError> {
    if kind == DocumentKind::Response && !response_has_body(status) {
        return Ok(Framing::None);
    }

    // Transfer-Encoding takes precedence over Content-Length (RFC 9112 §6.1).
    // Only a final `chunked` coding frames the message.
    let chunked = headers
        .iter()
        .rev()
        .find(|h| h.name.as_bytes().eq_ignore_ascii_case(b"transfer-encoding"))
        .and_then(|h| h.value.as_bytes().rsplit(|&b| b == b',').next())
        .is_some_and(|coding| coding.trim_ascii().eq_ignore_ascii_case(b"chunked"));
    if chunked {
        return Ok(Framing::Chunked);
    }

    let mut lengths = headers
        .iter()
        .filter(|h| h.name.as_bytes().eq_ignore_ascii_case(b"content-length"))
        .map(|h| h.value.as_bytes().trim_ascii());

    let Some(first) = lengths.next() else {
        return Ok(match kind {
            DocumentKind::Request => Framing::None,
            DocumentKind::Response => Framing::UntilClose,
        });
    };

    // RFC 9112 §6.3: multiple differing Content-Length values are an error.
    if lengths.any(|other| other != first) {
        return Err(ParseError::InvalidContentLength(
            "multiple differing Content-Length values".into(),
        ));
    }

    let length = parse_content_length(first)?;
    if length > config.max_body_size {
        return Err(ParseError::BodyTooLarge(config.max_body_size));
    }
    Ok(if length == 0 {
        Framing::None
    } else {
        Framing::Length(length)
    })
}

fn parse_content_length(value: &[u8]) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidContentLength(ParseError::lossy(value));
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    std::str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)
}

/// 1xx, 204 and 304 responses never carry a body.
fn response_has_body(status: u16) -> bool {
    !((100..200).contains(&status) || status == 204 || status == 304)
}

// ---------------------------------------------------------------------------
// Chunked decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkState {
    Size,
    Ext,
    SizeLf,
    Data,
    DataCr,
    DataLf,
    TrailerStart,
    TrailerField,
    TrailerFieldLf,
    TrailerEndLf,
    Complete,
}

/// Outcome of a [`ChunkedDecoder::decode`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chunked {
    /// The terminating chunk and trailer section were consumed; the value is
    /// the number of input bytes used by this call.
    Complete(usize),
    /// All input was consumed and more is needed.
    Incomplete,
}

/// Incremental decoder for `Transfer-Encoding: chunked` bodies.
///
/// Chunk extensions are ignored and trailer fields are skipped. Both are
/// held to `max_line` bytes per line.
#[derive(Debug, Clone)]
pub(crate) struct ChunkedDecoder {
    state: ChunkState,
    size_buf: Vec<u8>,
    remaining: usize,
    data: Vec<u8>,
    max_size: usize,
    skipped: usize,
    max_line: usize,
}

impl ChunkedDecoder {
    pub(crate) fn new(max_size: usize, max_line: usize) -> Self {
        Self {
            state: ChunkState::Size,
            size_buf: Vec::with_capacity(16),
            remaining: 0,
            data: Vec::new(),
            max_size,
            skipped: 0,
            max_line,
        }
    }

    /// Decoded body bytes.
    pub(crate) fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn decode(&mut self, input: &[u8]) -> Result<Chunked, ParseError> {
        let mut i = 0;

        while i < input.len() {
            if self.state == ChunkState::Complete {
                break;
            }

            // Bulk copy for chunk payloads.
            if self.state == ChunkState::Data {
                let to_copy = (input.len() - i).min(self.remaining);
                self.data.extend_from_slice(&input[i..i + to_copy]);
                self.remaining -= to_copy;
                i += to_copy;
                if self.remaining == 0 {
                    self.state = ChunkState::DataCr;
                }
                continue;
            }

            let byte = input[i];
            i += 1;

            self.state = match self.state {
                ChunkState::Size => match byte {
                    b'\r' => {
                        self.apply_size()?;
                        ChunkState::SizeLf
                    }
                    b';' => {
                        self.apply_size()?;
                        self.skipped = 0;
                        ChunkState::Ext
                    }
                    b if b.is_ascii_hexdigit() => {
                        if self.size_buf.len() >= 16 {
                            return Err(ParseError::InvalidChunkSize(ParseError::lossy(
                                &self.size_buf,
                            )));
                        }
                        self.size_buf.push(b);
                        ChunkState::Size
                    }
                    found => {
                        return Err(ParseError::UnexpectedByte {
                            expected: "hex digit, ';', or CR in chunk size",
                            found,
                        });
                    }
                },

                // RFC 9112 §7.1.1: extensions are ignored.
                ChunkState::Ext => {
                    if byte == b'\r' {
                        ChunkState::SizeLf
                    } else {
                        self.skip_line_byte()?;
                        ChunkState::Ext
                    }
                }

                ChunkState::SizeLf => {
                    expect_byte(byte, b'\n', "LF after chunk size CR")?;
                    if self.remaining == 0 {
                        ChunkState::TrailerStart
                    } else {
                        ChunkState::Data
                    }
                }

                ChunkState::DataCr => {
                    expect_byte(byte, b'\r', "CR after chunk data")?;
                    ChunkState::DataLf
                }

                ChunkState::DataLf => {
                    expect_byte(byte, b'\n', "LF after chunk data CR")?;
                    self.size_buf.clear();
                    ChunkState::Size
                }

                ChunkState::TrailerStart => {
                    if byte == b'\r' {
                        ChunkState::TrailerEndLf
                    } else {
                        self.skipped = 0;
                        self.skip_line_byte()?;
                        ChunkState::TrailerField
                    }
                }

                ChunkState::TrailerField => {
                    if byte == b'\r' {
                        ChunkState::TrailerFieldLf
                    } else {
                        self.skip_line_byte()?;
                        ChunkState::TrailerField
                    }
                }

                ChunkState::TrailerFieldLf => {
                    expect_byte(byte, b'\n', "LF after trailer field CR")?;
                    ChunkState::TrailerStart
                }

                ChunkState::TrailerEndLf => {
                    expect_byte(byte, b'\n', "LF after trailer-section end CR")?;
                    ChunkState::Complete
                }

                ChunkState::Data | ChunkState::Complete => {
                    unreachable!("handled before the byte-by-byte path")
                }
            };
        }

        if self.state == ChunkState::Complete {
            Ok(Chunked::Complete(i))
        } else {
            Ok(Chunked::Incomplete)
        }
    }

    /// Count one byte of an ignored extension or trailer line.
    fn skip_line_byte(&mut self) -> Result<(), ParseError> {
        self.skipped += 1;
        if self.skipped > self.max_line {
            return Err(ParseError::LineTooLong(self.max_line));
        }
        Ok(())
    }

    /// Parse the hex chunk size accumulated in `size_buf`.
    fn apply_size(&mut self) -> Result<(), ParseError> {
        let invalid = || ParseError::InvalidChunkSize(ParseError::lossy(&self.size_buf));
        if self.size_buf.is_empty() {
            return Err(invalid());
        }
        let size = std::str::from_utf8(&self.size_buf)
            .ok()
            .and_then(|s| usize::from_str_radix(s, 16).ok())
            .ok_or_else(invalid)?;

        if self.data.len().saturating_add(size) > self.max_size {
            return Err(ParseError::BodyTooLarge(self.max_size));
        }
        self.remaining = size;
        Ok(())
    }
}

fn expect_byte(found: u8, want: u8, expected: &'static str) -> Result<(), ParseError> {
    if found == want {
        Ok(())
    } else {
        Err(ParseError::UnexpectedByte { expected, found })
    }
}
