use std::ops::Range;

use memchr::memchr;
use tracing::{debug, trace};

use crate::body::{self, Chunked, ChunkedDecoder, Framing};
use crate::document::Document;
use crate::error::ParseError;
use crate::scan::{
    find_crlf, find_space, is_tchar, is_uri_byte, parse_status_code, parse_version, skip_spaces,
    split_field, VERSION_LEN,
};
use crate::span::Span;
use crate::types::{DocumentKind, Header, Version};

// ---------------------------------------------------------------------------
// Parse status
// ---------------------------------------------------------------------------

/// Outcome of a successful [`Document::parse`] call.
///
/// Both variants carry the number of bytes of *this call's* input that were
/// consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// The message is complete. Bytes past the reported count belong to the
    /// next message (pipelining).
    Done(usize),
    /// Every byte was consumed and more input is needed. Feed the next
    /// fragment to the same document.
    Progress(usize),
}

impl ParseStatus {
    pub fn consumed(&self) -> usize {
        match *self {
            Self::Done(n) | Self::Progress(n) => n,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    // ---- Start line ----
    Init,
    Method,
    Uri,
    Version,
    Code,
    ReasonPhrase,

    // ---- Header block ----
    Fields,

    // ---- Body (only with body framing enabled) ----
    FixedBody { remaining: usize },
    ChunkedBody,
    CloseDelimited,

    // ---- Done ----
    Done,
}

/// Resumable parser state owned by a [`Document`].
#[derive(Debug, Clone)]
pub(crate) struct ParseState {
    phase: Phase,
    /// Bytes of an unfinished token from the previous fragment.
    carry: Vec<u8>,
    error: Option<ParseError>,
    chunked: Option<ChunkedDecoder>,
}

impl ParseState {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Init,
            carry: Vec::new(),
            error: None,
            chunked: None,
        }
    }

    /// The previous message is over, successfully or not.
    fn is_finished(&self) -> bool {
        self.phase == Phase::Done || self.error.is_some()
    }
}

/// The bytes currently being scanned.
///
/// A fragment window can hand out borrowed spans. A joined window
/// (carry-over + start of the new fragment) is a temporary buffer, so spans
/// taken from it are owned copies.
struct Window<'a, 'w> {
    bytes: &'w [u8],
    fragment: Option<&'a [u8]>,
}

impl<'a, 'w> Window<'a, 'w> {
    fn fragment(input: &'a [u8]) -> Self
    where
        'a: 'w,
    {
        Self {
            bytes: input,
            fragment: Some(input),
        }
    }

    fn joined(bytes: &'w [u8]) -> Self {
        Self {
            bytes,
            fragment: None,
        }
    }

    fn span(&self, range: Range<usize>) -> Span<'a> {
        match self.fragment {
            Some(source) => Span::slice_of(source, range),
            None => Span::owned(self.bytes[range].to_vec()),
        }
    }
}

enum Step {
    /// A token was applied; run the next phase.
    Continue,
    /// The window ran out before the current token ended.
    NeedMore,
    /// The message is complete.
    Complete,
}

enum Drive {
    Complete(usize),
    Exhausted,
}

// ---------------------------------------------------------------------------
// Parser entry points
// ---------------------------------------------------------------------------

impl<'a> Document<'a> {
    /// Feed the next fragment of the byte stream.
    ///
    /// Returns [`ParseStatus::Done`] with the bytes of `input` that belong to
    /// the message once it is complete, or [`ParseStatus::Progress`] when all
    /// of `input` was consumed and more is needed.
    ///
    /// Calling `parse` after the message is done, or after it failed, starts
    /// a fresh message: the previous content is cleared first.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the input is malformed. The error is also
    /// kept in [`Document::parse_error`].
    pub fn parse(&mut self, input: &'a [u8]) -> Result<ParseStatus, ParseError> {
        if self.state.is_finished() {
            self.reset();
        }
        if self.state.phase == Phase::Init {
            self.clear_content();
        }

        match self.parse_fragment(input) {
            Ok(status) => {
                if status.is_done() {
                    debug!(kind = %self.kind, consumed = status.consumed(), "message complete");
                }
                Ok(status)
            }
            Err(err) => {
                debug!(kind = %self.kind, phase = ?self.state.phase, error = %err, "parse failed");
                self.state.carry.clear();
                self.state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Signal end of stream.
    ///
    /// Completes a response whose body is delimited by connection close.
    /// Returns `true` if the message is complete now.
    pub fn parse_eof(&mut self) -> bool {
        if self.state.error.is_some() {
            return false;
        }
        match self.state.phase {
            Phase::Done => true,
            Phase::CloseDelimited => {
                self.enter(Phase::Done);
                debug!(kind = %self.kind, "message complete at end of stream");
                true
            }
            _ => false,
        }
    }

    /// Discard all parsed content and parser state.
    pub fn reset(&mut self) {
        self.state = ParseState::new();
        self.clear_content();
    }

    /// `true` once a whole message has been parsed without error.
    pub fn is_done(&self) -> bool {
        self.state.phase == Phase::Done && self.state.error.is_none()
    }

    /// The error that ended the current message, if any.
    pub fn parse_error(&self) -> Option<&ParseError> {
        self.state.error.as_ref()
    }

    fn parse_fragment(&mut self, input: &'a [u8]) -> Result<ParseStatus, ParseError> {
        let mut offset = 0;

        if !self.state.carry.is_empty() {
            // Every pending token ends on the current line, so only the bytes
            // up to the first LF need to be joined with the carry-over.
            let carried = self.state.carry.len();
            let line_end = memchr(b'\n', input).map_or(input.len(), |i| i + 1);
            let mut joined = std::mem::take(&mut self.state.carry);
            joined.extend_from_slice(&input[..line_end]);
            trace!(carried, joined = joined.len(), "resuming from carry-over");

            if let Drive::Complete(at) = self.drive(&Window::joined(&joined), 0)? {
                return Ok(ParseStatus::Done(at.saturating_sub(carried)));
            }
            offset = line_end;
        }

        match self.drive(&Window::fragment(input), offset)? {
            Drive::Complete(at) => Ok(ParseStatus::Done(at)),
            Drive::Exhausted => Ok(ParseStatus::Progress(input.len())),
        }
    }

    fn drive(&mut self, window: &Window<'a, '_>, mut pos: usize) -> Result<Drive, ParseError> {
        loop {
            match self.step(window, &mut pos)? {
                Step::Continue => {}
                Step::Complete => return Ok(Drive::Complete(pos)),
                Step::NeedMore => {
                    let pending = &window.bytes[pos..];
                    // A trailing CR belongs to the terminator, not the token.
                    let token_len = match pending {
                        [token @ .., b'\r'] => token.len(),
                        _ => pending.len(),
                    };
                    if self.state.carry.len() + token_len > self.config.max_line_len {
                        return Err(ParseError::LineTooLong(self.config.max_line_len));
                    }
                    if !pending.is_empty() {
                        trace!(phase = ?self.state.phase, bytes = pending.len(), "carrying over");
                        self.state.carry.extend_from_slice(pending);
                    }
                    return Ok(Drive::Exhausted);
                }
            }
        }
    }

    fn enter(&mut self, next: Phase) {
        trace!(from = ?self.state.phase, to = ?next, "phase transition");
        self.state.phase = next;
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    /// Run the current phase once. A phase either applies a whole token and
    /// advances `pos`, or leaves both the document and `pos` untouched.
    fn step(&mut self, window: &Window<'a, '_>, pos: &mut usize) -> Result<Step, ParseError> {
        let buf = window.bytes;

        match self.state.phase {
            Phase::Init => {
                *pos = skip_spaces(buf, *pos);
                if *pos == buf.len() {
                    return Ok(Step::NeedMore);
                }
                self.enter(match self.kind {
                    DocumentKind::Request => Phase::Method,
                    DocumentKind::Response => Phase::Version,
                });
                Ok(Step::Continue)
            }

            // ===================== REQUEST LINE =====================
            Phase::Method => {
                let space = find_space(buf, *pos);
                let token = &buf[*pos..space.unwrap_or(buf.len())];
                self.check_line(token.len())?;
                if !token.iter().all(|&b| is_tchar(b)) {
                    return Err(ParseError::InvalidMethod(ParseError::lossy(token)));
                }
                let Some(space) = space else {
                    return Ok(Step::NeedMore);
                };
                if token.is_empty() {
                    return Err(ParseError::InvalidMethod(String::new()));
                }
                self.method = window.span(*pos..space);
                *pos = space + 1;
                self.enter(Phase::Uri);
                Ok(Step::Continue)
            }

            Phase::Uri => {
                let space = find_space(buf, *pos);
                // Include the space so a CR right before it is caught.
                let scan_end = space.map_or(buf.len(), |s| s + 1);
                let crlf = find_crlf(&buf[..scan_end], *pos)?;

                match (crlf, space) {
                    // Request line ended without a version: HTTP/0.9.
                    (Some(cr), _) => {
                        if !self.config.allow_http09 {
                            return Err(ParseError::InvalidVersion(String::new()));
                        }
                        self.uri = self.uri_token(window, *pos..cr)?;
                        self.version = Version::HTTP_09;
                        *pos = cr + 2;
                        self.enter(Phase::Fields);
                        Ok(Step::Continue)
                    }
                    (None, Some(space)) => {
                        self.uri = self.uri_token(window, *pos..space)?;
                        *pos = space + 1;
                        self.enter(Phase::Version);
                        Ok(Step::Continue)
                    }
                    (None, None) => {
                        if buf.get(*pos).is_some_and(|&b| b != b'/') {
                            return Err(ParseError::InvalidUri(ParseError::lossy(&buf[*pos..])));
                        }
                        Ok(Step::NeedMore)
                    }
                }
            }

            Phase::Version if self.kind == DocumentKind::Request => match find_crlf(buf, *pos)? {
                Some(cr) => {
                    self.version = parse_version(&buf[*pos..cr])?;
                    *pos = cr + 2;
                    self.enter(Phase::Fields);
                    Ok(Step::Continue)
                }
                None if buf.len() - *pos > VERSION_LEN + 1 => Err(ParseError::InvalidVersion(
                    ParseError::lossy(&buf[*pos..]),
                )),
                None => Ok(Step::NeedMore),
            },

            // ===================== STATUS LINE =====================
            Phase::Version => {
                let rest = &buf[*pos..];
                if rest.len() <= VERSION_LEN {
                    // Reject early unless the bytes so far fit `HTTP/d.d`.
                    let fits = rest.iter().zip(b"HTTP/0.0").all(|(&b, &want)| {
                        if want == b'0' { b.is_ascii_digit() } else { b == want }
                    });
                    if !fits {
                        return Err(ParseError::InvalidVersion(ParseError::lossy(rest)));
                    }
                    return Ok(Step::NeedMore);
                }
                let version = parse_version(&rest[..VERSION_LEN])?;
                if rest[VERSION_LEN] != b' ' {
                    return Err(ParseError::InvalidVersion(ParseError::lossy(
                        &rest[..=VERSION_LEN],
                    )));
                }
                self.version = version;
                *pos += VERSION_LEN + 1;
                self.enter(Phase::Code);
                Ok(Step::Continue)
            }

            Phase::Code => {
                let rest = &buf[*pos..];
                let seen = &rest[..rest.len().min(3)];
                // Status codes run from 100 to 999.
                if !seen.iter().all(u8::is_ascii_digit) || seen.first() == Some(&b'0') {
                    return Err(ParseError::InvalidStatusCode(ParseError::lossy(seen)));
                }
                if rest.len() < 4 {
                    return Ok(Step::NeedMore);
                }
                let status = parse_status_code(&rest[..3])?;
                let advance = match rest[3] {
                    b' ' => 4,
                    // `HTTP/1.1 200\r\n`: no reason phrase at all.
                    b'\r' if self.config.allow_empty_reason => 3,
                    b'\r' => return Err(ParseError::EmptyReason),
                    _ => {
                        return Err(ParseError::InvalidStatusCode(ParseError::lossy(&rest[..4])));
                    }
                };
                self.status = status;
                *pos += advance;
                self.enter(Phase::ReasonPhrase);
                Ok(Step::Continue)
            }

            Phase::ReasonPhrase => match find_crlf(buf, *pos)? {
                Some(cr) => {
                    if cr == *pos && !self.config.allow_empty_reason {
                        return Err(ParseError::EmptyReason);
                    }
                    self.check_line(cr - *pos)?;
                    self.reason = window.span(*pos..cr);
                    *pos = cr + 2;
                    self.enter(Phase::Fields);
                    Ok(Step::Continue)
                }
                None => Ok(Step::NeedMore),
            },

            // ===================== HEADERS =====================
            Phase::Fields => match find_crlf(buf, *pos)? {
                None => Ok(Step::NeedMore),
                Some(cr) if cr == *pos => {
                    *pos = cr + 2;
                    self.finish_headers()
                }
                Some(cr) => {
                    self.check_line(cr - *pos)?;
                    if self.headers.len() >= self.config.max_headers {
                        return Err(ParseError::TooManyHeaders(self.config.max_headers));
                    }
                    let (name, value) =
                        split_field(&buf[*pos..cr], self.config.lenient_field_separator)?;
                    let base = *pos;
                    self.headers.push(Header {
                        name: window.span(base + name.start..base + name.end),
                        value: window.span(base + value.start..base + value.end),
                    });
                    *pos = cr + 2;
                    Ok(Step::Continue)
                }
            },

            // ===================== BODY =====================
            Phase::FixedBody { remaining } => {
                let take = (buf.len() - *pos).min(remaining);
                if take == 0 {
                    return Ok(Step::NeedMore);
                }
                self.append_body(window, *pos..*pos + take);
                *pos += take;
                if take == remaining {
                    self.enter(Phase::Done);
                    Ok(Step::Complete)
                } else {
                    self.state.phase = Phase::FixedBody {
                        remaining: remaining - take,
                    };
                    Ok(Step::NeedMore)
                }
            }

            Phase::ChunkedBody => {
                let (max_body_size, max_line_len) =
                    (self.config.max_body_size, self.config.max_line_len);
                let decoder = self
                    .state
                    .chunked
                    .get_or_insert_with(|| ChunkedDecoder::new(max_body_size, max_line_len));
                match decoder.decode(&buf[*pos..])? {
                    Chunked::Incomplete => {
                        *pos = buf.len();
                        Ok(Step::NeedMore)
                    }
                    Chunked::Complete(used) => {
                        *pos += used;
                        let data = self
                            .state
                            .chunked
                            .take()
                            .map(ChunkedDecoder::into_data)
                            .unwrap_or_default();
                        self.body = (!data.is_empty()).then(|| Span::owned(data));
                        self.enter(Phase::Done);
                        Ok(Step::Complete)
                    }
                }
            }

            Phase::CloseDelimited => {
                let take = buf.len() - *pos;
                if take > 0 {
                    let have = self.body.as_ref().map_or(0, Span::len);
                    if have + take > self.config.max_body_size {
                        return Err(ParseError::BodyTooLarge(self.config.max_body_size));
                    }
                    self.append_body(window, *pos..buf.len());
                    *pos = buf.len();
                }
                Ok(Step::NeedMore)
            }

            Phase::Done => Ok(Step::Complete),
        }
    }

    // ----- helpers --------------------------------------------------------

    fn uri_token(&self, window: &Window<'a, '_>, range: Range<usize>) -> Result<Span<'a>, ParseError> {
        let token = &window.bytes[range.clone()];
        self.check_line(token.len())?;
        if token.first() != Some(&b'/') || !token.iter().all(|&b| is_uri_byte(b)) {
            return Err(ParseError::InvalidUri(ParseError::lossy(token)));
        }
        Ok(window.span(range))
    }

    fn check_line(&self, len: usize) -> Result<(), ParseError> {
        if len > self.config.max_line_len {
            Err(ParseError::LineTooLong(self.config.max_line_len))
        } else {
            Ok(())
        }
    }

    /// Decide body handling once the blank line has been consumed.
    fn finish_headers(&mut self) -> Result<Step, ParseError> {
        if !self.config.frame_bodies {
            self.enter(Phase::Done);
            return Ok(Step::Complete);
        }
        match body::framing(self.kind, self.status, &self.headers, &self.config)? {
            Framing::None => {
                self.enter(Phase::Done);
                Ok(Step::Complete)
            }
            Framing::Length(remaining) => {
                self.enter(Phase::FixedBody { remaining });
                Ok(Step::Continue)
            }
            Framing::Chunked => {
                self.state.chunked = Some(ChunkedDecoder::new(
                    self.config.max_body_size,
                    self.config.max_line_len,
                ));
                self.enter(Phase::ChunkedBody);
                Ok(Step::Continue)
            }
            Framing::UntilClose => {
                self.enter(Phase::CloseDelimited);
                Ok(Step::Continue)
            }
        }
    }

    /// Borrow the body when it fits in one fragment, otherwise accumulate.
    fn append_body(&mut self, window: &Window<'a, '_>, range: Range<usize>) {
        match &mut self.body {
            Some(body) => body.append(&window.bytes[range]),
            None => self.body = Some(window.span(range)),
        }
    }
}
