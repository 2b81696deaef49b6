use thiserror::Error;

use crate::types::DocumentKind;

/// A structural violation found while parsing.
///
/// Every variant except [`ParseError::Incomplete`] means the current message
/// is malformed: the document keeps the error in
/// [`Document::parse_error`](crate::Document::parse_error) until it is reset
/// or the next `parse` call starts a fresh message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The request method is empty or contains a non-token byte.
    #[error("invalid request method: '{0}'")]
    InvalidMethod(String),

    /// The request URI is empty or does not start with `/`.
    #[error("invalid request URI: '{0}'")]
    InvalidUri(String),

    /// The version is not `HTTP/<digit>.<digit>`.
    #[error("invalid HTTP version: '{0}'")]
    InvalidVersion(String),

    /// The status code is not exactly three ASCII digits.
    #[error("invalid status code: '{0}'")]
    InvalidStatusCode(String),

    /// The status line carries no reason phrase.
    #[error("empty reason phrase")]
    EmptyReason,

    /// A header line has no `:` or the `:` is not followed by exactly one SP.
    #[error("invalid header line: '{0}'")]
    InvalidHeader(String),

    /// A bare LF, or a CR followed by anything but LF.
    #[error("unexpected byte 0x{found:02X} (expected {expected})")]
    UnexpectedByte {
        /// Human-readable description of what was expected.
        expected: &'static str,
        /// The byte actually found.
        found: u8,
    },

    /// `Content-Length` is not a number, or several values disagree.
    #[error("invalid Content-Length: '{0}'")]
    InvalidContentLength(String),

    /// A chunk-size line is not valid hexadecimal.
    #[error("invalid chunk size: '{0}'")]
    InvalidChunkSize(String),

    /// A start-line or header line exceeds the configured maximum.
    #[error("line exceeds maximum allowed length of {0} bytes")]
    LineTooLong(usize),

    /// More header lines than the configured maximum.
    #[error("number of headers exceeds maximum of {0}")]
    TooManyHeaders(usize),

    /// The body exceeds the configured maximum.
    #[error("body exceeds maximum allowed size of {0} bytes")]
    BodyTooLarge(usize),

    /// The input ended before the message was complete. Only the one-shot
    /// helpers report this; the streaming API reports `Progress` instead.
    #[error("incomplete HTTP message")]
    Incomplete,
}

impl ParseError {
    /// `true` for every structural error, `false` for [`ParseError::Incomplete`].
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Incomplete)
    }

    pub(crate) fn lossy(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// Failures of the document-level operations (serialization, copying).
///
/// These are local and recoverable: fix the document or the buffer and try
/// again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("document is missing mandatory fields")]
    NotInitialized,

    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("cannot copy a {from:?} document into a {into:?} document")]
    KindMismatch {
        from: DocumentKind,
        into: DocumentKind,
    },
}

/// Errors raised while loading a [`ParserConfig`](crate::ParserConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
