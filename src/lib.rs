//! # httpspan
//!
//! A **resumable HTTP/1.x message parser** with zero-copy field references
//! and an exact-size serializer.
//!
//! Messages can arrive in arbitrary fragments (as from a socket). Each call
//! to [`Document::parse`] either completes the message, reports
//! [`ParseStatus::Progress`] after consuming the whole fragment, or fails
//! with a [`ParseError`]. Parsed fields are [`Span`]s that borrow the
//! fragment they came from. A token split across two fragments is
//! reassembled in a small carry-over buffer and stored as an owned copy.
//!
//! ## Quick start: one-shot parsing
//!
//! ```rust
//! use httpspan::parse_request;
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = parse_request(raw).expect("valid request");
//! assert_eq!(request.method(), "GET");
//! assert_eq!(request.uri(), "/hello");
//! ```
//!
//! ## Quick start: incremental parsing
//!
//! ```rust
//! use httpspan::{Document, ParseStatus};
//!
//! let first = b"GET / HTTP/1.1\r\nHo";
//! let second = b"st: example.com\r\n\r\n";
//!
//! let mut doc = Document::request();
//! assert_eq!(doc.parse(first).unwrap(), ParseStatus::Progress(first.len()));
//! assert_eq!(doc.parse(second).unwrap(), ParseStatus::Done(second.len()));
//! assert_eq!(doc.field("Host").unwrap(), "example.com");
//! ```
//!
//! ## Quick start: serialization
//!
//! ```rust
//! use httpspan::Document;
//!
//! let mut doc = Document::response();
//! doc.set_status(200);
//! doc.set_reason("OK");
//! doc.set_field("Content-Length", "5");
//! doc.set_body("hello");
//!
//! let wire = doc.serialize_to_vec().unwrap();
//! assert_eq!(wire.len(), doc.byte_size());
//! assert_eq!(wire, b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello");
//! ```

mod body;
mod config;
mod document;
mod error;
mod output;
mod parser;
pub mod scan;
mod serialize;
mod span;
mod types;

// Re-export public API.
pub use config::ParserConfig;
pub use document::Document;
pub use error::{ConfigError, DocumentError, ParseError};
pub use output::{format_debug, format_headers_only, format_json};
pub use parser::ParseStatus;
pub use span::Span;
pub use types::{DocumentKind, Header, HeaderList, Version};

/// Parse a **complete** HTTP request from a byte slice in one call.
///
/// This is a convenience wrapper around [`Document::parse`]. For streaming
/// use-cases, create a `Document` directly.
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed, or
/// [`ParseError::Incomplete`] if it ends early.
pub fn parse_request(data: &[u8]) -> Result<Document<'_>, ParseError> {
    parse_complete(data, DocumentKind::Request, ParserConfig::default())
}

/// Parse a **complete** HTTP response from a byte slice in one call.
///
/// The end of `data` is treated as end of stream, so responses delimited by
/// connection close are accepted.
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed or incomplete.
pub fn parse_response(data: &[u8]) -> Result<Document<'_>, ParseError> {
    parse_complete(data, DocumentKind::Response, ParserConfig::default())
}

/// Parse a **complete** message of the given kind with a custom
/// [`ParserConfig`].
///
/// # Errors
///
/// Returns [`ParseError`] if the data is malformed, incomplete, or exceeds
/// the configured limits.
pub fn parse_with_config(
    data: &[u8],
    kind: DocumentKind,
    config: ParserConfig,
) -> Result<Document<'_>, ParseError> {
    parse_complete(data, kind, config)
}

fn parse_complete(
    data: &[u8],
    kind: DocumentKind,
    config: ParserConfig,
) -> Result<Document<'_>, ParseError> {
    let mut doc = Document::with_config(kind, config);
    match doc.parse(data)? {
        ParseStatus::Done(_) => Ok(doc),
        ParseStatus::Progress(_) if doc.parse_eof() => Ok(doc),
        ParseStatus::Progress(_) => Err(ParseError::Incomplete),
    }
}
