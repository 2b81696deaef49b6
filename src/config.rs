use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Limits and strictness switches for the parser.
///
/// All sizes are in bytes unless stated otherwise. Missing keys in a JSON
/// config file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum length of a start-line or header line, including the bytes
    /// held in the carry-over buffer (default: 8 192).
    pub max_line_len: usize,
    /// Maximum number of header fields (default: 128).
    pub max_headers: usize,
    /// Maximum body size when body framing is enabled (default: 10 MiB).
    pub max_body_size: usize,
    /// Accept `METHOD URI CRLF` request lines as HTTP/0.9 (default: true).
    pub allow_http09: bool,
    /// Accept status lines without a reason phrase (default: false).
    pub allow_empty_reason: bool,
    /// Accept any optional whitespace after the header colon instead of
    /// exactly one space (default: false).
    pub lenient_field_separator: bool,
    /// Read the message body after the header block using `Content-Length`,
    /// chunked coding or connection close (default: true). When disabled
    /// the parser stops right after the blank line.
    pub frame_bodies: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_line_len: 8_192,
            max_headers: 128,
            max_body_size: 10 * 1024 * 1024,
            allow_http09: true,
            allow_empty_reason: false,
            lenient_field_separator: false,
            frame_bodies: true,
        }
    }
}

impl ParserConfig {
    /// Parse a config from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
