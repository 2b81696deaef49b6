use crate::document::Document;
use crate::error::DocumentError;
use crate::scan::{decimal_width, VERSION_LEN};
use crate::span::Span;
use crate::types::{DocumentKind, Version};

const CRLF: &[u8] = b"\r\n";
const FIELD_SEPARATOR: &[u8] = b": ";

/// Status codes are written with at least three digits.
const STATUS_MIN_WIDTH: usize = 3;

impl Document<'_> {
    /// Exact number of bytes [`Document::serialize`] writes, or 0 when the
    /// document is not initialized.
    pub fn byte_size(&self) -> usize {
        if !self.is_initialized() {
            return 0;
        }

        let start_line = match self.kind {
            // METHOD SP URI SP HTTP/x.y CRLF
            DocumentKind::Request => {
                self.method.len() + 1 + self.uri.len() + 1 + VERSION_LEN + CRLF.len()
            }
            // HTTP/x.y SP CODE SP REASON CRLF
            DocumentKind::Response => {
                VERSION_LEN + 1 + status_width(self.status) + 1 + self.reason.len() + CRLF.len()
            }
        };

        let fields: usize = self
            .headers
            .iter()
            .map(|h| h.name.len() + FIELD_SEPARATOR.len() + h.value.len() + CRLF.len())
            .sum();

        start_line + fields + CRLF.len() + self.body.as_ref().map_or(0, Span::len)
    }

    /// Write the wire form into `buf` and return the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotInitialized`] if mandatory fields are missing,
    /// [`DocumentError::BufferTooSmall`] if `buf` is shorter than
    /// [`Document::byte_size`]. Nothing is written in either case.
    pub fn serialize(&self, buf: &mut [u8]) -> Result<usize, DocumentError> {
        if !self.is_initialized() {
            return Err(DocumentError::NotInitialized);
        }
        let needed = self.byte_size();
        if buf.len() < needed {
            return Err(DocumentError::BufferTooSmall {
                needed,
                available: buf.len(),
            });
        }

        let mut out = Writer { buf, pos: 0 };
        match self.kind {
            DocumentKind::Request => {
                out.put(self.method.as_bytes());
                out.put(b" ");
                out.put(self.uri.as_bytes());
                out.put(b" ");
                out.put_version(self.version);
            }
            DocumentKind::Response => {
                out.put_version(self.version);
                out.put(b" ");
                out.put_status(self.status);
                out.put(b" ");
                out.put(self.reason.as_bytes());
            }
        }
        out.put(CRLF);

        for header in &self.headers {
            out.put(header.name.as_bytes());
            out.put(FIELD_SEPARATOR);
            out.put(header.value.as_bytes());
            out.put(CRLF);
        }
        out.put(CRLF);

        if let Some(body) = &self.body {
            out.put(body.as_bytes());
        }

        debug_assert_eq!(out.pos, needed);
        Ok(out.pos)
    }

    /// Serialize into a freshly allocated buffer of exactly
    /// [`Document::byte_size`] bytes.
    pub fn serialize_to_vec(&self) -> Result<Vec<u8>, DocumentError> {
        let mut buf = vec![0; self.byte_size()];
        let written = self.serialize(&mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }
}

fn status_width(status: u16) -> usize {
    decimal_width(u32::from(status)).max(STATUS_MIN_WIDTH)
}

/// Bounds-checked sequential writes; callers size `buf` with `byte_size`.
struct Writer<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    fn put_version(&mut self, version: Version) {
        self.put(b"HTTP/");
        self.put(&[b'0' + version.major, b'.', b'0' + version.minor]);
    }

    /// Left-pad with zeros to the status width.
    fn put_status(&mut self, status: u16) {
        let width = status_width(status);
        let mut value = status;
        let end = self.pos + width;
        for slot in self.buf[self.pos..end].iter_mut().rev() {
            *slot = b'0' + (value % 10) as u8;
            value /= 10;
        }
        self.pos = end;
    }
}
