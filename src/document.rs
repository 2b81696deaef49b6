use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::config::ParserConfig;
use crate::error::DocumentError;
use crate::parser::ParseState;
use crate::span::Span;
use crate::types::{DocumentKind, HeaderList, Version};

/// A parsed or hand-built HTTP/1.x message.
///
/// The kind (request or response) is fixed at construction. Request
/// documents use `method` and `uri`; response documents use `status` and
/// `reason`. The version, header list and body are shared.
///
/// Spans inside a document may borrow the last fragment handed to
/// [`Document::parse`]. The lifetime `'a` keeps that fragment alive for as
/// long as the document is; use [`Document::promote`],
/// [`Document::into_owned`] or [`Document::copy_to`] to drop the tie.
///
/// ```rust
/// use httpspan::{Document, ParseStatus};
///
/// let mut doc = Document::request();
/// let raw = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
/// assert_eq!(doc.parse(raw).unwrap(), ParseStatus::Done(raw.len()));
/// assert_eq!(doc.method(), "GET");
/// assert_eq!(doc.field("Host").unwrap(), "example.com");
/// ```
#[derive(Debug, Clone)]
pub struct Document<'a> {
    pub(crate) kind: DocumentKind,
    pub(crate) method: Span<'a>,
    pub(crate) uri: Span<'a>,
    pub(crate) status: u16,
    pub(crate) reason: Span<'a>,
    pub(crate) version: Version,
    pub(crate) headers: HeaderList<'a>,
    pub(crate) body: Option<Span<'a>>,
    pub(crate) config: ParserConfig,
    pub(crate) state: ParseState,
}

impl<'a> Document<'a> {
    /// Create an empty document of the given kind with default config.
    pub fn new(kind: DocumentKind) -> Self {
        Self::with_config(kind, ParserConfig::default())
    }

    /// Create an empty request document.
    pub fn request() -> Self {
        Self::new(DocumentKind::Request)
    }

    /// Create an empty response document.
    pub fn response() -> Self {
        Self::new(DocumentKind::Response)
    }

    pub fn with_config(kind: DocumentKind, config: ParserConfig) -> Self {
        Self {
            kind,
            method: Span::empty(),
            uri: Span::empty(),
            status: 0,
            reason: Span::empty(),
            version: Version::default(),
            headers: HeaderList::new(),
            body: None,
            config,
            state: ParseState::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // ----- start line -----------------------------------------------------

    pub fn method(&self) -> &Span<'a> {
        &self.method
    }

    pub fn set_method(&mut self, method: impl Into<Span<'a>>) {
        self.method = method.into();
    }

    pub fn uri(&self) -> &Span<'a> {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: impl Into<Span<'a>>) {
        self.uri = uri.into();
    }

    /// Status code of a response (0 until set or parsed).
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn reason(&self) -> &Span<'a> {
        &self.reason
    }

    pub fn set_reason(&mut self, reason: impl Into<Span<'a>>) {
        self.reason = reason.into();
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn set_major(&mut self, major: u8) {
        self.version.major = major;
    }

    pub fn set_minor(&mut self, minor: u8) {
        self.version.minor = minor;
    }

    // ----- headers --------------------------------------------------------

    pub fn headers(&self) -> &HeaderList<'a> {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderList<'a> {
        &mut self.headers
    }

    /// Value of the first header named exactly `name`.
    pub fn field(&self, name: &str) -> Option<&Span<'a>> {
        self.headers.get(name)
    }

    /// Overwrite the first header named `name`, or append it.
    pub fn set_field(&mut self, name: impl Into<Span<'a>>, value: impl Into<Span<'a>>) {
        self.headers.set(name, value);
    }

    /// Append a header even if one with the same name exists.
    pub fn add_field(&mut self, name: impl Into<Span<'a>>, value: impl Into<Span<'a>>) {
        self.headers.append(name, value);
    }

    // ----- body -----------------------------------------------------------

    pub fn body(&self) -> Option<&Span<'a>> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: impl Into<Span<'a>>) {
        self.body = Some(body.into());
    }

    pub fn clear_body(&mut self) {
        self.body = None;
    }

    // ----- validity & ownership ------------------------------------------

    /// `true` when every mandatory field for the document's kind is present
    /// and structurally valid, i.e. the document can be serialized.
    pub fn is_initialized(&self) -> bool {
        if !self.version.is_valid() {
            return false;
        }
        match self.kind {
            DocumentKind::Request => {
                !self.method.is_empty() && self.uri.as_bytes().first() == Some(&b'/')
            }
            DocumentKind::Response => {
                (100..=999).contains(&self.status)
                    && (!self.reason.is_empty() || self.config.allow_empty_reason)
            }
        }
    }

    /// Copy every borrowed span into owned storage, in place.
    pub fn promote(&mut self) {
        self.method.promote();
        self.uri.promote();
        self.reason.promote();
        self.headers.promote();
        if let Some(body) = &mut self.body {
            body.promote();
        }
    }

    /// Detach the document from every external buffer.
    ///
    /// The parse state is carried over, so a message that is still in
    /// progress can keep being fed.
    pub fn into_owned(self) -> Document<'static> {
        Document {
            kind: self.kind,
            method: self.method.into_owned(),
            uri: self.uri.into_owned(),
            status: self.status,
            reason: self.reason.into_owned(),
            version: self.version,
            headers: self.headers.to_owned_list(),
            body: self.body.map(Span::into_owned),
            config: self.config,
            state: self.state,
        }
    }

    /// Deep-copy this document's content into `dst`.
    ///
    /// Every span in `dst` ends up owned, so `dst` stays valid after this
    /// document and the buffers it borrows from are gone. `dst` keeps its own
    /// config; its parse state is reset.
    pub fn copy_to<'b>(&self, dst: &mut Document<'b>) -> Result<(), DocumentError> {
        if self.kind != dst.kind {
            return Err(DocumentError::KindMismatch {
                from: self.kind,
                into: dst.kind,
            });
        }
        dst.method = self.method.to_owned_span();
        dst.uri = self.uri.to_owned_span();
        dst.status = self.status;
        dst.reason = self.reason.to_owned_span();
        dst.version = self.version;
        dst.headers = self.headers.to_owned_list();
        dst.body = self.body.as_ref().map(Span::to_owned_span);
        dst.state = ParseState::new();
        Ok(())
    }

    /// Clear every content field, keeping kind and config.
    pub(crate) fn clear_content(&mut self) {
        self.method = Span::empty();
        self.uri = Span::empty();
        self.status = 0;
        self.reason = Span::empty();
        self.version = Version::default();
        self.headers.clear();
        self.body = None;
    }
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Document", 6)?;
        s.serialize_field("kind", &self.kind)?;
        match self.kind {
            DocumentKind::Request => {
                s.serialize_field("method", &self.method)?;
                s.serialize_field("uri", &self.uri)?;
            }
            DocumentKind::Response => {
                s.serialize_field("status", &self.status)?;
                s.serialize_field("reason", &self.reason)?;
            }
        }
        s.serialize_field("version", &self.version)?;
        s.serialize_field("headers", &self.headers)?;
        s.serialize_field("body", &self.body)?;
        s.end()
    }
}
