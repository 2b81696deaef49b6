use serde::{Serialize, Serializer};
use std::fmt;

use crate::span::Span;

// ---------------------------------------------------------------------------
// DocumentKind
// ---------------------------------------------------------------------------

/// Whether a [`Document`](crate::Document) holds a request or a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Request,
    Response,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// HTTP protocol version. Both components are single decimal digits on the
/// wire; values above 9 make a document uninitialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const HTTP_09: Self = Self::new(0, 9);
    pub const HTTP_10: Self = Self::new(1, 0);
    pub const HTTP_11: Self = Self::new(1, 1);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Both components fit in one digit.
    pub fn is_valid(&self) -> bool {
        self.major <= 9 && self.minor <= 9
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::HTTP_11
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// A single header field. Name casing is preserved as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header<'a> {
    pub name: Span<'a>,
    pub value: Span<'a>,
}

impl<'a> Header<'a> {
    pub fn new(name: impl Into<Span<'a>>, value: impl Into<Span<'a>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// HeaderList
// ---------------------------------------------------------------------------

/// Ordered header fields.
///
/// Duplicates are kept in arrival order. Lookups compare names exactly as
/// stored; case-insensitive matching is available through
/// [`HeaderList::get_ignore_case`] for callers that want it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HeaderList<'a> {
    entries: Vec<Header<'a>>,
}

impl<'a> HeaderList<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Header<'a>> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Value of the first header named exactly `name`.
    pub fn get(&self, name: &str) -> Option<&Span<'a>> {
        self.entries
            .iter()
            .find(|h| h.name == name)
            .map(|h| &h.value)
    }

    /// Values of every header named exactly `name`, in order.
    pub fn get_all<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Span<'a>> + 's {
        self.entries
            .iter()
            .filter(move |h| h.name == name)
            .map(|h| &h.value)
    }

    /// Value of the first header whose name matches `name` ignoring ASCII case.
    pub fn get_ignore_case(&self, name: &str) -> Option<&Span<'a>> {
        self.entries
            .iter()
            .find(|h| h.name.as_bytes().eq_ignore_ascii_case(name.as_bytes()))
            .map(|h| &h.value)
    }

    /// Overwrite the value of the first header named `name`, or append a new
    /// header if there is none.
    pub fn set(&mut self, name: impl Into<Span<'a>>, value: impl Into<Span<'a>>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|h| h.name == name) {
            Some(existing) => existing.value = value,
            None => self.entries.push(Header { name, value }),
        }
    }

    /// Append a header, keeping any existing ones with the same name.
    pub fn append(&mut self, name: impl Into<Span<'a>>, value: impl Into<Span<'a>>) {
        self.entries.push(Header::new(name, value));
    }

    pub(crate) fn push(&mut self, header: Header<'a>) {
        self.entries.push(header);
    }

    /// Promote every name and value to owned storage.
    pub fn promote(&mut self) {
        for header in &mut self.entries {
            header.name.promote();
            header.value.promote();
        }
    }

    /// Deep copy with every span owned.
    pub fn to_owned_list<'b>(&self) -> HeaderList<'b> {
        HeaderList {
            entries: self
                .entries
                .iter()
                .map(|h| Header {
                    name: h.name.to_owned_span(),
                    value: h.value.to_owned_span(),
                })
                .collect(),
        }
    }
}

impl<'l, 'a> IntoIterator for &'l HeaderList<'a> {
    type Item = &'l Header<'a>;
    type IntoIter = std::slice::Iter<'l, Header<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
