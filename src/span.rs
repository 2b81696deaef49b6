use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

// ---------------------------------------------------------------------------
// Span
// ---------------------------------------------------------------------------

/// A byte range that either borrows caller memory or owns a private copy.
///
/// Parsed fields start out as borrowed views into the fragment handed to
/// [`Document::parse`](crate::Document::parse). The lifetime `'a` ties every
/// borrowed span to that fragment, so a span can never be read after its
/// buffer is gone. Call [`Span::promote`] or [`Span::into_owned`] to detach a
/// span from the buffer.
///
/// Equality compares content only: a borrowed span equals an owned span
/// holding the same bytes.
#[derive(Clone)]
pub struct Span<'a> {
    repr: Repr<'a>,
}

#[derive(Clone)]
enum Repr<'a> {
    Borrowed {
        source: &'a [u8],
        start: usize,
        end: usize,
    },
    Owned(Vec<u8>),
}

impl<'a> Span<'a> {
    /// An empty span. Does not allocate.
    pub const fn empty() -> Self {
        Self {
            repr: Repr::Borrowed {
                source: &[],
                start: 0,
                end: 0,
            },
        }
    }

    /// Borrow the whole of `source` without copying.
    pub fn borrowed(source: &'a [u8]) -> Self {
        Self {
            repr: Repr::Borrowed {
                source,
                start: 0,
                end: source.len(),
            },
        }
    }

    /// Borrow `range` of `source`. Returns `None` if the range is out of
    /// bounds or inverted.
    pub fn from_range(source: &'a [u8], range: Range<usize>) -> Option<Self> {
        source.get(range.clone())?;
        Some(Self {
            repr: Repr::Borrowed {
                source,
                start: range.start,
                end: range.end,
            },
        })
    }

    /// Take ownership of `bytes`.
    pub fn owned(bytes: Vec<u8>) -> Self {
        Self {
            repr: Repr::Owned(bytes),
        }
    }

    /// Parser-internal constructor; `range` is known to lie inside `source`.
    pub(crate) fn slice_of(source: &'a [u8], range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= source.len());
        Self {
            repr: Repr::Borrowed {
                source,
                start: range.start,
                end: range.end,
            },
        }
    }

    /// The referenced bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.repr {
            Repr::Borrowed { source, start, end } => source.get(*start..*end).unwrap_or(&[]),
            Repr::Owned(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Borrowed { start, end, .. } => end - start,
            Repr::Owned(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` while the span still points into an external buffer.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.repr, Repr::Borrowed { .. })
    }

    /// `true` once the span holds its own copy.
    pub fn is_owned(&self) -> bool {
        !self.is_borrowed()
    }

    /// The content as `&str` if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// The content as UTF-8, replacing invalid sequences.
    pub fn to_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Copy borrowed content into a private buffer. No-op when already owned.
    pub fn promote(&mut self) {
        if let Repr::Borrowed { .. } = self.repr {
            self.repr = Repr::Owned(self.as_bytes().to_vec());
        }
    }

    /// Detach from the source buffer entirely.
    pub fn into_owned(self) -> Span<'static> {
        match self.repr {
            Repr::Owned(bytes) => Span::owned(bytes),
            Repr::Borrowed { source, start, end } => {
                Span::owned(source.get(start..end).unwrap_or(&[]).to_vec())
            }
        }
    }

    /// An owned deep copy, usable at any lifetime.
    pub fn to_owned_span<'b>(&self) -> Span<'b> {
        Span::owned(self.as_bytes().to_vec())
    }

    /// Append `bytes` to the span.
    ///
    /// When the span is borrowed and `bytes` is exactly the region that
    /// follows it in the same source buffer, the borrow is widened in place.
    /// Anything else promotes the span to an owned buffer sized for the
    /// combined content.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        match &mut self.repr {
            Repr::Borrowed { source, start, end } => {
                let tail = &source[*end..];
                if bytes.len() <= tail.len() && std::ptr::eq(bytes.as_ptr(), tail.as_ptr()) {
                    *end += bytes.len();
                    return;
                }
                let mut joined = Vec::with_capacity(*end - *start + bytes.len());
                joined.extend_from_slice(&source[*start..*end]);
                joined.extend_from_slice(bytes);
                self.repr = Repr::Owned(joined);
            }
            Repr::Owned(owned) => {
                owned.reserve_exact(bytes.len());
                owned.extend_from_slice(bytes);
            }
        }
    }

    /// Append another span, see [`Span::append`].
    pub fn append_span(&mut self, other: &Span<'_>) {
        self.append(other.as_bytes());
    }
}

impl Default for Span<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_borrowed() { "borrowed" } else { "owned" };
        write!(f, "Span({mode}, {:?})", self.to_str_lossy())
    }
}

impl fmt::Display for Span<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl Serialize for Span<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_str_lossy())
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl<'a> From<&'a str> for Span<'a> {
    fn from(s: &'a str) -> Self {
        Self::borrowed(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Span<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::borrowed(bytes)
    }
}

impl From<String> for Span<'_> {
    fn from(s: String) -> Self {
        Self::owned(s.into_bytes())
    }
}

impl From<Vec<u8>> for Span<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Self::owned(bytes)
    }
}

// ---------------------------------------------------------------------------
// Content equality
// ---------------------------------------------------------------------------

impl PartialEq<Span<'_>> for Span<'_> {
    fn eq(&self, other: &Span<'_>) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Span<'_> {}

impl PartialEq<[u8]> for Span<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for Span<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl PartialEq<str> for Span<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for Span<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<String> for Span<'_> {
    fn eq(&self, other: &String) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<Span<'_>> for str {
    fn eq(&self, other: &Span<'_>) -> bool {
        other == self
    }
}

impl PartialEq<Span<'_>> for &str {
    fn eq(&self, other: &Span<'_>) -> bool {
        other == *self
    }
}

impl PartialEq<Span<'_>> for String {
    fn eq(&self, other: &Span<'_>) -> bool {
        other == self
    }
}
