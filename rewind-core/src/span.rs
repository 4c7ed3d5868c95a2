//! Source positions for events and errors.

use std::fmt;

/// Half-open byte range `[start, end)` into the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset`.
    #[inline]
    pub fn point(offset: u32) -> Self {
        Self { start: offset, end: offset }
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn join(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Resolve the start of this span to a line/column pair in `input`.
    pub fn location(&self, input: &[u8]) -> Location {
        Location::from_offset(input, self.start as usize)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// 1-based line and column (columns count bytes, not characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Compute the location of byte `offset` in `input`.
    ///
    /// Offsets past the end clamp to the end of input.
    pub fn from_offset(input: &[u8], offset: usize) -> Self {
        let prefix = &input[..offset.min(input.len())];
        let line = memchr::memchr_iter(b'\n', prefix).count() as u32 + 1;
        let line_start = memchr::memrchr(b'\n', prefix).map_or(0, |nl| nl + 1);
        Self {
            line,
            column: (prefix.len() - line_start) as u32 + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
