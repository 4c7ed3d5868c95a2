//! Error types shared by event sources and the buffering cursor.
//!
//! Two kinds of failure exist:
//! - [`StreamError`]: anything a producer reports while pulling events
//!   (malformed input, premature end, use after close). The cursor passes
//!   these through untouched.
//! - [`Error::IllegalState`]: caller misuse detected by the cursor itself.

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

use crate::span::Span;

/// Classification of a [`StreamError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StreamErrorCode {
    /// The source (or the cursor wrapping it) has been closed
    Closed = 0,
    /// An event was requested but the stream is exhausted
    UnexpectedEnd,
    /// An event of the wrong kind was found (e.g. by `next_tag`)
    UnexpectedEvent,
    /// `<` without a matching `>`
    UnclosedTag,
    /// `<!--` without `-->`
    UnclosedComment,
    /// `<![CDATA[` without `]]>`
    UnclosedCData,
    /// `<?` without `?>`
    UnclosedProcessingInstruction,
    /// Elements still open at end of input
    UnclosedElement,
    /// Element or attribute name is not a valid identifier
    InvalidName,
    /// Malformed attribute syntax
    InvalidAttribute,
    /// `</b>` while `<a>` is open
    MismatchedEndTag,
    /// `&name;` that is neither predefined nor a character reference
    UnknownEntity,
    /// Input is not valid UTF-8
    InvalidUtf8,
    /// Failure reported by an I/O-backed or external producer
    Source,
}

impl StreamErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::Closed => "stream closed",
            Self::UnexpectedEnd => "unexpected end of stream",
            Self::UnexpectedEvent => "unexpected event",
            Self::UnclosedTag => "unclosed tag",
            Self::UnclosedComment => "unclosed comment",
            Self::UnclosedCData => "unclosed cdata section",
            Self::UnclosedProcessingInstruction => "unclosed processing instruction",
            Self::UnclosedElement => "unclosed element",
            Self::InvalidName => "invalid name",
            Self::InvalidAttribute => "invalid attribute",
            Self::MismatchedEndTag => "mismatched end tag",
            Self::UnknownEntity => "unknown entity",
            Self::InvalidUtf8 => "invalid utf-8",
            Self::Source => "source error",
        }
    }
}

impl fmt::Display for StreamErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Failure surfaced by an event source's pull operations.
///
/// `Clone` so producers can keep reporting the same failure on every
/// subsequent pull once the input is known to be broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.code, .detail, .span))]
pub struct StreamError {
    code: StreamErrorCode,
    detail: Option<Cow<'static, str>>,
    span: Option<Span>,
}

fn render(
    code: &StreamErrorCode,
    detail: &Option<Cow<'static, str>>,
    span: &Option<Span>,
) -> String {
    let mut out = code.message().to_string();
    if let Some(detail) = detail {
        out.push_str(": ");
        out.push_str(detail);
    }
    if let Some(span) = span {
        out.push_str(&format!(" at {span}"));
    }
    out
}

impl StreamError {
    pub fn new(code: StreamErrorCode) -> Self {
        Self { code, detail: None, span: None }
    }

    /// Error for an operation attempted after `close`.
    pub fn closed() -> Self {
        Self::new(StreamErrorCode::Closed)
    }

    /// Error for a pull past the last event.
    pub fn unexpected_end() -> Self {
        Self::new(StreamErrorCode::UnexpectedEnd)
    }

    /// Wrap a failure from an external producer (I/O, foreign parser).
    pub fn external(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StreamErrorCode::Source).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: impl Into<Cow<'static, str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    #[inline]
    pub fn code(&self) -> StreamErrorCode {
        self.code
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Position in the original input, when the producer knows it.
    #[inline]
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.code == StreamErrorCode::Closed
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        Self::external(err.to_string())
    }
}

/// Errors from operations that can fail locally, not just in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The operation is not valid in the current state; the object stays usable.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// The source does not implement the operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Rejected legacy integer buffer limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimitError {
    /// Only `-1` (unbounded) is a meaningful negative limit.
    #[error("invalid buffer limit {0}: only -1 (unbounded) may be negative")]
    Negative(i64),

    #[error("buffer limit {0} does not fit in usize")]
    TooLarge(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_error_display() {
        assert_eq!(StreamError::closed().to_string(), "stream closed");

        let err = StreamError::new(StreamErrorCode::MismatchedEndTag)
            .with_detail("expected </a>, found </b>")
            .with_span(Span::new(12, 16));
        assert_eq!(
            err.to_string(),
            "mismatched end tag: expected </a>, found </b> at 12..16"
        );
        assert_eq!(err.span(), Some(Span::new(12, 16)));
        assert_eq!(err.detail(), Some("expected </a>, found </b>"));
    }

    #[test]
    fn test_error_wraps_stream_error_transparently() {
        let err: Error = StreamError::unexpected_end().into();
        assert_eq!(err.to_string(), "unexpected end of stream");
        assert!(matches!(err, Error::Stream(ref e) if e.code() == StreamErrorCode::UnexpectedEnd));
    }

    #[test]
    fn test_io_error_becomes_source_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err = StreamError::from(io);
        assert_eq!(err.code(), StreamErrorCode::Source);
        assert_eq!(err.to_string(), "source error: truncated");
    }
}
