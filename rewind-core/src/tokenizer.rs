//! Minimal pull tokenizer for XML-like markup.
//!
//! Non-validating and deliberately small: elements with quoted attributes,
//! self-closing tags, character data with the predefined entities and
//! numeric character references, comments, CDATA sections and processing
//! instructions. `<!DOCTYPE ...>` style declarations are skipped.
//!
//! Scanning is lazy: nothing is tokenized until the consumer asks for the
//! next event, and at most one tag's worth of events is held at a time.
//! Once malformed input is hit, every later pull reports the same error.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::rc::Rc;

use memchr::{memchr, memchr2, memmem};
use phf::phf_map;
use unicode_xid::UnicodeXID;

use crate::error::{StreamError, StreamErrorCode};
use crate::event::{Attribute, MarkupEvent};
use crate::source::EventSource;
use crate::span::{Location, Span};

/// The five entities every XML processor recognizes.
static PREDEFINED_ENTITIES: phf::Map<&'static str, char> = phf_map! {
    "lt" => '<',
    "gt" => '>',
    "amp" => '&',
    "quot" => '"',
    "apos" => '\'',
};

#[inline]
fn is_name_start(c: char) -> bool {
    c == '_' || c == ':' || c.is_xid_start()
}

#[inline]
fn is_name_continue(c: char) -> bool {
    matches!(c, '-' | '.' | ':') || c.is_xid_continue()
}

#[inline]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Offsets past `u32::MAX` saturate.
#[inline]
fn span(start: usize, end: usize) -> Span {
    Span::new(offset(start), offset(end))
}

#[inline]
fn offset(at: usize) -> u32 {
    u32::try_from(at).unwrap_or(u32::MAX)
}

/// Non-empty and every byte accepted by `digit` (no sign, no spaces).
fn is_digits(text: &str, digit: fn(&u8) -> bool) -> bool {
    !text.is_empty() && text.bytes().all(|b| digit(&b))
}

/// Lazy [`EventSource`] over a markup document held in memory.
#[derive(Debug)]
pub struct MarkupTokenizer<'a> {
    input: &'a str,
    /// Byte offset of the next unscanned input
    pos: usize,
    /// Open element names, innermost last
    open: Vec<Rc<str>>,
    /// Scanned but not yet consumed events (a self-closing tag yields two)
    pending: VecDeque<MarkupEvent>,
    /// Sticky failure, reported on every pull once set
    failed: Option<StreamError>,
    closed: bool,
}

impl<'a> MarkupTokenizer<'a> {
    /// Tokenizer over raw bytes. Invalid UTF-8 is reported on the first pull.
    ///
    /// Spans are `u32` byte offsets: for inputs over 4 GiB, positions past
    /// `u32::MAX` saturate to it.
    pub fn new(input: &'a [u8]) -> Self {
        match std::str::from_utf8(input) {
            Ok(text) => Self::from_str(text),
            Err(err) => {
                let at = err.valid_up_to();
                let mut tokenizer = Self::from_str("");
                tokenizer.failed = Some(
                    StreamError::new(StreamErrorCode::InvalidUtf8)
                        .with_span(span(at, at + err.error_len().unwrap_or(0))),
                );
                tokenizer
            }
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            open: Vec::new(),
            pending: VecDeque::with_capacity(2),
            failed: None,
            closed: false,
        }
    }

    /// Byte offset of the next unscanned input.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of elements currently open.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Line/column of `span` in this tokenizer's input.
    pub fn location(&self, span: Span) -> Location {
        span.location(self.input.as_bytes())
    }

    /// Make sure `pending` holds the next event, unless input is exhausted.
    fn fill(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::closed());
        }
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        if self.pending.is_empty() {
            if let Err(err) = self.scan() {
                self.failed = Some(err.clone());
                return Err(err);
            }
        }
        Ok(())
    }

    /// Scan until at least one event is pending or input runs out.
    fn scan(&mut self) -> Result<(), StreamError> {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.pending.is_empty() {
            if self.pos >= bytes.len() {
                if let Some(name) = self.open.last() {
                    return Err(StreamError::new(StreamErrorCode::UnclosedElement)
                        .with_detail(format!("<{name}> is never closed"))
                        .with_span(Span::point(offset(bytes.len()))));
                }
                return Ok(());
            }
            if bytes[self.pos] == b'<' {
                self.scan_markup()?;
            } else {
                self.scan_text()?;
            }
        }
        Ok(())
    }

    fn scan_text(&mut self) -> Result<(), StreamError> {
        let input = self.input;
        let start = self.pos;
        let end = memchr(b'<', &input.as_bytes()[start..]).map_or(input.len(), |i| start + i);
        let content = decode_entities(&input[start..end], start)?;
        self.pos = end;
        self.pending.push_back(MarkupEvent::Text {
            content: content.into(),
            span: span(start, end),
        });
        Ok(())
    }

    fn scan_markup(&mut self) -> Result<(), StreamError> {
        let input = self.input;
        let rest = &input[self.pos..];
        if rest.starts_with("<!--") {
            let (content, end) = self.delimited(4, "-->", StreamErrorCode::UnclosedComment)?;
            self.pending.push_back(MarkupEvent::Comment {
                content: content.into(),
                span: span(self.pos, end),
            });
            self.pos = end;
        } else if rest.starts_with("<![CDATA[") {
            let (content, end) = self.delimited(9, "]]>", StreamErrorCode::UnclosedCData)?;
            self.pending.push_back(MarkupEvent::CData {
                content: content.into(),
                span: span(self.pos, end),
            });
            self.pos = end;
        } else if rest.starts_with("<?") {
            self.scan_processing_instruction()?;
        } else if rest.starts_with("</") {
            self.scan_end_tag()?;
        } else if rest.starts_with("<!") {
            // Declarations carry nothing the event model represents
            let (_, end) = self.delimited(2, ">", StreamErrorCode::UnclosedTag)?;
            self.pos = end;
        } else {
            self.scan_start_tag()?;
        }
        Ok(())
    }

    /// Text between `self.pos + open_len` and `close`; returns it with the
    /// offset just past `close`.
    fn delimited(
        &self,
        open_len: usize,
        close: &str,
        code: StreamErrorCode,
    ) -> Result<(&'a str, usize), StreamError> {
        let input = self.input;
        let body = self.pos + open_len;
        match memmem::find(&input.as_bytes()[body..], close.as_bytes()) {
            Some(i) => Ok((&input[body..body + i], body + i + close.len())),
            None => Err(StreamError::new(code).with_span(span(self.pos, input.len()))),
        }
    }

    fn scan_processing_instruction(&mut self) -> Result<(), StreamError> {
        let (inner, end) = self.delimited(2, "?>", StreamErrorCode::UnclosedProcessingInstruction)?;
        let (target, after) = self.name_at(self.pos + 2)?;
        let data = inner[after - (self.pos + 2)..].trim_start_matches(|c: char| c.is_ascii_whitespace());
        self.pending.push_back(MarkupEvent::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
            span: span(self.pos, end),
        });
        self.pos = end;
        Ok(())
    }

    fn scan_end_tag(&mut self) -> Result<(), StreamError> {
        let start = self.pos;
        let (name, after) = self.name_at(start + 2)?;
        let close = self.skip_space(after);
        if self.input.as_bytes().get(close) != Some(&b'>') {
            return Err(self.unclosed_tag(start, close));
        }
        let end = close + 1;
        let tag = span(start, end);
        let open = match self.open.pop() {
            Some(open) if &*open == name => open,
            Some(open) => {
                return Err(StreamError::new(StreamErrorCode::MismatchedEndTag)
                    .with_detail(format!("expected </{open}>, found </{name}>"))
                    .with_span(tag));
            }
            None => {
                return Err(StreamError::new(StreamErrorCode::MismatchedEndTag)
                    .with_detail(format!("no open element for </{name}>"))
                    .with_span(tag));
            }
        };
        self.pending.push_back(MarkupEvent::EndElement { name: open, span: tag });
        self.pos = end;
        Ok(())
    }

    fn scan_start_tag(&mut self) -> Result<(), StreamError> {
        let input = self.input;
        let start = self.pos;
        let bytes = input.as_bytes();
        let (name, mut at) = self.name_at(start + 1)?;
        let name: Rc<str> = name.into();
        let mut attributes: Vec<Attribute> = Vec::new();

        loop {
            let next = self.skip_space(at);
            match bytes.get(next) {
                None => return Err(self.unclosed_tag(start, next)),
                Some(b'>') => {
                    let end = next + 1;
                    self.pending.push_back(MarkupEvent::StartElement {
                        name: name.clone(),
                        attributes: attributes.into(),
                        span: span(start, end),
                    });
                    self.open.push(name);
                    self.pos = end;
                    return Ok(());
                }
                Some(b'/') => {
                    if bytes.get(next + 1) != Some(&b'>') {
                        return Err(self.unclosed_tag(start, next));
                    }
                    let end = next + 2;
                    self.pending.push_back(MarkupEvent::StartElement {
                        name: name.clone(),
                        attributes: attributes.into(),
                        span: span(start, end),
                    });
                    self.pending.push_back(MarkupEvent::EndElement {
                        name,
                        span: span(next, end),
                    });
                    self.pos = end;
                    return Ok(());
                }
                Some(_) if next == at => {
                    // Attributes must be separated from what precedes them
                    return Err(StreamError::new(StreamErrorCode::InvalidAttribute)
                        .with_detail("missing whitespace before attribute")
                        .with_span(Span::point(offset(next))));
                }
                Some(_) => {
                    let (attribute, after) = self.attribute_at(next)?;
                    if attributes.iter().any(|a| a.name == attribute.name) {
                        return Err(StreamError::new(StreamErrorCode::InvalidAttribute)
                            .with_detail(format!("duplicate attribute {}", attribute.name))
                            .with_span(span(next, after)));
                    }
                    attributes.push(attribute);
                    at = after;
                }
            }
        }
    }

    /// `name = "value"` starting at `at`.
    fn attribute_at(&self, at: usize) -> Result<(Attribute, usize), StreamError> {
        let bytes = self.input.as_bytes();
        let (name, after) = self.name_at(at)?;
        let eq = self.skip_space(after);
        if bytes.get(eq) != Some(&b'=') {
            return Err(StreamError::new(StreamErrorCode::InvalidAttribute)
                .with_detail(format!("expected '=' after {name}"))
                .with_span(span(at, eq)));
        }
        let open = self.skip_space(eq + 1);
        let quote = match bytes.get(open) {
            Some(&q @ (b'"' | b'\'')) => q,
            Some(_) => {
                return Err(StreamError::new(StreamErrorCode::InvalidAttribute)
                    .with_detail(format!("value of {name} must be quoted"))
                    .with_span(Span::point(offset(open))));
            }
            None => return Err(self.unclosed_tag(at, open)),
        };
        let body = open + 1;
        let Some(len) = memchr2(quote, b'<', &bytes[body..]) else {
            return Err(self.unclosed_tag(at, bytes.len()));
        };
        let close = body + len;
        if bytes[close] != quote {
            return Err(StreamError::new(StreamErrorCode::InvalidAttribute)
                .with_detail(format!("'<' in value of {name}"))
                .with_span(Span::point(offset(close))));
        }
        let value = decode_entities(&self.input[body..close], body)?;
        Ok((Attribute::new(name, value), close + 1))
    }

    /// Name starting at byte `at`, with the offset just past it.
    fn name_at(&self, at: usize) -> Result<(&'a str, usize), StreamError> {
        let input = self.input;
        let rest = input.get(at..).unwrap_or("");
        let mut chars = rest.char_indices();
        let len = match chars.next() {
            Some((_, c)) if is_name_start(c) => chars
                .find(|&(_, c)| !is_name_continue(c))
                .map_or(rest.len(), |(i, _)| i),
            _ => {
                return Err(StreamError::new(StreamErrorCode::InvalidName)
                    .with_span(Span::point(offset(at))));
            }
        };
        Ok((&input[at..at + len], at + len))
    }

    fn skip_space(&self, mut at: usize) -> usize {
        let bytes = self.input.as_bytes();
        while at < bytes.len() && is_space(bytes[at]) {
            at += 1;
        }
        at
    }

    fn unclosed_tag(&self, start: usize, at: usize) -> StreamError {
        StreamError::new(StreamErrorCode::UnclosedTag).with_span(span(start, at))
    }
}

/// Replace entity and character references in `raw` (which starts at byte
/// `base` of the input).
fn decode_entities(raw: &str, base: usize) -> Result<Cow<'_, str>, StreamError> {
    let bytes = raw.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return Ok(Cow::Borrowed(raw));
    };

    let mut out = String::with_capacity(raw.len());
    out.push_str(&raw[..first]);
    let mut at = first;
    while at < bytes.len() {
        let Some(semi) = memchr(b';', &bytes[at..]).map(|i| at + i) else {
            return Err(StreamError::new(StreamErrorCode::UnknownEntity)
                .with_detail("unterminated reference")
                .with_span(span(base + at, base + raw.len())));
        };
        let name = &raw[at + 1..semi];
        let decoded = match name.strip_prefix('#') {
            Some(num) => {
                let code = match num.strip_prefix('x') {
                    Some(hex) if is_digits(hex, u8::is_ascii_hexdigit) => {
                        u32::from_str_radix(hex, 16).ok()
                    }
                    None if is_digits(num, u8::is_ascii_digit) => num.parse::<u32>().ok(),
                    _ => None,
                };
                code.and_then(char::from_u32)
            }
            None => PREDEFINED_ENTITIES.get(name).copied(),
        };
        let Some(c) = decoded else {
            return Err(StreamError::new(StreamErrorCode::UnknownEntity)
                .with_detail(format!("&{name};"))
                .with_span(span(base + at, base + semi + 1)));
        };
        out.push(c);

        at = semi + 1;
        let next = memchr(b'&', &bytes[at..]).map_or(bytes.len(), |i| at + i);
        out.push_str(&raw[at..next]);
        at = next;
    }
    Ok(Cow::Owned(out))
}

impl EventSource for MarkupTokenizer<'_> {
    type Event = MarkupEvent;

    /// True while events remain, and also while an error is waiting to be
    /// reported.
    fn has_next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        match self.fill() {
            Ok(()) => !self.pending.is_empty(),
            Err(_) => true,
        }
    }

    fn peek(&mut self) -> Result<Option<&MarkupEvent>, StreamError> {
        self.fill()?;
        Ok(self.pending.front())
    }

    fn next_event(&mut self) -> Result<MarkupEvent, StreamError> {
        self.fill()?;
        self.pending.pop_front().ok_or_else(StreamError::unexpected_end)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        self.pending.clear();
        self.open.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        assert!(matches!(decode_entities("plain", 0), Ok(Cow::Borrowed("plain"))));
        assert_eq!(
            decode_entities("a &lt; b &amp;&amp; c &#65;&#x42;", 0).unwrap(),
            "a < b && c AB"
        );
        assert_eq!(decode_entities("&quot;&apos;&gt;", 0).unwrap(), "\"'>");
    }

    #[test]
    fn test_char_refs_are_digits_only() {
        for raw in ["&#+65;", "&#x+42;", "&#;", "&#x;", "&# 65;", "&#-1;", "&#6A;", "&#xG1;"] {
            let err = decode_entities(raw, 0).unwrap_err();
            assert_eq!(err.code(), StreamErrorCode::UnknownEntity, "{raw}");
        }
        assert_eq!(decode_entities("&#x00e9;&#0065;", 0).unwrap(), "éA");
    }

    #[test]
    fn test_span_offsets_saturate() {
        assert_eq!(offset(usize::MAX), u32::MAX);
        assert_eq!(span(7, usize::MAX), Span::new(7, u32::MAX));
        assert_eq!(span(3, 9), Span::new(3, 9));
    }

    #[test]
    fn test_decode_entities_error_span() {
        let err = decode_entities("x &nbsp; y", 10).unwrap_err();
        assert_eq!(err.code(), StreamErrorCode::UnknownEntity);
        assert_eq!(err.span(), Some(Span::new(12, 18)));

        let err = decode_entities("dangling &amp", 0).unwrap_err();
        assert_eq!(err.code(), StreamErrorCode::UnknownEntity);

        // Surrogates are not characters
        assert!(decode_entities("&#xD800;", 0).is_err());
    }

    #[test]
    fn test_names() {
        let t = MarkupTokenizer::from_str("<ns:élément-1.x attr>");
        assert_eq!(t.name_at(1).unwrap(), ("ns:élément-1.x", 17));
        assert!(t.name_at(0).is_err());
        assert!(MarkupTokenizer::from_str("<1a>").name_at(1).is_err());
    }

    #[test]
    fn test_lazy_scanning() {
        let mut t = MarkupTokenizer::from_str("<a>text</a>");
        assert_eq!(t.position(), 0);
        assert!(t.has_next());
        assert_eq!(t.position(), 3);
        assert_eq!(t.depth(), 1);
        t.next_event().unwrap();
        assert_eq!(t.position(), 3);
    }

    #[test]
    fn test_location_of_error() {
        let mut t = MarkupTokenizer::from_str("<a>\n  <b>\n</a>");
        t.next_event().unwrap();
        t.next_event().unwrap();
        t.next_event().unwrap();
        t.next_event().unwrap();
        let err = t.next_event().unwrap_err();
        assert_eq!(err.code(), StreamErrorCode::MismatchedEndTag);
        let location = t.location(err.span().unwrap());
        assert_eq!((location.line, location.column), (3, 1));
    }
}
