//! Markup events produced by [`MarkupTokenizer`](crate::MarkupTokenizer).
//!
//! SAX-style: structure is a StartElement/EndElement pair, everything in
//! between is emitted in document order. A self-closing tag `<br/>` emits
//! both events back to back.
//!
//! Every payload sits behind an `Rc`, so cloning an event (which the
//! buffering cursor does for each event it retains) is a reference-count
//! bump rather than a string copy.

use std::fmt;
use std::rc::Rc;

use crate::span::Span;

/// `name="value"` on a start tag, value already entity-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Rc<str>,
    pub value: Rc<str>,
}

impl Attribute {
    pub fn new(name: impl Into<Rc<str>>, value: impl Into<Rc<str>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    // ========== Structure Events ==========

    /// `<name attr="v">` or the first half of `<name/>`
    StartElement {
        name: Rc<str>,
        attributes: Rc<[Attribute]>,
        span: Span,
    },

    /// `</name>` or the second half of `<name/>`
    EndElement { name: Rc<str>, span: Span },

    // ========== Content Events ==========

    /// Character data between tags, entities decoded
    Text { content: Rc<str>, span: Span },

    /// `<![CDATA[...]]>`, verbatim
    CData { content: Rc<str>, span: Span },

    /// `<!-- ... -->`
    Comment { content: Rc<str>, span: Span },

    /// `<?target data?>`
    ProcessingInstruction {
        target: Rc<str>,
        data: Rc<str>,
        span: Span,
    },
}

impl MarkupEvent {
    /// Get the span for this event.
    pub fn span(&self) -> Span {
        match self {
            Self::StartElement { span, .. } => *span,
            Self::EndElement { span, .. } => *span,
            Self::Text { span, .. } => *span,
            Self::CData { span, .. } => *span,
            Self::Comment { span, .. } => *span,
            Self::ProcessingInstruction { span, .. } => *span,
        }
    }

    /// Element name for start/end events.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::StartElement { name, .. } | Self::EndElement { name, .. } => Some(&**name),
            _ => None,
        }
    }

    /// Value of the named attribute on a start element.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::StartElement { attributes, .. } => attributes
                .iter()
                .find(|attr| &*attr.name == name)
                .map(|attr| &*attr.value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, Self::StartElement { .. })
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, Self::EndElement { .. })
    }

    /// Text or CDATA.
    #[inline]
    pub fn is_character_data(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::CData { .. })
    }

    /// Character data made only of XML whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.character_data().is_some_and(|text| {
            text.bytes().all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
        })
    }

    /// Content of a Text or CDATA event.
    pub fn character_data(&self) -> Option<&str> {
        match self {
            Self::Text { content, .. } | Self::CData { content, .. } => Some(&**content),
            _ => None,
        }
    }

    /// Content events that carry no structure or character data.
    #[inline]
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::Comment { .. } | Self::ProcessingInstruction { .. })
    }
}

impl fmt::Display for MarkupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartElement { name, attributes, .. } => {
                write!(f, "<{name}")?;
                for attr in attributes.iter() {
                    write!(f, " {}={:?}", attr.name, attr.value)?;
                }
                f.write_str(">")
            }
            Self::EndElement { name, .. } => write!(f, "</{name}>"),
            Self::Text { content, .. } => write!(f, "{content:?}"),
            Self::CData { content, .. } => write!(f, "<![CDATA[{content}]]>"),
            Self::Comment { content, .. } => write!(f, "<!--{content}-->"),
            Self::ProcessingInstruction { target, data, .. } => {
                if data.is_empty() {
                    write!(f, "<?{target}?>")
                } else {
                    write!(f, "<?{target} {data}?>")
                }
            }
        }
    }
}
