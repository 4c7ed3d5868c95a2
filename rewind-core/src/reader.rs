//! Convenience pulls for sources of [`MarkupEvent`]s.
//!
//! Works on any markup source, including a [`BufferingCursor`] wrapped
//! around one, so events consumed by these helpers are retained and
//! replayed like any other.
//!
//! [`BufferingCursor`]: crate::BufferingCursor

use crate::error::{StreamError, StreamErrorCode};
use crate::event::MarkupEvent;
use crate::source::EventSource;

fn unexpected(expected: &str, found: &MarkupEvent) -> StreamError {
    StreamError::new(StreamErrorCode::UnexpectedEvent)
        .with_detail(format!("expected {expected}, found {found}"))
        .with_span(found.span())
}

pub trait MarkupReaderExt: EventSource<Event = MarkupEvent> {
    /// Next start or end element, skipping whitespace, comments and
    /// processing instructions. Any other event is an error.
    fn next_tag(&mut self) -> Result<MarkupEvent, StreamError> {
        loop {
            let event = self.next_event()?;
            if event.is_start_element() || event.is_end_element() {
                return Ok(event);
            }
            if !(event.is_whitespace() || event.is_ignorable()) {
                return Err(unexpected("a start or end tag", &event));
            }
        }
    }

    /// Character data of a text-only element.
    ///
    /// Call right after the element's start tag has been consumed. Reads
    /// through the matching end tag; comments and processing instructions
    /// in between are dropped, a child element is an error.
    fn element_text(&mut self) -> Result<String, StreamError> {
        let mut text = String::new();
        loop {
            let event = self.next_event()?;
            match &event {
                MarkupEvent::Text { content, .. } | MarkupEvent::CData { content, .. } => {
                    text.push_str(content);
                }
                MarkupEvent::Comment { .. } | MarkupEvent::ProcessingInstruction { .. } => {}
                MarkupEvent::EndElement { .. } => return Ok(text),
                MarkupEvent::StartElement { .. } => {
                    return Err(unexpected("text-only content", &event));
                }
            }
        }
    }

    /// Consume everything up to and including the end tag of the element
    /// whose start tag was just consumed.
    fn skip_element(&mut self) -> Result<(), StreamError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                MarkupEvent::StartElement { .. } => depth += 1,
                MarkupEvent::EndElement { .. } => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }
}

impl<S: EventSource<Event = MarkupEvent> + ?Sized> MarkupReaderExt for S {}
