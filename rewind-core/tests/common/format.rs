//! Compact event representation for comparisons (ignores spans).

use rewind_core::{EventSource, MarkupEvent, StreamError};

#[derive(Debug, Clone, PartialEq)]
pub enum E {
    Start(String, Vec<(String, String)>),
    End(String),
    Text(String),
    CData(String),
    Comment(String),
    Pi(String, String),
}

impl From<&MarkupEvent> for E {
    fn from(event: &MarkupEvent) -> Self {
        match event {
            MarkupEvent::StartElement { name, attributes, .. } => E::Start(
                name.to_string(),
                attributes
                    .iter()
                    .map(|a| (a.name.to_string(), a.value.to_string()))
                    .collect(),
            ),
            MarkupEvent::EndElement { name, .. } => E::End(name.to_string()),
            MarkupEvent::Text { content, .. } => E::Text(content.to_string()),
            MarkupEvent::CData { content, .. } => E::CData(content.to_string()),
            MarkupEvent::Comment { content, .. } => E::Comment(content.to_string()),
            MarkupEvent::ProcessingInstruction { target, data, .. } => {
                E::Pi(target.to_string(), data.to_string())
            }
        }
    }
}

impl From<MarkupEvent> for E {
    fn from(event: MarkupEvent) -> Self {
        E::from(&event)
    }
}

/// Pull `n` events, panicking on error.
pub fn collect<S: EventSource>(source: &mut S, n: usize) -> Vec<S::Event> {
    (0..n)
        .map(|i| {
            source
                .next_event()
                .unwrap_or_else(|err| panic!("pull {i} failed: {err}"))
        })
        .collect()
}

/// Pull until the source is exhausted or fails.
pub fn drain<S: EventSource>(source: &mut S) -> (Vec<S::Event>, Option<StreamError>) {
    let mut events = Vec::new();
    for result in source.events() {
        match result {
            Ok(event) => events.push(event),
            Err(err) => return (events, Some(err)),
        }
    }
    (events, None)
}
