//! The pull contract every event producer implements.
//!
//! A source is forward-only: `peek` looks at the next event without
//! consuming it, `next_event` consumes it. [`BufferingCursor`] implements the
//! same trait, so it can stand in anywhere a plain source is expected.
//!
//! [`BufferingCursor`]: crate::BufferingCursor

use std::fmt;

use crate::error::{Error, StreamError};

/// Forward-only, pull-based producer of events.
pub trait EventSource {
    type Event;

    /// Whether another event can be pulled.
    ///
    /// Takes `&mut self` because lazy producers may have to tokenize ahead
    /// to answer; the answer must not change what is delivered next.
    fn has_next(&mut self) -> bool;

    /// Look at the next event without consuming it. `Ok(None)` at end of stream.
    ///
    /// Repeated calls without an intervening `next_event` return the same event.
    fn peek(&mut self) -> Result<Option<&Self::Event>, StreamError>;

    /// Consume and return the next event.
    ///
    /// Fails with [`StreamErrorCode::UnexpectedEnd`] once the stream is exhausted.
    ///
    /// [`StreamErrorCode::UnexpectedEnd`]: crate::StreamErrorCode::UnexpectedEnd
    fn next_event(&mut self) -> Result<Self::Event, StreamError>;

    /// Remove the most recently delivered event from the underlying model.
    ///
    /// Most producers are read-only.
    fn remove(&mut self) -> Result<(), Error> {
        Err(Error::Unsupported("remove"))
    }

    /// Release the source. Every later pull fails with `Closed`.
    fn close(&mut self) -> Result<(), StreamError>;

    /// Iterate the remaining events. The iterator ends after the first error.
    fn events(&mut self) -> Events<'_, Self>
    where
        Self: Sized,
    {
        Events { source: self, done: false }
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    type Event = S::Event;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn peek(&mut self) -> Result<Option<&Self::Event>, StreamError> {
        (**self).peek()
    }

    fn next_event(&mut self) -> Result<Self::Event, StreamError> {
        (**self).next_event()
    }

    fn remove(&mut self) -> Result<(), Error> {
        (**self).remove()
    }

    fn close(&mut self) -> Result<(), StreamError> {
        (**self).close()
    }
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    type Event = S::Event;

    fn has_next(&mut self) -> bool {
        (**self).has_next()
    }

    fn peek(&mut self) -> Result<Option<&Self::Event>, StreamError> {
        (**self).peek()
    }

    fn next_event(&mut self) -> Result<Self::Event, StreamError> {
        (**self).next_event()
    }

    fn remove(&mut self) -> Result<(), Error> {
        (**self).remove()
    }

    fn close(&mut self) -> Result<(), StreamError> {
        (**self).close()
    }
}

/// Iterator over the remaining events of a source. See [`EventSource::events`].
pub struct Events<'s, S> {
    source: &'s mut S,
    done: bool,
}

impl<S: EventSource> Iterator for Events<'_, S> {
    type Item = Result<S::Event, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || !self.source.has_next() {
            return None;
        }
        let result = self.source.next_event();
        self.done = result.is_err();
        Some(result)
    }
}

impl<S: EventSource> std::iter::FusedIterator for Events<'_, S> {}

/// Adapts an iterator of results into a peekable [`EventSource`].
///
/// Holds a single lookahead slot. An `Err` item is delivered like any other
/// item, after which the iterator keeps being polled as normal.
pub struct IterSource<I: Iterator> {
    iter: I,
    lookahead: Option<I::Item>,
    closed: bool,
}

impl<E, I> IterSource<I>
where
    I: Iterator<Item = Result<E, StreamError>>,
{
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
            lookahead: None,
            closed: false,
        }
    }

    fn fill(&mut self) {
        if self.lookahead.is_none() {
            self.lookahead = self.iter.next();
        }
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<E> IterSource<std::iter::Map<std::vec::IntoIter<E>, fn(E) -> Result<E, StreamError>>> {
    /// Source over an already materialized list of events.
    pub fn from_events(events: Vec<E>) -> Self {
        IterSource::new(events.into_iter().map(Ok as fn(E) -> Result<E, StreamError>))
    }
}

impl<E, I> EventSource for IterSource<I>
where
    I: Iterator<Item = Result<E, StreamError>>,
{
    type Event = E;

    fn has_next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.fill();
        self.lookahead.is_some()
    }

    fn peek(&mut self) -> Result<Option<&E>, StreamError> {
        if self.closed {
            return Err(StreamError::closed());
        }
        self.fill();
        match &self.lookahead {
            None => Ok(None),
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(err)) => Err(err.clone()),
        }
    }

    fn next_event(&mut self) -> Result<E, StreamError> {
        if self.closed {
            return Err(StreamError::closed());
        }
        self.fill();
        self.lookahead.take().unwrap_or_else(|| Err(StreamError::unexpected_end()))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        self.lookahead = None;
        Ok(())
    }
}

impl<I: Iterator> fmt::Debug for IterSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterSource")
            .field("buffered", &self.lookahead.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}
