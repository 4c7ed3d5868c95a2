//! Mark/reset buffering over any [`EventSource`].
//!
//! The cursor pulls events through from its source and, after a `mark`,
//! retains the most recent ones. `reset` rewinds delivery to the oldest
//! retained event; once the replay runs dry the cursor falls back to the
//! live source without re-pulling anything it already delivered.
//!
//! # States
//!
//! ```text
//!              reset() [buffer non-empty]
//!        ┌───────────────────────────────────┐
//!        │                                   ▼
//!     ┌──────┐   replay exhausted / mark   ┌────────┐
//!     │ Live │ ◀────────────────────────── │ Replay │
//!     └──────┘                             └────────┘
//!        │              close()                 │
//!        └──────────────▶ Closed ◀──────────────┘
//! ```
//!
//! Peeking never buffers. An event only enters the retention ring when it
//! is consumed with `next_event`.

use std::fmt;

use tracing::{debug, trace};

use crate::error::{Error, StreamError};
use crate::limit::{BufferLimit, CursorConfig};
use crate::ring::RetentionRing;
use crate::source::EventSource;

/// Where the cursor's next event comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Pulling from the source, retaining per the current limit.
    Live,
    /// Re-delivering retained events; `position` indexes the ring (0 = oldest).
    Replay { position: usize },
    /// Terminal. Every fallible operation reports `Closed`.
    Closed,
}

/// Buffering decorator that lets a consumer rewind a forward-only source.
///
/// ```
/// use rewind_core::{BufferLimit, BufferingCursor, EventSource, IterSource};
///
/// let mut cursor = BufferingCursor::new(IterSource::from_events(vec![1, 2, 3, 4]));
/// cursor.mark(BufferLimit::Unbounded).unwrap();
/// assert_eq!(cursor.next_event().unwrap(), 1);
/// assert_eq!(cursor.next_event().unwrap(), 2);
///
/// cursor.reset().unwrap();
/// let again: Vec<_> = cursor.events().map(Result::unwrap).collect();
/// assert_eq!(again, vec![1, 2, 3, 4]);
/// ```
pub struct BufferingCursor<S: EventSource> {
    source: S,
    limit: BufferLimit,
    buffer: RetentionRing<S::Event>,
    state: CursorState,
}

impl<S> BufferingCursor<S>
where
    S: EventSource,
    S::Event: Clone,
{
    /// Wrap `source`. Nothing is retained until the first [`mark`](Self::mark).
    pub fn new(source: S) -> Self {
        Self::with_config(source, &CursorConfig::default())
    }

    /// Wrap `source`, retaining per `limit` from the first event on.
    pub fn with_limit(source: S, limit: BufferLimit) -> Self {
        Self::with_config(source, &CursorConfig::default().with_limit(limit))
    }

    pub fn with_config(source: S, config: &CursorConfig) -> Self {
        let mut buffer = RetentionRing::new(config.initial_capacity);
        buffer.rebound(config.initial_limit.max_events());
        Self {
            source,
            limit: config.initial_limit,
            buffer,
            state: CursorState::Live,
        }
    }

    /// Start a fresh retention window.
    ///
    /// Drops everything retained so far, leaves replay, and retains up to
    /// `limit` of the events consumed from here on. Ring storage larger
    /// than the new window needs is freed.
    pub fn mark(&mut self, limit: BufferLimit) -> Result<(), StreamError> {
        if self.state == CursorState::Closed {
            return Err(StreamError::closed());
        }
        debug!(%limit, dropped = self.buffer.len(), "mark");
        self.limit = limit;
        self.buffer.rebound(limit.max_events());
        self.state = CursorState::Live;
        Ok(())
    }

    /// Same as `mark(BufferLimit::Unbounded)`.
    pub fn mark_unbounded(&mut self) -> Result<(), StreamError> {
        self.mark(BufferLimit::Unbounded)
    }

    /// Rewind to the oldest retained event.
    ///
    /// With nothing retained this leaves the cursor live. Calling it again
    /// mid-replay starts the replay over.
    pub fn reset(&mut self) -> Result<(), StreamError> {
        if self.state == CursorState::Closed {
            return Err(StreamError::closed());
        }
        self.state = if self.buffer.is_empty() {
            CursorState::Live
        } else {
            CursorState::Replay { position: 0 }
        };
        debug!(retained = self.buffer.len(), state = ?self.state, "reset");
        Ok(())
    }

    /// Number of events currently retained.
    #[inline]
    pub fn buffered_count(&self) -> usize {
        self.buffer.len()
    }

    /// Limit in force for the current retention window.
    #[inline]
    pub fn limit(&self) -> BufferLimit {
        self.limit
    }

    #[inline]
    pub fn state(&self) -> CursorState {
        self.state
    }

    #[inline]
    pub fn is_replaying(&self) -> bool {
        matches!(self.state, CursorState::Replay { .. })
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state == CursorState::Closed
    }

    /// The wrapped source. Pulling from it directly would bypass retention,
    /// so only shared access is offered.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Unwrap the source, discarding retained events and any pending replay.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Pull from the source and retain the event per the current limit.
    fn pull_live(&mut self) -> Result<S::Event, StreamError> {
        let event = self.source.next_event()?;
        if !self.limit.is_disabled() {
            // A bounded ring never holds more than `limit` events
            while self.limit.is_exceeded_by(self.buffer.len() + 1) {
                self.buffer.pop_front();
                trace!(limit = %self.limit, "evicted oldest retained event");
            }
            self.buffer.push_back(event.clone());
        }
        Ok(event)
    }
}

impl<S> EventSource for BufferingCursor<S>
where
    S: EventSource,
    S::Event: Clone,
{
    type Event = S::Event;

    fn has_next(&mut self) -> bool {
        match self.state {
            CursorState::Live => self.source.has_next(),
            CursorState::Replay { .. } => true,
            CursorState::Closed => false,
        }
    }

    fn peek(&mut self) -> Result<Option<&S::Event>, StreamError> {
        match self.state {
            CursorState::Live => self.source.peek(),
            CursorState::Replay { position } => Ok(self.buffer.get(position)),
            CursorState::Closed => Err(StreamError::closed()),
        }
    }

    fn next_event(&mut self) -> Result<S::Event, StreamError> {
        match self.state {
            CursorState::Live => self.pull_live(),
            CursorState::Replay { position } => {
                let Some(event) = self.buffer.get(position).cloned() else {
                    debug_assert!(false, "replay position {position} past retained events");
                    self.state = CursorState::Live;
                    return self.pull_live();
                };
                let next = position + 1;
                if next >= self.buffer.len() {
                    trace!(replayed = next, "replay exhausted, back to live source");
                    self.state = CursorState::Live;
                } else {
                    self.state = CursorState::Replay { position: next };
                }
                Ok(event)
            }
            CursorState::Closed => Err(StreamError::closed()),
        }
    }

    /// Only valid at the live edge: a replayed event is a retained copy,
    /// not something the source can remove.
    fn remove(&mut self) -> Result<(), Error> {
        match self.state {
            CursorState::Live => self.source.remove(),
            CursorState::Replay { .. } => {
                Err(Error::IllegalState("cannot remove a buffered event"))
            }
            CursorState::Closed => Err(StreamError::closed().into()),
        }
    }

    /// Disable retention and close the source. Closing again is a no-op.
    fn close(&mut self) -> Result<(), StreamError> {
        if self.state == CursorState::Closed {
            return Ok(());
        }
        self.mark(BufferLimit::Disabled)?;
        self.state = CursorState::Closed;
        debug!("closing buffering cursor");
        self.source.close()
    }
}

impl<S> fmt::Debug for BufferingCursor<S>
where
    S: EventSource + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferingCursor")
            .field("source", &self.source)
            .field("limit", &self.limit)
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .finish()
    }
}
