//! Source that replays a fixed script and counts how it is driven.

use rewind_core::{Error, EventSource, StreamError};

#[derive(Debug)]
pub struct ScriptedSource {
    items: Vec<Result<u32, StreamError>>,
    next: usize,
    last: Option<u32>,
    closed: bool,
    /// Calls to `next_event` that reached the script
    pub pulls: usize,
    /// Calls to `peek` that reached the script
    pub peeks: usize,
    /// Calls to `close`
    pub closes: usize,
    /// Events removed through `remove`
    pub removed: Vec<u32>,
}

impl ScriptedSource {
    /// Events `0..n`.
    pub fn counting(n: u32) -> Self {
        Self::with_items((0..n).map(Ok).collect())
    }

    pub fn with_items(items: Vec<Result<u32, StreamError>>) -> Self {
        Self {
            items,
            next: 0,
            last: None,
            closed: false,
            pulls: 0,
            peeks: 0,
            closes: 0,
            removed: Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl EventSource for ScriptedSource {
    type Event = u32;

    fn has_next(&mut self) -> bool {
        !self.closed && self.next < self.items.len()
    }

    fn peek(&mut self) -> Result<Option<&u32>, StreamError> {
        if self.closed {
            return Err(StreamError::closed());
        }
        self.peeks += 1;
        match self.items.get(self.next) {
            None => Ok(None),
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(err)) => Err(err.clone()),
        }
    }

    fn next_event(&mut self) -> Result<u32, StreamError> {
        if self.closed {
            return Err(StreamError::closed());
        }
        let item = self
            .items
            .get(self.next)
            .cloned()
            .unwrap_or_else(|| Err(StreamError::unexpected_end()));
        self.pulls += 1;
        self.next += 1;
        self.last = item.as_ref().ok().copied();
        item
    }

    fn remove(&mut self) -> Result<(), Error> {
        if self.closed {
            return Err(StreamError::closed().into());
        }
        match self.last.take() {
            Some(event) => {
                self.removed.push(event);
                Ok(())
            }
            None => Err(Error::IllegalState("nothing to remove")),
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closes += 1;
        self.closed = true;
        Ok(())
    }
}
