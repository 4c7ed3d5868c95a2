//! rewind core
//!
//! Mark/reset buffering over forward-only, pull-based event streams.
//! Wrap a source in a [`BufferingCursor`], `mark` a position, read ahead,
//! then `reset` to have the same events delivered again, without
//! re-tokenizing the input and without keeping more history than asked for.
//!
//! # Architecture
//!
//! - **source.rs** - `EventSource` pull contract, iterator adapters
//! - **cursor.rs** - `BufferingCursor` live/replay/closed state machine
//! - **ring.rs** - Growable retention ring with FIFO eviction
//! - **limit.rs** - `BufferLimit`, `CursorConfig`
//! - **error.rs** - `StreamError` and local misuse errors
//! - **event.rs** - Markup event payload
//! - **tokenizer.rs** - Lazy markup tokenizer (a reference `EventSource`)
//! - **reader.rs** - `next_tag` / `element_text` helpers over markup sources
//! - **span.rs** - Span/Location types

pub mod cursor;
pub mod error;
pub mod event;
pub mod limit;
pub mod reader;
pub mod ring;
pub mod source;
pub mod span;
pub mod tokenizer;

pub use cursor::{BufferingCursor, CursorState};
pub use error::{Error, LimitError, StreamError, StreamErrorCode};
pub use event::{Attribute, MarkupEvent};
pub use limit::{BufferLimit, CursorConfig};
pub use reader::MarkupReaderExt;
pub use ring::RetentionRing;
pub use source::{EventSource, Events, IterSource};
pub use span::{Location, Span};
pub use tokenizer::MarkupTokenizer;
