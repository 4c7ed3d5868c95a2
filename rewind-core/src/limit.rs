//! Retention limits and cursor configuration.
//!
//! The legacy integer convention (`-1` = keep everything, `0` = keep
//! nothing, `n` = keep the last `n`) survives only at the conversion
//! boundary; inside the crate a limit is always a [`BufferLimit`].

use std::fmt;
use std::num::NonZeroUsize;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::LimitError;

/// How many produced events the cursor retains for replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i64", into = "i64"))]
pub enum BufferLimit {
    /// Retain nothing; `reset` is a no-op.
    #[default]
    Disabled,
    /// Retain at most this many of the most recent events.
    Bounded(NonZeroUsize),
    /// Retain every event produced since the last `mark`.
    Unbounded,
}

impl BufferLimit {
    /// Bounded limit of `n` events; `0` yields [`BufferLimit::Disabled`].
    pub fn bounded(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(Self::Disabled, Self::Bounded)
    }

    /// Maximum retained events, `None` when unbounded.
    #[inline]
    pub fn max_events(self) -> Option<usize> {
        match self {
            Self::Disabled => Some(0),
            Self::Bounded(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }

    /// Whether a buffer holding `len` events is over this limit.
    #[inline]
    pub fn is_exceeded_by(self, len: usize) -> bool {
        self.max_events().is_some_and(|max| len > max)
    }

    #[inline]
    pub fn is_disabled(self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl TryFrom<i64> for BufferLimit {
    type Error = LimitError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Unbounded),
            v if v < -1 => Err(LimitError::Negative(v)),
            v => usize::try_from(v)
                .map(Self::bounded)
                .map_err(|_| LimitError::TooLarge(v)),
        }
    }
}

impl From<BufferLimit> for i64 {
    fn from(limit: BufferLimit) -> Self {
        match limit {
            BufferLimit::Disabled => 0,
            BufferLimit::Bounded(n) => i64::try_from(n.get()).unwrap_or(i64::MAX),
            BufferLimit::Unbounded => -1,
        }
    }
}

impl fmt::Display for BufferLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::Bounded(n) => write!(f, "{n} events"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Construction-time settings for a [`BufferingCursor`](crate::BufferingCursor).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CursorConfig {
    /// Limit in force before the first `mark`.
    pub initial_limit: BufferLimit,
    /// Ring slots allocated for the first retained event (rounded up to a
    /// power of two). Nothing is allocated while retention is disabled.
    pub initial_capacity: usize,
}

impl CursorConfig {
    pub const DEFAULT_CAPACITY: usize = 16;

    pub fn with_limit(mut self, limit: BufferLimit) -> Self {
        self.initial_limit = limit;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            initial_limit: BufferLimit::Disabled,
            initial_capacity: Self::DEFAULT_CAPACITY,
        }
    }
}
