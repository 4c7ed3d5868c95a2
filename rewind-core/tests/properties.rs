//! Property-based tests for the buffering cursor
//!
//! Random sequences of mark / reset / peek / advance are run against the
//! cursor and against a plain `Vec`-backed model of the same semantics.
//! proptest shrinks any disagreement to a minimal operation sequence.

mod common;

use common::{collect, ScriptedSource};
use proptest::prelude::*;
use rewind_core::{BufferLimit, BufferingCursor, EventSource};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        max_shrink_iters: 500,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Model
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Mark(Option<usize>),
    Reset,
    Peek,
    Advance,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => prop::option::weighted(0.8, 0usize..6).prop_map(Op::Mark),
        1 => Just(Op::Reset),
        2 => Just(Op::Peek),
        6 => Just(Op::Advance),
    ]
}

fn limit_of(limit: Option<usize>) -> BufferLimit {
    limit.map_or(BufferLimit::Unbounded, BufferLimit::bounded)
}

/// Reference semantics: `None` limit is unbounded, source is `0..total`.
#[derive(Debug)]
struct Model {
    total: u32,
    next_live: u32,
    limit: Option<usize>,
    retained: Vec<u32>,
    replay: Option<usize>,
}

impl Model {
    fn new(total: u32) -> Self {
        Self { total, next_live: 0, limit: Some(0), retained: Vec::new(), replay: None }
    }

    fn mark(&mut self, limit: Option<usize>) {
        self.limit = limit;
        self.retained.clear();
        self.replay = None;
    }

    fn reset(&mut self) {
        self.replay = if self.retained.is_empty() { None } else { Some(0) };
    }

    fn peek(&self) -> Option<u32> {
        match self.replay {
            Some(i) => Some(self.retained[i]),
            None => (self.next_live < self.total).then_some(self.next_live),
        }
    }

    fn advance(&mut self) -> Option<u32> {
        if let Some(i) = self.replay {
            self.replay = (i + 1 < self.retained.len()).then_some(i + 1);
            return Some(self.retained[i]);
        }
        if self.next_live >= self.total {
            return None;
        }
        let event = self.next_live;
        self.next_live += 1;
        self.retained.push(event);
        if let Some(max) = self.limit {
            while self.retained.len() > max {
                self.retained.remove(0);
            }
        }
        Some(event)
    }
}

// =============================================================================
// Property: Cursor Matches Model
// =============================================================================

proptest! {
    #![proptest_config(config())]

    #[test]
    fn cursor_matches_model(total in 0u32..40, ops in prop::collection::vec(op(), 0..120)) {
        let mut cursor = BufferingCursor::new(ScriptedSource::counting(total));
        let mut model = Model::new(total);

        for (step, op) in ops.iter().enumerate() {
            match op {
                Op::Mark(limit) => {
                    cursor.mark(limit_of(*limit)).unwrap();
                    model.mark(*limit);
                }
                Op::Reset => {
                    cursor.reset().unwrap();
                    model.reset();
                }
                Op::Peek => {
                    let peeked = cursor.peek().unwrap().copied();
                    prop_assert_eq!(peeked, model.peek(), "peek at step {}", step);
                }
                Op::Advance => {
                    let expected = model.advance();
                    let actual = cursor.next_event().ok();
                    prop_assert_eq!(actual, expected, "advance at step {}", step);
                }
            }
            prop_assert_eq!(cursor.buffered_count(), model.retained.len());
            prop_assert_eq!(cursor.is_replaying(), model.replay.is_some());
            prop_assert_eq!(cursor.has_next(), model.peek().is_some());
        }
    }
}

// =============================================================================
// Property: Retention Bounds
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// After mark(k) and m advances, exactly the last min(k, m) events replay.
    #[test]
    fn bounded_window_replays_suffix(k in 0usize..10, m in 0usize..30, skip in 0usize..5) {
        let mut cursor = BufferingCursor::new(ScriptedSource::counting(100));
        collect(&mut cursor, skip);
        cursor.mark(BufferLimit::bounded(k)).unwrap();
        let seen = collect(&mut cursor, m);

        let kept = k.min(m);
        prop_assert_eq!(cursor.buffered_count(), kept);

        cursor.reset().unwrap();
        let replayed = collect(&mut cursor, kept);
        prop_assert_eq!(&replayed[..], &seen[m - kept..]);

        // Then straight back to new events
        let next = cursor.next_event().unwrap();
        prop_assert_eq!(next as usize, skip + m);
    }

    /// Unbounded windows replay everything since the mark, any number of times.
    #[test]
    fn unbounded_window_replays_all(m in 0usize..60, rounds in 1usize..4) {
        let mut cursor = BufferingCursor::new(ScriptedSource::counting(100));
        cursor.mark_unbounded().unwrap();
        let seen = collect(&mut cursor, m);

        for _ in 0..rounds {
            cursor.reset().unwrap();
            prop_assert_eq!(collect(&mut cursor, m), seen.clone());
        }
        prop_assert_eq!(cursor.get_ref().pulls, m);
    }

    /// Peeking any number of times never changes what advance returns.
    #[test]
    fn peek_is_pure(peeks in 0usize..8, replay in any::<bool>()) {
        let mut cursor = BufferingCursor::new(ScriptedSource::counting(10));
        cursor.mark_unbounded().unwrap();
        collect(&mut cursor, 3);
        if replay {
            cursor.reset().unwrap();
        }
        let count = cursor.buffered_count();
        let state = cursor.state();

        let mut peeked = Vec::new();
        for _ in 0..peeks {
            peeked.push(*cursor.peek().unwrap().unwrap());
        }
        prop_assert!(peeked.windows(2).all(|w| w[0] == w[1]));
        prop_assert_eq!(cursor.buffered_count(), count);
        prop_assert_eq!(cursor.state(), state);

        let next = cursor.next_event().unwrap();
        if let Some(first) = peeked.first() {
            prop_assert_eq!(*first, next);
        }
    }
}
