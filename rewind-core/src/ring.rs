//! Retention ring: FIFO history of produced events.
//!
//! Power-of-2 sized storage so the physical slot of a logical index is a
//! bitmask away. Unlike a fixed event queue the ring grows on demand; the
//! cursor bounds it by evicting from the front once its limit is exceeded.
//!
//! ```text
//!   oldest (index 0)              newest (index len-1)
//!        │                              │
//!   [ .. E3 E4 E5 E6 .. .. .. .. E1 E2 ]    head = 8, len = 6
//!                                ▲
//!                               head
//! ```

/// Growable ring buffer of retained events, oldest first.
///
/// Storage is allocated on the first `push_back`, not at construction.
#[derive(Debug)]
pub struct RetentionRing<E> {
    /// Slot storage (power-of-2 sized, empty until first push)
    slots: Vec<Option<E>>,
    /// Physical slot of the oldest event
    head: usize,
    /// Number of retained events
    len: usize,
    /// Bitmask for fast modulo (capacity - 1)
    mask: usize,
    /// Configured slot count for the first allocation
    initial: usize,
    /// Slot count the next allocation starts at
    first: usize,
}

impl<E> RetentionRing<E> {
    /// Create an empty ring that allocates at least `min_capacity` slots
    /// once the first event is pushed. Rounded up to the next power of 2.
    pub fn new(min_capacity: usize) -> Self {
        let initial = min_capacity.max(1).next_power_of_two();
        Self {
            slots: Vec::new(),
            head: 0,
            len: 0,
            mask: 0,
            initial,
            first: initial,
        }
    }

    /// Current slot capacity (power of 2, or 0 before the first push).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn slot(&self, index: usize) -> usize {
        (self.head + index) & self.mask
    }

    /// Append an event as the newest entry, growing if every slot is taken.
    pub fn push_back(&mut self, event: E) {
        if self.len == self.capacity() {
            self.grow();
        }
        let slot = self.slot(self.len);
        self.slots[slot] = Some(event);
        self.len += 1;
    }

    /// Remove and return the oldest event.
    pub fn pop_front(&mut self) -> Option<E> {
        if self.len == 0 {
            return None;
        }
        let event = self.slots[self.head].take();
        self.head = (self.head + 1) & self.mask;
        self.len -= 1;
        event
    }

    /// Event at logical position `index` (0 = oldest).
    #[inline]
    pub fn get(&self, index: usize) -> Option<&E> {
        if index >= self.len {
            return None;
        }
        self.slots[self.slot(index)].as_ref()
    }

    /// Oldest retained event.
    #[inline]
    pub fn front(&self) -> Option<&E> {
        self.get(0)
    }

    /// Iterate oldest to newest without consuming.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Drop every retained event. Keeps allocated capacity.
    pub fn clear(&mut self) {
        for i in 0..self.len {
            let slot = self.slot(i);
            self.slots[slot] = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Drop every retained event and free the slot storage.
    pub fn release(&mut self) {
        self.slots = Vec::new();
        self.head = 0;
        self.len = 0;
        self.mask = 0;
    }

    /// Empty the ring for a new window holding at most `max` events
    /// (`None` = no bound).
    ///
    /// Storage larger than the window needs is freed; `Some(0)` frees it
    /// unconditionally. The next allocation is sized for the window.
    pub fn rebound(&mut self, max: Option<usize>) {
        self.first = match max {
            Some(max) => max.clamp(1, self.initial).next_power_of_two(),
            None => self.initial,
        };
        let needed = max.map_or(usize::MAX, |max| {
            max.checked_next_power_of_two().unwrap_or(usize::MAX)
        });
        if max == Some(0) || self.capacity() > needed.max(self.first) {
            self.release();
        } else {
            self.clear();
        }
    }

    /// Double the slot count, unwrapping the contents to start at slot 0.
    fn grow(&mut self) {
        let capacity = match self.capacity() {
            0 => self.first,
            n => n * 2,
        };
        let mut slots = Vec::with_capacity(capacity);
        for i in 0..self.len {
            let slot = self.slot(i);
            slots.push(self.slots[slot].take());
        }
        slots.resize_with(capacity, || None);
        self.slots = slots;
        self.head = 0;
        self.mask = capacity - 1;
    }
}

impl<E> Default for RetentionRing<E> {
    fn default() -> Self {
        Self::new(16)
    }
}
