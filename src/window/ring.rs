//! Fixed-capacity circular buffer.
//!
//! Backs the window store when [`QueueBacking::FixedCapacity`] is selected:
//! all slots are allocated up front and steady-state operation performs no
//! allocation. Overflow is a usage error, never a silent overwrite — the
//! engine's capacity check resets the window before the buffer can fill past
//! its bound.
//!
//! [`QueueBacking::FixedCapacity`]: crate::config::QueueBacking::FixedCapacity

#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be > 0");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append at the tail.
    ///
    /// # Panics
    /// Panics if the buffer is full; callers must reset or drain first.
    pub fn push_back(&mut self, value: T) {
        assert!(self.len < self.capacity(), "push into full ring buffer");
        let idx = (self.head + self.len) % self.capacity();
        self.slots[idx] = Some(value);
        self.len += 1;
    }

    /// Remove and return the oldest element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        value
    }

    /// The oldest element, if any.
    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    /// The newest element, if any.
    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.len - 1) % self.capacity();
        self.slots[idx].as_ref()
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).filter_map(move |i| {
            let idx = (self.head + i) % self.capacity();
            self.slots[idx].as_ref()
        })
    }
}
