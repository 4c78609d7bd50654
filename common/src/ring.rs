//! Fixed-capacity circular byte buffer.
//!
//! Occupancy is tracked by an explicit `stored` counter. `head == tail` holds both when the buffer
//! is empty and when it is full, so spans are always derived from `stored` and never from comparing
//! the cursors alone.

/// A contiguous run of slots inside the buffer storage.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub offset: usize,
    pub len: usize,
}

impl Span {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

#[derive(Debug)]
pub struct RingBuffer {
    storage: Box<[u8]>,
    // index of the next unread byte
    head: usize,
    // index of the next free slot
    tail: usize,
    stored: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        Self::from_storage(vec![0; capacity].into_boxed_slice())
    }

    /// Like [`RingBuffer::new`] but reports a failed allocation instead of aborting.
    pub fn try_new(capacity: usize) -> Result<Self, std::collections::TryReserveError> {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        let mut storage = Vec::new();
        storage.try_reserve_exact(capacity)?;
        storage.resize(capacity, 0);
        Ok(Self::from_storage(storage.into_boxed_slice()))
    }

    fn from_storage(storage: Box<[u8]>) -> Self {
        Self {
            storage,
            head: 0,
            tail: 0,
            stored: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn stored(&self) -> usize {
        self.stored
    }

    pub fn free(&self) -> usize {
        self.capacity() - self.stored
    }

    pub fn is_empty(&self) -> bool {
        self.stored == 0
    }

    pub fn is_full(&self) -> bool {
        self.stored == self.capacity()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Largest run of free slots starting at `tail`.
    ///
    /// The run stops at the physical end of storage or at `head`, whichever comes first. A full
    /// buffer yields an empty span.
    pub fn writable_span(&self) -> Span {
        let free = self.free();
        if free == 0 {
            return Span {
                offset: self.tail,
                len: 0,
            };
        }
        let len = if self.tail < self.head {
            self.head - self.tail
        } else {
            self.capacity() - self.tail
        };
        Span {
            offset: self.tail,
            len: len.min(free),
        }
    }

    /// Largest run of occupied slots starting at `head`.
    ///
    /// Only the first contiguous run is returned. Data that wraps past the end of storage is served
    /// by a second call once this span has been committed.
    pub fn readable_span(&self) -> Span {
        Span {
            offset: self.head,
            len: self.stored.min(self.capacity() - self.head),
        }
    }

    pub fn slice(&self, span: Span) -> &[u8] {
        &self.storage[span.range()]
    }

    pub fn slice_mut(&mut self, span: Span) -> &mut [u8] {
        &mut self.storage[span.range()]
    }

    /// Marks `n` bytes at `tail` as filled. `n` must not exceed the last writable span.
    pub fn commit_write(&mut self, n: usize) {
        assert!(
            n <= self.free() && n <= self.capacity() - self.tail,
            "commit_write({n}) past writable span (tail: {}, stored: {}, capacity: {})",
            self.tail,
            self.stored,
            self.capacity()
        );
        self.tail = (self.tail + n) % self.capacity();
        self.stored += n;
    }

    /// Marks `n` bytes at `head` as consumed. `n` must not exceed the last readable span.
    pub fn commit_read(&mut self, n: usize) {
        assert!(
            n <= self.stored && n <= self.capacity() - self.head,
            "commit_read({n}) past readable span (head: {}, stored: {}, capacity: {})",
            self.head,
            self.stored,
            self.capacity()
        );
        self.head = (self.head + n) % self.capacity();
        self.stored -= n;
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let capacity = self.capacity();
        assert!(self.stored <= capacity);
        assert!(self.head < capacity);
        assert!(self.tail < capacity);
        assert_eq!(
            (self.tail + capacity - self.head) % capacity,
            self.stored % capacity
        );
    }
}
