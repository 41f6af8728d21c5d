//! Fixed-capacity circular byte queue.
//!
//! `N` slots hold at most `N - 1` bytes; one slot stays free so that a full
//! queue (`(write + 1) % N == read`) can be told apart from an empty one
//! (`write == read`).
//!
//! # Single producer, single consumer
//!
//! The write index is only ever stored by the producer and the read index only
//! by the consumer, so one side may run in an interrupt handler while the other
//! runs at a different priority with no further locking. [`RingBuffer::split`]
//! hands out a [`Producer`] and a [`Consumer`] to make that ownership explicit.
//!
//! # Memory Ordering
//!
//! - Producer writes the slot, then publishes `write_idx` with `Release`
//! - Consumer reads `write_idx` with `Acquire` before touching the slot
//! - The consumer frees a slot the same way through `read_idx`

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::system::error::QueueFull;

pub struct RingBuffer<const N: usize> {
    slots: [UnsafeCell<u8>; N],
    read_idx: AtomicUsize,
    write_idx: AtomicUsize,
}

// SAFETY: a slot is written only while it is outside the readable window and
// read only while inside it; the window is published through the atomics.
// The `&self` paths are reachable only through `Producer`/`Consumer`, of which
// there is exactly one each per buffer.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY_CHECK: () = assert!(N >= 2, "ring buffer needs at least two slots");

    /// Create an empty queue.
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;
        Self {
            slots: [const { UnsafeCell::new(0) }; N],
            read_idx: AtomicUsize::new(0),
            write_idx: AtomicUsize::new(0),
        }
    }

    /// Number of bytes the queue can hold at once.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    pub fn is_full(&self) -> bool {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        Self::advance(write) == read
    }

    pub fn is_empty(&self) -> bool {
        self.write_idx.load(Ordering::Acquire) == self.read_idx.load(Ordering::Acquire)
    }

    /// Bytes currently stored.
    pub fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        (write + N - read) % N
    }

    /// Append a byte. A full queue is left untouched and the byte comes back
    /// in the error.
    pub fn enqueue(&mut self, byte: u8) -> Result<(), QueueFull> {
        self.push(byte)
    }

    /// Remove the oldest byte, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<u8> {
        self.pop()
    }

    /// Split into the producer and consumer halves.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let queue: &Self = self;
        (Producer { queue }, Consumer { queue })
    }

    #[inline]
    fn advance(idx: usize) -> usize {
        if idx + 1 == N {
            0
        } else {
            idx + 1
        }
    }

    /// Producer side. Callers guarantee a single producer.
    fn push(&self, byte: u8) -> Result<(), QueueFull> {
        let write = self.write_idx.load(Ordering::Relaxed);
        let next = Self::advance(write);
        if next == self.read_idx.load(Ordering::Acquire) {
            return Err(QueueFull(byte));
        }
        // SAFETY: `write` is outside the readable window until published below.
        unsafe { *self.slots[write].get() = byte };
        self.write_idx.store(next, Ordering::Release);
        Ok(())
    }

    /// Consumer side. Callers guarantee a single consumer.
    fn pop(&self) -> Option<u8> {
        let read = self.read_idx.load(Ordering::Relaxed);
        if read == self.write_idx.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `read` is inside the readable window, the producer won't touch it.
        let byte = unsafe { *self.slots[read].get() };
        self.read_idx.store(Self::advance(read), Ordering::Release);
        Some(byte)
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Writing half of a split [`RingBuffer`].
pub struct Producer<'a, const N: usize> {
    queue: &'a RingBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    pub fn enqueue(&mut self, byte: u8) -> Result<(), QueueFull> {
        self.queue.push(byte)
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }
}

/// Reading half of a split [`RingBuffer`].
pub struct Consumer<'a, const N: usize> {
    queue: &'a RingBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    pub fn dequeue(&mut self) -> Option<u8> {
        self.queue.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
