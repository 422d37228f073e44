//! Fixed-capacity circular byte FIFO shared between interrupt and
//! main-line code.
//!
//! Each buffer has exactly one producer and one consumer, assigned for
//! its whole lifetime: the receive ring is filled by the RX interrupt
//! and drained by the application, the transmit ring is filled by the
//! application and drained by the TX-ready interrupt. `head` moves only
//! on push, `tail` only on pop, both as single word-sized wrapping
//! writes; never hand one ring two writers.

use crate::types::Error;

/// Circular byte buffer with wrapping read/write cursors
///
/// One slot is always left unused so a full buffer (`head + 1 == tail`)
/// stays distinguishable from an empty one (`head == tail`); usable
/// capacity is `N - 1`.
pub struct RingBuffer<const N: usize> {
    buffer: [u8; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty ring buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            head: 0,
            tail: 0,
        }
    }

    /// Usable capacity in bytes
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Enqueue one byte at the head
    ///
    /// Fails with [`Error::BufferFull`] when advancing the head would
    /// reach the tail; the byte is dropped and the contents are left
    /// unchanged. This is the producer's only back-pressure signal.
    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        let next = (self.head + 1) % N;
        if next == self.tail {
            return Err(Error::BufferFull);
        }
        self.buffer[self.head] = byte;
        self.head = next;
        Ok(())
    }

    /// Dequeue one byte from the tail, oldest first
    pub fn pop(&mut self) -> Option<u8> {
        if self.head == self.tail {
            return None;
        }
        let byte = self.buffer[self.tail];
        self.tail = (self.tail + 1) % N;
        Some(byte)
    }

    /// Number of bytes currently queued
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            N - self.tail + self.head
        }
    }

    /// Check whether the buffer holds no bytes
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Check whether the next push would fail
    #[must_use]
    pub const fn is_full(&self) -> bool {
        (self.head + 1) % N == self.tail
    }

    /// Discard all queued bytes
    pub fn clear(&mut self) {
        self.tail = self.head;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
