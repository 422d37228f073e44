//! Ring Buffer Tests
//!
//! Tests for the single-producer single-consumer byte ring used by the
//! USART channels.

use proptest::prelude::*;

use sim808_firmware::transport::RingBuffer;
use sim808_firmware::types::Error;

// ============================================================================
// Basic Tests
// ============================================================================

#[test]
fn test_new_buffer_is_empty() {
    let ring: RingBuffer<8> = RingBuffer::new();
    assert!(ring.is_empty());
    assert!(!ring.is_full());
    assert_eq!(ring.len(), 0);
}

#[test]
fn test_capacity_is_one_less_than_storage() {
    let ring: RingBuffer<8> = RingBuffer::new();
    assert_eq!(ring.capacity(), 7);
}

#[test]
fn test_push_pop_single_byte() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    ring.push(0x42).unwrap();
    assert_eq!(ring.len(), 1);
    assert_eq!(ring.pop(), Some(0x42));
    assert!(ring.is_empty());
}

#[test]
fn test_pop_empty_returns_none() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_fifo_order() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    for byte in 1..=5 {
        ring.push(byte).unwrap();
    }
    for byte in 1..=5 {
        assert_eq!(ring.pop(), Some(byte));
    }
}

// ============================================================================
// Full Buffer Tests
// ============================================================================

#[test]
fn test_fill_to_capacity() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    for byte in 0..7 {
        ring.push(byte).unwrap();
    }
    assert!(ring.is_full());
    assert_eq!(ring.len(), 7);
}

#[test]
fn test_push_full_rejects_byte() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    for byte in 0..7 {
        ring.push(byte).unwrap();
    }
    assert_eq!(ring.push(0xFF), Err(Error::BufferFull));
}

#[test]
fn test_rejected_push_leaves_contents_unchanged() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    for byte in 0..7 {
        ring.push(byte).unwrap();
    }
    let _ = ring.push(0xFF);
    for byte in 0..7 {
        assert_eq!(ring.pop(), Some(byte));
    }
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_full_then_drained_is_reusable() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    for byte in 0..7 {
        ring.push(byte).unwrap();
    }
    while ring.pop().is_some() {}
    ring.push(0xAB).unwrap();
    assert_eq!(ring.pop(), Some(0xAB));
}

// ============================================================================
// Wraparound Tests
// ============================================================================

#[test]
fn test_indices_wrap_around_storage() {
    let mut ring: RingBuffer<4> = RingBuffer::new();
    // Three full revolutions through the 4-slot storage.
    for byte in 0..12u8 {
        ring.push(byte).unwrap();
        assert_eq!(ring.pop(), Some(byte));
    }
    assert!(ring.is_empty());
}

#[test]
fn test_interleaved_push_pop() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    ring.push(1).unwrap();
    ring.push(2).unwrap();
    assert_eq!(ring.pop(), Some(1));
    ring.push(3).unwrap();
    ring.push(4).unwrap();
    assert_eq!(ring.pop(), Some(2));
    assert_eq!(ring.pop(), Some(3));
    assert_eq!(ring.pop(), Some(4));
    assert_eq!(ring.pop(), None);
}

#[test]
fn test_clear_discards_contents() {
    let mut ring: RingBuffer<8> = RingBuffer::new();
    ring.push(1).unwrap();
    ring.push(2).unwrap();
    ring.clear();
    assert!(ring.is_empty());
    assert_eq!(ring.pop(), None);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Accepted bytes come back out in push order, rejected bytes leave
    /// no trace.
    #[test]
    fn prop_fifo_order_preserved(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let mut ring: RingBuffer<16> = RingBuffer::new();
        let mut accepted = Vec::new();
        for &byte in &bytes {
            if ring.push(byte).is_ok() {
                accepted.push(byte);
            }
        }
        let mut drained = Vec::new();
        while let Some(byte) = ring.pop() {
            drained.push(byte);
        }
        prop_assert_eq!(drained, accepted);
    }

    /// Length tracks pushes and pops exactly while below capacity.
    #[test]
    fn prop_len_matches_occupancy(push_count in 0usize..15) {
        let mut ring: RingBuffer<16> = RingBuffer::new();
        for byte in 0..push_count {
            ring.push(byte as u8).unwrap();
            prop_assert_eq!(ring.len(), byte + 1);
        }
        for remaining in (0..push_count).rev() {
            ring.pop().unwrap();
            prop_assert_eq!(ring.len(), remaining);
        }
    }
}
