//! Ring buffer tests

use sonar_sweep::system::ring_buffer::RingBuffer;
use sonar_sweep::QueueFull;

#[test]
fn test_new_queue_is_empty() {
    let queue: RingBuffer<4> = RingBuffer::new();
    assert!(queue.is_empty());
    assert!(!queue.is_full());
    assert_eq!(queue.len(), 0);
    assert_eq!(queue.capacity(), 3);
}

#[test]
fn test_capacity_four_scenario() {
    let mut queue: RingBuffer<4> = RingBuffer::new();

    assert_eq!(queue.enqueue(b'A'), Ok(()));
    assert_eq!(queue.enqueue(b'B'), Ok(()));
    assert_eq!(queue.enqueue(b'C'), Ok(()));
    assert!(queue.is_full());

    // Full: D is refused and comes back
    assert_eq!(queue.enqueue(b'D'), Err(QueueFull(b'D')));
    assert_eq!(queue.len(), 3);

    assert_eq!(queue.dequeue(), Some(b'A'));
    assert_eq!(queue.enqueue(b'D'), Ok(()));

    assert_eq!(queue.dequeue(), Some(b'B'));
    assert_eq!(queue.dequeue(), Some(b'C'));
    assert_eq!(queue.dequeue(), Some(b'D'));
    assert_eq!(queue.dequeue(), None);
}

#[test]
fn test_dequeue_empty_leaves_state() {
    let mut queue: RingBuffer<8> = RingBuffer::new();
    assert_eq!(queue.dequeue(), None);
    assert_eq!(queue.enqueue(1), Ok(()));
    assert_eq!(queue.dequeue(), Some(1));
    assert_eq!(queue.dequeue(), None);
    assert!(queue.is_empty());
}

#[test]
fn test_full_only_after_n_minus_one() {
    let mut queue: RingBuffer<16> = RingBuffer::new();
    for i in 0..15u8 {
        assert!(!queue.is_full(), "full after {} bytes", i);
        assert_eq!(queue.enqueue(i), Ok(()));
    }
    assert!(queue.is_full());
    assert_eq!(queue.len(), 15);
}

/// Deterministic mixed enqueue/dequeue sequence checked against a model queue.
#[test]
fn test_fifo_order_against_model() {
    let mut queue: RingBuffer<5> = RingBuffer::new();
    let mut model = std::collections::VecDeque::new();
    let mut seed: u32 = 0x1234_5678;
    let mut next_byte = 0u8;

    for _ in 0..2000 {
        // xorshift32
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;

        if seed % 3 != 0 {
            let result = queue.enqueue(next_byte);
            if model.len() == 4 {
                assert_eq!(result, Err(QueueFull(next_byte)));
            } else {
                assert_eq!(result, Ok(()));
                model.push_back(next_byte);
            }
            next_byte = next_byte.wrapping_add(1);
        } else {
            assert_eq!(queue.dequeue(), model.pop_front());
        }

        assert_eq!(queue.len(), model.len());
        assert_eq!(queue.is_full(), model.len() == 4);
        assert_eq!(queue.is_empty(), model.is_empty());
    }
}

#[test]
fn test_split_halves() {
    let mut queue: RingBuffer<4> = RingBuffer::new();
    let (mut producer, mut consumer) = queue.split();

    assert!(consumer.is_empty());
    producer.enqueue(7).unwrap();
    producer.enqueue(8).unwrap();
    producer.enqueue(9).unwrap();
    assert!(producer.is_full());
    assert_eq!(producer.enqueue(10), Err(QueueFull(10)));

    assert_eq!(consumer.len(), 3);
    assert_eq!(consumer.dequeue(), Some(7));
    assert!(!producer.is_full());
}
