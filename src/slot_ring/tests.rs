//! Tests for the slot ring engine

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc, Barrier,
        },
        thread,
    };

    use crate::error::BusError;
    use crate::slot_ring::{ByteLayout, ByteSlotHeader, SlotHeader, SlotRing, TypedLayout};

    fn byte_ring(capacity: usize) -> SlotRing<ByteLayout> {
        SlotRing::new(capacity, ByteLayout::default()).unwrap()
    }

    #[test]
    fn test_fifo_with_sequential_epochs() {
        let ring = byte_ring(8);
        let payloads: Vec<Vec<u8>> = (0..5u8).map(|i| vec![i; i as usize + 1]).collect();

        for (i, payload) in payloads.iter().enumerate() {
            let outcome = ring.publish(payload).unwrap();
            assert_eq!(outcome.epoch, i as u64 + 1);
            assert_eq!(outcome.overwritten, 0);
        }

        let mut out = [0u8; 256];
        for (i, payload) in payloads.iter().enumerate() {
            let received = ring.try_receive(&mut out).unwrap().unwrap();
            assert_eq!(received.epoch, i as u64 + 1);
            assert_eq!(&out[..received.len], payload.as_slice());
        }

        assert!(ring.try_receive(&mut out).unwrap().is_none());
        assert!(ring.is_empty());
    }

    #[test]
    fn test_empty_ring_reports_no_data() {
        let ring = byte_ring(4);
        let mut out = [0u8; 16];

        assert!(ring.try_receive(&mut out).unwrap().is_none());
        assert!(ring.peek_latest(&mut out).unwrap().is_none());
        assert!(ring.peek_oldest(&mut out).unwrap().is_none());
        assert_eq!(ring.latest_epoch(), 0);
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_overwrite_keeps_last_capacity_entries() {
        let ring = byte_ring(3);
        let mut dropped = 0;
        for i in 1..=5u8 {
            dropped += ring.publish(&[i]).unwrap().overwritten;
            assert!(ring.len() <= 3);
        }

        assert_eq!(dropped, 2);
        assert!(ring.is_full());
        assert_eq!(ring.latest_epoch(), 5);

        let mut out = [0u8; 8];
        let mut drained = Vec::new();
        while let Some(received) = ring.try_receive(&mut out).unwrap() {
            drained.push((out[0], received.epoch));
        }
        assert_eq!(drained, vec![(3, 3), (4, 4), (5, 5)]);
    }

    #[test]
    fn test_wraparound_interleaved() {
        let ring = byte_ring(3);
        let mut out = [0u8; 8];

        for i in 1..=3u8 {
            ring.publish(&[i]).unwrap();
        }
        assert_eq!(ring.try_receive(&mut out).unwrap().unwrap().epoch, 1);

        ring.publish(&[4]).unwrap();
        assert_eq!(ring.len(), 3);

        let mut values = Vec::new();
        while let Some(received) = ring.try_receive(&mut out).unwrap() {
            values.push(out[..received.len].to_vec());
        }
        assert_eq!(values, vec![vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn test_buffer_too_small_does_not_consume() {
        let ring = byte_ring(4);
        ring.publish(&[7u8; 12]).unwrap();

        let mut small = [0u8; 4];
        let err = ring.try_receive(&mut small).unwrap_err();
        assert_eq!(err, BusError::buffer_too_small(12, 4));
        assert_eq!(ring.len(), 1);

        let mut large = [0u8; 64];
        let received = ring.try_receive(&mut large).unwrap().unwrap();
        assert_eq!(received.len, 12);
        assert_eq!(&large[..12], &[7u8; 12]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_payload_too_large_rejected() {
        let ring = SlotRing::new(4, ByteLayout::new(16).unwrap()).unwrap();
        assert!(ring.publish(&[0u8; 16]).is_ok());
        assert_eq!(
            ring.publish(&[0u8; 17]).unwrap_err(),
            BusError::payload_too_large(17, 16)
        );
        assert_eq!(ring.latest_epoch(), 1);
    }

    #[test]
    fn test_peek_latest_is_independent_of_drain() {
        let ring = byte_ring(4);
        ring.publish(&[1, 2, 3]).unwrap();
        ring.publish(&[10, 20]).unwrap();

        let mut out = [0u8; 16];
        let latest = ring.peek_latest(&mut out).unwrap().unwrap();
        assert_eq!((latest.len, latest.epoch), (2, 2));
        assert_eq!(&out[..2], &[10, 20]);
        assert_eq!(ring.len(), 2);

        ring.try_receive(&mut out).unwrap().unwrap();
        ring.try_receive(&mut out).unwrap().unwrap();
        assert!(ring.is_empty());

        // Still visible after the queue is drained
        let latest = ring.peek_latest(&mut out).unwrap().unwrap();
        assert_eq!(latest.epoch, 2);
        assert_eq!(&out[..latest.len], &[10, 20]);
    }

    #[test]
    fn test_peek_oldest_does_not_consume() {
        let ring = byte_ring(4);
        ring.publish(&[1, 2, 3]).unwrap();
        ring.publish(&[4]).unwrap();

        let mut out = [0u8; 16];
        let oldest = ring.peek_oldest(&mut out).unwrap().unwrap();
        assert_eq!(oldest.epoch, 1);
        assert_eq!(&out[..oldest.len], &[1, 2, 3]);
        assert_eq!(ring.len(), 2);
    }

    #[test]
    fn test_raw_slot_layout() {
        let ring = byte_ring(2);
        ring.publish(&[0xAA, 0xBB, 0xCC]).unwrap();

        let raw = ring.raw_slot(1).unwrap();
        assert_eq!(raw.len(), 256);
        let header = ByteSlotHeader::decode(&raw);
        assert_eq!(header, ByteSlotHeader { epoch: 1, length: 3 });
        assert_eq!(&raw[ByteSlotHeader::SIZE..ByteSlotHeader::SIZE + 3], &[0xAA, 0xBB, 0xCC]);

        ring.publish(&[1]).unwrap();
        ring.publish(&[2]).unwrap();
        assert!(ring.raw_slot(1).is_none(), "epoch 1 was overwritten");
        assert!(ring.raw_slot(4).is_none(), "epoch 4 not published yet");
    }

    #[test]
    fn test_typed_ring_enforces_exact_sizes() {
        let ring = SlotRing::new(4, TypedLayout::new(8).unwrap()).unwrap();
        assert_eq!(ring.slot_size(), 16);

        assert!(matches!(
            ring.publish(&[0u8; 4]),
            Err(BusError::SizeMismatch { expected: 8, actual: 4 })
        ));

        ring.publish(&42u64.to_le_bytes()).unwrap();

        let mut wrong = [0u8; 16];
        assert!(matches!(
            ring.try_receive(&mut wrong),
            Err(BusError::SizeMismatch { expected: 8, actual: 16 })
        ));
        assert_eq!(ring.len(), 1);

        let mut out = [0u8; 8];
        let received = ring.try_receive(&mut out).unwrap().unwrap();
        assert_eq!(received, crate::slot_ring::Received { len: 8, epoch: 1 });
        assert_eq!(u64::from_le_bytes(out), 42);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = SlotRing::new(0, ByteLayout::default());
        assert!(matches!(result, Err(BusError::InvalidParameter { .. })));
    }

    #[test]
    fn test_spsc_threaded_order() {
        let ring = Arc::new(byte_ring(2048));
        let done = Arc::new(AtomicBool::new(false));
        let num_items: u32 = 1000;

        let producer = {
            let ring = Arc::clone(&ring);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for i in 0..num_items {
                    ring.publish(&i.to_le_bytes()).unwrap();
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let consumer = {
            let ring = Arc::clone(&ring);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut out = [0u8; 4];
                let mut received = Vec::new();
                loop {
                    match ring.try_receive(&mut out).unwrap() {
                        Some(r) => received.push((u32::from_le_bytes(out), r.epoch)),
                        None if done.load(Ordering::SeqCst) => {
                            while let Some(r) = ring.try_receive(&mut out).unwrap() {
                                received.push((u32::from_le_bytes(out), r.epoch));
                            }
                            break;
                        }
                        None => std::hint::spin_loop(),
                    }
                }
                received
            })
        };

        producer.join().unwrap();
        let received = consumer.join().unwrap();

        assert_eq!(received.len(), num_items as usize);
        for (i, (value, epoch)) in received.iter().enumerate() {
            assert_eq!(*value, i as u32);
            assert_eq!(*epoch, i as u64 + 1);
        }
    }

    #[test]
    fn test_concurrent_publishers_gap_free_epochs() {
        let ring = Arc::new(byte_ring(64));
        let publishers = 4;
        let per_publisher = 500;
        let barrier = Arc::new(Barrier::new(publishers));

        let handles: Vec<_> = (0..publishers)
            .map(|_| {
                let ring = Arc::clone(&ring);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..per_publisher)
                        .map(|i: u32| ring.publish(&i.to_le_bytes()).unwrap().epoch)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut epochs: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        epochs.sort_unstable();

        let total = (publishers * per_publisher as usize) as u64;
        assert_eq!(epochs, (1..=total).collect::<Vec<_>>());
        assert_eq!(ring.latest_epoch(), total);
        assert!(ring.len() <= ring.capacity());
    }

    #[test]
    fn test_readers_never_see_torn_slots() {
        // Payload is the epoch repeated; any mix of two publishes is detectable
        let ring = Arc::new(SlotRing::new(8, ByteLayout::new(64).unwrap()).unwrap());
        let done = Arc::new(AtomicBool::new(false));
        let total: u64 = 5000;

        let writer = {
            let ring = Arc::clone(&ring);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for epoch in 1..=total {
                    let payload: Vec<u8> = epoch.to_le_bytes().repeat(8);
                    assert_eq!(ring.publish(&payload).unwrap().epoch, epoch);
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|reader| {
                let ring = Arc::clone(&ring);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut out = [0u8; 64];
                    let mut seen = HashSet::new();
                    let mut last_peeked = 0;
                    while !done.load(Ordering::SeqCst) {
                        let result = if reader == 0 {
                            ring.peek_latest(&mut out).unwrap()
                        } else {
                            ring.try_receive(&mut out).unwrap()
                        };
                        if let Some(r) = result {
                            assert_eq!(r.len, 64);
                            for chunk in out.chunks(8) {
                                assert_eq!(chunk, &r.epoch.to_le_bytes());
                            }
                            if reader == 0 {
                                assert!(r.epoch >= last_peeked);
                                last_peeked = r.epoch;
                            } else {
                                assert!(seen.insert(r.epoch), "epoch delivered twice");
                            }
                        }
                    }
                    seen
                })
            })
            .collect();

        writer.join().unwrap();
        let sets: Vec<HashSet<u64>> = readers.into_iter().map(|h| h.join().unwrap()).collect();

        // Consumers never share an entry
        assert!(sets[1].is_disjoint(&sets[2]));
        assert_eq!(ring.latest_epoch(), total);
    }
}
