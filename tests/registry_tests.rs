//! Integration tests for the topic registry

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    use epochbus::{BusError, Registry, TopicKind};

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert_eq!(registry.topic_count(), 0);
        assert_eq!(registry.stats().active_topics(), 0);
        assert!(registry.list_topics().is_empty());
    }

    #[test]
    fn test_shared_handle_scenario() {
        let registry = Registry::new();
        let a = registry.get_or_create_byte_topic("/imu", 4).unwrap();
        let b = registry.get_or_create_byte_topic("/imu", 4).unwrap();

        assert!(a.same_topic(&b));
        assert_eq!(a.id(), b.id());
        assert_eq!(registry.topic_count(), 1);

        let epoch = a.publish(&[1, 2, 3]).unwrap();
        assert_eq!(epoch, 1);
        assert_eq!(b.latest_epoch(), 1);

        let mut out = [0u8; 16];
        let received = b.try_receive(&mut out).unwrap().unwrap();
        assert_eq!(&out[..received.len], &[1, 2, 3]);
        assert_eq!(received.epoch, 1);
        assert!(a.is_empty());
    }

    #[test]
    fn test_capacity_mismatch_leaves_original() {
        let registry = Registry::new();
        let original = registry.get_or_create_byte_topic("/x", 4).unwrap();
        original.publish(&[9]).unwrap();

        let err = registry.get_or_create_byte_topic("/x", 8).unwrap_err();
        assert_eq!(err, BusError::capacity_mismatch("/x", 4, 8));

        let again = registry.get_or_create_byte_topic("/x", 4).unwrap();
        assert!(again.same_topic(&original));
        assert_eq!(again.capacity(), 4);
        assert_eq!(again.latest_epoch(), 1);
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_kind_mismatch() {
        let registry = Registry::new();
        registry.get_or_create_typed_topic("/pose", 4, 24).unwrap();

        let err = registry.get_or_create_byte_topic("/pose", 4).unwrap_err();
        assert_eq!(
            err,
            BusError::kind_mismatch("/pose", TopicKind::Typed, TopicKind::Byte)
        );
        assert!(matches!(
            registry.lookup_byte_topic("/pose"),
            Err(BusError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_size_mismatch() {
        let registry = Registry::new();
        registry.get_or_create_typed_topic("/depth", 4, 4).unwrap();
        assert_eq!(
            registry.get_or_create_typed_topic("/depth", 4, 8).unwrap_err(),
            BusError::size_mismatch(4, 8)
        );

        registry
            .get_or_create_byte_topic_with_max_payload("/frame", 2, 1024)
            .unwrap();
        assert!(matches!(
            registry.get_or_create_byte_topic_with_max_payload("/frame", 2, 512),
            Err(BusError::SizeMismatch { expected: 1024, actual: 512 })
        ));
        // Plain lookup accepts whatever bound the topic has
        let frame = registry.get_or_create_byte_topic("/frame", 2).unwrap();
        assert_eq!(frame.max_payload(), 1024);
    }

    #[test]
    fn test_invalid_arguments() {
        let registry = Registry::new();
        assert!(matches!(
            registry.get_or_create_byte_topic("", 4),
            Err(BusError::InvalidParameter { .. })
        ));
        assert!(matches!(
            registry.get_or_create_byte_topic("/zero", 0),
            Err(BusError::InvalidParameter { .. })
        ));
        assert!(matches!(
            registry.get_or_create_typed_topic("/zero", 4, 0),
            Err(BusError::InvalidParameter { .. })
        ));
        assert_eq!(registry.topic_count(), 0);
    }

    #[test]
    fn test_lookup_without_creation() {
        let registry = Registry::new();
        assert!(matches!(
            registry.lookup_byte_topic("/missing"),
            Err(BusError::NotFound { .. })
        ));
        assert!(!registry.has_topic("/missing"));

        let created = registry.get_or_create_typed_topic("/t", 4, 8).unwrap();
        let found = registry.lookup_typed_topic("/t").unwrap();
        assert!(found.same_topic(&created));
        assert!(registry.has_topic("/t"));
    }

    #[test]
    fn test_stale_handle_after_release() {
        let registry = Registry::new();
        let topic = registry.get_or_create_byte_topic("/imu", 4).unwrap();
        let id = topic.id();
        topic.publish(&[1]).unwrap();

        registry.release(id).unwrap();

        let mut out = [0u8; 8];
        assert!(matches!(topic.publish(&[2]), Err(BusError::NotFound { .. })));
        assert!(matches!(topic.try_receive(&mut out), Err(BusError::NotFound { .. })));
        assert!(matches!(registry.resolve_byte_topic(id), Err(BusError::NotFound { .. })));
        assert!(!registry.has_topic("/imu"));

        // A new topic under the same name is a fresh stream
        let fresh = registry.get_or_create_byte_topic("/imu", 4).unwrap();
        assert!(!fresh.same_topic(&topic));
        assert_ne!(fresh.id(), id);
        assert_eq!(fresh.latest_epoch(), 0);
    }

    #[test]
    fn test_resolve_by_id() {
        let registry = Registry::new();
        let byte = registry.get_or_create_byte_topic("/b", 4).unwrap();
        let typed = registry.get_or_create_typed_topic("/t", 4, 4).unwrap();

        assert_eq!(registry.resolve(byte.id()).unwrap().kind(), TopicKind::Byte);
        assert!(registry.resolve_typed_topic(typed.id()).unwrap().same_topic(&typed));
        assert!(matches!(
            registry.resolve_typed_topic(byte.id()),
            Err(BusError::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_concurrent_creation_yields_one_topic() {
        let registry = Arc::new(Registry::new());
        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.get_or_create_byte_topic("/race", 16).unwrap()
                })
            })
            .collect();

        let topics: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for topic in &topics[1..] {
            assert!(topic.same_topic(&topics[0]));
        }
        assert_eq!(registry.topic_count(), 1);
        assert_eq!(registry.stats().active_topics(), 1);
    }
}
