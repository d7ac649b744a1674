//! Tests for topic components

#[cfg(test)]
mod tests {
    use crate::error::BusError;
    use crate::registry::TopicId;
    use crate::topic::*;

    #[test]
    fn test_byte_topic_defaults() {
        let topic = ByteTopic::new("/imu", 4).unwrap();
        assert_eq!(topic.name(), "/imu");
        assert_eq!(topic.id(), TopicId::DETACHED);
        assert_eq!(topic.capacity(), 4);
        assert_eq!(topic.max_payload(), 244);
        assert_eq!(topic.slot_size(), 256);
        assert_eq!(topic.latest_epoch(), 0);
        assert!(topic.is_empty());
    }

    #[test]
    fn test_byte_topic_vec_helpers() {
        let topic = ByteTopic::with_max_payload("/cmd", 4, 32).unwrap();
        topic.publish(b"forward").unwrap();
        topic.publish(b"stop").unwrap();

        let (latest, epoch) = topic.peek_latest_vec().unwrap().unwrap();
        assert_eq!(latest, b"stop");
        assert_eq!(epoch, 2);

        let (first, epoch) = topic.try_receive_vec().unwrap().unwrap();
        assert_eq!(first, b"forward");
        assert_eq!(epoch, 1);

        let rest = topic.drain_vec().unwrap();
        assert_eq!(rest, vec![(b"stop".to_vec(), 2)]);
        assert!(topic.try_receive_vec().unwrap().is_none());
    }

    #[test]
    fn test_twelve_byte_publish() {
        let topic = ByteTopic::new("/imu", 8).unwrap();
        let payload: Vec<u8> = (1..=12).collect();
        assert_eq!(topic.publish(&payload).unwrap(), 1);

        let mut out = [0u8; 64];
        let received = topic.try_receive(&mut out).unwrap().unwrap();
        assert_eq!(received.len, 12);
        assert_eq!(received.epoch, 1);
        assert_eq!(&out[..12], payload.as_slice());
    }

    #[test]
    fn test_typed_topic_messages() {
        let topic = TypedTopic::for_message::<[f32; 3]>("/accel", 4).unwrap();
        assert_eq!(topic.msg_size(), 12);
        assert_eq!(topic.slot_size(), 20);

        topic.publish_message(&[0.0f32, 0.0, 9.81]).unwrap();
        topic.publish_message(&[0.1f32, 0.0, 9.80]).unwrap();

        let (latest, epoch) = topic.peek_latest_message::<[f32; 3]>().unwrap().unwrap();
        assert_eq!(latest, [0.1, 0.0, 9.80]);
        assert_eq!(epoch, 2);

        let (first, epoch) = topic.try_receive_message::<[f32; 3]>().unwrap().unwrap();
        assert_eq!(first, [0.0, 0.0, 9.81]);
        assert_eq!(epoch, 1);
    }

    #[test]
    fn test_typed_topic_rejects_wrong_message_type() {
        let topic = TypedTopic::new("/depth", 4, 8).unwrap();
        assert!(matches!(
            topic.publish_message(&1u32),
            Err(BusError::SizeMismatch { expected: 8, actual: 4 })
        ));
        assert!(topic.try_receive_message::<u16>().is_err());

        assert!(topic.publish_message(&1.5f64).is_ok());
        let (value, _) = topic.try_receive_message::<f64>().unwrap().unwrap();
        assert_eq!(value, 1.5);
    }

    #[test]
    fn test_clones_share_storage() {
        let a = ByteTopic::new("/shared", 4).unwrap();
        let b = a.clone();
        let other = ByteTopic::new("/shared", 4).unwrap();

        assert!(a.same_topic(&b));
        assert!(!a.same_topic(&other));

        a.publish(&[1]).unwrap();
        assert_eq!(b.latest_epoch(), 1);
        assert_eq!(other.latest_epoch(), 0);
    }

    #[test]
    fn test_released_topic_returns_not_found() {
        let topic = ByteTopic::new("/gone", 4).unwrap();
        topic.publish(&[1]).unwrap();
        topic.mark_released();

        let mut out = [0u8; 8];
        assert!(matches!(topic.publish(&[2]), Err(BusError::NotFound { .. })));
        assert!(matches!(topic.try_receive(&mut out), Err(BusError::NotFound { .. })));
        assert!(matches!(topic.peek_latest(&mut out), Err(BusError::NotFound { .. })));
        assert!(topic.is_released());
    }

    #[test]
    fn test_topic_stats() {
        let topic = ByteTopic::with_max_payload("/stats", 2, 4).unwrap();
        let mut out = [0u8; 4];

        topic.publish(&[1]).unwrap();
        topic.publish(&[2]).unwrap();
        topic.publish(&[3]).unwrap();
        assert!(topic.publish(&[0u8; 5]).is_err());
        topic.peek_latest(&mut out).unwrap();
        topic.try_receive(&mut out).unwrap();

        let snapshot = topic.stats().snapshot();
        assert_eq!(snapshot.messages_published, 3);
        assert_eq!(snapshot.messages_overwritten, 1);
        assert_eq!(snapshot.publishes_rejected, 1);
        assert_eq!(snapshot.messages_peeked, 1);
        assert_eq!(snapshot.messages_consumed, 1);

        topic.stats().reset();
        assert_eq!(topic.stats().snapshot(), TopicStatsSnapshot::default());
    }

    #[test]
    fn test_invalid_topic_parameters() {
        assert!(matches!(
            ByteTopic::new("", 4),
            Err(BusError::InvalidParameter { .. })
        ));
        assert!(matches!(
            ByteTopic::new("/x", 0),
            Err(BusError::InvalidParameter { .. })
        ));
        assert!(matches!(
            TypedTopic::new("/x", 4, 0),
            Err(BusError::InvalidParameter { .. })
        ));
    }
}
