//! Publisher and Subscriber handles for topic communication

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use crate::{
    error::Result,
    slot_ring::{ByteLayout, Received, SlotLayout, TypedLayout},
    topic::{FixedMessage, Topic, TopicStats},
};

/// Publishing side of a topic
#[derive(Debug, Clone)]
pub struct Publisher<L: SlotLayout> {
    topic: Topic<L>,
}

impl<L: SlotLayout> Publisher<L> {
    pub fn new(topic: Topic<L>) -> Self {
        Self { topic }
    }

    /// Publish a payload and return its epoch
    pub fn publish(&self, data: &[u8]) -> Result<u64> {
        self.topic.publish(data)
    }

    /// Underlying topic
    pub fn topic(&self) -> &Topic<L> {
        &self.topic
    }

    pub fn topic_name(&self) -> &str {
        self.topic.name()
    }

    pub fn latest_epoch(&self) -> u64 {
        self.topic.latest_epoch()
    }

    /// Get topic statistics
    pub fn stats(&self) -> Arc<TopicStats> {
        self.topic.stats()
    }
}

impl Publisher<TypedLayout> {
    /// Encode and publish a fixed-size message
    pub fn publish_message<M: FixedMessage>(&self, message: &M) -> Result<u64> {
        self.topic.publish_message(message)
    }
}

/// Subscribing side of a topic
///
/// Tracks the last epoch this subscriber has seen, so a control loop can ask
/// whether fresh data arrived and how much it skipped.
#[derive(Debug)]
pub struct Subscriber<L: SlotLayout> {
    topic: Topic<L>,
    last_seen: AtomicU64,
}

impl<L: SlotLayout> Subscriber<L> {
    pub fn new(topic: Topic<L>) -> Self {
        Self {
            topic,
            last_seen: AtomicU64::new(0),
        }
    }

    fn record_seen(&self, epoch: u64) {
        self.last_seen.fetch_max(epoch, Ordering::AcqRel);
    }

    /// Consume the oldest unread entry
    pub fn try_receive(&self, out: &mut [u8]) -> Result<Option<Received>> {
        let received = self.topic.try_receive(out)?;
        if let Some(r) = received {
            self.record_seen(r.epoch);
        }
        Ok(received)
    }

    /// Copy the latest entry; does not touch the last-seen epoch
    pub fn peek_latest(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.topic.peek_latest(out)
    }

    /// Copy the latest entry only if it is newer than the last one seen
    pub fn poll_latest(&self, out: &mut [u8]) -> Result<Option<Received>> {
        if !self.has_new() {
            return Ok(None);
        }

        match self.topic.peek_latest(out)? {
            Some(r) if r.epoch > self.last_seen_epoch() => {
                self.record_seen(r.epoch);
                Ok(Some(r))
            }
            _ => Ok(None),
        }
    }

    /// Whether something was published after the last seen epoch
    pub fn has_new(&self) -> bool {
        self.topic.latest_epoch() > self.last_seen_epoch()
    }

    /// Treat everything published so far as seen
    pub fn mark_seen(&self) {
        self.record_seen(self.topic.latest_epoch());
    }

    pub fn last_seen_epoch(&self) -> u64 {
        self.last_seen.load(Ordering::Acquire)
    }

    /// Epochs strictly between the last seen one and the latest
    ///
    /// This is what a subscriber that only polls the latest value skips.
    pub fn missed_since_last_seen(&self) -> u64 {
        let latest = self.topic.latest_epoch();
        latest.saturating_sub(self.last_seen_epoch()).saturating_sub(1)
    }

    /// Underlying topic
    pub fn topic(&self) -> &Topic<L> {
        &self.topic
    }

    pub fn topic_name(&self) -> &str {
        self.topic.name()
    }

    /// Get topic statistics
    pub fn stats(&self) -> Arc<TopicStats> {
        self.topic.stats()
    }
}

impl Subscriber<ByteLayout> {
    /// Drain all pending messages
    pub fn drain_vec(&self) -> Result<Vec<(Vec<u8>, u64)>> {
        let messages = self.topic.drain_vec()?;
        if let Some((_, epoch)) = messages.last() {
            self.record_seen(*epoch);
        }
        Ok(messages)
    }
}

impl Subscriber<TypedLayout> {
    /// Consume and decode the oldest unread message
    pub fn try_receive_message<M: FixedMessage>(&self) -> Result<Option<(M, u64)>> {
        let message = self.topic.try_receive_message::<M>()?;
        if let Some((_, epoch)) = &message {
            self.record_seen(*epoch);
        }
        Ok(message)
    }

    /// Decode the latest message if it is newer than the last one seen
    pub fn poll_latest_message<M: FixedMessage>(&self) -> Result<Option<(M, u64)>> {
        if !self.has_new() {
            return Ok(None);
        }

        match self.topic.peek_latest_message::<M>()? {
            Some((message, epoch)) if epoch > self.last_seen_epoch() => {
                self.record_seen(epoch);
                Ok(Some((message, epoch)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::topic::{ByteTopic, TypedTopic};

    #[test]
    fn test_subscriber_tracks_last_seen() {
        let topic = ByteTopic::new("/imu", 8).unwrap();
        let publisher = topic.publisher();
        let subscriber = topic.subscriber();

        assert!(!subscriber.has_new());
        publisher.publish(&[1]).unwrap();
        publisher.publish(&[2]).unwrap();
        assert!(subscriber.has_new());
        assert_eq!(subscriber.missed_since_last_seen(), 1);

        subscriber.mark_seen();
        assert!(!subscriber.has_new());
        assert_eq!(subscriber.last_seen_epoch(), 2);
        assert_eq!(subscriber.missed_since_last_seen(), 0);
    }

    #[test]
    fn test_poll_latest_reports_each_epoch_once() {
        let topic = ByteTopic::new("/cmd", 4).unwrap();
        let subscriber = topic.subscriber();
        let mut out = [0u8; 16];

        assert!(subscriber.poll_latest(&mut out).unwrap().is_none());

        topic.publish(b"a").unwrap();
        topic.publish(b"b").unwrap();
        let r = subscriber.poll_latest(&mut out).unwrap().unwrap();
        assert_eq!((r.epoch, &out[..r.len]), (2, &b"b"[..]));
        assert!(subscriber.poll_latest(&mut out).unwrap().is_none());

        // Peeking did not consume anything
        assert_eq!(topic.len(), 2);
    }

    #[test]
    fn test_subscribers_are_independent() {
        let topic = ByteTopic::new("/odom", 4).unwrap();
        let fast = topic.subscriber();
        let slow = topic.subscriber();

        topic.publish(&[1]).unwrap();
        fast.mark_seen();
        assert!(!fast.has_new());
        assert!(slow.has_new());
    }

    #[test]
    fn test_drain_updates_last_seen() {
        let topic = ByteTopic::new("/log", 4).unwrap();
        let subscriber = topic.subscriber();
        for i in 0..3u8 {
            topic.publish(&[i]).unwrap();
        }

        let drained = subscriber.drain_vec().unwrap();
        assert_eq!(drained.len(), 3);
        assert_eq!(subscriber.last_seen_epoch(), 3);
        assert!(!subscriber.has_new());
    }

    #[test]
    fn test_typed_handles() {
        let topic = TypedTopic::for_message::<u32>("/count", 4).unwrap();
        let publisher = topic.publisher();
        let subscriber = topic.subscriber();

        publisher.publish_message(&10u32).unwrap();
        publisher.publish_message(&20u32).unwrap();

        assert_eq!(
            subscriber.poll_latest_message::<u32>().unwrap(),
            Some((20, 2))
        );
        assert_eq!(subscriber.poll_latest_message::<u32>().unwrap(), None);
        assert_eq!(
            subscriber.try_receive_message::<u32>().unwrap(),
            Some((10, 1))
        );
        assert_eq!(subscriber.last_seen_epoch(), 2);
    }
}
