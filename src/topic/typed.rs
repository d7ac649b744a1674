//! Typed topics: fixed-size messages with an epoch-only header

use crate::{
    error::{BusError, Result},
    registry::TopicId,
    slot_ring::TypedLayout,
};

use super::{config::TopicConfig, instance::Topic, message::FixedMessage};

/// Topic carrying messages of exactly `msg_size` bytes
pub type TypedTopic = Topic<TypedLayout>;

impl Topic<TypedLayout> {
    /// Standalone typed topic
    pub fn new(name: impl Into<String>, capacity: usize, msg_size: usize) -> Result<Self> {
        Self::from_config(&TopicConfig::typed(name, capacity, msg_size), TopicId::DETACHED)
    }

    /// Standalone typed topic sized for `M`
    pub fn for_message<M: FixedMessage>(name: impl Into<String>, capacity: usize) -> Result<Self> {
        Self::new(name, capacity, M::SIZE)
    }

    pub(crate) fn from_config(config: &TopicConfig, id: TopicId) -> Result<Self> {
        config.validate()?;
        let layout = TypedLayout::new(config.payload_size)?;
        Self::create(config, layout, id)
    }

    /// Fixed message size in bytes
    pub fn msg_size(&self) -> usize {
        self.layout().msg_size()
    }

    fn check_message<M: FixedMessage>(&self) -> Result<()> {
        if M::SIZE != self.msg_size() {
            return Err(BusError::size_mismatch(self.msg_size(), M::SIZE));
        }
        Ok(())
    }

    /// Encode and publish a message
    pub fn publish_message<M: FixedMessage>(&self, message: &M) -> Result<u64> {
        self.check_message::<M>()?;
        let mut buf = vec![0u8; M::SIZE];
        message.encode(&mut buf);
        self.publish(&buf)
    }

    /// Consume and decode the oldest unread message
    pub fn try_receive_message<M: FixedMessage>(&self) -> Result<Option<(M, u64)>> {
        self.check_message::<M>()?;
        let mut buf = vec![0u8; M::SIZE];
        Ok(self
            .try_receive(&mut buf)?
            .map(|received| (M::decode(&buf), received.epoch)))
    }

    /// Decode the latest message without consuming it
    pub fn peek_latest_message<M: FixedMessage>(&self) -> Result<Option<(M, u64)>> {
        self.check_message::<M>()?;
        let mut buf = vec![0u8; M::SIZE];
        Ok(self
            .peek_latest(&mut buf)?
            .map(|received| (M::decode(&buf), received.epoch)))
    }
}
