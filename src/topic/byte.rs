//! Byte topics: variable-length payloads up to a fixed maximum

use crate::{
    error::Result,
    registry::TopicId,
    slot_ring::ByteLayout,
};

use super::{config::TopicConfig, instance::Topic};

/// Topic carrying payloads of `0..=max_payload` bytes
pub type ByteTopic = Topic<ByteLayout>;

impl Topic<ByteLayout> {
    /// Standalone byte topic with the default 244-byte payload bound
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        Self::from_config(&TopicConfig::byte(name, capacity), TopicId::DETACHED)
    }

    /// Standalone byte topic with an explicit payload bound
    pub fn with_max_payload(
        name: impl Into<String>,
        capacity: usize,
        max_payload: usize,
    ) -> Result<Self> {
        let config = TopicConfig::byte(name, capacity).with_payload_size(max_payload);
        Self::from_config(&config, TopicId::DETACHED)
    }

    pub(crate) fn from_config(config: &TopicConfig, id: TopicId) -> Result<Self> {
        config.validate()?;
        let layout = ByteLayout::new(config.payload_size)?;
        Self::create(config, layout, id)
    }

    /// Largest payload accepted by `publish`
    pub fn max_payload(&self) -> usize {
        self.layout().max_payload()
    }

    /// Consume the oldest unread entry into a new buffer
    pub fn try_receive_vec(&self) -> Result<Option<(Vec<u8>, u64)>> {
        let mut buf = vec![0u8; self.max_payload()];
        Ok(self.try_receive(&mut buf)?.map(|received| {
            buf.truncate(received.len);
            (buf, received.epoch)
        }))
    }

    /// Copy the latest entry into a new buffer
    pub fn peek_latest_vec(&self) -> Result<Option<(Vec<u8>, u64)>> {
        let mut buf = vec![0u8; self.max_payload()];
        Ok(self.peek_latest(&mut buf)?.map(|received| {
            buf.truncate(received.len);
            (buf, received.epoch)
        }))
    }

    /// Consume every unread entry, oldest first
    pub fn drain_vec(&self) -> Result<Vec<(Vec<u8>, u64)>> {
        let mut buf = vec![0u8; self.max_payload()];
        let mut messages = Vec::with_capacity(self.len());

        while let Some(received) = self.try_receive(&mut buf)? {
            messages.push((buf[..received.len].to_vec(), received.epoch));
        }

        Ok(messages)
    }
}
