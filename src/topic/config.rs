//! Topic configuration

use crate::{
    config::{DEFAULT_CAPACITY, DEFAULT_MAX_PAYLOAD, MAX_CAPACITY, MAX_SLOT_PAYLOAD, MAX_TOPIC_NAME_LENGTH},
    error::{BusError, Result, TopicKind},
};

/// Parameters a topic is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    /// Topic name (unique per registry)
    pub name: String,
    /// Engine backing the topic
    pub kind: TopicKind,
    /// Number of slots
    pub capacity: usize,
    /// Max payload for byte topics, exact message size for typed topics
    pub payload_size: usize,
}

impl TopicConfig {
    /// Byte topic with the default payload bound
    pub fn byte(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            kind: TopicKind::Byte,
            capacity,
            payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }

    /// Typed topic carrying `msg_size`-byte messages
    pub fn typed(name: impl Into<String>, capacity: usize, msg_size: usize) -> Self {
        Self {
            name: name.into(),
            kind: TopicKind::Typed,
            capacity,
            payload_size: msg_size,
        }
    }

    /// Set the slot count
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the payload bound (byte) or message size (typed)
    pub fn with_payload_size(mut self, payload_size: usize) -> Self {
        self.payload_size = payload_size;
        self
    }

    /// Check every field against the crate limits
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BusError::invalid_parameter("name", "Topic name cannot be empty"));
        }
        if self.name.len() > MAX_TOPIC_NAME_LENGTH {
            return Err(BusError::invalid_parameter(
                "name",
                format!("Topic name exceeds {} bytes", MAX_TOPIC_NAME_LENGTH),
            ));
        }
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(BusError::invalid_parameter(
                "capacity",
                format!("Capacity must be between 1 and {}", MAX_CAPACITY),
            ));
        }
        if self.payload_size == 0 || self.payload_size > MAX_SLOT_PAYLOAD {
            let parameter = match self.kind {
                TopicKind::Byte => "max_payload",
                TopicKind::Typed => "msg_size",
            };
            return Err(BusError::invalid_parameter(
                parameter,
                format!("must be between 1 and {} bytes", MAX_SLOT_PAYLOAD),
            ));
        }
        Ok(())
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self::byte(String::new(), DEFAULT_CAPACITY)
    }
}
