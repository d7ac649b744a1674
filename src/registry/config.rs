//! Registry configuration

use crate::{
    config::{DEFAULT_MAX_PAYLOAD, DEFAULT_MAX_TOPICS, MAX_SLOT_PAYLOAD},
    error::{BusError, Result},
};

/// Registry-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Payload bound for byte topics created without an explicit one
    pub byte_max_payload: usize,
    /// Maximum number of live topics
    pub max_topics: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            byte_max_payload: DEFAULT_MAX_PAYLOAD,
            max_topics: DEFAULT_MAX_TOPICS,
        }
    }
}

impl RegistryConfig {
    /// Set the default byte-topic payload bound
    pub fn with_byte_max_payload(mut self, byte_max_payload: usize) -> Self {
        self.byte_max_payload = byte_max_payload;
        self
    }

    /// Set the live topic limit
    pub fn with_max_topics(mut self, max_topics: usize) -> Self {
        self.max_topics = max_topics;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.byte_max_payload == 0 || self.byte_max_payload > MAX_SLOT_PAYLOAD {
            return Err(BusError::invalid_parameter(
                "byte_max_payload",
                format!("must be between 1 and {} bytes", MAX_SLOT_PAYLOAD),
            ));
        }
        if self.max_topics == 0 || self.max_topics > u32::MAX as usize {
            return Err(BusError::invalid_parameter(
                "max_topics",
                "must be between 1 and u32::MAX",
            ));
        }
        Ok(())
    }
}
