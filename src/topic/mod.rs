//! Byte and typed topics built on the slot ring
//!
//! A topic is a named ring plus its statistics. Handles are cheap clones of
//! one shared core:
//! - [`ByteTopic`] for variable-length payloads up to a bound
//! - [`TypedTopic`] for fixed-size messages, see [`FixedMessage`]

pub mod byte;
pub mod config;
pub mod instance;
pub mod message;
pub mod stats;
pub mod typed;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use byte::ByteTopic;
pub use config::TopicConfig;
pub use instance::Topic;
pub use message::FixedMessage;
pub use stats::{TopicStats, TopicStatsSnapshot};
pub use typed::TypedTopic;
