//! Topic registry and role handles
//!
//! The registry maps names to topics, creating them lazily and handing out
//! generation-guarded [`TopicId`]s. Publishing and subscribing go straight to
//! the topic handles; the registry is only involved on acquisition and
//! release.

pub mod config;
pub mod handles;
pub mod id;
pub mod manager;
pub mod stats;


pub use config::RegistryConfig;
pub use handles::{Publisher, Subscriber};
pub use id::TopicId;
pub use manager::{AnyTopic, Registry, TopicInfo};
pub use stats::RegistryStats;
