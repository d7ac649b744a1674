//! # epochbus - In-process publish/subscribe rings
//!
//! epochbus moves small, fixed-cadence messages (sensor readings, control
//! setpoints) between threads of one process without blocking. Every topic is
//! a fixed ring of slots; a full ring overwrites its oldest unread entry, and
//! every publish is tagged with a monotonic epoch so consumers can detect loss
//! and peek the latest value independently of the drain cursor.
//!
//! ## Features
//!
//! - **Byte topics**: variable-length payloads up to a per-topic maximum
//! - **Typed topics**: fixed-size payloads with an epoch-only slot header
//! - **Registry**: race-free lazy creation by name, generation-guarded ids
//! - **Latest-value peek**: non-consuming, never returns a half-written slot
//! - **C API**: stable status codes and 64-bit topic handles (feature `c-api`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   Registry                      │
//! │   name table  →  slab { generation, topic }     │
//! ├────────────────────────┬────────────────────────┤
//! │   ByteTopic            │   TypedTopic           │
//! │   {epoch, len} header  │   {epoch} header       │
//! ├────────────────────────┴────────────────────────┤
//! │          SlotRing<L: SlotLayout>                │
//! │   writer lock · slot stamps · CAS read cursor   │
//! └─────────────────────────────────────────────────┘
//!           │                         │
//!           ▼                         ▼
//! ┌─────────────────┐    ┌─────────────────────────┐
//! │   C API Layer   │    │     Rust Native API     │
//! └─────────────────┘    └─────────────────────────┘
//! ```

pub mod error;
pub mod registry;
pub mod slot_ring;
pub mod topic;

#[cfg(feature = "c-api")]
pub mod ffi;

// Main API re-exports
pub use error::{BusError, Result, TopicKind};
pub use registry::{
    AnyTopic, Publisher, Registry, RegistryConfig, RegistryStats, Subscriber, TopicId, TopicInfo,
};
pub use slot_ring::{ByteLayout, PublishOutcome, Received, SlotLayout, SlotRing, TypedLayout};
pub use topic::{
    ByteTopic, FixedMessage, Topic, TopicConfig, TopicStats, TopicStatsSnapshot, TypedTopic,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Default configuration constants
pub mod config {
    /// Default byte-topic slot size, header included
    pub const DEFAULT_SLOT_SIZE: usize = 256;

    /// Byte slot header: 8-byte epoch + 4-byte length
    pub const BYTE_HEADER_SIZE: usize = 12;

    /// Typed slot header: 8-byte epoch
    pub const TYPED_HEADER_SIZE: usize = 8;

    /// Default byte-topic payload bound (244 bytes)
    pub const DEFAULT_MAX_PAYLOAD: usize = DEFAULT_SLOT_SIZE - BYTE_HEADER_SIZE;

    /// Upper bound for any slot payload (1MB)
    pub const MAX_SLOT_PAYLOAD: usize = 1 << 20;

    /// Maximum topic name length in bytes
    pub const MAX_TOPIC_NAME_LENGTH: usize = 255;

    /// Maximum slots per topic
    pub const MAX_CAPACITY: usize = 1 << 24;

    /// Default slots per topic
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Default maximum number of live topics per registry
    pub const DEFAULT_MAX_TOPICS: usize = 1024;
}
