//! C Foreign Function Interface (FFI)
//!
//! The registry crosses the boundary as an opaque pointer; topics cross as
//! 64-bit generation-guarded handles, so a released or foreign handle yields
//! a status code instead of undefined access. No panic unwinds into C.
//! See `include/epochbus.h` for the matching declarations.

pub mod registry;
pub mod topics;
pub mod types;
pub mod utils;
pub mod version;


pub use types::{EpochbusRegistry, EpochbusStatus, EpochbusTopicHandle};

// Registry API
pub use registry::{
    epochbus_registry_destroy, epochbus_registry_get_byte_topic,
    epochbus_registry_get_typed_topic, epochbus_registry_new, epochbus_registry_topic_count,
    epochbus_topic_release,
};

// Topic API
pub use topics::{
    epochbus_byte_topic_peek_latest, epochbus_byte_topic_publish, epochbus_byte_topic_try_receive,
    epochbus_topic_capacity, epochbus_topic_is_empty, epochbus_topic_latest_epoch,
    epochbus_topic_len, epochbus_typed_topic_peek_latest, epochbus_typed_topic_publish,
    epochbus_typed_topic_try_receive,
};

// Version API
pub use version::{
    epochbus_status_message, epochbus_version_major, epochbus_version_minor,
    epochbus_version_patch, epochbus_version_string,
};
