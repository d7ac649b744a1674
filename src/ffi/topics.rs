//! FFI functions for publishing and receiving on topics
//!
//! Every function takes the registry the topic came from plus the topic
//! handle. Receive functions return `1` with data, `0` when there is nothing
//! to read, or a negative status code.

use crate::{
    error::Result,
    registry::{AnyTopic, Registry, TopicId},
    slot_ring::Received,
};

use super::{
    types::{EpochbusRegistry, EpochbusStatus, EpochbusTopicHandle},
    utils::{guard, guard_status, input_slice, output_slice, registry_ref, topic_id, write_optional},
};

fn resolve(registry: *const EpochbusRegistry, topic: EpochbusTopicHandle) -> Result<AnyTopic> {
    registry_ref(registry)?.resolve(topic_id(topic)?)
}

fn with_registry<T>(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    f: impl FnOnce(&Registry, TopicId) -> Result<T>,
) -> Result<T> {
    f(registry_ref(registry)?, topic_id(topic)?)
}

fn received_status(
    received: Option<Received>,
    out_len: *mut usize,
    out_epoch: *mut u64,
) -> EpochbusStatus {
    match received {
        Some(r) => {
            write_optional(out_len, r.len);
            write_optional(out_epoch, r.epoch);
            EpochbusStatus::Success
        }
        None => {
            write_optional(out_len, 0);
            EpochbusStatus::NoData
        }
    }
}

// ============================================================================
// Byte topics
// ============================================================================

/// Publish `len` bytes to a byte topic.
///
/// # Returns
/// The message epoch (>= 1), or 0 on error.
#[no_mangle]
pub extern "C" fn epochbus_byte_topic_publish(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    data: *const u8,
    len: usize,
) -> u64 {
    guard(0, || {
        with_registry(registry, topic, |registry, id| {
            let data = input_slice(data, len)?;
            registry.resolve_byte_topic(id)?.publish(data)
        })
        .unwrap_or(0)
    })
}

/// Consume the oldest unread message of a byte topic.
///
/// `out` must hold `max_len` bytes. On success the payload length is written
/// to `out_len`. Returns `-2` without consuming when `max_len` is too small.
#[no_mangle]
pub extern "C" fn epochbus_byte_topic_try_receive(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    out: *mut u8,
    out_len: *mut usize,
    max_len: usize,
) -> i32 {
    guard_status(|| {
        with_registry(registry, topic, |registry, id| {
            let topic = registry.resolve_byte_topic(id)?;
            let out = output_slice(out, max_len)?;
            let received = topic.try_receive(out)?;
            Ok(received_status(received, out_len, std::ptr::null_mut()))
        })
    })
}

/// Copy the latest message of a byte topic without consuming it
#[no_mangle]
pub extern "C" fn epochbus_byte_topic_peek_latest(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    out: *mut u8,
    out_len: *mut usize,
    out_epoch: *mut u64,
    max_len: usize,
) -> i32 {
    guard_status(|| {
        with_registry(registry, topic, |registry, id| {
            let topic = registry.resolve_byte_topic(id)?;
            let out = output_slice(out, max_len)?;
            let received = topic.peek_latest(out)?;
            Ok(received_status(received, out_len, out_epoch))
        })
    })
}

// ============================================================================
// Typed topics
// ============================================================================

/// Publish one fixed-size message; `len` must equal the topic's `msg_size`.
///
/// # Returns
/// The message epoch (>= 1), or 0 on error.
#[no_mangle]
pub extern "C" fn epochbus_typed_topic_publish(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    data: *const u8,
    len: usize,
) -> u64 {
    guard(0, || {
        with_registry(registry, topic, |registry, id| {
            let data = input_slice(data, len)?;
            registry.resolve_typed_topic(id)?.publish(data)
        })
        .unwrap_or(0)
    })
}

/// Consume the oldest unread message into `out` (`len == msg_size`)
#[no_mangle]
pub extern "C" fn epochbus_typed_topic_try_receive(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    out: *mut u8,
    len: usize,
) -> i32 {
    guard_status(|| {
        with_registry(registry, topic, |registry, id| {
            let topic = registry.resolve_typed_topic(id)?;
            let out = output_slice(out, len)?;
            let received = topic.try_receive(out)?;
            Ok(received_status(received, std::ptr::null_mut(), std::ptr::null_mut()))
        })
    })
}

/// Copy the latest message into `out` (`len == msg_size`) without consuming it
#[no_mangle]
pub extern "C" fn epochbus_typed_topic_peek_latest(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
    out: *mut u8,
    len: usize,
    out_epoch: *mut u64,
) -> i32 {
    guard_status(|| {
        with_registry(registry, topic, |registry, id| {
            let topic = registry.resolve_typed_topic(id)?;
            let out = output_slice(out, len)?;
            let received = topic.peek_latest(out)?;
            Ok(received_status(received, std::ptr::null_mut(), out_epoch))
        })
    })
}

// ============================================================================
// Either kind
// ============================================================================

/// Unread messages, 0 for an invalid handle
#[no_mangle]
pub extern "C" fn epochbus_topic_len(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
) -> usize {
    guard(0, || resolve(registry, topic).map(|t| t.len()).unwrap_or(0))
}

/// `1` if empty, `0` if not, negative status for an invalid handle
#[no_mangle]
pub extern "C" fn epochbus_topic_is_empty(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
) -> i32 {
    guard(EpochbusStatus::Panic.code(), || match resolve(registry, topic) {
        Ok(t) => i32::from(t.is_empty()),
        Err(e) => EpochbusStatus::from(&e).code(),
    })
}

/// Latest epoch, 0 if never published or the handle is invalid
#[no_mangle]
pub extern "C" fn epochbus_topic_latest_epoch(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
) -> u64 {
    guard(0, || resolve(registry, topic).map(|t| t.latest_epoch()).unwrap_or(0))
}

/// Slot count, 0 for an invalid handle
#[no_mangle]
pub extern "C" fn epochbus_topic_capacity(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
) -> usize {
    guard(0, || resolve(registry, topic).map(|t| t.capacity()).unwrap_or(0))
}
