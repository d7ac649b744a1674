//! FFI functions for registry lifecycle and topic acquisition

use std::ffi::c_char;

use crate::{error::Result, registry::Registry};

use super::{
    types::{EpochbusRegistry, EpochbusStatus, EpochbusTopicHandle},
    utils::{c_str_to_string, guard, guard_status, registry_ref, topic_id, write_optional},
};

/// Create an empty registry.
///
/// # Returns
/// - Valid pointer on success
/// - Null pointer on failure
///
/// # Example
/// ```c
/// EpochbusRegistry *reg = epochbus_registry_new();
/// if (reg == NULL) {
///     // Handle error
/// }
/// ```
#[no_mangle]
pub extern "C" fn epochbus_registry_new() -> *mut EpochbusRegistry {
    guard(std::ptr::null_mut(), || {
        Box::into_raw(Box::new(EpochbusRegistry {
            inner: Registry::new(),
        }))
    })
}

/// Destroy a registry and release all of its topics.
///
/// Topic handles obtained from it must not be used afterwards. Passing null
/// is a no-op.
#[no_mangle]
pub extern "C" fn epochbus_registry_destroy(registry: *mut EpochbusRegistry) {
    if registry.is_null() {
        return;
    }
    guard((), || unsafe { drop(Box::from_raw(registry)) });
}

/// Number of live topics, 0 for a null registry
#[no_mangle]
pub extern "C" fn epochbus_registry_topic_count(registry: *const EpochbusRegistry) -> usize {
    guard(0, || registry_ref(registry).map(Registry::topic_count).unwrap_or(0))
}

fn acquire(
    out_status: *mut i32,
    f: impl FnOnce() -> Result<EpochbusTopicHandle>,
) -> EpochbusTopicHandle {
    let (handle, status) = guard((0, EpochbusStatus::Panic), || match f() {
        Ok(handle) => (handle, EpochbusStatus::Success),
        Err(e) => (0, EpochbusStatus::from(&e)),
    });
    write_optional(out_status, status.code());
    handle
}

/// Get or create a byte topic.
///
/// # Returns
/// A non-zero topic handle, or 0 on failure. When `out_status` is not null it
/// receives the status code (`1` on success).
#[no_mangle]
pub extern "C" fn epochbus_registry_get_byte_topic(
    registry: *const EpochbusRegistry,
    name: *const c_char,
    capacity: usize,
    out_status: *mut i32,
) -> EpochbusTopicHandle {
    acquire(out_status, || {
        let registry = registry_ref(registry)?;
        let name = c_str_to_string(name)?;
        let topic = registry.get_or_create_byte_topic(&name, capacity)?;
        Ok(topic.id().to_raw())
    })
}

/// Get or create a typed topic with `msg_size`-byte messages.
///
/// Same return convention as `epochbus_registry_get_byte_topic`.
#[no_mangle]
pub extern "C" fn epochbus_registry_get_typed_topic(
    registry: *const EpochbusRegistry,
    name: *const c_char,
    capacity: usize,
    msg_size: usize,
    out_status: *mut i32,
) -> EpochbusTopicHandle {
    acquire(out_status, || {
        let registry = registry_ref(registry)?;
        let name = c_str_to_string(name)?;
        let topic = registry.get_or_create_typed_topic(&name, capacity, msg_size)?;
        Ok(topic.id().to_raw())
    })
}

/// Release a topic; its handle becomes invalid (`-3` on later use)
#[no_mangle]
pub extern "C" fn epochbus_topic_release(
    registry: *const EpochbusRegistry,
    topic: EpochbusTopicHandle,
) -> i32 {
    guard_status(|| {
        registry_ref(registry)?.release(topic_id(topic)?)?;
        Ok(EpochbusStatus::Success)
    })
}
