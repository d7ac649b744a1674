//! FFI utilities: pointer checks, string conversion, panic containment

use std::{
    ffi::{c_char, CStr},
    panic::{self, AssertUnwindSafe},
};

use log::error;

use crate::{
    error::{BusError, Result},
    registry::{Registry, TopicId},
};

use super::types::{EpochbusRegistry, EpochbusStatus};

/// Run `f`, turning a panic into `fallback`
pub fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error!("Panic caught at the C API boundary");
            fallback
        }
    }
}

/// Run `f` and map its outcome to a status code
pub fn guard_status(f: impl FnOnce() -> Result<EpochbusStatus>) -> i32 {
    guard(EpochbusStatus::Panic.code(), || match f() {
        Ok(status) => status.code(),
        Err(e) => EpochbusStatus::from(&e).code(),
    })
}

/// Convert a C string to an owned Rust string
pub fn c_str_to_string(c_str: *const c_char) -> Result<String> {
    if c_str.is_null() {
        return Err(BusError::invalid_parameter("name", "null pointer"));
    }

    unsafe {
        CStr::from_ptr(c_str)
            .to_str()
            .map(|s| s.to_owned())
            .map_err(|_| BusError::invalid_parameter("name", "not valid UTF-8"))
    }
}

/// Borrow the registry behind an opaque pointer
pub fn registry_ref<'a>(registry: *const EpochbusRegistry) -> Result<&'a Registry> {
    if registry.is_null() {
        return Err(BusError::invalid_parameter("registry", "null pointer"));
    }
    Ok(unsafe { &(*registry).inner })
}

/// Decode a raw topic handle
pub fn topic_id(handle: u64) -> Result<TopicId> {
    TopicId::from_raw(handle).ok_or_else(|| BusError::invalid_parameter("topic", "null handle"))
}

/// Borrow `len` input bytes; a null pointer is only allowed for `len == 0`
pub fn input_slice<'a>(data: *const u8, len: usize) -> Result<&'a [u8]> {
    if data.is_null() {
        if len == 0 {
            return Ok(&[]);
        }
        return Err(BusError::invalid_parameter("data", "null pointer"));
    }
    Ok(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Borrow `len` output bytes
pub fn output_slice<'a>(out: *mut u8, len: usize) -> Result<&'a mut [u8]> {
    if out.is_null() {
        return Err(BusError::invalid_parameter("out", "null pointer"));
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(out, len) })
}

/// Store `value` through an optional out-pointer
pub fn write_optional<T>(ptr: *mut T, value: T) {
    if !ptr.is_null() {
        unsafe { ptr.write(value) };
    }
}
