//! FFI version information functions

use std::ffi::c_char;

use super::types::EpochbusStatus;

static VERSION_STRING: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Get major version number
#[no_mangle]
pub extern "C" fn epochbus_version_major() -> u32 {
    crate::VERSION_MAJOR
}

/// Get minor version number
#[no_mangle]
pub extern "C" fn epochbus_version_minor() -> u32 {
    crate::VERSION_MINOR
}

/// Get patch version number
#[no_mangle]
pub extern "C" fn epochbus_version_patch() -> u32 {
    crate::VERSION_PATCH
}

/// Get version string (static, do not free)
#[no_mangle]
pub extern "C" fn epochbus_version_string() -> *const c_char {
    VERSION_STRING.as_ptr() as *const c_char
}

/// Describe a status code (static, do not free)
#[no_mangle]
pub extern "C" fn epochbus_status_message(code: i32) -> *const c_char {
    match EpochbusStatus::from_code(code) {
        Some(status) => status.message(),
        None => "unknown status\0".as_ptr() as *const c_char,
    }
}
