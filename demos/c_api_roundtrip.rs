//! Drive the C API the way a C caller would

use epochbus::ffi::*;
use std::ffi::{CStr, CString};

fn status_text(code: i32) -> String {
    unsafe { CStr::from_ptr(epochbus_status_message(code)) }
        .to_string_lossy()
        .into_owned()
}

fn main() {
    env_logger::init();

    let version = unsafe { CStr::from_ptr(epochbus_version_string()) };
    println!("epochbus C API {}", version.to_string_lossy());

    let registry = epochbus_registry_new();
    if registry.is_null() {
        eprintln!("Failed to create registry");
        return;
    }

    let name = CString::new("/imu").unwrap_or_default();
    let mut status = 0;
    let topic = epochbus_registry_get_byte_topic(registry, name.as_ptr(), 4, &mut status);
    println!("get_byte_topic -> handle {:#x} ({})", topic, status_text(status));

    let payload = b"accel:0,0,9.81";
    let epoch = epochbus_byte_topic_publish(registry, topic, payload.as_ptr(), payload.len());
    println!("publish -> epoch {}", epoch);

    let mut out = [0u8; 256];
    let mut out_len = 0usize;
    let mut out_epoch = 0u64;
    let rc = epochbus_byte_topic_peek_latest(
        registry,
        topic,
        out.as_mut_ptr(),
        &mut out_len,
        &mut out_epoch,
        out.len(),
    );
    println!(
        "peek_latest -> {} epoch {} '{}'",
        status_text(rc),
        out_epoch,
        String::from_utf8_lossy(&out[..out_len])
    );

    let mut small = [0u8; 4];
    let rc = epochbus_byte_topic_try_receive(registry, topic, small.as_mut_ptr(), &mut out_len, small.len());
    println!("try_receive into 4 bytes -> {} ({})", rc, status_text(rc));

    let rc = epochbus_topic_release(registry, topic);
    println!("release -> {}", status_text(rc));

    let rc = epochbus_topic_is_empty(registry, topic);
    println!("is_empty on released handle -> {} ({})", rc, status_text(rc));

    epochbus_registry_destroy(registry);
}
