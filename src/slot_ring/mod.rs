//! Fixed-slot ring engine underlying both topic kinds
//!
//! A [`SlotRing`] is parameterised over a [`SlotLayout`], which decides the
//! header shape and the payload contract:
//! - [`ByteLayout`]: `{epoch, length}` header, payloads up to a maximum
//! - [`TypedLayout`]: `{epoch}` header, payloads of exactly `msg_size` bytes

pub mod layout;
pub mod ring;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use layout::{ByteLayout, ByteSlotHeader, SlotHeader, SlotLayout, TypedLayout, TypedSlotHeader};
pub use ring::{PublishOutcome, Received, SlotRing};
