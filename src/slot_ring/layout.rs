//! Slot headers and payload contracts for the two topic kinds
//!
//! Every slot is `header || payload`. Byte topics store `{epoch, length}`
//! and pad the payload region up to the slot size; typed topics store only
//! the epoch because the payload size is fixed per topic.

use crate::{
    config::{DEFAULT_MAX_PAYLOAD, MAX_SLOT_PAYLOAD},
    error::{BusError, Result, TopicKind},
};

/// Largest header any layout uses
pub const MAX_HEADER_SIZE: usize = 16;

/// Header stored at the front of every slot
pub trait SlotHeader: Copy + std::fmt::Debug {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Epoch the slot was committed with
    fn epoch(&self) -> u64;

    /// Encode into exactly `SIZE` bytes (little-endian)
    fn encode(&self, out: &mut [u8]);

    /// Decode from at least `SIZE` bytes
    fn decode(bytes: &[u8]) -> Self;
}

/// Byte topic header: 8-byte epoch followed by 4-byte length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSlotHeader {
    pub epoch: u64,
    pub length: u32,
}

impl SlotHeader for ByteSlotHeader {
    const SIZE: usize = 12;

    fn epoch(&self) -> u64 {
        self.epoch
    }

    fn encode(&self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.epoch.to_le_bytes());
        out[8..12].copy_from_slice(&self.length.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut epoch = [0u8; 8];
        let mut length = [0u8; 4];
        epoch.copy_from_slice(&bytes[..8]);
        length.copy_from_slice(&bytes[8..12]);
        Self {
            epoch: u64::from_le_bytes(epoch),
            length: u32::from_le_bytes(length),
        }
    }
}

/// Typed topic header: 8-byte epoch only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedSlotHeader {
    pub epoch: u64,
}

impl SlotHeader for TypedSlotHeader {
    const SIZE: usize = 8;

    fn epoch(&self) -> u64 {
        self.epoch
    }

    fn encode(&self, out: &mut [u8]) {
        out[..8].copy_from_slice(&self.epoch.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Self {
        let mut epoch = [0u8; 8];
        epoch.copy_from_slice(&bytes[..8]);
        Self {
            epoch: u64::from_le_bytes(epoch),
        }
    }
}

/// Header shape and payload contract of a ring
pub trait SlotLayout: Copy + Send + Sync + std::fmt::Debug + 'static {
    type Header: SlotHeader;

    /// Topic kind this layout implements
    const KIND: TopicKind;

    /// Size of the payload region of one slot
    fn payload_capacity(&self) -> usize;

    /// Total bytes per slot
    fn slot_size(&self) -> usize {
        Self::Header::SIZE + self.payload_capacity()
    }

    /// Header committed for a publish of `len` bytes
    fn header(&self, epoch: u64, len: usize) -> Self::Header;

    /// Payload length described by a header, never above `payload_capacity`
    fn payload_len(&self, header: &Self::Header) -> usize;

    /// Validate a payload before it is written
    fn check_publish(&self, len: usize) -> Result<()>;

    /// Validate a destination buffer before anything is read
    fn check_buffer(&self, available: usize) -> Result<()>;
}

/// Variable-length payloads up to `max_payload` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteLayout {
    max_payload: usize,
}

impl ByteLayout {
    /// Create a layout with the given payload bound
    pub fn new(max_payload: usize) -> Result<Self> {
        if max_payload == 0 || max_payload > MAX_SLOT_PAYLOAD {
            return Err(BusError::invalid_parameter(
                "max_payload",
                format!("must be between 1 and {} bytes", MAX_SLOT_PAYLOAD),
            ));
        }
        Ok(Self { max_payload })
    }

    /// Create a layout from a total slot size (header included)
    pub fn with_slot_size(slot_size: usize) -> Result<Self> {
        if slot_size <= ByteSlotHeader::SIZE {
            return Err(BusError::invalid_parameter(
                "slot_size",
                format!("must exceed the {}-byte header", ByteSlotHeader::SIZE),
            ));
        }
        Self::new(slot_size - ByteSlotHeader::SIZE)
    }

    /// Largest payload accepted by `publish`
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl Default for ByteLayout {
    fn default() -> Self {
        Self {
            max_payload: DEFAULT_MAX_PAYLOAD,
        }
    }
}

impl SlotLayout for ByteLayout {
    type Header = ByteSlotHeader;

    const KIND: TopicKind = TopicKind::Byte;

    fn payload_capacity(&self) -> usize {
        self.max_payload
    }

    fn header(&self, epoch: u64, len: usize) -> ByteSlotHeader {
        ByteSlotHeader {
            epoch,
            length: len as u32,
        }
    }

    fn payload_len(&self, header: &ByteSlotHeader) -> usize {
        // A torn header is discarded by the stamp check, but must not index out of the slot first
        (header.length as usize).min(self.max_payload)
    }

    fn check_publish(&self, len: usize) -> Result<()> {
        if len > self.max_payload {
            return Err(BusError::payload_too_large(len, self.max_payload));
        }
        Ok(())
    }

    fn check_buffer(&self, _available: usize) -> Result<()> {
        Ok(())
    }
}

/// Fixed payloads of exactly `msg_size` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedLayout {
    msg_size: usize,
}

impl TypedLayout {
    /// Create a layout for messages of `msg_size` bytes
    pub fn new(msg_size: usize) -> Result<Self> {
        if msg_size == 0 || msg_size > MAX_SLOT_PAYLOAD {
            return Err(BusError::invalid_parameter(
                "msg_size",
                format!("must be between 1 and {} bytes", MAX_SLOT_PAYLOAD),
            ));
        }
        Ok(Self { msg_size })
    }

    /// Fixed message size
    pub fn msg_size(&self) -> usize {
        self.msg_size
    }
}

impl SlotLayout for TypedLayout {
    type Header = TypedSlotHeader;

    const KIND: TopicKind = TopicKind::Typed;

    fn payload_capacity(&self) -> usize {
        self.msg_size
    }

    fn header(&self, epoch: u64, _len: usize) -> TypedSlotHeader {
        TypedSlotHeader { epoch }
    }

    fn payload_len(&self, _header: &TypedSlotHeader) -> usize {
        self.msg_size
    }

    fn check_publish(&self, len: usize) -> Result<()> {
        if len != self.msg_size {
            return Err(BusError::size_mismatch(self.msg_size, len));
        }
        Ok(())
    }

    fn check_buffer(&self, available: usize) -> Result<()> {
        if available != self.msg_size {
            return Err(BusError::size_mismatch(self.msg_size, available));
        }
        Ok(())
    }
}
