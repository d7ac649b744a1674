//! FFI type definitions and status codes

use std::ffi::c_char;

use crate::{error::BusError, registry::Registry};

/// Opaque registry owned by C callers
///
/// Created by `epochbus_registry_new`, freed by `epochbus_registry_destroy`.
pub struct EpochbusRegistry {
    pub(crate) inner: Registry,
}

/// Generation-guarded topic handle, 0 is the null handle
pub type EpochbusTopicHandle = u64;

/// Status codes returned by the C API
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochbusStatus {
    NoData = 0,
    Success = 1,
    InvalidArgument = -1,
    BufferTooSmall = -2,
    NotFound = -3,
    KindMismatch = -4,
    CapacityMismatch = -5,
    SizeMismatch = -6,
    PayloadTooLarge = -7,
    AllocationFailure = -8,
    Panic = -99,
}

impl EpochbusStatus {
    /// Raw code as seen by C
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Parse a raw code
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::NoData,
            1 => Self::Success,
            -1 => Self::InvalidArgument,
            -2 => Self::BufferTooSmall,
            -3 => Self::NotFound,
            -4 => Self::KindMismatch,
            -5 => Self::CapacityMismatch,
            -6 => Self::SizeMismatch,
            -7 => Self::PayloadTooLarge,
            -8 => Self::AllocationFailure,
            -99 => Self::Panic,
            _ => return None,
        })
    }

    /// Static NUL-terminated description
    pub fn message(self) -> *const c_char {
        let text: &'static str = match self {
            Self::NoData => "no data\0",
            Self::Success => "success\0",
            Self::InvalidArgument => "invalid argument\0",
            Self::BufferTooSmall => "buffer too small\0",
            Self::NotFound => "topic not found\0",
            Self::KindMismatch => "topic kind mismatch\0",
            Self::CapacityMismatch => "topic capacity mismatch\0",
            Self::SizeMismatch => "message size mismatch\0",
            Self::PayloadTooLarge => "payload too large\0",
            Self::AllocationFailure => "allocation failure\0",
            Self::Panic => "internal panic\0",
        };
        text.as_ptr() as *const c_char
    }
}

impl From<&BusError> for EpochbusStatus {
    fn from(error: &BusError) -> Self {
        match error {
            BusError::NotFound { .. } => EpochbusStatus::NotFound,
            BusError::KindMismatch { .. } => EpochbusStatus::KindMismatch,
            BusError::CapacityMismatch { .. } => EpochbusStatus::CapacityMismatch,
            BusError::SizeMismatch { .. } => EpochbusStatus::SizeMismatch,
            BusError::PayloadTooLarge { .. } => EpochbusStatus::PayloadTooLarge,
            BusError::BufferTooSmall { .. } => EpochbusStatus::BufferTooSmall,
            BusError::AllocationFailure { .. } => EpochbusStatus::AllocationFailure,
            BusError::InvalidParameter { .. } => EpochbusStatus::InvalidArgument,
        }
    }
}

impl From<BusError> for EpochbusStatus {
    fn from(error: BusError) -> Self {
        Self::from(&error)
    }
}
