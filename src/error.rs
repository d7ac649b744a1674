//! Error types and handling for epochbus

/// Result type alias for epochbus operations
pub type Result<T> = std::result::Result<T, BusError>;

/// Which engine a topic was created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    /// Variable-length payloads up to a maximum
    Byte,
    /// Fixed-size payloads
    Typed,
}

impl std::fmt::Display for TopicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopicKind::Byte => write!(f, "byte"),
            TopicKind::Typed => write!(f, "typed"),
        }
    }
}

/// Errors reported by the registry and the topic engines
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    /// Topic is unknown or was released
    #[error("Topic not found: {name}")]
    NotFound { name: String },

    /// Topic exists under the name but with the other engine
    #[error("Topic '{name}' is a {existing} topic, requested {requested}")]
    KindMismatch {
        name: String,
        existing: TopicKind,
        requested: TopicKind,
    },

    /// Topic exists with a different slot count
    #[error("Topic '{name}' has capacity {existing}, requested {requested}")]
    CapacityMismatch {
        name: String,
        existing: usize,
        requested: usize,
    },

    /// Message size (or payload bound) differs from the topic's
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Publish payload exceeds the per-slot maximum
    #[error("Payload too large: {size} bytes exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Destination buffer cannot hold the stored payload
    #[error("Buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall { required: usize, available: usize },

    /// Ring or registry storage could not be created
    #[error("Allocation failure: {message}")]
    AllocationFailure { message: String },

    /// Invalid argument at the API boundary
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },
}

impl BusError {
    /// Create a not found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a kind mismatch error
    pub fn kind_mismatch(name: impl Into<String>, existing: TopicKind, requested: TopicKind) -> Self {
        Self::KindMismatch {
            name: name.into(),
            existing,
            requested,
        }
    }

    /// Create a capacity mismatch error
    pub fn capacity_mismatch(name: impl Into<String>, existing: usize, requested: usize) -> Self {
        Self::CapacityMismatch {
            name: name.into(),
            existing,
            requested,
        }
    }

    /// Create a size mismatch error
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create a payload too large error
    pub fn payload_too_large(size: usize, max: usize) -> Self {
        Self::PayloadTooLarge { size, max }
    }

    /// Create a buffer too small error
    pub fn buffer_too_small(required: usize, available: usize) -> Self {
        Self::BufferTooSmall {
            required,
            available,
        }
    }

    /// Create an allocation failure error
    pub fn allocation(message: impl Into<String>) -> Self {
        Self::AllocationFailure {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Whether the caller can retry the same call with a larger buffer
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BufferTooSmall { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BusError::not_found("/imu");
        assert!(matches!(err, BusError::NotFound { .. }));

        let err = BusError::capacity_mismatch("/x", 4, 8);
        assert!(matches!(
            err,
            BusError::CapacityMismatch {
                existing: 4,
                requested: 8,
                ..
            }
        ));

        let err = BusError::buffer_too_small(12, 4);
        assert!(err.is_retryable());
        assert!(!BusError::payload_too_large(300, 244).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = BusError::kind_mismatch("/imu", TopicKind::Typed, TopicKind::Byte);
        let display = format!("{}", err);
        assert!(display.contains("/imu"));
        assert!(display.contains("typed"));
        assert!(display.contains("byte"));

        let err = BusError::payload_too_large(300, 244);
        assert!(format!("{}", err).contains("300"));
    }
}
