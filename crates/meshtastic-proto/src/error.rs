//! Error types for meshtastic-proto.

use thiserror::Error;

/// Structural errors raised while reading protobuf wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    /// The buffer ended in the middle of a field.
    #[error("Truncated message at offset {offset}: {message}")]
    Truncated {
        /// Byte offset where more data was expected.
        offset: usize,
        /// What was being read.
        message: String,
    },

    /// A tag carried a wire type that protobuf does not allow here.
    #[error("Invalid wire type {wire_type} at offset {offset}")]
    InvalidWireType {
        /// Byte offset of the tag.
        offset: usize,
        /// The offending wire type.
        wire_type: u8,
    },

    /// A tag carried field number zero or one beyond the protobuf range.
    #[error("Invalid field number {field} at offset {offset}")]
    InvalidFieldNumber {
        /// Byte offset of the tag.
        offset: usize,
        /// The offending field number.
        field: u64,
    },

    /// A varint ran past ten bytes.
    #[error("Varint too long at offset {offset}")]
    VarintOverflow {
        /// Byte offset where the varint started.
        offset: usize,
    },

    /// A string field did not hold valid UTF-8.
    #[error("Invalid UTF-8 in string field {0}")]
    InvalidUtf8(String),
}

impl ProtoError {
    /// Create a truncation error at a specific offset.
    pub fn truncated(offset: usize, message: impl Into<String>) -> Self {
        ProtoError::Truncated {
            offset,
            message: message.into(),
        }
    }
}

/// Result type alias for wire operations.
pub type ProtoResult<T> = Result<T, ProtoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtoError::truncated(10, "length-delimited field");
        assert!(err.to_string().contains("offset 10"));
        assert!(err.to_string().contains("length-delimited"));

        let err = ProtoError::InvalidWireType {
            offset: 3,
            wire_type: 7,
        };
        assert_eq!(err.to_string(), "Invalid wire type 7 at offset 3");
    }
}
