//! Protocol error types.

use thiserror::Error;

/// Errors raised while reading or writing wire-level values.
///
/// None of these are recoverable mid-value: once a primitive read fails the
/// cursor position is unspecified and the enclosing decode must be abandoned.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("truncated input at offset {offset}: need {needed} more bytes")]
    Truncated { offset: u64, needed: usize },

    #[error("unknown type tag {tag:#04x} at offset {offset}")]
    UnknownTypeTag { tag: u8, offset: u64 },

    #[error("structural mismatch at offset {offset}: expected {expected}")]
    StructuralMismatch { expected: &'static str, offset: u64 },

    #[error("length {length} out of range at offset {offset} (max {max})")]
    LengthOutOfRange { length: u64, max: u64, offset: u64 },

    #[error("negative size {size} at offset {offset}")]
    NegativeSize { size: i32, offset: u64 },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: u64 },

    #[error("nesting depth exceeds limit of {max}")]
    DepthLimitExceeded { max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Returns whether the input simply ran out of bytes.
    pub fn is_truncation(&self) -> bool {
        matches!(self, ProtocolError::Truncated { .. })
    }

    /// Byte offset at which the error was detected, when known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            ProtocolError::Truncated { offset, .. }
            | ProtocolError::UnknownTypeTag { offset, .. }
            | ProtocolError::StructuralMismatch { offset, .. }
            | ProtocolError::LengthOutOfRange { offset, .. }
            | ProtocolError::NegativeSize { offset, .. }
            | ProtocolError::InvalidUtf8 { offset } => Some(*offset),
            ProtocolError::DepthLimitExceeded { .. } | ProtocolError::Io(_) => None,
        }
    }

    /// Returns a stable error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ProtocolError::Truncated { .. } => "TRUNCATED_INPUT",
            ProtocolError::UnknownTypeTag { .. } => "UNKNOWN_TYPE_TAG",
            ProtocolError::StructuralMismatch { .. } => "STRUCTURAL_MISMATCH",
            ProtocolError::LengthOutOfRange { .. } => "PRIMITIVE_RANGE",
            ProtocolError::NegativeSize { .. } => "PRIMITIVE_RANGE",
            ProtocolError::InvalidUtf8 { .. } => "INVALID_UTF8",
            ProtocolError::DepthLimitExceeded { .. } => "DEPTH_LIMIT",
            ProtocolError::Io(_) => "IO_ERROR",
        }
    }
}
