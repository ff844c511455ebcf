//! Codec error types.

use tagwire_protocol::{ProtocolError, TypeTag};
use thiserror::Error;

/// Errors from schema construction, record manipulation and the record codec.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("unknown record type: {0}")]
    UnknownRecord(String),

    #[error("unknown field '{field}' in record {record}")]
    UnknownField { record: &'static str, field: String },

    #[error("invalid schema for {record}: {reason}")]
    InvalidSchema { record: String, reason: String },

    #[error("type mismatch for {record}.{field}: expected {expected}, got {actual}")]
    TypeMismatch {
        record: &'static str,
        field: &'static str,
        expected: String,
        actual: &'static str,
    },

    #[error("element type mismatch: container holds {expected}, got {actual}")]
    ElementMismatch { expected: TypeTag, actual: TypeTag },

    #[error("missing required field {record}.{field}")]
    MissingRequiredField {
        record: &'static str,
        field: &'static str,
    },

    #[error("variant {record} has both '{first}' and '{second}' set")]
    VariantConflict {
        record: &'static str,
        first: &'static str,
        second: &'static str,
    },

    /// Wraps a failure with the record and field being processed.
    ///
    /// `id` is 0 when the failure happened before a field could be resolved.
    #[error("{record}.{field} (id {id}) at offset {offset}: {source}")]
    Field {
        record: &'static str,
        field: String,
        id: i16,
        offset: u64,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    /// Wraps `self` with field context.
    pub(crate) fn in_field(
        self,
        record: &'static str,
        field: impl Into<String>,
        id: i16,
        offset: u64,
    ) -> Self {
        CodecError::Field {
            record,
            field: field.into(),
            id,
            offset,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through field context.
    pub fn root_cause(&self) -> &CodecError {
        let mut err = self;
        while let CodecError::Field { source, .. } = err {
            err = source.as_ref();
        }
        err
    }

    /// Returns whether the input ran out of bytes mid-value.
    pub fn is_truncation(&self) -> bool {
        matches!(self.root_cause(), CodecError::Protocol(e) if e.is_truncation())
    }

    /// Returns a stable error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self.root_cause() {
            CodecError::Protocol(e) => e.error_code(),
            CodecError::UnknownRecord(_) => "UNKNOWN_RECORD",
            CodecError::UnknownField { .. } => "UNKNOWN_FIELD",
            CodecError::InvalidSchema { .. } => "INVALID_SCHEMA",
            CodecError::TypeMismatch { .. } => "TYPE_MISMATCH",
            CodecError::ElementMismatch { .. } => "TYPE_MISMATCH",
            CodecError::MissingRequiredField { .. } => "MISSING_REQUIRED_FIELD",
            CodecError::VariantConflict { .. } => "VARIANT_CONFLICT",
            CodecError::Field { source, .. } => source.error_code(),
        }
    }
}
