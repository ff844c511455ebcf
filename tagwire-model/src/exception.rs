//! Exceptions, carried on the wire as ordinary records.

use tagwire_core::{CodecError, FieldType, RecordSchema};

pub const NOT_FOUND: &str = "NotFoundException";
pub const INVALID_REQUEST: &str = "InvalidRequestException";
pub const UNAVAILABLE: &str = "UnavailableException";
pub const TIMED_OUT: &str = "TimedOutException";
pub const AUTHENTICATION: &str = "AuthenticationException";
pub const AUTHORIZATION: &str = "AuthorizationException";
pub const SCHEMA_DISAGREEMENT: &str = "SchemaDisagreementException";

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    let empty = |name| RecordSchema::builder(name).build();
    let with_reason = |name| {
        RecordSchema::builder(name)
            .required(1, "why", FieldType::String)
            .build()
    };
    Ok(vec![
        empty(NOT_FOUND)?,
        with_reason(INVALID_REQUEST)?,
        empty(UNAVAILABLE)?,
        empty(TIMED_OUT)?,
        with_reason(AUTHENTICATION)?,
        with_reason(AUTHORIZATION)?,
        empty(SCHEMA_DISAGREEMENT)?,
    ])
}
