//! Query results: key slices, token ranges and CQL results.

use crate::column::{COLUMN, COLUMN_OR_SUPER_COLUMN};
use crate::enums::cql_result_type;
use crate::registry;
use bytes::Bytes;
use tagwire_core::{CodecError, FieldType, List, Record, RecordSchema, Value};
use tagwire_protocol::TypeTag;

pub const KEY_SLICE: &str = "KeySlice";
pub const KEY_COUNT: &str = "KeyCount";
pub const TOKEN_RANGE: &str = "TokenRange";
pub const CQL_ROW: &str = "CqlRow";
pub const CQL_METADATA: &str = "CqlMetadata";
pub const CQL_RESULT: &str = "CqlResult";
pub const CQL_PREPARED_RESULT: &str = "CqlPreparedResult";

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    let strings = || FieldType::list(FieldType::String);
    let type_names = || FieldType::map(FieldType::Binary, FieldType::String);
    Ok(vec![
        RecordSchema::builder(KEY_SLICE)
            .required(1, "key", FieldType::Binary)
            .required(
                2,
                "columns",
                FieldType::list(FieldType::Struct(COLUMN_OR_SUPER_COLUMN)),
            )
            .build()?,
        RecordSchema::builder(KEY_COUNT)
            .required(1, "key", FieldType::Binary)
            .required(2, "count", FieldType::I32)
            .build()?,
        RecordSchema::builder(TOKEN_RANGE)
            .required(1, "start_token", FieldType::String)
            .required(2, "end_token", FieldType::String)
            .required(3, "endpoints", strings())
            .optional(4, "rpc_endpoints", strings())
            .build()?,
        RecordSchema::builder(CQL_ROW)
            .required(1, "key", FieldType::Binary)
            .required(2, "columns", FieldType::list(FieldType::Struct(COLUMN)))
            .build()?,
        RecordSchema::builder(CQL_METADATA)
            .required(1, "name_types", type_names())
            .required(2, "value_types", type_names())
            .required(3, "default_name_type", FieldType::String)
            .required(4, "default_value_type", FieldType::String)
            .build()?,
        RecordSchema::builder(CQL_RESULT)
            .required(1, "type", FieldType::I32)
            .optional(2, "rows", FieldType::list(FieldType::Struct(CQL_ROW)))
            .optional(3, "num", FieldType::I32)
            .optional(4, "schema", FieldType::Struct(CQL_METADATA))
            .build()?,
        RecordSchema::builder(CQL_PREPARED_RESULT)
            .required(1, "itemId", FieldType::I32)
            .required(2, "count", FieldType::I32)
            .optional(3, "variable_types", strings())
            .optional(4, "variable_names", strings())
            .build()?,
    ])
}

/// Row `key` with its columns, each already wrapped in a
/// `ColumnOrSuperColumn`.
pub fn key_slice(
    key: impl Into<Bytes>,
    columns: impl IntoIterator<Item = Record>,
) -> Result<Record, CodecError> {
    let columns = List::from_values(TypeTag::Struct, columns.into_iter().map(Value::Struct))?;
    registry()
        .new_record(KEY_SLICE)?
        .with("key", key.into())?
        .with("columns", Value::List(columns))
}

pub fn key_count(key: impl Into<Bytes>, count: i32) -> Result<Record, CodecError> {
    registry()
        .new_record(KEY_COUNT)?
        .with("key", key.into())?
        .with("count", count)
}

/// Token range owned by `endpoints`.
pub fn token_range<I, S>(
    start_token: &str,
    end_token: &str,
    endpoints: I,
) -> Result<Record, CodecError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let endpoints = List::from_values(
        TypeTag::String,
        endpoints.into_iter().map(|e| Value::String(e.into())),
    )?;
    registry()
        .new_record(TOKEN_RANGE)?
        .with("start_token", start_token)?
        .with("end_token", end_token)?
        .with("endpoints", Value::List(endpoints))
}

/// CQL result of type `ROWS`.
pub fn cql_rows(rows: impl IntoIterator<Item = Record>) -> Result<Record, CodecError> {
    let rows = List::from_values(TypeTag::Struct, rows.into_iter().map(Value::Struct))?;
    registry()
        .new_record(CQL_RESULT)?
        .with("type", cql_result_type::ROWS)?
        .with("rows", Value::List(rows))
}

/// CQL result of type `INT`.
pub fn cql_int(num: i32) -> Result<Record, CodecError> {
    registry()
        .new_record(CQL_RESULT)?
        .with("type", cql_result_type::INT)?
        .with("num", num)
}
