//! Addressing columns and rows: parents, paths, slices, index clauses and
//! key ranges.

use crate::registry;
use bytes::Bytes;
use tagwire_core::{CodecError, FieldType, List, Record, RecordSchema, Value};
use tagwire_protocol::TypeTag;

pub const COLUMN_PARENT: &str = "ColumnParent";
pub const COLUMN_PATH: &str = "ColumnPath";
pub const SLICE_RANGE: &str = "SliceRange";
pub const SLICE_PREDICATE: &str = "SlicePredicate";
pub const INDEX_EXPRESSION: &str = "IndexExpression";
pub const INDEX_CLAUSE: &str = "IndexClause";
pub const KEY_RANGE: &str = "KeyRange";

/// Default row or column count of a slice, index clause or key range.
pub const DEFAULT_COUNT: i32 = 100;

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    Ok(vec![
        // Ids 1 and 2 were retired along with the keyspace-in-path fields.
        RecordSchema::builder(COLUMN_PARENT)
            .required(3, "column_family", FieldType::String)
            .optional(4, "super_column", FieldType::Binary)
            .build()?,
        RecordSchema::builder(COLUMN_PATH)
            .required(3, "column_family", FieldType::String)
            .optional(4, "super_column", FieldType::Binary)
            .optional(5, "column", FieldType::Binary)
            .build()?,
        RecordSchema::builder(SLICE_RANGE)
            .required(1, "start", FieldType::Binary)
            .required(2, "finish", FieldType::Binary)
            .required_with_default(3, "reversed", FieldType::Bool, false)
            .required_with_default(4, "count", FieldType::I32, DEFAULT_COUNT)
            .build()?,
        RecordSchema::builder(SLICE_PREDICATE)
            .optional(1, "column_names", FieldType::list(FieldType::Binary))
            .optional(2, "slice_range", FieldType::Struct(SLICE_RANGE))
            .build()?,
        RecordSchema::builder(INDEX_EXPRESSION)
            .required(1, "column_name", FieldType::Binary)
            .required(2, "op", FieldType::I32)
            .required(3, "value", FieldType::Binary)
            .build()?,
        RecordSchema::builder(INDEX_CLAUSE)
            .required(
                1,
                "expressions",
                FieldType::list(FieldType::Struct(INDEX_EXPRESSION)),
            )
            .required(2, "start_key", FieldType::Binary)
            .required_with_default(3, "count", FieldType::I32, DEFAULT_COUNT)
            .build()?,
        RecordSchema::builder(KEY_RANGE)
            .optional(1, "start_key", FieldType::Binary)
            .optional(2, "end_key", FieldType::Binary)
            .optional(3, "start_token", FieldType::String)
            .optional(4, "end_token", FieldType::String)
            .required_with_default(5, "count", FieldType::I32, DEFAULT_COUNT)
            .build()?,
    ])
}

pub fn column_parent(column_family: &str) -> Result<Record, CodecError> {
    registry()
        .new_record(COLUMN_PARENT)?
        .with("column_family", column_family)
}

/// Path to a single column of a standard column family.
pub fn column_path(column_family: &str, column: impl Into<Bytes>) -> Result<Record, CodecError> {
    registry()
        .new_record(COLUMN_PATH)?
        .with("column_family", column_family)?
        .with("column", column.into())
}

/// Columns between `start` and `finish`; empty bounds are open.
pub fn slice_range(
    start: impl Into<Bytes>,
    finish: impl Into<Bytes>,
    reversed: bool,
    count: i32,
) -> Result<Record, CodecError> {
    registry()
        .new_record(SLICE_RANGE)?
        .with("start", start.into())?
        .with("finish", finish.into())?
        .with("reversed", reversed)?
        .with("count", count)
}

/// Predicate selecting columns by name.
pub fn slice_predicate_names<I, N>(names: I) -> Result<Record, CodecError>
where
    I: IntoIterator<Item = N>,
    N: Into<Bytes>,
{
    let names = List::from_values(
        TypeTag::String,
        names.into_iter().map(|n| Value::Binary(n.into())),
    )?;
    registry()
        .new_record(SLICE_PREDICATE)?
        .with("column_names", Value::List(names))
}

/// Predicate selecting a contiguous range of columns.
pub fn slice_predicate_range(range: Record) -> Result<Record, CodecError> {
    registry()
        .new_record(SLICE_PREDICATE)?
        .with("slice_range", range)
}

/// Key range between two keys, at most `count` rows.
pub fn key_range(
    start_key: impl Into<Bytes>,
    end_key: impl Into<Bytes>,
    count: i32,
) -> Result<Record, CodecError> {
    registry()
        .new_record(KEY_RANGE)?
        .with("start_key", start_key.into())?
        .with("end_key", end_key.into())?
        .with("count", count)
}
