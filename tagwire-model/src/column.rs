//! Columns and super columns.
//!
//! ```text
//! struct Column             { 1: required binary name, 2: optional binary value,
//!                             3: optional i64 timestamp, 4: optional i32 ttl }
//! struct SuperColumn        { 1: required binary name, 2: required list<Column> columns }
//! struct CounterColumn      { 1: required binary name, 2: required i64 value }
//! struct CounterSuperColumn { 1: required binary name, 2: required list<CounterColumn> columns }
//! union  ColumnOrSuperColumn { 1: Column column, 2: SuperColumn super_column,
//!                              3: CounterColumn counter_column,
//!                              4: CounterSuperColumn counter_super_column }
//! ```

use crate::registry;
use bytes::Bytes;
use tagwire_core::{CodecError, FieldType, List, Record, RecordSchema, Value};
use tagwire_protocol::TypeTag;

pub const COLUMN: &str = "Column";
pub const SUPER_COLUMN: &str = "SuperColumn";
pub const COUNTER_COLUMN: &str = "CounterColumn";
pub const COUNTER_SUPER_COLUMN: &str = "CounterSuperColumn";
pub const COLUMN_OR_SUPER_COLUMN: &str = "ColumnOrSuperColumn";

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    Ok(vec![
        RecordSchema::builder(COLUMN)
            .required(1, "name", FieldType::Binary)
            .optional(2, "value", FieldType::Binary)
            .optional(3, "timestamp", FieldType::I64)
            .optional(4, "ttl", FieldType::I32)
            .build()?,
        RecordSchema::builder(SUPER_COLUMN)
            .required(1, "name", FieldType::Binary)
            .required(2, "columns", FieldType::list(FieldType::Struct(COLUMN)))
            .build()?,
        RecordSchema::builder(COUNTER_COLUMN)
            .required(1, "name", FieldType::Binary)
            .required(2, "value", FieldType::I64)
            .build()?,
        RecordSchema::builder(COUNTER_SUPER_COLUMN)
            .required(1, "name", FieldType::Binary)
            .required(
                2,
                "columns",
                FieldType::list(FieldType::Struct(COUNTER_COLUMN)),
            )
            .build()?,
        RecordSchema::variant(COLUMN_OR_SUPER_COLUMN)
            .optional(1, "column", FieldType::Struct(COLUMN))
            .optional(2, "super_column", FieldType::Struct(SUPER_COLUMN))
            .optional(3, "counter_column", FieldType::Struct(COUNTER_COLUMN))
            .optional(
                4,
                "counter_super_column",
                FieldType::Struct(COUNTER_SUPER_COLUMN),
            )
            .build()?,
    ])
}

/// A column with a value and write timestamp.
pub fn column(
    name: impl Into<Bytes>,
    value: impl Into<Bytes>,
    timestamp: i64,
) -> Result<Record, CodecError> {
    registry()
        .new_record(COLUMN)?
        .with("name", name.into())?
        .with("value", value.into())?
        .with("timestamp", timestamp)
}

/// A super column grouping `columns` under `name`.
pub fn super_column(
    name: impl Into<Bytes>,
    columns: impl IntoIterator<Item = Record>,
) -> Result<Record, CodecError> {
    let columns = List::from_values(TypeTag::Struct, columns.into_iter().map(Value::Struct))?;
    registry()
        .new_record(SUPER_COLUMN)?
        .with("name", name.into())?
        .with("columns", Value::List(columns))
}

pub fn counter_column(name: impl Into<Bytes>, value: i64) -> Result<Record, CodecError> {
    registry()
        .new_record(COUNTER_COLUMN)?
        .with("name", name.into())?
        .with("value", value)
}

pub fn counter_super_column(
    name: impl Into<Bytes>,
    columns: impl IntoIterator<Item = Record>,
) -> Result<Record, CodecError> {
    let columns = List::from_values(TypeTag::Struct, columns.into_iter().map(Value::Struct))?;
    registry()
        .new_record(COUNTER_SUPER_COLUMN)?
        .with("name", name.into())?
        .with("columns", Value::List(columns))
}

/// Wraps any of the four column kinds in a `ColumnOrSuperColumn`.
pub fn column_or_super_column(inner: Record) -> Result<Record, CodecError> {
    let field = match inner.name() {
        COLUMN => "column",
        SUPER_COLUMN => "super_column",
        COUNTER_COLUMN => "counter_column",
        COUNTER_SUPER_COLUMN => "counter_super_column",
        other => {
            return Err(CodecError::UnknownField {
                record: COLUMN_OR_SUPER_COLUMN,
                field: other.to_string(),
            })
        }
    };
    registry()
        .new_record(COLUMN_OR_SUPER_COLUMN)?
        .with(field, inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use tagwire_core::Presence;

    #[test]
    fn test_column_constructor() {
        let col = column(&b"name"[..], &b"value"[..], 1_700_000_000).unwrap();
        assert_eq!(col.get("timestamp"), Some(&Value::I64(1_700_000_000)));
        assert_eq!(col.presence("ttl"), Some(Presence::Unset));
    }

    #[test]
    fn test_column_wire_layout() {
        let col = registry()
            .new_record(COLUMN)
            .unwrap()
            .with("name", &b"c"[..])
            .unwrap()
            .with("ttl", 60)
            .unwrap();
        let bytes = codec().encode_to_bytes(&col).unwrap();
        assert_eq!(
            &bytes[..],
            [11, 0, 1, 0, 0, 0, 1, b'c', 8, 0, 4, 0, 0, 0, 60, 0]
        );
    }

    #[test]
    fn test_super_column_roundtrip() {
        let sc = super_column(
            &b"sc"[..],
            [
                column(&b"a"[..], &b"1"[..], 1).unwrap(),
                column(&b"b"[..], &b"2"[..], 2).unwrap(),
            ],
        )
        .unwrap();
        let wrapped = column_or_super_column(sc.clone()).unwrap();

        let bytes = codec().encode_to_bytes(&wrapped).unwrap();
        let decoded = codec().decode_bytes(&bytes, COLUMN_OR_SUPER_COLUMN).unwrap();
        let (field, value) = decoded.variant().unwrap();
        assert_eq!(field.name, "super_column");
        assert_eq!(value.as_record(), Some(&sc));
    }

    #[test]
    fn test_counter_columns() {
        let csc = counter_super_column(
            &b"totals"[..],
            [counter_column(&b"hits"[..], 12).unwrap()],
        )
        .unwrap();
        let wrapped = column_or_super_column(csc).unwrap();
        assert!(wrapped.is_set("counter_super_column"));

        let bytes = codec().encode_to_bytes(&wrapped).unwrap();
        assert_eq!(
            codec().decode_bytes(&bytes, COLUMN_OR_SUPER_COLUMN).unwrap(),
            wrapped
        );
    }

    #[test]
    fn test_wrap_rejects_other_records() {
        let parent = crate::column_parent("Standard1").unwrap();
        assert!(column_or_super_column(parent).is_err());
    }
}
