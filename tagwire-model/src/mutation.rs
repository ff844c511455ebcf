//! Mutations: an insert of one column (of any kind) or a deletion.
//!
//! `Mutation` is a variant record: exactly one of `column_or_supercolumn`
//! and `deletion` is populated.

use crate::column::{column_or_super_column, COLUMN_OR_SUPER_COLUMN};
use crate::predicate::SLICE_PREDICATE;
use crate::registry;
use bytes::Bytes;
use tagwire_core::{CodecError, FieldType, Record, RecordSchema};

pub const DELETION: &str = "Deletion";
pub const MUTATION: &str = "Mutation";

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    Ok(vec![
        RecordSchema::builder(DELETION)
            .optional(1, "timestamp", FieldType::I64)
            .optional(2, "super_column", FieldType::Binary)
            .optional(3, "predicate", FieldType::Struct(SLICE_PREDICATE))
            .build()?,
        RecordSchema::variant(MUTATION)
            .optional(
                1,
                "column_or_supercolumn",
                FieldType::Struct(COLUMN_OR_SUPER_COLUMN),
            )
            .optional(2, "deletion", FieldType::Struct(DELETION))
            .build()?,
    ])
}

/// Deletion at `timestamp`, optionally restricted by a slice predicate.
pub fn deletion(timestamp: i64, predicate: Option<Record>) -> Result<Record, CodecError> {
    let mut record = registry().new_record(DELETION)?.with("timestamp", timestamp)?;
    if let Some(predicate) = predicate {
        record.set("predicate", predicate)?;
    }
    Ok(record)
}

/// Deletion of a whole super column.
pub fn super_column_deletion(
    timestamp: i64,
    super_column: impl Into<Bytes>,
) -> Result<Record, CodecError> {
    deletion(timestamp, None)?.with("super_column", super_column.into())
}

/// Mutation inserting a column, super column or counter.
pub fn mutation_insert(column: Record) -> Result<Record, CodecError> {
    registry()
        .new_record(MUTATION)?
        .with("column_or_supercolumn", column_or_super_column(column)?)
}

/// Mutation applying a deletion.
pub fn mutation_delete(deletion: Record) -> Result<Record, CodecError> {
    registry().new_record(MUTATION)?.with("deletion", deletion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{codec, column, slice_predicate_names};
    use tagwire_core::{CodecConfig, RecordCodec, VariantPolicy};
    use tagwire_protocol::{BinaryWriter, ProtocolWriter, TypeTag};

    #[test]
    fn test_insert_roundtrip() {
        let insert = mutation_insert(column(&b"c"[..], &b"v"[..], 3).unwrap()).unwrap();
        let bytes = codec().encode_to_bytes(&insert).unwrap();
        let decoded = codec().decode_bytes(&bytes, MUTATION).unwrap();
        assert_eq!(decoded, insert);
        assert_eq!(decoded.variant().unwrap().0.name, "column_or_supercolumn");
    }

    #[test]
    fn test_delete_roundtrip() {
        let predicate = slice_predicate_names([&b"c"[..]]).unwrap();
        let delete = mutation_delete(deletion(9, Some(predicate)).unwrap()).unwrap();
        let bytes = codec().encode_to_bytes(&delete).unwrap();
        let decoded = codec().decode_bytes(&bytes, MUTATION).unwrap();
        assert_eq!(decoded, delete);
        assert!(!decoded.is_set("column_or_supercolumn"));

        let sc = super_column_deletion(10, &b"sc"[..]).unwrap();
        assert!(sc.is_set("super_column"));
        assert!(!sc.is_set("predicate"));
    }

    fn both_fields() -> Vec<u8> {
        let mut w = BinaryWriter::in_memory();
        w.write_field_begin("deletion", TypeTag::Struct, 2).unwrap();
        w.write_field_begin("timestamp", TypeTag::I64, 1).unwrap();
        w.write_i64(1).unwrap();
        w.write_field_stop().unwrap();
        w.write_field_begin("column_or_supercolumn", TypeTag::Struct, 1).unwrap();
        w.write_field_stop().unwrap();
        w.write_field_stop().unwrap();
        w.into_inner().to_vec()
    }

    #[test]
    fn test_conflicting_mutation() {
        let err = codec().decode_bytes(&both_fields(), MUTATION).unwrap_err();
        assert_eq!(err.error_code(), "VARIANT_CONFLICT");

        let config = CodecConfig {
            variant_policy: VariantPolicy::KeepLast,
            ..Default::default()
        };
        let decoded = RecordCodec::with_config(registry(), config)
            .decode_bytes(&both_fields(), MUTATION)
            .unwrap();
        assert!(decoded.is_set("column_or_supercolumn"));
        assert!(!decoded.is_set("deletion"));
    }
}
