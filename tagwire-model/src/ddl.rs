//! Keyspace and column family definitions.
//!
//! Gaps in the field ids are fields that have been retired; old peers may
//! still send them and they are skipped on decode.

use crate::registry;
use bytes::Bytes;
use tagwire_core::{CodecError, FieldType, List, Record, RecordSchema, Value};
use tagwire_protocol::TypeTag;

pub const COLUMN_DEF: &str = "ColumnDef";
pub const CF_DEF: &str = "CfDef";
pub const KS_DEF: &str = "KsDef";

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    let options = || FieldType::map(FieldType::String, FieldType::String);
    Ok(vec![
        RecordSchema::builder(COLUMN_DEF)
            .required(1, "name", FieldType::Binary)
            .required(2, "validation_class", FieldType::String)
            .optional(3, "index_type", FieldType::I32)
            .optional(4, "index_name", FieldType::String)
            .optional(5, "index_options", options())
            .build()?,
        RecordSchema::builder(CF_DEF)
            .required(1, "keyspace", FieldType::String)
            .required(2, "name", FieldType::String)
            .optional_with_default(3, "column_type", FieldType::String, "Standard")
            .optional_with_default(5, "comparator_type", FieldType::String, "BytesType")
            .optional(6, "subcomparator_type", FieldType::String)
            .optional(8, "comment", FieldType::String)
            .optional(9, "row_cache_size", FieldType::Double)
            .optional_with_default(11, "key_cache_size", FieldType::Double, 200_000.0)
            .optional_with_default(12, "read_repair_chance", FieldType::Double, 1.0)
            .optional(
                13,
                "column_metadata",
                FieldType::list(FieldType::Struct(COLUMN_DEF)),
            )
            .optional(14, "gc_grace_seconds", FieldType::I32)
            .optional(15, "default_validation_class", FieldType::String)
            .optional(16, "id", FieldType::I32)
            .optional(17, "min_compaction_threshold", FieldType::I32)
            .optional(18, "max_compaction_threshold", FieldType::I32)
            .optional(19, "row_cache_save_period_in_seconds", FieldType::I32)
            .optional(20, "key_cache_save_period_in_seconds", FieldType::I32)
            .optional(24, "replicate_on_write", FieldType::Bool)
            .optional(26, "key_validation_class", FieldType::String)
            .optional(28, "key_alias", FieldType::Binary)
            .optional(29, "compaction_strategy", FieldType::String)
            .optional(30, "compaction_strategy_options", options())
            .optional(32, "compression_options", options())
            .optional(33, "bloom_filter_fp_chance", FieldType::Double)
            .build()?,
        RecordSchema::builder(KS_DEF)
            .required(1, "name", FieldType::String)
            .required(2, "strategy_class", FieldType::String)
            .optional(3, "strategy_options", options())
            .optional(4, "replication_factor", FieldType::I32)
            .required(5, "cf_defs", FieldType::list(FieldType::Struct(CF_DEF)))
            .optional_with_default(6, "durable_writes", FieldType::Bool, true)
            .build()?,
    ])
}

pub fn column_def(name: impl Into<Bytes>, validation_class: &str) -> Result<Record, CodecError> {
    registry()
        .new_record(COLUMN_DEF)?
        .with("name", name.into())?
        .with("validation_class", validation_class)
}

/// Column family `name` in `keyspace` with every other setting at its
/// default.
pub fn cf_def(keyspace: &str, name: &str) -> Result<Record, CodecError> {
    registry()
        .new_record(CF_DEF)?
        .with("keyspace", keyspace)?
        .with("name", name)
}

/// Keyspace definition. `strategy_options` are written only when non-empty.
pub fn ks_def<'a>(
    name: &str,
    strategy_class: &str,
    strategy_options: impl IntoIterator<Item = (&'a str, &'a str)>,
    cf_defs: impl IntoIterator<Item = Record>,
) -> Result<Record, CodecError> {
    let cf_defs = List::from_values(TypeTag::Struct, cf_defs.into_iter().map(Value::Struct))?;
    let mut record = registry()
        .new_record(KS_DEF)?
        .with("name", name)?
        .with("strategy_class", strategy_class)?
        .with("cf_defs", Value::List(cf_defs))?;

    let mut options = tagwire_core::Map::new(TypeTag::String, TypeTag::String);
    for (key, value) in strategy_options {
        options.insert(Value::from(key), Value::from(value))?;
    }
    if !options.is_empty() {
        record.set("strategy_options", options)?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::enums::index_type;
    use tagwire_core::Presence;

    fn keyspace() -> Record {
        let mut users = cf_def("app", "users").unwrap();
        let mut email = column_def(&b"email"[..], "UTF8Type").unwrap();
        email.set("index_type", index_type::KEYS).unwrap();
        let metadata = List::from_values(TypeTag::Struct, [Value::from(email)]).unwrap();
        users.set("column_metadata", Value::List(metadata)).unwrap();
        users.set("gc_grace_seconds", 864_000).unwrap();

        ks_def(
            "app",
            "org.apache.cassandra.locator.SimpleStrategy",
            [("replication_factor", "3")],
            [users, cf_def("app", "sessions").unwrap()],
        )
        .unwrap()
    }

    #[test]
    fn test_cf_def_defaults() {
        let cf = cf_def("app", "users").unwrap();
        assert_eq!(cf.get("column_type"), Some(&Value::from("Standard")));
        assert_eq!(cf.get("key_cache_size"), Some(&Value::Double(200_000.0)));
        assert_eq!(cf.presence("read_repair_chance"), Some(Presence::Default));
        assert_eq!(cf.presence("comment"), Some(Presence::Unset));
    }

    #[test]
    fn test_defaults_are_not_written() {
        let cf = cf_def("ks", "cf").unwrap();
        let bytes = codec().encode_to_bytes(&cf).unwrap();
        // keyspace and name, then stop
        assert_eq!(bytes.len(), (3 + 4 + 2) * 2 + 1);

        let decoded = codec().decode_bytes(&bytes, CF_DEF).unwrap();
        assert_eq!(decoded, cf);
        assert_eq!(decoded.get("comparator_type"), Some(&Value::from("BytesType")));
    }

    #[test]
    fn test_keyspace_roundtrip() {
        let ks = keyspace();
        assert_eq!(ks.get("durable_writes"), Some(&Value::Bool(true)));

        let bytes = codec().encode_to_bytes(&ks).unwrap();
        let decoded = codec().decode_bytes(&bytes, KS_DEF).unwrap();
        assert_eq!(decoded, ks);

        let cf_defs = decoded.get("cf_defs").and_then(Value::as_list).unwrap();
        let users = cf_defs.get(0).and_then(Value::as_record).unwrap();
        assert_eq!(users.get("gc_grace_seconds"), Some(&Value::I32(864_000)));
    }

    #[test]
    fn test_retired_ids_are_skipped() {
        let cf = cf_def("ks", "cf").unwrap();
        let mut bytes = codec().encode_to_bytes(&cf).unwrap().to_vec();
        bytes.pop();
        // 7: double, no longer declared
        bytes.extend_from_slice(&[4, 0, 7]);
        bytes.extend_from_slice(&0.5f64.to_bits().to_be_bytes());
        bytes.push(0);

        assert_eq!(codec().decode_bytes(&bytes, CF_DEF).unwrap(), cf);
    }

    #[test]
    fn test_empty_options_are_omitted() {
        let ks = ks_def(
            "ks",
            "SimpleStrategy",
            Vec::<(&str, &str)>::new(),
            Vec::<Record>::new(),
        )
        .unwrap();
        assert!(!ks.is_set("strategy_options"));
        let bytes = codec().encode_to_bytes(&ks).unwrap();
        assert_eq!(codec().decode_bytes(&bytes, KS_DEF).unwrap(), ks);
    }
}
