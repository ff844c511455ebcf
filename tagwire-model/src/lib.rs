//! # tagwire-model
//!
//! The column-store data model, declared as schema data for the generic
//! record codec in `tagwire-core`.
//!
//! This crate provides:
//! - Column, super column and counter records, and the column-or-supercolumn variant
//! - Predicates and ranges used to address columns and rows
//! - Mutations and deletions
//! - Keyspace, column family and column definitions
//! - CQL result records
//! - Exceptions carried as records
//! - A process-wide registry holding all of the above

pub mod auth;
pub mod column;
pub mod ddl;
pub mod enums;
pub mod exception;
pub mod mutation;
pub mod predicate;
pub mod result;

use std::sync::OnceLock;
use tagwire_core::{CodecError, RecordCodec, RecordSchema, SchemaRegistry};

pub use auth::authentication_request;
pub use column::{
    column, column_or_super_column, counter_column, counter_super_column, super_column,
};
pub use ddl::{cf_def, column_def, ks_def};
pub use mutation::{deletion, mutation_delete, mutation_insert, super_column_deletion};
pub use predicate::{
    column_parent, column_path, key_range, slice_predicate_names, slice_predicate_range,
    slice_range,
};
pub use result::{cql_int, cql_rows, key_count, key_slice, token_range};

/// Builds a fresh registry holding every model record.
pub fn build_registry() -> Result<SchemaRegistry, CodecError> {
    let mut registry = SchemaRegistry::new();
    let groups: [fn() -> Result<Vec<RecordSchema>, CodecError>; 7] = [
        column::schemas,
        exception::schemas,
        predicate::schemas,
        mutation::schemas,
        result::schemas,
        ddl::schemas,
        auth::schemas,
    ];
    for group in groups {
        for schema in group()? {
            registry.register(schema)?;
        }
    }
    registry.validate()?;
    Ok(registry)
}

/// The process-wide model registry.
pub fn registry() -> &'static SchemaRegistry {
    static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| build_registry().expect("model schemas are valid"))
}

/// A codec over the model registry with default configuration.
pub fn codec() -> RecordCodec<'static> {
    RecordCodec::new(registry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tagwire_core::{json, FieldType, List, Map, Presence, Record, Value};

    fn sample(ty: &FieldType, with_optional: bool) -> Value {
        match ty {
            FieldType::Bool => Value::Bool(true),
            FieldType::Byte => Value::Byte(7),
            FieldType::I16 => Value::I16(300),
            FieldType::I32 => Value::I32(70_000),
            FieldType::I64 => Value::I64(1 << 40),
            FieldType::Double => Value::Double(2.5),
            FieldType::String => Value::from("text"),
            FieldType::Binary => Value::from(vec![0xde, 0xad]),
            FieldType::Struct(name) => Value::Struct(fill(name, with_optional)),
            FieldType::List(elem) => Value::List(
                List::from_values(elem.tag(), [sample(elem, with_optional)]).unwrap(),
            ),
            FieldType::Set(elem) => Value::Set(
                List::from_values(elem.tag(), [sample(elem, with_optional)]).unwrap(),
            ),
            FieldType::Map(key, value) => {
                let mut map = Map::new(key.tag(), value.tag());
                map.insert(sample(key, with_optional), sample(value, with_optional))
                    .unwrap();
                Value::Map(map)
            }
        }
    }

    /// A value of the same kind that differs from `value`.
    fn other_than(value: &Value) -> Value {
        match value {
            Value::Bool(v) => Value::Bool(!v),
            Value::Byte(v) => Value::Byte(v.wrapping_add(1)),
            Value::I16(v) => Value::I16(v.wrapping_add(1)),
            Value::I32(v) => Value::I32(v.wrapping_add(1)),
            Value::I64(v) => Value::I64(v.wrapping_add(1)),
            Value::Double(v) => Value::Double(v + 1.0),
            Value::String(v) => Value::String(format!("{}-other", v)),
            Value::Binary(v) => Value::from([&v[..], b"-other"].concat()),
            other => panic!("no alternative for {:?}", other),
        }
    }

    /// A record with every required field set, and every optional one too
    /// when `with_optional` is true. Fields are never left at their default.
    fn fill(name: &str, with_optional: bool) -> Record {
        let mut record = registry().new_record(name).unwrap();
        let schema = std::sync::Arc::clone(record.schema());
        for field in schema.fields() {
            if field.is_required() || with_optional {
                let mut value = sample(&field.field_type, with_optional);
                if field.is_default(&value) {
                    value = other_than(&value);
                }
                record.set(field.name, value).unwrap();
            }
        }
        record
    }

    #[test]
    fn test_registry_is_complete() {
        let registry = registry();
        registry.validate().unwrap();
        assert_eq!(registry.len(), 32);
        for name in ["Column", "ColumnOrSuperColumn", "Mutation", "KsDef", "CqlResult"] {
            assert!(registry.get(name).is_some(), "missing {}", name);
        }
        assert!(registry.get("ColumnOrSuperColumn").unwrap().is_variant());
        assert!(registry.get("Mutation").unwrap().is_variant());
    }

    #[test]
    fn test_every_record_roundtrips() {
        let codec = codec();
        for name in registry().names() {
            for with_optional in [false, true] {
                let record = fill(name, with_optional);
                let bytes = codec.encode_to_bytes(&record).unwrap();
                let decoded = codec.decode_bytes(&bytes, name).unwrap();
                assert_eq!(decoded, record, "{} (optional: {})", name, with_optional);

                if !with_optional {
                    continue;
                }
                // Every field went over the wire, none as a default.
                for (field, _) in decoded.iter() {
                    assert_eq!(
                        decoded.presence(field.name),
                        Some(Presence::Set),
                        "{}.{}",
                        name,
                        field.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_filled_keyspace_writes_durable_writes() {
        let ks = fill("KsDef", true);
        assert_eq!(ks.get("durable_writes"), Some(&Value::Bool(false)));
        let bytes = codec().encode_to_bytes(&ks).unwrap();
        let decoded = codec().decode_bytes(&bytes, "KsDef").unwrap();
        assert_eq!(decoded.get("durable_writes"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_every_record_rejects_truncation() {
        let codec = codec();
        for name in registry().names() {
            let bytes = codec.encode_to_bytes(&fill(name, true)).unwrap();
            for cut in 0..bytes.len() {
                let err = codec.decode_bytes(&bytes[..cut], name).unwrap_err();
                assert!(err.is_truncation(), "{} cut at {}: {:?}", name, cut, err);
            }
        }
    }

    #[test]
    fn test_json_rendering_of_a_keyspace() {
        let ks = ks_def(
            "app",
            "SimpleStrategy",
            [("replication_factor", "1")],
            [cf_def("app", "users").unwrap()],
        )
        .unwrap();
        let rendered = json::record_to_json(&ks);
        assert_eq!(rendered["name"], serde_json::json!("app"));
        assert_eq!(
            rendered["strategy_options"],
            serde_json::json!({ "replication_factor": "1" })
        );
        assert_eq!(rendered["cf_defs"][0]["column_type"], serde_json::json!("Standard"));
    }

    proptest! {
        #[test]
        fn prop_insert_mutations_roundtrip(
            name in proptest::collection::vec(any::<u8>(), 0..32),
            value in proptest::collection::vec(any::<u8>(), 0..256),
            timestamp in any::<i64>(),
            ttl in proptest::option::of(any::<i32>()),
        ) {
            let mut col = column(name, value, timestamp).unwrap();
            if let Some(ttl) = ttl {
                col.set("ttl", ttl).unwrap();
            }
            let insert = mutation_insert(col).unwrap();
            let bytes = codec().encode_to_bytes(&insert).unwrap();
            let decoded = codec().decode_bytes(&bytes, mutation::MUTATION).unwrap();
            prop_assert_eq!(decoded, insert);
        }
    }
}
