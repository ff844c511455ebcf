//! Schema registry.
//!
//! Maps record names to schemas. Built once, then shared read-only between
//! any number of codecs and threads.

use crate::error::CodecError;
use crate::record::Record;
use crate::schema::RecordSchema;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable lookup of record schemas by name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Arc<RecordSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a schema. Names must be unique.
    pub fn register(&mut self, schema: RecordSchema) -> Result<Arc<RecordSchema>, CodecError> {
        let name = schema.name();
        if self.schemas.contains_key(name) {
            return Err(CodecError::InvalidSchema {
                record: name.to_string(),
                reason: "record registered twice".to_string(),
            });
        }
        let schema = Arc::new(schema);
        self.schemas.insert(name, Arc::clone(&schema));
        Ok(schema)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, schema: RecordSchema) -> Result<Self, CodecError> {
        self.register(schema)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RecordSchema>> {
        self.schemas.get(name)
    }

    /// Like [`get`](Self::get), failing with `UnknownRecord`.
    pub fn schema_for(&self, name: &str) -> Result<&Arc<RecordSchema>, CodecError> {
        self.get(name)
            .ok_or_else(|| CodecError::UnknownRecord(name.to_string()))
    }

    /// Checks that every record referenced by a field type is registered.
    pub fn validate(&self) -> Result<(), CodecError> {
        for schema in self.schemas.values() {
            for field in schema.fields() {
                let mut missing = None;
                field.field_type.visit_structs(&mut |name| {
                    if missing.is_none() && !self.schemas.contains_key(name) {
                        missing = Some(name);
                    }
                });
                if let Some(name) = missing {
                    return Err(CodecError::InvalidSchema {
                        record: schema.name().to_string(),
                        reason: format!(
                            "field '{}' references unregistered record {}",
                            field.name, name
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Registered record names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Creates an empty record of the named type.
    pub fn new_record(&self, name: &str) -> Result<Record, CodecError> {
        self.schema_for(name).map(|schema| Record::new(Arc::clone(schema)))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn leaf() -> RecordSchema {
        RecordSchema::builder("Leaf")
            .required(1, "v", FieldType::I32)
            .build()
            .unwrap()
    }

    fn holder() -> RecordSchema {
        RecordSchema::builder("Holder")
            .optional(
                1,
                "leaves",
                FieldType::map(FieldType::String, FieldType::Struct("Leaf")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = SchemaRegistry::new().with(leaf()).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Leaf").is_some());
        assert!(matches!(
            registry.schema_for("Other"),
            Err(CodecError::UnknownRecord(name)) if name == "Other"
        ));

        let record = registry.new_record("Leaf").unwrap();
        assert_eq!(record.name(), "Leaf");
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = SchemaRegistry::new();
        registry.register(leaf()).unwrap();
        assert!(matches!(
            registry.register(leaf()),
            Err(CodecError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn test_validate_references() {
        let registry = SchemaRegistry::new().with(holder()).unwrap();
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("Leaf"));

        let registry = registry.with(leaf()).unwrap();
        registry.validate().unwrap();
        assert_eq!(registry.names(), ["Holder", "Leaf"]);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
        assert_send_sync::<Record>();
    }
}
