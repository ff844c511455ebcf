//! Record instances.
//!
//! A record pairs its schema with one slot per declared field. A slot holds
//! `None` when the field is unset; there are no sentinel values. Fields with
//! a declared default start out holding it, and clearing them restores it.

use crate::error::CodecError;
use crate::schema::{FieldDescriptor, RecordSchema};
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Presence state of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// No value.
    Unset,
    /// Holds the declared default; not written when the field is optional.
    Default,
    /// Holds a value other than the declared default.
    Set,
}

/// A record value conforming to a [`RecordSchema`].
#[derive(Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    slots: Vec<Option<Value>>,
}

impl Record {
    /// Creates a record with every defaulted field at its default and every
    /// other field unset.
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let slots = schema.fields().iter().map(|f| f.default.clone()).collect();
        Self { schema, slots }
    }

    pub(crate) fn from_parts(schema: Arc<RecordSchema>, slots: Vec<Option<Value>>) -> Self {
        debug_assert_eq!(schema.fields().len(), slots.len());
        Self { schema, slots }
    }

    pub(crate) fn slot(&self, idx: usize) -> Option<&Value> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    /// Record type name.
    pub fn name(&self) -> &'static str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    fn index(&self, field: &str) -> Result<usize, CodecError> {
        self.schema
            .index_of_name(field)
            .ok_or_else(|| CodecError::UnknownField {
                record: self.schema.name(),
                field: field.to_string(),
            })
    }

    /// Value of the named field, or `None` if it is unset or not declared.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema
            .index_of_name(field)
            .and_then(|idx| self.slot(idx))
    }

    /// Value of the field with the given id.
    pub fn get_by_id(&self, id: i16) -> Option<&Value> {
        self.schema.index_of_id(id).and_then(|idx| self.slot(idx))
    }

    /// Returns whether the named field holds a value, default or not.
    pub fn is_set(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Presence state of the named field, or `None` if it is not declared.
    pub fn presence(&self, field: &str) -> Option<Presence> {
        let idx = self.schema.index_of_name(field)?;
        let descriptor = &self.schema.fields()[idx];
        Some(match &self.slots[idx] {
            None => Presence::Unset,
            Some(value) if descriptor.is_default(value) => Presence::Default,
            Some(_) => Presence::Set,
        })
    }

    /// Stores a value in the named field.
    ///
    /// The value must conform to the declared field type. Setting a field of
    /// a variant record unsets every other field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), CodecError> {
        let idx = self.index(field)?;
        let value = value.into();
        let descriptor = &self.schema.fields()[idx];
        if !value.conforms_to(&descriptor.field_type) {
            return Err(CodecError::TypeMismatch {
                record: self.schema.name(),
                field: descriptor.name,
                expected: descriptor.field_type.to_string(),
                actual: value.kind_name(),
            });
        }
        if self.schema.is_variant() {
            self.slots.iter_mut().for_each(|slot| *slot = None);
        }
        self.slots[idx] = Some(value);
        Ok(())
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Result<Self, CodecError> {
        self.set(field, value)?;
        Ok(self)
    }

    /// Resets the named field to its default, or unsets it if it has none.
    pub fn clear(&mut self, field: &str) -> Result<(), CodecError> {
        let idx = self.index(field)?;
        self.slots[idx] = self.schema.fields()[idx].default.clone();
        Ok(())
    }

    /// Removes and returns the value of the named field, leaving the default
    /// (if any) in its place.
    pub fn take(&mut self, field: &str) -> Result<Option<Value>, CodecError> {
        let idx = self.index(field)?;
        let default = self.schema.fields()[idx].default.clone();
        Ok(std::mem::replace(&mut self.slots[idx], default))
    }

    /// Fields that hold a value, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.schema
            .fields()
            .iter()
            .zip(&self.slots)
            .filter_map(|(field, slot)| slot.as_ref().map(|value| (field, value)))
    }

    /// The populated field of a variant record.
    ///
    /// For a plain struct this returns its first populated field.
    pub fn variant(&self) -> Option<(&FieldDescriptor, &Value)> {
        self.iter().next()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.schema.name());
        for (field, value) in self.iter() {
            s.field(field.name, value);
        }
        s.finish()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Record {}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.schema
            .name()
            .cmp(other.schema.name())
            .then_with(|| self.slots.cmp(&other.slots))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;
    use tagwire_protocol::TypeTag;

    fn sample() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::builder("Sample")
                .required(1, "id", FieldType::I64)
                .optional_with_default(2, "name", FieldType::String, "")
                .optional(3, "tags", FieldType::list(FieldType::String))
                .build()
                .unwrap(),
        )
    }

    fn choice() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::variant("Choice")
                .optional(1, "number", FieldType::I32)
                .optional(2, "text", FieldType::String)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_new_record_holds_defaults() {
        let record = Record::new(sample());
        assert_eq!(record.presence("id"), Some(Presence::Unset));
        assert_eq!(record.presence("name"), Some(Presence::Default));
        assert_eq!(record.get("name"), Some(&Value::from("")));
        assert_eq!(record.presence("tags"), Some(Presence::Unset));
        assert_eq!(record.presence("missing"), None);
    }

    #[test]
    fn test_set_and_get() {
        let mut record = Record::new(sample());
        record.set("id", 7i64).unwrap();
        record.set("name", "seven").unwrap();
        assert_eq!(record.get_by_id(1), Some(&Value::I64(7)));
        assert_eq!(record.presence("name"), Some(Presence::Set));

        // Setting the default value explicitly is indistinguishable from it.
        record.set("name", "").unwrap();
        assert_eq!(record.presence("name"), Some(Presence::Default));
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let mut record = Record::new(sample());
        let err = record.set("id", "seven").unwrap_err();
        assert!(matches!(
            err,
            CodecError::TypeMismatch {
                field: "id",
                actual: "string",
                ..
            }
        ));

        let tags = crate::value::List::from_values(TypeTag::I32, [Value::I32(1)]).unwrap();
        assert!(record.set("tags", Value::List(tags)).is_err());

        let err = record.set("nope", 1i64).unwrap_err();
        assert!(matches!(err, CodecError::UnknownField { .. }));
    }

    #[test]
    fn test_clear_restores_default() {
        let mut record = Record::new(sample())
            .with("id", 1i64)
            .unwrap()
            .with("name", "x")
            .unwrap();
        record.clear("name").unwrap();
        assert_eq!(record.presence("name"), Some(Presence::Default));
        record.clear("id").unwrap();
        assert_eq!(record.presence("id"), Some(Presence::Unset));

        let mut record = record.with("name", "y").unwrap();
        assert_eq!(record.take("name").unwrap(), Some(Value::from("y")));
        assert_eq!(record.get("name"), Some(&Value::from("")));
    }

    #[test]
    fn test_variant_keeps_one_field() {
        let mut record = Record::new(choice());
        assert!(record.variant().is_none());

        record.set("number", 3).unwrap();
        record.set("text", "three").unwrap();
        assert!(!record.is_set("number"));
        let (field, value) = record.variant().unwrap();
        assert_eq!(field.name, "text");
        assert_eq!(value.as_str(), Some("three"));
        assert_eq!(record.iter().count(), 1);
    }

    #[test]
    fn test_equality_and_debug() {
        let a = Record::new(sample()).with("id", 1i64).unwrap();
        let b = Record::new(sample()).with("id", 1i64).unwrap();
        let c = Record::new(sample()).with("id", 2i64).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);

        let debug = format!("{:?}", a);
        assert!(debug.starts_with("Sample"));
        assert!(debug.contains("id: I64(1)"));
        assert!(!debug.contains("tags"));
    }
}
