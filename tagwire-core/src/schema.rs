//! Record schemas.
//!
//! A schema is plain data: the record's wire name, whether it is a variant,
//! and its fields in declaration order. Encoding follows declaration order;
//! decoding resolves whatever order the wire carries back to declarations.
//!
//! ```text
//! struct Column {
//!   1: required binary name
//!   2: optional binary value
//!   3: optional i64 timestamp
//!   4: optional i32 ttl
//! }
//! ```

use crate::error::CodecError;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use tagwire_protocol::{FieldHeader, TypeTag};

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    /// UTF-8 text.
    String,
    /// Raw bytes; shares the string wire tag.
    Binary,
    /// A nested record, by registered name.
    Struct(&'static str),
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
}

impl FieldType {
    pub fn list(elem: FieldType) -> Self {
        FieldType::List(Box::new(elem))
    }

    pub fn set(elem: FieldType) -> Self {
        FieldType::Set(Box::new(elem))
    }

    pub fn map(key: FieldType, value: FieldType) -> Self {
        FieldType::Map(Box::new(key), Box::new(value))
    }

    /// Wire tag for values of this type.
    pub fn tag(&self) -> TypeTag {
        match self {
            FieldType::Bool => TypeTag::Bool,
            FieldType::Byte => TypeTag::Byte,
            FieldType::I16 => TypeTag::I16,
            FieldType::I32 => TypeTag::I32,
            FieldType::I64 => TypeTag::I64,
            FieldType::Double => TypeTag::Double,
            FieldType::String | FieldType::Binary => TypeTag::String,
            FieldType::Struct(_) => TypeTag::Struct,
            FieldType::List(_) => TypeTag::List,
            FieldType::Set(_) => TypeTag::Set,
            FieldType::Map(..) => TypeTag::Map,
        }
    }

    /// Record name of a struct type.
    pub fn struct_name(&self) -> Option<&'static str> {
        match self {
            FieldType::Struct(name) => Some(*name),
            _ => None,
        }
    }

    /// Element type of a list or set.
    pub fn element_type(&self) -> Option<&FieldType> {
        match self {
            FieldType::List(elem) | FieldType::Set(elem) => Some(elem.as_ref()),
            _ => None,
        }
    }

    /// Key and value types of a map.
    pub fn entry_types(&self) -> Option<(&FieldType, &FieldType)> {
        match self {
            FieldType::Map(key, value) => Some((key.as_ref(), value.as_ref())),
            _ => None,
        }
    }

    /// Calls `f` with every record name referenced by this type.
    pub(crate) fn visit_structs(&self, f: &mut impl FnMut(&'static str)) {
        match self {
            FieldType::Struct(name) => f(*name),
            FieldType::List(elem) | FieldType::Set(elem) => elem.visit_structs(f),
            FieldType::Map(key, value) => {
                key.visit_structs(f);
                value.visit_structs(f);
            }
            _ => {}
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::Byte => f.write_str("byte"),
            FieldType::I16 => f.write_str("i16"),
            FieldType::I32 => f.write_str("i32"),
            FieldType::I64 => f.write_str("i64"),
            FieldType::Double => f.write_str("double"),
            FieldType::String => f.write_str("string"),
            FieldType::Binary => f.write_str("binary"),
            FieldType::Struct(name) => write!(f, "struct {}", name),
            FieldType::List(elem) => write!(f, "list<{}>", elem),
            FieldType::Set(elem) => write!(f, "set<{}>", elem),
            FieldType::Map(key, value) => write!(f, "map<{},{}>", key, value),
        }
    }
}

/// Whether a field must always be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    /// Always written; encoding fails if unset.
    Required,
    /// Written only when set to something other than the declared default.
    Optional,
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Wire name.
    pub name: &'static str,
    /// Numeric id, unique and positive within the record.
    pub id: i16,
    pub field_type: FieldType,
    pub requiredness: Requiredness,
    /// Value assumed when the field is absent from the wire.
    pub default: Option<Value>,
}

impl FieldDescriptor {
    pub fn required(id: i16, name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            id,
            field_type,
            requiredness: Requiredness::Required,
            default: None,
        }
    }

    pub fn optional(id: i16, name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            id,
            field_type,
            requiredness: Requiredness::Optional,
            default: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }

    /// Returns whether `value` equals the declared default.
    pub fn is_default(&self, value: &Value) -> bool {
        self.default.as_ref() == Some(value)
    }
}

/// Struct or tagged union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Struct,
    /// All fields optional; at most one populated at a time.
    Variant,
}

/// Validated and indexed schema of one record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: &'static str,
    kind: RecordKind,
    fields: Vec<FieldDescriptor>,
    by_id: HashMap<i16, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl RecordSchema {
    /// Starts a struct schema.
    pub fn builder(name: &'static str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name,
            kind: RecordKind::Struct,
            fields: Vec::new(),
        }
    }

    /// Starts a variant schema.
    pub fn variant(name: &'static str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name,
            kind: RecordKind::Variant,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn is_variant(&self) -> bool {
        self.kind == RecordKind::Variant
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Position of the field with the given id.
    pub fn index_of_id(&self, id: i16) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Position of the field with the given name.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn field_by_id(&self, id: i16) -> Option<&FieldDescriptor> {
        self.index_of_id(id).map(|idx| &self.fields[idx])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of_name(name).map(|idx| &self.fields[idx])
    }

    /// Resolves a wire field header to a declared field position.
    ///
    /// A positive id is looked up by id. An absent, zero or negative id falls
    /// back to the header's name, if it carries one.
    pub fn resolve(&self, header: &FieldHeader) -> Option<usize> {
        match header.id {
            Some(id) if id > 0 => self.index_of_id(id),
            _ => header
                .name
                .as_deref()
                .and_then(|name| self.index_of_name(name)),
        }
    }
}

/// Collects field declarations and validates them into a [`RecordSchema`].
#[derive(Debug, Clone)]
pub struct RecordSchemaBuilder {
    name: &'static str,
    kind: RecordKind,
    fields: Vec<FieldDescriptor>,
}

impl RecordSchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn required(self, id: i16, name: &'static str, field_type: FieldType) -> Self {
        self.field(FieldDescriptor::required(id, name, field_type))
    }

    pub fn optional(self, id: i16, name: &'static str, field_type: FieldType) -> Self {
        self.field(FieldDescriptor::optional(id, name, field_type))
    }

    /// Required field that starts out holding `default`.
    pub fn required_with_default(
        self,
        id: i16,
        name: &'static str,
        field_type: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        let field = FieldDescriptor::required(id, name, field_type);
        self.field(field.with_default(default))
    }

    pub fn optional_with_default(
        self,
        id: i16,
        name: &'static str,
        field_type: FieldType,
        default: impl Into<Value>,
    ) -> Self {
        let field = FieldDescriptor::optional(id, name, field_type);
        self.field(field.with_default(default))
    }

    /// Validates the declarations.
    ///
    /// Rejects non-positive or duplicate ids, duplicate names, defaults that
    /// do not conform to their field type, and variants with required or
    /// defaulted fields.
    pub fn build(self) -> Result<RecordSchema, CodecError> {
        let invalid = |reason: String| CodecError::InvalidSchema {
            record: self.name.to_string(),
            reason,
        };

        let mut by_id = HashMap::with_capacity(self.fields.len());
        let mut by_name = HashMap::with_capacity(self.fields.len());

        for (idx, field) in self.fields.iter().enumerate() {
            if field.id <= 0 {
                return Err(invalid(format!(
                    "field '{}' has non-positive id {}",
                    field.name, field.id
                )));
            }
            if by_id.insert(field.id, idx).is_some() {
                return Err(invalid(format!("duplicate field id {}", field.id)));
            }
            if by_name.insert(field.name, idx).is_some() {
                return Err(invalid(format!("duplicate field name '{}'", field.name)));
            }
            if let Some(default) = &field.default {
                if !default.conforms_to(&field.field_type) {
                    return Err(invalid(format!(
                        "default for '{}' is not a {}",
                        field.name, field.field_type
                    )));
                }
            }
            if self.kind == RecordKind::Variant {
                if field.is_required() {
                    return Err(invalid(format!(
                        "variant field '{}' cannot be required",
                        field.name
                    )));
                }
                if field.default.is_some() {
                    return Err(invalid(format!(
                        "variant field '{}' cannot have a default",
                        field.name
                    )));
                }
            }
        }

        Ok(RecordSchema {
            name: self.name,
            kind: self.kind,
            fields: self.fields,
            by_id,
            by_name,
        })
    }
}
