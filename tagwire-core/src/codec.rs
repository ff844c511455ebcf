//! The record codec.
//!
//! One interpreter encodes and decodes every record type by walking its
//! [`RecordSchema`]. Decoding resolves fields by id (falling back to the
//! name for encodings that carry one), trusts the wire tag over the
//! declaration, and skips anything it cannot place so that older readers
//! accept streams from newer writers.

use crate::config::{CodecConfig, VariantPolicy};
use crate::error::CodecError;
use crate::record::Record;
use crate::registry::SchemaRegistry;
use crate::schema::{FieldType, RecordSchema};
use crate::value::Value;
use bytes::BytesMut;
use std::sync::Arc;
use tagwire_protocol::{
    skip, BinaryReader, BinaryWriter, FieldHeader, ProtocolError, ProtocolReader, ProtocolWriter,
    TypeTag,
};
use tracing::{debug, trace, warn};

/// Schema-driven encoder and decoder.
#[derive(Debug, Clone)]
pub struct RecordCodec<'r> {
    registry: &'r SchemaRegistry,
    config: CodecConfig,
}

impl<'r> RecordCodec<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r SchemaRegistry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes one record of type `record` from `reader`.
    pub fn decode<R>(&self, reader: &mut R, record: &str) -> Result<Record, CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        let schema = self.registry.schema_for(record)?;
        self.decode_record(reader, schema, 1)
    }

    /// Decodes one record from a byte slice using the binary protocol.
    ///
    /// Bytes following the record are left unread.
    pub fn decode_bytes(&self, data: &[u8], record: &str) -> Result<Record, CodecError> {
        let mut reader = BinaryReader::from_slice(data).with_limits(self.config.read_limits());
        self.decode(&mut reader, record)
    }

    /// Encodes `record` to `writer`.
    pub fn encode<W>(&self, writer: &mut W, record: &Record) -> Result<(), CodecError>
    where
        W: ProtocolWriter + ?Sized,
    {
        self.encode_record(writer, record, 1)
    }

    /// Encodes `record` into a fresh buffer using the binary protocol.
    pub fn encode_to_bytes(&self, record: &Record) -> Result<BytesMut, CodecError> {
        let mut writer = BinaryWriter::in_memory();
        self.encode(&mut writer, record)?;
        Ok(writer.into_inner())
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), CodecError> {
        if depth > self.config.max_depth {
            return Err(ProtocolError::DepthLimitExceeded {
                max: self.config.max_depth,
            }
            .into());
        }
        Ok(())
    }

    /// Skips one value found inside a container or record at `depth`.
    pub(crate) fn skip_value<R>(
        &self,
        reader: &mut R,
        tag: TypeTag,
        depth: usize,
    ) -> Result<(), CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        skip(reader, tag, self.config.max_depth.saturating_sub(depth)).map_err(Into::into)
    }

    fn decode_record<R>(
        &self,
        reader: &mut R,
        schema: &Arc<RecordSchema>,
        depth: usize,
    ) -> Result<Record, CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        self.check_depth(depth)?;
        let record = schema.name();
        let offset = reader.offset();
        let wire_name = reader
            .read_struct_begin()
            .map_err(context(record, "<begin>", 0, offset))?;
        trace!(record, ?wire_name, depth, "record begin");

        let fields = schema.fields();
        let mut slots: Vec<Option<Value>> = vec![None; fields.len()];
        let mut populated: Option<usize> = None;

        loop {
            let offset = reader.offset();
            let header = reader
                .read_field_begin()
                .map_err(context(record, "<field header>", 0, offset))?;
            if header.is_stop() {
                break;
            }

            let resolved = match header.tag {
                TypeTag::Void => None,
                _ => schema.resolve(&header),
            };
            let Some(idx) = resolved else {
                debug!(
                    record,
                    id = ?header.id,
                    name = ?header.name,
                    tag = %header.tag,
                    offset,
                    "skipping unknown field"
                );
                let label = header_label(&header);
                let id = header.id.unwrap_or(0);
                self.skip_value(reader, header.tag, depth)
                    .map_err(context(record, label.clone(), id, offset))?;
                reader
                    .read_field_end()
                    .map_err(context(record, label, id, offset))?;
                continue;
            };

            let field = &fields[idx];
            let value = self
                .decode_value(reader, header.tag, Some(&field.field_type), depth)
                .map_err(context(record, field.name, field.id, offset))?;
            reader
                .read_field_end()
                .map_err(context(record, field.name, field.id, offset))?;

            let Some(value) = value else {
                debug!(
                    record,
                    field = field.name,
                    tag = %header.tag,
                    offset,
                    "dropping field with no schema for its payload"
                );
                continue;
            };

            if schema.is_variant() {
                if let Some(prev) = populated.filter(|&prev| prev != idx) {
                    match self.config.variant_policy {
                        VariantPolicy::Reject => {
                            return Err(CodecError::VariantConflict {
                                record,
                                first: fields[prev].name,
                                second: field.name,
                            }
                            .in_field(record, field.name, field.id, offset));
                        }
                        VariantPolicy::KeepLast => {
                            warn!(
                                record,
                                dropped = fields[prev].name,
                                kept = field.name,
                                "variant record carries several fields, keeping the last"
                            );
                            slots[prev] = None;
                        }
                    }
                }
                populated = Some(idx);
            }
            slots[idx] = Some(value);
        }

        let offset = reader.offset();
        reader
            .read_struct_end()
            .map_err(context(record, "<end>", 0, offset))?;

        let offset = reader.offset();
        for (slot, field) in slots.iter_mut().zip(fields) {
            if slot.is_some() {
                continue;
            }
            match &field.default {
                Some(default) => *slot = Some(default.clone()),
                None if field.is_required() => {
                    return Err(CodecError::MissingRequiredField {
                        record,
                        field: field.name,
                    }
                    .in_field(record, field.name, field.id, offset));
                }
                None => {}
            }
        }

        trace!(record, depth, "record end");
        Ok(Record::from_parts(Arc::clone(schema), slots))
    }

    /// Decodes one value announced by `tag`.
    ///
    /// `declared` is the declared type at this position when it applies to
    /// the wire kind. Returns `Ok(None)` when the payload was consumed but
    /// cannot be represented, which happens when a struct arrives where no
    /// record schema is declared.
    pub(crate) fn decode_value<R>(
        &self,
        reader: &mut R,
        tag: TypeTag,
        declared: Option<&FieldType>,
        depth: usize,
    ) -> Result<Option<Value>, CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        let value = match tag {
            TypeTag::Bool => Value::Bool(reader.read_bool()?),
            TypeTag::Byte => Value::Byte(reader.read_byte()?),
            TypeTag::I16 => Value::I16(reader.read_i16()?),
            TypeTag::I32 => Value::I32(reader.read_i32()?),
            TypeTag::I64 => Value::I64(reader.read_i64()?),
            TypeTag::Double => Value::Double(reader.read_double()?),
            TypeTag::String => match declared {
                Some(FieldType::String) => Value::String(reader.read_string()?),
                _ => Value::Binary(reader.read_binary()?),
            },
            TypeTag::Struct => match declared.and_then(FieldType::struct_name) {
                Some(name) => {
                    let schema = self.registry.schema_for(name)?;
                    Value::Struct(self.decode_record(reader, schema, depth + 1)?)
                }
                None => {
                    self.skip_value(reader, tag, depth)?;
                    return Ok(None);
                }
            },
            TypeTag::List | TypeTag::Set | TypeTag::Map => {
                return self.decode_collection(reader, tag, declared, depth + 1);
            }
            TypeTag::Void => return Ok(None),
            TypeTag::Stop => {
                return Err(ProtocolError::StructuralMismatch {
                    expected: "value",
                    offset: reader.offset(),
                }
                .into());
            }
        };
        Ok(Some(value))
    }

    fn encode_record<W>(
        &self,
        writer: &mut W,
        record: &Record,
        depth: usize,
    ) -> Result<(), CodecError>
    where
        W: ProtocolWriter + ?Sized,
    {
        self.check_depth(depth)?;
        let schema = record.schema();
        let name = schema.name();

        if schema.is_variant() {
            let mut set = record.iter().map(|(field, _)| field);
            if let (Some(first), Some(second)) = (set.next(), set.next()) {
                return Err(CodecError::VariantConflict {
                    record: name,
                    first: first.name,
                    second: second.name,
                }
                .in_field(name, second.name, second.id, writer.offset()));
            }
        }

        let offset = writer.offset();
        writer
            .write_struct_begin(name)
            .map_err(context(name, "<begin>", 0, offset))?;

        for (idx, field) in schema.fields().iter().enumerate() {
            let value = match record.slot(idx) {
                Some(value) => value,
                None if field.is_required() => {
                    return Err(CodecError::MissingRequiredField {
                        record: name,
                        field: field.name,
                    }
                    .in_field(name, field.name, field.id, writer.offset()));
                }
                None => continue,
            };
            if !field.is_required() && field.is_default(value) {
                continue;
            }

            let offset = writer.offset();
            writer
                .write_field_begin(field.name, value.tag(), field.id)
                .map_err(context(name, field.name, field.id, offset))?;
            self.encode_value(writer, value, depth)
                .map_err(context(name, field.name, field.id, offset))?;
            writer
                .write_field_end()
                .map_err(context(name, field.name, field.id, offset))?;
        }

        let offset = writer.offset();
        writer
            .write_field_stop()
            .map_err(context(name, "<end>", 0, offset))?;
        writer
            .write_struct_end()
            .map_err(context(name, "<end>", 0, offset))?;
        Ok(())
    }

    pub(crate) fn encode_value<W>(
        &self,
        writer: &mut W,
        value: &Value,
        depth: usize,
    ) -> Result<(), CodecError>
    where
        W: ProtocolWriter + ?Sized,
    {
        match value {
            Value::Bool(v) => writer.write_bool(*v)?,
            Value::Byte(v) => writer.write_byte(*v)?,
            Value::I16(v) => writer.write_i16(*v)?,
            Value::I32(v) => writer.write_i32(*v)?,
            Value::I64(v) => writer.write_i64(*v)?,
            Value::Double(v) => writer.write_double(*v)?,
            Value::String(v) => writer.write_string(v)?,
            Value::Binary(v) => writer.write_binary(v)?,
            Value::Struct(record) => self.encode_record(writer, record, depth + 1)?,
            Value::List(list) => self.encode_sequence(writer, TypeTag::List, list, depth + 1)?,
            Value::Set(list) => self.encode_sequence(writer, TypeTag::Set, list, depth + 1)?,
            Value::Map(map) => self.encode_map(writer, map, depth + 1)?,
        }
        Ok(())
    }
}

/// Label for a field header that matched no declaration.
fn header_label(header: &FieldHeader) -> String {
    match (&header.name, header.id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => format!("#{}", id),
        (None, None) => "<unnamed>".to_string(),
    }
}

/// Builds an error mapper that attaches record and field context.
fn context<E>(
    record: &'static str,
    field: impl Into<String>,
    id: i16,
    offset: u64,
) -> impl FnOnce(E) -> CodecError
where
    E: Into<CodecError>,
{
    let field = field.into();
    move |err| err.into().in_field(record, field, id, offset)
}
