//! Lists, sets and maps.
//!
//! Containers are written as their element tag(s), a count, and then each
//! element in turn. Sets share the list layout and are kept as ordered
//! sequences; they are not de-duplicated on decode. A map that carries a key
//! more than once keeps the last value.

use crate::codec::RecordCodec;
use crate::error::CodecError;
use crate::schema::FieldType;
use crate::value::{List, Map, Value};
use tagwire_protocol::{
    ListHeader, MapHeader, ProtocolError, ProtocolReader, ProtocolWriter, TypeTag,
};
use tracing::debug;

/// Upper bound on elements preallocated from a wire count.
const MAX_PREALLOC: usize = 1024;

impl RecordCodec<'_> {
    /// Decodes a container whose tag has already been read.
    ///
    /// Element hints come from `declared` only when the declared element type
    /// matches the element tag on the wire. Returns `Ok(None)`, with the rest
    /// of the container consumed, if an element cannot be represented.
    pub(crate) fn decode_collection<R>(
        &self,
        reader: &mut R,
        tag: TypeTag,
        declared: Option<&FieldType>,
        depth: usize,
    ) -> Result<Option<Value>, CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        self.check_depth(depth)?;
        match tag {
            TypeTag::List => {
                let header = reader.read_list_begin()?;
                let items = self.decode_elements(reader, header, declared, depth)?;
                reader.read_list_end()?;
                Ok(items.map(|items| Value::List(List::from_parts(header.elem, items))))
            }
            TypeTag::Set => {
                let header = reader.read_set_begin()?;
                let items = self.decode_elements(reader, header, declared, depth)?;
                reader.read_set_end()?;
                Ok(items.map(|items| Value::Set(List::from_parts(header.elem, items))))
            }
            TypeTag::Map => {
                let header = reader.read_map_begin()?;
                let map = self.decode_entries(reader, header, declared, depth)?;
                reader.read_map_end()?;
                Ok(map.map(Value::Map))
            }
            _ => Err(ProtocolError::StructuralMismatch {
                expected: "container",
                offset: reader.offset(),
            }
            .into()),
        }
    }

    fn decode_elements<R>(
        &self,
        reader: &mut R,
        header: ListHeader,
        declared: Option<&FieldType>,
        depth: usize,
    ) -> Result<Option<Vec<Value>>, CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        let hint = declared
            .and_then(FieldType::element_type)
            .filter(|ty| ty.tag() == header.elem);

        let mut items = Vec::with_capacity(header.len.min(MAX_PREALLOC));
        for idx in 0..header.len {
            match self.decode_value(reader, header.elem, hint, depth)? {
                Some(value) => items.push(value),
                None => {
                    debug!(
                        elem = %header.elem,
                        len = header.len,
                        "dropping sequence with no schema for its elements"
                    );
                    for _ in idx + 1..header.len {
                        self.skip_value(reader, header.elem, depth)?;
                    }
                    return Ok(None);
                }
            }
        }
        Ok(Some(items))
    }

    fn decode_entries<R>(
        &self,
        reader: &mut R,
        header: MapHeader,
        declared: Option<&FieldType>,
        depth: usize,
    ) -> Result<Option<Map>, CodecError>
    where
        R: ProtocolReader + ?Sized,
    {
        let (key_hint, value_hint) = match declared.and_then(FieldType::entry_types) {
            Some((key, value)) => (
                Some(key).filter(|ty| ty.tag() == header.key),
                Some(value).filter(|ty| ty.tag() == header.value),
            ),
            None => (None, None),
        };

        let mut map = Map::new(header.key, header.value);
        for idx in 0..header.len {
            let key = self.decode_value(reader, header.key, key_hint, depth)?;
            let value = match key {
                Some(_) => self.decode_value(reader, header.value, value_hint, depth)?,
                None => {
                    self.skip_value(reader, header.value, depth)?;
                    None
                }
            };
            let (Some(key), Some(value)) = (key, value) else {
                debug!(
                    key = %header.key,
                    value = %header.value,
                    len = header.len,
                    "dropping map with no schema for its entries"
                );
                for _ in idx + 1..header.len {
                    self.skip_value(reader, header.key, depth)?;
                    self.skip_value(reader, header.value, depth)?;
                }
                return Ok(None);
            };
            if map.insert_unchecked(key, value).is_some() {
                debug!(len = header.len, "duplicate map key, keeping the last value");
            }
        }
        Ok(Some(map))
    }

    /// Encodes a list or set; `tag` selects which.
    pub(crate) fn encode_sequence<W>(
        &self,
        writer: &mut W,
        tag: TypeTag,
        list: &List,
        depth: usize,
    ) -> Result<(), CodecError>
    where
        W: ProtocolWriter + ?Sized,
    {
        self.check_depth(depth)?;
        let header = ListHeader::new(list.elem(), list.len());
        if tag == TypeTag::Set {
            writer.write_set_begin(header)?;
        } else {
            writer.write_list_begin(header)?;
        }
        for item in list {
            self.encode_value(writer, item, depth)?;
        }
        if tag == TypeTag::Set {
            writer.write_set_end()?;
        } else {
            writer.write_list_end()?;
        }
        Ok(())
    }

    pub(crate) fn encode_map<W>(
        &self,
        writer: &mut W,
        map: &Map,
        depth: usize,
    ) -> Result<(), CodecError>
    where
        W: ProtocolWriter + ?Sized,
    {
        self.check_depth(depth)?;
        writer.write_map_begin(MapHeader::new(map.key_tag(), map.value_tag(), map.len()))?;
        for (key, value) in map {
            self.encode_value(writer, key, depth)?;
            self.encode_value(writer, value, depth)?;
        }
        writer.write_map_end()?;
        Ok(())
    }
}
