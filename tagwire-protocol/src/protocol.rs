//! Reader and writer traits shared by every encoding.
//!
//! The structural calls (`*_begin` / `*_end`) carry no payload in the binary
//! encoding but are still issued by callers, so encodings that do frame
//! structs, or that put field names on the wire, plug in without changes to
//! the record codec.

use crate::error::ProtocolError;
use crate::tag::TypeTag;
use bytes::Bytes;

/// Header preceding a field body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHeader {
    /// Field name, for encodings that carry names.
    pub name: Option<String>,
    /// Wire kind of the field body.
    pub tag: TypeTag,
    /// Numeric field id, when the encoding carries one.
    pub id: Option<i16>,
}

impl FieldHeader {
    pub fn new(tag: TypeTag, id: i16) -> Self {
        Self {
            name: None,
            tag,
            id: Some(id),
        }
    }

    /// Header for encodings that identify fields by name only.
    pub fn named(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: Some(name.into()),
            tag,
            id: None,
        }
    }

    /// The terminator of a struct's field list.
    pub fn stop() -> Self {
        Self {
            name: None,
            tag: TypeTag::Stop,
            id: None,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.tag == TypeTag::Stop
    }
}

/// Header of a list or set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub elem: TypeTag,
    pub len: usize,
}

impl ListHeader {
    pub fn new(elem: TypeTag, len: usize) -> Self {
        Self { elem, len }
    }
}

/// Header of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key: TypeTag,
    pub value: TypeTag,
    pub len: usize,
}

impl MapHeader {
    pub fn new(key: TypeTag, value: TypeTag, len: usize) -> Self {
        Self { key, value, len }
    }
}

/// Size limits enforced while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLimits {
    /// Maximum length of one string or binary value.
    pub max_string_len: usize,
    /// Maximum element count of one container.
    pub max_container_len: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_string_len: crate::DEFAULT_MAX_STRING_LEN,
            max_container_len: crate::DEFAULT_MAX_CONTAINER_LEN,
        }
    }
}

/// Decoding side of an encoding.
pub trait ProtocolReader {
    /// Reads a struct begin marker, returning the struct name if the encoding
    /// carries one.
    fn read_struct_begin(&mut self) -> Result<Option<String>, ProtocolError>;
    fn read_struct_end(&mut self) -> Result<(), ProtocolError>;

    /// Reads the next field header; `FieldHeader::is_stop` ends the struct.
    fn read_field_begin(&mut self) -> Result<FieldHeader, ProtocolError>;
    fn read_field_end(&mut self) -> Result<(), ProtocolError>;

    fn read_list_begin(&mut self) -> Result<ListHeader, ProtocolError>;
    fn read_list_end(&mut self) -> Result<(), ProtocolError>;
    fn read_set_begin(&mut self) -> Result<ListHeader, ProtocolError>;
    fn read_set_end(&mut self) -> Result<(), ProtocolError>;
    fn read_map_begin(&mut self) -> Result<MapHeader, ProtocolError>;
    fn read_map_end(&mut self) -> Result<(), ProtocolError>;

    fn read_bool(&mut self) -> Result<bool, ProtocolError>;
    fn read_byte(&mut self) -> Result<i8, ProtocolError>;
    fn read_i16(&mut self) -> Result<i16, ProtocolError>;
    fn read_i32(&mut self) -> Result<i32, ProtocolError>;
    fn read_i64(&mut self) -> Result<i64, ProtocolError>;
    fn read_double(&mut self) -> Result<f64, ProtocolError>;
    fn read_binary(&mut self) -> Result<Bytes, ProtocolError>;
    fn read_string(&mut self) -> Result<String, ProtocolError>;

    /// Consumes a string or binary value without keeping it.
    fn skip_binary(&mut self) -> Result<(), ProtocolError> {
        self.read_binary().map(|_| ())
    }

    /// Bytes consumed so far, for diagnostics.
    fn offset(&self) -> u64;
}

/// Encoding side of an encoding.
pub trait ProtocolWriter {
    fn write_struct_begin(&mut self, name: &str) -> Result<(), ProtocolError>;
    fn write_struct_end(&mut self) -> Result<(), ProtocolError>;

    fn write_field_begin(&mut self, name: &str, tag: TypeTag, id: i16)
        -> Result<(), ProtocolError>;
    fn write_field_end(&mut self) -> Result<(), ProtocolError>;
    fn write_field_stop(&mut self) -> Result<(), ProtocolError>;

    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError>;
    fn write_list_end(&mut self) -> Result<(), ProtocolError>;
    fn write_set_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError>;
    fn write_set_end(&mut self) -> Result<(), ProtocolError>;
    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), ProtocolError>;
    fn write_map_end(&mut self) -> Result<(), ProtocolError>;

    fn write_bool(&mut self, value: bool) -> Result<(), ProtocolError>;
    fn write_byte(&mut self, value: i8) -> Result<(), ProtocolError>;
    fn write_i16(&mut self, value: i16) -> Result<(), ProtocolError>;
    fn write_i32(&mut self, value: i32) -> Result<(), ProtocolError>;
    fn write_i64(&mut self, value: i64) -> Result<(), ProtocolError>;
    fn write_double(&mut self, value: f64) -> Result<(), ProtocolError>;
    fn write_binary(&mut self, value: &[u8]) -> Result<(), ProtocolError>;
    fn write_string(&mut self, value: &str) -> Result<(), ProtocolError>;

    /// Bytes written so far, for diagnostics.
    fn offset(&self) -> u64;
}
