//! Binary encoding.
//!
//! Layout of the values this module reads and writes:
//!
//! ```text
//! field header   | tag: u8 | id: i16 |          (stop is a lone 0x00 byte)
//! bool, byte     | 1 byte |
//! i16 / i32 / i64| 2 / 4 / 8 bytes, big-endian |
//! double         | 8 bytes, IEEE-754 bits, big-endian |
//! string, binary | len: i32 | len bytes |
//! list, set      | elem tag: u8 | count: i32 | elements... |
//! map            | key tag: u8 | value tag: u8 | count: i32 | key, value... |
//! ```
//!
//! Struct begin/end and field end markers occupy no bytes, and field names
//! are never written.

use crate::cursor::{ByteCursor, ByteSink, ByteSource};
use crate::error::ProtocolError;
use crate::protocol::{
    FieldHeader, ListHeader, MapHeader, ProtocolReader, ProtocolWriter, ReadLimits,
};
use crate::tag::TypeTag;
use bytes::{Bytes, BytesMut};

/// Reads the binary encoding from a byte source.
#[derive(Debug)]
pub struct BinaryReader<S> {
    source: S,
    limits: ReadLimits,
}

impl<S: ByteSource> BinaryReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            limits: ReadLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> ReadLimits {
        self.limits
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        let mut buf = [0u8; N];
        self.source.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_tag(&mut self) -> Result<TypeTag, ProtocolError> {
        let offset = self.source.offset();
        let [byte] = self.read_array::<1>()?;
        TypeTag::from_byte(byte).ok_or(ProtocolError::UnknownTypeTag { tag: byte, offset })
    }

    fn read_element_tag(&mut self) -> Result<TypeTag, ProtocolError> {
        let offset = self.source.offset();
        let tag = self.read_tag()?;
        if !tag.is_value() {
            return Err(ProtocolError::StructuralMismatch {
                expected: "element type",
                offset,
            });
        }
        Ok(tag)
    }

    fn read_size(&mut self, max: usize) -> Result<usize, ProtocolError> {
        let offset = self.source.offset();
        let size = i32::from_be_bytes(self.read_array()?);
        if size < 0 {
            return Err(ProtocolError::NegativeSize { size, offset });
        }
        let size = size as usize;
        if size > max {
            return Err(ProtocolError::LengthOutOfRange {
                length: size as u64,
                max: max as u64,
                offset,
            });
        }
        Ok(size)
    }
}

impl<'a> BinaryReader<ByteCursor<&'a [u8]>> {
    /// Reader over an in-memory slice.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self::new(ByteCursor::new(data))
    }
}

impl<S: ByteSource> ProtocolReader for BinaryReader<S> {
    fn read_struct_begin(&mut self) -> Result<Option<String>, ProtocolError> {
        Ok(None)
    }

    fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader, ProtocolError> {
        let tag = self.read_tag()?;
        if tag == TypeTag::Stop {
            return Ok(FieldHeader::stop());
        }
        let id = self.read_i16()?;
        Ok(FieldHeader::new(tag, id))
    }

    fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        let elem = self.read_element_tag()?;
        let len = self.read_size(self.limits.max_container_len)?;
        Ok(ListHeader::new(elem, len))
    }

    fn read_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader, ProtocolError> {
        let key = self.read_element_tag()?;
        let value = self.read_element_tag()?;
        let len = self.read_size(self.limits.max_container_len)?;
        Ok(MapHeader::new(key, value, len))
    }

    fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte != 0)
    }

    fn read_byte(&mut self) -> Result<i8, ProtocolError> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_double(&mut self) -> Result<f64, ProtocolError> {
        Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
    }

    fn read_binary(&mut self) -> Result<Bytes, ProtocolError> {
        let len = self.read_size(self.limits.max_string_len)?;
        self.source.read_bytes(len)
    }

    fn read_string(&mut self) -> Result<String, ProtocolError> {
        let len = self.read_size(self.limits.max_string_len)?;
        let offset = self.source.offset();
        let bytes = self.source.read_bytes(len)?;
        std::str::from_utf8(&bytes)
            .map(str::to_owned)
            .map_err(|_| ProtocolError::InvalidUtf8 { offset })
    }

    fn skip_binary(&mut self) -> Result<(), ProtocolError> {
        let len = self.read_size(self.limits.max_string_len)?;
        self.source.skip(len)
    }

    fn offset(&self) -> u64 {
        self.source.offset()
    }
}

/// Writes the binary encoding to a byte sink.
#[derive(Debug)]
pub struct BinaryWriter<K> {
    sink: K,
}

impl<K: ByteSink> BinaryWriter<K> {
    pub fn new(sink: K) -> Self {
        Self { sink }
    }

    pub fn get_ref(&self) -> &K {
        &self.sink
    }

    pub fn into_inner(self) -> K {
        self.sink
    }

    fn write_size(&mut self, len: usize) -> Result<(), ProtocolError> {
        if len > i32::MAX as usize {
            return Err(ProtocolError::LengthOutOfRange {
                length: len as u64,
                max: i32::MAX as u64,
                offset: self.sink.offset(),
            });
        }
        self.sink.write_all(&(len as i32).to_be_bytes())
    }
}

impl BinaryWriter<BytesMut> {
    /// Writer into a fresh in-memory buffer.
    pub fn in_memory() -> Self {
        Self::new(BytesMut::with_capacity(256))
    }
}

impl<K: ByteSink> ProtocolWriter for BinaryWriter<K> {
    fn write_struct_begin(&mut self, _name: &str) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_begin(
        &mut self,
        _name: &str,
        tag: TypeTag,
        id: i16,
    ) -> Result<(), ProtocolError> {
        self.sink.write_all(&[tag.to_byte()])?;
        self.sink.write_all(&id.to_be_bytes())
    }

    fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        self.sink.write_all(&[TypeTag::Stop.to_byte()])
    }

    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError> {
        self.sink.write_all(&[header.elem.to_byte()])?;
        self.write_size(header.len)
    }

    fn write_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_set_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError> {
        self.write_list_begin(header)
    }

    fn write_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), ProtocolError> {
        self.sink
            .write_all(&[header.key.to_byte(), header.value.to_byte()])?;
        self.write_size(header.len)
    }

    fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<(), ProtocolError> {
        self.sink.write_all(&[value as u8])
    }

    fn write_byte(&mut self, value: i8) -> Result<(), ProtocolError> {
        self.sink.write_all(&value.to_be_bytes())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), ProtocolError> {
        self.sink.write_all(&value.to_be_bytes())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), ProtocolError> {
        self.sink.write_all(&value.to_be_bytes())
    }

    fn write_i64(&mut self, value: i64) -> Result<(), ProtocolError> {
        self.sink.write_all(&value.to_be_bytes())
    }

    fn write_double(&mut self, value: f64) -> Result<(), ProtocolError> {
        self.sink.write_all(&value.to_bits().to_be_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), ProtocolError> {
        self.write_size(value.len())?;
        self.sink.write_all(value)
    }

    fn write_string(&mut self, value: &str) -> Result<(), ProtocolError> {
        self.write_binary(value.as_bytes())
    }

    fn offset(&self) -> u64 {
        self.sink.offset()
    }
}
