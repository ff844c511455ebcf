//! Skipping values without materializing them.
//!
//! This mirrors the decode dispatch of the record codec but throws every
//! value away, which is what lets an older reader drop fields added by a
//! newer writer.

use crate::error::ProtocolError;
use crate::protocol::ProtocolReader;
use crate::tag::TypeTag;

/// Consumes exactly one value of kind `tag` from `reader`.
///
/// Structs are skipped field by field up to their stop marker and containers
/// element by element. Nesting deeper than `max_depth` fails with
/// `DepthLimitExceeded`.
pub fn skip<R>(reader: &mut R, tag: TypeTag, max_depth: usize) -> Result<(), ProtocolError>
where
    R: ProtocolReader + ?Sized,
{
    skip_value(reader, tag, max_depth, max_depth)
}

fn skip_value<R>(
    reader: &mut R,
    tag: TypeTag,
    depth_left: usize,
    max_depth: usize,
) -> Result<(), ProtocolError>
where
    R: ProtocolReader + ?Sized,
{
    match tag {
        TypeTag::Void => Ok(()),
        TypeTag::Bool => reader.read_bool().map(|_| ()),
        TypeTag::Byte => reader.read_byte().map(|_| ()),
        TypeTag::I16 => reader.read_i16().map(|_| ()),
        TypeTag::I32 => reader.read_i32().map(|_| ()),
        TypeTag::I64 => reader.read_i64().map(|_| ()),
        TypeTag::Double => reader.read_double().map(|_| ()),
        TypeTag::String => reader.skip_binary(),
        TypeTag::Struct => {
            let depth_left = descend(depth_left, max_depth)?;
            reader.read_struct_begin()?;
            loop {
                let header = reader.read_field_begin()?;
                if header.is_stop() {
                    break;
                }
                skip_value(reader, header.tag, depth_left, max_depth)?;
                reader.read_field_end()?;
            }
            reader.read_struct_end()
        }
        TypeTag::List | TypeTag::Set => {
            let depth_left = descend(depth_left, max_depth)?;
            let header = if tag == TypeTag::List {
                reader.read_list_begin()?
            } else {
                reader.read_set_begin()?
            };
            for _ in 0..header.len {
                skip_value(reader, header.elem, depth_left, max_depth)?;
            }
            if tag == TypeTag::List {
                reader.read_list_end()
            } else {
                reader.read_set_end()
            }
        }
        TypeTag::Map => {
            let depth_left = descend(depth_left, max_depth)?;
            let header = reader.read_map_begin()?;
            for _ in 0..header.len {
                skip_value(reader, header.key, depth_left, max_depth)?;
                skip_value(reader, header.value, depth_left, max_depth)?;
            }
            reader.read_map_end()
        }
        TypeTag::Stop => Err(ProtocolError::StructuralMismatch {
            expected: "value",
            offset: reader.offset(),
        }),
    }
}

fn descend(depth_left: usize, max_depth: usize) -> Result<usize, ProtocolError> {
    depth_left
        .checked_sub(1)
        .ok_or(ProtocolError::DepthLimitExceeded { max: max_depth })
}
