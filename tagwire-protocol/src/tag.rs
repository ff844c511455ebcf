//! Type tag registry.
//!
//! Every value on the wire is announced by a one-byte tag:
//!
//! ```text
//! +------+------+------+------+--------+-----+-----+-----+--------+--------+-----+-----+------+
//! | stop | void | bool | byte | double | i16 | i32 | i64 | string | struct | map | set | list |
//! |  0   |  1   |  2   |  3   |   4    |  6  |  8  |  10 |   11   |   12   |  13 |  14 |  15  |
//! +------+------+------+------+--------+-----+-----+-----+--------+--------+-----+-----+------+
//! ```
//!
//! Strings and raw binary share tag 11; the reader's declared type decides
//! whether the payload is validated as UTF-8.

use std::fmt;

/// Wire kind of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeTag {
    /// Terminates the field list of a struct.
    Stop = 0,
    /// No payload.
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// Length-prefixed bytes, either UTF-8 text or raw binary.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TypeTag {
    /// Returns the wire byte for this tag.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Looks up the tag for a wire byte.
    ///
    /// Returns `None` for bytes that do not name a known kind; callers turn
    /// that into an `UnknownTypeTag` error carrying the offending offset.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TypeTag::Stop),
            1 => Some(TypeTag::Void),
            2 => Some(TypeTag::Bool),
            3 => Some(TypeTag::Byte),
            4 => Some(TypeTag::Double),
            6 => Some(TypeTag::I16),
            8 => Some(TypeTag::I32),
            10 => Some(TypeTag::I64),
            11 => Some(TypeTag::String),
            12 => Some(TypeTag::Struct),
            13 => Some(TypeTag::Map),
            14 => Some(TypeTag::Set),
            15 => Some(TypeTag::List),
            _ => None,
        }
    }

    /// Encoded width of a fixed-size value, or `None` for variable-length kinds.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            TypeTag::Void => Some(0),
            TypeTag::Bool | TypeTag::Byte => Some(1),
            TypeTag::I16 => Some(2),
            TypeTag::I32 => Some(4),
            TypeTag::I64 | TypeTag::Double => Some(8),
            TypeTag::Stop
            | TypeTag::String
            | TypeTag::Struct
            | TypeTag::Map
            | TypeTag::Set
            | TypeTag::List => None,
        }
    }

    /// Returns whether this tag introduces a list, set or map.
    pub fn is_container(self) -> bool {
        matches!(self, TypeTag::List | TypeTag::Set | TypeTag::Map)
    }

    /// Returns whether a value of this kind can appear as a field or element.
    pub fn is_value(self) -> bool {
        !matches!(self, TypeTag::Stop | TypeTag::Void)
    }

    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Stop => "stop",
            TypeTag::Void => "void",
            TypeTag::Bool => "bool",
            TypeTag::Byte => "byte",
            TypeTag::Double => "double",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::String => "string",
            TypeTag::Struct => "struct",
            TypeTag::Map => "map",
            TypeTag::Set => "set",
            TypeTag::List => "list",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
