//! # tagwire-protocol
//!
//! Wire-level building blocks for the tagwire structured binary protocol.
//!
//! This crate provides:
//! - The one-byte type tag registry
//! - Byte sources and sinks over in-memory buffers and `std::io` streams
//! - Fixed-width big-endian primitive encodings
//! - Reader/writer traits and the binary protocol implementation
//! - A skipper that consumes a value of any tag without materializing it

pub mod binary;
pub mod cursor;
pub mod error;
pub mod protocol;
pub mod skip;
pub mod tag;

pub use binary::{BinaryReader, BinaryWriter};
pub use cursor::{ByteCursor, ByteSink, ByteSource, IoSink, IoSource};
pub use error::ProtocolError;
pub use protocol::{FieldHeader, ListHeader, MapHeader, ProtocolReader, ProtocolWriter, ReadLimits};
pub use skip::skip;
pub use tag::TypeTag;

/// Default maximum nesting depth for structs and containers.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum length of a single string or binary value (16 MiB).
pub const DEFAULT_MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Default maximum element count of a single list, set or map.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 1024 * 1024;
