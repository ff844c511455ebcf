//! # tagwire-core
//!
//! One generic record codec for the tagwire structured binary protocol.
//!
//! Record types are declared as data (a [`RecordSchema`] per type, collected
//! in a [`SchemaRegistry`]) and a single interpreter encodes and decodes them.
//!
//! This crate provides:
//! - Field and record schemas with declared defaults and requiredness
//! - Dynamic record values with explicit per-field presence
//! - The record codec, including nested records, collections and variants
//! - Forward-compatible decoding that skips unknown fields
//! - Codec configuration loaded from YAML and environment variables

pub mod codec;
mod collection;
pub mod config;
pub mod error;
pub mod json;
pub mod record;
pub mod registry;
pub mod schema;
pub mod value;

pub use codec::RecordCodec;
pub use config::{CodecConfig, ConfigError, VariantPolicy};
pub use error::CodecError;
pub use record::{Presence, Record};
pub use registry::SchemaRegistry;
pub use schema::{
    FieldDescriptor, FieldType, RecordKind, RecordSchema, RecordSchemaBuilder, Requiredness,
};
pub use value::{List, Map, Value};
