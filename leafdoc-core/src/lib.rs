//! leafdoc Core - Shared Types
//!
//! Data types, errors, configuration and the collaborator traits every other
//! leafdoc crate builds on. This crate contains no lookup logic.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod segment;
pub mod traits;
pub mod value;

pub use config::LookupConfig;
pub use descriptor::{DescriptorKind, FieldDescriptor};
pub use error::{
    ConfigError, DocValuesError, LeafError, LeafResult, LoadError, MappingError, ResolveError,
};
pub use segment::{SegmentId, SegmentScope};
pub use traits::{DocValuesAccessor, SchemaResolver, ValueSource, ValueSourceProvider};
pub use value::{FieldType, FieldValue};

/// Ordinal of a document within one segment.
pub type DocId = u32;
