//! leafdoc Mapping - Schema Resolution
//!
//! The reference [`SchemaResolver`](leafdoc_core::SchemaResolver): a registry
//! of concrete fields, aliases and open-ended composite families, buildable
//! in code or from a JSON mapping definition.

pub mod definition;
pub mod path;
pub mod registry;

pub use registry::{MappingBuilder, MappingRegistry};
